//! Request lifecycle controller.
//!
//! Drives one submission at a time from user intent to an outcome:
//!
//! ```text
//! Idle --submit--> Submitting --success--> ShowingResult --reset--> Idle
//!                  Submitting --failure--> ShowingError  --reset--> Idle
//! ShowingResult | ShowingError --submit--> Submitting
//! ```
//!
//! The controller is the only writer of [`InteractionState`]. Observers get
//! every state change and cue; the injected [`CueNotifier`] gets the cues.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::classify::{classify, ABANDONED_MESSAGE, EMPTY_ROAST_MESSAGE};
use crate::cue::{Cue, CueNotifier, NoopNotifier};
use crate::service::{RoastService, ServiceError, ServiceReply};
use crate::state::{FailureInfo, InteractionState, RoastResult, View};

/// Notification delivered to observers.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    StateChanged(InteractionState),
    Cue(Cue),
}

/// Receives controller events synchronously, in transition order. Events may
/// be handed over by whichever caller is already delivering.
pub trait StateObserver: Send + Sync {
    fn on_event(&self, event: &ControllerEvent);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// URL empty or whitespace only.
    EmptyUrl,
    /// Another submission has not finished yet.
    InFlight,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Nothing happened: no state change, no service call.
    Rejected(RejectReason),
    /// The submission ran to the contained terminal state.
    Completed(InteractionState),
}

pub struct RoastController {
    service: Arc<dyn RoastService>,
    notifier: Arc<dyn CueNotifier>,
    state: Mutex<InteractionState>,
    outbox: Mutex<Outbox>,
    observers: Mutex<Vec<(SubscriptionId, Arc<dyn StateObserver>)>>,
    next_subscription: AtomicU64,
}

/// Events not yet delivered, queued in transition order.
#[derive(Default)]
struct Outbox {
    pending: VecDeque<ControllerEvent>,
    /// Set while some caller is draining `pending`.
    delivering: bool,
}

impl RoastController {
    pub fn new(service: Arc<dyn RoastService>) -> Self {
        Self {
            service,
            notifier: Arc::new(NoopNotifier),
            state: Mutex::new(InteractionState::Idle),
            outbox: Mutex::new(Outbox::default()),
            observers: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(0),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn CueNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> InteractionState {
        self.lock_state().clone()
    }

    pub fn view(&self) -> View {
        self.lock_state().view()
    }

    pub fn is_loading(&self) -> bool {
        self.lock_state().is_loading()
    }

    pub fn subscribe(&self, observer: Arc<dyn StateObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        lock(&self.observers).push((id, observer));
        id
    }

    /// Returns false if the id was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = lock(&self.observers);
        let before = observers.len();
        observers.retain(|(sid, _)| *sid != id);
        observers.len() != before
    }

    /// Submit a repository URL for roasting.
    ///
    /// Rejected without any effect when the URL is blank or a submission is
    /// already in flight. Otherwise leaves `Submitting` exactly once, even if
    /// this future is dropped or an observer panics before the service answers.
    pub async fn submit(&self, repo_url: &str) -> SubmitOutcome {
        let repo_url = repo_url.trim();
        if repo_url.is_empty() {
            debug!("ignoring submit with empty repository URL");
            return SubmitOutcome::Rejected(RejectReason::EmptyUrl);
        }

        {
            let mut state = self.lock_state();
            if state.is_loading() {
                debug!(repo_url, "ignoring submit while a roast is in flight");
                return SubmitOutcome::Rejected(RejectReason::InFlight);
            }
            *state = InteractionState::Submitting;
            self.enqueue([
                ControllerEvent::StateChanged(InteractionState::Submitting),
                ControllerEvent::Cue(Cue::SubmissionStarted),
            ]);
        }
        let mut in_flight = InFlight {
            controller: self,
            settled: false,
        };

        let submission_id = Uuid::new_v4();
        info!(%submission_id, repo_url, "submitting repository for roasting");
        self.deliver();
        self.notifier.play(Cue::SubmissionStarted);

        let reply = self
            .service
            .roast(repo_url)
            .instrument(info_span!("roast", %submission_id))
            .await;

        let next = resolve(reply);
        match &next {
            InteractionState::ShowingResult(result) => {
                info!(%submission_id, score = result.score, "roast received")
            }
            InteractionState::ShowingError(failure) => info!(
                %submission_id,
                status = ?failure.status_code,
                message = %failure.message,
                "roast failed"
            ),
            _ => {}
        }

        in_flight.settle(next.clone());
        SubmitOutcome::Completed(next)
    }

    /// Return to the input view. Returns false while submitting or when
    /// already idle.
    pub fn reset(&self) -> bool {
        {
            let mut state = self.lock_state();
            if !state.is_outcome() {
                return false;
            }
            *state = InteractionState::Idle;
            self.enqueue([ControllerEvent::StateChanged(InteractionState::Idle)]);
        }
        self.deliver();
        true
    }

    /// Write a terminal state and queue its events. Returns the cue to play.
    fn commit(&self, next: InteractionState) -> Cue {
        let cue = match next {
            InteractionState::ShowingResult(_) => Cue::Success,
            _ => Cue::Error,
        };
        let mut state = self.lock_state();
        *state = next.clone();
        self.enqueue([ControllerEvent::StateChanged(next), ControllerEvent::Cue(cue)]);
        cue
    }

    fn finish(&self, next: InteractionState) {
        let cue = self.commit(next);
        self.deliver();
        self.notifier.play(cue);
    }

    /// Must be called with the state lock held, so queue order matches the
    /// order in which states were written.
    fn enqueue<const N: usize>(&self, events: [ControllerEvent; N]) {
        lock(&self.outbox).pending.extend(events);
    }

    /// Drain the outbox to observers. Only one caller drains at a time; a
    /// transition made meanwhile (from another task, or from inside an
    /// observer) is delivered by the draining caller after what was already
    /// queued.
    fn deliver(&self) {
        {
            let mut outbox = lock(&self.outbox);
            if outbox.delivering {
                return;
            }
            outbox.delivering = true;
        }
        let _role = DeliveryRole(&self.outbox);

        loop {
            let event = {
                let mut outbox = lock(&self.outbox);
                match outbox.pending.pop_front() {
                    Some(event) => event,
                    None => {
                        outbox.delivering = false;
                        return;
                    }
                }
            };

            let observers: Vec<Arc<dyn StateObserver>> = lock(&self.observers)
                .iter()
                .map(|(_, observer)| Arc::clone(observer))
                .collect();
            for observer in observers {
                observer.on_event(&event);
            }
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, InteractionState> {
        lock(&self.state)
    }
}

/// Gives up the delivery role when an observer panics mid-delivery.
struct DeliveryRole<'a>(&'a Mutex<Outbox>);

impl Drop for DeliveryRole<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            lock(self.0).delivering = false;
        }
    }
}

/// Leaves `Submitting` when dropped unsettled.
struct InFlight<'a> {
    controller: &'a RoastController,
    settled: bool,
}

impl InFlight<'_> {
    fn settle(&mut self, next: InteractionState) {
        self.settled = true;
        self.controller.finish(next);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let abandoned = InteractionState::ShowingError(FailureInfo::new(None, ABANDONED_MESSAGE));
        if std::thread::panicking() {
            // Unwinding out of an observer or notifier: record the outcome,
            // the next transition delivers it.
            warn!("submission unwound before the service answered");
            self.settled = true;
            self.controller.commit(abandoned);
        } else {
            warn!("submission dropped before the service answered");
            self.settle(abandoned);
        }
    }
}

fn resolve(reply: Result<ServiceReply, ServiceError>) -> InteractionState {
    match reply {
        Ok(ServiceReply::Roasted(payload)) => {
            match payload.roast.filter(|roast| !roast.trim().is_empty()) {
                Some(roast) => InteractionState::ShowingResult(RoastResult {
                    roast,
                    score: payload.score.unwrap_or_default(),
                }),
                None => InteractionState::ShowingError(FailureInfo::new(None, EMPTY_ROAST_MESSAGE)),
            }
        }
        Ok(ServiceReply::Rejected { status, detail }) => {
            InteractionState::ShowingError(classify(Some(status), detail.as_deref()))
        }
        Err(e) => {
            warn!("roast service unreachable: {}", e);
            InteractionState::ShowingError(classify(None, None))
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
