//! git-roast: submit a GitHub repository and render the roast.
//!
//! ## Structure
//!
//! - **controller**: request lifecycle state machine (the core)
//! - **classify**: pure mapping from HTTP outcomes to user-facing failures
//! - **service**: `RoastService` boundary and its reqwest implementation
//! - **cue**: fire-and-forget feedback cues (`CueNotifier`)
//! - **state**: `InteractionState` and the view derived from it
//! - **render**: terminal presentation (feature `cli`)
//! - **server**: the roast backend itself (feature `server`)

pub mod api;
pub mod classify;
pub mod config;
pub mod controller;
pub mod cue;
pub mod service;
pub mod state;

#[cfg(feature = "cli")]
pub mod render;

#[cfg(feature = "server")]
pub mod server;

pub use classify::classify;
pub use config::{ClientConfig, ConfigError};
pub use controller::{ControllerEvent, RejectReason, RoastController, StateObserver, SubmitOutcome};
pub use cue::{Cue, CueNotifier, NoopNotifier};
pub use service::{HttpRoastService, RoastService, ServiceError, ServiceReply};
pub use state::{FailureInfo, InteractionState, RoastResult, View};
