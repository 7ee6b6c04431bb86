//! Feedback cues.
//!
//! Cues are fire-and-forget: a notifier never returns an error and the
//! controller never waits on one.

use std::io::Write;

use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cue {
    SubmissionStarted,
    Success,
    Error,
}

impl Cue {
    pub fn name(&self) -> &'static str {
        match self {
            Cue::SubmissionStarted => "submission-started",
            Cue::Success => "success",
            Cue::Error => "error",
        }
    }
}

impl std::fmt::Display for Cue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Plays a cue. Implementations swallow their own failures.
pub trait CueNotifier: Send + Sync {
    fn play(&self, cue: Cue);
}

/// Default notifier: does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl CueNotifier for NoopNotifier {
    fn play(&self, _cue: Cue) {}
}

/// Rings the terminal bell on outcomes. The start cue is only logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalBell;

impl CueNotifier for TerminalBell {
    fn play(&self, cue: Cue) {
        debug!(cue = cue.name(), "playing cue");
        if cue == Cue::SubmissionStarted {
            return;
        }
        let mut stderr = std::io::stderr();
        let _ = stderr.write_all(b"\x07");
        let _ = stderr.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cue_names() {
        assert_eq!(Cue::SubmissionStarted.name(), "submission-started");
        assert_eq!(Cue::Success.to_string(), "success");
        assert_eq!(serde_json::to_value(Cue::Error).unwrap(), "error");
        assert_eq!(
            serde_json::to_value(Cue::SubmissionStarted).unwrap(),
            "submission-started"
        );
    }

    #[test]
    fn notifiers_never_fail() {
        NoopNotifier.play(Cue::Error);
        TerminalBell.play(Cue::SubmissionStarted);
    }
}
