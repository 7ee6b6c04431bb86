//! Terminal presentation.
//!
//! Draws whatever the controller currently holds: the loading line while
//! submitting, the destruction report for a result, the error panel (with a
//! status-based hint) for a failure.

use std::io::Write;

use colored::Colorize;
use tracing::warn;

use crate::controller::{ControllerEvent, StateObserver};
use crate::state::{FailureInfo, InteractionState, RoastResult};

pub const PROMPT: &str = "git-roast:~$ ";
const RULE: &str = "----------------------------------------";

/// Render a state to text. `None` for states with nothing to draw.
pub fn format_state(state: &InteractionState) -> Option<String> {
    match state {
        InteractionState::Idle => None,
        InteractionState::Submitting => Some(format!("{}", "ANALYZING_VICTIM...".green().bold())),
        InteractionState::ShowingResult(result) => Some(format_report(result)),
        InteractionState::ShowingError(failure) => Some(format_failure(failure)),
    }
}

fn format_report(result: &RoastResult) -> String {
    format!(
        "{}\n{}\n\"{}\"\n\n{}",
        RULE.dimmed(),
        "DESTRUCTION_REPORT".green().bold(),
        result.roast.italic(),
        format!("LAMENESS_SCORE: {}/100", result.score).red().bold()
    )
}

fn format_failure(failure: &FailureInfo) -> String {
    let mut out = format!("{}", format!("[ERROR] {}", failure.message).red());
    if let Some(hint) = failure.hint() {
        out.push('\n');
        out.push_str(&format!("{}", hint.yellow()));
    }
    out
}

/// Observer that prints each state change to stdout.
#[derive(Debug, Default)]
pub struct TerminalRenderer;

impl StateObserver for TerminalRenderer {
    fn on_event(&self, event: &ControllerEvent) {
        if let ControllerEvent::StateChanged(state) = event {
            if let Some(text) = format_state(state) {
                let mut stdout = std::io::stdout().lock();
                let _ = writeln!(stdout, "{}", text);
                let _ = stdout.flush();
            }
        }
    }
}

/// One line of JSON per outcome; loading and idle states are skipped.
pub fn format_json(state: &InteractionState) -> Option<String> {
    if !state.is_outcome() {
        return None;
    }
    match serde_json::to_string(state) {
        Ok(line) => Some(line),
        Err(e) => {
            warn!("failed to encode {} state: {}", state.name(), e);
            None
        }
    }
}

/// Observer that prints every outcome as a JSON line, for `--json`.
#[derive(Debug, Default)]
pub struct JsonRenderer;

impl StateObserver for JsonRenderer {
    fn on_event(&self, event: &ControllerEvent) {
        if let ControllerEvent::StateChanged(state) = event {
            if let Some(line) = format_json(state) {
                let mut stdout = std::io::stdout().lock();
                let _ = writeln!(stdout, "{}", line);
                let _ = stdout.flush();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_draws_nothing() {
        assert_eq!(format_state(&InteractionState::Idle), None);
    }

    #[test]
    fn loading_line() {
        let text = format_state(&InteractionState::Submitting).unwrap();
        assert!(text.contains("ANALYZING_VICTIM..."));
    }

    #[test]
    fn report_has_roast_and_score() {
        let text = format_state(&InteractionState::ShowingResult(RoastResult {
            roast: "bad code".into(),
            score: 87.0,
        }))
        .unwrap();
        assert!(text.contains("DESTRUCTION_REPORT"));
        assert!(text.contains("bad code"));
        assert!(text.contains("LAMENESS_SCORE: 87/100"));
    }

    #[test]
    fn error_panel_with_hint_for_not_found() {
        let text = format_state(&InteractionState::ShowingError(FailureInfo::new(
            Some(404),
            "TARGET_NOT_FOUND",
        )))
        .unwrap();
        assert!(text.contains("[ERROR] TARGET_NOT_FOUND"));
        assert!(text.contains("public"));
    }

    #[test]
    fn error_panel_without_hint() {
        let text =
            format_state(&InteractionState::ShowingError(FailureInfo::new(None, "offline")))
                .unwrap();
        assert!(text.contains("[ERROR] offline"));
        assert!(!text.contains('\n'));
    }

    #[test]
    fn json_lines_only_for_outcomes() {
        assert_eq!(format_json(&InteractionState::Idle), None);
        assert_eq!(format_json(&InteractionState::Submitting), None);

        let line = format_json(&InteractionState::ShowingError(FailureInfo::new(
            Some(503),
            "SETUP_REQUIRED",
        )))
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["state"], "showing_error");
        assert_eq!(value["data"]["status_code"], 503);
        assert!(!line.contains('\n'));
    }
}
