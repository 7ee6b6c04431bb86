//! Interaction state owned by the controller.
//!
//! The presentation layer only ever sees snapshots of [`InteractionState`];
//! which view to show is derived from it rather than tracked alongside.

use serde::Serialize;

/// A successfully decoded roast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoastResult {
    pub roast: String,
    /// Lameness score, conventionally 0-100.
    pub score: f64,
}

/// A failed submission as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureInfo {
    /// HTTP status of the reply, `None` when no reply arrived.
    pub status_code: Option<u16>,
    pub message: String,
}

impl FailureInfo {
    pub fn new(status_code: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
        }
    }

    /// Follow-up advice keyed on the retained status code.
    pub fn hint(&self) -> Option<&'static str> {
        match self.status_code {
            Some(404) => Some("Check the URL, or make the repository public and try again."),
            Some(403) => Some("GitHub is throttling the backend. Give it a minute."),
            Some(503) => Some("The backend needs GEMINI_API_KEY before it can roast anything."),
            _ => None,
        }
    }
}

/// Lifecycle of the roast form. Exactly one variant is active at a time.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum InteractionState {
    #[default]
    Idle,
    Submitting,
    ShowingResult(RoastResult),
    ShowingError(FailureInfo),
}

/// Which screen the presentation layer should draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Input,
    Result,
}

impl InteractionState {
    pub fn view(&self) -> View {
        match self {
            InteractionState::ShowingResult(_) => View::Result,
            _ => View::Input,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, InteractionState::Submitting)
    }

    pub fn result(&self) -> Option<&RoastResult> {
        match self {
            InteractionState::ShowingResult(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FailureInfo> {
        match self {
            InteractionState::ShowingError(failure) => Some(failure),
            _ => None,
        }
    }

    /// `ShowingResult` or `ShowingError`.
    pub fn is_outcome(&self) -> bool {
        matches!(
            self,
            InteractionState::ShowingResult(_) | InteractionState::ShowingError(_)
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            InteractionState::Idle => "idle",
            InteractionState::Submitting => "submitting",
            InteractionState::ShowingResult(_) => "showing_result",
            InteractionState::ShowingError(_) => "showing_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> InteractionState {
        InteractionState::ShowingResult(RoastResult {
            roast: "bad code".into(),
            score: 87.0,
        })
    }

    #[test]
    fn view_is_projection_of_state() {
        assert_eq!(InteractionState::Idle.view(), View::Input);
        assert_eq!(InteractionState::Submitting.view(), View::Input);
        assert_eq!(result().view(), View::Result);
        assert_eq!(
            InteractionState::ShowingError(FailureInfo::new(Some(404), "gone")).view(),
            View::Input
        );
    }

    #[test]
    fn loading_only_while_submitting() {
        assert!(InteractionState::Submitting.is_loading());
        assert!(!InteractionState::Idle.is_loading());
        assert!(!result().is_loading());
    }

    #[test]
    fn hint_follows_status_code_not_message() {
        let private = FailureInfo::new(Some(404), "anything at all");
        assert!(private.hint().unwrap().contains("public"));

        let mentions_private = FailureInfo::new(Some(500), "repo is private");
        assert_eq!(mentions_private.hint(), None);

        assert_eq!(FailureInfo::new(None, "offline").hint(), None);
    }

    #[test]
    fn serializes_tagged() {
        let json = serde_json::to_value(result()).unwrap();
        assert_eq!(json["state"], "showing_result");
        assert_eq!(json["data"]["roast"], "bad code");

        let idle = serde_json::to_value(InteractionState::Idle).unwrap();
        assert_eq!(idle, serde_json::json!({ "state": "idle" }));
    }
}
