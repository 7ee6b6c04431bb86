//! Wire types for the roast endpoint, shared by the client and the backend.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Path of the roast endpoint, relative to the service base URL.
pub const ROAST_PATH: &str = "/api/roast";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoastRequest {
    pub repo_url: String,
}

impl RoastRequest {
    pub fn new(repo_url: impl Into<String>) -> Self {
        Self {
            repo_url: repo_url.into(),
        }
    }
}

/// Success body of `POST /api/roast`.
///
/// Both fields are optional when decoding so that a 2xx reply without a
/// roast reaches the controller as a malformed body instead of a decode error.
/// A score that is neither a number nor a numeric string decodes as `None`
/// and never spoils the roast next to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoastPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roast: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_score",
        skip_serializing_if = "Option::is_none"
    )]
    pub score: Option<f64>,
}

impl RoastPayload {
    pub fn new(roast: impl Into<String>, score: f64) -> Self {
        Self {
            roast: Some(roast.into()),
            score: Some(score),
        }
    }
}

fn lenient_score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Failure body: `{ "detail": "<MACHINE_READABLE_CODE>" }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
        }
    }

    /// Pull the detail out of a raw failure body. Anything that is not a JSON
    /// object with a string `detail` yields `None`.
    pub fn detail_from(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.detail)
            .filter(|d| !d.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_snake_case() {
        let body = serde_json::to_value(RoastRequest::new("https://github.com/a/b")).unwrap();
        assert_eq!(body, serde_json::json!({ "repo_url": "https://github.com/a/b" }));
    }

    #[test]
    fn payload_tolerates_missing_fields() {
        let payload: RoastPayload = serde_json::from_str("{}").unwrap();
        assert_eq!(payload, RoastPayload::default());
    }

    #[test]
    fn score_decoding_never_drops_the_roast() {
        let payload: RoastPayload =
            serde_json::from_str(r#"{"roast":"bad code","score":"87"}"#).unwrap();
        assert_eq!(payload, RoastPayload::new("bad code", 87.0));

        for body in [
            r#"{"roast":"bad code","score":"lots"}"#,
            r#"{"roast":"bad code","score":null}"#,
            r#"{"roast":"bad code","score":[1]}"#,
        ] {
            let payload: RoastPayload = serde_json::from_str(body).unwrap();
            assert_eq!(payload.roast.as_deref(), Some("bad code"), "{body}");
            assert_eq!(payload.score, None, "{body}");
        }
    }

    #[test]
    fn detail_from_string_detail() {
        assert_eq!(
            ErrorBody::detail_from(r#"{"detail":"DESTRUCTION_CORE_FAILURE"}"#),
            Some("DESTRUCTION_CORE_FAILURE".to_string())
        );
    }

    #[test]
    fn detail_from_unparseable_body() {
        assert_eq!(ErrorBody::detail_from("<html>bad gateway</html>"), None);
        assert_eq!(ErrorBody::detail_from(r#"{"detail":[{"loc":"body"}]}"#), None);
        assert_eq!(ErrorBody::detail_from(r#"{"detail":"   "}"#), None);
        assert_eq!(ErrorBody::detail_from(""), None);
    }
}
