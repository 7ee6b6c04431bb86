//! Failure classification.
//!
//! Maps the outcome of a roast request to the message the user sees. The
//! table is fixed and checked in order; only unlisted statuses fall through
//! to the server-supplied detail.

use crate::state::FailureInfo;

pub const NOT_FOUND_MESSAGE: &str =
    "TARGET_NOT_FOUND: repository does not exist or is private";
pub const RATE_LIMITED_MESSAGE: &str = "RATE_LIMITED: GitHub API rate limit exceeded";
pub const NO_CONTENT_MESSAGE: &str = "NOTHING_TO_ROAST: repository has no analyzable code";
pub const UPSTREAM_UNREACHABLE_MESSAGE: &str = "UPSTREAM_UNREACHABLE: could not reach GitHub";
pub const SETUP_REQUIRED_MESSAGE: &str =
    "SETUP_REQUIRED: roast service is misconfigured (missing API key)";

/// Unlisted status with no usable detail.
pub const GENERIC_FAILURE_MESSAGE: &str = "FAILED_TO_FETCH_DESTRUCTION_DATA";
/// No reply from the service at all.
pub const NETWORK_FAILURE_MESSAGE: &str = "CONNECTION_LOST: roast service unreachable";
/// 2xx reply without a roast.
pub const EMPTY_ROAST_MESSAGE: &str = "EMPTY_ROAST_RECEIVED";
/// Submission future dropped before the service answered.
pub const ABANDONED_MESSAGE: &str = "SUBMISSION_ABANDONED: no reply was awaited";

const STATUS_TABLE: &[(u16, &str)] = &[
    (404, NOT_FOUND_MESSAGE),
    (403, RATE_LIMITED_MESSAGE),
    (422, NO_CONTENT_MESSAGE),
    (502, UPSTREAM_UNREACHABLE_MESSAGE),
    (503, SETUP_REQUIRED_MESSAGE),
];

/// Classify a failed request.
///
/// `status` is `None` for network failures. A blank `detail` counts as absent.
pub fn classify(status: Option<u16>, detail: Option<&str>) -> FailureInfo {
    let Some(code) = status else {
        return FailureInfo::new(None, NETWORK_FAILURE_MESSAGE);
    };

    let message = STATUS_TABLE
        .iter()
        .find(|(listed, _)| *listed == code)
        .map(|(_, message)| (*message).to_string())
        .or_else(|| {
            detail
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());

    FailureInfo::new(Some(code), message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listed_statuses_ignore_detail() {
        for (code, expected) in STATUS_TABLE {
            for detail in [None, Some("REPO_NOT_FOUND_OR_PRIVATE"), Some("whatever")] {
                let info = classify(Some(*code), detail);
                assert_eq!(info.status_code, Some(*code));
                assert_eq!(info.message, *expected, "status {code} detail {detail:?}");
            }
        }
    }

    #[test]
    fn unlisted_status_echoes_detail() {
        let info = classify(Some(500), Some("DESTRUCTION_CORE_FAILURE"));
        assert_eq!(info, FailureInfo::new(Some(500), "DESTRUCTION_CORE_FAILURE"));

        let info = classify(Some(400), Some("INVALID_GITHUB_URL"));
        assert_eq!(info.message, "INVALID_GITHUB_URL");
    }

    #[test]
    fn unlisted_status_without_detail_falls_back() {
        assert_eq!(classify(Some(500), None).message, GENERIC_FAILURE_MESSAGE);
        assert_eq!(classify(Some(418), Some("  ")).message, GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn network_failure_has_no_status() {
        let info = classify(None, Some("ignored"));
        assert_eq!(info, FailureInfo::new(None, NETWORK_FAILURE_MESSAGE));
    }

    #[test]
    fn not_found_message_mentions_private() {
        assert!(classify(Some(404), None).message.contains("private"));
    }
}
