// src/github/error.rs
// =============================================================================
// This module decides what went wrong when GitHub answers with an error.
//
// Every failed HTTP response goes through `classify()`, which looks at the
// status code and the rate-limit headers and picks one `ApiError` variant:
//
//   403 + x-ratelimit-remaining: 0  -> RateLimited
//   409                             -> RepositoryEmptyOrBranchMissing
//   404                             -> NotFound
//   anything else                   -> Generic (status + start of the body)
//
// The variant only decides which message the user sees. Control flow is the
// same for all of them: the caller either aborts or skips a category.
//
// Rust concepts:
// - thiserror: derives Display and std::error::Error from #[error(...)]
// - Option<T>: rate-limit headers may be missing entirely
// - Guards in match arms: `403 if ...` matches only when the guard holds
// =============================================================================

use reqwest::header::HeaderMap;
use serde::Serialize;

// Maximum number of characters of a response body kept for diagnostics
const BODY_SNIPPET_CHARS: usize = 200;

// Machine-checkable failure kind attached to every reported error
//
// Callers can match on this instead of parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No response from GitHub at all
    NetworkFailure,
    /// Hourly quota used up
    RateLimited,
    /// 404: wrong name, or private without a token
    NotFound,
    /// 409: empty repository or missing branch
    RepositoryEmptyOrBranchMissing,
    /// One category could not be listed; the rest loaded fine
    PartialCategoryFailure,
    /// Anything else, including unexpected payloads
    Generic,
}

// Values of the x-ratelimit-* response headers
//
// Only used to explain failures; never cached between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RateLimitInfo {
    /// Requests allowed per hour
    pub limit: Option<u64>,
    /// Requests left in the current window
    pub remaining: Option<u64>,
    /// Unix timestamp (seconds) at which the quota resets
    pub reset: Option<u64>,
}

impl RateLimitInfo {
    // Reads the three headers, ignoring any that are missing or not numbers
    pub fn from_headers(headers: &HeaderMap) -> Self {
        // Header value -> &str -> u64, giving up quietly at any step
        let read = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
        };

        Self {
            limit: read("x-ratelimit-limit"),
            remaining: read("x-ratelimit-remaining"),
            reset: read("x-ratelimit-reset"),
        }
    }

    // Short quota description for diagnostics
    //
    // Returns: "42/60 requests remaining", or None when the headers were absent
    pub fn quota_summary(&self) -> Option<String> {
        match (self.remaining, self.limit) {
            (Some(remaining), Some(limit)) => {
                Some(format!("{}/{} requests remaining", remaining, limit))
            }
            (Some(remaining), None) => Some(format!("{} requests remaining", remaining)),
            _ => None,
        }
    }

    // Reset time as RFC 3339 (the header is a Unix timestamp in seconds)
    fn reset_display(&self) -> String {
        self.reset
            .and_then(|secs| chrono::DateTime::from_timestamp(secs as i64, 0))
            .map(|at| at.to_rfc3339())
            .unwrap_or_else(|| "an unknown time".to_string())
    }
}

// A classified non-success response from the GitHub API
//
// The #[error(...)] text is what ends up in front of the user, so each
// message says what to check next.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Quota exhausted (HTTP 403 with no requests remaining)
    #[error(
        "GitHub API rate limit exceeded (limit {limit} requests/hour, resets at {reset}); \
         supply an access token or wait for the quota to reset"
    )]
    RateLimited { limit: String, reset: String },

    /// Empty repository, or the branch does not exist (HTTP 409)
    #[error("HTTP 409: the repository is empty or the branch does not exist")]
    RepositoryEmptyOrBranchMissing,

    /// Wrong owner/repo/branch/path, or a private repo without a token
    #[error(
        "HTTP 404: not found. The owner, repository, branch or path may be misspelled, \
         or the repository is private and requires an access token"
    )]
    NotFound,

    /// Any other error status
    #[error("GitHub API returned HTTP {status}: {body}")]
    Generic { status: u16, body: String },
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::RateLimited { .. } => ErrorKind::RateLimited,
            ApiError::RepositoryEmptyOrBranchMissing => ErrorKind::RepositoryEmptyOrBranchMissing,
            ApiError::NotFound => ErrorKind::NotFound,
            ApiError::Generic { .. } => ErrorKind::Generic,
        }
    }
}

// Turns a failed response into an ApiError
//
// Parameters:
//   status: HTTP status code of the failed response
//   rate_limit: parsed x-ratelimit-* headers
//   body: response body (kept, shortened, for Generic errors)
//
// Returns: the matching ApiError variant
//
// Example:
//   classify(403, {remaining: 0, limit: 60}, "...") -> RateLimited { limit: "60", .. }
//   classify(403, {remaining: 12}, "forbidden")     -> Generic { status: 403, .. }
pub fn classify(status: u16, rate_limit: &RateLimitInfo, body: &str) -> ApiError {
    match status {
        403 if rate_limit.remaining == Some(0) => ApiError::RateLimited {
            limit: rate_limit
                .limit
                .map(|l| l.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            reset: rate_limit.reset_display(),
        },
        409 => ApiError::RepositoryEmptyOrBranchMissing,
        404 => ApiError::NotFound,
        _ => ApiError::Generic {
            status,
            body: truncate_body(body),
        },
    }
}

// Keeps the first BODY_SNIPPET_CHARS characters of a body
//
// Cuts on a character boundary, so multi-byte text never panics.
fn truncate_body(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(BODY_SNIPPET_CHARS) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

// Anything that can go wrong while fetching one API resource
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    /// No response at all (DNS, TLS, connection refused, ...)
    #[error("network failure while requesting {url}: {reason}")]
    Network { url: String, reason: String },

    /// GitHub answered with an error status
    #[error("{failure} (requested {url})")]
    Api {
        url: String,
        failure: ApiError,
        rate_limit: RateLimitInfo,
    },

    /// GitHub answered 2xx but the body was not what we expected
    #[error("unexpected response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Network { .. } => ErrorKind::NetworkFailure,
            FetchError::Api { failure, .. } => failure.kind(),
            FetchError::Decode { .. } => ErrorKind::Generic,
        }
    }

    pub fn rate_limit(&self) -> Option<&RateLimitInfo> {
        match self {
            FetchError::Api { rate_limit, .. } => Some(rate_limit),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn quota(limit: u64, remaining: u64) -> RateLimitInfo {
        RateLimitInfo {
            limit: Some(limit),
            remaining: Some(remaining),
            reset: Some(1_700_000_000),
        }
    }

    #[test]
    fn test_exhausted_403_is_rate_limited() {
        let err = classify(403, &quota(60, 0), "{\"message\":\"API rate limit exceeded\"}");
        assert_eq!(err.kind(), ErrorKind::RateLimited);

        let message = err.to_string();
        assert!(message.contains("60"));
        assert!(message.contains("2023-11-14T22:13:20+00:00"));
        assert!(message.contains("access token"));
    }

    #[test]
    fn test_403_with_quota_left_is_generic() {
        let err = classify(403, &quota(60, 12), "forbidden");
        assert_eq!(
            err,
            ApiError::Generic {
                status: 403,
                body: "forbidden".to_string()
            }
        );
    }

    #[test]
    fn test_409_and_404() {
        let none = RateLimitInfo::default();
        assert_eq!(
            classify(409, &none, "").kind(),
            ErrorKind::RepositoryEmptyOrBranchMissing
        );

        let not_found = classify(404, &none, "");
        assert_eq!(not_found.kind(), ErrorKind::NotFound);
        let message = not_found.to_string();
        assert!(message.contains("owner"));
        assert!(message.contains("branch"));
        assert!(message.contains("private"));
    }

    #[test]
    fn test_generic_body_is_truncated() {
        let body = "x".repeat(500);
        match classify(500, &RateLimitInfo::default(), &body) {
            ApiError::Generic { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body.chars().count(), BODY_SNIPPET_CHARS + 3);
                assert!(body.ends_with("..."));
            }
            other => panic!("expected Generic, got {:?}", other),
        }
    }

    #[test]
    fn test_rate_limit_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-limit", HeaderValue::from_static("5000"));
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("4999"));
        headers.insert("x-ratelimit-reset", HeaderValue::from_static("not-a-number"));

        let info = RateLimitInfo::from_headers(&headers);
        assert_eq!(info.limit, Some(5000));
        assert_eq!(info.remaining, Some(4999));
        assert_eq!(info.reset, None);
        assert_eq!(
            info.quota_summary().as_deref(),
            Some("4999/5000 requests remaining")
        );
    }

    #[test]
    fn test_fetch_error_kinds() {
        let network = FetchError::Network {
            url: "https://api.github.com/repos/a/b".to_string(),
            reason: "connection refused".to_string(),
        };
        assert_eq!(network.kind(), ErrorKind::NetworkFailure);
        assert!(network.rate_limit().is_none());

        let decode = FetchError::Decode {
            url: "https://api.github.com/repos/a/b".to_string(),
            reason: "missing field".to_string(),
        };
        assert_eq!(decode.kind(), ErrorKind::Generic);
    }
}
