//! GitHub API error types.
//!
//! Errors are split into transient and permanent so the retry loop knows
//! which failures are worth another attempt:
//!
//! - **Transient** errors are retriable (5xx, rate limits, timeouts, network)
//! - **Permanent** errors are not (bad token, unknown repository, bad payload)

use std::fmt;
use thiserror::Error;

/// The kind of GitHub API error, categorized for retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitHubErrorKind {
    /// Safe to retry with backoff.
    ///
    /// Examples:
    /// - HTTP 5xx (server errors)
    /// - HTTP 429 (rate limited)
    /// - HTTP 403 with a rate limit message
    /// - Timeouts and connection failures
    Transient,

    /// Retrying will not help.
    ///
    /// Examples:
    /// - HTTP 401 (bad or expired token)
    /// - HTTP 404 (unknown repository or release)
    /// - HTTP 422 (rejected dispatch payload)
    /// - GraphQL errors in a 200 response
    Permanent,
}

impl GitHubErrorKind {
    pub fn is_retriable(&self) -> bool {
        matches!(self, GitHubErrorKind::Transient)
    }
}

/// A GitHub API error with categorization for retry decisions.
#[derive(Debug, Error)]
pub struct GitHubApiError {
    pub kind: GitHubErrorKind,

    /// The HTTP status code, if available.
    pub status_code: Option<u16>,

    pub message: String,

    /// The underlying octocrab error, if available.
    #[source]
    pub source: Option<octocrab::Error>,
}

impl fmt::Display for GitHubApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "GitHub API error (HTTP {}): {}", code, self.message),
            None => write!(f, "GitHub API error: {}", self.message),
        }
    }
}

impl GitHubApiError {
    /// Creates a permanent error without an octocrab source.
    pub fn permanent_without_source(message: impl Into<String>) -> Self {
        Self {
            kind: GitHubErrorKind::Permanent,
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a transient error without an octocrab source.
    pub fn transient_without_source(message: impl Into<String>) -> Self {
        Self {
            kind: GitHubErrorKind::Transient,
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    /// Categorizes an octocrab error.
    pub fn from_octocrab(err: octocrab::Error) -> Self {
        let status_code = match &err {
            octocrab::Error::GitHub { source, .. } => Some(source.status_code.as_u16()),
            _ => None,
        };
        let message = match &err {
            octocrab::Error::GitHub { source, .. } => source.message.clone(),
            other => other.to_string(),
        };

        let kind = categorize(status_code, &message);

        Self {
            kind,
            status_code,
            message,
            source: Some(err),
        }
    }
}

/// Picks the error kind from a status code and message.
fn categorize(status_code: Option<u16>, message: &str) -> GitHubErrorKind {
    match status_code {
        Some(429) => GitHubErrorKind::Transient,
        Some(403) if is_rate_limit_error(message) => GitHubErrorKind::Transient,
        Some(code) if (500..600).contains(&code) => GitHubErrorKind::Transient,
        Some(_) => GitHubErrorKind::Permanent,
        None if is_network_error(message) => GitHubErrorKind::Transient,
        None => GitHubErrorKind::Permanent,
    }
}

/// Checks if an error message indicates a rate limit.
fn is_rate_limit_error(message: &str) -> bool {
    let message_lower = message.to_lowercase();
    message_lower.contains("rate limit")
        || message_lower.contains("secondary rate")
        || message_lower.contains("abuse detection")
}

/// Checks if an error message indicates a network-level error.
fn is_network_error(message: &str) -> bool {
    let message_lower = message.to_lowercase();
    message_lower.contains("timeout")
        || message_lower.contains("timed out")
        || message_lower.contains("connection")
        || message_lower.contains("network")
        || message_lower.contains("dns")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_transient() {
        for code in [500, 502, 503, 504] {
            assert_eq!(categorize(Some(code), "oops"), GitHubErrorKind::Transient);
        }
        assert_eq!(categorize(Some(429), ""), GitHubErrorKind::Transient);
    }

    #[test]
    fn client_errors_are_permanent() {
        for code in [400, 401, 404, 422] {
            assert_eq!(categorize(Some(code), "nope"), GitHubErrorKind::Permanent);
        }
    }

    #[test]
    fn forbidden_depends_on_rate_limit_message() {
        assert_eq!(
            categorize(Some(403), "API rate limit exceeded"),
            GitHubErrorKind::Transient
        );
        assert_eq!(
            categorize(Some(403), "Resource not accessible by integration"),
            GitHubErrorKind::Permanent
        );
    }

    #[test]
    fn statusless_errors_depend_on_message() {
        assert_eq!(
            categorize(None, "connection reset by peer"),
            GitHubErrorKind::Transient
        );
        assert_eq!(categorize(None, "request timed out"), GitHubErrorKind::Transient);
        assert_eq!(
            categorize(None, "failed to deserialize"),
            GitHubErrorKind::Permanent
        );
    }

    #[test]
    fn rate_limit_detection() {
        assert!(is_rate_limit_error("API rate limit exceeded"));
        assert!(is_rate_limit_error("secondary rate limit"));
        assert!(is_rate_limit_error("abuse detection mechanism"));
        assert!(!is_rate_limit_error("Permission denied"));
    }

    #[test]
    fn display_includes_status() {
        let mut err = GitHubApiError::permanent_without_source("Not Found");
        assert_eq!(err.to_string(), "GitHub API error: Not Found");
        err.status_code = Some(404);
        assert_eq!(err.to_string(), "GitHub API error (HTTP 404): Not Found");
    }

    #[test]
    fn error_kind_retriable() {
        assert!(GitHubErrorKind::Transient.is_retriable());
        assert!(!GitHubErrorKind::Permanent.is_retriable());
    }
}
