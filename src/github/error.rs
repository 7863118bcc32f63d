//! GitHub API error types.
//!
//! Remote failures are categorized so callers can make retry decisions:
//!
//! - **Transient** errors (5xx, rate limits, network timeouts) may be retried
//!   by the caller; this crate never retries internally.
//! - **Permanent** errors (other 4xx: bad credential, bad reference) must not
//!   be retried.

use std::fmt;
use thiserror::Error;

/// The kind of GitHub API error, categorized for the caller's retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitHubErrorKind {
    /// Safe for the caller to retry with backoff.
    ///
    /// Examples:
    /// - HTTP 5xx (server errors)
    /// - HTTP 429 (rate limited)
    /// - HTTP 403 with rate limit messaging
    /// - Network timeouts
    Transient,

    /// Retrying will not help.
    ///
    /// Examples:
    /// - HTTP 404 (bad repository reference)
    /// - HTTP 401 / non-rate-limit 403 (bad credential)
    /// - Other 4xx
    Permanent,
}

impl GitHubErrorKind {
    /// Returns true if the caller may retry this error.
    pub fn is_retriable(&self) -> bool {
        matches!(self, GitHubErrorKind::Transient)
    }
}

/// A GitHub API error with categorization for retry decisions.
#[derive(Debug, Error)]
pub struct GitHubApiError {
    /// The kind of error (transient or permanent).
    pub kind: GitHubErrorKind,

    /// The HTTP status code, if available.
    pub status: Option<u16>,

    /// A human-readable description of the error.
    pub message: String,

    /// The underlying octocrab error, if available.
    #[source]
    pub source: Option<octocrab::Error>,
}

impl fmt::Display for GitHubApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(code) => write!(f, "GitHub API error (HTTP {}): {}", code, self.message),
            None => write!(f, "GitHub API error: {}", self.message),
        }
    }
}

impl GitHubApiError {
    /// Creates a permanent error without an octocrab source.
    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            kind: GitHubErrorKind::Permanent,
            status: None,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a transient error without an octocrab source.
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            kind: GitHubErrorKind::Transient,
            status: None,
            message: message.into(),
            source: None,
        }
    }

    /// Creates an error with an explicit status code, categorized by it.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: categorize_status(status, ""),
            status: Some(status),
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if this error indicates a rejected credential.
    ///
    /// 401 is always a credential failure; 403 is one unless it carries rate
    /// limit messaging (a rate-limited call can succeed later with the same
    /// token).
    pub fn is_credential_failure(&self) -> bool {
        match self.status {
            Some(401) => true,
            Some(403) => !is_rate_limit_message(&self.message),
            _ => false,
        }
    }

    /// Categorizes an octocrab error.
    ///
    /// The categorization is based on HTTP status codes where extractable,
    /// and message patterns for network-level failures.
    pub fn from_octocrab(err: octocrab::Error) -> Self {
        let status = extract_status_code(&err);
        let message = err.to_string();

        let kind = match status {
            Some(code) => categorize_status(code, &message),
            None => {
                // No status code - check if it's a network error
                if is_network_message(&message) {
                    GitHubErrorKind::Transient
                } else {
                    GitHubErrorKind::Permanent
                }
            }
        };

        Self {
            kind,
            status,
            message,
            source: Some(err),
        }
    }
}

/// Categorizes an HTTP status code, consulting the message for 403s.
fn categorize_status(status: u16, message: &str) -> GitHubErrorKind {
    match status {
        429 => GitHubErrorKind::Transient,
        403 if is_rate_limit_message(message) => GitHubErrorKind::Transient,
        500..=599 => GitHubErrorKind::Transient,
        _ => GitHubErrorKind::Permanent,
    }
}

/// Extracts the HTTP status code from an octocrab error, if present.
///
/// octocrab's `Error` type doesn't expose a stable status accessor across
/// all variants, so this falls back to message parsing for non-GitHub
/// variants. Returning `None` is safe: it results in conservative
/// categorization.
fn extract_status_code(err: &octocrab::Error) -> Option<u16> {
    if let octocrab::Error::GitHub { source, .. } = err {
        return Some(source.status_code.as_u16());
    }

    let err_str = err.to_string();
    if let Some(idx) = err_str.find("status: ") {
        let rest = &err_str[idx + 8..];
        let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
        if let Ok(code) = digits.parse() {
            return Some(code);
        }
    }

    None
}

/// Checks if an error message indicates a rate limit.
fn is_rate_limit_message(message: &str) -> bool {
    let message_lower = message.to_lowercase();
    message_lower.contains("rate limit")
        || message_lower.contains("api rate")
        || message_lower.contains("secondary rate")
        || message_lower.contains("abuse detection")
}

/// Checks if an error message indicates a network-level error.
fn is_network_message(message: &str) -> bool {
    let message_lower = message.to_lowercase();
    message_lower.contains("timeout")
        || message_lower.contains("connection")
        || message_lower.contains("network")
        || message_lower.contains("dns")
        || message_lower.contains("timed out")
}
