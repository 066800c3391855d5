//! Error and retry-policy types for the REST dispatcher.
//!
//! [`RestError`] wraps the exchange layer's errors unchanged and adds the
//! transport-level failures. [`RetryPolicy`] tells callers whether a failure is
//! worth retrying; this crate never retries on its own.

use std::time::Duration;

use exchange::ExchangeError;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest response body excerpt kept in [`RestError::Status`].
pub(crate) const BODY_SNIPPET_LIMIT: usize = 256;

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is safe to retry and, if so, after what delay.
///
/// ## Rules
///
/// - `Retryable`: timeouts, connection failures, `429 Too Many Requests`, `5xx`.
/// - `NonRetryable`: every codec or strategy-selection failure, every other
///   status, invalid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The operation may be retried.
    Retryable {
        /// Minimum back-off before the next attempt, from the `Retry-After`
        /// header. `None` means apply the caller's own back-off schedule.
        after: Option<Duration>,
    },
    /// The operation must not be retried.
    NonRetryable,
}

// ---------------------------------------------------------------------------
// REST errors
// ---------------------------------------------------------------------------

/// Errors returned by [`crate::RestClient`].
#[derive(Debug, Error)]
pub enum RestError {
    /// No strategy could encode the request / decode the response, or the
    /// selected strategy failed. Raised before any I/O for request bodies.
    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    /// Transport, timeout or DNS failure, passed through from `reqwest`.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status} for {route}\nResponse body (truncated): {body_snippet}")]
    Status {
        /// The route that was requested, e.g. `"GET /channels/1"`.
        route: String,
        /// Response status.
        status: StatusCode,
        /// Delay requested by the `Retry-After` header, if any.
        retry_after: Option<Duration>,
        /// Start of the response body.
        body_snippet: String,
    },

    /// A configured or negotiated value cannot be sent as a header.
    #[error("Invalid value for header '{name}'")]
    InvalidHeader {
        /// Header name.
        name: &'static str,
        /// Underlying parse failure.
        #[source]
        source: reqwest::header::InvalidHeaderValue,
    },

    /// The client configuration is invalid.
    ///
    /// Produced at construction; a client never exists with an invalid config.
    #[error("Invalid REST configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration problem.
        message: String,
    },
}

impl RestError {
    /// Returns the response status for [`RestError::Status`].
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RestError::Status { status, .. } => Some(*status),
            RestError::Transport(err) => err.status(),
            _ => None,
        }
    }

    /// Classifies the error for retry decisions.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            RestError::Status {
                status,
                retry_after,
                ..
            } if *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() => {
                RetryPolicy::Retryable {
                    after: *retry_after,
                }
            }
            RestError::Transport(err) if err.is_timeout() || err.is_connect() => {
                RetryPolicy::Retryable { after: None }
            }
            _ => RetryPolicy::NonRetryable,
        }
    }
}

/// Truncates `s` to at most `limit` characters for use in error messages.
pub(crate) fn snippet(s: &str, limit: usize) -> String {
    const ELLIPSIS: &str = "…";
    if s.chars().count() <= limit {
        s.to_string()
    } else {
        let mut out = s.chars().take(limit).collect::<String>();
        out.push_str(ELLIPSIS);
        out
    }
}
