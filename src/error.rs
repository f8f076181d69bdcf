//! Error taxonomy for translation backends.
//!
//! Adapters return these errors; the dispatcher never lets them reach the
//! caller. They are folded into a [`TranslationStatus`](crate::engine::TranslationStatus)
//! and, for fatal kinds, into the abort reason of a dispatch run.

use std::time::Duration;

use thiserror::Error;

/// Errors a translation backend can produce for one call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
    /// Timeout, connection failure, or an unexpected HTTP status.
    #[error("Network error: {0}")]
    Network(String),

    /// The backend rejected the call because of a rate or quota limit.
    #[error("Quota exceeded: {message}")]
    QuotaExceeded {
        /// Suggested wait before retrying, when the backend sends one.
        retry_after: Option<Duration>,
        /// Message from the backend.
        message: String,
    },

    /// The backend answered but produced no usable text.
    #[error("Backend returned an empty response")]
    EmptyResponse,

    /// The response (or a batch delimiter) could not be understood.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// API key missing or rejected.
    #[error("Misconfigured credential: {0}")]
    MisconfiguredCredential(String),
}

impl TranslateError {
    /// Returns `true` for errors that will not go away on the next paragraph.
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::QuotaExceeded { .. } | Self::MisconfiguredCredential(_)
        )
    }

    /// Retry hint carried by [`TranslateError::QuotaExceeded`].
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::QuotaExceeded { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Short label used inside status tags, e.g. `DeepL (Error: quota exceeded)`.
    pub const fn short_reason(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::QuotaExceeded { .. } => "quota exceeded",
            Self::EmptyResponse => "empty response",
            Self::Parse(_) => "parse",
            Self::MisconfiguredCredential(_) => "credential",
        }
    }

    /// Maps a non-success HTTP status to the taxonomy.
    ///
    /// `retry_after` is the raw `Retry-After` header value, if any.
    pub fn from_status(status: u16, retry_after: Option<&str>, body: &str) -> Self {
        let message = format!("HTTP {status}: {}", body.trim());
        match status {
            // 456 is DeepL's "quota exceeded"
            429 | 456 => Self::QuotaExceeded {
                retry_after: retry_after
                    .and_then(|v| v.trim().parse::<u64>().ok())
                    .map(Duration::from_secs),
                message,
            },
            401 | 403 => Self::MisconfiguredCredential(message),
            _ => Self::Network(message),
        }
    }
}

impl From<reqwest::Error> for TranslateError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Parse(error.to_string())
        } else {
            Self::Network(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_rate_limit_with_retry_after() {
        let err = TranslateError::from_status(429, Some("30"), "slow down");
        assert_eq!(err.retry_after(), Some(Duration::from_secs(30)));
        assert!(err.is_fatal());
        assert_eq!(err.short_reason(), "quota exceeded");
    }

    #[test]
    fn test_from_status_deepl_quota() {
        let err = TranslateError::from_status(456, None, "Quota exceeded");
        assert!(matches!(
            err,
            TranslateError::QuotaExceeded {
                retry_after: None,
                ..
            }
        ));
    }

    #[test]
    fn test_from_status_unparseable_retry_after() {
        let err = TranslateError::from_status(429, Some("Wed, 21 Oct 2026 07:28:00 GMT"), "");
        assert_eq!(err.retry_after(), None);
    }

    #[test]
    fn test_from_status_auth() {
        let err = TranslateError::from_status(403, None, "forbidden");
        assert!(matches!(err, TranslateError::MisconfiguredCredential(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_from_status_server_error_is_network() {
        let err = TranslateError::from_status(502, None, "bad gateway");
        assert!(matches!(err, TranslateError::Network(_)));
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("502"));
    }

    #[test]
    fn test_non_fatal_kinds() {
        assert!(!TranslateError::EmptyResponse.is_fatal());
        assert!(!TranslateError::Parse("x".into()).is_fatal());
    }
}
