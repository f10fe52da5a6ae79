// ── Core error types ──
//
// User-facing errors from limwatch-core. Consumers never see raw HTTP
// status codes or JSON parse failures directly -- the
// `From<limwatch_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Validation errors (no network call was made) ─────────────────
    #[error("'{input}' is not a valid IP address (format: xxx.xxx.xxx.xxx with values 0-255)")]
    InvalidIp { input: String },

    #[error("{ip} is already in the block list")]
    AlreadyBlocked { ip: String },

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach limiter at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request to the limiter timed out")]
    Timeout,

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("Limiter error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<limwatch_api::Error> for CoreError {
    fn from(err: limwatch_api::Error) -> Self {
        match err {
            limwatch_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            limwatch_api::Error::InvalidUrl(e) => CoreError::Internal(format!("invalid URL: {e}")),
            limwatch_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            limwatch_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("deserialization error: {message}"))
            }
        }
    }
}
