// ── Core error types ──
//
// Errors that abort a whole command. Per-record failures never surface
// here: the reconciler folds them into an `Outcome::Error` and a counter.
// The `From<climasync_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out")]
    Timeout,

    // ── Remote errors ────────────────────────────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Local inputs ─────────────────────────────────────────────────
    #[error("Cannot read source file {path}: {reason}")]
    Source { path: String, reason: String },

    #[error("Template error: {message}")]
    Template { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Console ──────────────────────────────────────────────────────
    #[error("Console command '{command}' failed: {message}")]
    Console { command: String, message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether this error came from the remote side being unreachable.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::ConnectionFailed { .. } | Self::Timeout)
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<climasync_api::Error> for CoreError {
    fn from(err: climasync_api::Error) -> Self {
        match err {
            climasync_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            climasync_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            climasync_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            climasync_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            climasync_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            climasync_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
            climasync_api::Error::Console { command, message } => {
                CoreError::Console { command, message }
            }
        }
    }
}
