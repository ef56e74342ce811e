// ── Core error types ──
//
// User-facing errors from meshwatch-core. Consumers never see HTTP status
// handling or JSON parse failures directly; the `From<meshwatch_api::Error>`
// impl translates transport-layer errors into domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to server at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Server request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Operator event subscription failed: {reason}")]
    SubscriptionFailed { reason: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Malformed status response: {message}")]
    MalformedResponse { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<meshwatch_api::Error> for CoreError {
    fn from(err: meshwatch_api::Error) -> Self {
        match err {
            meshwatch_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            meshwatch_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
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
            meshwatch_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            meshwatch_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            meshwatch_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            meshwatch_api::Error::WebSocketConnect(reason) => {
                CoreError::SubscriptionFailed { reason }
            }
            meshwatch_api::Error::Deserialization { message, body: _ } => {
                CoreError::MalformedResponse { message }
            }
        }
    }
}
