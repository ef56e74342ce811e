//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use meshwatch_config::ConfigError;
use meshwatch_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to Meshery server at {url}")]
    #[diagnostic(
        code(meshwatch::connection_failed),
        help(
            "Check that the Meshery server is running and reachable.\n\
             URL: {url}\n\
             Try: meshwatch status --server http://localhost:9081"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("TLS error: {reason}")]
    #[diagnostic(
        code(meshwatch::tls_error),
        help(
            "The server certificate could not be verified.\n\
             Use --insecure (-k) to accept it, or configure ca_cert in your profile."
        )
    )]
    TlsError { reason: String },

    #[error("Operator event stream unavailable: {reason}")]
    #[diagnostic(
        code(meshwatch::subscription_failed),
        help("Use `meshwatch watch --no-events` to fall back to polling.")
    )]
    SubscriptionFailed { reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed")]
    #[diagnostic(
        code(meshwatch::auth_failed),
        help(
            "The server rejected the provider token.\n\
             Run: meshwatch config set-token --profile {profile}"
        )
    )]
    AuthFailed { profile: String },

    // ── Server responses ─────────────────────────────────────────────
    #[error("API error ({status}): {message}")]
    #[diagnostic(code(meshwatch::api_error))]
    ApiError { status: String, message: String },

    #[error("Unexpected response from server: {message}")]
    #[diagnostic(
        code(meshwatch::malformed_response),
        help("The server answered, but not with a component status. Check the server version.")
    )]
    MalformedResponse { message: String },

    #[error("Operator reported an error: {detail}")]
    #[diagnostic(code(meshwatch::operator_error))]
    OperatorRejected { detail: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(meshwatch::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(meshwatch::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: meshwatch config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(meshwatch::no_config),
        help(
            "Create one with: meshwatch config init\n\
             Or pass --server / set MESHWATCH_SERVER.\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(meshwatch::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(meshwatch::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(meshwatch::timeout),
        help("Increase timeout with --timeout or check server responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. }
            | Self::TlsError { .. }
            | Self::SubscriptionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Fill in details the core layer doesn't know about.
    #[must_use]
    pub fn with_context(self, profile: &str, timeout_secs: u64) -> Self {
        match self {
            Self::AuthFailed { .. } => Self::AuthFailed {
                profile: profile.into(),
            },
            Self::Timeout { seconds: 0 } => Self::Timeout {
                seconds: timeout_secs,
            },
            other => other,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => {
                if reason.starts_with("TLS error") {
                    CliError::TlsError { reason }
                } else {
                    CliError::ConnectionFailed {
                        url,
                        source: reason.into(),
                    }
                }
            }

            CoreError::AuthenticationFailed { message: _ } => CliError::AuthFailed {
                profile: "current".into(),
            },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::SubscriptionFailed { reason } => CliError::SubscriptionFailed { reason },

            CoreError::MalformedResponse { message } => CliError::MalformedResponse { message },

            CoreError::Api { message, status } => CliError::ApiError {
                status: status.map_or_else(|| "-".into(), |s| s.to_string()),
                message,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::ProfileNotFound { name } => CliError::ProfileNotFound {
                name,
                available: String::new(),
            },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_kind() {
        let auth = CliError::from(CoreError::AuthenticationFailed {
            message: "401".into(),
        });
        assert_eq!(auth.exit_code(), exit_code::AUTH);

        let conn = CliError::from(CoreError::ConnectionFailed {
            url: "http://localhost:9081".into(),
            reason: "refused".into(),
        });
        assert_eq!(conn.exit_code(), exit_code::CONNECTION);

        let malformed = CliError::from(CoreError::MalformedResponse {
            message: "no operator".into(),
        });
        assert_eq!(malformed.exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn context_fills_profile_and_timeout() {
        let err = CliError::from(CoreError::Timeout { timeout_secs: 0 }).with_context("lab", 12);
        assert!(matches!(err, CliError::Timeout { seconds: 12 }));
        assert_eq!(err.exit_code(), exit_code::TIMEOUT);

        let err = CliError::AuthFailed {
            profile: "current".into(),
        }
        .with_context("lab", 12);
        assert!(matches!(err, CliError::AuthFailed { ref profile } if profile == "lab"));
    }

    #[test]
    fn tls_failures_are_distinguished() {
        let err = CliError::from(CoreError::ConnectionFailed {
            url: String::new(),
            reason: "TLS error: bad CA".into(),
        });
        assert!(matches!(err, CliError::TlsError { .. }));
    }
}
