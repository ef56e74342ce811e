// ── Runtime connection configuration ──
//
// These types describe *how* to talk to a Meshery server. They carry the
// provider token and connection tuning, but never touch disk. The CLI
// constructs a `ControllerConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// Default Meshery server address.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:9081";

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

/// Configuration for talking to a single Meshery server.
///
/// Built by the CLI, passed to `Controller` -- core never reads config files.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Server URL (e.g., `http://localhost:9081`).
    pub url: Url,
    /// Provider token, sent as the `token` cookie.
    pub token: Option<SecretString>,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// Subscribe to operator events on start.
    pub websocket_enabled: bool,
    /// Status polling interval while no subscription is live (seconds). 0 = never.
    pub poll_interval_secs: u64,
    /// Give up reconnecting the operator-events stream after this many
    /// failed attempts. `None` retries forever.
    pub max_reconnect_attempts: Option<u32>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            url: Url::parse(DEFAULT_SERVER_URL).expect("default server URL is valid"),
            token: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            websocket_enabled: true,
            poll_interval_secs: 10,
            max_reconnect_attempts: None,
        }
    }
}
