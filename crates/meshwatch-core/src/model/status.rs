// ── Component status domain types ──

use std::fmt;

use meshwatch_api::OperatorErrorReport;
use serde::{Deserialize, Serialize};

/// Placeholder the server and store use for anything not yet known.
pub const UNKNOWN: &str = "UNKNOWN";

/// Connection status of a single component.
///
/// The backend speaks bare strings. Known values get their own variant;
/// anything else is preserved verbatim in [`ConnectionStatus::Other`] so
/// newer servers don't lose information on the way through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConnectionStatus {
    #[default]
    Unknown,
    Connected,
    Disconnected,
    Enabled,
    Disabled,
    Processing,
    Other(String),
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Unknown => UNKNOWN,
            Self::Connected => "CONNECTED",
            Self::Disconnected => "DISCONNECTED",
            Self::Enabled => "ENABLED",
            Self::Disabled => "DISABLED",
            Self::Processing => "PROCESSING",
            Self::Other(raw) => raw,
        }
    }

    /// `CONNECTED` or `ENABLED`.
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Connected | Self::Enabled)
    }

    /// Resolve an optional wire value; absent or empty means `UNKNOWN`.
    pub fn from_wire(raw: Option<&str>) -> Self {
        raw.map_or(Self::Unknown, Self::from)
    }
}

impl From<&str> for ConnectionStatus {
    fn from(raw: &str) -> Self {
        match raw {
            "" | UNKNOWN => Self::Unknown,
            "CONNECTED" => Self::Connected,
            "DISCONNECTED" => Self::Disconnected,
            "ENABLED" => Self::Enabled,
            "DISABLED" => Self::Disabled,
            "PROCESSING" => Self::Processing,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl From<String> for ConnectionStatus {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl From<ConnectionStatus> for String {
    fn from(status: ConnectionStatus) -> Self {
        match status {
            ConnectionStatus::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status record for the operator, meshsync, broker and server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentStatus {
    pub connection_status: ConnectionStatus,
    pub version: String,
}

impl ComponentStatus {
    pub fn new(connection_status: ConnectionStatus, version: impl Into<String>) -> Self {
        Self {
            connection_status,
            version: version.into(),
        }
    }

    /// Build from optional wire fields, falling back to `UNKNOWN` for
    /// absent or empty values.
    pub fn from_wire(status: Option<&str>, version: Option<&str>) -> Self {
        let version = match version {
            Some(v) if !v.is_empty() => v.to_owned(),
            _ => UNKNOWN.to_owned(),
        };
        Self {
            connection_status: ConnectionStatus::from_wire(status),
            version,
        }
    }
}

impl Default for ComponentStatus {
    fn default() -> Self {
        Self {
            connection_status: ConnectionStatus::Unknown,
            version: UNKNOWN.to_owned(),
        }
    }
}

/// Error reported by the operator itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorError {
    pub code: Option<String>,
    pub description: Option<String>,
}

impl OperatorError {
    /// An error counts as reported when either field carries text.
    pub fn is_reported(&self) -> bool {
        let present = |f: &Option<String>| f.as_deref().is_some_and(|s| !s.is_empty());
        present(&self.code) || present(&self.description)
    }
}

impl From<OperatorErrorReport> for OperatorError {
    fn from(report: OperatorErrorReport) -> Self {
        Self {
            code: report.code,
            description: report.description,
        }
    }
}

impl fmt::Display for OperatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code.as_deref(), self.description.as_deref()) {
            (Some(code), Some(desc)) if !code.is_empty() => write!(f, "[{code}] {desc}"),
            (Some(code), _) if !code.is_empty() => f.write_str(code),
            (_, Some(desc)) => f.write_str(desc),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn known_and_unknown_values_parse() {
        assert_eq!(ConnectionStatus::from("ENABLED"), ConnectionStatus::Enabled);
        assert_eq!(ConnectionStatus::from(""), ConnectionStatus::Unknown);
        assert_eq!(
            ConnectionStatus::from("DEPLOYING"),
            ConnectionStatus::Other("DEPLOYING".into())
        );
        assert_eq!(ConnectionStatus::from_wire(None), ConnectionStatus::Unknown);
    }

    #[test]
    fn status_serializes_as_bare_string() {
        let json = serde_json::to_value(ConnectionStatus::Connected).unwrap();
        assert_eq!(json, serde_json::json!("CONNECTED"));

        let other: ConnectionStatus = serde_json::from_str("\"WEIRD\"").unwrap();
        assert_eq!(other.to_string(), "WEIRD");
    }

    #[test]
    fn component_from_wire_defaults_empty_fields() {
        let c = ComponentStatus::from_wire(Some(""), Some(""));
        assert_eq!(c, ComponentStatus::default());

        let c = ComponentStatus::from_wire(Some("CONNECTED"), Some("2.10.1"));
        assert_eq!(c.connection_status, ConnectionStatus::Connected);
        assert_eq!(c.version, "2.10.1");
    }

    #[test]
    fn operator_error_reported_only_with_text() {
        assert!(!OperatorError::default().is_reported());
        assert!(
            !OperatorError {
                code: Some(String::new()),
                description: Some(String::new()),
            }
            .is_reported()
        );
        let err = OperatorError {
            code: Some("OP-1".into()),
            description: None,
        };
        assert!(err.is_reported());
        assert_eq!(err.to_string(), "OP-1");
    }
}
