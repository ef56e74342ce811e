// Wire types for the Meshery server component-status endpoints.
//
// Every field is optional: the server omits or nulls fields freely, and
// validation of required parts happens in `meshwatch-core`.

use serde::{Deserialize, Serialize};

/// Status response and push-update payload.
///
/// Shape: `{ operator: { status, error: { code, description } },
/// broker: { status, version }, meshsync: { status, version } }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<OperatorReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broker: Option<ControllerReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meshsync: Option<ControllerReport>,
}

impl StatusPayload {
    /// `true` when no component section is present at all.
    pub fn is_empty(&self) -> bool {
        self.operator.is_none() && self.broker.is_none() && self.meshsync.is_none()
    }
}

/// Operator section of a [`StatusPayload`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OperatorErrorReport>,
}

/// Broker / meshsync section of a [`StatusPayload`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Structured error the operator reports inside an otherwise successful
/// response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorErrorReport {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Desired operator state for `POST /api/system/operator/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperatorTargetStatus {
    Enabled,
    Disabled,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChangeOperatorStatusRequest {
    pub target_status: OperatorTargetStatus,
}

/// Response of an operator state change.
///
/// Failures may arrive here with HTTP 200 as a populated `error`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorStatusResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<OperatorErrorReport>,
}
