// ── Validated status updates ──
//
// `StatusPayload` is the permissive wire shape. `StatusUpdate` is what the
// reducer merges: the operator section is required, everything else has
// already been resolved to domain defaults.

use meshwatch_api::{ControllerReport, StatusPayload};

use super::status::{ComponentStatus, ConnectionStatus, OperatorError};
use crate::error::CoreError;

/// A status response or push update, validated and ready to merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub operator_status: ConnectionStatus,
    /// Set only when the operator actually reported something.
    pub operator_error: Option<OperatorError>,
    pub broker: ComponentStatus,
    pub meshsync: ComponentStatus,
}

impl TryFrom<StatusPayload> for StatusUpdate {
    type Error = CoreError;

    fn try_from(payload: StatusPayload) -> Result<Self, Self::Error> {
        let Some(operator) = payload.operator else {
            return Err(CoreError::MalformedResponse {
                message: "status payload has no operator section".into(),
            });
        };

        let operator_error = operator
            .error
            .map(OperatorError::from)
            .filter(OperatorError::is_reported);

        Ok(Self {
            operator_status: ConnectionStatus::from_wire(operator.status.as_deref()),
            operator_error,
            broker: controller_status(payload.broker.as_ref()),
            meshsync: controller_status(payload.meshsync.as_ref()),
        })
    }
}

fn controller_status(report: Option<&ControllerReport>) -> ComponentStatus {
    report.map_or_else(ComponentStatus::default, |r| {
        ComponentStatus::from_wire(r.status.as_deref(), r.version.as_deref())
    })
}
