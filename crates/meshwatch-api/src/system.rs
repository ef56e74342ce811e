// System endpoints
//
// Component status, adapter discovery, and operator lifecycle control.

use tracing::debug;

use crate::client::MesheryClient;
use crate::error::Error;
use crate::models::{
    ChangeOperatorStatusRequest, OperatorStatusResponse, OperatorTargetStatus, StatusPayload,
};

impl MesheryClient {
    /// Fetch the connection status of operator, broker, and meshsync.
    ///
    /// `GET /api/system/components/status`
    pub async fn fetch_components_status(&self) -> Result<StatusPayload, Error> {
        let url = self.api_url("system/components/status")?;
        debug!("fetching component status");
        self.get(url).await
    }

    /// List the adapters available on the server.
    ///
    /// `GET /api/system/adapters`
    ///
    /// Returns loosely-typed JSON; adapter records are passed through
    /// untouched.
    pub async fn fetch_available_adapters(&self) -> Result<Vec<serde_json::Value>, Error> {
        let url = self.api_url("system/adapters")?;
        debug!("fetching available adapters");
        self.get(url).await
    }

    /// Ask the server to enable or disable the operator.
    ///
    /// `POST /api/system/operator/status` with `{"targetStatus": "..."}`
    pub async fn change_operator_status(
        &self,
        target: OperatorTargetStatus,
    ) -> Result<OperatorStatusResponse, Error> {
        let url = self.api_url("system/operator/status")?;
        debug!(?target, "changing operator status");
        self.post(
            url,
            &ChangeOperatorStatusRequest {
                target_status: target,
            },
        )
        .await
    }
}
