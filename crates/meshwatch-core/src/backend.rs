// ── Backend collaborators ──
//
// The store never talks HTTP itself. Everything it needs from a Meshery
// server goes through `ComponentsBackend`, so tests and alternative
// transports can stand in for the real client.

use std::sync::Arc;

use async_trait::async_trait;
use meshwatch_api::{
    MesheryClient, OperatorEventsHandle, OperatorStatusResponse, OperatorTargetStatus,
    ReconnectConfig, StatusPayload, TlsMode, TransportConfig,
};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::{ControllerConfig, TlsVerification};
use crate::error::CoreError;

/// Invoked once per push update received on the operator-events stream.
pub type StatusCallback = Arc<dyn Fn(StatusPayload) + Send + Sync>;

/// Trait contract for the component-status backend.
#[async_trait]
pub trait ComponentsBackend: Send + Sync {
    async fn fetch_components_status(&self) -> Result<StatusPayload, CoreError>;

    /// Adapter records, passed through verbatim.
    async fn fetch_available_adapters(&self) -> Result<Vec<serde_json::Value>, CoreError>;

    async fn change_operator_status(
        &self,
        target: OperatorTargetStatus,
    ) -> Result<OperatorStatusResponse, CoreError>;

    /// Start delivering push updates to `callback` until `cancel` fires.
    ///
    /// Resolves once the subscription is established; an error means
    /// nothing was left running. Implementations cancel `cancel`
    /// themselves when the stream ends for good.
    async fn subscribe_operator_events(
        &self,
        callback: StatusCallback,
        cancel: CancellationToken,
    ) -> Result<(), CoreError>;
}

// ── Meshery server backend ───────────────────────────────────────────

/// [`ComponentsBackend`] over the Meshery server REST + WebSocket API.
#[derive(Debug, Clone)]
pub struct MesheryBackend {
    client: MesheryClient,
    reconnect: ReconnectConfig,
}

impl MesheryBackend {
    pub fn new(config: &ControllerConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            tls: tls_to_transport(&config.tls),
            timeout: config.timeout,
        };
        let client = MesheryClient::new(config.url.clone(), config.token.clone(), &transport)?;
        let reconnect = ReconnectConfig {
            max_retries: config.max_reconnect_attempts,
            handshake_timeout: config.timeout,
            ..ReconnectConfig::default()
        };
        Ok(Self { client, reconnect })
    }

    pub fn from_client(client: MesheryClient) -> Self {
        Self {
            client,
            reconnect: ReconnectConfig::default(),
        }
    }

    #[must_use]
    pub fn with_reconnect(mut self, reconnect: ReconnectConfig) -> Self {
        self.reconnect = reconnect;
        self
    }

    pub fn client(&self) -> &MesheryClient {
        &self.client
    }
}

#[async_trait]
impl ComponentsBackend for MesheryBackend {
    async fn fetch_components_status(&self) -> Result<StatusPayload, CoreError> {
        Ok(self.client.fetch_components_status().await?)
    }

    async fn fetch_available_adapters(&self) -> Result<Vec<serde_json::Value>, CoreError> {
        Ok(self.client.fetch_available_adapters().await?)
    }

    async fn change_operator_status(
        &self,
        target: OperatorTargetStatus,
    ) -> Result<OperatorStatusResponse, CoreError> {
        Ok(self.client.change_operator_status(target).await?)
    }

    async fn subscribe_operator_events(
        &self,
        callback: StatusCallback,
        cancel: CancellationToken,
    ) -> Result<(), CoreError> {
        let url = self.client.operator_events_url()?;
        debug!(%url, "subscribing to operator events");

        let handle = OperatorEventsHandle::connect(
            url,
            self.reconnect.clone(),
            cancel.child_token(),
            self.client.cookie_header(),
        )
        .await?;
        let rx = handle.subscribe();

        tokio::spawn(bridge(handle, rx, callback, cancel));
        Ok(())
    }
}

/// Forward broadcast updates to the callback until cancelled or the
/// stream ends. Either way `cancel` is fired on exit.
async fn bridge(
    handle: OperatorEventsHandle,
    mut rx: broadcast::Receiver<Arc<StatusPayload>>,
    callback: StatusCallback,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            msg = rx.recv() => match msg {
                Ok(payload) => callback(StatusPayload::clone(&payload)),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "operator event bridge lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("operator event stream closed");
                    break;
                }
            },
        }
    }
    handle.shutdown();
    // Tell the subscriber the stream is gone when it ended on its own.
    cancel.cancel();
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
