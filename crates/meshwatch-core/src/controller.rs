// ── Controller ──
//
// Owns the store and the backend, and drives the async operations by
// dispatching their pending/fulfilled/rejected phases around each
// backend call.

use std::sync::Arc;
use std::time::Duration;

use meshwatch_api::{OperatorStatusResponse, OperatorTargetStatus, StatusPayload};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::backend::{ComponentsBackend, MesheryBackend, StatusCallback};
use crate::config::ControllerConfig;
use crate::error::CoreError;
use crate::model::{Adapter, StatusUpdate};
use crate::store::{Action, AsyncPhase, ComponentStore, ComponentsState, SubscriptionId};
use crate::stream::StateStream;

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Runs the component-status
/// operations against a backend, keeps the live operator subscription,
/// and owns the background poll task.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ControllerConfig,
    store: Arc<ComponentStore>,
    backend: Arc<dyn ComponentsBackend>,
    cancel: CancellationToken,
    /// Child token for the current `start()`; replaced on restart.
    cancel_child: Mutex<CancellationToken>,
    /// Live subscription and the token that tears it down.
    subscription: Mutex<Option<(SubscriptionId, CancellationToken)>>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Controller {
    /// Create a controller talking to the Meshery server in `config`.
    /// Does not perform any request -- call [`start()`](Self::start).
    pub fn new(config: ControllerConfig) -> Result<Self, CoreError> {
        let backend = MesheryBackend::new(&config)?;
        Ok(Self::with_backend(config, Arc::new(backend)))
    }

    /// Create a controller over an arbitrary backend.
    pub fn with_backend(config: ControllerConfig, backend: Arc<dyn ComponentsBackend>) -> Self {
        let cancel = CancellationToken::new();
        let cancel_child = cancel.child_token();
        Self {
            inner: Arc::new(ControllerInner {
                config,
                store: Arc::new(ComponentStore::new()),
                backend,
                cancel,
                cancel_child: Mutex::new(cancel_child),
                subscription: Mutex::new(None),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<ComponentStore> {
        &self.inner.store
    }

    /// Current state snapshot.
    pub fn state(&self) -> Arc<ComponentsState> {
        self.inner.store.snapshot()
    }

    /// Subscribe to state changes.
    pub fn subscribe_state(&self) -> StateStream {
        self.inner.store.subscribe()
    }

    // ── Operations ───────────────────────────────────────────────

    /// Fetch the component status and merge it into the store.
    ///
    /// A response without an operator section counts as a failure: the
    /// fetch is rejected and `MalformedResponse` returned.
    pub async fn fetch_components_status(&self) -> Result<(), CoreError> {
        let store = &self.inner.store;
        store.dispatch(Action::FetchComponentsStatus(AsyncPhase::Pending));

        let result = self
            .inner
            .backend
            .fetch_components_status()
            .await
            .and_then(StatusUpdate::try_from);

        match result {
            Ok(update) => {
                debug!(operator = %update.operator_status, "component status fetched");
                store.dispatch(Action::FetchComponentsStatus(AsyncPhase::Fulfilled(update)));
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "component status fetch failed");
                store.dispatch(Action::FetchComponentsStatus(AsyncPhase::Rejected(
                    e.to_string(),
                )));
                Err(e)
            }
        }
    }

    /// Fetch the adapter list, replacing the stored one on success.
    pub async fn fetch_available_adapters(&self) -> Result<(), CoreError> {
        let store = &self.inner.store;
        store.dispatch(Action::FetchAvailableAdapters(AsyncPhase::Pending));

        match self.inner.backend.fetch_available_adapters().await {
            Ok(records) => {
                debug!(count = records.len(), "adapters fetched");
                let adapters = records.into_iter().map(Adapter::from).collect();
                store.dispatch(Action::FetchAvailableAdapters(AsyncPhase::Fulfilled(
                    adapters,
                )));
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "adapters fetch failed");
                store.dispatch(Action::FetchAvailableAdapters(AsyncPhase::Rejected(
                    e.to_string(),
                )));
                Err(e)
            }
        }
    }

    /// Ask the server to enable or disable the operator.
    ///
    /// The store only tracks that the request is in flight; the server's
    /// answer is returned to the caller.
    pub async fn change_operator_state(
        &self,
        target: OperatorTargetStatus,
    ) -> Result<OperatorStatusResponse, CoreError> {
        let store = &self.inner.store;
        store.dispatch(Action::ChangeOperatorState(AsyncPhase::Pending));

        match self.inner.backend.change_operator_status(target).await {
            Ok(response) => {
                info!(?target, status = ?response.status, "operator state change requested");
                store.dispatch(Action::ChangeOperatorState(AsyncPhase::Fulfilled(())));
                Ok(response)
            }
            Err(e) => {
                warn!(?target, error = %e, "operator state change failed");
                store.dispatch(Action::ChangeOperatorState(AsyncPhase::Rejected(
                    e.to_string(),
                )));
                Err(e)
            }
        }
    }

    /// Subscribe to operator events, handing every push update to
    /// `callback`. Any previous subscription is torn down first.
    pub async fn initialise_operator_status_subscription(
        &self,
        callback: StatusCallback,
    ) -> Result<SubscriptionId, CoreError> {
        let store = &self.inner.store;
        store.dispatch(Action::InitialiseOperatorStatusSubscription(
            AsyncPhase::Pending,
        ));

        let mut slot = self.inner.subscription.lock().await;
        if let Some((old, token)) = slot.take() {
            debug!(subscription = %old, "replacing operator subscription");
            token.cancel();
        }

        let token = self.inner.cancel.child_token();
        match self
            .inner
            .backend
            .subscribe_operator_events(callback, token.clone())
            .await
        {
            Ok(()) => {
                let id = SubscriptionId::new();
                *slot = Some((id, token.clone()));
                // Dispatch under `slot` so a queued dispose lands after us.
                store.dispatch(Action::InitialiseOperatorStatusSubscription(
                    AsyncPhase::Fulfilled(id),
                ));
                drop(slot);
                info!(subscription = %id, "operator subscription live");

                let ctrl = self.clone();
                self.track_task(tokio::spawn(subscription_watch_task(ctrl, id, token)))
                    .await;
                Ok(id)
            }
            Err(e) => {
                token.cancel();
                store.dispatch(Action::InitialiseOperatorStatusSubscription(
                    AsyncPhase::Rejected(e.to_string()),
                ));
                drop(slot);
                warn!(error = %e, "operator subscription failed");
                Err(e)
            }
        }
    }

    /// Subscribe with a callback that merges every push update into the
    /// store. Malformed updates are logged and dropped.
    pub async fn subscribe_operator_status(&self) -> Result<SubscriptionId, CoreError> {
        let store = Arc::clone(&self.inner.store);
        let callback: StatusCallback = Arc::new(move |payload: StatusPayload| {
            if let Err(e) = store.update_connection_status(payload) {
                warn!(error = %e, "dropping operator event");
            }
        });
        self.initialise_operator_status_subscription(callback).await
    }

    /// Tear down the live subscription. Returns `false` if there was none.
    pub async fn dispose_operator_status_subscription(&self) -> bool {
        let mut slot = self.inner.subscription.lock().await;
        let Some((id, token)) = slot.take() else {
            return false;
        };
        token.cancel();
        self.inner.store.dispatch(Action::SubscriptionDisposed);
        drop(slot);
        info!(subscription = %id, "operator subscription disposed");
        true
    }

    /// Validate and merge a status update into the store.
    pub fn update_connection_status(&self, payload: StatusPayload) -> Result<(), CoreError> {
        self.inner.store.update_connection_status(payload)
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Initial fetch, then subscription and polling per configuration.
    ///
    /// Only the status fetch is fatal; adapters and the subscription
    /// degrade to warnings (polling covers for a missing subscription).
    pub async fn start(&self) -> Result<(), CoreError> {
        let config = &self.inner.config;
        info!(url = %config.url, "starting component status controller");

        self.fetch_components_status().await?;

        if let Err(e) = self.fetch_available_adapters().await {
            warn!(error = %e, "adapters unavailable (non-fatal)");
        }

        if config.websocket_enabled {
            if let Err(e) = self.subscribe_operator_status().await {
                warn!(error = %e, "operator events unavailable, relying on polling");
            }
        }

        let interval_secs = config.poll_interval_secs;
        if interval_secs > 0 {
            let cancel = {
                let mut child = self.inner.cancel_child.lock().await;
                if child.is_cancelled() {
                    *child = self.inner.cancel.child_token();
                }
                child.clone()
            };
            let ctrl = self.clone();
            self.track_task(tokio::spawn(poll_task(ctrl, interval_secs, cancel)))
                .await;
        }

        Ok(())
    }

    /// Dispose the subscription and stop background tasks.
    pub async fn shutdown(&self) {
        self.dispose_operator_status_subscription().await;
        self.inner.cancel_child.lock().await.cancel();

        let handles: Vec<_> = self.inner.task_handles.lock().await.drain(..).collect();
        for handle in handles {
            let _ = handle.await;
        }
        debug!("controller shut down");
    }

    /// Run a single closure against a fresh controller without
    /// subscription or polling, then shut down.
    pub async fn oneshot<F, Fut, T>(config: ControllerConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Controller) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.websocket_enabled = false;
        cfg.poll_interval_secs = 0;

        let controller = Controller::new(cfg)?;
        let result = f(controller.clone()).await;
        controller.shutdown().await;
        result
    }

    /// Keep `handle` for `shutdown`, forgetting tasks that already ended.
    async fn track_task(&self, handle: JoinHandle<()>) {
        let mut handles = self.inner.task_handles.lock().await;
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
    }

    /// Clear the subscription if `id` is still the live one.
    async fn subscription_ended(&self, id: SubscriptionId) {
        let mut slot = self.inner.subscription.lock().await;
        if slot.as_ref().is_some_and(|(live, _)| *live == id) {
            *slot = None;
            self.inner.store.dispatch(Action::SubscriptionDisposed);
            drop(slot);
            warn!(subscription = %id, "operator event stream ended");
        }
    }
}

impl Drop for ControllerInner {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ── Background tasks ─────────────────────────────────────────────────

/// Refetch status periodically while no subscription is delivering updates.
async fn poll_task(controller: Controller, interval_secs: u64, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if controller.state().subscription.initialised {
                    continue;
                }
                if let Err(e) = controller.fetch_components_status().await {
                    warn!(error = %e, "periodic status poll failed");
                }
            }
        }
    }
}

/// Wait for a subscription's token to fire; if the backend ended the
/// stream on its own, reflect that in the store.
async fn subscription_watch_task(controller: Controller, id: SubscriptionId, token: CancellationToken) {
    token.cancelled().await;
    controller.subscription_ended(id).await;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use meshwatch_api::{OperatorErrorReport, OperatorReport};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use tokio::sync::Notify;

    use super::*;
    use crate::model::{ComponentStatus, ConnectionStatus};

    // ── Mock backend ────────────────────────────────────────────────

    #[derive(Default)]
    struct MockBackend {
        /// `None` makes the fetch fail.
        status: StdMutex<Option<StatusPayload>>,
        adapters: StdMutex<Option<Vec<Value>>>,
        refuse_subscription: bool,
        /// When set, the status fetch waits for a notification.
        status_gate: Option<Arc<Notify>>,
        status_calls: AtomicUsize,
        /// When set, subscribing waits for a notification.
        subscribe_gate: Option<Arc<Notify>>,
        subscribe_calls: AtomicUsize,
        subscriber: StdMutex<Option<(StatusCallback, CancellationToken)>>,
    }

    fn failure() -> CoreError {
        CoreError::Api {
            message: "mock failure".into(),
            status: Some(500),
        }
    }

    #[async_trait]
    impl ComponentsBackend for MockBackend {
        async fn fetch_components_status(&self) -> Result<StatusPayload, CoreError> {
            self.status_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.status_gate {
                gate.notified().await;
            }
            self.status.lock().unwrap().clone().ok_or_else(failure)
        }

        async fn fetch_available_adapters(&self) -> Result<Vec<Value>, CoreError> {
            self.adapters.lock().unwrap().clone().ok_or_else(failure)
        }

        async fn change_operator_status(
            &self,
            target: OperatorTargetStatus,
        ) -> Result<OperatorStatusResponse, CoreError> {
            let status = match target {
                OperatorTargetStatus::Enabled => "ENABLED",
                OperatorTargetStatus::Disabled => "DISABLED",
            };
            Ok(OperatorStatusResponse {
                status: Some(status.into()),
                error: None,
            })
        }

        async fn subscribe_operator_events(
            &self,
            callback: StatusCallback,
            cancel: CancellationToken,
        ) -> Result<(), CoreError> {
            self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.subscribe_gate {
                gate.notified().await;
            }
            if self.refuse_subscription {
                return Err(CoreError::SubscriptionFailed {
                    reason: "refused".into(),
                });
            }
            *self.subscriber.lock().unwrap() = Some((callback, cancel));
            Ok(())
        }
    }

    impl MockBackend {
        fn push(&self, value: Value) {
            let (callback, _) = self.subscriber.lock().unwrap().clone().unwrap();
            callback(serde_json::from_value(value).unwrap());
        }

        fn subscriber_token(&self) -> CancellationToken {
            self.subscriber.lock().unwrap().as_ref().unwrap().1.clone()
        }
    }

    fn healthy_payload() -> StatusPayload {
        serde_json::from_value(json!({
            "operator": { "status": "ENABLED" },
            "broker": { "status": "CONNECTED", "version": "2.10.1" },
            "meshsync": { "status": "ENABLED", "version": "v0.6.24" }
        }))
        .unwrap()
    }

    fn controller(backend: &Arc<MockBackend>) -> Controller {
        let config = ControllerConfig {
            poll_interval_secs: 0,
            ..ControllerConfig::default()
        };
        Controller::with_backend(config, Arc::clone(backend) as Arc<dyn ComponentsBackend>)
    }

    // ── Fetch operations ────────────────────────────────────────────

    #[tokio::test]
    async fn fetch_status_merges_into_store() {
        let backend = Arc::new(MockBackend::default());
        *backend.status.lock().unwrap() = Some(healthy_payload());
        let ctrl = controller(&backend);

        ctrl.fetch_components_status().await.unwrap();

        let state = ctrl.state();
        assert!(!state.loading());
        assert_eq!(state.operator.connection_status, ConnectionStatus::Enabled);
        assert_eq!(
            state.broker,
            ComponentStatus::new(ConnectionStatus::Connected, "2.10.1")
        );
    }

    #[tokio::test]
    async fn failed_fetch_only_releases_loading() {
        let backend = Arc::new(MockBackend::default());
        let ctrl = controller(&backend);

        let err = ctrl.fetch_components_status().await.unwrap_err();

        assert!(matches!(err, CoreError::Api { .. }));
        assert_eq!(*ctrl.state(), ComponentsState::default());
    }

    #[tokio::test]
    async fn malformed_status_is_rejected() {
        let backend = Arc::new(MockBackend::default());
        *backend.status.lock().unwrap() = Some(StatusPayload::default());
        let ctrl = controller(&backend);

        let err = ctrl.fetch_components_status().await.unwrap_err();

        assert!(matches!(err, CoreError::MalformedResponse { .. }));
        assert!(!ctrl.state().loading());
    }

    #[tokio::test]
    async fn adapters_fetch_replaces_list() {
        let backend = Arc::new(MockBackend::default());
        *backend.adapters.lock().unwrap() = Some(vec![json!({ "name": "meshery-istio" })]);
        let ctrl = controller(&backend);

        ctrl.fetch_available_adapters().await.unwrap();
        assert_eq!(ctrl.state().adapters[0].field("name"), Some("meshery-istio"));

        *backend.adapters.lock().unwrap() = Some(vec![]);
        ctrl.fetch_available_adapters().await.unwrap();
        assert!(ctrl.state().adapters.is_empty());
    }

    #[tokio::test]
    async fn operator_change_returns_response_without_touching_state() {
        let backend = Arc::new(MockBackend::default());
        let ctrl = controller(&backend);

        let resp = ctrl
            .change_operator_state(OperatorTargetStatus::Disabled)
            .await
            .unwrap();

        assert_eq!(resp.status.as_deref(), Some("DISABLED"));
        assert_eq!(*ctrl.state(), ComponentsState::default());
    }

    #[tokio::test]
    async fn overlapping_operations_keep_loading() {
        let gate = Arc::new(Notify::new());
        let backend = Arc::new(MockBackend {
            status: StdMutex::new(Some(healthy_payload())),
            adapters: StdMutex::new(Some(vec![])),
            status_gate: Some(Arc::clone(&gate)),
            ..MockBackend::default()
        });
        let ctrl = controller(&backend);

        let slow = tokio::spawn({
            let ctrl = ctrl.clone();
            async move { ctrl.fetch_components_status().await }
        });
        while backend.status_calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        ctrl.fetch_available_adapters().await.unwrap();
        assert!(ctrl.state().loading(), "status fetch is still in flight");

        gate.notify_one();
        slow.await.unwrap().unwrap();
        assert!(!ctrl.state().loading());
    }

    // ── Subscription ────────────────────────────────────────────────

    #[tokio::test]
    async fn push_updates_flow_into_store() {
        let backend = Arc::new(MockBackend::default());
        let ctrl = controller(&backend);

        let id = ctrl.subscribe_operator_status().await.unwrap();
        let state = ctrl.state();
        assert!(state.subscription.initialised);
        assert_eq!(state.subscription.disposer, Some(id));

        backend.push(json!({
            "operator": {
                "status": "DISABLED",
                "error": { "code": "OP-503", "description": "cluster unreachable" }
            }
        }));
        // Missing operator section: logged and dropped.
        backend.push(json!({ "broker": { "status": "DISCONNECTED" } }));

        let state = ctrl.state();
        assert_eq!(state.operator.connection_status, ConnectionStatus::Disabled);
        assert_eq!(state.operator_error.code.as_deref(), Some("OP-503"));
        assert_eq!(state.broker, ComponentStatus::default());
    }

    #[tokio::test]
    async fn dispose_cancels_and_clears() {
        let backend = Arc::new(MockBackend::default());
        let ctrl = controller(&backend);

        ctrl.subscribe_operator_status().await.unwrap();
        let token = backend.subscriber_token();

        assert!(ctrl.dispose_operator_status_subscription().await);
        assert!(token.is_cancelled());
        assert!(!ctrl.state().subscription.initialised);
        assert!(ctrl.state().subscription.disposer.is_none());
        assert!(!ctrl.dispose_operator_status_subscription().await);
    }

    #[tokio::test]
    async fn refused_subscription_is_not_initialised() {
        let backend = Arc::new(MockBackend {
            refuse_subscription: true,
            ..MockBackend::default()
        });
        let ctrl = controller(&backend);

        let err = ctrl.subscribe_operator_status().await.unwrap_err();

        assert!(matches!(err, CoreError::SubscriptionFailed { .. }));
        assert!(!ctrl.state().subscription.initialised);
    }

    #[tokio::test]
    async fn resubscribing_cancels_previous() {
        let backend = Arc::new(MockBackend::default());
        let ctrl = controller(&backend);

        let first = ctrl.subscribe_operator_status().await.unwrap();
        let first_token = backend.subscriber_token();
        let second = ctrl.subscribe_operator_status().await.unwrap();

        assert_ne!(first, second);
        assert!(first_token.is_cancelled());
        assert_eq!(ctrl.state().subscription.disposer, Some(second));
    }

    #[tokio::test]
    async fn stream_ending_clears_subscription() {
        let backend = Arc::new(MockBackend::default());
        let ctrl = controller(&backend);
        let mut states = ctrl.subscribe_state();

        ctrl.subscribe_operator_status().await.unwrap();
        backend.subscriber_token().cancel();

        let cleared = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let snap = states.changed().await.unwrap();
                if !snap.subscription.initialised && snap.subscription.disposer.is_none() {
                    break;
                }
            }
        })
        .await;
        assert!(cleared.is_ok(), "subscription was not cleared");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn dispose_racing_subscribe_leaves_consistent_state() {
        for _ in 0..200 {
            let gate = Arc::new(Notify::new());
            let backend = Arc::new(MockBackend {
                subscribe_gate: Some(Arc::clone(&gate)),
                ..MockBackend::default()
            });
            let ctrl = controller(&backend);

            let subscribe = tokio::spawn({
                let ctrl = ctrl.clone();
                async move { ctrl.subscribe_operator_status().await }
            });
            while backend.subscribe_calls.load(Ordering::SeqCst) == 0 {
                tokio::task::yield_now().await;
            }
            let dispose = tokio::spawn({
                let ctrl = ctrl.clone();
                async move { ctrl.dispose_operator_status_subscription().await }
            });
            tokio::task::yield_now().await;
            gate.notify_one();

            let id = subscribe.await.unwrap().unwrap();
            let disposed = dispose.await.unwrap();

            let state = ctrl.state();
            if disposed {
                assert!(backend.subscriber_token().is_cancelled());
                assert!(!state.subscription.initialised);
                assert!(state.subscription.disposer.is_none());
            } else {
                assert!(state.subscription.initialised);
                assert_eq!(state.subscription.disposer, Some(id));
            }
            ctrl.shutdown().await;
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn overlapping_subscribes_track_the_live_one() {
        for _ in 0..100 {
            let backend = Arc::new(MockBackend::default());
            let ctrl = controller(&backend);

            let first = tokio::spawn({
                let ctrl = ctrl.clone();
                async move { ctrl.subscribe_operator_status().await }
            });
            let second = tokio::spawn({
                let ctrl = ctrl.clone();
                async move { ctrl.subscribe_operator_status().await }
            });
            first.await.unwrap().unwrap();
            second.await.unwrap().unwrap();

            let live = ctrl.inner.subscription.lock().await.as_ref().map(|(id, _)| *id);
            assert!(live.is_some());
            assert_eq!(ctrl.state().subscription.disposer, live);
            ctrl.shutdown().await;
        }
    }

    #[tokio::test]
    async fn finished_watch_tasks_are_not_kept() {
        let backend = Arc::new(MockBackend::default());
        let ctrl = controller(&backend);

        for _ in 0..5 {
            ctrl.subscribe_operator_status().await.unwrap();
            ctrl.dispose_operator_status_subscription().await;
            loop {
                let done = ctrl
                    .inner
                    .task_handles
                    .lock()
                    .await
                    .iter()
                    .all(JoinHandle::is_finished);
                if done {
                    break;
                }
                tokio::task::yield_now().await;
            }
        }
        ctrl.subscribe_operator_status().await.unwrap();

        assert_eq!(ctrl.inner.task_handles.lock().await.len(), 1);
        ctrl.shutdown().await;
    }

    // ── Lifecycle ───────────────────────────────────────────────────

    #[tokio::test]
    async fn start_fails_only_on_status_fetch() {
        let backend = Arc::new(MockBackend::default());
        let ctrl = controller(&backend);
        assert!(ctrl.start().await.is_err());

        let backend = Arc::new(MockBackend {
            status: StdMutex::new(Some(healthy_payload())),
            refuse_subscription: true,
            ..MockBackend::default()
        });
        let ctrl = controller(&backend);
        ctrl.start().await.unwrap();

        let state = ctrl.state();
        assert_eq!(state.operator.connection_status, ConnectionStatus::Enabled);
        assert!(!state.subscription.initialised);
        assert!(!state.loading());
        ctrl.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn poll_task_refetches_without_subscription() {
        let backend = Arc::new(MockBackend {
            status: StdMutex::new(Some(healthy_payload())),
            adapters: StdMutex::new(Some(vec![])),
            refuse_subscription: true,
            ..MockBackend::default()
        });
        let config = ControllerConfig {
            poll_interval_secs: 5,
            ..ControllerConfig::default()
        };
        let ctrl = Controller::with_backend(config, Arc::clone(&backend) as Arc<dyn ComponentsBackend>);

        ctrl.start().await.unwrap();
        assert_eq!(backend.status_calls.load(Ordering::SeqCst), 1);

        *backend.status.lock().unwrap() = Some(StatusPayload {
            operator: Some(OperatorReport {
                status: Some("DISABLED".into()),
                error: Some(OperatorErrorReport::default()),
            }),
            ..StatusPayload::default()
        });
        tokio::time::sleep(Duration::from_secs(6)).await;

        assert!(backend.status_calls.load(Ordering::SeqCst) >= 2);
        assert_eq!(
            ctrl.state().operator.connection_status,
            ConnectionStatus::Disabled
        );
        ctrl.shutdown().await;
    }

    #[tokio::test]
    async fn shutdown_disposes_subscription() {
        let backend = Arc::new(MockBackend {
            status: StdMutex::new(Some(healthy_payload())),
            adapters: StdMutex::new(Some(vec![])),
            ..MockBackend::default()
        });
        let ctrl = controller(&backend);
        ctrl.start().await.unwrap();
        let token = backend.subscriber_token();
        assert!(ctrl.state().subscription.initialised);

        ctrl.shutdown().await;

        assert!(token.is_cancelled());
        assert!(!ctrl.state().subscription.initialised);
    }
}
