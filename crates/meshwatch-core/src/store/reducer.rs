// ── Reducer ──
//
// The only place `ComponentsState` changes. Pure: same state and action
// in, same state out.

use super::action::{Action, AsyncPhase};
use super::state::{ComponentsState, OperationKind, SubscriptionState};
use crate::model::StatusUpdate;

/// Apply `action` to `state`, returning the next state.
pub fn reduce(mut state: ComponentsState, action: Action) -> ComponentsState {
    match action {
        Action::FetchComponentsStatus(phase) => {
            state = track(state, OperationKind::StatusFetch, &phase);
            if let AsyncPhase::Fulfilled(update) = phase {
                state = merge_status(state, update);
            }
        }
        Action::FetchAvailableAdapters(phase) => {
            state = track(state, OperationKind::AdaptersFetch, &phase);
            if let AsyncPhase::Fulfilled(adapters) = phase {
                state.adapters = adapters;
            }
        }
        Action::ChangeOperatorState(phase) => {
            state = track(state, OperationKind::OperatorChange, &phase);
        }
        Action::InitialiseOperatorStatusSubscription(phase) => match phase {
            AsyncPhase::Pending => {}
            AsyncPhase::Fulfilled(id) => {
                state.subscription = SubscriptionState {
                    initialised: true,
                    disposer: Some(id),
                };
            }
            AsyncPhase::Rejected(_) => state.subscription = SubscriptionState::default(),
        },
        Action::UpdateConnectionStatus(update) => state = merge_status(state, update),
        Action::SubscriptionDisposed => state.subscription = SubscriptionState::default(),
    }
    state
}

/// Merge a validated status update. The server record is never touched,
/// and the operator error only changes when a new one was reported.
pub fn merge_status(mut state: ComponentsState, update: StatusUpdate) -> ComponentsState {
    state.operator.connection_status = update.operator_status;
    state.broker = update.broker;
    state.meshsync = update.meshsync;
    if let Some(error) = update.operator_error {
        state.operator_error = error;
    }
    state
}

fn track<T>(mut state: ComponentsState, kind: OperationKind, phase: &AsyncPhase<T>) -> ComponentsState {
    state.pending = match phase {
        AsyncPhase::Pending => state.pending.begin(kind),
        AsyncPhase::Fulfilled(_) | AsyncPhase::Rejected(_) => state.pending.finish(kind),
    };
    state
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use meshwatch_api::{ControllerReport, OperatorErrorReport, OperatorReport, StatusPayload};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::model::{Adapter, ComponentStatus, ConnectionStatus, OperatorError};
    use crate::store::state::SubscriptionId;

    fn payload(value: serde_json::Value) -> StatusUpdate {
        let payload: StatusPayload = serde_json::from_value(value).unwrap();
        StatusUpdate::try_from(payload).unwrap()
    }

    fn fetch(phase: AsyncPhase<StatusUpdate>) -> Action {
        Action::FetchComponentsStatus(phase)
    }

    // ── Status fetch ────────────────────────────────────────────────

    #[test]
    fn pending_sets_loading_only() {
        let next = reduce(ComponentsState::default(), fetch(AsyncPhase::Pending));
        assert!(next.loading());

        let mut expected = ComponentsState::default();
        expected.pending.status_fetch = 1;
        assert_eq!(next, expected);
    }

    #[test]
    fn fulfilled_fetch_merges_and_clears_loading() {
        let state = reduce(ComponentsState::default(), fetch(AsyncPhase::Pending));
        let update = payload(json!({
            "operator": { "status": "ENABLED", "error": { "code": "", "description": "" } },
            "broker": { "status": "CONNECTED", "version": "2.10.1" },
            "meshsync": { "status": "ENABLED", "version": "v0.6.24" }
        }));

        let next = reduce(state, fetch(AsyncPhase::Fulfilled(update)));

        assert!(!next.loading());
        assert_eq!(next.operator.connection_status, ConnectionStatus::Enabled);
        assert_eq!(next.operator.version, "UNKNOWN");
        assert_eq!(next.broker, ComponentStatus::new(ConnectionStatus::Connected, "2.10.1"));
        assert_eq!(next.meshsync, ComponentStatus::new(ConnectionStatus::Enabled, "v0.6.24"));
        assert_eq!(next.operator_error, OperatorError::default());
    }

    #[test]
    fn fulfilled_fetch_with_empty_error_keeps_stored_error() {
        let mut state = ComponentsState::default();
        state.operator_error = OperatorError {
            code: Some("E1".into()),
            description: Some("d".into()),
        };
        let state = reduce(state, fetch(AsyncPhase::Pending));
        let update = payload(json!({
            "operator": { "status": "CONNECTED", "error": {} },
            "broker": { "status": "CONNECTED", "version": "1.2" },
            "meshsync": { "status": "UNKNOWN" }
        }));

        let next = reduce(state, fetch(AsyncPhase::Fulfilled(update)));

        assert_eq!(next.operator.connection_status, ConnectionStatus::Connected);
        assert_eq!(next.broker.version, "1.2");
        assert_eq!(next.meshsync.version, "UNKNOWN");
        assert_eq!(next.operator_error.code.as_deref(), Some("E1"));
        assert_eq!(next.operator_error.description.as_deref(), Some("d"));
        assert!(!next.loading());
    }

    #[test]
    fn rejected_fetch_only_clears_loading() {
        let mut before = ComponentsState::default();
        before.broker = ComponentStatus::new(ConnectionStatus::Connected, "2.10.1");
        before.adapters = vec![Adapter::from(json!({ "name": "istio" }))];

        let pending = reduce(before.clone(), fetch(AsyncPhase::Pending));
        let next = reduce(pending, fetch(AsyncPhase::Rejected("timeout".into())));

        assert_eq!(next, before);
    }

    #[test]
    fn sparse_payload_resolves_to_unknown() {
        let mut state = ComponentsState::default();
        state.broker = ComponentStatus::new(ConnectionStatus::Connected, "2.10.1");

        let next = reduce(state, Action::UpdateConnectionStatus(payload(json!({ "operator": {} }))));

        assert_eq!(next.operator.connection_status, ConnectionStatus::Unknown);
        assert_eq!(next.broker, ComponentStatus::default());
        assert_eq!(next.meshsync, ComponentStatus::default());
    }

    // ── Operator error ──────────────────────────────────────────────

    #[test]
    fn operator_error_is_sticky_until_replaced() {
        let failing = payload(json!({
            "operator": {
                "status": "DISABLED",
                "error": { "code": "OP-503", "description": "cluster unreachable" }
            }
        }));
        let state = reduce(ComponentsState::default(), Action::UpdateConnectionStatus(failing));
        assert_eq!(state.operator_error.code.as_deref(), Some("OP-503"));

        let healthy = payload(json!({ "operator": { "status": "ENABLED" } }));
        let state = reduce(state, Action::UpdateConnectionStatus(healthy));
        assert_eq!(state.operator.connection_status, ConnectionStatus::Enabled);
        assert_eq!(state.operator_error.code.as_deref(), Some("OP-503"));

        let description_only = payload(json!({
            "operator": { "error": { "description": "crd missing" } }
        }));
        let state = reduce(state, Action::UpdateConnectionStatus(description_only));
        assert_eq!(
            state.operator_error,
            OperatorError {
                code: None,
                description: Some("crd missing".into()),
            }
        );
    }

    #[test]
    fn merge_never_touches_server_or_bookkeeping() {
        let mut state = ComponentsState::default();
        state.server = ComponentStatus::new(ConnectionStatus::Connected, "v0.8.0");
        state.adapters = vec![Adapter::from(json!({ "name": "linkerd" }))];
        state.pending.adapters_fetch = 1;
        let id = SubscriptionId::new();
        state.subscription.initialised = true;
        state.subscription.disposer = Some(id);

        let update = StatusUpdate::try_from(StatusPayload {
            operator: Some(OperatorReport {
                status: Some("PROCESSING".into()),
                error: Some(OperatorErrorReport::default()),
            }),
            broker: Some(ControllerReport {
                status: Some("DISCONNECTED".into()),
                version: Some(String::new()),
            }),
            meshsync: None,
        })
        .unwrap();
        let next = reduce(state.clone(), Action::UpdateConnectionStatus(update));

        assert_eq!(next.server, state.server);
        assert_eq!(next.adapters, state.adapters);
        assert_eq!(next.pending, state.pending);
        assert_eq!(next.subscription, state.subscription);
        assert_eq!(next.operator.connection_status, ConnectionStatus::Processing);
        assert_eq!(next.broker, ComponentStatus::new(ConnectionStatus::Disconnected, "UNKNOWN"));
    }

    #[test]
    fn merge_is_idempotent() {
        let update = payload(json!({
            "operator": { "status": "ENABLED", "error": { "code": "E1", "description": "x" } },
            "broker": { "status": "CONNECTED", "version": "2.10.1" }
        }));
        let once = merge_status(ComponentsState::default(), update.clone());
        let twice = merge_status(once.clone(), update);
        assert_eq!(once, twice);
    }

    // ── Adapters ────────────────────────────────────────────────────

    #[test]
    fn adapters_replaced_wholesale() {
        let mut state = ComponentsState::default();
        state.adapters = vec![Adapter::from(json!({ "name": "old" }))];

        let state = reduce(state, Action::FetchAvailableAdapters(AsyncPhase::Pending));
        assert!(state.loading());
        let state = reduce(state, Action::FetchAvailableAdapters(AsyncPhase::Fulfilled(vec![])));
        assert!(state.adapters.is_empty());
        assert!(!state.loading());
    }

    #[test]
    fn rejected_adapters_fetch_keeps_list() {
        let mut state = ComponentsState::default();
        state.adapters = vec![Adapter::from(json!({ "name": "kept" }))];
        let state = reduce(state, Action::FetchAvailableAdapters(AsyncPhase::Pending));
        let state = reduce(
            state,
            Action::FetchAvailableAdapters(AsyncPhase::Rejected("502".into())),
        );
        assert_eq!(state.adapters.len(), 1);
        assert!(!state.loading());
    }

    // ── Loading across operations ───────────────────────────────────

    #[test]
    fn overlapping_operations_keep_loading_until_all_settle() {
        let state = reduce(ComponentsState::default(), fetch(AsyncPhase::Pending));
        let state = reduce(state, Action::FetchAvailableAdapters(AsyncPhase::Pending));

        let state = reduce(state, Action::FetchAvailableAdapters(AsyncPhase::Fulfilled(vec![])));
        assert!(state.loading(), "status fetch still in flight");

        let state = reduce(state, fetch(AsyncPhase::Rejected("boom".into())));
        assert!(!state.loading());
    }

    #[test]
    fn operator_change_only_toggles_loading() {
        let before = ComponentsState::default();
        let state = reduce(before.clone(), Action::ChangeOperatorState(AsyncPhase::Pending));
        assert!(state.loading());
        let state = reduce(state, Action::ChangeOperatorState(AsyncPhase::Fulfilled(())));
        assert_eq!(state, before);
    }

    // ── Subscription ────────────────────────────────────────────────

    #[test]
    fn subscription_lifecycle() {
        let state = reduce(
            ComponentsState::default(),
            Action::InitialiseOperatorStatusSubscription(AsyncPhase::Pending),
        );
        assert_eq!(state, ComponentsState::default());

        let id = SubscriptionId::new();
        let state = reduce(
            state,
            Action::InitialiseOperatorStatusSubscription(AsyncPhase::Fulfilled(id)),
        );
        assert!(state.subscription.initialised);
        assert_eq!(state.subscription.disposer, Some(id));
        assert!(!state.loading());

        let state = reduce(state, Action::SubscriptionDisposed);
        assert_eq!(state.subscription, SubscriptionState::default());
    }

    #[test]
    fn rejected_subscription_is_not_initialised() {
        let mut state = ComponentsState::default();
        state.subscription.initialised = true;
        state.subscription.disposer = Some(SubscriptionId::new());

        let state = reduce(
            state,
            Action::InitialiseOperatorStatusSubscription(AsyncPhase::Rejected("refused".into())),
        );
        assert!(!state.subscription.initialised);
        assert!(state.subscription.disposer.is_none());
    }
}
