// ── Selectors ──
//
// Pure read accessors over a state snapshot.

use super::state::{ComponentsState, SubscriptionState};
use crate::model::{Adapter, ComponentStatus, OperatorError};

pub fn operator(state: &ComponentsState) -> &ComponentStatus {
    &state.operator
}

pub fn meshsync(state: &ComponentsState) -> &ComponentStatus {
    &state.meshsync
}

pub fn broker(state: &ComponentsState) -> &ComponentStatus {
    &state.broker
}

pub fn server(state: &ComponentsState) -> &ComponentStatus {
    &state.server
}

pub fn adapters(state: &ComponentsState) -> &[Adapter] {
    &state.adapters
}

pub fn loading(state: &ComponentsState) -> bool {
    state.loading()
}

/// Last error the operator reported (sticky).
pub fn operator_error(state: &ComponentsState) -> &OperatorError {
    &state.operator_error
}

pub fn subscription(state: &ComponentsState) -> &SubscriptionState {
    &state.subscription
}
