// ── Store actions ──
//
// Every state transition is one of these. Async operations dispatch the
// three phases of `AsyncPhase` as they progress.

use std::fmt;

use crate::model::{Adapter, StatusUpdate};
use crate::store::state::SubscriptionId;

/// Phase of an asynchronous operation.
#[derive(Debug, Clone, PartialEq)]
pub enum AsyncPhase<T> {
    Pending,
    Fulfilled(T),
    /// The reason is carried for logging; the store does not keep it.
    Rejected(String),
}

impl<T> AsyncPhase<T> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fulfilled(_) => "fulfilled",
            Self::Rejected(_) => "rejected",
        }
    }
}

/// Everything that can change a `ComponentsState`.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    FetchComponentsStatus(AsyncPhase<StatusUpdate>),
    InitialiseOperatorStatusSubscription(AsyncPhase<SubscriptionId>),
    FetchAvailableAdapters(AsyncPhase<Vec<Adapter>>),
    /// The operation's result goes back to the caller, not into state.
    ChangeOperatorState(AsyncPhase<()>),
    UpdateConnectionStatus(StatusUpdate),
    SubscriptionDisposed,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FetchComponentsStatus(p) => write!(f, "fetch_components_status/{}", p.name()),
            Self::InitialiseOperatorStatusSubscription(p) => {
                write!(f, "initialise_operator_status_subscription/{}", p.name())
            }
            Self::FetchAvailableAdapters(p) => write!(f, "fetch_available_adapters/{}", p.name()),
            Self::ChangeOperatorState(p) => write!(f, "change_operator_state/{}", p.name()),
            Self::UpdateConnectionStatus(_) => f.write_str("update_connection_status"),
            Self::SubscriptionDisposed => f.write_str("subscription_disposed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_operation_and_phase() {
        let a = Action::FetchAvailableAdapters(AsyncPhase::Rejected("boom".into()));
        assert_eq!(a.to_string(), "fetch_available_adapters/rejected");
        let a = Action::ChangeOperatorState(AsyncPhase::Pending);
        assert_eq!(a.to_string(), "change_operator_state/pending");
    }
}
