// ── Component-status store ──

pub mod action;
mod component_store;
pub mod reducer;
pub mod selectors;
pub mod state;

pub use action::{Action, AsyncPhase};
pub use component_store::ComponentStore;
pub use reducer::{merge_status, reduce};
pub use state::{
    ComponentsState, OperationKind, PendingOperations, SubscriptionId, SubscriptionState,
};
