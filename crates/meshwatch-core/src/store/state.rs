// ── Store state ──
//
// Flat record of component statuses plus the bookkeeping the async
// operations need. Every field is public for reading; mutation happens
// only through `reduce`.

use std::fmt;

use serde::Serialize;
use strum::Display;
use uuid::Uuid;

use crate::model::{Adapter, ComponentStatus, OperatorError};

/// Identity of a live operator-events subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Whether the operator-events subscription is live.
///
/// `initialised` is only ever true after the subscribe operation
/// succeeded; `disposer` names the subscription that can be torn down.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubscriptionState {
    pub initialised: bool,
    pub disposer: Option<SubscriptionId>,
}

/// The operations whose in-flight state drives `loading`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum OperationKind {
    StatusFetch,
    AdaptersFetch,
    OperatorChange,
}

/// In-flight counters, one per loading-tracked operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PendingOperations {
    pub status_fetch: u32,
    pub adapters_fetch: u32,
    pub operator_change: u32,
}

impl PendingOperations {
    fn counter(&mut self, kind: OperationKind) -> &mut u32 {
        match kind {
            OperationKind::StatusFetch => &mut self.status_fetch,
            OperationKind::AdaptersFetch => &mut self.adapters_fetch,
            OperationKind::OperatorChange => &mut self.operator_change,
        }
    }

    #[must_use]
    pub fn begin(mut self, kind: OperationKind) -> Self {
        let c = self.counter(kind);
        *c = c.saturating_add(1);
        self
    }

    /// Never underflows: a stray completion leaves the counter at zero.
    #[must_use]
    pub fn finish(mut self, kind: OperationKind) -> Self {
        let c = self.counter(kind);
        *c = c.saturating_sub(1);
        self
    }

    pub fn is_pending(&self, kind: OperationKind) -> bool {
        match kind {
            OperationKind::StatusFetch => self.status_fetch > 0,
            OperationKind::AdaptersFetch => self.adapters_fetch > 0,
            OperationKind::OperatorChange => self.operator_change > 0,
        }
    }

    pub fn any(&self) -> bool {
        self.status_fetch > 0 || self.adapters_fetch > 0 || self.operator_change > 0
    }
}

/// Complete state of the component-status store.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComponentsState {
    pub operator: ComponentStatus,
    pub meshsync: ComponentStatus,
    pub broker: ComponentStatus,
    pub server: ComponentStatus,
    pub adapters: Vec<Adapter>,
    pub pending: PendingOperations,
    pub operator_error: OperatorError,
    pub subscription: SubscriptionState,
}

impl ComponentsState {
    /// `true` while any loading-tracked operation is in flight.
    pub fn loading(&self) -> bool {
        self.pending.any()
    }
}
