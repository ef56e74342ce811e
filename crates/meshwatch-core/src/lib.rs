// meshwatch-core: Component-status store between meshwatch-api and consumers.

pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use backend::{ComponentsBackend, MesheryBackend, StatusCallback};
pub use config::{ControllerConfig, TlsVerification};
pub use controller::Controller;
pub use error::CoreError;
pub use store::{
    Action, AsyncPhase, ComponentStore, ComponentsState, OperationKind, PendingOperations,
    SubscriptionId, SubscriptionState, merge_status, reduce, selectors,
};
pub use stream::StateStream;

pub use model::{Adapter, ComponentStatus, ConnectionStatus, OperatorError, StatusUpdate};

// Wire types consumers hand to the store or get back from it.
pub use meshwatch_api::{OperatorStatusResponse, OperatorTargetStatus, StatusPayload};
