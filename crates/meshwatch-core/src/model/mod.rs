// ── Domain model ──

pub mod adapter;
pub mod status;
pub mod update;

pub use adapter::Adapter;
pub use status::{ComponentStatus, ConnectionStatus, OperatorError, UNKNOWN};
pub use update::StatusUpdate;
