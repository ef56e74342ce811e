// meshwatch-api: Async Rust client for the Meshery server component-status API

pub mod client;
pub mod error;
pub mod models;
mod system;
pub mod transport;
pub mod websocket;

pub use client::MesheryClient;
pub use error::Error;
pub use models::{
    ControllerReport, OperatorErrorReport, OperatorReport, OperatorStatusResponse,
    OperatorTargetStatus, StatusPayload,
};
pub use transport::{TlsMode, TransportConfig};
pub use websocket::{OperatorEventsHandle, ReconnectConfig};
