mod utils;
mod transport;
mod classify;
mod negotiation;
mod backoff;
mod client;

// Re-export commonly used types at crate root
pub use utils::*;
pub use transport::*;
pub use classify::*;
pub use negotiation::*;
pub use backoff::*;

// Client exports
pub use client::{
    ConnectionHandle, ConnectionManager, ConnectionStatus, ManagerConfig, ManagerConfigBuilder,
    StatusSnapshot,
};
