mod config;
mod handle;
mod manager;
mod state;

pub use config::{ManagerConfig, ManagerConfigBuilder};
pub use handle::ConnectionHandle;
pub use manager::ConnectionManager;
pub use state::{ConnectionStatus, StatusSnapshot};
