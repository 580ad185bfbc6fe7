mod adapter;
mod event;
mod signaling;

pub use adapter::*;
pub use event::*;
pub use signaling::*;
