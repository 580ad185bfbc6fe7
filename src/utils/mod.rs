mod error;
mod time;

pub use error::*;
pub use time::*;
