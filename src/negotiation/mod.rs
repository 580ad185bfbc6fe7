mod candidates;

pub use candidates::*;
