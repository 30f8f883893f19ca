//! Pure data structures stored in a collection.

pub mod log_line;

pub use log_line::*;
