//! Runtime orchestration and lifecycle management.
//!
//! - [`CollectionSystem`] - keeps one actor per collection file and shuts them all down
//! - [`setup_tracing`] - initializes the tracing/logging infrastructure

pub mod collection_system;
pub mod tracing;

pub use self::collection_system::*;
pub use self::tracing::*;
