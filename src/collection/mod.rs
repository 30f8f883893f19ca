//! # Collection Actor
//!
//! Serialized access to one collection file behind a message-passing interface.
//!
//! - [`CollectionActor`]: the server half. Owns the file path and the request receiver,
//!   and runs requests one at a time in arrival order.
//! - [`CollectionClient`]: the cloneable caller half. Every call carries a private reply
//!   channel and waits at most the configured service timeout.
//! - [`CollectionRequest`]: the closed set of requests (append, read all, stop).
//!
//! # Testing
//!
//! See [`mock`] for a scripted stand-in actor.

pub mod actor;
pub mod client;
pub mod error;
pub mod message;
pub mod mock;

pub use actor::CollectionActor;
pub use client::CollectionClient;
pub use error::CollectionError;
pub use message::{CollectionRequest, Response};
