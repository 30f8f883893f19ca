//! Error types for the collection actor and its clients.

use crate::codec::CodecError;
use std::time::Duration;
use thiserror::Error;

/// Errors a caller of a [`CollectionClient`](super::CollectionClient) can observe.
#[derive(Debug, Error)]
pub enum CollectionError {
    /// The actor executed the request and the codec reported a failure.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// No reply arrived within the service timeout. The request may still complete.
    #[error("service timeout after {0:?}")]
    Timeout(Duration),

    /// The actor has stopped and no longer accepts requests.
    #[error("collection actor stopped")]
    Stopped,

    /// The actor dropped the reply channel without answering.
    #[error("collection actor dropped response channel")]
    ActorDropped,
}

impl CollectionError {
    /// True for [`CollectionError::Timeout`].
    pub fn is_timeout(&self) -> bool {
        matches!(self, CollectionError::Timeout(_))
    }
}
