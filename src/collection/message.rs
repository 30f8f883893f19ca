//! Requests sent from a [`CollectionClient`](super::CollectionClient) to its
//! [`CollectionActor`](super::CollectionActor).

use super::CollectionError;
use crate::model::LogLine;
use tokio::sync::oneshot;

/// Private, single-use reply channel carried by every request.
pub type Response<T> = oneshot::Sender<Result<T, CollectionError>>;

/// Every request a collection actor understands.
///
/// The set is closed: the actor dispatches on this enum in one place, so there is no
/// such thing as an unrecognized request at runtime.
#[derive(Debug)]
pub enum CollectionRequest {
    /// Append one record to the end of the collection file.
    Append {
        line: LogLine,
        respond_to: Response<()>,
    },
    /// Read every record currently in the collection file.
    ReadAll { respond_to: Response<Vec<LogLine>> },
    /// Stop the actor. No request is processed after this one.
    Stop { respond_to: Response<()> },
}

impl CollectionRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            CollectionRequest::Append { .. } => "append",
            CollectionRequest::ReadAll { .. } => "read_all",
            CollectionRequest::Stop { .. } => "stop",
        }
    }

    /// Answers the request with [`CollectionError::Stopped`] without executing it.
    pub fn reject_stopped(self) {
        match self {
            CollectionRequest::Append { respond_to, .. } => {
                let _ = respond_to.send(Err(CollectionError::Stopped));
            }
            CollectionRequest::ReadAll { respond_to } => {
                let _ = respond_to.send(Err(CollectionError::Stopped));
            }
            CollectionRequest::Stop { respond_to } => {
                let _ = respond_to.send(Err(CollectionError::Stopped));
            }
        }
    }
}
