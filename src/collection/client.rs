//! # Collection Client
//!
//! The caller-facing half of a collection actor.

use super::message::{CollectionRequest, Response};
use super::CollectionError;
use crate::model::LogLine;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

/// A cloneable handle for sending requests to a [`CollectionActor`](super::CollectionActor).
///
/// Every call builds a request with a private reply channel, sends it, and waits for the
/// reply. The whole exchange is bounded by the service timeout; a timeout only means the
/// caller stopped waiting, the actor still finishes the request.
#[derive(Clone)]
pub struct CollectionClient {
    sender: mpsc::Sender<CollectionRequest>,
    running: Arc<AtomicBool>,
    path: Arc<PathBuf>,
    service_timeout: Duration,
}

impl CollectionClient {
    pub fn new(
        sender: mpsc::Sender<CollectionRequest>,
        running: Arc<AtomicBool>,
        path: impl Into<PathBuf>,
        service_timeout: Duration,
    ) -> Self {
        Self {
            sender,
            running,
            path: Arc::new(path.into()),
            service_timeout,
        }
    }

    /// Returns a copy of this client that waits `timeout` for replies.
    pub fn with_service_timeout(&self, timeout: Duration) -> Self {
        Self {
            service_timeout: timeout,
            ..self.clone()
        }
    }

    pub fn service_timeout(&self) -> Duration {
        self.service_timeout
    }

    /// Path of the collection file served by the actor.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the actor is still accepting requests.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Appends `line` to the collection file.
    #[instrument(skip(self, line), fields(path = %self.path.display()))]
    pub async fn append(&self, line: LogLine) -> Result<(), CollectionError> {
        debug!("Sending append");
        self.request(|respond_to| CollectionRequest::Append { line, respond_to })
            .await
    }

    /// Reads every record in the collection file, in file order.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn read_all(&self) -> Result<Vec<LogLine>, CollectionError> {
        debug!("Sending read_all");
        self.request(|respond_to| CollectionRequest::ReadAll { respond_to })
            .await
    }

    /// Stops the actor and waits for it to acknowledge.
    ///
    /// Stopping an actor that has already stopped returns `Ok(())` immediately.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn stop(&self) -> Result<(), CollectionError> {
        if !self.is_running() {
            debug!("Already stopped");
            return Ok(());
        }
        match self
            .request(|respond_to| CollectionRequest::Stop { respond_to })
            .await
        {
            // Another caller's stop got there first.
            Err(CollectionError::Stopped) => Ok(()),
            other => other,
        }
    }

    async fn request<T>(
        &self,
        make_request: impl FnOnce(Response<T>) -> CollectionRequest,
    ) -> Result<T, CollectionError> {
        if !self.is_running() {
            return Err(CollectionError::Stopped);
        }

        let (respond_to, response) = oneshot::channel();
        let exchange = async {
            self.sender
                .send(make_request(respond_to))
                .await
                .map_err(|_| CollectionError::Stopped)?;
            response.await.map_err(|_| CollectionError::ActorDropped)?
        };

        tokio::time::timeout(self.service_timeout, exchange)
            .await
            .map_err(|_| CollectionError::Timeout(self.service_timeout))?
    }

    #[cfg(test)]
    pub(crate) fn sender(&self) -> &mpsc::Sender<CollectionRequest> {
        &self.sender
    }

    #[cfg(test)]
    pub(crate) fn running_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }
}

impl std::fmt::Debug for CollectionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionClient")
            .field("path", &self.path)
            .field("running", &self.is_running())
            .field("service_timeout", &self.service_timeout)
            .finish()
    }
}
