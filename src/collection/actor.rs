//! # Collection Actor
//!
//! The server half of a collection. It owns the receiving end of the request channel
//! and the collection file path, and executes requests one at a time.

use super::client::CollectionClient;
use super::message::CollectionRequest;
use super::CollectionError;
use crate::codec::{self, AppendOptions, CodecError};
use crate::config::CollectionConfig;
use crate::model::LogLine;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// The actor that serializes all access to one collection file.
///
/// # Concurrency Model
/// Callers never touch the file. Each request arrives on the inbound channel and is run to
/// completion before the next one is received, so the order requests are observed in is the
/// order of the lines in the file. File I/O happens on the blocking pool and is awaited
/// inside the loop; processing stays strictly serial.
///
/// # Lifecycle
/// The actor is Running from construction. It becomes Stopped when it processes a
/// [`CollectionRequest::Stop`], or when every client has been dropped. On stop it closes
/// the channel and answers anything still queued with [`CollectionError::Stopped`].
///
/// ```no_run
/// use logaggr::collection::CollectionActor;
/// use logaggr::config::CollectionConfig;
/// use logaggr::model::LogLine;
///
/// # async fn demo() -> Result<(), logaggr::collection::CollectionError> {
/// let (actor, client) = CollectionActor::new("/var/lib/logaggr/access.txt", &CollectionConfig::default());
/// tokio::spawn(actor.run());
///
/// let mut line = LogLine::new();
/// line.insert("method", "GET");
/// client.append(line).await?;
/// client.stop().await?;
/// # Ok(())
/// # }
/// ```
pub struct CollectionActor {
    receiver: mpsc::Receiver<CollectionRequest>,
    path: PathBuf,
    options: AppendOptions,
    running: Arc<AtomicBool>,
}

impl CollectionActor {
    /// Creates an actor for the collection file at `path` and the client that talks to it.
    ///
    /// The actor does nothing until [`run`](Self::run) is polled; see [`spawn`](Self::spawn).
    pub fn new(path: impl Into<PathBuf>, config: &CollectionConfig) -> (Self, CollectionClient) {
        let path = path.into();
        let (sender, receiver) = mpsc::channel(config.channel_capacity.max(1));
        let running = Arc::new(AtomicBool::new(true));

        let actor = Self {
            receiver,
            path: path.clone(),
            options: config.append_options(),
            running: running.clone(),
        };
        let client = CollectionClient::new(sender, running, path, config.service_timeout);
        (actor, client)
    }

    /// Creates the actor and starts its loop on the current tokio runtime.
    pub fn spawn(
        path: impl Into<PathBuf>,
        config: &CollectionConfig,
    ) -> (CollectionClient, JoinHandle<()>) {
        let (actor, client) = Self::new(path, config);
        let handle = tokio::spawn(actor.run());
        (client, handle)
    }

    /// Runs the request loop until a stop request arrives or every client is dropped.
    pub async fn run(mut self) {
        let path = self.path.display().to_string();
        info!(%path, "Collection actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                CollectionRequest::Append { line, respond_to } => {
                    debug!(%path, fields = line.len(), "Append");
                    let result = self.append(line).await;
                    if let Err(e) = &result {
                        warn!(%path, error = %e, "Append failed");
                    }
                    let _ = respond_to.send(result);
                }
                CollectionRequest::ReadAll { respond_to } => {
                    let result = self.read_all().await;
                    match &result {
                        Ok(lines) => debug!(%path, count = lines.len(), "ReadAll"),
                        Err(e) => warn!(%path, error = %e, "ReadAll failed"),
                    }
                    let _ = respond_to.send(result);
                }
                CollectionRequest::Stop { respond_to } => {
                    debug!(%path, "Stop");
                    self.running.store(false, Ordering::Release);
                    self.receiver.close();
                    let _ = respond_to.send(Ok(()));
                    break;
                }
            }
        }

        self.running.store(false, Ordering::Release);

        let mut rejected = 0usize;
        while let Ok(msg) = self.receiver.try_recv() {
            debug!(%path, kind = msg.kind(), "Rejecting request queued behind stop");
            msg.reject_stopped();
            rejected += 1;
        }

        info!(%path, rejected, "Collection actor stopped");
    }

    async fn append(&self, line: LogLine) -> Result<(), CollectionError> {
        let path = self.path.clone();
        let options = self.options;
        tokio::task::spawn_blocking(move || codec::append_record(&path, &line, &options))
            .await
            .map_err(join_failure)?
            .map_err(CollectionError::from)
    }

    async fn read_all(&self) -> Result<Vec<LogLine>, CollectionError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || codec::read_collection(&path))
            .await
            .map_err(join_failure)?
            .map_err(CollectionError::from)
    }
}

fn join_failure(err: tokio::task::JoinError) -> CollectionError {
    CollectionError::Codec(CodecError::IoFailure(std::io::Error::new(
        std::io::ErrorKind::Other,
        err,
    )))
}
