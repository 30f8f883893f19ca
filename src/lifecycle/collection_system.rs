use crate::collection::{CollectionActor, CollectionClient, CollectionError};
use crate::config::CollectionConfig;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Keeps exactly one running actor per collection file in this process.
///
/// Actors are created on first use by [`collection`](Self::collection) and live until they
/// are stopped, either one at a time with [`stop_collection`](Self::stop_collection) or all
/// together with [`shutdown`](Self::shutdown).
///
/// Paths are used as given; two spellings of the same file are two collections.
///
/// # Example
///
/// ```no_run
/// use logaggr::lifecycle::CollectionSystem;
/// use logaggr::model::LogLine;
///
/// # async fn demo() -> Result<(), logaggr::collection::CollectionError> {
/// let system = CollectionSystem::new();
///
/// let access = system.collection("/var/lib/logaggr/access.txt");
/// access.append(LogLine::new()).await?;
///
/// system.shutdown().await?;
/// # Ok(())
/// # }
/// ```
pub struct CollectionSystem {
    config: CollectionConfig,
    collections: Mutex<HashMap<PathBuf, RunningCollection>>,
}

struct RunningCollection {
    client: CollectionClient,
    handle: JoinHandle<()>,
}

impl CollectionSystem {
    pub fn new() -> Self {
        Self::with_config(CollectionConfig::default())
    }

    /// Creates a system whose actors and clients all use `config`.
    pub fn with_config(config: CollectionConfig) -> Self {
        Self {
            config,
            collections: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    /// Returns the client for the collection at `path`, starting its actor on first use.
    ///
    /// If the previous actor for `path` has stopped, a fresh one replaces it.
    /// Must be called from within a tokio runtime.
    pub fn collection(&self, path: impl AsRef<Path>) -> CollectionClient {
        let path = path.as_ref();
        let mut collections = self.lock();

        if let Some(running) = collections.get(path) {
            if running.client.is_running() {
                return running.client.clone();
            }
            info!(path = %path.display(), "Restarting stopped collection actor");
        }

        let (client, handle) = CollectionActor::spawn(path, &self.config);
        collections.insert(
            path.to_path_buf(),
            RunningCollection {
                client: client.clone(),
                handle,
            },
        );
        info!(path = %path.display(), size = collections.len(), "Collection registered");
        client
    }

    /// Stops the actor for `path` and forgets it. Returns `false` if none was registered.
    pub async fn stop_collection(&self, path: impl AsRef<Path>) -> Result<bool, CollectionError> {
        let removed = self.lock().remove(path.as_ref());
        match removed {
            Some(running) => {
                running.stop().await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Number of registered collections, stopped or not.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Gracefully shuts down every collection actor.
    ///
    /// Each actor is sent a stop request and its task is awaited. Every actor is given the
    /// chance to stop; the first failure is returned afterwards.
    pub async fn shutdown(self) -> Result<(), CollectionError> {
        info!("Shutting down collections...");

        let collections = self
            .collections
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut first_error = None;
        for (path, running) in collections {
            if let Err(e) = running.stop().await {
                warn!(path = %path.display(), error = %e, "Collection failed to stop");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                info!("Collections shutdown complete.");
                Ok(())
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, RunningCollection>> {
        self.collections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for CollectionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl RunningCollection {
    async fn stop(self) -> Result<(), CollectionError> {
        self.client.stop().await?;
        if let Err(e) = self.handle.await {
            error!("Collection actor task failed: {:?}", e);
            return Err(CollectionError::ActorDropped);
        }
        Ok(())
    }
}
