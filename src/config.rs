//! Configuration for collection actors.

use crate::codec::AppendOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings shared by a collection actor and its clients.
///
/// Keys are camelCase on the wire; `serviceTimeout` is given in milliseconds.
///
/// ```
/// use logaggr::config::CollectionConfig;
/// use std::time::Duration;
///
/// let config = CollectionConfig::from_json_str(r#"{"serviceTimeout": 250}"#).unwrap();
/// assert_eq!(config.service_timeout, Duration::from_millis(250));
/// assert_eq!(config.channel_capacity, 32);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionConfig {
    /// How long a caller waits for the actor to answer before giving up with a timeout.
    #[serde(default = "default_service_timeout", with = "duration_millis")]
    pub service_timeout: Duration,

    /// Capacity of the actor's inbound request channel.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Create the collection file on first append instead of failing with `FileNotFound`.
    #[serde(default)]
    pub create_if_missing: bool,

    /// Sync file data to stable storage after every append.
    #[serde(default = "default_sync_on_append")]
    pub sync_on_append: bool,
}

fn default_service_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_channel_capacity() -> usize {
    32
}

fn default_sync_on_append() -> bool {
    true
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            service_timeout: default_service_timeout(),
            channel_capacity: default_channel_capacity(),
            create_if_missing: false,
            sync_on_append: default_sync_on_append(),
        }
    }
}

impl CollectionConfig {
    /// Parses a JSON configuration document. Missing keys take their defaults.
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    pub fn with_service_timeout(mut self, timeout: Duration) -> Self {
        self.service_timeout = timeout;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    pub fn with_create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    pub fn with_sync_on_append(mut self, sync: bool) -> Self {
        self.sync_on_append = sync;
        self
    }

    pub fn append_options(&self) -> AppendOptions {
        AppendOptions {
            create_if_missing: self.create_if_missing,
            sync: self.sync_on_append,
        }
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
