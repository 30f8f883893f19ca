//! # logaggr
//!
//! > **Single-writer storage for append-only JSON-lines log collections.**
//!
//! A collection is one file holding one JSON object per line. Many tasks may want to append
//! to it or read it back at the same time; this crate funnels all of them through a single
//! actor per file so that writes never interleave and every caller gets a definite answer:
//! success, a concrete error, or a timeout.
//!
//! ## 🏗️ Design
//!
//! ### One Actor per File
//! Each [`CollectionActor`](collection::CollectionActor) runs in its own Tokio task and owns
//! its collection file. Requests arrive on one channel and are executed one at a time, so the
//! order they are observed in is the order of the lines on disk. No file locks are involved.
//!
//! ### Private Reply Channels
//! Every request carries its own `oneshot` reply channel. The caller waits on it for at most
//! the configured service timeout (5 seconds by default). A timeout means the caller gave up,
//! not that the request was cancelled.
//!
//! ### Line-Atomic Appends
//! A record and its newline are written with one `write_all`; a failed write is rolled back,
//! so a reader only ever sees complete lines.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Record ([`model`])
//! [`LogLine`](model::LogLine): any JSON object.
//!
//! ### 2. The Format ([`codec`])
//! Encoding, decoding and forward-only reading of collection files. End of stream is
//! `Ok(None)`, never an error.
//!
//! ### 3. The Engine ([`collection`])
//! The actor, its client, the request enum, and a mock for tests.
//!
//! ### 4. The Orchestrator ([`lifecycle`])
//! [`CollectionSystem`](lifecycle::CollectionSystem) keeps one actor per file and shuts them
//! down; [`setup_tracing`](lifecycle::setup_tracing) configures logging.
//!
//! ### 5. Settings ([`config`])
//! [`CollectionConfig`](config::CollectionConfig), including `serviceTimeout`.
//!
//! ## 🚀 Quick Start
//!
//! ```no_run
//! use logaggr::config::CollectionConfig;
//! use logaggr::lifecycle::{setup_tracing, CollectionSystem};
//! use logaggr::model::LogLine;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     setup_tracing();
//!
//!     let system = CollectionSystem::with_config(CollectionConfig::default().with_create_if_missing(true));
//!     let access = system.collection("access.txt");
//!
//!     let line = LogLine::try_from(serde_json::json!({"method": "GET", "url": "/test/url"}))?;
//!     access.append(line).await?;
//!
//!     for line in access.read_all().await? {
//!         println!("{:?}", line);
//!     }
//!
//!     system.shutdown().await?;
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod collection;
pub mod config;
pub mod lifecycle;
pub mod model;
