//! # Observability & Tracing
//!
//! Structured logging for collection actors, built on the `tracing` crate.
//!
//! ## What Gets Traced
//!
//! - **Actor Lifecycle**: start, stop, and how many queued requests were rejected on stop
//! - **Requests**: one `debug` event per append, read and stop, tagged with the file `path`
//! - **Errors**: `warn` events carrying the codec error for failed appends and reads
//! - **Client Calls**: `append`, `read_all` and `stop` are instrumented with a span per call
//!
//! ## Usage Examples
//!
//! ```bash
//! # Lifecycle only
//! RUST_LOG=info
//!
//! # Every request
//! RUST_LOG=debug
//!
//! # Only this crate
//! RUST_LOG=logaggr=debug
//! ```
//!
//! With `RUST_LOG=debug` an append shows up as:
//!
//! ```text
//! DEBUG append: Sending append path=/var/lib/logaggr/access.txt
//! DEBUG Append path=/var/lib/logaggr/access.txt fields=4
//! ```

/// Installs a compact `fmt` subscriber filtered by `RUST_LOG`.
///
/// Call once at process start; a second call panics because a global subscriber is
/// already set.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
