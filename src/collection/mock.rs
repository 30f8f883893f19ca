//! # Mock Collection
//!
//! Utilities for testing code that talks to a collection without touching a file.
//!
//! [`MockCollection`] hands out a real [`CollectionClient`] whose requests are answered from
//! a queue of scripted expectations. An expectation can also be told never to reply, which
//! is how caller-side timeouts are exercised.
//!
//! ```
//! use logaggr::collection::mock::MockCollection;
//! use logaggr::model::LogLine;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mock = MockCollection::new();
//! mock.expect_append().return_ok(());
//! mock.expect_stop().return_ok(());
//!
//! let client = mock.client();
//! client.append(LogLine::new()).await.unwrap();
//! client.stop().await.unwrap();
//!
//! assert_eq!(mock.appended().len(), 1);
//! mock.verify();
//! # }
//! ```

use super::message::{CollectionRequest, Response};
use super::{CollectionClient, CollectionError};
use crate::model::LogLine;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

/// A scripted reply. `None` means the request is held and never answered.
enum Expectation {
    Append(Option<Result<(), CollectionError>>),
    ReadAll(Option<Result<Vec<LogLine>, CollectionError>>),
    Stop(Option<Result<(), CollectionError>>),
}

impl Expectation {
    fn kind(&self) -> &'static str {
        match self {
            Expectation::Append(_) => "append",
            Expectation::ReadAll(_) => "read_all",
            Expectation::Stop(_) => "stop",
        }
    }
}

type Expectations = Arc<Mutex<VecDeque<Expectation>>>;

/// A stand-in for a running collection actor.
pub struct MockCollection {
    client: CollectionClient,
    expectations: Expectations,
    appended: Arc<Mutex<Vec<LogLine>>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl MockCollection {
    /// Creates a mock with no expectations and the default service timeout.
    pub fn new() -> Self {
        Self::with_service_timeout(Duration::from_secs(5))
    }

    pub fn with_service_timeout(timeout: Duration) -> Self {
        let (sender, mut receiver) = mpsc::channel::<CollectionRequest>(100);
        let running = Arc::new(AtomicBool::new(true));
        let expectations: Expectations = Arc::new(Mutex::new(VecDeque::new()));
        let appended = Arc::new(Mutex::new(Vec::new()));

        let task_expectations = expectations.clone();
        let task_appended = appended.clone();
        let task_running = running.clone();
        let handle = tokio::spawn(async move {
            // Replies that must never arrive are parked here so their channels stay open.
            let mut held_unit: Vec<Response<()>> = Vec::new();
            let mut held_lines: Vec<Response<Vec<LogLine>>> = Vec::new();

            while let Some(request) = receiver.recv().await {
                let expectation = task_expectations.lock().unwrap().pop_front();

                match (request, expectation) {
                    (
                        CollectionRequest::Append { line, respond_to },
                        Some(Expectation::Append(reply)),
                    ) => {
                        task_appended.lock().unwrap().push(line);
                        match reply {
                            Some(result) => {
                                let _ = respond_to.send(result);
                            }
                            None => held_unit.push(respond_to),
                        }
                    }
                    (
                        CollectionRequest::ReadAll { respond_to },
                        Some(Expectation::ReadAll(reply)),
                    ) => match reply {
                        Some(result) => {
                            let _ = respond_to.send(result);
                        }
                        None => held_lines.push(respond_to),
                    },
                    (CollectionRequest::Stop { respond_to }, Some(Expectation::Stop(reply))) => {
                        match reply {
                            Some(result) => {
                                if result.is_ok() {
                                    task_running.store(false, Ordering::Release);
                                }
                                let _ = respond_to.send(result);
                            }
                            None => held_unit.push(respond_to),
                        }
                    }
                    (request, expectation) => {
                        panic!(
                            "Unexpected {} request, expected {}",
                            request.kind(),
                            expectation.map_or("nothing", |e| e.kind())
                        );
                    }
                }
            }
        });

        Self {
            client: CollectionClient::new(sender, running, "mock-collection", timeout),
            expectations,
            appended,
            _handle: handle,
        }
    }

    /// Returns a client wired to this mock.
    pub fn client(&self) -> CollectionClient {
        self.client.clone()
    }

    pub fn expect_append(&self) -> ExpectationBuilder<()> {
        ExpectationBuilder::new(self.expectations.clone(), Expectation::Append)
    }

    pub fn expect_read_all(&self) -> ExpectationBuilder<Vec<LogLine>> {
        ExpectationBuilder::new(self.expectations.clone(), Expectation::ReadAll)
    }

    pub fn expect_stop(&self) -> ExpectationBuilder<()> {
        ExpectationBuilder::new(self.expectations.clone(), Expectation::Stop)
    }

    /// Every line received by an append request, in arrival order.
    pub fn appended(&self) -> Vec<LogLine> {
        self.appended.lock().unwrap().clone()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }
}

impl Default for MockCollection {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for a single scripted reply.
pub struct ExpectationBuilder<T> {
    expectations: Expectations,
    wrap: fn(Option<Result<T, CollectionError>>) -> Expectation,
}

impl<T> ExpectationBuilder<T> {
    fn new(
        expectations: Expectations,
        wrap: fn(Option<Result<T, CollectionError>>) -> Expectation,
    ) -> Self {
        Self { expectations, wrap }
    }

    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: T) {
        self.push(Some(Ok(value)));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: CollectionError) {
        self.push(Some(Err(error)));
    }

    /// Accepts the request but never answers it.
    pub fn never_reply(self) {
        self.push(None);
    }

    fn push(self, reply: Option<Result<T, CollectionError>>) {
        self.expectations.lock().unwrap().push_back((self.wrap)(reply));
    }
}

/// Creates a client and the receiver its requests land on.
///
/// For tests that want to inspect or answer each request by hand rather than script
/// replies up front. See [`MockCollection`] for the fluent API.
pub fn create_mock_client(
    buffer_size: usize,
    service_timeout: Duration,
) -> (CollectionClient, mpsc::Receiver<CollectionRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    let running = Arc::new(AtomicBool::new(true));
    let client = CollectionClient::new(sender, running, "mock-collection", service_timeout);
    (client, receiver)
}

/// Helper to verify that the next message is an Append request.
pub async fn expect_append(
    receiver: &mut mpsc::Receiver<CollectionRequest>,
) -> Option<(LogLine, Response<()>)> {
    match receiver.recv().await {
        Some(CollectionRequest::Append { line, respond_to }) => Some((line, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn log_line(value: serde_json::Value) -> LogLine {
        LogLine::try_from(value).unwrap()
    }

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_client(10, Duration::from_secs(1));

        let append_task =
            tokio::spawn(async move { client.append(log_line(json!({"a": 1.0}))).await });

        let (line, responder) = expect_append(&mut receiver)
            .await
            .expect("Expected Append request");
        assert_eq!(line.get("a"), Some(&json!(1.0)));
        responder.send(Ok(())).unwrap();

        assert!(append_task.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_mock_collection_with_expectations() {
        let mock = MockCollection::new();
        mock.expect_append().return_ok(());
        mock.expect_read_all()
            .return_ok(vec![log_line(json!({"a": 1.0}))]);
        mock.expect_stop().return_ok(());

        let client = mock.client();
        client.append(log_line(json!({"a": 1}))).await.unwrap();
        let lines = client.read_all().await.unwrap();
        assert_eq!(lines.len(), 1);
        client.stop().await.unwrap();
        assert!(!client.is_running());

        assert_eq!(mock.appended(), vec![log_line(json!({"a": 1}))]);
        mock.verify();
    }

    #[tokio::test]
    async fn test_scripted_error_reaches_caller() {
        let mock = MockCollection::new();
        mock.expect_append().return_err(CollectionError::Stopped);

        let result = mock.client().append(LogLine::new()).await;
        assert!(matches!(result, Err(CollectionError::Stopped)));
        mock.verify();
    }

    #[tokio::test]
    async fn test_never_reply_times_out() {
        let mock = MockCollection::with_service_timeout(Duration::from_millis(50));
        mock.expect_append().never_reply();

        let result = mock.client().append(LogLine::new()).await;
        assert!(matches!(result, Err(CollectionError::Timeout(d)) if d == Duration::from_millis(50)));
        // The request still reached the actor.
        assert_eq!(mock.appended().len(), 1);
    }
}
