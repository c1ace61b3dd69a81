//! Single-assignment delivery of a query's outcome.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use serde_json::Value;
use tokio::sync::oneshot;

use super::cancel::CancelFlag;
use super::decode::handle_response;
use super::request::Request;
use super::transport::{Progress, Transport};
use crate::error::{Error, Result};
use crate::log_api_result;

/// Caller's half of a query. Resolves exactly once.
///
/// Await it from async code, or [`wait`](Self::wait) from a plain thread.
#[must_use = "a query's outcome is only observable through its future"]
#[derive(Debug)]
pub struct QueryFuture<T> {
    receiver: oneshot::Receiver<Result<T>>,
}

impl<T> QueryFuture<T> {
    /// A future that is already resolved with `err`.
    pub(crate) fn failed(err: Error) -> Self {
        let (promise, receiver) = oneshot::channel();
        let _ = promise.send(Err(err));
        Self { receiver }
    }

    /// Block the current thread until the query resolves.
    ///
    /// Panics if called from inside an async runtime; `.await` there instead.
    pub fn wait(self) -> Result<T> {
        self.receiver
            .blocking_recv()
            .unwrap_or(Err(Error::SessionStopped))
    }
}

impl<T> Future for QueryFuture<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|outcome| outcome.unwrap_or(Err(Error::SessionStopped)))
    }
}

/// Worker-side state of one in-flight query
pub(crate) struct PendingQuery<T, F> {
    operation: &'static str,
    promise: oneshot::Sender<Result<T>>,
    decode: F,
    cancel: CancelFlag,
}

impl<T, F> PendingQuery<T, F>
where
    T: Send + 'static,
    F: FnOnce(&Value) -> Result<T> + Send + 'static,
{
    pub(crate) fn new(operation: &'static str, decode: F, cancel: CancelFlag) -> (Self, QueryFuture<T>) {
        let (promise, receiver) = oneshot::channel();
        let pending = Self {
            operation,
            promise,
            decode,
            cancel,
        };
        (pending, QueryFuture { receiver })
    }

    /// Drive the request to completion and fulfil the promise. Consumes the
    /// query, so the promise cannot be fulfilled twice.
    pub(crate) async fn run(self, transport: Arc<dyn Transport>, request: Request) {
        let Self {
            operation,
            promise,
            decode,
            cancel,
        } = self;

        let checkpoint = move |progress: Progress| cancel.checkpoint(progress);
        let outcome = match transport.execute(request, &checkpoint).await {
            Ok(response) => handle_response(response, decode),
            Err(err) => Err(err),
        };

        match &outcome {
            Err(Error::Cancelled) => tracing::debug!(operation, "Query cancelled"),
            _ => log_api_result!(operation, outcome),
        }

        if promise.send(outcome).is_err() {
            tracing::trace!(operation, "Query future dropped before completion");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::request::build_request;
    use crate::api::testing::{capture_logs, ScriptedTransport, Step};
    use crate::config::Config;
    use reqwest::StatusCode;
    use serde_json::json;

    fn request() -> Request {
        build_request(&Config::default(), &["tracks.json"], &[]).unwrap()
    }

    fn count(root: &Value) -> Result<usize> {
        Ok(root.as_array().map(Vec::len).unwrap_or(0))
    }

    #[tokio::test]
    async fn failed_future_is_already_resolved() {
        let outcome = QueryFuture::<()>::failed(Error::Cancelled).await;
        assert!(matches!(outcome, Err(Error::Cancelled)));
    }

    #[tokio::test]
    async fn dropped_query_resolves_as_stopped() {
        let (pending, future) = PendingQuery::new("test", count, CancelFlag::new());
        drop(pending);
        assert!(matches!(future.await, Err(Error::SessionStopped)));
    }

    #[tokio::test]
    async fn run_delivers_decoded_value() {
        let transport: Arc<dyn Transport> = Arc::new(ScriptedTransport::respond(
            StatusCode::OK,
            json!([1, 2, 3]),
        ));
        let (pending, future) = PendingQuery::new("test", count, CancelFlag::new());

        pending.run(transport, request()).await;
        assert_eq!(future.await.unwrap(), 3);
    }

    #[tokio::test]
    async fn run_observes_cancel_at_first_checkpoint() {
        let transport: Arc<dyn Transport> =
            Arc::new(ScriptedTransport::new(|_| Step::Fail("unreachable")));
        let cancel = CancelFlag::new();
        cancel.cancel();
        let (pending, future) = PendingQuery::new("test", count, cancel);

        pending.run(transport, request()).await;
        assert!(matches!(future.await, Err(Error::Cancelled)));
    }

    #[test]
    fn outcome_is_logged_with_the_operation() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let (outcome, logs) = capture_logs(|| {
            let transport: Arc<dyn Transport> =
                Arc::new(ScriptedTransport::respond(StatusCode::OK, json!([1])));
            let (pending, future) = PendingQuery::new("lookup", count, CancelFlag::new());
            runtime.block_on(async move {
                pending.run(transport, request()).await;
                future.await
            })
        });
        assert_eq!(outcome.unwrap(), 1);
        assert!(logs.contains("INFO"), "{logs}");
        assert!(logs.contains("API request successful"), "{logs}");
        assert!(logs.contains("lookup"), "{logs}");

        let (outcome, logs) = capture_logs(|| {
            let transport: Arc<dyn Transport> =
                Arc::new(ScriptedTransport::new(|_| Step::Fail("connection reset")));
            let (pending, future) = PendingQuery::new("lookup", count, CancelFlag::new());
            runtime.block_on(async move {
                pending.run(transport, request()).await;
                future.await
            })
        });
        assert!(outcome.is_err());
        assert!(logs.contains("ERROR"), "{logs}");
        assert!(logs.contains("API request failed"), "{logs}");
    }
}
