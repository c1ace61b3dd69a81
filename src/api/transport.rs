//! Transport seam: anything that can execute a [`Request`] while polling a
//! progress checkpoint.

use std::future::Future;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use reqwest::StatusCode;
use tokio::time::MissedTickBehavior;

use super::request::Request;
use crate::error::{Error, Result};

/// Snapshot handed to the progress checkpoint
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    /// Body bytes received so far
    pub downloaded: u64,
    /// Body length when the server announced one
    pub total: Option<u64>,
}

impl Progress {
    pub fn started() -> Self {
        Self {
            downloaded: 0,
            total: None,
        }
    }
}

/// Checkpoint verdict
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Next {
    Continue,
    Abort,
}

pub type Checkpoint = dyn Fn(Progress) -> Next + Send + Sync;

/// How often a request that is waiting on the network re-checks its checkpoint
pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// Await `future`, consulting `checkpoint` every [`PROGRESS_INTERVAL`] until it
/// completes. Progress events fire on the timer even when no bytes arrive.
pub async fn with_checkpoints<F: Future>(
    future: F,
    checkpoint: &Checkpoint,
    progress: Progress,
) -> Result<F::Output> {
    tokio::pin!(future);
    let mut ticks = tokio::time::interval(PROGRESS_INTERVAL);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            output = &mut future => return Ok(output),
            _ = ticks.tick() => {
                if checkpoint(progress) == Next::Abort {
                    return Err(Error::Cancelled);
                }
            }
        }
    }
}

/// Raw response as received, body still compressed
#[derive(Clone, Debug)]
pub struct Response {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// Executes requests for a [`Client`](super::Client).
///
/// Implementations must consult `checkpoint` at least once per request and
/// answer [`Error::Cancelled`] as soon as it returns [`Next::Abort`].
pub trait Transport: Send + Sync {
    fn execute<'a>(
        &'a self,
        request: Request,
        checkpoint: &'a Checkpoint,
    ) -> BoxFuture<'a, Result<Response>>;
}

/// Production transport over reqwest
///
/// reqwest's own gzip handling is disabled, so bodies arrive exactly as sent.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(Error::transport)?;
        Ok(Self { client })
    }

    async fn fetch(&self, request: Request, checkpoint: &Checkpoint) -> Result<Response> {
        if checkpoint(Progress::started()) == Next::Abort {
            return Err(Error::Cancelled);
        }

        let send = self.client.get(request.url).headers(request.headers).send();
        let mut response = with_checkpoints(send, checkpoint, Progress::started())
            .await?
            .map_err(Error::transport)?;

        let status = response.status();
        let mut progress = Progress {
            downloaded: 0,
            total: response.content_length(),
        };
        let mut body = Vec::new();

        while let Some(chunk) = with_checkpoints(response.chunk(), checkpoint, progress)
            .await?
            .map_err(Error::transport)?
        {
            body.extend_from_slice(&chunk);
            progress.downloaded += chunk.len() as u64;
            if checkpoint(progress) == Next::Abort {
                return Err(Error::Cancelled);
            }
        }

        tracing::trace!(status = %status, bytes = body.len(), "Response received");
        Ok(Response { status, body })
    }
}

impl Transport for HttpTransport {
    fn execute<'a>(
        &'a self,
        request: Request,
        checkpoint: &'a Checkpoint,
    ) -> BoxFuture<'a, Result<Response>> {
        self.fetch(request, checkpoint).boxed()
    }
}
