//! In-memory transport and fixtures for unit tests

use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use flate2::write::GzEncoder;
use flate2::Compression;
use futures::future::{BoxFuture, FutureExt};
use reqwest::StatusCode;
use serde_json::Value;

use super::request::Request;
use super::transport::{Checkpoint, Next, Progress, Response, Transport};
use crate::error::{Error, Result};

const STALL_POLL: Duration = Duration::from_millis(5);

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a plain-text subscriber on this thread and return what it logged
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .finish();

    let output = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8_lossy(&buffer.0.lock().unwrap()).into_owned();
    (output, logs)
}

pub fn gzip(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap()
}

/// What the scripted server does with one request
pub enum Step {
    /// Answer with this body as-is
    Raw { status: StatusCode, body: Vec<u8> },
    /// Answer with gzip JSON after `delay`
    Delayed {
        delay: Duration,
        status: StatusCode,
        body: Value,
    },
    Fail(&'static str),
    /// Never answer; keep reporting progress until aborted
    Stall,
}

type Script = Box<dyn Fn(&Request) -> Step + Send + Sync>;

pub struct ScriptedTransport {
    script: Script,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedTransport {
    pub fn new(script: impl Fn(&Request) -> Step + Send + Sync + 'static) -> Self {
        Self {
            script: Box::new(script),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer every request immediately with `body`
    pub fn respond(status: StatusCode, body: Value) -> Self {
        Self::new(move |_| Step::Delayed {
            delay: Duration::ZERO,
            status,
            body: body.clone(),
        })
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    async fn answer(&self, request: Request, checkpoint: &Checkpoint) -> Result<Response> {
        let step = (self.script)(&request);
        self.requests.lock().unwrap().push(request);

        if checkpoint(Progress::started()) == Next::Abort {
            return Err(Error::Cancelled);
        }

        match step {
            Step::Raw { status, body } => Ok(Response { status, body }),
            Step::Delayed {
                delay,
                status,
                body,
            } => {
                tokio::time::sleep(delay).await;
                let body = gzip(body.to_string().as_bytes());
                let progress = Progress {
                    downloaded: body.len() as u64,
                    total: Some(body.len() as u64),
                };
                if checkpoint(progress) == Next::Abort {
                    return Err(Error::Cancelled);
                }
                Ok(Response { status, body })
            }
            Step::Fail(reason) => Err(Error::transport(reason)),
            Step::Stall => loop {
                tokio::time::sleep(STALL_POLL).await;
                if checkpoint(Progress::started()) == Next::Abort {
                    return Err(Error::Cancelled);
                }
            },
        }
    }
}

impl Transport for ScriptedTransport {
    fn execute<'a>(
        &'a self,
        request: Request,
        checkpoint: &'a Checkpoint,
    ) -> BoxFuture<'a, Result<Response>> {
        self.answer(request, checkpoint).boxed()
    }
}
