//! Background I/O worker owned by a client.
//!
//! One named OS thread runs a current-thread tokio runtime; queries are handed
//! to it as boxed futures over a channel, so issuing one never blocks.

use std::thread;

use futures::future::BoxFuture;
use tokio::runtime::{Builder, Runtime};
use tokio::sync::{mpsc, oneshot};

use crate::error::{Error, Result};

const WORKER_THREAD_NAME: &str = "soundcloud-io";

/// Unit of work executed on the worker
pub(crate) type Job = BoxFuture<'static, ()>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SessionState {
    Created,
    Running,
    Stopping,
    Stopped,
}

pub(crate) struct Session {
    state: SessionState,
    runtime: Option<Runtime>,
    jobs: Option<mpsc::UnboundedSender<Job>>,
    shutdown: Option<oneshot::Sender<()>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl Session {
    pub(crate) fn new() -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(Error::transport)?;

        Ok(Self {
            state: SessionState::Created,
            runtime: Some(runtime),
            jobs: None,
            shutdown: None,
            worker: None,
        })
    }

    pub(crate) fn state(&self) -> SessionState {
        self.state
    }

    /// Spawn the worker. Only valid once, from `Created`.
    pub(crate) fn start(&mut self) -> Result<()> {
        let runtime = match (self.state, self.runtime.take()) {
            (SessionState::Created, Some(runtime)) => runtime,
            _ => return Err(Error::SessionStopped),
        };

        let (jobs_tx, mut jobs_rx) = mpsc::unbounded_channel::<Job>();
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let worker = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || {
                tracing::debug!("Transport worker running");
                runtime.block_on(async move {
                    loop {
                        tokio::select! {
                            biased;
                            _ = &mut shutdown_rx => break,
                            job = jobs_rx.recv() => match job {
                                Some(job) => {
                                    tokio::spawn(job);
                                }
                                None => break,
                            },
                        }
                    }
                });
                // Dropping the runtime drops every unfinished query with it
                drop(runtime);
                tracing::debug!("Transport worker exited");
            })
            .map_err(Error::transport)?;

        self.jobs = Some(jobs_tx);
        self.shutdown = Some(shutdown_tx);
        self.worker = Some(worker);
        self.state = SessionState::Running;
        Ok(())
    }

    /// Queue a job on the worker.
    pub(crate) fn submit(&self, job: Job) -> Result<()> {
        match (&self.jobs, self.state) {
            (Some(jobs), SessionState::Running) => {
                jobs.send(job).map_err(|_| Error::SessionStopped)
            }
            _ => Err(Error::SessionStopped),
        }
    }

    /// Unblock the worker's loop and join it. Idempotent.
    pub(crate) fn stop(&mut self) {
        match self.state {
            SessionState::Created => {
                if let Some(runtime) = self.runtime.take() {
                    runtime.shutdown_background();
                }
            }
            SessionState::Running => {
                self.state = SessionState::Stopping;
                self.jobs = None;
                if let Some(shutdown) = self.shutdown.take() {
                    let _ = shutdown.send(());
                }
                if let Some(worker) = self.worker.take() {
                    if worker.join().is_err() {
                        tracing::error!("Transport worker panicked");
                    }
                }
            }
            SessionState::Stopping | SessionState::Stopped => {}
        }
        self.state = SessionState::Stopped;
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::time::Duration;

    #[test]
    fn lifecycle_moves_through_states() {
        let mut session = Session::new().unwrap();
        assert_eq!(session.state(), SessionState::Created);

        session.start().unwrap();
        assert_eq!(session.state(), SessionState::Running);

        session.stop();
        assert_eq!(session.state(), SessionState::Stopped);

        session.stop();
        assert_eq!(session.state(), SessionState::Stopped);
    }

    #[test]
    fn jobs_run_on_the_worker_thread() {
        let mut session = Session::new().unwrap();
        session.start().unwrap();

        let (tx, rx) = oneshot::channel();
        session
            .submit(
                async move {
                    let name = thread::current().name().map(str::to_string);
                    let _ = tx.send(name);
                }
                .boxed(),
            )
            .unwrap();

        assert_eq!(rx.blocking_recv().unwrap().as_deref(), Some(WORKER_THREAD_NAME));
    }

    #[test]
    fn submit_fails_unless_running() {
        let mut session = Session::new().unwrap();
        assert!(matches!(
            session.submit(async {}.boxed()),
            Err(Error::SessionStopped)
        ));

        session.start().unwrap();
        session.stop();
        assert!(matches!(
            session.submit(async {}.boxed()),
            Err(Error::SessionStopped)
        ));
        assert!(matches!(session.start(), Err(Error::SessionStopped)));
    }

    #[test]
    fn drop_joins_worker_and_releases_pending_jobs() {
        let mut session = Session::new().unwrap();
        session.start().unwrap();

        let (tx, rx) = oneshot::channel::<()>();
        session
            .submit(
                async move {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    let _ = tx.send(());
                }
                .boxed(),
            )
            .unwrap();

        drop(session);
        assert!(rx.blocking_recv().is_err());
    }
}
