use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::transport::{Next, Progress};

/// Client-wide cooperative cancellation.
///
/// Once set it stays set: every query issued by the client, before or after
/// the call to [`cancel`](Self::cancel), aborts at its next progress checkpoint.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent; safe from any thread.
    pub fn cancel(&self) {
        if !self.0.swap(true, Ordering::SeqCst) {
            tracing::debug!("Cancellation requested for all pending queries");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Progress checkpoint decision
    pub fn checkpoint(&self, progress: Progress) -> Next {
        if self.is_cancelled() {
            tracing::debug!(
                downloaded = progress.downloaded,
                total = ?progress.total,
                "Aborting request at progress checkpoint"
            );
            Next::Abort
        } else {
            Next::Continue
        }
    }
}
