//! Handle to a background prefetch.

use musing_core::{Error, Quote, Result};
use tokio::task::JoinHandle;

/// A prefetch running on the runtime.
///
/// Dropping the handle detaches the task; it keeps running to completion.
/// Awaiting [`PrefetchHandle::wait`] reports whether the quote was stored.
#[derive(Debug)]
pub struct PrefetchHandle {
    task: JoinHandle<Result<Quote>>,
}

impl PrefetchHandle {
    pub(crate) const fn new(task: JoinHandle<Result<Quote>>) -> Self {
        Self { task }
    }

    /// Whether the task has already finished.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the prefetch and return the stored quote.
    pub async fn wait(self) -> Result<Quote> {
        self.task
            .await
            .map_err(|e| Error::Internal(format!("Prefetch task failed: {e}")))?
    }

    /// Stop the prefetch if it has not finished yet.
    pub fn abort(&self) {
        self.task.abort();
    }
}
