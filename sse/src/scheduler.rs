use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Why a suspension ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    Elapsed,
    Cancelled,
}

/// Cooperative delay primitive bound to one session's cancellation token.
///
/// Suspending only parks the calling task, so other sessions keep running on
/// the same runtime. Cancellation always wins a race against the timer.
#[derive(Debug, Clone)]
pub struct Scheduler {
    cancel: CancellationToken,
}

impl Scheduler {
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Suspends the current task for `duration`, returning early if the
    /// session is cancelled in the meantime.
    pub async fn suspend(&self, duration: Duration) -> Wake {
        if duration.is_zero() {
            tokio::task::yield_now().await;
            return if self.is_cancelled() {
                Wake::Cancelled
            } else {
                Wake::Elapsed
            };
        }

        match self.interruptible(tokio::time::sleep(duration)).await {
            Some(()) => Wake::Elapsed,
            None => Wake::Cancelled,
        }
    }

    /// Drives `fut` to completion unless cancellation fires first.
    pub async fn interruptible<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            output = fut => Some(output),
        }
    }
}
