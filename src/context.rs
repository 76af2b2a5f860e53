use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub(crate) enum Interrupted {
    #[error("scenario deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),
    #[error("scenario cancelled")]
    Cancelled,
}

/// Deadline and cancellation signal shared by every blocking step of a scenario.
#[derive(Debug, Clone)]
pub(crate) struct ExecutionContext {
    budget: Duration,
    deadline: Instant,
    cancelled: watch::Receiver<bool>,
}

/// Cancels the context when dropped.
#[derive(Debug)]
pub(crate) struct ContextGuard {
    tx: Arc<watch::Sender<bool>>,
}

#[derive(Debug, Clone)]
pub(crate) struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ExecutionContext {
    pub(crate) fn with_timeout(budget: Duration) -> (Self, ContextGuard) {
        let (tx, rx) = watch::channel(false);
        let ctx = Self {
            budget,
            deadline: Instant::now() + budget,
            cancelled: rx,
        };

        (ctx, ContextGuard { tx: Arc::new(tx) })
    }

    pub(crate) fn deadline(&self) -> Instant {
        self.deadline
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    /// Drives `fut` until it completes, the deadline passes or the context is
    /// cancelled, whichever comes first. An interrupted future is dropped.
    pub(crate) async fn run<F>(&self, fut: F) -> Result<F::Output, Interrupted>
    where
        F: Future,
    {
        let mut cancelled = self.cancelled.clone();

        tokio::select! {
            biased;
            _ = cancelled.wait_for(|cancelled| *cancelled) => Err(Interrupted::Cancelled),
            output = tokio::time::timeout_at(self.deadline, fut) => {
                output.map_err(|_| Interrupted::DeadlineExceeded(self.budget))
            }
        }
    }
}

impl ContextGuard {
    pub(crate) fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            tx: self.tx.clone(),
        }
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        self.tx.send_replace(true);
    }
}

impl CancelHandle {
    pub(crate) fn cancel(&self) {
        self.tx.send_replace(true);
    }
}
