use crate::context::CancelHandle;
use anyhow::Result;
use futures_util::{Stream, StreamExt};
use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook_tokio::{Handle, Signals};
use tokio::task::JoinHandle;
use tracing::{error, warn};

pub(crate) struct SignalListener {
    handle: Handle,
    task: JoinHandle<()>,
}

/// Cancels the scenario on the first SIGINT or SIGTERM. The scenario still
/// tears down its container after cancellation. A second signal exits the
/// process without waiting for teardown.
pub(crate) fn listen(cancel: CancelHandle) -> Result<SignalListener> {
    let signals = Signals::new([SIGINT, SIGTERM])?;
    let handle = signals.handle();

    let task = tokio::spawn(async move {
        if let Some(signal) = watch(signals, cancel).await {
            error!(signal, "Received second signal, exiting without teardown");
            std::process::exit(128 + signal);
        }
    });

    Ok(SignalListener { handle, task })
}

/// Returns the second signal, or `None` if the stream ends before one arrives.
async fn watch<S>(mut signals: S, cancel: CancelHandle) -> Option<i32>
where
    S: Stream<Item = i32> + Unpin,
{
    let signal = signals.next().await?;
    warn!(signal, "Received signal, cancelling scenario");
    cancel.cancel();

    signals.next().await
}

impl SignalListener {
    pub(crate) async fn stop(self) {
        self.handle.close();

        if let Err(err) = self.task.await {
            warn!("Signal listener task failed: {}", err);
        }
    }
}
