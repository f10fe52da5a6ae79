//! Interval pollers for the live telemetry feeds.
//!
//! Each feed gets its own task: a fetch closure is awaited to completion
//! before the next tick fires, so results from one feed always apply in
//! the order they were fetched. Cancellation is checked both before a
//! fetch starts and after it resolves; a result that lands after the
//! handle is cancelled is discarded, never applied.

use std::future::Future;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Handle to a running poll task. Cancels the task when dropped.
#[derive(Debug)]
pub struct PollHandle {
    cancel: CancellationToken,
}

impl PollHandle {
    /// Stop the poll task. In-flight fetches are abandoned and their
    /// results discarded.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Spawn a poll task that runs `fetch` every `interval` and feeds each
/// result to `apply`.
///
/// The first fetch fires immediately; ticks missed while a slow fetch is
/// in flight are skipped rather than bursted. `apply` is only ever called
/// from this task, strictly in fetch order.
pub fn spawn_poller<T, Fetch, Fut, Apply>(
    interval: Duration,
    mut fetch: Fetch,
    mut apply: Apply,
) -> PollHandle
where
    T: Send + 'static,
    Fetch: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = T> + Send + 'static,
    Apply: FnMut(T) + Send + 'static,
{
    let cancel = CancellationToken::new();
    let task_cancel = cancel.clone();

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                () = task_cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let result = tokio::select! {
                biased;
                () = task_cancel.cancelled() => break,
                result = fetch() => result,
            };

            // A cancel racing the fetch must not mutate state.
            if task_cancel.is_cancelled() {
                break;
            }
            apply(result);
        }
        debug!(interval_ms = interval.as_millis() as u64, "poller stopped");
    });

    PollHandle { cancel }
}
