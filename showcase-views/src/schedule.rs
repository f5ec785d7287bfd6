//! Cancellable recurring task
//!
//! A [`TickTask`] owns its timer: dropping the handle, calling
//! [`TickTask::cancel`], or cancelling the parent token all stop it, so no
//! exit path can leak a running interval.

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Handle to a running recurring task
#[derive(Debug)]
pub struct TickTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl TickTask {
    /// Run `on_tick` every `period`, first call one full period after spawning
    ///
    /// The task stops when `parent` is cancelled or the returned handle is
    /// cancelled or dropped. Must be called inside a tokio runtime.
    pub fn spawn<F>(period: Duration, parent: &CancellationToken, mut on_tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let token = parent.child_token();
        let task_token = token.clone();

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            // A stalled runtime must not replay missed seconds in a burst
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = task_token.cancelled() => break,
                    _ = interval.tick() => on_tick(),
                }
            }
            debug!("Tick task stopped");
        });

        Self { token, handle }
    }

    /// Stop the task; no further ticks run after this returns
    pub fn cancel(self) {
        drop(self);
    }

    /// Whether the task has fully exited
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for TickTask {
    fn drop(&mut self) {
        self.token.cancel();
        self.handle.abort();
    }
}
