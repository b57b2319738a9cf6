//! Timer host capability and the bundled tokio implementation.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Identifier of one scheduled timer within a host.
pub type TimerId = u64;

/// Capability of a host timer registry.
///
/// One-shot and repeating schedule, each with a matching cancel. Cancelling
/// an id that already fired (or never existed) is a no-op; hosts never fail
/// on cancellation.
pub trait TimerHost: Send + Sync {
    /// Schedules `handler` to run once after `delay`.
    ///
    /// A zero delay means next-cycle execution under the host's scheduler.
    fn set_timeout(&self, handler: Box<dyn FnOnce() + Send>, delay: Duration) -> TimerId;

    /// Cancels a pending one-shot timer.
    fn clear_timeout(&self, id: TimerId);

    /// Schedules `handler` to run every `period` until cancelled.
    ///
    /// The first run happens one full period after scheduling.
    fn set_interval(&self, handler: Box<dyn FnMut() + Send>, period: Duration) -> TimerId;

    /// Stops future runs of a repeating timer.
    ///
    /// A run already in progress completes normally.
    fn clear_interval(&self, id: TimerId);
}

/// Production [`TimerHost`] backed by tokio tasks.
///
/// Each timer is a spawned task sleeping on the tokio clock; cancellation
/// aborts the task. Must be used from within a tokio runtime.
#[derive(Default)]
pub struct TokioTimerHost {
    tasks: Arc<DashMap<TimerId, JoinHandle<()>>>,
    next_id: AtomicU64,
}

impl TokioTimerHost {
    /// Creates a new tokio timer host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of timers not yet fired or cancelled.
    #[must_use]
    pub fn active_timers(&self) -> usize {
        self.tasks.len()
    }

    fn next_id(&self) -> TimerId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn cancel(&self, id: TimerId) {
        if let Some((_, handle)) = self.tasks.remove(&id) {
            handle.abort();
        }
    }
}

impl TimerHost for TokioTimerHost {
    fn set_timeout(&self, handler: Box<dyn FnOnce() + Send>, delay: Duration) -> TimerId {
        let id = self.next_id();
        let tasks = Arc::clone(&self.tasks);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            handler();
            tasks.remove(&id);
        });
        self.tasks.insert(id, handle);
        id
    }

    fn clear_timeout(&self, id: TimerId) {
        self.cancel(id);
    }

    fn set_interval(&self, mut handler: Box<dyn FnMut() + Send>, period: Duration) -> TimerId {
        let id = self.next_id();
        // tokio intervals reject a zero period; clamp to the smallest tick.
        let period = period.max(Duration::from_millis(1));
        let handle = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut ticker = tokio::time::interval_at(start, period);
            loop {
                ticker.tick().await;
                handler();
            }
        });
        self.tasks.insert(id, handle);
        id
    }

    fn clear_interval(&self, id: TimerId) {
        self.cancel(id);
    }
}

impl std::fmt::Debug for TokioTimerHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokioTimerHost")
            .field("active_timers", &self.active_timers())
            .finish()
    }
}
