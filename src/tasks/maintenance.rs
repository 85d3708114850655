//! Maintenance Task
//!
//! Background task that periodically purges expired entries and logs a
//! statistics snapshot.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::cache::{Cache, CacheValue};

/// Shortest accepted interval; `tokio::time::interval` rejects zero.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Handle to a running maintenance task.
#[derive(Debug)]
pub struct MaintenanceHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl MaintenanceHandle {
    /// Signals the task and waits for it to exit.
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            error!("Maintenance task ended abnormally: {}", e);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawns a background task that runs [`Cache::run_maintenance`] every
/// `interval`.
///
/// The first run happens one full interval after spawning. A run that
/// panics is logged and the schedule continues. Intervals shorter than
/// 1ms are raised to 1ms. Stop the task with [`MaintenanceHandle::stop`].
///
/// # Example
/// ```ignore
/// let cache: Cache<serde_json::Value> = Cache::new(CacheConfig::default())?;
/// let maintenance = spawn_maintenance_task(cache.clone(), Duration::from_secs(300));
/// // Later, during shutdown:
/// maintenance.stop().await;
/// ```
pub fn spawn_maintenance_task<T: CacheValue>(
    cache: Cache<T>,
    interval: Duration,
) -> MaintenanceHandle {
    spawn_schedule(interval, move || {
        let cache = cache.clone();
        async move { cache.run_maintenance().await.expired_removed }
    })
}

/// Runs `job` on a fixed schedule until cancelled. Each run yields the
/// number of expired entries it removed.
fn spawn_schedule<F, Fut>(interval: Duration, mut job: F) -> MaintenanceHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = usize> + Send + 'static,
{
    let interval = interval.max(MIN_INTERVAL);
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    let task = tokio::spawn(async move {
        info!(
            "Starting cache maintenance task with interval of {}ms",
            interval.as_millis()
        );

        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    info!("Cache maintenance task stopped");
                    break;
                }
                _ = ticker.tick() => {
                    match AssertUnwindSafe(async { job().await }).catch_unwind().await {
                        Ok(removed) => debug!(
                            "Cache maintenance run finished, {} expired entries removed",
                            removed
                        ),
                        Err(_) => error!("Cache maintenance run panicked; will retry next tick"),
                    }
                }
            }
        }
    });

    MaintenanceHandle { cancel, task }
}
