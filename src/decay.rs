//! The recurring decay tick.
//!
//! Decay runs as a dedicated tokio task on a fixed interval, independent of
//! any sync: the tick body is a single state-store operation (plain
//! arithmetic under the store's lock), so it neither blocks on nor is
//! blocked by an in-flight sync beyond that lock. Cancellation stops future
//! ticks; there is no meaningful mid-tick cancellation point.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::state::StateStore;

/// Default interval between decay ticks (1 hour).
const DEFAULT_TICK_INTERVAL_SECS: u64 = 3600;

/// Configuration for the decay timer.
#[derive(Debug, Clone, Copy)]
pub struct DecayConfig {
    /// Interval between ticks.
    ///
    /// Default: 1 hour. Configure via `PIXELPET_DECAY_INTERVAL_SECS`.
    pub tick_interval: Duration,
}

impl Default for DecayConfig {
    fn default() -> Self {
        DecayConfig {
            tick_interval: Duration::from_secs(DEFAULT_TICK_INTERVAL_SECS),
        }
    }
}

impl DecayConfig {
    /// Creates a `DecayConfig` from environment variables.
    ///
    /// Reads `PIXELPET_DECAY_INTERVAL_SECS` for the tick interval; other
    /// values use defaults.
    pub fn from_env() -> Self {
        let secs = std::env::var("PIXELPET_DECAY_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TICK_INTERVAL_SECS);

        DecayConfig {
            tick_interval: Duration::from_secs(secs),
        }
    }
}

/// Handle to a running decay task.
///
/// Dropping the handle does not stop the task; call [`DecayTask::cancel`] or
/// [`DecayTask::shutdown`].
pub struct DecayTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl DecayTask {
    /// Requests cancellation without waiting for the task to finish.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Cancels the task and waits for it to stop.
    pub async fn shutdown(self) {
        self.token.cancel();
        if let Err(err) = self.handle.await {
            warn!(error = %err, "decay task ended abnormally");
        }
    }
}

/// Spawns the recurring decay task.
///
/// The first tick fires immediately (a pet left alone while the process was
/// down decays on startup), then every `tick_interval`.
pub fn spawn_decay_task(store: Arc<StateStore>, config: DecayConfig) -> DecayTask {
    let token = CancellationToken::new();
    let task_token = token.clone();

    let handle = tokio::spawn(async move {
        info!(interval_secs = config.tick_interval.as_secs(), "decay task started");
        let mut ticker = tokio::time::interval(config.tick_interval);

        loop {
            tokio::select! {
                _ = task_token.cancelled() => {
                    info!("decay task stopped");
                    break;
                }
                _ = ticker.tick() => {
                    debug!("applying decay tick");
                    if let Err(err) = store.decay_all(Utc::now()).await {
                        // A failed persist skips this tick; the next one
                        // re-derives from last-commit timestamps anyway.
                        warn!(error = %err, "decay tick failed");
                    }
                }
            }
        }
    });

    DecayTask { token, handle }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RepoRef, Species};
    use tempfile::tempdir;

    async fn stale_store() -> (tempfile::TempDir, Arc<StateStore>) {
        let dir = tempdir().unwrap();
        let store = Arc::new(StateStore::open(dir.path().join("state.json")).unwrap());
        let id = store
            .add_project(
                RepoRef::new("octocat", "hello-world"),
                None,
                Species::CommitCat,
                "Pixel",
            )
            .await
            .unwrap();
        // Last commit far enough back that every tick decays.
        store
            .record_history(&id, vec![], 0, Some(Utc::now() - chrono::Duration::days(30)))
            .await
            .unwrap();
        (dir, store)
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_fires_immediately() {
        let (_dir, store) = stale_store().await;
        let task = spawn_decay_task(
            store.clone(),
            DecayConfig {
                tick_interval: Duration::from_secs(3600),
            },
        );

        // Let the spawned task run its startup tick.
        tokio::time::sleep(Duration::from_millis(10)).await;

        let snapshot = store.snapshot().await;
        let pet = &snapshot.projects[0].pet;
        assert_eq!(pet.health, 95);
        assert_eq!(pet.happiness, 92);

        task.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_repeat_on_the_interval() {
        let (_dir, store) = stale_store().await;
        let task = spawn_decay_task(
            store.clone(),
            DecayConfig {
                tick_interval: Duration::from_secs(3600),
            },
        );

        // Startup tick plus two interval ticks.
        tokio::time::sleep(Duration::from_secs(7201)).await;

        let snapshot = store.snapshot().await;
        let pet = &snapshot.projects[0].pet;
        assert_eq!(pet.health, 100 - 3 * 5);
        assert_eq!(pet.happiness, 100 - 3 * 8);

        task.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_future_ticks() {
        let (_dir, store) = stale_store().await;
        let task = spawn_decay_task(
            store.clone(),
            DecayConfig {
                tick_interval: Duration::from_secs(3600),
            },
        );

        tokio::time::sleep(Duration::from_millis(10)).await;
        task.shutdown().await;

        let health_after_cancel = store.snapshot().await.projects[0].pet.health;
        tokio::time::sleep(Duration::from_secs(3 * 3600)).await;

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.projects[0].pet.health, health_after_cancel);
    }

    #[test]
    fn config_default_is_one_hour() {
        assert_eq!(
            DecayConfig::default().tick_interval,
            Duration::from_secs(3600)
        );
    }
}
