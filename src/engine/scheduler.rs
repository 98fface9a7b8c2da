//! Weight Tuning Scheduler
//!
//! Long-running worker that periodically drives the tuner. A shutdown signal
//! preempts the inter-tick sleep; an in-flight pass is drained before exit.
//! Tuning failures are logged and never terminate the process.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::{Engine, TuneError};

/// Spawn the scheduler worker. Runs one pass immediately, then one per
/// interval until the shutdown channel flips.
pub fn spawn(
    engine: Arc<Engine>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!(
            interval_secs = interval.as_secs(),
            "weight tuning scheduler started"
        );

        loop {
            match engine.tune().await {
                Ok(result) => tracing::info!(
                    heuristic_weight = result.heuristic_weight,
                    ml_weight = result.ml_weight,
                    samples = result.samples_used,
                    "weight tuning pass complete"
                ),
                Err(TuneError::Busy) => {
                    tracing::debug!("tune already in flight; skipping tick")
                }
                Err(e) => tracing::warn!("weight tuning failed: {}", e),
            }

            tokio::select! {
                _ = shutdown.changed() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }

        tracing::info!("weight tuning scheduler stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tests::memory_engine;

    #[tokio::test]
    async fn test_shutdown_preempts_sleep() {
        let engine = memory_engine().await;
        let (tx, rx) = watch::channel(false);

        // An hour-long interval: only the stop signal can end the loop
        let handle = spawn(engine, Duration::from_secs(3600), rx);
        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("scheduler did not stop within a second")
            .unwrap();
    }
}
