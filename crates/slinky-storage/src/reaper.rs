use slinky_core::Repository;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// One sweep per day.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Background task that deletes expired rows from a repository on a fixed
/// interval.
pub struct Reaper;

impl Reaper {
    /// Spawns the sweep loop onto the current tokio runtime.
    ///
    /// The first sweep runs immediately. A failed sweep is logged and the
    /// loop carries on with the next tick.
    pub fn spawn<R>(store: R, interval: Duration) -> ReaperHandle
    where
        R: Repository + Clone,
    {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(interval_secs = interval.as_secs(), "Reaper started");

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => sweep(&store).await,
                }
            }

            info!("Reaper stopped");
        });

        ReaperHandle {
            shutdown: Some(shutdown_tx),
            task,
        }
    }
}

async fn sweep<R: Repository>(store: &R) {
    match store.purge_expired().await {
        Ok(0) => debug!("Reaper sweep found nothing to remove"),
        Ok(removed) => info!(removed, "Reaper removed expired records"),
        Err(e) => warn!(error = %e, "Reaper sweep failed"),
    }
}

/// Owner of a running [`Reaper`] task.
#[derive(Debug)]
pub struct ReaperHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl ReaperHandle {
    /// Signals the loop to stop and waits for it to exit.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            // The task may already be gone; nothing to signal then.
            let _ = tx.send(());
        }
        if let Err(e) = (&mut self.task).await {
            warn!(error = %e, "Reaper task ended abnormally");
        }
    }
}
