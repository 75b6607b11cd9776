use engine::SyncScheduler;
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};

/// Runs a bulk sync on a fixed interval, forever. The first run fires
/// immediately; a run that overshoots the interval delays the next tick
/// instead of bursting to catch up.
pub async fn run(scheduler: SyncScheduler, every: Duration) {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        tracing::info!("starting scheduled bulk sync");
        match scheduler.sync_all().await {
            Ok(updated) => tracing::info!(updated, "scheduled bulk sync finished"),
            Err(e) => tracing::error!(error = %e, "scheduled bulk sync failed"),
        }
    }
}
