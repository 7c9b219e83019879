//! Idle-session reaper

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use sales_agent_agent::SessionStore;

/// Periodically clear sessions idle longer than `max_idle`.
///
/// Send `true` on the returned channel to stop the task.
pub fn start_idle_reaper(
    store: Arc<SessionStore>,
    interval: Duration,
    max_idle: Duration,
) -> watch::Sender<bool> {
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        let mut interval_timer = tokio::time::interval(interval);
        interval_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval_timer.tick() => {
                    let removed = store.clear_idle(max_idle);
                    if removed > 0 {
                        tracing::info!(
                            removed,
                            remaining = store.count(),
                            "Session cleanup: removed idle sessions"
                        );
                    }
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!("Session cleanup task shutting down");
                        break;
                    }
                }
            }
        }
    });

    shutdown_tx
}
