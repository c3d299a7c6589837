use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};

use wearvote_db::Store;
use wearvote_db::lifecycle::{PurgeReport, now_millis};

/// Background task that drops messages and notifications older than an hour.
///
/// The first pass runs immediately, then once per `every`.
pub async fn run_cleanup_loop(store: Arc<Store>, every: Duration) {
    let mut interval = tokio::time::interval(every);

    loop {
        interval.tick().await;

        match cleanup_expired(&store).await {
            Ok(report) => {
                if report.messages > 0 || report.notifications > 0 {
                    info!(
                        "Cleanup: pruned {} messages, {} notifications",
                        report.messages, report.notifications
                    );
                }
            }
            Err(e) => {
                warn!("Cleanup error: {}", e);
            }
        }
    }
}

pub async fn cleanup_expired(store: &Arc<Store>) -> anyhow::Result<PurgeReport> {
    let store = store.clone();
    let report = tokio::task::spawn_blocking(move || store.purge_expired(now_millis()))
        .await
        .context("spawn_blocking join error")??;
    Ok(report)
}
