//! Host statistics for the status bar.

use std::sync::Arc;
use std::time::Duration;

use humansize::{BINARY, format_size};
use rfe_core::{RemoteFs, SystemStats};
use tokio::sync::mpsc;
use tracing::debug;

use crate::STATS_CHANNEL_SIZE;

/// Display-ready host statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSnapshot {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub memory_used: String,
    pub memory_total: String,
    pub disk_percent: f64,
    pub disk_free: String,
}

impl From<SystemStats> for StatsSnapshot {
    fn from(stats: SystemStats) -> Self {
        Self {
            cpu_percent: stats.cpu_percent,
            memory_percent: stats.memory_percent,
            memory_used: format_size(stats.memory_used, BINARY),
            memory_total: format_size(stats.memory_total, BINARY),
            disk_percent: stats.disk_percent,
            disk_free: format_size(stats.disk_free, BINARY),
        }
    }
}

/// Fetch statistics for the volume holding `path`. Failures yield `None`.
pub async fn fetch_stats(remote: &dyn RemoteFs, path: &str) -> Option<StatsSnapshot> {
    match remote.monitor_stats(path).await {
        Ok(stats) => Some(stats.into()),
        Err(e) => {
            debug!(path, error = %e, "Stats unavailable");
            None
        }
    }
}

/// Poll statistics on a fixed interval until the receiver is dropped.
pub fn start_stats_poll(
    remote: Arc<dyn RemoteFs>,
    path: String,
    interval: Duration,
) -> mpsc::Receiver<StatsSnapshot> {
    let (tx, rx) = mpsc::channel(STATS_CHANNEL_SIZE);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if let Some(snapshot) = fetch_stats(remote.as_ref(), &path).await {
                if tx.send(snapshot).await.is_err() {
                    break;
                }
            } else if tx.is_closed() {
                break;
            }
        }
    });

    rx
}
