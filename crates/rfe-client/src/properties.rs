//! Properties panel: read-only flag and modification time.

use chrono::{DateTime, Utc};
use rfe_core::{Entry, MetaUpdate, RemoteFs, RemoteResult, StatInfo};
use tracing::{debug, info};

/// Metadata of one entry with staged edits.
#[derive(Debug, Clone, Default)]
pub struct PropertiesPanel {
    info: Option<StatInfo>,
    /// Staged read-only flag.
    pub readonly: bool,
    /// Staged modification time.
    pub modified: Option<DateTime<Utc>>,
}

impl PropertiesPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata as last fetched.
    pub fn info(&self) -> Option<&StatInfo> {
        self.info.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.info.is_some()
    }

    /// Fetch metadata for `entry` and stage its current values.
    pub async fn open(&mut self, remote: &dyn RemoteFs, entry: &Entry) -> RemoteResult<()> {
        self.fetch(remote, &entry.path).await
    }

    /// Send the staged values and re-fetch.
    pub async fn save(&mut self, remote: &dyn RemoteFs) -> RemoteResult<bool> {
        let Some(target) = self.info.as_ref().map(|i| i.path.clone()) else {
            return Ok(false);
        };
        let update = MetaUpdate {
            path: target.clone(),
            modified: self.modified.map(|t| t.timestamp_millis() as f64 / 1000.0),
            readonly: Some(self.readonly),
        };
        remote.update_meta(&update).await?;
        info!(path = %target, readonly = self.readonly, "Updated properties");
        self.fetch(remote, &target).await?;
        Ok(true)
    }

    pub fn close(&mut self) {
        *self = Self::default();
    }

    async fn fetch(&mut self, remote: &dyn RemoteFs, target: &str) -> RemoteResult<()> {
        let info = remote.stat(target).await?;
        debug!(path = target, readonly = info.readonly, "Properties loaded");
        self.readonly = info.readonly;
        self.modified = info.modified_at();
        self.info = Some(info);
        Ok(())
    }
}
