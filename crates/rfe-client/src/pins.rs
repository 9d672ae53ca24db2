//! Pinned directories shown in the sidebar.

use rfe_core::{Entry, RemoteFs, RemoteResult};
use tracing::{debug, info};

/// Server-side list of pinned paths.
#[derive(Debug, Clone, Default)]
pub struct Pins {
    paths: Vec<String>,
}

impl Pins {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Pins as directory entries.
    pub fn entries(&self) -> Vec<Entry> {
        self.paths.iter().cloned().map(Entry::from_path).collect()
    }

    /// Reload the list.
    pub async fn refresh(&mut self, remote: &dyn RemoteFs) -> RemoteResult<()> {
        self.paths = remote.pins().await?;
        debug!(count = self.paths.len(), "Pins loaded");
        Ok(())
    }

    /// Pin a directory and reload.
    pub async fn pin(&mut self, remote: &dyn RemoteFs, path: &str) -> RemoteResult<()> {
        remote.pin(path).await?;
        info!(path, "Pinned");
        self.refresh(remote).await
    }

    /// Remove a pin and reload.
    pub async fn unpin(&mut self, remote: &dyn RemoteFs, path: &str) -> RemoteResult<()> {
        remote.unpin(path).await?;
        info!(path, "Unpinned");
        self.refresh(remote).await
    }
}

/// What a drop on the pin area pins: the first selected directory.
pub fn pin_drop_target<'a>(selected: &[&'a Entry]) -> Option<&'a Entry> {
    selected.iter().copied().find(|e| e.is_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rfe_core::mock::MockRemote;

    #[tokio::test]
    async fn test_pin_and_unpin_refresh() {
        let remote = MockRemote::new();
        let mut pins = Pins::new();

        pins.pin(&remote, r"C:\Work").await.unwrap();
        assert_eq!(pins.paths(), [r"C:\Work".to_string()]);
        assert_eq!(pins.entries()[0].name, "Work");

        pins.unpin(&remote, r"c:\work").await.unwrap();
        assert!(pins.paths().is_empty());
    }

    #[test]
    fn test_drop_target_skips_files() {
        let file = Entry::file("a.txt", r"C:\a.txt", 1);
        let dir = Entry::dir("B", r"C:\B");
        assert_eq!(pin_drop_target(&[&file, &dir]).unwrap().path, r"C:\B");
        assert!(pin_drop_target(&[&file]).is_none());
    }
}
