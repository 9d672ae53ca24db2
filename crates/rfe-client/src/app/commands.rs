//! Mutating actions of the session: clipboard, drag and drop, undo,
//! single-entry edits, uploads, downloads, sharing, properties and pins.

use std::sync::Arc;

use rfe_core::{Entry, UploadFile, path};
use rfe_ops::{
    ClipboardMode, MoveBatch, OpsError, UploadComplete, create_directory, create_file, delete,
    drop_on, rename,
};
use tracing::warn;

use super::ClientSession;
use super::constants::{
    DOWNLOAD_FAILED_PREFIX, FAST_ZIP_DEFAULT, PROPERTIES_LOAD_FAILED, PROPERTIES_SAVE_FAILED,
};
use crate::download::DownloadPlan;
use crate::pins::pin_drop_target;
use crate::tree::NodeId;

/// Result of a paste action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasteResult {
    /// Nothing was staged.
    Empty,
    Pasted(ClipboardMode),
    Failed,
}

impl ClientSession {
    fn report(&mut self, error: &OpsError) {
        self.toasts.error(error.user_message());
    }

    /// Stage an entry for copying.
    pub fn copy(&mut self, entry: Entry) {
        self.clipboard.copy(entry);
    }

    /// Stage an entry for moving.
    pub fn cut(&mut self, entry: Entry) {
        self.clipboard.cut(entry);
    }

    /// Paste the staged entry into the current directory and reload.
    pub async fn paste_here(&mut self) -> PasteResult {
        if self.clipboard.is_empty() {
            return PasteResult::Empty;
        }
        let remote = Arc::clone(&self.remote);
        let target = self.nav.current_path().to_string();

        let result = self
            .clipboard
            .paste_here(remote.as_ref(), &target, &mut self.undo)
            .await;
        let outcome = match result {
            Ok(Some(pasted)) => {
                let moved = match pasted.mode {
                    ClipboardMode::Cut => vec![pasted.entry.path.clone()],
                    ClipboardMode::Copy => Vec::new(),
                };
                self.refresh_tree_after(&target, &moved).await;
                PasteResult::Pasted(pasted.mode)
            }
            Ok(None) => PasteResult::Empty,
            Err(e) => {
                self.report(&e);
                PasteResult::Failed
            }
        };
        self.reload().await;
        outcome
    }

    /// Reverse the last move and reload. Returns whether an undo was sent.
    pub async fn undo(&mut self) -> bool {
        if self.undo.is_empty() {
            return false;
        }
        let remote = Arc::clone(&self.remote);
        if let Err(e) = self.undo.apply(remote.as_ref()).await {
            self.report(&e);
        }
        self.reload().await;
        true
    }

    /// Start dragging a displayed entry.
    pub fn begin_drag(&mut self, entry: &Entry) {
        let displayed = self.displayed();
        let sources = self.selection.drag_sources(entry, &displayed);
        self.drag.begin(sources);
    }

    /// Start dragging a tree node.
    pub fn begin_tree_drag(&mut self, id: NodeId) {
        let sources = self.tree.drag_sources(id);
        if !sources.is_empty() {
            self.drag.begin(sources);
        }
    }

    /// Abandon the drag.
    pub fn end_drag(&mut self) {
        self.drag.end();
    }

    /// Drop the dragged entries onto a directory of the listing.
    pub async fn drop_on_entry(&mut self, target: &Entry) -> Option<MoveBatch> {
        self.drop_into(target.clone()).await
    }

    /// Drop the dragged entries onto a tree node.
    pub async fn drop_on_tree_node(&mut self, id: NodeId) -> Option<MoveBatch> {
        let target = self.tree.node(id)?.entry().clone();
        self.drop_into(target).await
    }

    async fn drop_into(&mut self, target: Entry) -> Option<MoveBatch> {
        let remote = Arc::clone(&self.remote);
        let batch = drop_on(remote.as_ref(), &mut self.drag, &target, &mut self.undo).await?;
        if let Some((source, e)) = &batch.failed {
            warn!(%source, error = %e, "Drop stopped early");
            self.toasts.error(batch.summary());
        }
        if !batch.moved_from.is_empty() {
            self.refresh_tree_after(&target.path, &batch.moved_from).await;
        }
        self.reload().await;
        Some(batch)
    }

    /// Refetch the tree nodes whose children changed: the destination and
    /// the former parent of every moved folder.
    async fn refresh_tree_after(&mut self, destination: &str, moved: &[String]) {
        let mut stale: Vec<NodeId> = self.tree.find(destination).into_iter().collect();
        for source in moved {
            // Only folders appear in the tree.
            if self.tree.find(source).is_none() {
                continue;
            }
            if let Some(parent) = self.tree.find(&path::parent_or_root(source)) {
                if !stale.contains(&parent) {
                    stale.push(parent);
                }
            }
        }

        let remote = Arc::clone(&self.remote);
        for id in stale {
            self.tree.refresh(id, remote.as_ref()).await;
        }
    }

    /// Rename an entry and reload. Returns whether a rename was sent.
    pub async fn rename(&mut self, entry: &Entry, new_name: &str) -> bool {
        let remote = Arc::clone(&self.remote);
        match rename(remote.as_ref(), entry, new_name).await {
            Ok(false) => false,
            Ok(true) => {
                self.reload().await;
                true
            }
            Err(e) => {
                self.report(&e);
                false
            }
        }
    }

    /// Delete an entry and reload.
    pub async fn delete(&mut self, entry: &Entry) -> bool {
        let remote = Arc::clone(&self.remote);
        match delete(remote.as_ref(), entry).await {
            Ok(()) => {
                self.reload().await;
                true
            }
            Err(e) => {
                self.report(&e);
                false
            }
        }
    }

    /// Create a folder in the current directory and reload.
    pub async fn create_folder(&mut self, name: &str) -> bool {
        let remote = Arc::clone(&self.remote);
        let dir = self.nav.current_path().to_string();
        match create_directory(remote.as_ref(), &dir, name).await {
            Ok(_) => {
                self.reload().await;
                true
            }
            Err(e) => {
                self.report(&e);
                false
            }
        }
    }

    /// Create an empty file in the current directory and reload.
    pub async fn create_file(&mut self, name: &str) -> bool {
        let remote = Arc::clone(&self.remote);
        let dir = self.nav.current_path().to_string();
        match create_file(remote.as_ref(), &dir, name).await {
            Ok(_) => {
                self.reload().await;
                true
            }
            Err(e) => {
                self.report(&e);
                false
            }
        }
    }

    /// Save the editor content. The editor is read-only afterwards.
    pub async fn save_editor(&mut self) -> bool {
        let remote = Arc::clone(&self.remote);
        match self.editor.save(remote.as_ref()).await {
            Ok(()) => true,
            Err(e) => {
                self.toasts.error(e.user_message());
                false
            }
        }
    }

    /// Upload files into the current directory.
    ///
    /// The directory reloads once when the queue ends, whether it finished
    /// or aborted.
    pub async fn upload(&mut self, files: Vec<UploadFile>) -> Option<UploadComplete> {
        self.uploads.stage(files);
        let remote = Arc::clone(&self.remote);
        let dest = self.nav.current_path().to_string();

        let complete = self.uploads.run(remote, &dest).await?;
        if complete.is_success() {
            self.toasts.success(complete.summary());
        } else {
            self.toasts.error(complete.summary());
        }
        self.reload().await;
        Some(complete)
    }

    /// Download the selection. Returns the file name and bytes.
    pub async fn download_selected(&mut self) -> Option<(String, Vec<u8>)> {
        let selected = self.selected();
        let refs: Vec<&Entry> = selected.iter().collect();
        let plan = DownloadPlan::for_selection(&refs, FAST_ZIP_DEFAULT)?;

        match plan.fetch(self.remote.as_ref()).await {
            Ok(bytes) => Some((plan.file_name().to_string(), bytes)),
            Err(e) => {
                self.toasts
                    .error(format!("{DOWNLOAD_FAILED_PREFIX}: {}", e.user_message()));
                None
            }
        }
    }

    /// Open the share panel for an entry.
    pub fn open_share(&mut self, entry: Entry) {
        self.share.open(entry);
    }

    /// Create a link for the entry in the share panel.
    pub async fn create_share_link(&mut self) -> Option<String> {
        let remote = Arc::clone(&self.remote);
        match self.share.create(remote.as_ref()).await {
            Ok(Some(link)) => Some(link.url.clone()),
            Ok(None) => None,
            Err(e) => {
                self.report(&e);
                None
            }
        }
    }

    pub fn close_share(&mut self) {
        self.share.close();
    }

    /// Open the properties panel for an entry.
    pub async fn open_properties(&mut self, entry: &Entry) -> bool {
        let remote = Arc::clone(&self.remote);
        match self.properties.open(remote.as_ref(), entry).await {
            Ok(()) => true,
            Err(e) => {
                warn!(path = %entry.path, error = %e, "Properties unavailable");
                self.toasts.error(PROPERTIES_LOAD_FAILED);
                false
            }
        }
    }

    /// Save the staged properties.
    pub async fn save_properties(&mut self) -> bool {
        let remote = Arc::clone(&self.remote);
        match self.properties.save(remote.as_ref()).await {
            Ok(saved) => saved,
            Err(e) => {
                warn!(error = %e, "Properties not saved");
                self.toasts.error(PROPERTIES_SAVE_FAILED);
                false
            }
        }
    }

    pub fn close_properties(&mut self) {
        self.properties.close();
    }

    /// Reload the pins.
    pub async fn refresh_pins(&mut self) {
        let remote = Arc::clone(&self.remote);
        if let Err(e) = self.pins.refresh(remote.as_ref()).await {
            self.toasts
                .error(format!("Cannot load pins: {}", e.user_message()));
        }
    }

    /// Pin a directory.
    pub async fn pin(&mut self, path: &str) -> bool {
        let remote = Arc::clone(&self.remote);
        match self.pins.pin(remote.as_ref(), path).await {
            Ok(()) => true,
            Err(e) => {
                self.toasts.error(format!("Cannot pin: {}", e.user_message()));
                false
            }
        }
    }

    /// Remove a pin.
    pub async fn unpin(&mut self, path: &str) -> bool {
        let remote = Arc::clone(&self.remote);
        match self.pins.unpin(remote.as_ref(), path).await {
            Ok(()) => true,
            Err(e) => {
                self.toasts
                    .error(format!("Cannot unpin: {}", e.user_message()));
                false
            }
        }
    }

    /// A drop on the pin area pins the first selected directory.
    pub async fn drop_on_pins(&mut self) -> bool {
        let selected = self.selected();
        let refs: Vec<&Entry> = selected.iter().collect();
        let Some(target) = pin_drop_target(&refs).map(|e| e.path.clone()) else {
            return false;
        };
        self.pin(&target).await
    }
}
