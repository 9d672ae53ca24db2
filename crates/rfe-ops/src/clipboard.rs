//! Single-item copy/cut staging.

use rfe_core::{Entry, RemoteFs};
use strum::Display;
use tracing::{info, warn};

use crate::error::OpsResult;
use crate::undo::UndoSlot;

/// Clipboard mode determines paste behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ClipboardMode {
    /// Paste copies the staged entry.
    #[strum(to_string = "copy")]
    Copy,
    /// Paste moves the staged entry.
    #[strum(to_string = "cut")]
    Cut,
}

/// What a settled paste did.
#[derive(Debug, Clone, PartialEq)]
pub struct PasteOutcome {
    /// The entry that was pasted.
    pub entry: Entry,
    /// How it was pasted.
    pub mode: ClipboardMode,
}

/// The clipboard slot. Holds at most one staged entry.
#[derive(Debug, Clone, Default)]
pub struct ClipboardSlot {
    staged: Option<(Entry, ClipboardMode)>,
}

impl ClipboardSlot {
    /// Create an empty clipboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage an entry for copying, replacing whatever was staged.
    pub fn copy(&mut self, entry: Entry) {
        self.staged = Some((entry, ClipboardMode::Copy));
    }

    /// Stage an entry for moving, replacing whatever was staged.
    pub fn cut(&mut self, entry: Entry) {
        self.staged = Some((entry, ClipboardMode::Cut));
    }

    /// The staged entry.
    pub fn entry(&self) -> Option<&Entry> {
        self.staged.as_ref().map(|(entry, _)| entry)
    }

    /// The staged mode.
    pub fn mode(&self) -> Option<ClipboardMode> {
        self.staged.as_ref().map(|(_, mode)| *mode)
    }

    /// Check if the clipboard is empty.
    pub fn is_empty(&self) -> bool {
        self.staged.is_none()
    }

    /// Clear the clipboard.
    pub fn clear(&mut self) {
        self.staged = None;
    }

    /// Paste the staged entry into `target_dir`.
    ///
    /// Returns `Ok(None)` when nothing is staged. The slot is cleared once
    /// the remote call settles, whether it succeeded or not. A cut captures
    /// the returned undo token.
    pub async fn paste_here(
        &mut self,
        remote: &dyn RemoteFs,
        target_dir: &str,
        undo: &mut UndoSlot,
    ) -> OpsResult<Option<PasteOutcome>> {
        let Some((entry, mode)) = self.staged.take() else {
            return Ok(None);
        };

        let result = match mode {
            ClipboardMode::Copy => remote.copy_to(&entry.path, target_dir).await,
            ClipboardMode::Cut => remote
                .move_to(&entry.path, target_dir)
                .await
                .map(|receipt| undo.store(receipt.undo_token)),
        };

        match result {
            Ok(()) => {
                info!(source = %entry.path, target = target_dir, %mode, "Pasted");
                Ok(Some(PasteOutcome { entry, mode }))
            }
            Err(e) => {
                warn!(source = %entry.path, target = target_dir, %mode, error = %e, "Paste failed");
                Err(e.into())
            }
        }
    }
}
