//! Drag-and-drop moves.

use rfe_core::{Entry, MoveReceipt, RemoteError, RemoteFs};
use tracing::{debug, info, warn};

use crate::guard::{MoveSkip, check_move};
use crate::undo::UndoSlot;

/// Paths being dragged. Exists only between drag start and drop or drag end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragPayload {
    sources: Vec<String>,
    active: bool,
}

impl DragPayload {
    /// Create an inactive payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start dragging `sources`.
    pub fn begin(&mut self, sources: Vec<String>) {
        debug!(count = sources.len(), "Drag started");
        self.sources = sources;
        self.active = true;
    }

    /// End the drag without dropping.
    pub fn end(&mut self) {
        self.sources.clear();
        self.active = false;
    }

    /// Whether a drag is in progress.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The dragged paths.
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Take the dragged paths, ending the drag.
    pub fn take(&mut self) -> Vec<String> {
        self.active = false;
        std::mem::take(&mut self.sources)
    }
}

/// Result of a sequential batch of moves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoveBatch {
    /// Receipts of the moves that succeeded, in source order.
    pub moved: Vec<MoveReceipt>,
    /// Source paths of the moves that succeeded, parallel to `moved`.
    pub moved_from: Vec<String>,
    /// Moves vetoed by a guard.
    pub skipped: Vec<MoveSkip>,
    /// The move that failed and stopped the batch.
    pub failed: Option<(String, RemoteError)>,
}

impl MoveBatch {
    /// Check if every attempted move succeeded.
    pub fn is_success(&self) -> bool {
        self.failed.is_none()
    }

    /// Get a human-readable summary of the batch.
    pub fn summary(&self) -> String {
        match &self.failed {
            None if self.skipped.is_empty() => format!("Moved {} items", self.moved.len()),
            None => format!(
                "Moved {} items, {} skipped",
                self.moved.len(),
                self.skipped.len()
            ),
            Some((source, err)) => format!(
                "Moved {} items; {} failed: {}",
                self.moved.len(),
                source,
                err.user_message()
            ),
        }
    }
}

/// Move each of `sources` into `destination`, one call at a time in order.
///
/// Guarded sources are skipped without a call. The batch stops at the first
/// failure. Every successful move overwrites the undo slot, so it ends up
/// holding the token of the last move, or nothing if that move issued none.
pub async fn move_batch(
    remote: &dyn RemoteFs,
    sources: &[String],
    destination: &str,
    undo: &mut UndoSlot,
) -> MoveBatch {
    let mut batch = MoveBatch::default();

    for source in sources {
        if let Some(skip) = check_move(source, destination) {
            debug!(source = %skip.source, kind = %skip.kind, "Move skipped");
            batch.skipped.push(skip);
            continue;
        }

        match remote.move_to(source, destination).await {
            Ok(receipt) => {
                undo.store(receipt.undo_token.clone());
                batch.moved.push(receipt);
                batch.moved_from.push(source.clone());
            }
            Err(e) => {
                warn!(%source, destination, error = %e, "Move failed");
                batch.failed = Some((source.clone(), e));
                break;
            }
        }
    }

    info!(
        moved = batch.moved.len(),
        skipped = batch.skipped.len(),
        destination,
        "Move batch finished"
    );
    batch
}

/// Drop the dragged paths onto `target`.
///
/// Ends the drag. Returns `None` without any call when `target` is not a
/// directory or nothing was dragged.
pub async fn drop_on(
    remote: &dyn RemoteFs,
    payload: &mut DragPayload,
    target: &Entry,
    undo: &mut UndoSlot,
) -> Option<MoveBatch> {
    let sources = payload.take();
    if !target.is_dir {
        debug!(target = %target.path, "Drop on a file ignored");
        return None;
    }
    if sources.is_empty() {
        return None;
    }
    Some(move_batch(remote, &sources, &target.path, undo).await)
}
