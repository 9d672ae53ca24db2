//! Single-slot undo.
//!
//! The server hands out an opaque token for every move it performs. Only
//! the most recent token is kept; there is no history stack.

use rfe_core::RemoteFs;
use tracing::{debug, info, warn};

use crate::error::OpsResult;

/// Holder for the last issued undo token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UndoSlot {
    token: Option<String>,
}

impl UndoSlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of the latest move.
    ///
    /// A move that issued no token clears the slot, so an older token can
    /// never undo something other than the last move.
    pub fn store(&mut self, token: Option<String>) {
        match token.filter(|t| !t.is_empty()) {
            Some(token) => {
                debug!(%token, "Undo token replaced");
                self.token = Some(token);
            }
            None => {
                if let Some(old) = self.token.take() {
                    debug!(token = %old, "Undo token dropped by a move without one");
                }
            }
        }
    }

    /// The held token.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Whether a token is held.
    pub fn is_empty(&self) -> bool {
        self.token.is_none()
    }

    /// Drop the held token.
    pub fn clear(&mut self) {
        self.token = None;
    }

    /// Apply the held token.
    ///
    /// Returns `Ok(false)` without calling the server when the slot is empty.
    /// Otherwise the token is cleared whatever the outcome of the call.
    pub async fn apply(&mut self, remote: &dyn RemoteFs) -> OpsResult<bool> {
        let Some(token) = self.token.take() else {
            return Ok(false);
        };

        match remote.undo(&token).await {
            Ok(()) => {
                info!(%token, "Undo applied");
                Ok(true)
            }
            Err(e) => {
                warn!(%token, error = %e, "Undo failed");
                Err(e.into())
            }
        }
    }
}
