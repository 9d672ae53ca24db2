//! Current-path state and directory loading.

use rfe_core::path::{self, Breadcrumb};
use rfe_core::{Entry, RemoteError, RemoteFs, RemoteResult};
use tracing::{debug, warn};

use crate::generation::{Generation, Ticket};

/// A listing fetch in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    ticket: Ticket,
    path: String,
}

impl LoadTicket {
    /// The path being loaded.
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// What happened to a finished listing fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The listing replaced the current one.
    Committed,
    /// A newer load started meanwhile; the result was dropped.
    Stale,
    /// The fetch failed; the previous listing and path are kept.
    Failed(RemoteError),
}

impl LoadOutcome {
    /// Whether the listing was committed.
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed)
    }
}

/// The directory being shown and its entries.
#[derive(Debug, Clone)]
pub struct Navigation {
    current_path: String,
    entries: Vec<Entry>,
    generation: Generation,
}

impl Navigation {
    /// Create a navigation state at `initial_path` with no entries loaded.
    pub fn new(initial_path: impl Into<String>) -> Self {
        Self {
            current_path: initial_path.into(),
            entries: Vec::new(),
            generation: Generation::new(),
        }
    }

    /// The directory currently shown.
    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    /// Entries of the current directory, as last loaded.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Breadcrumbs of the current path.
    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        path::segments(&self.current_path)
    }

    /// Target of a "go up" action.
    pub fn parent_path(&self) -> String {
        path::parent_or_root(&self.current_path)
    }

    /// Start loading `path`, superseding any load in flight.
    pub fn begin_load(&mut self, path: &str) -> LoadTicket {
        let ticket = self.generation.begin();
        debug!(path, generation = ticket.get(), "Loading directory");
        LoadTicket {
            ticket,
            path: path.to_string(),
        }
    }

    /// Commit the result of a load if it is still the latest one.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: RemoteResult<Vec<Entry>>,
    ) -> LoadOutcome {
        if !self.generation.is_current(ticket.ticket) {
            debug!(
                path = %ticket.path,
                stale = ticket.ticket.get(),
                current = self.generation.current(),
                "Discarding stale listing"
            );
            return LoadOutcome::Stale;
        }

        match result {
            Ok(entries) => {
                debug!(path = %ticket.path, count = entries.len(), "Listing committed");
                self.entries = entries;
                self.current_path = ticket.path;
                LoadOutcome::Committed
            }
            Err(e) => {
                warn!(path = %ticket.path, error = %e, "Listing failed");
                LoadOutcome::Failed(e)
            }
        }
    }

    /// Fetch and commit the listing of `path`.
    pub async fn load(&mut self, remote: &dyn RemoteFs, path: &str) -> LoadOutcome {
        let ticket = self.begin_load(path);
        let result = remote.list(path, false).await;
        self.finish_load(ticket, result)
    }
}
