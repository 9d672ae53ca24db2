//! Multi-item selection over the displayed list.
//!
//! Clicks are evaluated against the list as currently displayed (filtered
//! and paginated). Shift-click selects a contiguous range from the last
//! clicked index and replaces the selection; ctrl-click toggles one item.

use std::collections::HashSet;

use rfe_core::{Entry, path};
use tracing::debug;

/// Modifier keys held during a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClickModifiers {
    /// Ctrl on most platforms, Cmd on macOS.
    pub ctrl: bool,
    pub shift: bool,
}

impl ClickModifiers {
    /// No modifier held.
    pub const NONE: Self = Self {
        ctrl: false,
        shift: false,
    };

    /// Ctrl/Cmd held.
    pub const CTRL: Self = Self {
        ctrl: true,
        shift: false,
    };

    /// Shift held.
    pub const SHIFT: Self = Self {
        ctrl: false,
        shift: true,
    };
}

/// The selected entries, keyed by normalized path.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    keys: HashSet<String>,
    anchor: Option<usize>,
}

impl Selection {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a click on `displayed[idx]`.
    ///
    /// Shift-click without a valid anchor falls through to the ctrl or
    /// plain behavior. Out-of-range indices are ignored.
    pub fn click(&mut self, displayed: &[Entry], idx: usize, modifiers: ClickModifiers) {
        let Some(item) = displayed.get(idx) else {
            return;
        };

        match self.anchor.filter(|&a| a < displayed.len()) {
            Some(anchor) if modifiers.shift => {
                let (lo, hi) = if idx > anchor { (anchor, idx) } else { (idx, anchor) };
                self.keys = displayed[lo..=hi]
                    .iter()
                    .map(|e| path::normalize(&e.path))
                    .collect();
            }
            _ if modifiers.ctrl => {
                let key = path::normalize(&item.path);
                if !self.keys.remove(&key) {
                    self.keys.insert(key);
                }
                self.anchor = Some(idx);
            }
            _ => {
                self.keys.clear();
                self.keys.insert(path::normalize(&item.path));
                self.anchor = Some(idx);
            }
        }
        debug!(count = self.keys.len(), anchor = ?self.anchor, "Selection changed");
    }

    /// Whether `entry` is selected.
    pub fn contains(&self, entry: &Entry) -> bool {
        self.keys.contains(&path::normalize(&entry.path))
    }

    /// Number of selected entries.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Index of the last plain or ctrl click.
    pub fn anchor(&self) -> Option<usize> {
        self.anchor
    }

    /// Select only `entry`, keeping the anchor.
    pub fn select_only(&mut self, entry: &Entry) {
        self.keys.clear();
        self.keys.insert(path::normalize(&entry.path));
    }

    /// Clear the selection and the anchor.
    pub fn clear(&mut self) {
        self.keys.clear();
        self.anchor = None;
    }

    /// Drop selected paths that are no longer displayed.
    pub fn retain_displayed(&mut self, displayed: &[Entry]) {
        let visible: HashSet<String> = displayed.iter().map(|e| path::normalize(&e.path)).collect();
        let before = self.keys.len();
        self.keys.retain(|k| visible.contains(k));
        if self.keys.len() != before {
            debug!(pruned = before - self.keys.len(), "Selection pruned");
        }
    }

    /// Selected entries in display order.
    pub fn selected_in<'a>(&self, displayed: &'a [Entry]) -> Vec<&'a Entry> {
        displayed.iter().filter(|e| self.contains(e)).collect()
    }

    /// First selected entry in display order.
    pub fn first_in<'a>(&self, displayed: &'a [Entry]) -> Option<&'a Entry> {
        displayed.iter().find(|e| self.contains(e))
    }

    /// Paths to drag when a drag starts on `dragged`.
    ///
    /// Dragging an unselected entry collapses the selection to it first.
    pub fn drag_sources(&mut self, dragged: &Entry, displayed: &[Entry]) -> Vec<String> {
        if !self.contains(dragged) {
            self.select_only(dragged);
        }
        let sources: Vec<String> = self
            .selected_in(displayed)
            .into_iter()
            .map(|e| e.path.clone())
            .collect();
        if sources.is_empty() {
            vec![dragged.path.clone()]
        } else {
            sources
        }
    }
}
