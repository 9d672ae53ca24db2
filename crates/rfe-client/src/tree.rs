//! Lazily loaded directory tree for the navigation pane.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. Children are
//! fetched the first time a node opens and cached until the node is
//! invalidated. The tree is independent of the main listing.

use rfe_core::{Entry, RemoteFs, RemoteResult, path};
use tracing::{debug, warn};

use crate::generation::{Generation, Ticket};

/// Index of a node in a [`DirectoryTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// One directory in the navigation tree.
#[derive(Debug, Clone)]
pub struct TreeNode {
    entry: Entry,
    is_open: bool,
    loaded_once: bool,
    loading: bool,
    children: Vec<NodeId>,
    generation: Generation,
}

impl TreeNode {
    fn new(entry: Entry) -> Self {
        Self {
            entry,
            is_open: false,
            loaded_once: false,
            loading: false,
            children: Vec::new(),
            generation: Generation::new(),
        }
    }

    /// The directory record this node shows.
    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    /// Whether the node is expanded.
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Whether children were fetched successfully.
    pub fn is_loaded(&self) -> bool {
        self.loaded_once
    }

    /// Whether a child fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Cached children, in listing order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// A child fetch in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    node: NodeId,
    epoch: u64,
    ticket: Ticket,
    path: String,
}

impl FetchTicket {
    /// The node being loaded.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Directory whose children are fetched.
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// One visible line of the rendered tree.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeRow {
    /// A directory node.
    Node {
        id: NodeId,
        name: String,
        path: String,
        depth: usize,
        is_open: bool,
        /// The node is the directory shown in the main listing.
        is_active: bool,
    },
    /// Placeholder shown under a node whose children are loading.
    Loading { depth: usize },
}

/// Arena of tree nodes.
#[derive(Debug, Clone, Default)]
pub struct DirectoryTree {
    nodes: Vec<TreeNode>,
    roots: Vec<NodeId>,
    epoch: u64,
}

impl DirectoryTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every node with fresh, closed top-level nodes.
    ///
    /// Fetches still in flight for the old nodes are discarded.
    pub fn set_roots(&mut self, roots: Vec<Entry>) {
        self.nodes.clear();
        self.epoch += 1;
        self.roots = roots.into_iter().map(|e| self.alloc(e)).collect();
        debug!(count = self.roots.len(), "Tree roots set");
    }

    /// Top-level nodes.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Look up a node.
    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0)
    }

    /// Find a reachable node by path.
    pub fn find(&self, target: &str) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            if node.entry.is_at(target) {
                return Some(id);
            }
            stack.extend(node.children.iter().rev());
        }
        None
    }

    /// Flip a node open or closed.
    ///
    /// Returns a ticket when the node opens for the first time and its
    /// children must be fetched. Non-directories are left untouched.
    pub fn toggle(&mut self, id: NodeId) -> Option<FetchTicket> {
        let epoch = self.epoch;
        let node = self.nodes.get_mut(id.0)?;
        if !node.entry.is_dir {
            return None;
        }

        node.is_open = !node.is_open;
        if !node.is_open || node.loaded_once || node.loading {
            return None;
        }

        node.loading = true;
        let ticket = node.generation.begin();
        debug!(path = %node.entry.path, "Fetching tree children");
        Some(FetchTicket {
            node: id,
            epoch,
            ticket,
            path: node.entry.path.clone(),
        })
    }

    /// Store fetched children. Returns `false` when the fetch was stale.
    ///
    /// A failed fetch leaves the node empty and unloaded so that the next
    /// open retries.
    pub fn finish_fetch(&mut self, ticket: FetchTicket, result: RemoteResult<Vec<Entry>>) -> bool {
        if ticket.epoch != self.epoch {
            debug!(path = %ticket.path, "Discarding tree fetch from replaced roots");
            return false;
        }
        let Some(node) = self.nodes.get_mut(ticket.node.0) else {
            return false;
        };
        if !node.generation.is_current(ticket.ticket) {
            debug!(
                path = %ticket.path,
                stale = ticket.ticket.get(),
                current = node.generation.current(),
                "Discarding stale tree fetch"
            );
            return false;
        }
        node.loading = false;

        match result {
            Ok(entries) => {
                let previous = std::mem::take(&mut node.children);
                let dirs: Vec<Entry> = entries.into_iter().filter(|e| e.is_dir).collect();
                debug!(path = %ticket.path, count = dirs.len(), "Tree children loaded");

                // Children that survive a refetch keep their node and subtree.
                let mut children = Vec::with_capacity(dirs.len());
                for entry in dirs {
                    let kept = previous
                        .iter()
                        .copied()
                        .find(|&c| self.nodes[c.0].entry.is_at(&entry.path));
                    match kept {
                        Some(id) => {
                            self.nodes[id.0].entry = entry;
                            children.push(id);
                        }
                        None => children.push(self.alloc(entry)),
                    }
                }
                let node = &mut self.nodes[ticket.node.0];
                node.children = children;
                node.loaded_once = true;
            }
            Err(e) => {
                warn!(path = %ticket.path, error = %e, "Failed to load tree children");
                node.children.clear();
            }
        }
        true
    }

    /// Toggle a node and fetch its children if needed.
    pub async fn toggle_and_load(&mut self, id: NodeId, remote: &dyn RemoteFs) {
        if let Some(ticket) = self.toggle(id) {
            let result = remote.list(ticket.path(), true).await;
            self.finish_fetch(ticket, result);
        }
    }

    /// Refetch the children of a node after its directory changed.
    ///
    /// An open node is fetched again right away and stays open. A closed node
    /// only forgets its cache, so the next open fetches.
    pub async fn refresh(&mut self, id: NodeId, remote: &dyn RemoteFs) {
        let epoch = self.epoch;
        let Some(node) = self.nodes.get_mut(id.0) else {
            return;
        };
        if !node.is_open {
            self.invalidate(id);
            return;
        }

        node.loaded_once = false;
        node.loading = true;
        let ticket = FetchTicket {
            node: id,
            epoch,
            ticket: node.generation.begin(),
            path: node.entry.path.clone(),
        };
        debug!(path = %ticket.path, "Refreshing tree children");
        let result = remote.list(ticket.path(), true).await;
        self.finish_fetch(ticket, result);
    }

    /// Forget cached children so the next open fetches again.
    pub fn invalidate(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.loaded_once = false;
            node.loading = false;
            node.children.clear();
            node.is_open = false;
            node.generation.invalidate();
        }
    }

    /// Drag payload for a drag started on a tree node.
    pub fn drag_sources(&self, id: NodeId) -> Vec<String> {
        self.node(id)
            .map(|n| vec![n.entry.path.clone()])
            .unwrap_or_default()
    }

    /// Flatten the visible part of the tree.
    ///
    /// `current_path` marks the active node; it is compared on every call.
    pub fn rows(&self, current_path: &str) -> Vec<TreeRow> {
        let mut rows = Vec::new();
        for &id in &self.roots {
            self.push_rows(id, 0, current_path, &mut rows);
        }
        rows
    }

    fn push_rows(&self, id: NodeId, depth: usize, current_path: &str, rows: &mut Vec<TreeRow>) {
        let node = &self.nodes[id.0];
        rows.push(TreeRow::Node {
            id,
            name: node.entry.name.to_string(),
            path: node.entry.path.clone(),
            depth,
            is_open: node.is_open,
            is_active: path::same_path(&node.entry.path, current_path),
        });
        if !node.is_open {
            return;
        }
        if node.loading {
            rows.push(TreeRow::Loading { depth: depth + 1 });
            return;
        }
        for &child in &node.children {
            self.push_rows(child, depth + 1, current_path, rows);
        }
    }

    fn alloc(&mut self, entry: Entry) -> NodeId {
        self.nodes.push(TreeNode::new(entry));
        NodeId(self.nodes.len() - 1)
    }
}
