//! The client session: every controller wired to one remote and one
//! reload path.
//!
//! Action methods never return remote errors. Failures become error toasts
//! and the previous state is kept.

mod commands;
pub mod constants;
mod input;

use std::sync::Arc;
use std::time::Duration;

use rfe_core::path::Breadcrumb;
use rfe_core::{ClientConfig, Entry, RemoteFs};
use rfe_ops::{ClipboardSlot, DragPayload, SharePanel, UndoSlot};
use tracing::{debug, info};

pub use commands::PasteResult;
pub use input::{Key, KeyAction, KeyPress};

use crate::monitor::{self, StatsSnapshot};
use crate::navigation::{LoadOutcome, Navigation};
use crate::pins::Pins;
use crate::preview::{EditorSession, OpenOutcome, WidgetFactory};
use crate::properties::PropertiesPanel;
use crate::search::{SearchFilter, SearchOutcome};
use crate::selection::{ClickModifiers, Selection};
use crate::settings::{Preferences, Theme, ViewMode};
use crate::toast::Toasts;
use crate::tree::{DirectoryTree, NodeId, TreeRow};
use crate::upload::UploadSession;
use crate::watch::{WatchEvent, WatchHandle};
use constants::{LOAD_FAILED_PREFIX, SEARCH_FAILED_PREFIX};

/// State of one explorer window.
pub struct ClientSession {
    remote: Arc<dyn RemoteFs>,
    config: ClientConfig,
    nav: Navigation,
    search: SearchFilter,
    selection: Selection,
    clipboard: ClipboardSlot,
    drag: DragPayload,
    undo: UndoSlot,
    tree: DirectoryTree,
    editor: EditorSession,
    uploads: UploadSession,
    share: SharePanel,
    properties: PropertiesPanel,
    pins: Pins,
    prefs: Preferences,
    toasts: Toasts,
    watch: Option<WatchHandle>,
    connected: bool,
    stats: Option<StatsSnapshot>,
}

impl std::fmt::Debug for ClientSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSession")
            .field("current_path", &self.nav.current_path())
            .field("entries", &self.nav.entries().len())
            .field("selected", &self.selection.len())
            .field("connected", &self.connected)
            .finish_non_exhaustive()
    }
}

impl ClientSession {
    /// Create a session. Nothing is fetched until [`start`](Self::start).
    pub fn new(
        remote: Arc<dyn RemoteFs>,
        config: ClientConfig,
        prefs: Preferences,
        widgets: Arc<dyn WidgetFactory>,
    ) -> Self {
        let initial = prefs
            .last_path()
            .unwrap_or_else(|| config.default_path.clone());
        Self {
            nav: Navigation::new(initial),
            search: SearchFilter::new(config.page_size),
            selection: Selection::new(),
            clipboard: ClipboardSlot::new(),
            drag: DragPayload::new(),
            undo: UndoSlot::new(),
            tree: DirectoryTree::new(),
            editor: EditorSession::new(widgets),
            uploads: UploadSession::new(),
            share: SharePanel::new(),
            properties: PropertiesPanel::new(),
            pins: Pins::new(),
            toasts: Toasts::new(Duration::from_millis(config.toast_duration_ms)),
            watch: None,
            connected: false,
            stats: None,
            remote,
            config,
            prefs,
        }
    }

    /// Restore the last directory and load the sidebar.
    ///
    /// Drive roots that cannot be fetched leave the tree empty.
    pub async fn start(&mut self) {
        let initial = self.nav.current_path().to_string();
        info!(path = %initial, view_mode = %self.prefs.view_mode(), "Starting session");
        self.load(&initial).await;

        match self.remote.roots().await {
            Ok(roots) => self
                .tree
                .set_roots(roots.into_iter().map(Entry::from_path).collect()),
            Err(e) => debug!(error = %e, "Drive roots unavailable"),
        }

        self.refresh_pins().await;
    }

    // ==================== Accessors ====================

    pub fn remote(&self) -> &Arc<dyn RemoteFs> {
        &self.remote
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The directory shown.
    pub fn current_path(&self) -> &str {
        self.nav.current_path()
    }

    /// Every entry of the current directory.
    pub fn entries(&self) -> &[Entry] {
        self.nav.entries()
    }

    /// Entries on the current page after filtering or deep search.
    pub fn displayed(&self) -> Vec<Entry> {
        self.search.page_items(self.nav.entries())
    }

    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        self.nav.breadcrumbs()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Selected entries in display order.
    pub fn selected(&self) -> Vec<Entry> {
        let displayed = self.displayed();
        self.selection
            .selected_in(&displayed)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn search(&self) -> &SearchFilter {
        &self.search
    }

    pub fn page(&self) -> usize {
        self.search.pagination.page()
    }

    pub fn total_pages(&self) -> usize {
        self.search.total_pages(self.nav.entries())
    }

    pub fn clipboard(&self) -> &ClipboardSlot {
        &self.clipboard
    }

    pub fn drag(&self) -> &DragPayload {
        &self.drag
    }

    pub fn undo_token(&self) -> Option<&str> {
        self.undo.token()
    }

    pub fn tree(&self) -> &DirectoryTree {
        &self.tree
    }

    /// Visible tree rows with the current directory highlighted.
    pub fn tree_rows(&self) -> Vec<TreeRow> {
        self.tree.rows(self.nav.current_path())
    }

    pub fn editor(&self) -> &EditorSession {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut EditorSession {
        &mut self.editor
    }

    pub fn uploads(&self) -> &UploadSession {
        &self.uploads
    }

    pub fn uploads_mut(&mut self) -> &mut UploadSession {
        &mut self.uploads
    }

    pub fn share(&self) -> &SharePanel {
        &self.share
    }

    pub fn share_mut(&mut self) -> &mut SharePanel {
        &mut self.share
    }

    pub fn properties(&self) -> &PropertiesPanel {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut PropertiesPanel {
        &mut self.properties
    }

    pub fn pins(&self) -> &Pins {
        &self.pins
    }

    pub fn prefs(&self) -> &Preferences {
        &self.prefs
    }

    pub fn toasts(&self) -> &Toasts {
        &self.toasts
    }

    pub fn toasts_mut(&mut self) -> &mut Toasts {
        &mut self.toasts
    }

    /// Whether the watch channel is open.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Last fetched host statistics.
    pub fn stats(&self) -> Option<&StatsSnapshot> {
        self.stats.as_ref()
    }

    // ==================== Navigation ====================

    /// Show `path`. Returns whether the listing was replaced.
    ///
    /// On failure the previous listing stays and an error toast is shown.
    pub async fn load(&mut self, path: &str) -> bool {
        let remote = Arc::clone(&self.remote);
        let same_dir = rfe_core::path::same_path(path, self.nav.current_path());

        match self.nav.load(remote.as_ref(), path).await {
            LoadOutcome::Committed => {
                self.search.on_navigate();
                if same_dir {
                    let displayed = self.displayed();
                    self.selection.retain_displayed(&displayed);
                } else {
                    self.selection.clear();
                }
                self.prefs.set_last_path(path);
                if let Some(watch) = &self.watch {
                    watch.subscribe(path);
                }
                true
            }
            LoadOutcome::Stale => false,
            LoadOutcome::Failed(e) => {
                self.toasts
                    .error(format!("{LOAD_FAILED_PREFIX}: {}", e.user_message()));
                false
            }
        }
    }

    /// Reload the current directory.
    pub async fn reload(&mut self) -> bool {
        let path = self.nav.current_path().to_string();
        self.load(&path).await
    }

    /// Navigate to the parent, never above the drive root.
    pub async fn go_up(&mut self) -> bool {
        let parent = self.nav.parent_path();
        self.load(&parent).await
    }

    /// Open a directory entry.
    pub async fn open_dir(&mut self, entry: &Entry) -> bool {
        if !entry.is_dir {
            return false;
        }
        self.load(&entry.path).await
    }

    /// Open an entry: directories navigate, files preview.
    pub async fn open_entry(&mut self, entry: &Entry) {
        if entry.is_dir {
            self.load(&entry.path).await;
        } else {
            self.preview(entry).await;
        }
    }

    // ==================== Selection, filter and pages ====================

    /// Click the displayed entry at `idx`.
    pub fn click(&mut self, idx: usize, modifiers: ClickModifiers) {
        let displayed = self.displayed();
        self.selection.click(&displayed, idx, modifiers);
    }

    /// Update the filter text.
    pub fn set_filter(&mut self, query: &str) {
        self.search.set_query(query);
        self.prune_selection();
    }

    /// Switch deep-search mode.
    pub fn set_deep_search(&mut self, deep: bool) {
        self.search.set_deep(deep);
        self.prune_selection();
    }

    /// Run a deep search for the filter text in the current directory.
    pub async fn perform_search(&mut self) -> bool {
        let remote = Arc::clone(&self.remote);
        let path = self.nav.current_path().to_string();
        let outcome = self.search.deep_search(remote.as_ref(), &path).await;
        self.prune_selection();
        match outcome {
            Some(SearchOutcome::Committed) => true,
            Some(SearchOutcome::Failed(e)) => {
                self.toasts
                    .error(format!("{SEARCH_FAILED_PREFIX}: {}", e.user_message()));
                false
            }
            Some(SearchOutcome::Stale) | None => false,
        }
    }

    pub fn next_page(&mut self) -> bool {
        let moved = self.search.next_page(self.nav.entries());
        self.prune_selection();
        moved
    }

    pub fn prev_page(&mut self) -> bool {
        let moved = self.search.prev_page();
        self.prune_selection();
        moved
    }

    fn prune_selection(&mut self) {
        let displayed = self.displayed();
        self.selection.retain_displayed(&displayed);
    }

    fn first_selected(&self) -> Option<Entry> {
        let displayed = self.displayed();
        self.selection.first_in(&displayed).cloned()
    }

    // ==================== Keyboard ====================

    /// Apply a keyboard shortcut. Returns the action taken.
    pub async fn handle_key(&mut self, press: KeyPress) -> KeyAction {
        let action = KeyAction::from_key_press(press);
        match action {
            KeyAction::OpenSelected => {
                if let Some(first) = self.first_selected() {
                    self.open_entry(&first).await;
                }
            }
            KeyAction::GoUp => {
                self.go_up().await;
            }
            KeyAction::Copy => {
                if let Some(first) = self.first_selected() {
                    self.clipboard.copy(first);
                }
            }
            KeyAction::Cut => {
                if let Some(first) = self.first_selected() {
                    self.clipboard.cut(first);
                }
            }
            KeyAction::Paste => {
                self.paste_here().await;
            }
            KeyAction::Undo => {
                self.undo().await;
            }
            KeyAction::None => {}
        }
        action
    }

    // ==================== Tree ====================

    /// Expand or collapse a tree node, fetching children on first open.
    pub async fn toggle_tree_node(&mut self, id: NodeId) {
        let remote = Arc::clone(&self.remote);
        self.tree.toggle_and_load(id, remote.as_ref()).await;
    }

    /// Navigate to a tree node.
    pub async fn open_tree_node(&mut self, id: NodeId) -> bool {
        let Some(target) = self.tree.node(id).map(|n| n.entry().path.clone()) else {
            return false;
        };
        self.load(&target).await
    }

    // ==================== Preview ====================

    /// Preview a file read-only.
    pub async fn preview(&mut self, entry: &Entry) -> OpenOutcome {
        let remote = Arc::clone(&self.remote);
        let outcome = self.editor.open(entry, remote.as_ref()).await;
        self.report_preview(&outcome);
        outcome
    }

    /// Open a text file for editing.
    pub async fn edit(&mut self, entry: &Entry) -> OpenOutcome {
        let remote = Arc::clone(&self.remote);
        let outcome = self.editor.edit(entry, remote.as_ref()).await;
        self.report_preview(&outcome);
        outcome
    }

    /// The embedding view failed to render a media preview.
    pub fn preview_failed(&mut self) {
        if let Some(e) = self.editor.media_failed() {
            self.toasts.error(e.user_message());
        }
    }

    fn report_preview(&mut self, outcome: &OpenOutcome) {
        if let OpenOutcome::Failed(e) = outcome {
            self.toasts.error(e.user_message());
        }
    }

    // ==================== Watch channel ====================

    /// Attach a running watch driver and subscribe the current directory.
    pub fn attach_watch(&mut self, handle: WatchHandle) {
        handle.subscribe(self.nav.current_path());
        self.watch = Some(handle);
    }

    /// React to a watch notification. A change reloads silently.
    pub async fn handle_watch_event(&mut self, event: WatchEvent) {
        match event {
            WatchEvent::Connected => self.connected = true,
            WatchEvent::Disconnected => self.connected = false,
            WatchEvent::Change => {
                debug!(path = %self.nav.current_path(), "Directory changed remotely");
                self.reload().await;
            }
        }
    }

    // ==================== Preferences and status ====================

    pub fn view_mode(&self) -> ViewMode {
        self.prefs.view_mode()
    }

    pub fn toggle_view_mode(&mut self) -> ViewMode {
        self.prefs.toggle_view_mode()
    }

    pub fn theme(&self) -> Theme {
        self.prefs.theme()
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.prefs.toggle_theme()
    }

    /// Fetch host statistics. Failures keep the previous snapshot.
    pub async fn refresh_stats(&mut self) {
        let path = self.nav.current_path().to_string();
        if let Some(snapshot) = monitor::fetch_stats(self.remote.as_ref(), &path).await {
            self.stats = Some(snapshot);
        }
    }
}
