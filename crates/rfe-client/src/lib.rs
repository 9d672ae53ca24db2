//! Interaction state for the rfe remote file explorer.
//!
//! Every controller in this crate owns its state explicitly and talks to the
//! server through [`rfe_core::RemoteFs`]. Asynchronous work that can be
//! overtaken by newer work (directory loads, deep searches, tree fetches and
//! preview reads) is guarded by [`Generation`] tickets so that only the
//! latest request commits. [`ClientSession`] wires the controllers together
//! behind a single reload path.
//!
//! Long-running background work (the watch channel and stats polling)
//! reports through tokio channels.

pub mod app;
mod download;
mod generation;
mod monitor;
mod navigation;
mod pins;
pub mod preview;
mod properties;
pub mod search;
mod selection;
pub mod settings;
mod toast;
pub mod tree;
pub mod watch;
mod upload;

pub use app::{ClientSession, Key, KeyAction, KeyPress, PasteResult};
pub use download::{DownloadPlan, MULTI_DOWNLOAD_NAME};
pub use generation::{Generation, Ticket};
pub use monitor::{StatsSnapshot, fetch_stats, start_stats_poll};
pub use navigation::{LoadOutcome, LoadTicket, Navigation};
pub use pins::{Pins, pin_drop_target};
pub use preview::{EditorSession, OpenOutcome, PreviewError, TextBufferFactory, WidgetFactory};
pub use properties::PropertiesPanel;
pub use search::{Pagination, SearchFilter, SearchOutcome};
pub use selection::{ClickModifiers, Selection};
pub use settings::{KeyValueStore, MemoryStore, Preferences, Theme, TomlFileStore, ViewMode};
pub use toast::{Toast, ToastLevel, Toasts};
pub use tree::{DirectoryTree, NodeId, TreeRow};
pub use upload::UploadSession;
pub use watch::{WatchEvent, WatchHandle, WatchSocket, WatchTransport, start_watch};

/// Default channel buffer size for watch channel events.
pub const WATCH_CHANNEL_SIZE: usize = 16;

/// Default channel buffer size for stats snapshots.
pub const STATS_CHANNEL_SIZE: usize = 4;
