//! Best-effort persistence of client preferences.
//!
//! Stores report success as a `bool`; a failed read falls back to the
//! default and a failed write is logged and otherwise ignored.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{debug, warn};

/// Key of the last visited directory.
pub const LAST_PATH_KEY: &str = "rfe:lastPath";

/// Key of the listing layout.
pub const VIEW_MODE_KEY: &str = "rfe:viewMode";

/// Key of the color theme.
pub const THEME_KEY: &str = "rfe:theme";

/// String key-value storage.
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value. Returns `false` when it could not be persisted.
    fn set(&mut self, key: &str, value: &str) -> bool;
}

/// Volatile store for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    reject_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail.
    pub fn read_only() -> Self {
        Self {
            reject_writes: true,
            ..Self::default()
        }
    }

    /// Seed a value.
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> bool {
        if self.reject_writes {
            return false;
        }
        self.values.insert(key.to_string(), value.to_string());
        true
    }
}

/// Store backed by a flat TOML table on disk.
#[derive(Debug, Clone)]
pub struct TomlFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl TomlFileStore {
    /// Default location: `<config dir>/rfe/state.toml`.
    pub fn default_location() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("rfe").join("state.toml"))
    }

    /// Open the store at `path`. A missing or unreadable file yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = std::fs::read_to_string(&path)
            .ok()
            .and_then(|content| toml::from_str(&content).ok())
            .unwrap_or_default();
        Self { path, values }
    }

    /// File the store writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(&self.values)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        std::fs::write(&self.path, content)
    }
}

impl KeyValueStore for TomlFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> bool {
        self.values.insert(key.to_string(), value.to_string());
        match self.write() {
            Ok(()) => true,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to persist preference");
                false
            }
        }
    }
}

/// Listing layout.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    List,
    Grid,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::List => Self::Grid,
            Self::Grid => Self::List,
        }
    }
}

/// Color theme.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// Typed access to the persisted preferences.
pub struct Preferences {
    store: Box<dyn KeyValueStore>,
    view_mode: ViewMode,
    theme: Theme,
}

impl std::fmt::Debug for Preferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preferences")
            .field("view_mode", &self.view_mode)
            .field("theme", &self.theme)
            .finish()
    }
}

impl Preferences {
    /// Load preferences from `store`. Unknown values fall back to defaults.
    pub fn load(store: Box<dyn KeyValueStore>) -> Self {
        let view_mode = store
            .get(VIEW_MODE_KEY)
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();
        let theme = store
            .get(THEME_KEY)
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();
        debug!(%view_mode, %theme, "Preferences loaded");
        Self {
            store,
            view_mode,
            theme,
        }
    }

    /// Preferences that are never persisted.
    pub fn in_memory() -> Self {
        Self::load(Box::new(MemoryStore::new()))
    }

    /// The directory to open at startup.
    pub fn last_path(&self) -> Option<String> {
        self.store
            .get(LAST_PATH_KEY)
            .filter(|p| !p.trim().is_empty())
    }

    /// Remember the directory being shown.
    pub fn set_last_path(&mut self, path: &str) -> bool {
        self.store.set(LAST_PATH_KEY, path)
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// Switch between list and grid. Returns the new mode.
    pub fn toggle_view_mode(&mut self) -> ViewMode {
        self.view_mode = self.view_mode.toggled();
        self.store.set(VIEW_MODE_KEY, &self.view_mode.to_string());
        self.view_mode
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Switch between light and dark. Returns the new theme.
    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.store.set(THEME_KEY, &self.theme.to_string());
        self.theme
    }
}
