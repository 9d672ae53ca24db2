//! Directory entry records returned by listing calls.

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::file_type::FileType;
use crate::path;

/// One file or directory record as reported by the server.
///
/// Identity is the path (see [`Entry::same_as`]). Entries are never patched
/// in place; every reload replaces the whole list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// File/directory name (not full path).
    pub name: CompactString,

    /// Full remote path.
    pub path: String,

    /// Whether this entry is a directory.
    pub is_dir: bool,

    /// Size in bytes (0 for directories).
    #[serde(default)]
    pub size: Option<u64>,

    /// Modification time in epoch seconds.
    #[serde(default)]
    pub modified: Option<f64>,

    /// Read-only flag, when the server reports it.
    #[serde(default)]
    pub readonly: Option<bool>,
}

impl Entry {
    /// Create a new file entry.
    pub fn file(name: impl Into<CompactString>, path: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            is_dir: false,
            size: Some(size),
            modified: None,
            readonly: None,
        }
    }

    /// Create a new directory entry.
    pub fn dir(name: impl Into<CompactString>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            is_dir: true,
            size: Some(0),
            modified: None,
            readonly: None,
        }
    }

    /// Create a directory entry for a drive root or pinned path.
    pub fn from_path(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = CompactString::from(path::file_name(&path));
        Self {
            name,
            path,
            is_dir: true,
            size: None,
            modified: None,
            readonly: None,
        }
    }

    /// Set the modification time.
    pub fn with_modified(mut self, epoch_secs: f64) -> Self {
        self.modified = Some(epoch_secs);
        self
    }

    /// Whether both records refer to the same remote path.
    pub fn same_as(&self, other: &Entry) -> bool {
        path::same_path(&self.path, &other.path)
    }

    /// Whether this entry lives at `path`.
    pub fn is_at(&self, path: &str) -> bool {
        path::same_path(&self.path, path)
    }

    /// Preview classification derived from the file name.
    pub fn file_type(&self) -> FileType {
        FileType::from_name(&self.name)
    }

    /// Modification time as a UTC timestamp.
    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        self.modified.and_then(epoch_to_utc)
    }

    /// Whether the name contains `needle` ignoring case.
    ///
    /// `needle` must already be lower-cased.
    pub fn name_contains(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
    }
}

/// Convert fractional epoch seconds into a UTC timestamp.
pub fn epoch_to_utc(epoch_secs: f64) -> Option<DateTime<Utc>> {
    if !epoch_secs.is_finite() {
        return None;
    }
    let secs = epoch_secs.floor();
    let nanos = ((epoch_secs - secs) * 1e9) as u32;
    DateTime::from_timestamp(secs as i64, nanos)
}
