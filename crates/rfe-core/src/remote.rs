//! The remote file service as seen by the client.
//!
//! Every filesystem mutation is delegated to an implementation of
//! [`RemoteFs`]; the client only reconciles the results into local state.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::{Entry, epoch_to_utc};
use crate::error::RemoteResult;

/// Upload progress callback: `(bytes_sent, bytes_total)`.
pub type ProgressFn = dyn Fn(u64, u64) + Send + Sync;

/// Reply to a move call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveReceipt {
    /// Final path of the moved entry.
    #[serde(default)]
    pub path: Option<String>,
    /// Token that reverses this move, if the server issued one.
    #[serde(default)]
    pub undo_token: Option<String>,
    /// Set when the server found nothing to do.
    #[serde(default)]
    pub skipped: bool,
}

/// A file queued for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// File name.
    pub name: String,
    /// Path relative to the upload destination (`Folder/Sub/file.txt`),
    /// present when a whole folder was picked.
    pub rel_path: Option<String>,
    /// File contents.
    pub data: Vec<u8>,
}

impl UploadFile {
    /// Create an upload for a single picked file.
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            rel_path: None,
            data: data.into(),
        }
    }

    /// Attach the relative path carried by the source.
    pub fn with_rel_path(mut self, rel_path: impl Into<String>) -> Self {
        let rel_path = rel_path.into();
        self.rel_path = (!rel_path.trim().is_empty()).then_some(rel_path);
        self
    }

    /// Size in bytes.
    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    /// Whether the file is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Metadata returned by a stat call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub is_dir: bool,
    #[serde(default)]
    pub size: u64,
    /// Modification time in epoch seconds.
    #[serde(default)]
    pub modified: Option<f64>,
    /// Creation time in epoch seconds.
    #[serde(default)]
    pub created: Option<f64>,
    #[serde(default)]
    pub readonly: bool,
}

impl StatInfo {
    /// Modification time as a UTC timestamp.
    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        self.modified.and_then(epoch_to_utc)
    }
}

/// Metadata changes sent by `update_meta`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaUpdate {
    pub path: String,
    /// New modification time in epoch seconds; `None` leaves it unchanged.
    pub modified: Option<f64>,
    /// New read-only flag; `None` leaves it unchanged.
    pub readonly: Option<bool>,
}

/// Share-link creation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareRequest {
    pub path: String,
    pub readonly: bool,
    pub allow_edit: bool,
    pub allow_download: bool,
    /// Lifetime in hours; `None` means the link never expires.
    pub expires_hours: Option<f64>,
}

/// Share-link creation reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShareResponse {
    #[serde(default)]
    pub url: String,
    /// Expiry in epoch seconds.
    #[serde(default)]
    pub expires_at: Option<f64>,
}

/// Host statistics from the monitor endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemStats {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub memory_used: u64,
    pub memory_total: u64,
    pub disk_percent: f64,
    pub disk_free: u64,
    pub disk_total: u64,
}

/// Client-side view of the remote file service.
///
/// Implementations must be cheap to share; the client holds one behind an
/// `Arc` and calls it from a single logical thread.
#[async_trait]
pub trait RemoteFs: Send + Sync {
    /// List a directory. With `only_dirs`, files are omitted.
    async fn list(&self, path: &str, only_dirs: bool) -> RemoteResult<Vec<Entry>>;

    /// Recursive name search below `path`.
    async fn search(&self, path: &str, query: &str) -> RemoteResult<Vec<Entry>>;

    /// Raw text content of a file.
    async fn read(&self, path: &str) -> RemoteResult<String>;

    /// Write text content, creating the file if needed.
    async fn save(&self, path: &str, content: &str) -> RemoteResult<()>;

    /// Create a directory.
    async fn mkdir(&self, path: &str) -> RemoteResult<()>;

    /// Rename an entry in place.
    async fn rename(&self, path: &str, new_name: &str) -> RemoteResult<()>;

    /// Delete an entry.
    async fn delete(&self, path: &str) -> RemoteResult<()>;

    /// Move `source` into the directory `destination`.
    async fn move_to(&self, source: &str, destination: &str) -> RemoteResult<MoveReceipt>;

    /// Copy `source` into the directory `destination`.
    async fn copy_to(&self, source: &str, destination: &str) -> RemoteResult<()>;

    /// Reverse the move identified by `token`.
    async fn undo(&self, token: &str) -> RemoteResult<()>;

    /// Upload one file into `dest`, reporting byte progress.
    async fn upload(&self, dest: &str, file: &UploadFile, progress: &ProgressFn)
    -> RemoteResult<()>;

    /// Entry metadata.
    async fn stat(&self, path: &str) -> RemoteResult<StatInfo>;

    /// Change modification time and/or read-only flag.
    async fn update_meta(&self, update: &MetaUpdate) -> RemoteResult<()>;

    /// Raw bytes of a file.
    async fn download(&self, path: &str) -> RemoteResult<Vec<u8>>;

    /// Zip archive of a directory. `fast` trades size for speed.
    async fn zip(&self, path: &str, fast: bool) -> RemoteResult<Vec<u8>>;

    /// Zip archive of several entries.
    async fn zip_multiple(&self, paths: &[String]) -> RemoteResult<Vec<u8>>;

    /// Pinned paths.
    async fn pins(&self) -> RemoteResult<Vec<String>>;

    /// Pin a path.
    async fn pin(&self, path: &str) -> RemoteResult<()>;

    /// Remove a pin.
    async fn unpin(&self, path: &str) -> RemoteResult<()>;

    /// Drive or root list.
    async fn roots(&self) -> RemoteResult<Vec<String>>;

    /// Create a share link.
    async fn create_share(&self, request: &ShareRequest) -> RemoteResult<ShareResponse>;

    /// Host statistics for the volume holding `path`.
    async fn monitor_stats(&self, path: &str) -> RemoteResult<SystemStats>;

    /// URL that renders a file inline (media preview).
    fn resource_url(&self, path: &str) -> String;
}
