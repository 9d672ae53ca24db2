//! Download planning for the current selection.

use rfe_core::{Entry, RemoteFs, RemoteResult};
use tracing::debug;

/// File name used when several entries are downloaded together.
pub const MULTI_DOWNLOAD_NAME: &str = "selected_files.zip";

/// How a selection is downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadPlan {
    /// One file, as itself.
    File { path: String, file_name: String },
    /// One folder, zipped.
    Folder {
        path: String,
        file_name: String,
        fast: bool,
    },
    /// Several entries in one archive.
    Multiple { paths: Vec<String> },
}

impl DownloadPlan {
    /// Build a plan for `selected`. `fast` trades archive size for speed.
    pub fn for_selection(selected: &[&Entry], fast: bool) -> Option<Self> {
        match selected {
            [] => None,
            [entry] if entry.is_dir => Some(Self::Folder {
                path: entry.path.clone(),
                file_name: format!("{}.zip", entry.name),
                fast,
            }),
            [entry] => Some(Self::File {
                path: entry.path.clone(),
                file_name: entry.name.to_string(),
            }),
            many => Some(Self::Multiple {
                paths: many.iter().map(|e| e.path.clone()).collect(),
            }),
        }
    }

    /// Name to save the download under.
    pub fn file_name(&self) -> &str {
        match self {
            Self::File { file_name, .. } | Self::Folder { file_name, .. } => file_name,
            Self::Multiple { .. } => MULTI_DOWNLOAD_NAME,
        }
    }

    /// Fetch the bytes.
    pub async fn fetch(&self, remote: &dyn RemoteFs) -> RemoteResult<Vec<u8>> {
        debug!(name = self.file_name(), "Downloading");
        match self {
            Self::File { path, .. } => remote.download(path).await,
            Self::Folder { path, fast, .. } => remote.zip(path, *fast).await,
            Self::Multiple { paths } => remote.zip_multiple(paths).await,
        }
    }
}
