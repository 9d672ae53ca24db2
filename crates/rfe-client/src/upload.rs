//! Upload input staging and progress tracking.

use std::sync::Arc;

use rfe_core::{RemoteError, RemoteFs, UploadFile};
use rfe_ops::{OpsError, UploadComplete, UploadProgress, start_upload};
use tracing::debug;

/// Files picked for upload and the progress of the running queue.
#[derive(Debug, Clone, Default)]
pub struct UploadSession {
    input: Vec<UploadFile>,
    progress: UploadProgress,
}

impl UploadSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the picked files.
    pub fn stage(&mut self, files: Vec<UploadFile>) {
        self.input = files;
    }

    /// Files waiting to be uploaded.
    pub fn input(&self) -> &[UploadFile] {
        &self.input
    }

    /// Progress of the current or last queue.
    pub fn progress(&self) -> &UploadProgress {
        &self.progress
    }

    pub fn is_active(&self) -> bool {
        self.progress.active
    }

    /// Upload the staged files into `dest`.
    ///
    /// Returns `None` when nothing was staged. The input is cleared once the
    /// queue ends, whether it succeeded or aborted.
    pub async fn run(&mut self, remote: Arc<dyn RemoteFs>, dest: &str) -> Option<UploadComplete> {
        self.run_with(remote, dest, |_| {}).await
    }

    /// Like [`run`](Self::run), calling `on_progress` after every update.
    pub async fn run_with<F>(
        &mut self,
        remote: Arc<dyn RemoteFs>,
        dest: &str,
        mut on_progress: F,
    ) -> Option<UploadComplete>
    where
        F: FnMut(&UploadProgress),
    {
        if self.input.is_empty() {
            return None;
        }

        self.progress = UploadProgress::default();
        let mut rx = start_upload(remote, dest.to_string(), self.input.clone());
        while let Some(event) = rx.recv().await {
            self.progress.apply(&event);
            on_progress(&self.progress);
        }

        self.input.clear();
        self.progress.active = false;
        let complete = self.progress.complete.clone().unwrap_or_else(|| UploadComplete {
            succeeded: self.progress.files_completed,
            files_total: self.progress.files_total,
            error: Some(OpsError::Remote(RemoteError::transport(
                "Upload ended unexpectedly",
            ))),
        });
        debug!(succeeded = complete.succeeded, files_total = complete.files_total, "Upload session done");
        Some(complete)
    }
}
