//! Sequential multi-file upload with progress reporting.

use std::sync::Arc;

use rfe_core::{RemoteFs, UploadFile};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::UPLOAD_CHANNEL_SIZE;
use crate::error::OpsError;
use crate::progress::{UploadComplete, UploadEvent};

/// Start uploading `files` into `dest`, strictly one at a time.
///
/// Returns a receiver for progress updates. The first failure aborts the
/// remaining files; a [`UploadEvent::Complete`] is always the last event.
pub fn start_upload(
    remote: Arc<dyn RemoteFs>,
    dest: String,
    files: Vec<UploadFile>,
) -> mpsc::Receiver<UploadEvent> {
    let (tx, rx) = mpsc::channel(UPLOAD_CHANNEL_SIZE);

    tokio::spawn(async move {
        upload_impl(remote, dest, files, tx).await;
    });

    rx
}

async fn upload_impl(
    remote: Arc<dyn RemoteFs>,
    dest: String,
    files: Vec<UploadFile>,
    tx: mpsc::Sender<UploadEvent>,
) {
    let files_total = files.len();
    let mut succeeded = 0;
    let mut error = None;

    for (index, file) in files.iter().enumerate() {
        let _ = tx
            .send(UploadEvent::Started {
                index,
                name: file.name.clone(),
                files_total,
            })
            .await;

        let progress_tx = tx.clone();
        let progress = move |sent: u64, total: u64| {
            // Progress is lossy; a full channel drops intermediate updates.
            let _ = progress_tx.try_send(UploadEvent::Progress { index, sent, total });
        };

        debug!(name = %file.name, rel_path = ?file.rel_path, %dest, "Uploading");
        match remote.upload(&dest, file, &progress).await {
            Ok(()) => {
                succeeded += 1;
                let _ = tx
                    .send(UploadEvent::Finished {
                        index,
                        name: file.name.clone(),
                    })
                    .await;
            }
            Err(e) => {
                warn!(name = %file.name, error = %e, "Upload failed, aborting queue");
                error = Some(OpsError::Upload {
                    name: file.name.clone(),
                    error: e,
                });
                break;
            }
        }
    }

    info!(succeeded, files_total, %dest, "Upload queue finished");
    let _ = tx
        .send(UploadEvent::Complete(UploadComplete {
            succeeded,
            files_total,
            error,
        }))
        .await;
}
