//! Progress reporting types for uploads.

use crate::error::OpsError;

/// Event sent through the channel while an upload queue runs.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadEvent {
    /// A file became the one in flight.
    Started {
        index: usize,
        name: String,
        files_total: usize,
    },
    /// Bytes of the in-flight file reached the server.
    Progress { index: usize, sent: u64, total: u64 },
    /// The in-flight file finished.
    Finished { index: usize, name: String },
    /// The queue finished or was aborted.
    Complete(UploadComplete),
}

/// Result of a finished upload queue.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadComplete {
    /// Number of files uploaded.
    pub succeeded: usize,
    /// Number of files queued.
    pub files_total: usize,
    /// The failure that aborted the queue.
    pub error: Option<OpsError>,
}

impl UploadComplete {
    /// Check if every queued file was uploaded.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Get a human-readable summary of the queue.
    pub fn summary(&self) -> String {
        match &self.error {
            None => format!("Uploaded {} files", self.succeeded),
            Some(err) => format!("Upload failed: {}", err.user_message()),
        }
    }
}

/// Live progress of an upload queue. Reflects only the in-flight file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadProgress {
    /// Whether a queue is running.
    pub active: bool,
    /// Name of the file in flight.
    pub current_file: Option<String>,
    /// Percentage of the in-flight file sent (0 to 100).
    pub percent: u8,
    /// Number of files uploaded so far.
    pub files_completed: usize,
    /// Number of files queued.
    pub files_total: usize,
    /// Completion record, once the queue settles.
    pub complete: Option<UploadComplete>,
}

impl UploadProgress {
    /// Fold one event into the progress.
    pub fn apply(&mut self, event: &UploadEvent) {
        match event {
            UploadEvent::Started {
                name, files_total, ..
            } => {
                self.active = true;
                self.current_file = Some(name.clone());
                self.percent = 0;
                self.files_total = *files_total;
            }
            UploadEvent::Progress { sent, total, .. } => {
                self.percent = percent_of(*sent, *total);
            }
            UploadEvent::Finished { .. } => {
                self.files_completed += 1;
                self.percent = 100;
            }
            UploadEvent::Complete(complete) => {
                self.active = false;
                self.files_total = complete.files_total;
                self.complete = Some(complete.clone());
            }
        }
    }

    /// Whether the queue has settled.
    pub fn is_complete(&self) -> bool {
        self.complete.is_some()
    }
}

/// Rounded percentage of `sent` over `total`; an empty file counts as done.
pub fn percent_of(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    ((sent.min(total) as f64 * 100.0 / total as f64).round()) as u8
}
