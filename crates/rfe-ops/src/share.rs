//! Share-link creation.

use chrono::{DateTime, Utc};
use rfe_core::{Entry, RemoteFs, ShareRequest, ShareResponse, epoch_to_utc};
use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::{info, warn};

use crate::error::OpsResult;

/// What a share link lets the recipient do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessMode {
    /// View only.
    #[default]
    #[strum(to_string = "readonly")]
    ReadOnly,
    /// View and edit.
    #[strum(to_string = "edit")]
    Edit,
}

/// Options chosen in the share panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareOptions {
    pub access: AccessMode,
    pub allow_download: bool,
    /// When set, the link never expires and `expires_hours` is ignored.
    pub no_expiry: bool,
    pub expires_hours: f64,
}

impl Default for ShareOptions {
    fn default() -> Self {
        Self {
            access: AccessMode::ReadOnly,
            allow_download: true,
            no_expiry: true,
            expires_hours: 24.0,
        }
    }
}

impl ShareOptions {
    /// Build the request body for `path`.
    ///
    /// A zero or negative lifetime is sent as "never expires".
    pub fn to_request(&self, path: &str) -> ShareRequest {
        let expires_hours =
            (!self.no_expiry && self.expires_hours > 0.0).then_some(self.expires_hours);
        ShareRequest {
            path: path.to_string(),
            readonly: self.access == AccessMode::ReadOnly,
            allow_edit: self.access == AccessMode::Edit,
            allow_download: self.allow_download,
            expires_hours,
        }
    }
}

/// The share panel: one entry, its options and the created link.
#[derive(Debug, Clone, Default)]
pub struct SharePanel {
    item: Option<Entry>,
    /// Options applied to the next creation.
    pub options: ShareOptions,
    link: Option<ShareResponse>,
    generating: bool,
}

impl SharePanel {
    /// Create a closed panel with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the panel for `item`, discarding any previous link.
    pub fn open(&mut self, item: Entry) {
        self.item = Some(item);
        self.link = None;
    }

    /// Close the panel. The server-side link stays valid.
    pub fn close(&mut self) {
        self.item = None;
        self.link = None;
        self.generating = false;
    }

    /// Whether the panel is open.
    pub fn is_open(&self) -> bool {
        self.item.is_some()
    }

    /// The entry being shared.
    pub fn item(&self) -> Option<&Entry> {
        self.item.as_ref()
    }

    /// Whether a creation call is in flight.
    pub fn is_generating(&self) -> bool {
        self.generating
    }

    /// URL of the created link.
    pub fn url(&self) -> Option<&str> {
        self.link.as_ref().map(|l| l.url.as_str()).filter(|u| !u.is_empty())
    }

    /// Expiry of the created link.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.link
            .as_ref()
            .and_then(|l| l.expires_at)
            .and_then(epoch_to_utc)
    }

    /// Create a link for the open entry with the current options.
    ///
    /// Returns `Ok(None)` when the panel is closed.
    pub async fn create(&mut self, remote: &dyn RemoteFs) -> OpsResult<Option<&ShareResponse>> {
        let Some(item) = &self.item else {
            return Ok(None);
        };
        let request = self.options.to_request(&item.path);

        self.generating = true;
        let result = remote.create_share(&request).await;
        self.generating = false;

        match result {
            Ok(response) => {
                info!(path = %request.path, access = %self.options.access, "Share link created");
                Ok(Some(&*self.link.insert(response)))
            }
            Err(e) => {
                warn!(path = %request.path, error = %e, "Share link creation failed");
                Err(e.into())
            }
        }
    }
}
