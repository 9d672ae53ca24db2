//! Client configuration.

use std::path::Path;
use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Configuration for a client session.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ClientConfig {
    /// Base URL of the file service (`http://host:port`).
    #[serde(default)]
    pub base_url: String,

    /// Entries per page of the main listing.
    #[builder(default = "100")]
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Delay before the watch channel reconnects.
    #[builder(default = "3000")]
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,

    /// Interval between monitor stats polls.
    #[builder(default = "5000")]
    #[serde(default = "default_stats_interval_ms")]
    pub stats_interval_ms: u64,

    /// Directory opened when no last path was persisted.
    #[builder(default = "default_path()")]
    #[serde(default = "default_path")]
    pub default_path: String,

    /// Size of each streamed upload chunk in bytes.
    #[builder(default = "64 * 1024")]
    #[serde(default = "default_upload_chunk_size")]
    pub upload_chunk_size: usize,

    /// How long a toast stays visible.
    #[builder(default = "3000")]
    #[serde(default = "default_toast_duration_ms")]
    pub toast_duration_ms: u64,
}

fn default_page_size() -> usize {
    100
}

fn default_reconnect_delay_ms() -> u64 {
    3000
}

fn default_stats_interval_ms() -> u64 {
    5000
}

fn default_path() -> String {
    "C:\\".to_string()
}

fn default_upload_chunk_size() -> usize {
    64 * 1024
}

fn default_toast_duration_ms() -> u64 {
    3000
}

impl ClientConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.base_url {
            Some(ref url) if url.trim().is_empty() => {
                return Err("Base URL cannot be empty".to_string());
            }
            None => return Err("Base URL is required".to_string()),
            _ => {}
        }
        if self.page_size == Some(0) {
            return Err("Page size must be greater than zero".to_string());
        }
        if self.upload_chunk_size == Some(0) {
            return Err("Upload chunk size must be greater than zero".to_string());
        }
        Ok(())
    }
}

impl ClientConfig {
    /// Create a new client config builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Create a config with defaults for the given server.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            page_size: default_page_size(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            stats_interval_ms: default_stats_interval_ms(),
            default_path: default_path(),
            upload_chunk_size: default_upload_chunk_size(),
            toast_duration_ms: default_toast_duration_ms(),
        }
    }

    /// Load a TOML config file, falling back to defaults when it is missing.
    ///
    /// A `base_url` in the file wins over the one given here.
    pub fn load(path: &Path, base_url: impl Into<String>) -> Result<Self, String> {
        let base_url = base_url.into();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new(base_url)),
            Err(e) => return Err(format!("Failed to read {}: {e}", path.display())),
        };

        let mut config: Self =
            toml::from_str(&content).map_err(|e| format!("Invalid config: {e}"))?;
        if config.base_url.trim().is_empty() {
            config.base_url = base_url;
        }

        if config.page_size == 0 {
            return Err("Page size must be greater than zero".to_string());
        }
        Ok(config)
    }

    /// Reconnect delay as a duration.
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    /// Stats poll interval as a duration.
    pub fn stats_interval(&self) -> Duration {
        Duration::from_millis(self.stats_interval_ms)
    }

    /// Toast display duration.
    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://127.0.0.1:8000")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ClientConfig::builder()
            .base_url("http://files.local")
            .page_size(50usize)
            .reconnect_delay_ms(500u64)
            .build()
            .unwrap();

        assert_eq!(config.base_url, "http://files.local");
        assert_eq!(config.page_size, 50);
        assert_eq!(config.reconnect_delay(), Duration::from_millis(500));
        assert_eq!(config.default_path, "C:\\");
    }

    #[test]
    fn test_config_builder_rejects_bad_values() {
        assert!(ClientConfig::builder().build().is_err());
        assert!(ClientConfig::builder().base_url("  ").build().is_err());
        assert!(
            ClientConfig::builder()
                .base_url("http://x")
                .page_size(0usize)
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::load(&dir.path().join("absent.toml"), "http://x").unwrap();
        assert_eq!(config.base_url, "http://x");
        assert_eq!(config.page_size, 100);
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rfe.toml");
        std::fs::write(&path, "page_size = 25\ndefault_path = 'D:\\'\n").unwrap();

        let config = ClientConfig::load(&path, "http://x").unwrap();
        assert_eq!(config.page_size, 25);
        assert_eq!(config.default_path, "D:\\");
        assert_eq!(config.stats_interval_ms, 5000);
    }
}
