//! Session constants.

/// Prefix of the toast shown when a directory cannot be listed.
pub const LOAD_FAILED_PREFIX: &str = "Cannot access this folder";

/// Prefix of the toast shown when a deep search fails.
pub const SEARCH_FAILED_PREFIX: &str = "Search failed";

/// Toast shown when the properties panel cannot load.
pub const PROPERTIES_LOAD_FAILED: &str = "Failed to load properties";

/// Toast shown when properties cannot be saved.
pub const PROPERTIES_SAVE_FAILED: &str = "Failed to save properties";

/// Prefix of the toast shown when a download fails.
pub const DOWNLOAD_FAILED_PREFIX: &str = "Failed to download selected files";

/// Whether folder downloads use store-only compression by default.
pub const FAST_ZIP_DEFAULT: bool = true;
