//! Cache manager for statement data.
//!
//! Provides a singleton-like cache manager that handles the SQLite cache
//! with a platform-specific default location.

use fscore_data::cache::SqliteCache;
use fscore_data::error::DataError;
use std::path::PathBuf;

/// Get the default cache directory path.
///
/// Uses platform-specific cache directories:
/// - Linux: `~/.cache/fscore/`
/// - macOS: `~/Library/Caches/fscore/`
/// - Windows: `%LOCALAPPDATA%\fscore\cache\`
pub(crate) fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fscore")
}

/// Get the default cache database path.
pub(crate) fn default_cache_path() -> PathBuf {
    default_cache_dir().join("fscore.db")
}

/// Get the configured cache path.
pub(crate) fn get_cache_path() -> PathBuf {
    default_cache_path()
}

/// Open the cache, creating the directory if needed.
pub(crate) fn open_cache() -> Result<SqliteCache, DataError> {
    let cache_path = get_cache_path();

    // Ensure parent directory exists
    if let Some(parent) = cache_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    SqliteCache::new(&cache_path)
}
