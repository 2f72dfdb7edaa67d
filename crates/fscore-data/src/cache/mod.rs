//! Caching layer for fetched statement data.

pub mod sqlite;

pub use sqlite::{CacheStats, SqliteCache};
