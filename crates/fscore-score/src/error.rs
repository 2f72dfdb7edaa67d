//! Error types for scoring operations.

use thiserror::Error;

/// Result type for scoring operations.
pub type Result<T> = std::result::Result<T, ScoreError>;

/// Errors that can occur during scoring operations.
#[derive(Debug, Error)]
pub enum ScoreError {
    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Fewer than two aligned periods available for a ticker
    #[error("Insufficient periods for {symbol}: {available} common period(s), need 2")]
    InsufficientPeriods {
        /// Symbol that was scored
        symbol: String,
        /// Number of aligned periods found
        available: usize,
    },
}
