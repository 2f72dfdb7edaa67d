//! SEC EDGAR data source.
//!
//! The SEC publishes every company's XBRL facts through the Company Facts
//! JSON API. This module resolves tickers to CIK numbers, fetches the
//! facts under the SEC's rate limit, and extracts per-period statement
//! triples from them.

pub mod client;
pub mod provider;

pub use client::EdgarClient;
pub use provider::EdgarStatementProvider;
