//! Index constituent lists and combined universes.

use crate::universe::index::MarketIndex;
use std::collections::HashMap;

/// A stock and the index whose constituent list it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constituent {
    /// Stock symbol.
    pub symbol: String,
    /// Source index.
    pub index: MarketIndex,
}

impl Constituent {
    /// Create a new constituent.
    pub fn new(symbol: impl Into<String>, index: MarketIndex) -> Self {
        Self {
            symbol: symbol.into(),
            index,
        }
    }
}

/// A universe built from one or more market index constituent lists.
///
/// Symbols that appear in more than one index are kept once; membership in
/// every contributing index is retained and queryable via [`indexes_for`].
///
/// [`indexes_for`]: IndexUniverse::indexes_for
#[derive(Debug, Clone)]
pub struct IndexUniverse {
    indexes: Vec<MarketIndex>,
    constituents: Vec<Constituent>,
    membership: HashMap<String, Vec<MarketIndex>>,
}

impl IndexUniverse {
    /// Create a universe from a single index.
    pub fn new(index: MarketIndex) -> Self {
        Self::combined(&[index])
    }

    /// Create a universe from several indexes, deduplicating symbols.
    ///
    /// The first index that lists a symbol determines its position; later
    /// indexes only add to the symbol's membership.
    pub fn combined(indexes: &[MarketIndex]) -> Self {
        let mut constituents: Vec<Constituent> = Vec::new();
        let mut membership: HashMap<String, Vec<MarketIndex>> = HashMap::new();

        for &index in indexes {
            for symbol in index_members(index) {
                let entry = membership.entry((*symbol).to_string()).or_default();
                if entry.is_empty() {
                    constituents.push(Constituent::new(*symbol, index));
                }
                if !entry.contains(&index) {
                    entry.push(index);
                }
            }
        }

        Self {
            indexes: indexes.to_vec(),
            constituents,
            membership,
        }
    }

    /// Get the indexes this universe was built from.
    pub fn indexes(&self) -> &[MarketIndex] {
        &self.indexes
    }

    /// Get all constituents (deduplicated).
    pub fn constituents(&self) -> &[Constituent] {
        &self.constituents
    }

    /// Get all symbols (deduplicated, insertion order).
    pub fn symbols(&self) -> Vec<String> {
        self.constituents.iter().map(|c| c.symbol.clone()).collect()
    }

    /// Get the indexes a symbol belongs to.
    pub fn indexes_for(&self, symbol: &str) -> Option<&[MarketIndex]> {
        self.membership.get(symbol).map(Vec::as_slice)
    }

    /// Get the count of symbols per contributing index.
    pub fn index_counts(&self) -> HashMap<MarketIndex, usize> {
        let mut counts = HashMap::new();
        for indexes in self.membership.values() {
            for index in indexes {
                *counts.entry(*index).or_insert(0) += 1;
            }
        }
        counts
    }
}

/// Static constituent list for an index.
const fn index_members(index: MarketIndex) -> &'static [&'static str] {
    match index {
        MarketIndex::SP500 => SP500_MEMBERS,
        MarketIndex::DowJones => DOW_JONES_MEMBERS,
    }
}

/// S&P 500 constituents (120 large-cap stocks across all sectors).
const SP500_MEMBERS: &[&str] = &[
    "AAPL", "MSFT", "NVDA", "AVGO", "ORCL", "CSCO", "ACN", "AMD", "IBM", "INTC", "TXN", "QCOM",
    "ADBE", "CRM", "NOW", "LLY", "UNH", "JNJ", "ABBV", "MRK", "TMO", "ABT", "DHR", "PFE", "BMY",
    "AMGN", "GILD", "BRK.B", "JPM", "V", "MA", "BAC", "WFC", "MS", "GS", "BLK", "C", "AXP", "SCHW",
    "TRV", "AMZN", "TSLA", "HD", "MCD", "NKE", "SBUX", "LOW", "TJX", "BKNG", "CMG", "F", "GM",
    "GOOGL", "GOOG", "META", "NFLX", "DIS", "CMCSA", "T", "VZ", "TMUS", "EA", "CAT", "UNP", "RTX",
    "HON", "UPS", "BA", "DE", "LMT", "GE", "MMM", "FDX", "NSC", "WMT", "PG", "COST", "KO", "PEP",
    "PM", "MO", "CL", "MDLZ", "KHC", "XOM", "CVX", "COP", "SLB", "EOG", "MPC", "PSX", "VLO", "OXY",
    "HAL", "NEE", "SO", "DUK", "CEG", "AEP", "EXC", "XEL", "D", "PLD", "AMT", "EQIX", "CCI", "PSA",
    "SPG", "O", "WELL", "LIN", "APD", "SHW", "FCX", "NEM", "ECL", "DD", "DOW", "PPG", "NUE",
];

/// Dow Jones Industrial Average constituents (30 stocks).
const DOW_JONES_MEMBERS: &[&str] = &[
    "AAPL", "AMGN", "AMZN", "AXP", "BA", "CAT", "CRM", "CSCO", "CVX", "DIS", "GS", "HD", "HON",
    "IBM", "JNJ", "JPM", "KO", "MCD", "MMM", "MRK", "MSFT", "NKE", "NVDA", "PG", "SHW", "TRV",
    "UNH", "V", "VZ", "WMT",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sp500_universe() {
        let universe = IndexUniverse::new(MarketIndex::SP500);
        assert!(universe.constituents().len() >= 100);
        assert_eq!(universe.symbols().len(), universe.constituents().len());
    }

    #[test]
    fn test_dow_jones_universe() {
        let universe = IndexUniverse::new(MarketIndex::DowJones);
        assert_eq!(universe.symbols().len(), 30);
    }

    #[test]
    fn test_combined_deduplicates_overlap() {
        let sp500 = IndexUniverse::new(MarketIndex::SP500);
        let combined = IndexUniverse::combined(&[MarketIndex::SP500, MarketIndex::DowJones]);

        // Every DJIA symbol in our S&P 500 list overlaps, so the combined
        // universe only grows by the DJIA-only names.
        assert!(combined.symbols().len() < sp500.symbols().len() + 30);

        let symbols = combined.symbols();
        let appearances = symbols.iter().filter(|s| s.as_str() == "AAPL").count();
        assert_eq!(appearances, 1);
    }

    #[test]
    fn test_membership_lookup() {
        let combined = IndexUniverse::combined(&[MarketIndex::SP500, MarketIndex::DowJones]);

        let aapl = combined.indexes_for("AAPL").unwrap();
        assert!(aapl.contains(&MarketIndex::SP500));
        assert!(aapl.contains(&MarketIndex::DowJones));

        // XOM is S&P 500 only
        assert_eq!(combined.indexes_for("XOM"), Some(&[MarketIndex::SP500][..]));
        assert_eq!(combined.indexes_for("INVALID"), None);
    }

    #[test]
    fn test_index_counts() {
        let combined = IndexUniverse::combined(&[MarketIndex::SP500, MarketIndex::DowJones]);
        let counts = combined.index_counts();

        assert!(*counts.get(&MarketIndex::SP500).unwrap() >= 100);
        assert_eq!(*counts.get(&MarketIndex::DowJones).unwrap(), 30);
    }

    #[test]
    fn test_first_index_wins_ordering() {
        let combined = IndexUniverse::combined(&[MarketIndex::DowJones, MarketIndex::SP500]);
        let first = &combined.constituents()[0];
        assert_eq!(first.index, MarketIndex::DowJones);
    }
}
