//! Market index definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported market indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketIndex {
    /// S&P 500
    SP500,

    /// Dow Jones Industrial Average
    DowJones,
}

impl MarketIndex {
    /// Returns all supported indexes.
    pub fn all() -> Vec<Self> {
        vec![Self::SP500, Self::DowJones]
    }

    /// Returns the full index name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SP500 => "S&P 500",
            Self::DowJones => "Dow Jones Industrial Average",
        }
    }

    /// Returns a filesystem-safe identifier used for data directories.
    pub const fn key(&self) -> &'static str {
        match self {
            Self::SP500 => "sp500",
            Self::DowJones => "dow_jones",
        }
    }

    /// Parse an index from a CLI argument or directory key.
    pub fn from_arg(arg: &str) -> Option<Self> {
        let normalized = arg.to_lowercase().replace([' ', '-', '&', '.'], "");

        match normalized.as_str() {
            "sp500" | "spx" | "s_p500" => Some(Self::SP500),
            "dow_jones" | "dowjones" | "dow" | "djia" => Some(Self::DowJones),
            _ => None,
        }
    }
}

impl fmt::Display for MarketIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
