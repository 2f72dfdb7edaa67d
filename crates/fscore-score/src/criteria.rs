//! The nine F-Score criteria.

use serde::{Deserialize, Serialize};
use std::fmt;

/// F-Score criterion categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Profitability signals (4 points)
    Profitability,
    /// Leverage and liquidity signals (3 points)
    LeverageLiquidity,
    /// Operating efficiency signals (2 points)
    Efficiency,
}

impl Category {
    /// Returns the human-readable category name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Profitability => "Profitability",
            Self::LeverageLiquidity => "Leverage/Liquidity",
            Self::Efficiency => "Operating Efficiency",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The nine F-Score criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Criterion {
    /// Return on assets positive in the current period.
    RoaPositive,
    /// Operating cash flow positive in the current period.
    CashFlowPositive,
    /// Return on assets improved over the prior period.
    RoaImprovement,
    /// Operating cash flow scaled by assets exceeds return on assets.
    AccrualsQuality,
    /// Long-term debt to assets decreased.
    LeverageImprovement,
    /// Current ratio increased.
    LiquidityImprovement,
    /// Shares outstanding did not increase.
    NoDilution,
    /// Gross margin increased.
    MarginImprovement,
    /// Asset turnover increased.
    TurnoverImprovement,
}

impl Criterion {
    /// All nine criteria in scoring order.
    pub const fn all() -> [Self; 9] {
        [
            Self::RoaPositive,
            Self::CashFlowPositive,
            Self::RoaImprovement,
            Self::AccrualsQuality,
            Self::LeverageImprovement,
            Self::LiquidityImprovement,
            Self::NoDilution,
            Self::MarginImprovement,
            Self::TurnoverImprovement,
        ]
    }

    /// Column-safe criterion name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::RoaPositive => "roa_positive",
            Self::CashFlowPositive => "cash_flow_positive",
            Self::RoaImprovement => "roa_improvement",
            Self::AccrualsQuality => "accruals_quality",
            Self::LeverageImprovement => "leverage_improvement",
            Self::LiquidityImprovement => "liquidity_improvement",
            Self::NoDilution => "no_dilution",
            Self::MarginImprovement => "margin_improvement",
            Self::TurnoverImprovement => "turnover_improvement",
        }
    }

    /// Human-readable criterion description.
    pub const fn description(&self) -> &'static str {
        match self {
            Self::RoaPositive => "Return on assets positive",
            Self::CashFlowPositive => "Operating cash flow positive",
            Self::RoaImprovement => "Return on assets improved",
            Self::AccrualsQuality => "Cash flow return exceeds accrual return",
            Self::LeverageImprovement => "Long-term debt to assets decreased",
            Self::LiquidityImprovement => "Current ratio increased",
            Self::NoDilution => "No share dilution",
            Self::MarginImprovement => "Gross margin increased",
            Self::TurnoverImprovement => "Asset turnover increased",
        }
    }

    /// The category the criterion belongs to.
    pub const fn category(&self) -> Category {
        match self {
            Self::RoaPositive
            | Self::CashFlowPositive
            | Self::RoaImprovement
            | Self::AccrualsQuality => Category::Profitability,
            Self::LeverageImprovement | Self::LiquidityImprovement | Self::NoDilution => {
                Category::LeverageLiquidity
            }
            Self::MarginImprovement | Self::TurnoverImprovement => Category::Efficiency,
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nine_criteria() {
        assert_eq!(Criterion::all().len(), 9);
    }

    #[test]
    fn test_category_point_split() {
        let counts = |category: Category| {
            Criterion::all()
                .iter()
                .filter(|c| c.category() == category)
                .count()
        };

        assert_eq!(counts(Category::Profitability), 4);
        assert_eq!(counts(Category::LeverageLiquidity), 3);
        assert_eq!(counts(Category::Efficiency), 2);
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = Criterion::all().iter().map(|c| c.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 9);
    }
}
