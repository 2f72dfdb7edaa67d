//! Financial statement types.
//!
//! A ticker's fundamentals for one fiscal period are modeled as a
//! [`StatementSet`]: the income statement, balance sheet, and cash flow
//! statement reported for that period. Line items that a company did not
//! tag stay `None`; they are never substituted with zero.

use crate::error::{DataError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The three financial statement types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatementType {
    /// Income statement (10-K/10-Q "statements of operations")
    IncomeStatement,
    /// Balance sheet
    BalanceSheet,
    /// Cash flow statement
    CashFlow,
}

impl StatementType {
    /// Returns all statement types.
    pub fn all() -> Vec<Self> {
        vec![Self::IncomeStatement, Self::BalanceSheet, Self::CashFlow]
    }

    /// Returns the human-readable statement name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::IncomeStatement => "Income Statement",
            Self::BalanceSheet => "Balance Sheet",
            Self::CashFlow => "Cash Flow",
        }
    }

    /// Returns the suffix used for per-ticker statement files.
    pub const fn file_suffix(&self) -> &'static str {
        match self {
            Self::IncomeStatement => "income_statement",
            Self::BalanceSheet => "balance_sheet",
            Self::CashFlow => "cash_flow",
        }
    }

    /// Convert to database string representation.
    pub const fn to_db_str(&self) -> &'static str {
        match self {
            Self::IncomeStatement => "income",
            Self::BalanceSheet => "balance",
            Self::CashFlow => "cash_flow",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self> {
        match s {
            "income" => Ok(Self::IncomeStatement),
            "balance" => Ok(Self::BalanceSheet),
            "cash_flow" => Ok(Self::CashFlow),
            _ => Err(DataError::Parse(format!("Invalid statement type: {}", s))),
        }
    }
}

/// Period type for financial statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodType {
    /// Quarterly (10-Q) filing
    Quarterly,
    /// Annual (10-K) filing
    Annual,
}

impl PeriodType {
    /// Convert form type to period type.
    pub fn from_form(form: &str) -> Option<Self> {
        match form {
            "10-Q" => Some(Self::Quarterly),
            "10-K" => Some(Self::Annual),
            _ => None,
        }
    }

    /// Convert to database string representation.
    pub const fn to_db_str(&self) -> &'static str {
        match self {
            Self::Quarterly => "Q",
            Self::Annual => "A",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self> {
        match s {
            "Q" => Ok(Self::Quarterly),
            "A" => Ok(Self::Annual),
            _ => Err(DataError::Parse(format!("Invalid period type: {}", s))),
        }
    }
}

/// Income statement line items for one fiscal period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomeStatement {
    /// Total revenue (net sales)
    pub revenue: Option<f64>,
    /// Cost of revenue (cost of goods sold)
    pub cost_of_revenue: Option<f64>,
    /// Gross profit
    pub gross_profit: Option<f64>,
    /// Net income
    pub net_income: Option<f64>,
}

/// Balance sheet line items for one fiscal period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceSheet {
    /// Total assets
    pub total_assets: Option<f64>,
    /// Current assets
    pub current_assets: Option<f64>,
    /// Current liabilities
    pub current_liabilities: Option<f64>,
    /// Long-term debt
    pub long_term_debt: Option<f64>,
    /// Total liabilities
    pub total_liabilities: Option<f64>,
    /// Stockholders' equity
    pub stockholders_equity: Option<f64>,
    /// Common shares outstanding
    pub shares_outstanding: Option<f64>,
}

/// Cash flow statement line items for one fiscal period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CashFlowStatement {
    /// Operating cash flow
    pub operating_cash_flow: Option<f64>,
    /// Capital expenditures
    pub capital_expenditures: Option<f64>,
}

/// One fiscal period's statement triple for a single ticker.
///
/// Statements are immutable once stored; scores are derived from stored
/// sets without side effects on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementSet {
    /// Stock symbol
    pub symbol: String,
    /// Central Index Key (CIK) - SEC identifier
    pub cik: String,
    /// Period end date
    pub period_end: NaiveDate,
    /// Period type (quarterly or annual)
    pub period_type: PeriodType,
    /// Fiscal year
    pub fiscal_year: i32,
    /// Fiscal quarter (1-4 for quarterly filings, None for annual)
    pub fiscal_quarter: Option<i32>,
    /// Income statement
    pub income: IncomeStatement,
    /// Balance sheet
    pub balance: BalanceSheet,
    /// Cash flow statement
    pub cash_flow: CashFlowStatement,
}

/// Period end dates present in all three statement collections, sorted
/// most recent first.
///
/// Delta criteria need two consecutive periods for which every statement
/// exists; scoring uses the first two entries of this intersection.
pub fn common_periods(
    income: &[NaiveDate],
    balance: &[NaiveDate],
    cash_flow: &[NaiveDate],
) -> Vec<NaiveDate> {
    let balance: HashSet<&NaiveDate> = balance.iter().collect();
    let cash_flow: HashSet<&NaiveDate> = cash_flow.iter().collect();

    let mut common: Vec<NaiveDate> = income
        .iter()
        .filter(|d| balance.contains(d) && cash_flow.contains(d))
        .copied()
        .collect();
    common.sort_unstable();
    common.dedup();
    common.reverse();
    common
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_statement_type_round_trip() {
        for st in StatementType::all() {
            assert_eq!(StatementType::from_db_str(st.to_db_str()).unwrap(), st);
        }
        assert!(StatementType::from_db_str("equity").is_err());
    }

    #[test]
    fn test_period_type_from_form() {
        assert_eq!(PeriodType::from_form("10-Q"), Some(PeriodType::Quarterly));
        assert_eq!(PeriodType::from_form("10-K"), Some(PeriodType::Annual));
        assert_eq!(PeriodType::from_form("8-K"), None);
    }

    #[test]
    fn test_period_type_round_trip() {
        assert_eq!(
            PeriodType::from_db_str(PeriodType::Annual.to_db_str()).unwrap(),
            PeriodType::Annual
        );
        assert!(PeriodType::from_db_str("X").is_err());
    }

    #[test]
    fn test_common_periods_intersection() {
        let income = vec![d(2024, 12, 31), d(2023, 12, 31), d(2022, 12, 31)];
        let balance = vec![d(2023, 12, 31), d(2024, 12, 31)];
        let cash_flow = vec![d(2022, 12, 31), d(2023, 12, 31), d(2024, 12, 31)];

        let common = common_periods(&income, &balance, &cash_flow);
        assert_eq!(common, vec![d(2024, 12, 31), d(2023, 12, 31)]);
    }

    #[test]
    fn test_common_periods_empty_when_disjoint() {
        let income = vec![d(2024, 12, 31)];
        let balance = vec![d(2023, 12, 31)];
        let cash_flow = vec![d(2024, 12, 31)];

        assert!(common_periods(&income, &balance, &cash_flow).is_empty());
    }

    #[test]
    fn test_missing_line_items_stay_none() {
        let income = IncomeStatement {
            revenue: Some(1000.0),
            ..Default::default()
        };
        assert_eq!(income.net_income, None);
        assert_eq!(income.cost_of_revenue, None);
    }
}
