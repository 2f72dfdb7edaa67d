//! Flat-file statement store.
//!
//! Statements are persisted as CSV, one file per (ticker, statement type)
//! under a per-index directory, one row per fiscal period:
//!
//! ```text
//! data/
//!   sp500/
//!     AAPL_income_statement.csv
//!     AAPL_balance_sheet.csv
//!     AAPL_cash_flow.csv
//!     ...
//! ```
//!
//! Writes are full rewrites per ticker file, so re-fetching the same data
//! leaves the files byte-identical.

use crate::error::{DataError, Result};
use crate::statements::{
    BalanceSheet, CashFlowStatement, IncomeStatement, PeriodType, StatementSet, StatementType,
    common_periods,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// One income statement row in a per-ticker CSV file.
#[derive(Debug, Serialize, Deserialize)]
struct IncomeRow {
    symbol: String,
    cik: String,
    period_end: NaiveDate,
    period_type: PeriodType,
    fiscal_year: i32,
    fiscal_quarter: Option<i32>,
    revenue: Option<f64>,
    cost_of_revenue: Option<f64>,
    gross_profit: Option<f64>,
    net_income: Option<f64>,
}

/// One balance sheet row in a per-ticker CSV file.
#[derive(Debug, Serialize, Deserialize)]
struct BalanceRow {
    symbol: String,
    cik: String,
    period_end: NaiveDate,
    period_type: PeriodType,
    fiscal_year: i32,
    fiscal_quarter: Option<i32>,
    total_assets: Option<f64>,
    current_assets: Option<f64>,
    current_liabilities: Option<f64>,
    long_term_debt: Option<f64>,
    total_liabilities: Option<f64>,
    stockholders_equity: Option<f64>,
    shares_outstanding: Option<f64>,
}

/// One cash flow row in a per-ticker CSV file.
#[derive(Debug, Serialize, Deserialize)]
struct CashFlowRow {
    symbol: String,
    cik: String,
    period_end: NaiveDate,
    period_type: PeriodType,
    fiscal_year: i32,
    fiscal_quarter: Option<i32>,
    operating_cash_flow: Option<f64>,
    capital_expenditures: Option<f64>,
}

/// Per-period key columns shared by the three row types.
#[derive(Debug, Clone)]
struct PeriodKey {
    cik: String,
    period_type: PeriodType,
    fiscal_year: i32,
    fiscal_quarter: Option<i32>,
}

/// Flat-file CSV store for financial statements.
#[derive(Debug, Clone)]
pub struct CsvStore {
    root: PathBuf,
}

impl CsvStore {
    /// Create a store rooted at the given data directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The store's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one index's statement files.
    pub fn index_dir(&self, index_key: &str) -> PathBuf {
        self.root.join(index_key)
    }

    /// Path of one ticker's statement file.
    pub fn statement_path(
        &self,
        index_key: &str,
        symbol: &str,
        statement_type: StatementType,
    ) -> PathBuf {
        self.index_dir(index_key)
            .join(format!("{}_{}.csv", symbol, statement_type.file_suffix()))
    }

    /// Persist statement sets, grouped per ticker into three CSV files.
    ///
    /// Each ticker's files are rewritten in full with periods ordered most
    /// recent first; writing the same sets twice is idempotent.
    pub fn write_statement_sets(&self, index_key: &str, sets: &[StatementSet]) -> Result<()> {
        let dir = self.index_dir(index_key);
        std::fs::create_dir_all(&dir)?;

        let mut by_symbol: BTreeMap<&str, Vec<&StatementSet>> = BTreeMap::new();
        for set in sets {
            by_symbol.entry(&set.symbol).or_default().push(set);
        }

        for (symbol, mut sets) in by_symbol {
            sets.sort_by(|a, b| b.period_end.cmp(&a.period_end));

            let mut income =
                csv::Writer::from_path(self.statement_path(index_key, symbol, StatementType::IncomeStatement))?;
            let mut balance =
                csv::Writer::from_path(self.statement_path(index_key, symbol, StatementType::BalanceSheet))?;
            let mut cash_flow =
                csv::Writer::from_path(self.statement_path(index_key, symbol, StatementType::CashFlow))?;

            for set in sets {
                income.serialize(IncomeRow {
                    symbol: set.symbol.clone(),
                    cik: set.cik.clone(),
                    period_end: set.period_end,
                    period_type: set.period_type,
                    fiscal_year: set.fiscal_year,
                    fiscal_quarter: set.fiscal_quarter,
                    revenue: set.income.revenue,
                    cost_of_revenue: set.income.cost_of_revenue,
                    gross_profit: set.income.gross_profit,
                    net_income: set.income.net_income,
                })?;
                balance.serialize(BalanceRow {
                    symbol: set.symbol.clone(),
                    cik: set.cik.clone(),
                    period_end: set.period_end,
                    period_type: set.period_type,
                    fiscal_year: set.fiscal_year,
                    fiscal_quarter: set.fiscal_quarter,
                    total_assets: set.balance.total_assets,
                    current_assets: set.balance.current_assets,
                    current_liabilities: set.balance.current_liabilities,
                    long_term_debt: set.balance.long_term_debt,
                    total_liabilities: set.balance.total_liabilities,
                    stockholders_equity: set.balance.stockholders_equity,
                    shares_outstanding: set.balance.shares_outstanding,
                })?;
                cash_flow.serialize(CashFlowRow {
                    symbol: set.symbol.clone(),
                    cik: set.cik.clone(),
                    period_end: set.period_end,
                    period_type: set.period_type,
                    fiscal_year: set.fiscal_year,
                    fiscal_quarter: set.fiscal_quarter,
                    operating_cash_flow: set.cash_flow.operating_cash_flow,
                    capital_expenditures: set.cash_flow.capital_expenditures,
                })?;
            }

            income.flush()?;
            balance.flush()?;
            cash_flow.flush()?;
        }

        Ok(())
    }

    /// Load one ticker's statement sets from its three CSV files.
    ///
    /// Only periods present in all three files are returned (delta
    /// criteria require the full triple), most recent first.
    pub fn load_statement_sets(&self, index_key: &str, symbol: &str) -> Result<Vec<StatementSet>> {
        let mut income: HashMap<NaiveDate, (PeriodKey, IncomeStatement)> = HashMap::new();
        let mut balance: HashMap<NaiveDate, BalanceSheet> = HashMap::new();
        let mut cash_flow: HashMap<NaiveDate, CashFlowStatement> = HashMap::new();

        for row in self.read_rows::<IncomeRow>(index_key, symbol, StatementType::IncomeStatement)? {
            let key = PeriodKey {
                cik: row.cik,
                period_type: row.period_type,
                fiscal_year: row.fiscal_year,
                fiscal_quarter: row.fiscal_quarter,
            };
            income.insert(
                row.period_end,
                (
                    key,
                    IncomeStatement {
                        revenue: row.revenue,
                        cost_of_revenue: row.cost_of_revenue,
                        gross_profit: row.gross_profit,
                        net_income: row.net_income,
                    },
                ),
            );
        }

        for row in self.read_rows::<BalanceRow>(index_key, symbol, StatementType::BalanceSheet)? {
            balance.insert(
                row.period_end,
                BalanceSheet {
                    total_assets: row.total_assets,
                    current_assets: row.current_assets,
                    current_liabilities: row.current_liabilities,
                    long_term_debt: row.long_term_debt,
                    total_liabilities: row.total_liabilities,
                    stockholders_equity: row.stockholders_equity,
                    shares_outstanding: row.shares_outstanding,
                },
            );
        }

        for row in self.read_rows::<CashFlowRow>(index_key, symbol, StatementType::CashFlow)? {
            cash_flow.insert(
                row.period_end,
                CashFlowStatement {
                    operating_cash_flow: row.operating_cash_flow,
                    capital_expenditures: row.capital_expenditures,
                },
            );
        }

        let income_periods: Vec<NaiveDate> = income.keys().copied().collect();
        let balance_periods: Vec<NaiveDate> = balance.keys().copied().collect();
        let cash_flow_periods: Vec<NaiveDate> = cash_flow.keys().copied().collect();

        let sets = common_periods(&income_periods, &balance_periods, &cash_flow_periods)
            .into_iter()
            .filter_map(|period_end| {
                let (key, income) = income.remove(&period_end)?;
                Some(StatementSet {
                    symbol: symbol.to_string(),
                    cik: key.cik,
                    period_end,
                    period_type: key.period_type,
                    fiscal_year: key.fiscal_year,
                    fiscal_quarter: key.fiscal_quarter,
                    income,
                    balance: balance.remove(&period_end)?,
                    cash_flow: cash_flow.remove(&period_end)?,
                })
            })
            .collect();

        Ok(sets)
    }

    /// Discover tickers with stored statements by scanning the income
    /// statement files of an index directory.
    pub fn tickers(&self, index_key: &str) -> Result<Vec<String>> {
        let dir = self.index_dir(index_key);
        if !dir.is_dir() {
            return Err(DataError::MissingData {
                symbol: index_key.to_string(),
                reason: format!("no data directory at {}", dir.display()),
            });
        }

        let suffix = format!("_{}.csv", StatementType::IncomeStatement.file_suffix());
        let mut tickers = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            if let Some(name) = entry.file_name().to_str()
                && let Some(symbol) = name.strip_suffix(&suffix)
            {
                tickers.push(symbol.to_string());
            }
        }

        tickers.sort_unstable();
        Ok(tickers)
    }

    /// Read and deserialize one statement file.
    fn read_rows<T: serde::de::DeserializeOwned>(
        &self,
        index_key: &str,
        symbol: &str,
        statement_type: StatementType,
    ) -> Result<Vec<T>> {
        let path = self.statement_path(index_key, symbol, statement_type);
        let mut reader = csv::Reader::from_path(&path).map_err(|e| {
            if matches!(e.kind(), csv::ErrorKind::Io(io) if io.kind() == std::io::ErrorKind::NotFound)
            {
                DataError::MissingData {
                    symbol: symbol.to_string(),
                    reason: format!("no {} file at {}", statement_type.name(), path.display()),
                }
            } else {
                DataError::Csv(e)
            }
        })?;

        let mut rows = Vec::new();
        for row in reader.deserialize() {
            rows.push(row?);
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statements::{BalanceSheet, CashFlowStatement, IncomeStatement};

    fn sample_set(symbol: &str, year: i32) -> StatementSet {
        StatementSet {
            symbol: symbol.to_string(),
            cik: "0000000001".to_string(),
            period_end: NaiveDate::from_ymd_opt(year, 12, 31).unwrap(),
            period_type: PeriodType::Annual,
            fiscal_year: year,
            fiscal_quarter: None,
            income: IncomeStatement {
                revenue: Some(500_000.0),
                cost_of_revenue: Some(300_000.0),
                gross_profit: Some(200_000.0),
                net_income: Some(50_000.0),
            },
            balance: BalanceSheet {
                total_assets: Some(1_000_000.0),
                current_assets: Some(300_000.0),
                current_liabilities: Some(100_000.0),
                long_term_debt: None,
                total_liabilities: Some(400_000.0),
                stockholders_equity: Some(600_000.0),
                shares_outstanding: Some(10_000.0),
            },
            cash_flow: CashFlowStatement {
                operating_cash_flow: Some(60_000.0),
                capital_expenditures: Some(20_000.0),
            },
        }
    }

    fn temp_store(test: &str) -> CsvStore {
        let root = std::env::temp_dir().join(format!("fscore-store-{}-{}", test, std::process::id()));
        let _ = std::fs::remove_dir_all(&root);
        CsvStore::new(root)
    }

    #[test]
    fn test_write_and_load_round_trip() {
        let store = temp_store("roundtrip");

        let sets = vec![sample_set("TEST", 2023), sample_set("TEST", 2024)];
        store.write_statement_sets("sp500", &sets).unwrap();

        let loaded = store.load_statement_sets("sp500", "TEST").unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].fiscal_year, 2024);
        assert_eq!(loaded[1].fiscal_year, 2023);
        assert_eq!(loaded[0], sample_set("TEST", 2024));

        // Missing line items survive the round trip as None
        assert_eq!(loaded[0].balance.long_term_debt, None);

        let _ = std::fs::remove_dir_all(store.root());
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let store = temp_store("idempotent");

        let sets = vec![sample_set("TEST", 2024)];
        store.write_statement_sets("sp500", &sets).unwrap();
        let path = store.statement_path("sp500", "TEST", StatementType::BalanceSheet);
        let first = std::fs::read_to_string(&path).unwrap();

        store.write_statement_sets("sp500", &sets).unwrap();
        let second = std::fs::read_to_string(&path).unwrap();

        assert_eq!(first, second);

        let _ = std::fs::remove_dir_all(store.root());
    }

    #[test]
    fn test_ticker_discovery() {
        let store = temp_store("discovery");

        let sets = vec![sample_set("AAA", 2024), sample_set("BBB", 2024)];
        store.write_statement_sets("dow_jones", &sets).unwrap();

        let tickers = store.tickers("dow_jones").unwrap();
        assert_eq!(tickers, vec!["AAA".to_string(), "BBB".to_string()]);

        let _ = std::fs::remove_dir_all(store.root());
    }

    #[test]
    fn test_missing_file_is_missing_data() {
        let store = temp_store("missing");

        store
            .write_statement_sets("sp500", &[sample_set("AAA", 2024)])
            .unwrap();

        let result = store.load_statement_sets("sp500", "ZZZ");
        assert!(matches!(result, Err(DataError::MissingData { .. })));

        let _ = std::fs::remove_dir_all(store.root());
    }

    #[test]
    fn test_missing_directory_for_tickers() {
        let store = temp_store("nodir");
        let result = store.tickers("sp500");
        assert!(matches!(result, Err(DataError::MissingData { .. })));
    }
}
