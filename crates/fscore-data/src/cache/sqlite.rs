//! SQLite caching layer for statement data.
//!
//! Statements are cached one row per (symbol, statement type, period) with
//! the line items as a JSON payload, plus a ticker-to-CIK mapping table so
//! repeated fetches skip the symbol resolution round trip.

use crate::error::{DataError, Result};
use crate::statements::{
    BalanceSheet, CashFlowStatement, IncomeStatement, PeriodType, StatementSet, StatementType,
};
use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::BTreeMap;
use std::path::Path;

/// SQLite cache for statement data.
#[derive(Debug)]
pub struct SqliteCache {
    conn: Connection,
}

impl SqliteCache {
    /// Create a new SQLite cache.
    ///
    /// # Arguments
    /// * `path` - Path to the SQLite database file
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let cache = Self { conn };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Create an in-memory cache (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let cache = Self { conn };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Initialize the database schema.
    fn initialize_schema(&self) -> Result<()> {
        // Company CIK mappings
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS company_ciks (
                symbol TEXT PRIMARY KEY,
                cik TEXT NOT NULL,
                company_name TEXT,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        // Statement cache, one row per statement type per period
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS statements (
                symbol TEXT NOT NULL,
                statement_type TEXT NOT NULL,
                period_end TEXT NOT NULL,
                period_type TEXT NOT NULL,
                fiscal_year INTEGER NOT NULL,
                fiscal_quarter INTEGER,
                cik TEXT NOT NULL,
                data TEXT NOT NULL,
                cached_at TEXT NOT NULL,
                PRIMARY KEY (symbol, statement_type, period_end, period_type)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_statements_symbol ON statements(symbol)",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_statements_period ON statements(period_end)",
            [],
        )?;

        Ok(())
    }

    /// Get the cached CIK for a symbol.
    pub fn get_cik(&self, symbol: &str) -> Result<Option<String>> {
        let result = self
            .conn
            .query_row(
                "SELECT cik FROM company_ciks WHERE symbol = ?1",
                params![symbol],
                |row| row.get(0),
            )
            .optional()?;

        Ok(result)
    }

    /// Store a symbol-to-CIK mapping.
    pub fn put_cik(&self, symbol: &str, cik: &str, company_name: Option<&str>) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO company_ciks (symbol, cik, company_name, updated_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![symbol, cik, company_name, Utc::now().to_rfc3339()],
        )?;

        Ok(())
    }

    /// Store statement sets in a batch.
    ///
    /// Each set becomes three rows, one per statement type. `INSERT OR
    /// REPLACE` keeps re-fetching idempotent: the same period overwrites
    /// in place.
    pub fn put_statement_sets(&self, sets: &[StatementSet]) -> Result<()> {
        let cached_at = Utc::now().to_rfc3339();
        let tx = self.conn.unchecked_transaction()?;

        for set in sets {
            let payloads = [
                (StatementType::IncomeStatement, serde_json::to_string(&set.income)?),
                (StatementType::BalanceSheet, serde_json::to_string(&set.balance)?),
                (StatementType::CashFlow, serde_json::to_string(&set.cash_flow)?),
            ];

            for (statement_type, data) in payloads {
                tx.execute(
                    "INSERT OR REPLACE INTO statements (
                        symbol, statement_type, period_end, period_type,
                        fiscal_year, fiscal_quarter, cik, data, cached_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                    params![
                        set.symbol,
                        statement_type.to_db_str(),
                        set.period_end.to_string(),
                        set.period_type.to_db_str(),
                        set.fiscal_year,
                        set.fiscal_quarter,
                        set.cik,
                        data,
                        cached_at,
                    ],
                )?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Get all cached statement sets for a symbol, most recent first.
    ///
    /// Only periods for which all three statement types are cached are
    /// returned; partial periods are dropped.
    pub fn get_statement_sets(&self, symbol: &str) -> Result<Vec<StatementSet>> {
        let mut stmt = self.conn.prepare(
            "SELECT statement_type, period_end, period_type, fiscal_year,
                    fiscal_quarter, cik, data
             FROM statements
             WHERE symbol = ?1
             ORDER BY period_end DESC",
        )?;

        struct Row {
            statement_type: StatementType,
            period_end: NaiveDate,
            period_type: PeriodType,
            fiscal_year: i32,
            fiscal_quarter: Option<i32>,
            cik: String,
            data: String,
        }

        let rows = stmt.query_map(params![symbol], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i32>(3)?,
                row.get::<_, Option<i32>>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?;

        let mut parsed = Vec::new();
        for row in rows {
            let (statement_type, period_end, period_type, fiscal_year, fiscal_quarter, cik, data) =
                row?;
            parsed.push(Row {
                statement_type: StatementType::from_db_str(&statement_type)?,
                period_end: NaiveDate::parse_from_str(&period_end, "%Y-%m-%d")
                    .map_err(|e| DataError::Parse(e.to_string()))?,
                period_type: PeriodType::from_db_str(&period_type)?,
                fiscal_year,
                fiscal_quarter,
                cik,
                data,
            });
        }

        // Group the typed rows back into per-period triples.
        #[derive(Default)]
        struct Partial {
            fiscal_year: i32,
            fiscal_quarter: Option<i32>,
            cik: String,
            income: Option<IncomeStatement>,
            balance: Option<BalanceSheet>,
            cash_flow: Option<CashFlowStatement>,
        }

        let mut periods: BTreeMap<(NaiveDate, &'static str), Partial> = BTreeMap::new();
        for row in parsed {
            let entry = periods
                .entry((row.period_end, row.period_type.to_db_str()))
                .or_default();
            entry.fiscal_year = row.fiscal_year;
            entry.fiscal_quarter = row.fiscal_quarter;
            entry.cik = row.cik;
            match row.statement_type {
                StatementType::IncomeStatement => {
                    entry.income = Some(serde_json::from_str(&row.data)?);
                }
                StatementType::BalanceSheet => {
                    entry.balance = Some(serde_json::from_str(&row.data)?);
                }
                StatementType::CashFlow => {
                    entry.cash_flow = Some(serde_json::from_str(&row.data)?);
                }
            }
        }

        let mut sets: Vec<StatementSet> = periods
            .into_iter()
            .filter_map(|((period_end, period_type), partial)| {
                let period_type = PeriodType::from_db_str(period_type).ok()?;
                Some(StatementSet {
                    symbol: symbol.to_string(),
                    cik: partial.cik,
                    period_end,
                    period_type,
                    fiscal_year: partial.fiscal_year,
                    fiscal_quarter: partial.fiscal_quarter,
                    income: partial.income?,
                    balance: partial.balance?,
                    cash_flow: partial.cash_flow?,
                })
            })
            .collect();

        sets.sort_by(|a, b| b.period_end.cmp(&a.period_end));
        Ok(sets)
    }

    /// Check if recent statements are cached for a symbol.
    pub fn has_recent_statements(&self, symbol: &str, max_age_days: i64) -> Result<bool> {
        let cutoff = Utc::now() - chrono::Duration::days(max_age_days);
        let cutoff_str = cutoff.to_rfc3339();

        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM statements
             WHERE symbol = ?1 AND cached_at >= ?2",
            params![symbol, cutoff_str],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    /// Clear all cached data.
    pub fn clear_all(&self) -> Result<()> {
        self.conn.execute("DELETE FROM statements", [])?;
        self.conn.execute("DELETE FROM company_ciks", [])?;
        Ok(())
    }

    /// Clear cached data for a specific symbol.
    pub fn clear_symbol(&self, symbol: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM statements WHERE symbol = ?1", params![symbol])?;
        self.conn.execute(
            "DELETE FROM company_ciks WHERE symbol = ?1",
            params![symbol],
        )?;
        Ok(())
    }

    /// Get cache statistics.
    pub fn get_stats(&self) -> Result<CacheStats> {
        let statement_rows: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM statements", [], |row| row.get(0))?;

        let unique_symbols: i64 =
            self.conn
                .query_row("SELECT COUNT(DISTINCT symbol) FROM statements", [], |row| {
                    row.get(0)
                })?;

        let cik_mappings: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM company_ciks", [], |row| row.get(0))?;

        Ok(CacheStats {
            statement_rows: statement_rows as usize,
            unique_symbols: unique_symbols as usize,
            cik_mappings: cik_mappings as usize,
        })
    }
}

/// Cache statistics.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of cached statement rows (three per period)
    pub statement_rows: usize,
    /// Number of unique symbols
    pub unique_symbols: usize,
    /// Number of CIK mappings
    pub cik_mappings: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_set(symbol: &str, year: i32, net_income: f64) -> StatementSet {
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
                net_income: Some(net_income),
            },
            balance: BalanceSheet {
                total_assets: Some(1_000_000.0),
                current_assets: Some(300_000.0),
                current_liabilities: Some(100_000.0),
                long_term_debt: Some(200_000.0),
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

    #[test]
    fn test_cache_initialization() {
        let cache = SqliteCache::in_memory();
        assert!(cache.is_ok());
    }

    #[test]
    fn test_cik_operations() {
        let cache = SqliteCache::in_memory().unwrap();

        assert_eq!(cache.get_cik("AAPL").unwrap(), None);

        cache
            .put_cik("AAPL", "0000320193", Some("Apple Inc."))
            .unwrap();
        assert_eq!(cache.get_cik("AAPL").unwrap(), Some("0000320193".to_string()));

        // Replacing updates in place
        cache.put_cik("AAPL", "0000320194", None).unwrap();
        assert_eq!(cache.get_cik("AAPL").unwrap(), Some("0000320194".to_string()));
    }

    #[test]
    fn test_statement_round_trip() {
        let cache = SqliteCache::in_memory().unwrap();

        let sets = vec![sample_set("TEST", 2023, 40_000.0), sample_set("TEST", 2024, 50_000.0)];
        cache.put_statement_sets(&sets).unwrap();

        let loaded = cache.get_statement_sets("TEST").unwrap();
        assert_eq!(loaded.len(), 2);

        // Most recent first
        assert_eq!(loaded[0].fiscal_year, 2024);
        assert_eq!(loaded[0].income.net_income, Some(50_000.0));
        assert_eq!(loaded[1].fiscal_year, 2023);
        assert_eq!(loaded[1].balance.total_assets, Some(1_000_000.0));
        assert_eq!(loaded[1].cash_flow.operating_cash_flow, Some(60_000.0));
    }

    #[test]
    fn test_refetch_is_idempotent() {
        let cache = SqliteCache::in_memory().unwrap();

        let sets = vec![sample_set("TEST", 2024, 50_000.0)];
        cache.put_statement_sets(&sets).unwrap();
        cache.put_statement_sets(&sets).unwrap();

        let loaded = cache.get_statement_sets("TEST").unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0], sets[0]);
    }

    #[test]
    fn test_partial_periods_are_dropped() {
        let cache = SqliteCache::in_memory().unwrap();

        let set = sample_set("TEST", 2024, 50_000.0);
        cache.put_statement_sets(std::slice::from_ref(&set)).unwrap();

        // Delete one statement type for the period
        cache
            .conn
            .execute(
                "DELETE FROM statements WHERE symbol = 'TEST' AND statement_type = 'cash_flow'",
                [],
            )
            .unwrap();

        let loaded = cache.get_statement_sets("TEST").unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_has_recent_statements() {
        let cache = SqliteCache::in_memory().unwrap();

        assert!(!cache.has_recent_statements("TEST", 30).unwrap());

        cache
            .put_statement_sets(&[sample_set("TEST", 2024, 50_000.0)])
            .unwrap();
        assert!(cache.has_recent_statements("TEST", 30).unwrap());
    }

    #[test]
    fn test_clear_symbol() {
        let cache = SqliteCache::in_memory().unwrap();

        cache
            .put_statement_sets(&[
                sample_set("AAA", 2024, 1.0),
                sample_set("BBB", 2024, 2.0),
            ])
            .unwrap();
        cache.put_cik("AAA", "0000000001", None).unwrap();

        cache.clear_symbol("AAA").unwrap();

        assert!(cache.get_statement_sets("AAA").unwrap().is_empty());
        assert_eq!(cache.get_statement_sets("BBB").unwrap().len(), 1);
        assert_eq!(cache.get_cik("AAA").unwrap(), None);
    }

    #[test]
    fn test_stats() {
        let cache = SqliteCache::in_memory().unwrap();

        cache
            .put_statement_sets(&[
                sample_set("AAA", 2023, 1.0),
                sample_set("AAA", 2024, 2.0),
                sample_set("BBB", 2024, 3.0),
            ])
            .unwrap();
        cache.put_cik("AAA", "0000000001", None).unwrap();

        let stats = cache.get_stats().unwrap();
        assert_eq!(stats.statement_rows, 9);
        assert_eq!(stats.unique_symbols, 2);
        assert_eq!(stats.cik_mappings, 1);
    }
}
