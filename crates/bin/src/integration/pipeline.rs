//! Fetch and scoring pipeline for index universes.
//!
//! Fetching is fanned out over a bounded worker pool: each ticker is
//! independent, failures are recorded and skipped rather than aborting
//! the batch, and transient errors are retried with a linear backoff.
//! Statements land in the SQLite cache and the flat-file CSV store.

use super::cache_manager;
use fscore::universe::IndexUniverse;
use fscore_data::cache::SqliteCache;
use fscore_data::edgar::EdgarStatementProvider;
use fscore_data::error::DataError;
use fscore_data::statements::{PeriodType, StatementSet};
use fscore_data::store::CsvStore;
use fscore_output::FScoreExport;
use fscore_score::{FScore, PeriodSnapshot, ScoreError};
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Error type for pipeline operations.
#[derive(Debug, thiserror::Error)]
pub(crate) enum PipelineError {
    /// Statement fetch or storage error.
    #[error("Data error: {0}")]
    Data(#[from] DataError),
    /// Scoring error.
    #[error("Score error: {0}")]
    Score(#[from] ScoreError),
}

/// Configuration for statement fetching.
#[derive(Debug, Clone)]
pub(crate) struct FetchConfig {
    /// Fiscal periods to keep per ticker (at least two).
    pub periods: usize,
    /// Period type to fetch.
    pub period_type: PeriodType,
    /// Whether to use the cache.
    pub use_cache: bool,
    /// Whether to force refresh (ignore cache).
    pub force_refresh: bool,
    /// Concurrent fetches.
    pub concurrency: usize,
    /// Retries per ticker on transient failures.
    pub max_retries: u32,
    /// Cache entries younger than this are served without refetching.
    pub max_age_days: i64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            periods: 2,
            period_type: PeriodType::Annual,
            use_cache: true,
            force_refresh: false,
            concurrency: 8,
            max_retries: 2,
            max_age_days: 30,
        }
    }
}

/// Outcome of one index fetch.
#[derive(Debug, Default)]
pub(crate) struct FetchReport {
    /// Symbols with statements stored.
    pub fetched: Vec<String>,
    /// Symbols skipped, with the reason.
    pub skipped: Vec<(String, String)>,
}

/// Fetch statements for every symbol of a universe and persist them.
///
/// Symbols that fail to resolve or lack two usable periods are skipped
/// and recorded; the batch only fails when nothing could be fetched at
/// all (total loss of the data source).
pub(crate) async fn fetch_index(
    provider: &EdgarStatementProvider,
    store: &CsvStore,
    universe: &IndexUniverse,
    index_key: &str,
    config: &FetchConfig,
    progress: Option<&ProgressBar>,
) -> Result<FetchReport, PipelineError> {
    let symbols = universe.symbols();

    let cache = if config.use_cache {
        cache_manager::open_cache().ok()
    } else {
        None
    };
    let cache = Arc::new(Mutex::new(cache));

    if let Some(pb) = progress {
        pb.set_length(symbols.len() as u64);
        pb.set_message(format!(
            "Fetching {} symbols ({} concurrent)...",
            symbols.len(),
            config.concurrency
        ));
    }

    let collected: Arc<Mutex<Vec<StatementSet>>> = Arc::new(Mutex::new(Vec::new()));
    let mut report = FetchReport::default();

    let outcomes: Vec<(String, Option<String>)> = stream::iter(symbols)
        .map(|symbol| {
            let cache = Arc::clone(&cache);
            let collected = Arc::clone(&collected);
            async move {
                match fetch_symbol(provider, &cache, &symbol, config).await {
                    Ok(sets) => {
                        collected.lock().await.extend(sets);
                        (symbol, None)
                    }
                    Err(e) => (symbol, Some(e.to_string())),
                }
            }
        })
        .buffer_unordered(config.concurrency)
        .inspect(|(symbol, outcome)| {
            if let Some(pb) = progress {
                if let Some(reason) = outcome {
                    pb.suspend(|| {
                        eprintln!("Warning: skipping {}: {}", symbol, reason);
                    });
                }
                pb.inc(1);
            } else if let Some(reason) = outcome {
                eprintln!("Warning: skipping {}: {}", symbol, reason);
            }
        })
        .collect()
        .await;

    for (symbol, outcome) in outcomes {
        match outcome {
            None => report.fetched.push(symbol),
            Some(reason) => report.skipped.push((symbol, reason)),
        }
    }
    report.fetched.sort_unstable();
    report.skipped.sort_unstable();

    let sets = Arc::try_unwrap(collected).map_or_else(
        |_| unreachable!("all tasks completed, Arc should have single owner"),
        |mutex| mutex.into_inner(),
    );

    if report.fetched.is_empty() && !report.skipped.is_empty() {
        return Err(PipelineError::Data(DataError::MissingData {
            symbol: "batch".to_string(),
            reason: "no statements fetched for any symbol".to_string(),
        }));
    }

    store.write_statement_sets(index_key, &sets)?;

    Ok(report)
}

/// Fetch one ticker's statements, via the cache when possible.
async fn fetch_symbol(
    provider: &EdgarStatementProvider,
    cache: &Arc<Mutex<Option<SqliteCache>>>,
    symbol: &str,
    config: &FetchConfig,
) -> Result<Vec<StatementSet>, DataError> {
    let wanted = config.periods.max(2);

    // Serve from cache while the entries are fresh
    if config.use_cache && !config.force_refresh {
        let guard = cache.lock().await;
        if let Some(ref cache) = *guard
            && cache
                .has_recent_statements(symbol, config.max_age_days)
                .unwrap_or(false)
            && let Ok(sets) = cache.get_statement_sets(symbol)
        {
            let sets = select_periods(sets, config.period_type, wanted);
            if sets.len() >= 2 {
                return Ok(sets);
            }
        }
    }

    // Resolve the CIK, preferring the cached mapping
    let cached_cik = {
        let guard = cache.lock().await;
        guard.as_ref().and_then(|c| c.get_cik(symbol).ok().flatten())
    };
    let cik = match cached_cik {
        Some(cik) => cik,
        None => {
            let cik = provider.client().get_company_cik(symbol).await?;
            let guard = cache.lock().await;
            if let Some(ref cache) = *guard
                && let Err(e) = cache.put_cik(symbol, &cik, None)
            {
                eprintln!("Warning: failed to cache CIK for {}: {}", symbol, e);
            }
            cik
        }
    };

    // Fetch with retry on transient failures
    let mut attempt = 0;
    let all_sets = loop {
        match provider.fetch_statements_with_cik(symbol, &cik).await {
            Ok(sets) => break sets,
            Err(e) if e.is_transient() && attempt < config.max_retries => {
                attempt += 1;
                tokio::time::sleep(Duration::from_millis(500 * u64::from(attempt))).await;
            }
            Err(e) => return Err(e),
        }
    };

    let sets = select_periods(all_sets, config.period_type, wanted);
    if sets.len() < 2 {
        return Err(DataError::MissingData {
            symbol: symbol.to_string(),
            reason: format!("fewer than two {:?} periods available", config.period_type),
        });
    }

    let guard = cache.lock().await;
    if let Some(ref cache) = *guard
        && let Err(e) = cache.put_statement_sets(&sets)
    {
        eprintln!("Warning: failed to cache statements for {}: {}", symbol, e);
    }

    Ok(sets)
}

/// Keep the most recent `wanted` periods of the requested type.
fn select_periods(
    sets: Vec<StatementSet>,
    period_type: PeriodType,
    wanted: usize,
) -> Vec<StatementSet> {
    let mut sets: Vec<StatementSet> = sets
        .into_iter()
        .filter(|s| s.period_type == period_type)
        .collect();
    sets.sort_by(|a, b| b.period_end.cmp(&a.period_end));
    sets.truncate(wanted);
    sets
}

/// Scoring inputs from one stored statement set.
pub(crate) fn snapshot(set: &StatementSet) -> PeriodSnapshot {
    PeriodSnapshot {
        net_income: set.income.net_income,
        total_assets: set.balance.total_assets,
        operating_cash_flow: set.cash_flow.operating_cash_flow,
        long_term_debt: set.balance.long_term_debt,
        current_assets: set.balance.current_assets,
        current_liabilities: set.balance.current_liabilities,
        shares_outstanding: set.balance.shares_outstanding,
        revenue: set.income.revenue,
        cost_of_revenue: set.income.cost_of_revenue,
        gross_profit: set.income.gross_profit,
    }
}

/// Score one ticker from its stored periods (most recent first).
pub(crate) fn score_ticker(sets: &[StatementSet]) -> Result<FScore, ScoreError> {
    if sets.len() < 2 {
        return Err(ScoreError::InsufficientPeriods {
            symbol: sets.first().map(|s| s.symbol.clone()).unwrap_or_default(),
            available: sets.len(),
        });
    }

    let current = &sets[0];
    let prior = &sets[1];

    Ok(fscore_score::score(
        current.symbol.clone(),
        current.period_end,
        prior.period_end,
        &snapshot(current),
        &snapshot(prior),
    ))
}

/// Score every ticker stored for an index.
///
/// Tickers without two aligned periods are skipped and reported, not
/// treated as batch failures.
pub(crate) fn score_index(
    store: &CsvStore,
    index_key: &str,
) -> Result<(Vec<FScore>, Vec<(String, String)>), PipelineError> {
    let tickers = store.tickers(index_key)?;

    let mut results = Vec::new();
    let mut skipped = Vec::new();

    for ticker in tickers {
        match store
            .load_statement_sets(index_key, &ticker)
            .map_err(PipelineError::Data)
            .and_then(|sets| score_ticker(&sets).map_err(PipelineError::Score))
        {
            Ok(result) => results.push(result),
            Err(e) => skipped.push((ticker, e.to_string())),
        }
    }

    Ok((results, skipped))
}

/// Convert a score result into its export row.
pub(crate) fn export_row(result: &FScore) -> FScoreExport {
    FScoreExport {
        symbol: result.symbol.clone(),
        date: result.as_of,
        prior_date: result.prior_period,
        roa_positive: result.roa_positive.as_flag(),
        cash_flow_positive: result.cash_flow_positive.as_flag(),
        roa_improvement: result.roa_improvement.as_flag(),
        accruals_quality: result.accruals_quality.as_flag(),
        leverage_improvement: result.leverage_improvement.as_flag(),
        liquidity_improvement: result.liquidity_improvement.as_flag(),
        no_dilution: result.no_dilution.as_flag(),
        margin_improvement: result.margin_improvement.as_flag(),
        turnover_improvement: result.turnover_improvement.as_flag(),
        score: result.total(),
        available: result.available(),
        complete: result.is_complete(),
    }
}
