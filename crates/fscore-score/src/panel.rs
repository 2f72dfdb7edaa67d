//! Scores-table assembly as polars DataFrames.
//!
//! Downstream notebooks and dashboards consume the scores as a table:
//! one row per (symbol, scoring date) with the nine criterion flags, the
//! total score, and the available-criteria count.

use crate::error::Result;
use crate::score::FScore;
use crate::signal::Signal;
use polars::prelude::*;

/// Build the scores table from computed results.
///
/// Flag columns are nullable integers: 1 = pass, 0 = fail, null =
/// unavailable, so partial scores stay distinguishable in the table.
pub fn results_frame(results: &[FScore]) -> Result<DataFrame> {
    let symbols: Vec<String> = results.iter().map(|r| r.symbol.clone()).collect();
    let dates: Vec<String> = results.iter().map(|r| r.as_of.to_string()).collect();
    let prior_dates: Vec<String> = results.iter().map(|r| r.prior_period.to_string()).collect();

    let flag = |signal: fn(&FScore) -> Signal| -> Vec<Option<i32>> {
        results
            .iter()
            .map(|r| signal(r).as_flag().map(i32::from))
            .collect()
    };

    let scores: Vec<i32> = results.iter().map(|r| i32::from(r.total())).collect();
    let available: Vec<i32> = results.iter().map(|r| i32::from(r.available())).collect();

    let df = DataFrame::new(vec![
        Series::new("symbol".into(), symbols).into(),
        Series::new("date".into(), dates).into(),
        Series::new("prior_date".into(), prior_dates).into(),
        Series::new("roa_positive".into(), flag(|r| r.roa_positive)).into(),
        Series::new("cash_flow_positive".into(), flag(|r| r.cash_flow_positive)).into(),
        Series::new("roa_improvement".into(), flag(|r| r.roa_improvement)).into(),
        Series::new("accruals_quality".into(), flag(|r| r.accruals_quality)).into(),
        Series::new("leverage_improvement".into(), flag(|r| r.leverage_improvement)).into(),
        Series::new("liquidity_improvement".into(), flag(|r| r.liquidity_improvement)).into(),
        Series::new("no_dilution".into(), flag(|r| r.no_dilution)).into(),
        Series::new("margin_improvement".into(), flag(|r| r.margin_improvement)).into(),
        Series::new("turnover_improvement".into(), flag(|r| r.turnover_improvement)).into(),
        Series::new("score".into(), scores).into(),
        Series::new("available".into(), available).into(),
    ])?;

    Ok(df)
}

/// Count tickers per score value, ascending.
pub fn score_distribution(scores: &DataFrame) -> Result<DataFrame> {
    let result = scores
        .clone()
        .lazy()
        .group_by([col("score")])
        .agg([col("symbol").count().alias("count")])
        .sort(["score"], Default::default())
        .collect()?;

    Ok(result)
}
