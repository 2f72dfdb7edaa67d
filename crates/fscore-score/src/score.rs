//! F-Score computation over two consecutive fiscal periods.

use crate::criteria::Criterion;
use crate::signal::Signal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric inputs for one fiscal period.
///
/// Every item is optional: companies do not tag every concept in every
/// filing, and a missing item must surface as an unavailable criterion
/// rather than a fabricated zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodSnapshot {
    /// Net income
    pub net_income: Option<f64>,
    /// Total assets
    pub total_assets: Option<f64>,
    /// Operating cash flow
    pub operating_cash_flow: Option<f64>,
    /// Long-term debt
    pub long_term_debt: Option<f64>,
    /// Current assets
    pub current_assets: Option<f64>,
    /// Current liabilities
    pub current_liabilities: Option<f64>,
    /// Shares outstanding
    pub shares_outstanding: Option<f64>,
    /// Total revenue
    pub revenue: Option<f64>,
    /// Cost of revenue
    pub cost_of_revenue: Option<f64>,
    /// Gross profit (used when cost of revenue is not reported)
    pub gross_profit: Option<f64>,
}

/// A denominator that should never be negative was.
///
/// The affected criteria report [`Signal::Unavailable`]; the warning lets
/// callers surface the suspect input instead of silently comparing it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataQualityWarning {
    /// Offending input field (`_prior` suffix for the prior period).
    pub field: &'static str,
    /// The negative value observed.
    pub value: f64,
}

impl fmt::Display for DataQualityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "negative denominator {} = {}", self.field, self.value)
    }
}

/// F-Score result for one ticker at one scoring date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FScore {
    /// Stock symbol.
    pub symbol: String,
    /// Scoring date (current period end).
    pub as_of: NaiveDate,
    /// Prior period end used for the delta criteria.
    pub prior_period: NaiveDate,
    /// Return on assets positive.
    pub roa_positive: Signal,
    /// Operating cash flow positive.
    pub cash_flow_positive: Signal,
    /// Return on assets improved.
    pub roa_improvement: Signal,
    /// Cash flow return exceeds accrual return.
    pub accruals_quality: Signal,
    /// Long-term debt to assets decreased.
    pub leverage_improvement: Signal,
    /// Current ratio increased.
    pub liquidity_improvement: Signal,
    /// Shares outstanding did not increase.
    pub no_dilution: Signal,
    /// Gross margin increased.
    pub margin_improvement: Signal,
    /// Asset turnover increased.
    pub turnover_improvement: Signal,
    /// Data-quality warnings raised while scoring.
    pub warnings: Vec<DataQualityWarning>,
}

impl FScore {
    /// The signal for one criterion.
    pub const fn signal(&self, criterion: Criterion) -> Signal {
        match criterion {
            Criterion::RoaPositive => self.roa_positive,
            Criterion::CashFlowPositive => self.cash_flow_positive,
            Criterion::RoaImprovement => self.roa_improvement,
            Criterion::AccrualsQuality => self.accruals_quality,
            Criterion::LeverageImprovement => self.leverage_improvement,
            Criterion::LiquidityImprovement => self.liquidity_improvement,
            Criterion::NoDilution => self.no_dilution,
            Criterion::MarginImprovement => self.margin_improvement,
            Criterion::TurnoverImprovement => self.turnover_improvement,
        }
    }

    /// All nine signals in scoring order.
    pub fn signals(&self) -> [(Criterion, Signal); 9] {
        Criterion::all().map(|c| (c, self.signal(c)))
    }

    /// Total score: the number of passing criteria among available ones.
    ///
    /// Unavailable criteria contribute nothing; use [`available`] and
    /// [`is_complete`] to distinguish a partial score from a full one.
    ///
    /// [`available`]: Self::available
    /// [`is_complete`]: Self::is_complete
    pub fn total(&self) -> u8 {
        self.signals().iter().map(|(_, s)| s.points()).sum()
    }

    /// How many of the nine criteria could be evaluated.
    pub fn available(&self) -> u8 {
        self.signals()
            .iter()
            .filter(|(_, s)| s.is_available())
            .count() as u8
    }

    /// Whether all nine criteria were evaluated.
    pub fn is_complete(&self) -> bool {
        self.available() == 9
    }
}

/// Scoring context collecting data-quality warnings.
#[derive(Default)]
struct Ctx {
    warnings: Vec<DataQualityWarning>,
}

impl Ctx {
    /// Divide with degenerate-denominator handling.
    ///
    /// Missing or non-finite operands and a zero denominator yield `None`;
    /// a negative denominator additionally records a warning (once per
    /// field).
    fn ratio(
        &mut self,
        field: &'static str,
        numerator: Option<f64>,
        denominator: Option<f64>,
    ) -> Option<f64> {
        let numerator = finite(numerator)?;
        let denominator = finite(denominator)?;
        if denominator == 0.0 {
            return None;
        }
        if denominator < 0.0 {
            if !self.warnings.iter().any(|w| w.field == field) {
                self.warnings.push(DataQualityWarning {
                    field,
                    value: denominator,
                });
            }
            return None;
        }
        Some(numerator / denominator)
    }

    /// Gross margin (revenue - cost of revenue) / revenue, falling back to
    /// gross profit / revenue when cost of revenue is not reported.
    fn gross_margin(&mut self, snapshot: &PeriodSnapshot, field: &'static str) -> Option<f64> {
        let gross_profit = match finite(snapshot.cost_of_revenue) {
            Some(cogs) => Some(finite(snapshot.revenue)? - cogs),
            None => finite(snapshot.gross_profit),
        };
        self.ratio(field, gross_profit, snapshot.revenue)
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Compare two optional values; unavailable operands propagate.
fn compare(a: Option<f64>, b: Option<f64>, cmp: impl FnOnce(f64, f64) -> bool) -> Signal {
    match (a, b) {
        (Some(a), Some(b)) => Signal::from_bool(cmp(a, b)),
        _ => Signal::Unavailable,
    }
}

/// Compute the F-Score from two consecutive periods of statement inputs.
///
/// Each criterion is evaluated independently: a missing input only makes
/// the criteria that depend on it unavailable, never the whole score.
/// All comparisons are strict, so an unchanged metric fails its delta
/// criterion while unchanged shares outstanding still pass `no_dilution`.
pub fn score(
    symbol: impl Into<String>,
    as_of: NaiveDate,
    prior_period: NaiveDate,
    current: &PeriodSnapshot,
    prior: &PeriodSnapshot,
) -> FScore {
    let mut ctx = Ctx::default();

    let roa = ctx.ratio("total_assets", current.net_income, current.total_assets);
    let roa_prior = ctx.ratio("total_assets_prior", prior.net_income, prior.total_assets);

    // 1. ROA positive
    let roa_positive = compare(roa, Some(0.0), |a, b| a > b);

    // 2. Operating cash flow positive
    let cash_flow_positive = compare(finite(current.operating_cash_flow), Some(0.0), |a, b| a > b);

    // 3. ROA improvement
    let roa_improvement = compare(roa, roa_prior, |a, b| a > b);

    // 4. Accruals: cash flow return above accrual return
    let cash_return = ctx.ratio(
        "total_assets",
        current.operating_cash_flow,
        current.total_assets,
    );
    let accruals_quality = compare(cash_return, roa, |a, b| a > b);

    // 5. Leverage improvement
    let leverage = ctx.ratio("total_assets", current.long_term_debt, current.total_assets);
    let leverage_prior = ctx.ratio("total_assets_prior", prior.long_term_debt, prior.total_assets);
    let leverage_improvement = compare(leverage, leverage_prior, |a, b| a < b);

    // 6. Current ratio improvement
    let current_ratio = ctx.ratio(
        "current_liabilities",
        current.current_assets,
        current.current_liabilities,
    );
    let current_ratio_prior = ctx.ratio(
        "current_liabilities_prior",
        prior.current_assets,
        prior.current_liabilities,
    );
    let liquidity_improvement = compare(current_ratio, current_ratio_prior, |a, b| a > b);

    // 7. No dilution
    let no_dilution = compare(
        finite(current.shares_outstanding),
        finite(prior.shares_outstanding),
        |a, b| a <= b,
    );

    // 8. Gross margin improvement
    let margin = ctx.gross_margin(current, "revenue");
    let margin_prior = ctx.gross_margin(prior, "revenue_prior");
    let margin_improvement = compare(margin, margin_prior, |a, b| a > b);

    // 9. Asset turnover improvement
    let turnover = ctx.ratio("total_assets", current.revenue, current.total_assets);
    let turnover_prior = ctx.ratio("total_assets_prior", prior.revenue, prior.total_assets);
    let turnover_improvement = compare(turnover, turnover_prior, |a, b| a > b);

    FScore {
        symbol: symbol.into(),
        as_of,
        prior_period,
        roa_positive,
        cash_flow_positive,
        roa_improvement,
        accruals_quality,
        leverage_improvement,
        liquidity_improvement,
        no_dilution,
        margin_improvement,
        turnover_improvement,
        warnings: ctx.warnings,
    }
}
