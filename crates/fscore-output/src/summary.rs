//! Screening run summary.

use crate::export::FScoreExport;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scores at or above this are considered strong fundamentals.
pub const STRONG_THRESHOLD: u8 = 7;

/// Scores at or below this are considered weak fundamentals.
pub const WEAK_THRESHOLD: u8 = 2;

/// Aggregate view of one screening run.
///
/// Distribution, mean, and the strong/weak cohorts are computed over
/// complete rows only; partial rows are counted separately so an
/// incomplete 6 is never ranked against a complete 6.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreSummary {
    /// Number of tickers scored.
    pub scored: usize,

    /// Rows with all nine criteria evaluated.
    pub complete: usize,

    /// Rows with at least one unavailable criterion.
    pub partial: usize,

    /// Mean score over complete rows.
    pub mean_score: Option<f64>,

    /// Complete rows per score value (index = score, 0 through 9).
    pub distribution: [usize; 10],

    /// Symbols with strong fundamentals (complete, score >= 7).
    pub strong: Vec<String>,

    /// Symbols with weak fundamentals (complete, score <= 2).
    pub weak: Vec<String>,
}

impl ScoreSummary {
    /// Summarize a run from its export rows.
    pub fn from_rows(rows: &[FScoreExport]) -> Self {
        let mut distribution = [0usize; 10];
        let mut strong = Vec::new();
        let mut weak = Vec::new();
        let mut complete = 0usize;
        let mut score_sum = 0u64;

        for row in rows {
            if !row.complete {
                continue;
            }
            complete += 1;
            score_sum += u64::from(row.score);
            distribution[usize::from(row.score.min(9))] += 1;

            if row.score >= STRONG_THRESHOLD {
                strong.push(row.symbol.clone());
            } else if row.score <= WEAK_THRESHOLD {
                weak.push(row.symbol.clone());
            }
        }

        strong.sort_unstable();
        weak.sort_unstable();

        Self {
            scored: rows.len(),
            complete,
            partial: rows.len() - complete,
            mean_score: (complete > 0).then(|| score_sum as f64 / complete as f64),
            distribution,
            strong,
            weak,
        }
    }
}

impl fmt::Display for ScoreSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tickers scored:   {}", self.scored)?;
        writeln!(f, "  complete:       {}", self.complete)?;
        writeln!(f, "  partial:        {}", self.partial)?;

        if let Some(mean) = self.mean_score {
            writeln!(f, "Mean score:       {:.2}", mean)?;
        }

        writeln!(f, "\nScore distribution (complete rows):")?;
        for (score, count) in self.distribution.iter().enumerate() {
            if *count > 0 {
                writeln!(f, "  {}: {:3}  {}", score, count, "#".repeat(*count))?;
            }
        }

        if !self.strong.is_empty() {
            writeln!(
                f,
                "\nStrong (>= {}):    {}",
                STRONG_THRESHOLD,
                self.strong.join(", ")
            )?;
        }
        if !self.weak.is_empty() {
            writeln!(
                f,
                "Weak (<= {}):      {}",
                WEAK_THRESHOLD,
                self.weak.join(", ")
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(symbol: &str, score: u8, complete: bool) -> FScoreExport {
        FScoreExport {
            symbol: symbol.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            prior_date: NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
            roa_positive: Some(1),
            cash_flow_positive: Some(1),
            roa_improvement: Some(0),
            accruals_quality: Some(1),
            leverage_improvement: Some(0),
            liquidity_improvement: Some(0),
            no_dilution: if complete { Some(1) } else { None },
            margin_improvement: Some(0),
            turnover_improvement: Some(0),
            score,
            available: if complete { 9 } else { 8 },
            complete,
        }
    }

    #[test]
    fn test_summary_counts() {
        let rows = vec![
            row("AAA", 8, true),
            row("BBB", 2, true),
            row("CCC", 5, true),
            row("DDD", 6, false),
        ];

        let summary = ScoreSummary::from_rows(&rows);

        assert_eq!(summary.scored, 4);
        assert_eq!(summary.complete, 3);
        assert_eq!(summary.partial, 1);
        assert_eq!(summary.strong, vec!["AAA".to_string()]);
        assert_eq!(summary.weak, vec!["BBB".to_string()]);
        assert_eq!(summary.distribution[8], 1);
        assert_eq!(summary.distribution[2], 1);
        assert_eq!(summary.distribution[5], 1);
        // Partial row excluded from the distribution
        assert_eq!(summary.distribution[6], 0);
    }

    #[test]
    fn test_mean_over_complete_rows_only() {
        let rows = vec![row("AAA", 9, true), row("BBB", 3, true), row("CCC", 9, false)];

        let summary = ScoreSummary::from_rows(&rows);
        assert_eq!(summary.mean_score, Some(6.0));
    }

    #[test]
    fn test_empty_run() {
        let summary = ScoreSummary::from_rows(&[]);
        assert_eq!(summary.scored, 0);
        assert_eq!(summary.mean_score, None);
        assert!(summary.strong.is_empty());
    }

    #[test]
    fn test_display_renders_distribution() {
        let rows = vec![row("AAA", 8, true), row("BBB", 8, true)];
        let summary = ScoreSummary::from_rows(&rows);

        let text = summary.to_string();
        assert!(text.contains("Tickers scored:   2"));
        assert!(text.contains("8:   2  ##"));
        assert!(text.contains("Strong"));
    }
}
