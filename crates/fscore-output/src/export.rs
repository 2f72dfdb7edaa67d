//! Export functionality for F-Score results.
//!
//! This module provides CSV and JSON export for the scores table produced
//! by a screening run.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }

    /// Parse a format from a CLI argument.
    pub fn from_arg(arg: &str) -> Result<Self, ExportError> {
        match arg.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// One scores-table row: a ticker's F-Score at a scoring date.
///
/// Criterion flags are `Some(1)` for pass, `Some(0)` for fail, and `None`
/// when the criterion could not be evaluated, so CSV cells stay empty for
/// unavailable criteria rather than reading as failures.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FScoreExport {
    /// Security symbol.
    pub symbol: String,

    /// Scoring date (current period end).
    pub date: NaiveDate,

    /// Prior period end used for delta criteria.
    pub prior_date: NaiveDate,

    /// Return on assets positive.
    pub roa_positive: Option<u8>,

    /// Operating cash flow positive.
    pub cash_flow_positive: Option<u8>,

    /// Return on assets improved.
    pub roa_improvement: Option<u8>,

    /// Cash flow return exceeds accrual return.
    pub accruals_quality: Option<u8>,

    /// Long-term debt to assets decreased.
    pub leverage_improvement: Option<u8>,

    /// Current ratio increased.
    pub liquidity_improvement: Option<u8>,

    /// Shares outstanding did not increase.
    pub no_dilution: Option<u8>,

    /// Gross margin increased.
    pub margin_improvement: Option<u8>,

    /// Asset turnover increased.
    pub turnover_improvement: Option<u8>,

    /// Total score over available criteria.
    pub score: u8,

    /// Number of criteria that could be evaluated.
    pub available: u8,

    /// Whether all nine criteria were evaluated.
    pub complete: bool,
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

impl Exporter for FScoreExport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                wtr.serialize(self)?;
                let data =
                    String::from_utf8(wtr.into_inner().map_err(|e| e.into_error())?).unwrap();
                Ok(data)
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

impl Exporter for Vec<FScoreExport> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                for record in self {
                    wtr.serialize(record)?;
                }
                let data =
                    String::from_utf8(wtr.into_inner().map_err(|e| e.into_error())?).unwrap();
                Ok(data)
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row(symbol: &str, score: u8) -> FScoreExport {
        FScoreExport {
            symbol: symbol.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            prior_date: NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
            roa_positive: Some(1),
            cash_flow_positive: Some(1),
            roa_improvement: Some(u8::from(score >= 3)),
            accruals_quality: Some(1),
            leverage_improvement: Some(u8::from(score >= 5)),
            liquidity_improvement: Some(u8::from(score >= 6)),
            no_dilution: Some(1),
            margin_improvement: Some(u8::from(score >= 8)),
            turnover_improvement: Some(u8::from(score >= 9)),
            score,
            available: 9,
            complete: true,
        }
    }

    #[test]
    fn test_export_csv() {
        let row = sample_row("AAPL", 7);

        let csv = row.export_to_string(ExportFormat::Csv).unwrap();
        assert!(csv.contains("symbol"));
        assert!(csv.contains("no_dilution"));
        assert!(csv.contains("AAPL"));
        assert!(csv.contains("2024-12-31"));
    }

    #[test]
    fn test_export_csv_empty_cell_for_unavailable() {
        let mut row = sample_row("AAPL", 6);
        row.no_dilution = None;
        row.available = 8;
        row.complete = false;

        let csv = row.export_to_string(ExportFormat::Csv).unwrap();
        let data_line = csv.lines().nth(1).unwrap();
        // liquidity_improvement,no_dilution,margin_improvement
        assert!(data_line.contains(",,"));
        assert!(data_line.contains("false"));
    }

    #[test]
    fn test_export_json() {
        let row = sample_row("AAPL", 7);

        let json = row.export_to_string(ExportFormat::Json).unwrap();
        assert!(json.contains("\"AAPL\""));
        assert!(json.contains("\"score\":7"));
        assert!(json.contains("\"complete\":true"));
    }

    #[test]
    fn test_export_pretty_json() {
        let row = sample_row("AAPL", 7);

        let json = row.export_to_string(ExportFormat::PrettyJson).unwrap();
        assert!(json.contains("\"AAPL\""));
        assert!(json.contains("  ")); // Indentation indicates pretty format
    }

    #[test]
    fn test_multiple_rows_csv() {
        let rows = vec![sample_row("AAPL", 8), sample_row("F", 3)];

        let csv = rows.export_to_string(ExportFormat::Csv).unwrap();
        assert!(csv.contains("AAPL"));
        assert!(csv.contains("F"));
        // Single header line plus one line per row
        assert_eq!(csv.lines().count(), 3);
    }

    #[test]
    fn test_export_to_file() {
        use std::io::Read;

        let rows = vec![sample_row("AAPL", 8)];

        let temp_dir = std::env::temp_dir();
        let csv_path = temp_dir.join("fscore_test_export.csv");
        let json_path = temp_dir.join("fscore_test_export.json");

        rows.export_to_file(&csv_path, ExportFormat::Csv).unwrap();
        let mut csv_content = String::new();
        File::open(&csv_path)
            .unwrap()
            .read_to_string(&mut csv_content)
            .unwrap();
        assert!(csv_content.contains("AAPL"));

        rows.export_to_file(&json_path, ExportFormat::Json).unwrap();
        let mut json_content = String::new();
        File::open(&json_path)
            .unwrap()
            .read_to_string(&mut json_content)
            .unwrap();
        assert!(json_content.contains("\"AAPL\""));

        // Clean up
        std::fs::remove_file(csv_path).ok();
        std::fs::remove_file(json_path).ok();
    }

    #[test]
    fn test_export_format_extension() {
        assert_eq!(ExportFormat::Csv.extension(), "csv");
        assert_eq!(ExportFormat::Json.extension(), "json");
        assert_eq!(ExportFormat::PrettyJson.extension(), "json");
    }

    #[test]
    fn test_export_format_from_arg() {
        assert_eq!(ExportFormat::from_arg("csv").unwrap(), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_arg("JSON").unwrap(), ExportFormat::Json);
        assert!(ExportFormat::from_arg("parquet").is_err());
    }
}
