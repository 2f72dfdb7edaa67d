//! Report generation for screening runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A report from a screening run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Index that was screened.
    pub index: String,

    /// Report generation timestamp.
    pub timestamp: DateTime<Utc>,

    /// Fiscal periods fetched per ticker.
    pub periods: usize,

    /// Report contents (JSON format).
    pub contents: serde_json::Value,
}

impl Report {
    /// Create a new report.
    pub fn new(index: String, periods: usize, contents: serde_json::Value) -> Self {
        Self {
            index,
            timestamp: Utc::now(),
            periods,
            contents,
        }
    }

    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Builder for creating reports.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    index: Option<String>,
    periods: Option<usize>,
    contents: Option<serde_json::Value>,
}

impl ReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the index.
    pub fn index(mut self, index: String) -> Self {
        self.index = Some(index);
        self
    }

    /// Set the number of fetched periods.
    pub const fn periods(mut self, periods: usize) -> Self {
        self.periods = Some(periods);
        self
    }

    /// Set the report contents.
    pub fn contents(mut self, contents: serde_json::Value) -> Self {
        self.contents = Some(contents);
        self
    }

    /// Build the report.
    pub fn build(self) -> Result<Report, ReportError> {
        Ok(Report::new(
            self.index.unwrap_or_default(),
            self.periods.unwrap_or(2),
            self.contents.unwrap_or(serde_json::Value::Null),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_creation() {
        let report = Report::new(
            "sp500".to_string(),
            2,
            serde_json::json!({"fetched": 120}),
        );

        assert_eq!(report.index, "sp500");
        assert_eq!(report.periods, 2);
    }

    #[test]
    fn test_report_builder() {
        let report = ReportBuilder::new()
            .index("dow_jones".to_string())
            .periods(4)
            .contents(serde_json::json!({"skipped": []}))
            .build()
            .unwrap();

        assert_eq!(report.index, "dow_jones");
        assert_eq!(report.periods, 4);
    }

    #[test]
    fn test_report_to_json() {
        let report = Report::new("sp500".to_string(), 2, serde_json::json!({"fetched": 1}));
        let json = report.to_json().unwrap();
        assert!(json.contains("\"sp500\""));
        assert!(json.contains("\"fetched\": 1"));
    }
}
