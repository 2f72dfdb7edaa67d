#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fscore/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod criteria;
pub mod error;
pub mod panel;
pub mod score;
pub mod signal;

pub use criteria::{Category, Criterion};
pub use error::{Result, ScoreError};
pub use score::{DataQualityWarning, FScore, PeriodSnapshot, score};
pub use signal::Signal;
