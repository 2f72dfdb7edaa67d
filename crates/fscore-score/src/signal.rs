//! Tri-state criterion outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a single F-Score criterion.
///
/// `Unavailable` is distinct from `Fail`: it means the criterion could not
/// be evaluated (missing line item, zero or negative denominator) and
/// contributes to neither the score nor the available-criteria count as a
/// zero. Missing inputs are never scored as failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    /// Criterion met: contributes one point.
    Pass,
    /// Criterion evaluated and not met.
    Fail,
    /// Criterion could not be evaluated.
    Unavailable,
}

impl Signal {
    /// Points contributed to the total score.
    pub const fn points(&self) -> u8 {
        match self {
            Self::Pass => 1,
            Self::Fail | Self::Unavailable => 0,
        }
    }

    /// Whether the criterion could be evaluated.
    pub const fn is_available(&self) -> bool {
        !matches!(self, Self::Unavailable)
    }

    /// The 0/1 flag for tabular output; `None` when unavailable.
    pub const fn as_flag(&self) -> Option<u8> {
        match self {
            Self::Pass => Some(1),
            Self::Fail => Some(0),
            Self::Unavailable => None,
        }
    }

    /// Build a signal from an evaluated comparison.
    pub const fn from_bool(met: bool) -> Self {
        if met { Self::Pass } else { Self::Fail }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "1"),
            Self::Fail => write!(f, "0"),
            Self::Unavailable => write!(f, "-"),
        }
    }
}
