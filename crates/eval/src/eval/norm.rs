#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The norm used to aggregate constraint violations into h.
///
/// Algorithm variants depend on this policy, so it is configuration rather
/// than a constant. The default is the Euclidean aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HNorm {
    /// Sum of violations.
    L1,

    /// Square root of the sum of squared violations.
    #[default]
    L2,

    /// Largest single violation.
    Linf,
}

impl HNorm {
    /// Aggregates non-negative violation magnitudes into a single h value.
    pub fn aggregate(self, violations: impl Iterator<Item = f64>) -> f64 {
        match self {
            Self::L1 => violations.sum(),
            Self::L2 => violations.map(|v| v * v).sum::<f64>().sqrt(),
            Self::Linf => violations.fold(0.0, f64::max),
        }
    }
}
