use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The search mechanism that generated a point.
///
/// Recorded for diagnostics and for direction-based search heuristics; it
/// plays no role in dominance or ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GenStep {
    /// The starting point of the run.
    Initial,

    /// Generated by polling the mesh around an incumbent.
    Poll,

    /// Generated by a search step (speculative, Latin hypercube, ...).
    Search,

    /// Proposed by a surrogate or quadratic model.
    Model,

    /// Injected by the user.
    User,
}

impl fmt::Display for GenStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Initial => "INITIAL",
            Self::Poll => "POLL",
            Self::Search => "SEARCH",
            Self::Model => "MODEL",
            Self::User => "USER",
        };
        f.write_str(s)
    }
}
