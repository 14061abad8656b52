//! Blackbox evaluation results and the state machine that gates them.
//!
//! A result slot starts empty, is dispatched to the harness, and ends in
//! exactly one terminal state:
//!
//! ```text
//! NotEvaluated ──start──▶ InProgress ──complete──▶ Done | ExtremeViolation
//!                                    ──fail─────▶ Failed
//!                                    ──reject───▶ UserRejected
//! ```
//!
//! Terminal states never transition again; a re-evaluation is a fresh
//! attempt on a cleared slot, decided explicitly by the calling algorithm.
//! Because the derived values live inside [`Done`](EvalSlot::Done), reading
//! f or h from a slot that has not completed successfully is
//! unrepresentable rather than a runtime surprise.

mod norm;
mod result;
mod slot;
mod status;

pub use norm::HNorm;
pub use result::{Derived, Eval};
pub use slot::{EvalSlot, FailReason};
pub use status::EvalStatus;

use std::fmt;

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::output::BbOutputType;

/// Selects the true blackbox result or the surrogate-model result.
///
/// The true slot is authoritative for feasibility and for f/h; the surrogate
/// slot is informational and never silently substitutes for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EvalKind {
    /// The true blackbox evaluation.
    Blackbox,

    /// The surrogate-model evaluation.
    Surrogate,
}

impl fmt::Display for EvalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blackbox => f.write_str("BB"),
            Self::Surrogate => f.write_str("SGTE"),
        }
    }
}

/// Errors that can occur when deriving a result or driving a result slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("blackbox returned {actual} outputs but {expected} output types are declared")]
    OutputCountMismatch { expected: usize, actual: usize },

    #[error("no objective output is declared in the output type list")]
    MissingObjective,

    #[error("output {index} ({kind}) is undefined")]
    UndefinedOutput { index: usize, kind: BbOutputType },

    #[error("invalid evaluation transition from {from} to {to}")]
    InvalidTransition { from: EvalStatus, to: EvalStatus },
}
