use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The externally reported state of one evaluation attempt.
///
/// This is the fieldless mirror of [`EvalSlot`](super::EvalSlot), used in
/// error messages, displays, and anywhere the result payload itself is not
/// needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EvalStatus {
    /// No evaluation attempt has started.
    NotEvaluated,

    /// Dispatched to the harness; the result is not available yet.
    InProgress,

    /// The evaluation completed and produced usable f and h values.
    Ok,

    /// The evaluation could not produce a result.
    Failed,

    /// The user's evaluation callback rejected the point.
    UserRejected,

    /// The evaluation completed but an extreme-barrier constraint is
    /// violated; the point is excluded from the incumbent set.
    ConstraintViolatedExtreme,
}

impl EvalStatus {
    /// Returns true for states that no evaluation attempt can leave.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::NotEvaluated | Self::InProgress)
    }
}

impl fmt::Display for EvalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotEvaluated => "NOT_EVALUATED",
            Self::InProgress => "IN_PROGRESS",
            Self::Ok => "EVAL_OK",
            Self::Failed => "EVAL_FAILED",
            Self::UserRejected => "EVAL_USER_REJECTED",
            Self::ConstraintViolatedExtreme => "EVAL_CONSTRAINT_VIOLATED_EXTREME",
        };
        f.write_str(s)
    }
}
