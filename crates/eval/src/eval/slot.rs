use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{Derived, Eval, EvalError, EvalStatus};
use crate::output::BbOutput;

/// Why an evaluation attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FailReason {
    /// The blackbox crashed or produced no usable result.
    Blackbox,

    /// The harness cancelled the attempt before it finished.
    Cancelled,
}

impl fmt::Display for FailReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blackbox => f.write_str("blackbox failure"),
            Self::Cancelled => f.write_str("cancelled by the harness"),
        }
    }
}

/// One evaluation attempt, as a tagged state machine.
///
/// The slot acts as a write-once gate: the harness moves it from
/// [`NotEvaluated`](Self::NotEvaluated) through
/// [`InProgress`](Self::InProgress) into exactly one terminal state, and any
/// other transition is rejected. A cancelled attempt must end in
/// [`Failed`](Self::Failed) with [`FailReason::Cancelled`], never linger in
/// `InProgress`.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EvalSlot {
    /// No attempt has started.
    #[default]
    NotEvaluated,

    /// Dispatched to the harness.
    InProgress,

    /// Completed with usable f and h values.
    Done(Eval),

    /// Completed, but an extreme-barrier constraint is violated.
    ExtremeViolation(Eval),

    /// The attempt produced no result.
    Failed(FailReason),

    /// The user's callback rejected the point.
    UserRejected,
}

impl EvalSlot {
    /// Returns the fieldless status of this slot.
    #[must_use]
    pub fn status(&self) -> EvalStatus {
        match self {
            Self::NotEvaluated => EvalStatus::NotEvaluated,
            Self::InProgress => EvalStatus::InProgress,
            Self::Done(_) => EvalStatus::Ok,
            Self::ExtremeViolation(_) => EvalStatus::ConstraintViolatedExtreme,
            Self::Failed(_) => EvalStatus::Failed,
            Self::UserRejected => EvalStatus::UserRejected,
        }
    }

    /// Marks the slot as dispatched to the harness.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the slot is `NotEvaluated`.
    pub fn start(&mut self) -> Result<(), EvalError> {
        self.transition(EvalStatus::InProgress, Self::InProgress)
    }

    /// Stores a derived result, finishing the attempt.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the slot is `InProgress`.
    pub fn complete(&mut self, derived: Derived) -> Result<(), EvalError> {
        let next = match derived {
            Derived::Ok(eval) => Self::Done(eval),
            Derived::ExtremeViolation(eval) => Self::ExtremeViolation(eval),
        };
        self.transition(next.status(), next)
    }

    /// Marks the attempt as failed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the slot is `InProgress`.
    pub fn fail(&mut self, reason: FailReason) -> Result<(), EvalError> {
        self.transition(EvalStatus::Failed, Self::Failed(reason))
    }

    /// Marks the attempt as rejected by the user's callback.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the slot is `InProgress`.
    pub fn reject(&mut self) -> Result<(), EvalError> {
        self.transition(EvalStatus::UserRejected, Self::UserRejected)
    }

    fn transition(&mut self, to: EvalStatus, next: Self) -> Result<(), EvalError> {
        let expected_from = match to {
            EvalStatus::InProgress => EvalStatus::NotEvaluated,
            _ => EvalStatus::InProgress,
        };
        if self.status() != expected_from {
            return Err(EvalError::InvalidTransition {
                from: self.status(),
                to,
            });
        }
        *self = next;
        Ok(())
    }

    /// Resets the slot to `NotEvaluated`, discarding any stored result.
    ///
    /// Used to retire a stale surrogate result and to open a fresh attempt;
    /// the old result is dropped, never resurrected.
    pub fn clear(&mut self) {
        *self = Self::NotEvaluated;
    }

    /// Returns the usable result, if the attempt completed successfully.
    #[must_use]
    pub fn eval(&self) -> Option<&Eval> {
        match self {
            Self::Done(eval) => Some(eval),
            _ => None,
        }
    }

    /// Returns the raw outputs from any completed attempt, including an
    /// extreme-barrier violation kept for diagnostics.
    #[must_use]
    pub fn bbo(&self) -> Option<&BbOutput> {
        match self {
            Self::Done(eval) | Self::ExtremeViolation(eval) => Some(eval.bbo()),
            _ => None,
        }
    }

    /// Returns f if the attempt completed successfully.
    #[must_use]
    pub fn f(&self) -> Option<f64> {
        self.eval().map(Eval::f)
    }

    /// Returns h if the attempt completed successfully.
    #[must_use]
    pub fn h(&self) -> Option<f64> {
        self.eval().map(Eval::h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::eval::HNorm;
    use crate::output::BbOutputType::{ConstraintPb, Objective};

    fn derived(f: f64, c: f64) -> Derived {
        Eval::from_output(
            BbOutput::from_values([f, c]),
            &[Objective, ConstraintPb],
            HNorm::L2,
        )
        .expect("valid outputs")
    }

    #[test]
    fn nominal_lifecycle_reaches_done() {
        let mut slot = EvalSlot::default();
        assert_eq!(slot.status(), EvalStatus::NotEvaluated);

        slot.start().expect("dispatch");
        assert_eq!(slot.status(), EvalStatus::InProgress);

        slot.complete(derived(3.0, -1.0)).expect("completion");
        assert_eq!(slot.status(), EvalStatus::Ok);
        assert_relative_eq!(slot.f().unwrap(), 3.0);
        assert_relative_eq!(slot.h().unwrap(), 0.0);
        assert!(slot.bbo().is_some());
    }

    #[test]
    fn completion_requires_dispatch() {
        let mut slot = EvalSlot::default();
        assert_eq!(
            slot.complete(derived(1.0, 0.0)),
            Err(EvalError::InvalidTransition {
                from: EvalStatus::NotEvaluated,
                to: EvalStatus::Ok
            })
        );
    }

    #[test]
    fn terminal_slots_reject_further_transitions() {
        let mut slot = EvalSlot::default();
        slot.start().unwrap();
        slot.fail(FailReason::Cancelled).unwrap();

        assert_eq!(
            slot.start(),
            Err(EvalError::InvalidTransition {
                from: EvalStatus::Failed,
                to: EvalStatus::InProgress
            })
        );
        assert_eq!(
            slot.complete(derived(1.0, 0.0)),
            Err(EvalError::InvalidTransition {
                from: EvalStatus::Failed,
                to: EvalStatus::Ok
            })
        );
    }

    #[test]
    fn double_dispatch_is_rejected() {
        let mut slot = EvalSlot::default();
        slot.start().unwrap();
        assert_eq!(
            slot.start(),
            Err(EvalError::InvalidTransition {
                from: EvalStatus::InProgress,
                to: EvalStatus::InProgress
            })
        );
    }

    #[test]
    fn failed_and_rejected_expose_no_values() {
        let mut failed = EvalSlot::default();
        failed.start().unwrap();
        failed.fail(FailReason::Blackbox).unwrap();
        assert_eq!(failed.f(), None);
        assert_eq!(failed.h(), None);
        assert_eq!(failed.bbo(), None);

        let mut rejected = EvalSlot::default();
        rejected.start().unwrap();
        rejected.reject().unwrap();
        assert_eq!(rejected.status(), EvalStatus::UserRejected);
        assert_eq!(rejected.eval(), None);
    }

    #[test]
    fn extreme_violation_keeps_outputs_but_no_usable_values() {
        let mut slot = EvalSlot::default();
        slot.start().unwrap();

        let derived = Eval::from_output(
            BbOutput::from_values([1.0, 2.0]),
            &[Objective, crate::output::BbOutputType::ConstraintEb],
            HNorm::L2,
        )
        .unwrap();
        slot.complete(derived).unwrap();

        assert_eq!(slot.status(), EvalStatus::ConstraintViolatedExtreme);
        assert_eq!(slot.f(), None);
        assert_eq!(slot.h(), None);
        assert!(slot.bbo().is_some(), "outputs kept for diagnostics");
    }

    #[test]
    fn clear_opens_a_fresh_attempt() {
        let mut slot = EvalSlot::default();
        slot.start().unwrap();
        slot.complete(derived(1.0, 0.0)).unwrap();

        slot.clear();
        assert_eq!(slot.status(), EvalStatus::NotEvaluated);
        slot.start().expect("fresh attempt after clear");
    }
}
