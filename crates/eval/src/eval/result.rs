use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use mads_core::Tolerance;

use super::{EvalError, HNorm};
use crate::output::{BbOutput, BbOutputType};

/// A completed evaluation: the raw outputs plus the derived f and h.
///
/// f is the output tagged [`Objective`](BbOutputType::Objective); h is the
/// aggregated magnitude of progressive-barrier constraint violations, zero
/// when the point is feasible. Both are derived deterministically from the
/// raw outputs and the declared output type list, so an `Eval` in hand is
/// always internally consistent.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Eval {
    bbo: BbOutput,
    f: f64,
    h: f64,
}

/// The outcome of deriving an [`Eval`] from raw outputs.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Derived {
    /// The point produced usable f and h values.
    Ok(Eval),

    /// An extreme-barrier constraint is violated. The outputs are retained
    /// for diagnostics, with h pushed to infinity; the point must be
    /// excluded from the incumbent set.
    ExtremeViolation(Eval),
}

impl Eval {
    /// Derives f and h from raw outputs against the declared output types.
    ///
    /// Satisfied extreme-barrier constraints contribute nothing to h; a
    /// violated one short-circuits into [`Derived::ExtremeViolation`].
    /// The extreme-barrier test is exact, not tolerance-based: any strictly
    /// positive output rejects the point, while progressive violations are
    /// judged later when the aggregated h is tested against zero under a
    /// [`Tolerance`](mads_core::Tolerance). `Extra` outputs are carried
    /// along but ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the output count does not match the type list,
    /// no objective is declared, or an objective or constraint output is
    /// undefined.
    pub fn from_output(
        bbo: BbOutput,
        types: &[BbOutputType],
        norm: HNorm,
    ) -> Result<Derived, EvalError> {
        if bbo.len() != types.len() {
            return Err(EvalError::OutputCountMismatch {
                expected: types.len(),
                actual: bbo.len(),
            });
        }

        let obj_index = types
            .iter()
            .position(|t| *t == BbOutputType::Objective)
            .ok_or(EvalError::MissingObjective)?;
        let f = bbo
            .get(obj_index)
            .ok_or(EvalError::UndefinedOutput {
                index: obj_index,
                kind: BbOutputType::Objective,
            })?;

        let mut violations = Vec::new();
        for (index, kind) in types.iter().copied().enumerate() {
            if !kind.is_constraint() {
                continue;
            }
            let value = bbo
                .get(index)
                .ok_or(EvalError::UndefinedOutput { index, kind })?;
            if kind == BbOutputType::ConstraintEb && value > 0.0 {
                return Ok(Derived::ExtremeViolation(Self {
                    bbo,
                    f,
                    h: f64::INFINITY,
                }));
            }
            violations.push(value.max(0.0));
        }

        let h = norm.aggregate(violations.into_iter());
        Ok(Derived::Ok(Self { bbo, f, h }))
    }

    /// Returns the objective value.
    #[must_use]
    pub fn f(&self) -> f64 {
        self.f
    }

    /// Returns the infeasibility measure.
    #[must_use]
    pub fn h(&self) -> f64 {
        self.h
    }

    /// Returns the raw blackbox outputs.
    #[must_use]
    pub fn bbo(&self) -> &BbOutput {
        &self.bbo
    }

    /// Returns true if h is zero within `tol`.
    #[must_use]
    pub fn is_feasible(&self, tol: &Tolerance) -> bool {
        tol.is_zero(self.h)
    }
}

impl fmt::Display for Eval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f = {} h = {}", self.f, self.h)
    }
}
