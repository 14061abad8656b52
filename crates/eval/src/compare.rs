//! Dominance and ordering over evaluated points.
//!
//! Everything here is a pure, synchronous function of two fully evaluated
//! points. [`dominates`] is the strict partial order the incumbent logic
//! uses; [`total_cmp`] is the strict total order that breaks ties
//! deterministically for sorting and deduplication. Comparing a point whose
//! evaluation has not finished is a programming error and fails loudly.

use std::cmp::Ordering;

use thiserror::Error;

use mads_core::Tolerance;

use crate::{
    eval::{EvalKind, EvalStatus},
    point::EvalPoint,
};

/// Error raised when a comparison involves an unevaluated point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CompareError {
    #[error("cannot compare a point whose evaluation status is {status}")]
    NotEvaluated { status: EvalStatus },
}

/// The (f, h) pair of a terminally evaluated point, or `None` for terminal
/// outcomes that produced no usable values (failed, rejected, extreme
/// violation). Unfinished evaluations are the caller's bug.
fn terminal_fh(point: &EvalPoint) -> Result<Option<(f64, f64)>, CompareError> {
    let status = point.status(EvalKind::Blackbox);
    if !status.is_terminal() {
        return Err(CompareError::NotEvaluated { status });
    }
    Ok(point.f().zip(point.h()))
}

fn strictly_less(a: f64, b: f64, tol: &Tolerance) -> bool {
    tol.cmp(a, b) == Ordering::Less
}

/// Returns true if `a` dominates `b`.
///
/// - Both feasible: `a` dominates iff its objective is strictly lower
///   (beyond `tol`).
/// - Feasible vs infeasible: the feasible point dominates.
/// - Both infeasible: lower h dominates; equal h (within `tol`) falls back
///   to strictly lower f.
///
/// Points whose evaluation finished without usable values (failed,
/// rejected, extreme violation) never dominate and are never dominated;
/// they stay comparable so history can be ranked without special cases.
///
/// The relation is irreflexive, asymmetric, and transitive; mutually
/// non-dominating points are simply incomparable.
///
/// # Errors
///
/// Returns [`CompareError::NotEvaluated`] if either evaluation has not
/// reached a terminal state.
pub fn dominates(a: &EvalPoint, b: &EvalPoint, tol: &Tolerance) -> Result<bool, CompareError> {
    let fh_a = terminal_fh(a)?;
    let fh_b = terminal_fh(b)?;
    let (Some((f_a, h_a)), Some((f_b, h_b))) = (fh_a, fh_b) else {
        return Ok(false);
    };

    let a_feasible = tol.is_zero(h_a);
    let b_feasible = tol.is_zero(h_b);
    Ok(match (a_feasible, b_feasible) {
        (true, true) => strictly_less(f_a, f_b, tol),
        (true, false) => true,
        (false, true) => false,
        (false, false) => {
            strictly_less(h_a, h_b, tol) || (tol.eq(h_a, h_b) && strictly_less(f_a, f_b, tol))
        }
    })
}

/// Rank used as the leading key of the total order: feasible points first,
/// then infeasible ones, then terminal outcomes with no usable values.
fn class_of(fh: Option<(f64, f64)>, tol: &Tolerance) -> u8 {
    match fh {
        Some((_, h)) if tol.is_zero(h) => 0,
        Some(_) => 1,
        None => 2,
    }
}

/// Compares two points under the strict total order used for deterministic
/// sorting and deduplication.
///
/// The order is lexicographic by feasibility (feasible first), then h
/// ascending, then f ascending, then the coordinate vectors (dimension,
/// then components), and finally the tags. Distinct points therefore never
/// compare equal unless they coincide in coordinates and tag as well.
///
/// # Errors
///
/// Returns [`CompareError::NotEvaluated`] if either evaluation has not
/// reached a terminal state.
pub fn total_cmp(a: &EvalPoint, b: &EvalPoint, tol: &Tolerance) -> Result<Ordering, CompareError> {
    let fh_a = terminal_fh(a)?;
    let fh_b = terminal_fh(b)?;

    let by_class = class_of(fh_a, tol).cmp(&class_of(fh_b, tol));
    if by_class != Ordering::Equal {
        return Ok(by_class);
    }

    if let (Some((f_a, h_a)), Some((f_b, h_b))) = (fh_a, fh_b) {
        match tol.cmp(h_a, h_b) {
            Ordering::Equal => {}
            unequal => return Ok(unequal),
        }
        match tol.cmp(f_a, f_b) {
            Ordering::Equal => {}
            unequal => return Ok(unequal),
        }
    }

    Ok(a.cache_key().cmp(&b.cache_key()))
}
