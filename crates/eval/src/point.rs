//! Candidate points and their evaluation lifecycle.
//!
//! An [`EvalPoint`] is what the search algorithm hands to the evaluation
//! harness and what the cache and incumbent sets retain afterwards: a
//! coordinate vector, a true result slot, an optional surrogate result
//! slot, and the metadata recording where the point came from.
//!
//! A point is written by the single producer that created it until its true
//! slot reaches a terminal state; after that it is logically immutable
//! except for the re-evaluation counter and the surrogate slot, and can be
//! shared freely across threads.

mod gen_step;
mod key;

#[cfg(test)]
mod tests;

pub use gen_step::GenStep;
pub use key::CacheKey;

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use mads_core::{FixedVariables, Point, SpaceError, Tolerance};

use crate::{
    eval::{Eval, EvalError, EvalKind, EvalSlot, EvalStatus, FailReason, HNorm},
    output::{BbOutput, BbOutputType},
    tag::{Tag, TagRegistry, ThreadAlgoId},
};

/// A candidate solution point with its evaluation results and provenance.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EvalPoint {
    x: Point,
    bb: EvalSlot,
    sgte: EvalSlot,
    gen_step: GenStep,
    direction: Option<Point>,
    angle: Option<f64>,
    point_from: Option<Tag>,
    number_eval: u32,
    tag: Option<Tag>,
    thread_algo: Option<ThreadAlgoId>,
}

impl EvalPoint {
    /// Creates an unevaluated point at `x`.
    #[must_use]
    pub fn new(x: Point, gen_step: GenStep) -> Self {
        Self {
            x,
            bb: EvalSlot::NotEvaluated,
            sgte: EvalSlot::NotEvaluated,
            gen_step,
            direction: None,
            angle: None,
            point_from: None,
            number_eval: 0,
            tag: None,
            thread_algo: None,
        }
    }

    /// Records the tag of the point this one was generated from.
    ///
    /// The handle is lineage only, never ownership: if the referent is
    /// discarded the lineage simply becomes unknown.
    #[must_use]
    pub fn with_point_from(mut self, from: Tag) -> Self {
        self.point_from = Some(from);
        self
    }

    /// Records the generating direction and its angle.
    #[must_use]
    pub fn with_direction(mut self, direction: Point, angle: f64) -> Self {
        self.direction = Some(direction);
        self.angle = Some(angle);
        self
    }

    /// Returns the coordinates.
    #[must_use]
    pub fn x(&self) -> &Point {
        &self.x
    }

    /// Returns the dimension of the coordinates.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.x.dim()
    }

    /// Returns true if the point lives in a space of dimension `n`.
    #[must_use]
    pub fn is_defined(&self, n: usize) -> bool {
        self.x.dim() == n
    }

    /// Returns the requested result slot.
    #[must_use]
    pub fn slot(&self, kind: EvalKind) -> &EvalSlot {
        match kind {
            EvalKind::Blackbox => &self.bb,
            EvalKind::Surrogate => &self.sgte,
        }
    }

    fn slot_mut(&mut self, kind: EvalKind) -> &mut EvalSlot {
        match kind {
            EvalKind::Blackbox => &mut self.bb,
            EvalKind::Surrogate => &mut self.sgte,
        }
    }

    /// Returns the status of the requested result slot.
    #[must_use]
    pub fn status(&self, kind: EvalKind) -> EvalStatus {
        self.slot(kind).status()
    }

    /// Marks the requested slot as dispatched to the harness.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if an attempt is already underway or
    /// finished in that slot.
    pub fn start_eval(&mut self, kind: EvalKind) -> Result<(), EvalError> {
        self.slot_mut(kind).start()
    }

    /// Stores raw outputs in the requested slot, deriving f and h against
    /// the declared output types.
    ///
    /// # Errors
    ///
    /// Returns an error if the outputs cannot be derived (count mismatch,
    /// missing or undefined objective or constraint) or if the slot was not
    /// dispatched first. A failed derivation leaves the slot `InProgress`
    /// so the harness can report it as failed instead.
    pub fn complete_eval(
        &mut self,
        kind: EvalKind,
        bbo: BbOutput,
        types: &[BbOutputType],
        norm: HNorm,
    ) -> Result<(), EvalError> {
        let derived = Eval::from_output(bbo, types, norm)?;
        self.slot_mut(kind).complete(derived)
    }

    /// Marks the requested slot's attempt as failed.
    ///
    /// Cancellation by the harness reports [`FailReason::Cancelled`]; an
    /// attempt is never left `InProgress` indefinitely.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if the slot was not dispatched first.
    pub fn fail_eval(&mut self, kind: EvalKind, reason: FailReason) -> Result<(), EvalError> {
        self.slot_mut(kind).fail(reason)
    }

    /// Marks the requested slot's attempt as rejected by the user callback.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if the slot was not dispatched first.
    pub fn reject_eval(&mut self, kind: EvalKind) -> Result<(), EvalError> {
        self.slot_mut(kind).reject()
    }

    /// Reopens a finished slot so a fresh attempt can be dispatched.
    ///
    /// The stored result is discarded; the re-evaluation counter is kept, so
    /// a noisy blackbox can be re-sampled and its samples counted across
    /// attempts.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if an attempt is still underway in that
    /// slot.
    pub fn reset_eval(&mut self, kind: EvalKind) -> Result<(), EvalError> {
        let slot = self.slot_mut(kind);
        if slot.status() == EvalStatus::InProgress {
            return Err(EvalError::InvalidTransition {
                from: EvalStatus::InProgress,
                to: EvalStatus::NotEvaluated,
            });
        }
        slot.clear();
        Ok(())
    }

    /// Returns the objective value from the true result, if available.
    #[must_use]
    pub fn f(&self) -> Option<f64> {
        self.bb.f()
    }

    /// Returns the infeasibility measure from the true result, if available.
    #[must_use]
    pub fn h(&self) -> Option<f64> {
        self.bb.h()
    }

    /// Returns true if the true result's status is `EVAL_OK`.
    #[must_use]
    pub fn is_eval_ok(&self) -> bool {
        self.bb.status() == EvalStatus::Ok
    }

    /// Returns true if the true result exists and its h is zero within
    /// `tol`.
    #[must_use]
    pub fn is_feasible(&self, tol: &Tolerance) -> bool {
        self.bb.h().is_some_and(|h| tol.is_zero(h))
    }

    /// Returns true if this point solves the phase-one problem.
    ///
    /// Under a phase-one objective the search minimizes h itself; a point
    /// whose h has reached zero tells the algorithm to switch back to
    /// minimizing f.
    #[must_use]
    pub fn is_phase_one_solution(&self, tol: &Tolerance) -> bool {
        self.is_feasible(tol)
    }

    /// Returns true if a true evaluation produced outputs.
    #[must_use]
    pub fn has_bb_eval(&self) -> bool {
        self.bb.bbo().is_some()
    }

    /// Returns true if a surrogate evaluation produced outputs.
    #[must_use]
    pub fn has_sgte_eval(&self) -> bool {
        self.sgte.bbo().is_some()
    }

    /// Resets the surrogate slot, leaving the true result untouched.
    ///
    /// Called when the surrogate model is retrained or retired, so stale
    /// surrogate estimates are never compared against fresh ones.
    pub fn clear_sgte(&mut self) {
        self.sgte.clear();
    }

    /// Promotes the surrogate result into the true slot.
    ///
    /// The surrogate result becomes the authoritative one and the surrogate
    /// slot is cleared, whatever the true slot previously held.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if the surrogate slot holds no completed
    /// result.
    pub fn promote_sgte(&mut self) -> Result<(), EvalError> {
        if self.sgte.bbo().is_none() {
            return Err(EvalError::InvalidTransition {
                from: self.sgte.status(),
                to: EvalStatus::Ok,
            });
        }
        self.bb = std::mem::take(&mut self.sgte);
        Ok(())
    }

    /// Returns how many times these coordinates have been dispatched.
    #[must_use]
    pub fn number_eval(&self) -> u32 {
        self.number_eval
    }

    /// Counts one more dispatch of these coordinates.
    ///
    /// Called by the harness on every (re-)evaluation; re-sampling a noisy
    /// blackbox is the caller's explicit decision, never automatic.
    pub fn inc_number_eval(&mut self) {
        self.number_eval += 1;
    }

    /// Returns the dedup tag, if one was assigned.
    #[must_use]
    pub fn tag(&self) -> Option<Tag> {
        self.tag
    }

    /// Draws a fresh tag from the registry and assigns it to this point,
    /// extending the owning search instance's range when one is set.
    pub fn update_tag(&mut self, registry: &TagRegistry) {
        let tag = match self.thread_algo {
            Some(algo) => registry.allocate_for(algo),
            None => registry.allocate(),
        };
        self.tag = Some(tag);
    }

    /// Clears the tag back to unset and zeroes the re-evaluation counter.
    ///
    /// This is the administrative reset tied to tag reassignment; the
    /// counter never decreases otherwise.
    pub fn reset_tag(&mut self) {
        self.tag = None;
        self.number_eval = 0;
    }

    /// Returns the owning search instance, if one was set.
    #[must_use]
    pub fn thread_algo(&self) -> Option<ThreadAlgoId> {
        self.thread_algo
    }

    /// Records which concurrent search instance produced this point.
    pub fn set_thread_algo(&mut self, algo: ThreadAlgoId) {
        self.thread_algo = Some(algo);
    }

    /// Returns the generating mechanism.
    #[must_use]
    pub fn gen_step(&self) -> GenStep {
        self.gen_step
    }

    /// Overrides the generating mechanism.
    pub fn set_gen_step(&mut self, gen_step: GenStep) {
        self.gen_step = gen_step;
    }

    /// Returns the generating direction, if the point was direction-based.
    #[must_use]
    pub fn direction(&self) -> Option<&Point> {
        self.direction.as_ref()
    }

    /// Returns the generating angle, if one was recorded.
    #[must_use]
    pub fn angle(&self) -> Option<f64> {
        self.angle
    }

    /// Overrides the generating angle.
    pub fn set_angle(&mut self, angle: f64) {
        self.angle = Some(angle);
    }

    /// Returns the lineage tag, if known.
    ///
    /// A dangling lineage (the referent was discarded) is not detectable
    /// here and not an error; lineage is display and tie-break material
    /// only.
    #[must_use]
    pub fn point_from(&self) -> Option<Tag> {
        self.point_from
    }

    /// Overrides the lineage tag.
    pub fn set_point_from(&mut self, from: Option<Tag>) {
        self.point_from = from;
    }

    /// Re-expresses this sub-space point in the full space, interleaving
    /// the fixed values at their declared positions.
    ///
    /// Evaluation results, metadata, and tags carry over unchanged; the
    /// direction, if any, stays expressed in the generating space.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if the coordinates are not of the free
    /// sub-space dimension.
    pub fn to_full_space(&self, fixed: &FixedVariables) -> Result<Self, SpaceError> {
        Ok(Self {
            x: self.x.to_full_space(fixed)?,
            ..self.clone()
        })
    }

    /// Re-expresses this full-space point in the free sub-space, stripping
    /// the fixed positions.
    ///
    /// Evaluation results, metadata, and tags carry over unchanged; the
    /// direction, if any, stays expressed in the generating space.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if the coordinates are not of the full
    /// dimension, or `FixedValueMismatch` if a fixed position disagrees
    /// with its declared value beyond `tol`.
    pub fn to_sub_space(
        &self,
        fixed: &FixedVariables,
        tol: &Tolerance,
    ) -> Result<Self, SpaceError> {
        Ok(Self {
            x: self.x.to_sub_space(fixed, tol)?,
            ..self.clone()
        })
    }

    /// Returns the stable cache key for this point: coordinates plus tag.
    #[must_use]
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(self.x.clone(), self.tag)
    }
}

/// Structural identity: two points are equal when their coordinates are
/// equal within the default tolerance. Tags and results are deliberately
/// ignored; [`CacheKey`] is the identity that distinguishes batches.
impl PartialEq for EvalPoint {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x
    }
}

impl fmt::Display for EvalPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.x, self.bb.status())?;
        if let Some(eval) = self.bb.eval() {
            write!(f, " {eval}")?;
        }
        if let Some(tag) = self.tag {
            write!(f, " {tag}")?;
        }
        Ok(())
    }
}
