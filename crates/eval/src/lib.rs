//! Evaluation points for a mesh-adaptive direct-search engine.
//!
//! This crate holds the data model at the center of a derivative-free
//! optimization run: the candidate points the search produces, the blackbox
//! outputs the harness fills in, and the comparison semantics the algorithm
//! and its cache rely on.
//!
//! - [`BbOutput`], [`BbOutputType`] — raw blackbox outputs and the declared
//!   meaning of each output position
//! - [`Eval`], [`EvalSlot`], [`EvalStatus`] — a derived (f, h) result and the
//!   state machine that gates how it is written
//! - [`EvalPoint`] — a coordinate vector plus true and surrogate results,
//!   generation metadata, lineage, and tagging
//! - [`dominates`], [`total_cmp`] — Pareto dominance and the strict total
//!   order used for deterministic tie-breaking
//! - [`TagRegistry`] — unique tag allocation across concurrent evaluation
//!   batches
//!
//! The mesh and poll algorithms that generate coordinates, the harness that
//! runs the blackbox, and the cache that retains history are external
//! collaborators; they construct, fill, and query the types defined here.

mod compare;
mod eval;
mod output;
mod point;
mod tag;

pub use compare::{CompareError, dominates, total_cmp};
pub use eval::{Derived, Eval, EvalError, EvalKind, EvalSlot, EvalStatus, FailReason, HNorm};
pub use output::{BbOutput, BbOutputType, ParseOutputTypeError};
pub use point::{CacheKey, EvalPoint, GenStep};
pub use tag::{Tag, TagRegistry, ThreadAlgoId};
