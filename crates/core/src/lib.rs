//! Core coordinate types for the mads framework.
//!
//! This crate defines the shared geometry that the evaluation and search
//! layers build on:
//!
//! - [`Point`] — an immutable coordinate vector in a full or reduced space
//! - [`FixedVariables`] — variables pinned to constant values, with the
//!   projections between the full space and the free sub-space
//! - [`Tolerance`] — the floating-point comparison policy used everywhere a
//!   coordinate, objective, or constraint value is compared
//!
//! Coordinates are validated at construction time, so a [`Point`] in hand is
//! always fully defined: every component is a finite `f64` and the dimension
//! never changes afterwards.

mod fixed;
mod point;
mod tolerance;

pub use fixed::{FixedVariables, SpaceError};
pub use point::{Point, PointError};
pub use tolerance::Tolerance;
