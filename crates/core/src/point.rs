use std::{cmp::Ordering, fmt, ops::Index};

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::tolerance::Tolerance;

/// Errors that can occur when constructing a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PointError {
    #[error("a point must have at least one coordinate")]
    Empty,

    #[error("coordinate {index} is not finite")]
    NonFinite { index: usize },
}

/// An immutable coordinate vector.
///
/// The dimension is fixed at construction and every component is guaranteed
/// finite, so a `Point` is always fully defined. Whether it lives in the
/// problem's full space or in a fixed-variable sub-space is decided by the
/// caller; see [`FixedVariables`](crate::FixedVariables) for the projections
/// between the two.
///
/// Equality and ordering are component-wise lexicographic under the default
/// [`Tolerance`], so values that differ only by floating round-off compare
/// equal. Use [`cmp_within`](Self::cmp_within) to compare under an explicit
/// tolerance.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    coords: Vec<f64>,
}

impl Point {
    /// Constructs a point from its coordinates.
    ///
    /// # Errors
    ///
    /// Returns an error if `coords` is empty or contains a non-finite value.
    pub fn new(coords: Vec<f64>) -> Result<Self, PointError> {
        if coords.is_empty() {
            return Err(PointError::Empty);
        }
        if let Some(index) = coords.iter().position(|c| !c.is_finite()) {
            return Err(PointError::NonFinite { index });
        }
        Ok(Self { coords })
    }

    /// Constructs a point from coordinates already known to be valid.
    ///
    /// Callers must guarantee the vector is non-empty and every component is
    /// finite. The invariant is checked in debug builds.
    pub(crate) fn new_unchecked(coords: Vec<f64>) -> Self {
        debug_assert!(
            !coords.is_empty() && coords.iter().all(|c| c.is_finite()),
            "Point::new_unchecked requires non-empty, finite coordinates"
        );
        Self { coords }
    }

    /// Returns the dimension of the point.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.coords.len()
    }

    /// Returns the coordinates as a slice.
    #[must_use]
    pub fn coords(&self) -> &[f64] {
        &self.coords
    }

    /// Returns the component at `index`, or `None` if out of range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.coords.get(index).copied()
    }

    /// Returns true if `other` equals this point within `tol`.
    ///
    /// Points of different dimensions are never equal.
    #[must_use]
    pub fn eq_within(&self, other: &Self, tol: &Tolerance) -> bool {
        self.dim() == other.dim()
            && self
                .coords
                .iter()
                .zip(&other.coords)
                .all(|(a, b)| tol.eq(*a, *b))
    }

    /// Compares two points lexicographically, component by component, with
    /// components equal within `tol` treated as ties.
    ///
    /// Returns `None` if the dimensions differ.
    #[must_use]
    pub fn cmp_within(&self, other: &Self, tol: &Tolerance) -> Option<Ordering> {
        if self.dim() != other.dim() {
            return None;
        }
        for (a, b) in self.coords.iter().zip(&other.coords) {
            match tol.cmp(*a, *b) {
                Ordering::Equal => {}
                unequal => return Some(unequal),
            }
        }
        Some(Ordering::Equal)
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.eq_within(other, &Tolerance::default())
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.cmp_within(other, &Tolerance::default())
    }
}

impl Index<usize> for Point {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.coords[index]
    }
}

impl TryFrom<Vec<f64>> for Point {
    type Error = PointError;

    fn try_from(coords: Vec<f64>) -> Result<Self, PointError> {
        Self::new(coords)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for c in &self.coords {
            write!(f, " {c}")?;
        }
        write!(f, " )")
    }
}
