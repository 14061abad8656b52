use std::collections::BTreeMap;

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{point::Point, tolerance::Tolerance};

/// Errors that can occur when projecting between the full space and the
/// free sub-space.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SpaceError {
    #[error("expected a point of dimension {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("variable {index} is fixed to {declared} but the point holds {found}")]
    FixedValueMismatch {
        index: usize,
        declared: f64,
        found: f64,
    },

    #[error("fixed variable index {index} is outside the full space of dimension {n_full}")]
    IndexOutOfRange { index: usize, n_full: usize },

    #[error("fixed value for variable {index} is not finite")]
    NonFiniteValue { index: usize },

    #[error("fixing all {n_full} variables leaves no free sub-space")]
    NoFreeVariables { n_full: usize },
}

/// Variables pinned to constant values within a full space of dimension
/// `n_full`.
///
/// A fixed-variable specification splits the full space into fixed positions
/// (excluded from the search) and free positions (the sub-space the search
/// actually explores). The projections in both directions live on
/// [`Point`]: [`Point::to_full_space`] and [`Point::to_sub_space`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FixedVariables {
    n_full: usize,
    values: BTreeMap<usize, f64>,
}

impl FixedVariables {
    /// Constructs a specification from `(index, value)` pairs in a full
    /// space of dimension `n_full`.
    ///
    /// # Errors
    ///
    /// Returns an error if an index is out of range, a fixed value is not
    /// finite, or every variable ends up fixed.
    pub fn new(
        n_full: usize,
        fixed: impl IntoIterator<Item = (usize, f64)>,
    ) -> Result<Self, SpaceError> {
        let mut values = BTreeMap::new();
        for (index, value) in fixed {
            if index >= n_full {
                return Err(SpaceError::IndexOutOfRange { index, n_full });
            }
            if !value.is_finite() {
                return Err(SpaceError::NonFiniteValue { index });
            }
            values.insert(index, value);
        }
        if values.len() == n_full {
            return Err(SpaceError::NoFreeVariables { n_full });
        }
        Ok(Self { n_full, values })
    }

    /// Returns the dimension of the full space.
    #[must_use]
    pub fn n_full(&self) -> usize {
        self.n_full
    }

    /// Returns the number of fixed variables.
    #[must_use]
    pub fn n_fixed(&self) -> usize {
        self.values.len()
    }

    /// Returns the dimension of the free sub-space.
    #[must_use]
    pub fn n_free(&self) -> usize {
        self.n_full - self.values.len()
    }

    /// Returns true if the variable at `index` is fixed.
    #[must_use]
    pub fn is_fixed(&self, index: usize) -> bool {
        self.values.contains_key(&index)
    }

    /// Returns the fixed value at `index`, or `None` if the variable is free.
    #[must_use]
    pub fn value_of(&self, index: usize) -> Option<f64> {
        self.values.get(&index).copied()
    }

    /// Iterates over `(index, value)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.values.iter().map(|(i, v)| (*i, *v))
    }
}

impl Point {
    /// Interleaves this sub-space point with the fixed values at their
    /// declared positions, producing a full-space point.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if this point's dimension is not the
    /// free sub-space dimension.
    pub fn to_full_space(&self, fixed: &FixedVariables) -> Result<Point, SpaceError> {
        if self.dim() != fixed.n_free() {
            return Err(SpaceError::DimensionMismatch {
                expected: fixed.n_free(),
                actual: self.dim(),
            });
        }
        let mut free = self.coords().iter();
        let mut coords = Vec::with_capacity(fixed.n_full());
        for index in 0..fixed.n_full() {
            if let Some(value) = fixed.value_of(index) {
                coords.push(value);
            } else if let Some(&value) = free.next() {
                coords.push(value);
            }
        }
        debug_assert_eq!(coords.len(), fixed.n_full());
        Ok(Point::new_unchecked(coords))
    }

    /// Strips the fixed positions out of this full-space point, producing a
    /// point in the free sub-space.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if this point's dimension is not the
    /// full-space dimension, or `FixedValueMismatch` if a fixed position
    /// holds a value that differs from its declared fixed value beyond `tol`.
    pub fn to_sub_space(
        &self,
        fixed: &FixedVariables,
        tol: &Tolerance,
    ) -> Result<Point, SpaceError> {
        if self.dim() != fixed.n_full() {
            return Err(SpaceError::DimensionMismatch {
                expected: fixed.n_full(),
                actual: self.dim(),
            });
        }
        let mut coords = Vec::with_capacity(fixed.n_free());
        for (index, &value) in self.coords().iter().enumerate() {
            match fixed.value_of(index) {
                Some(declared) if !tol.eq(value, declared) => {
                    return Err(SpaceError::FixedValueMismatch {
                        index,
                        declared,
                        found: value,
                    });
                }
                Some(_) => {}
                None => coords.push(value),
            }
        }
        Ok(Point::new_unchecked(coords))
    }
}
