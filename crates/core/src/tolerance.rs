use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Floating-point comparison policy.
///
/// Two values are considered equal when they differ by at most `abs`, or by
/// at most `rel` times the larger magnitude. Treating near-equal values as
/// equal keeps floating round-off from turning the same coordinates into
/// distinct cache entries.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Tolerance {
    pub abs: f64,
    pub rel: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            abs: 1e-13,
            rel: 1e-13,
        }
    }
}

impl Tolerance {
    /// Validates that both tolerances are finite and non-negative.
    ///
    /// # Errors
    ///
    /// Returns an error if either tolerance is negative or non-finite.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.abs.is_finite() || self.abs < 0.0 {
            return Err("abs must be finite and non-negative");
        }
        if !self.rel.is_finite() || self.rel < 0.0 {
            return Err("rel must be finite and non-negative");
        }
        Ok(())
    }

    /// Returns true if `a` and `b` are equal within this tolerance.
    ///
    /// Identical values (including infinities of the same sign) are always
    /// equal. `NaN` is never equal to anything.
    #[must_use]
    pub fn eq(&self, a: f64, b: f64) -> bool {
        if a == b {
            return true;
        }
        let diff = (a - b).abs();
        // An infinite operand (or overflowing difference) is never close to a
        // value it differs from; the shortcut above already matched equal
        // infinities.
        if !diff.is_finite() {
            return false;
        }
        diff <= self.abs || diff <= self.rel * a.abs().max(b.abs())
    }

    /// Returns true if `a` is zero within this tolerance.
    #[must_use]
    pub fn is_zero(&self, a: f64) -> bool {
        self.eq(a, 0.0)
    }

    /// Compares `a` and `b`, treating values equal within tolerance as equal.
    #[must_use]
    pub fn cmp(&self, a: f64, b: f64) -> Ordering {
        if self.eq(a, b) {
            Ordering::Equal
        } else if a < b {
            Ordering::Less
        } else {
            Ordering::Greater
        }
    }
}
