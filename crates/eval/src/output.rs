use std::{fmt, str::FromStr};

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The declared meaning of one blackbox output position.
///
/// The output type list is part of the problem definition: it tells the
/// evaluation layer which raw output is the objective and which are
/// constraints, and how violated constraints are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BbOutputType {
    /// The objective value to minimize.
    Objective,

    /// An extreme-barrier constraint: any violation rejects the point.
    ConstraintEb,

    /// A progressive-barrier constraint: violations accumulate into h.
    ConstraintPb,

    /// Computed by the blackbox but ignored by the algorithm.
    Extra,
}

impl BbOutputType {
    /// Returns true for either constraint flavor.
    #[must_use]
    pub fn is_constraint(self) -> bool {
        matches!(self, Self::ConstraintEb | Self::ConstraintPb)
    }
}

impl fmt::Display for BbOutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Objective => "OBJ",
            Self::ConstraintEb => "EB",
            Self::ConstraintPb => "PB",
            Self::Extra => "EXTRA",
        };
        f.write_str(s)
    }
}

/// Error returned when parsing an unknown output type keyword.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown blackbox output type `{0}`")]
pub struct ParseOutputTypeError(pub String);

impl FromStr for BbOutputType {
    type Err = ParseOutputTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OBJ" => Ok(Self::Objective),
            "EB" => Ok(Self::ConstraintEb),
            "PB" | "CSTR" => Ok(Self::ConstraintPb),
            "EXTRA" | "NOTHING" | "-" => Ok(Self::Extra),
            other => Err(ParseOutputTypeError(other.to_string())),
        }
    }
}

/// The raw output vector returned by one blackbox run.
///
/// Each component is either a value or undefined. Undefined components come
/// from blackboxes that print a non-numeric token for an output they could
/// not compute; they are preserved as-is so the evaluation layer can decide
/// whether the result is usable.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BbOutput {
    values: Vec<Option<f64>>,
}

impl BbOutput {
    /// Constructs an output vector from possibly-undefined components.
    #[must_use]
    pub fn new(values: Vec<Option<f64>>) -> Self {
        Self { values }
    }

    /// Constructs an output vector from plain values.
    ///
    /// `NaN` components become undefined; infinite values are kept, since a
    /// blackbox may legitimately report an infinite constraint violation.
    #[must_use]
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            values: values
                .into_iter()
                .map(|v| if v.is_nan() { None } else { Some(v) })
                .collect(),
        }
    }

    /// Parses the whitespace-separated output line a batch blackbox writes.
    ///
    /// Tokens that do not parse as numbers become undefined components, not
    /// errors; a failed output is a normal outcome the caller inspects.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        Self {
            values: raw
                .split_whitespace()
                .map(|token| token.parse::<f64>().ok().filter(|v| !v.is_nan()))
                .collect(),
        }
    }

    /// Returns the number of output components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if there are no output components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the component at `index`, or `None` if out of range or
    /// undefined.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    /// Returns the components as a slice.
    #[must_use]
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Returns true if every component is defined.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.values.iter().all(Option::is_some)
    }
}

impl fmt::Display for BbOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for value in &self.values {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            match value {
                Some(v) => write!(f, "{v}")?,
                None => f.write_str("-")?,
            }
        }
        Ok(())
    }
}
