use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use mads_core::{Point, Tolerance};

use crate::tag::Tag;

/// Stable, totally ordered identity of a point for the external cache.
///
/// Orders by dimension, then coordinates (lexicographic under the default
/// [`Tolerance`]), then tag, with untagged keys first. Two keys with the
/// same coordinates but different tags stay distinct, so a point left over
/// from a previous batch never shadows this batch's point.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CacheKey {
    x: Point,
    tag: Option<Tag>,
}

impl CacheKey {
    pub(crate) fn new(x: Point, tag: Option<Tag>) -> Self {
        Self { x, tag }
    }

    /// Returns the coordinates.
    #[must_use]
    pub fn x(&self) -> &Point {
        &self.x
    }

    /// Returns the tag, if the point was tagged.
    #[must_use]
    pub fn tag(&self) -> Option<Tag> {
        self.tag
    }
}

impl PartialEq for CacheKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CacheKey {}

impl PartialOrd for CacheKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CacheKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.x
            .dim()
            .cmp(&other.x.dim())
            .then_with(|| {
                // Dimensions match here, so the comparison cannot fail.
                self.x
                    .cmp_within(&other.x, &Tolerance::default())
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| self.tag.cmp(&other.tag))
    }
}
