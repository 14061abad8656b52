use std::{
    collections::HashMap,
    fmt,
    sync::{
        Mutex,
        atomic::{AtomicU64, Ordering},
    },
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Unique identity of an evaluation point within one optimization run.
///
/// Tags let the cache distinguish this run's points from structurally
/// identical leftovers of a previous run, and serve as non-owning lineage
/// handles between points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Tag(u64);

impl Tag {
    /// Returns the underlying counter value.
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of one concurrent search instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ThreadAlgoId(pub usize);

impl fmt::Display for ThreadAlgoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "algo {}", self.0)
    }
}

/// Hands out strictly unique tags under concurrent allocation.
///
/// The registry is an explicit context object owned by the run, passed to
/// whoever needs a tag; independent runs in one process each own their own
/// registry and cannot interfere. One atomic sequence feeds all allocations,
/// and a side map records the tag range each search instance has drawn.
#[derive(Debug, Default)]
pub struct TagRegistry {
    next: AtomicU64,
    ranges: Mutex<HashMap<ThreadAlgoId, (u64, u64)>>,
}

impl TagRegistry {
    /// Creates a registry with the tag sequence at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next tag.
    pub fn allocate(&self) -> Tag {
        Tag(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Allocates the next tag on behalf of a search instance, extending its
    /// recorded range.
    pub fn allocate_for(&self, algo: ThreadAlgoId) -> Tag {
        let tag = self.allocate();
        let mut ranges = self.ranges.lock().expect("tag registry lock poisoned");
        ranges
            .entry(algo)
            .and_modify(|(first, last)| {
                *first = (*first).min(tag.0);
                *last = (*last).max(tag.0);
            })
            .or_insert((tag.0, tag.0));
        tag
    }

    /// Returns the most recently allocated tag, if any.
    #[must_use]
    pub fn current(&self) -> Option<Tag> {
        match self.next.load(Ordering::Relaxed) {
            0 => None,
            n => Some(Tag(n - 1)),
        }
    }

    /// Returns the inclusive tag range a search instance has drawn so far.
    #[must_use]
    pub fn range_of(&self, algo: ThreadAlgoId) -> Option<(Tag, Tag)> {
        let ranges = self.ranges.lock().expect("tag registry lock poisoned");
        ranges.get(&algo).map(|(first, last)| (Tag(*first), Tag(*last)))
    }

    /// Resets the sequence and forgets all ranges.
    ///
    /// Only valid between independent optimization runs, never mid-run:
    /// after a reset, previously issued tags may be reissued.
    pub fn reset(&self) {
        let mut ranges = self.ranges.lock().expect("tag registry lock poisoned");
        ranges.clear();
        self.next.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;

    #[test]
    fn tags_are_sequential_and_unique() {
        let registry = TagRegistry::new();
        assert_eq!(registry.current(), None);

        let a = registry.allocate();
        let b = registry.allocate();
        assert_ne!(a, b);
        assert_eq!(a.value(), 0);
        assert_eq!(b.value(), 1);
        assert_eq!(registry.current(), Some(b));
    }

    #[test]
    fn ranges_track_per_instance_allocations() {
        let registry = TagRegistry::new();
        let first_algo = ThreadAlgoId(0);
        let second_algo = ThreadAlgoId(1);

        let a = registry.allocate_for(first_algo);
        let b = registry.allocate_for(second_algo);
        let c = registry.allocate_for(first_algo);

        assert_eq!(registry.range_of(first_algo), Some((a, c)));
        assert_eq!(registry.range_of(second_algo), Some((b, b)));
        assert_eq!(registry.range_of(ThreadAlgoId(7)), None);
    }

    #[test]
    fn reset_starts_a_fresh_run() {
        let registry = TagRegistry::new();
        registry.allocate_for(ThreadAlgoId(0));
        registry.allocate();

        registry.reset();
        assert_eq!(registry.current(), None);
        assert_eq!(registry.range_of(ThreadAlgoId(0)), None);
        assert_eq!(registry.allocate().value(), 0);
    }

    #[test]
    fn concurrent_allocation_never_duplicates() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 1000;

        let registry = TagRegistry::new();
        let mut batches: Vec<Vec<Tag>> = Vec::new();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..THREADS)
                .map(|i| {
                    let registry = &registry;
                    scope.spawn(move || {
                        (0..PER_THREAD)
                            .map(|_| registry.allocate_for(ThreadAlgoId(i)))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            for handle in handles {
                batches.push(handle.join().expect("allocator thread"));
            }
        });

        let all: HashSet<Tag> = batches.iter().flatten().copied().collect();
        assert_eq!(all.len(), THREADS * PER_THREAD, "no duplicate tags");
    }
}
