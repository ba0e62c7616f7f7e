//! Mutability and data-quality state carried by every chunk.

use std::sync::atomic::{AtomicBool, Ordering};

use super::error::QualityMarker;

/// One-way immutability switch.
///
/// The flag can be raised through a shared reference so containers can seal
/// chunks they were handed inside an `Arc`; it can only be lowered on an
/// exclusively owned value.
#[derive(Debug, Default)]
pub(crate) struct SealFlag(AtomicBool);

impl SealFlag {
    pub(crate) fn is_set(&self) -> bool { self.0.load(Ordering::Acquire) }

    pub(crate) fn set(&self) { self.0.store(true, Ordering::Release); }

    pub(crate) fn clear(&mut self) { *self.0.get_mut() = false; }
}

impl Clone for SealFlag {
    fn clone(&self) -> Self { Self(AtomicBool::new(self.is_set())) }
}

/// Markers describing how faithfully a chunk represents its data.
///
/// Deserialization sets these instead of failing so callers can decide how
/// to treat damaged or partial data. There is no way to clear a marker once
/// it has been set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DataQuality {
    incomplete: bool,
    incorrect: bool,
    improperly_represented: bool,
}

impl DataQuality {
    /// Quality of a complete, correct and properly represented chunk.
    pub const GOOD: Self = Self {
        incomplete: false,
        incorrect: false,
        improperly_represented: false,
    };

    /// Return a copy with the incomplete marker set.
    #[must_use]
    pub const fn with_incomplete(mut self) -> Self {
        self.incomplete = true;
        self
    }

    /// Return a copy with the incorrect marker set.
    #[must_use]
    pub const fn with_incorrect(mut self) -> Self {
        self.incorrect = true;
        self
    }

    /// Return a copy with the improperly represented marker set.
    #[must_use]
    pub const fn with_improperly_represented(mut self) -> Self {
        self.improperly_represented = true;
        self
    }

    /// Whether the chunk was built from fewer bytes than it needed.
    #[must_use]
    pub const fn is_incomplete(self) -> bool { self.incomplete }

    /// Whether the chunk content failed validation.
    #[must_use]
    pub const fn is_incorrect(self) -> bool { self.incorrect }

    /// Whether the chunk cannot faithfully represent its bytes.
    #[must_use]
    pub const fn is_improperly_represented(self) -> bool { self.improperly_represented }

    /// Combine the markers of two chunks.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self {
            incomplete: self.incomplete || other.incomplete,
            incorrect: self.incorrect || other.incorrect,
            improperly_represented: self.improperly_represented || other.improperly_represented,
        }
    }

    pub(crate) fn markers(self) -> impl Iterator<Item = QualityMarker> {
        [
            (self.incomplete, QualityMarker::Incomplete),
            (self.incorrect, QualityMarker::Incorrect),
            (self.improperly_represented, QualityMarker::ImproperlyRepresented),
        ]
        .into_iter()
        .filter_map(|(set, marker)| set.then_some(marker))
    }
}

#[cfg(test)]
mod tests {
    use super::{DataQuality, SealFlag};
    use crate::chunk::QualityMarker;

    #[test]
    fn seal_flag_survives_clone_and_clears_on_owned_value() {
        let flag = SealFlag::default();
        flag.set();
        let mut copy = flag.clone();
        assert!(copy.is_set());
        copy.clear();
        assert!(!copy.is_set());
        assert!(flag.is_set());
    }

    #[test]
    fn union_keeps_every_marker() {
        let left = DataQuality::GOOD.with_incomplete();
        let right = DataQuality::GOOD.with_incorrect();
        let merged = left.union(right);
        let markers: Vec<_> = merged.markers().collect();
        assert_eq!(markers, vec![QualityMarker::Incomplete, QualityMarker::Incorrect]);
        assert!(!merged.is_improperly_represented());
    }
}
