//! Error types for packet and region tags.

use thiserror::Error;

/// Errors produced by [`TagSet`](super::TagSet) and
/// [`RegionTagSet`](super::RegionTagSet) operations.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum TagError {
    /// A tag of this type is already attached.
    #[error("a {type_name} tag is already present")]
    AlreadyPresent {
        /// Name of the tag type.
        type_name: &'static str,
    },
    /// No tag of this type is attached.
    #[error("no {type_name} tag is present")]
    Absent {
        /// Name of the tag type.
        type_name: &'static str,
    },
    /// The new region overlaps a region already tagged with the same type.
    #[error("{type_name} tag at offset {offset} with length {length} overlaps an existing tag")]
    Overlapping {
        /// Name of the tag type.
        type_name: &'static str,
        /// Start of the rejected region.
        offset: usize,
        /// Length of the rejected region.
        length: usize,
    },
    /// No tag of this type covers exactly the requested region.
    #[error("no {type_name} tag covers exactly offset {offset} with length {length}")]
    NoExactMatch {
        /// Name of the tag type.
        type_name: &'static str,
        /// Start of the requested region.
        offset: usize,
        /// Length of the requested region.
        length: usize,
    },
    /// Region tags must cover at least one byte.
    #[error("region tags must cover at least one byte")]
    EmptyRegion,
    /// The region would end past `usize::MAX`.
    #[error("region at offset {offset} with length {length} ends past the addressable range")]
    RangeOverflow {
        /// Start of the rejected region.
        offset: usize,
        /// Length of the rejected region.
        length: usize,
    },
}
