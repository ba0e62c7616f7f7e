//! Error types raised by chunk construction, peeking and serialization.
//!
//! Every variant is a caller error surfaced immediately. Damaged or partial
//! data is not an error: it is reported through the chunk's
//! [`DataQuality`](crate::chunk::DataQuality) markers instead.

use thiserror::Error;

use crate::serializer::SerializerError;

/// Data-quality marker that caused a peek result to be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QualityMarker {
    /// The chunk was built from fewer bytes than it needed.
    Incomplete,
    /// The chunk content failed validation.
    Incorrect,
    /// The chunk cannot faithfully represent the underlying bytes.
    ImproperlyRepresented,
}

impl std::fmt::Display for QualityMarker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Incomplete => "incomplete",
            Self::Incorrect => "incorrect",
            Self::ImproperlyRepresented => "improperly represented",
        })
    }
}

/// Errors produced by chunk operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChunkError {
    /// A mutating call reached a chunk that has been marked immutable.
    #[error("chunk is immutable")]
    Immutable,
    /// A variant-specific mutation reached a chunk of another variant.
    #[error("expected a {expected}, found a {found}")]
    WrongVariant {
        /// Representation the operation needs.
        expected: &'static str,
        /// Representation actually held.
        found: &'static str,
    },
    /// A zero-length chunk was handed to an operation that requires data.
    #[error("cannot insert an empty chunk")]
    EmptyChunk,
    /// Data was requested from a container that holds none.
    #[error("{0} is empty")]
    Empty(&'static str),
    /// The requested range does not fit the available data.
    #[error("range at offset {offset} with length {length} exceeds available length {available}")]
    OutOfRange {
        /// Requested start offset.
        offset: usize,
        /// Requested length.
        length: usize,
        /// Number of bytes actually available.
        available: usize,
    },
    /// A self-delimiting type was peeked backwards without a length, so
    /// where it starts is unknown.
    #[error("peeking {type_name} from the back requires a length")]
    LengthRequired {
        /// Name of the requested chunk type.
        type_name: &'static str,
    },
    /// Producing the requested representation would need serialization,
    /// which neither the peek flags nor the registry policy allow.
    #[error("peeking {type_name} requires serialization, which is not allowed")]
    SerializationDisabled {
        /// Name of the requested chunk type.
        type_name: &'static str,
    },
    /// No serializer has been registered for the fields type.
    #[error("no serializer registered for {type_name}")]
    NoSerializer {
        /// Name of the fields type lacking a serializer.
        type_name: &'static str,
    },
    /// A serializer was registered twice for the same fields type.
    #[error("a serializer is already registered for {type_name}")]
    DuplicateSerializer {
        /// Name of the fields type.
        type_name: &'static str,
    },
    /// The peek result carries a data-quality marker the caller did not allow.
    #[error("peek result is {marker}, which the peek flags do not allow")]
    QualityRejected {
        /// Offending marker.
        marker: QualityMarker,
    },
    /// A serializer produced a different number of bytes than the chunk length.
    #[error("serialized {type_name} is {actual} bytes, expected {expected}")]
    SerializedLengthMismatch {
        /// Name of the fields type.
        type_name: &'static str,
        /// Chunk length.
        expected: usize,
        /// Bytes written by the serializer.
        actual: usize,
    },
    /// Reassembled data was requested before all of it arrived.
    #[error("reassembly is incomplete: expected {expected_length} contiguous bytes")]
    IncompleteReassembly {
        /// Total length the buffer waits for.
        expected_length: usize,
    },
    /// The registered serializer failed.
    #[error(transparent)]
    Serializer(#[from] SerializerError),
}

impl ChunkError {
    /// Build an [`ChunkError::OutOfRange`] error.
    #[must_use]
    pub const fn out_of_range(offset: usize, length: usize, available: usize) -> Self {
        Self::OutOfRange {
            offset,
            length,
            available,
        }
    }
}
