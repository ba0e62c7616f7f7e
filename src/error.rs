//! Crate-wide error and result types.
//!
//! Each concern reports its own error enum ([`ChunkError`], [`TagError`]);
//! operations spanning both, such as tagging a byte range of a packet,
//! return [`Error`].

use thiserror::Error;

use crate::{chunk::ChunkError, tag::TagError};

/// Any error raised by `wirechunk`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A chunk, buffer or serialization operation failed.
    #[error(transparent)]
    Chunk(#[from] ChunkError),
    /// A tag operation failed.
    #[error(transparent)]
    Tag(#[from] TagError),
}

impl From<crate::serializer::SerializerError> for Error {
    fn from(error: crate::serializer::SerializerError) -> Self { Self::Chunk(ChunkError::from(error)) }
}

/// Result type defaulting to [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;
