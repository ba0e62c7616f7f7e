//! Errors raised by fields serializers.

use std::error::Error;

use thiserror::Error;

/// Failure reported by a [`FieldsSerializer`](super::FieldsSerializer).
///
/// Short or damaged input is not an error: deserializers report it through
/// [`Decoded`](super::Decoded) quality markers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SerializerError {
    /// `bincode` failed to encode a value.
    #[error("failed to encode fields: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    /// `bincode` failed to decode a value.
    #[error("failed to decode fields: {0}")]
    Decode(#[from] bincode::error::DecodeError),
    /// A serializer was handed a value of a type it does not handle.
    #[error("serializer for {expected} received a {found}")]
    TypeMismatch {
        /// Type the serializer handles.
        expected: &'static str,
        /// Type it received.
        found: &'static str,
    },
    /// Any other serializer-defined failure.
    #[error(transparent)]
    Custom(Box<dyn Error + Send + Sync>),
}

impl SerializerError {
    /// Wrap an arbitrary serializer error.
    pub fn custom(error: impl Into<Box<dyn Error + Send + Sync>>) -> Self { Self::Custom(error.into()) }
}
