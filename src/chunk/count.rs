//! Length-only chunk whose content is irrelevant.

/// Placeholder for `length` bytes of "don't care" data.
///
/// Serializes to zero bytes. Two adjacent byte counts merge by adding their
/// lengths.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ByteCountChunk {
    length: usize,
}

impl ByteCountChunk {
    /// Create a placeholder of `length` bytes.
    #[must_use]
    pub const fn new(length: usize) -> Self { Self { length } }

    /// Number of bytes represented.
    #[must_use]
    pub const fn len(&self) -> usize { self.length }

    /// Whether the placeholder covers no bytes.
    #[must_use]
    pub const fn is_empty(&self) -> bool { self.length == 0 }

    pub(crate) fn set_len(&mut self, length: usize) { self.length = length; }
}
