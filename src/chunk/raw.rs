//! Chunk holding an explicit byte sequence.

use bytes::{Bytes, BytesMut};

/// Explicit bytes backed by a reference-counted [`Bytes`] buffer.
///
/// Narrowing a bytes chunk shares the backing buffer instead of copying it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BytesChunk {
    data: Bytes,
}

impl BytesChunk {
    /// Wrap `data`.
    #[must_use]
    pub fn new(data: impl Into<Bytes>) -> Self { Self { data: data.into() } }

    /// Borrow the bytes.
    #[must_use]
    pub fn bytes(&self) -> &Bytes { &self.data }

    /// Read the byte at `index`, if present.
    #[must_use]
    pub fn byte(&self, index: usize) -> Option<u8> { self.data.get(index).copied() }

    /// Number of bytes held.
    #[must_use]
    pub fn len(&self) -> usize { self.data.len() }

    /// Whether no bytes are held.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.data.is_empty() }

    pub(crate) fn narrow(&self, offset: usize, length: usize) -> Self {
        Self {
            data: self.data.slice(offset..offset + length),
        }
    }

    pub(crate) fn set_bytes(&mut self, data: Bytes) { self.data = data; }

    pub(crate) fn set_byte(&mut self, index: usize, value: u8) -> bool {
        if index >= self.data.len() {
            return false;
        }
        let mut owned = BytesMut::from(self.data.as_ref());
        owned[index] = value;
        self.data = owned.freeze();
        true
    }

    /// Concatenate two byte runs; a `None` side contributes `zeros` zero bytes.
    pub(crate) fn concat(front: Option<&Bytes>, back: Option<&Bytes>, zeros: usize) -> Self {
        let capacity = front.map_or(zeros, Bytes::len) + back.map_or(zeros, Bytes::len);
        let mut joined = BytesMut::with_capacity(capacity);
        for side in [front, back] {
            match side {
                Some(data) => joined.extend_from_slice(data),
                None => joined.resize(joined.len() + zeros, 0),
            }
        }
        Self {
            data: joined.freeze(),
        }
    }
}
