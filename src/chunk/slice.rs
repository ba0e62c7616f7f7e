//! Window over part of another chunk.

use std::sync::Arc;

use super::{Chunk, ChunkData};

/// An `(offset, length)` window into a shared chunk.
///
/// Slices never copy data. Slicing a slice re-targets the innermost chunk so
/// windows do not nest.
#[derive(Clone, Debug)]
pub struct SliceChunk {
    chunk: Arc<Chunk>,
    offset: usize,
    length: usize,
}

impl SliceChunk {
    /// Create a window, collapsing onto the inner chunk when `chunk` is
    /// itself a slice. The caller guarantees the window lies within `chunk`.
    pub(crate) fn new(chunk: &Arc<Chunk>, offset: usize, length: usize) -> Self {
        match chunk.data() {
            ChunkData::Slice(inner) => Self {
                chunk: Arc::clone(&inner.chunk),
                offset: inner.offset + offset,
                length,
            },
            _ => Self {
                chunk: Arc::clone(chunk),
                offset,
                length,
            },
        }
    }

    /// Build the cheapest chunk covering the window: the underlying chunk
    /// itself when the window spans it entirely, a slice otherwise.
    pub(crate) fn make(chunk: &Arc<Chunk>, offset: usize, length: usize) -> Arc<Chunk> {
        let slice = Self::new(chunk, offset, length);
        if slice.offset == 0 && slice.length == slice.chunk.len() {
            return slice.chunk;
        }
        let quality = slice.chunk.quality();
        let mut sliced = Chunk::from_data(ChunkData::Slice(slice));
        sliced.quality = quality;
        sliced.into_shared()
    }

    /// The chunk being viewed.
    #[must_use]
    pub fn chunk(&self) -> &Arc<Chunk> { &self.chunk }

    /// Start of the window within [`SliceChunk::chunk`].
    #[must_use]
    pub const fn offset(&self) -> usize { self.offset }

    /// Length of the window.
    #[must_use]
    pub const fn len(&self) -> usize { self.length }

    /// Whether the window is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool { self.length == 0 }

    /// Whether `self` ends exactly where `next` begins over the same chunk.
    pub(crate) fn is_followed_by(&self, next: &Self) -> bool {
        Arc::ptr_eq(&self.chunk, &next.chunk) && self.offset + self.length == next.offset
    }
}
