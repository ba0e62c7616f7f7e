//! Ordered concatenation of chunks.

use std::{collections::VecDeque, sync::Arc};

use super::{Chunk, ChunkData, ChunkIterator, merge};

/// Logical concatenation of shared elements.
///
/// Appending merges the new element into its neighbour when the pair is
/// mergeable (see [`Chunk::concat`]); nested sequences are flattened. The
/// total length is cached.
#[derive(Clone, Debug, Default)]
pub struct SequenceChunk {
    elements: VecDeque<Arc<Chunk>>,
    length: usize,
}

impl SequenceChunk {
    /// Create an empty sequence.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Number of elements.
    #[must_use]
    pub fn element_count(&self) -> usize { self.elements.len() }

    /// Borrow the element at `index`.
    #[must_use]
    pub fn element(&self, index: usize) -> Option<&Arc<Chunk>> { self.elements.get(index) }

    /// Iterate over the elements in order.
    pub fn elements(&self) -> impl DoubleEndedIterator<Item = &Arc<Chunk>> { self.elements.iter() }

    /// Iterate over `(start offset, element)` pairs.
    pub fn positions(&self) -> impl Iterator<Item = (usize, &Arc<Chunk>)> {
        self.elements.iter().scan(0, |start, element| {
            let current = *start;
            *start += element.len();
            Some((current, element))
        })
    }

    /// Total length of all elements.
    #[must_use]
    pub const fn len(&self) -> usize { self.length }

    /// Whether the sequence holds no data.
    #[must_use]
    pub const fn is_empty(&self) -> bool { self.length == 0 }

    /// Append `chunk`, merging with the last element where possible.
    pub fn push_back(&mut self, chunk: Arc<Chunk>) {
        match chunk.data() {
            ChunkData::Empty => {}
            ChunkData::Sequence(inner) => {
                for element in &inner.elements {
                    self.push_back(Arc::clone(element));
                }
            }
            _ => {
                chunk.mark_immutable();
                self.length += chunk.len();
                if let Some(last) = self.elements.back_mut()
                    && let Some(merged) = merge::try_merge(last, &chunk)
                {
                    *last = merged;
                } else {
                    self.elements.push_back(chunk);
                }
            }
        }
    }

    /// Prepend `chunk`, merging with the first element where possible.
    pub fn push_front(&mut self, chunk: Arc<Chunk>) {
        match chunk.data() {
            ChunkData::Empty => {}
            ChunkData::Sequence(inner) => {
                for element in inner.elements.iter().rev() {
                    self.push_front(Arc::clone(element));
                }
            }
            _ => {
                chunk.mark_immutable();
                self.length += chunk.len();
                if let Some(first) = self.elements.front_mut()
                    && let Some(merged) = merge::try_merge(&chunk, first)
                {
                    *first = merged;
                } else {
                    self.elements.push_front(chunk);
                }
            }
        }
    }

    /// Drop `length` bytes from the front, narrowing a partially removed
    /// element. The caller guarantees `length <= self.len()`.
    pub(crate) fn remove_front(&mut self, mut length: usize) -> Result<(), super::ChunkError> {
        while length > 0 {
            let Some(first) = self.elements.pop_front() else {
                break;
            };
            let size = first.len();
            self.length -= size;
            if size > length {
                let rest = first.peek(length, None)?;
                self.length += rest.len();
                self.elements.push_front(rest);
                break;
            }
            length -= size;
        }
        Ok(())
    }

    /// Drop `length` bytes from the back. The caller guarantees
    /// `length <= self.len()`.
    pub(crate) fn remove_back(&mut self, mut length: usize) -> Result<(), super::ChunkError> {
        while length > 0 {
            let Some(last) = self.elements.pop_back() else {
                break;
            };
            let size = last.len();
            self.length -= size;
            if size > length {
                let rest = last.peek(0, Some(size - length))?;
                self.length += rest.len();
                self.elements.push_back(rest);
                break;
            }
            length -= size;
        }
        Ok(())
    }

    /// Locate the element containing `offset`, returning its index and start.
    ///
    /// A valid iterator index is used directly; otherwise the elements are
    /// scanned.
    pub(crate) fn locate(&self, iterator: &ChunkIterator, offset: usize) -> Option<(usize, usize)> {
        if let Some(index) = iterator.index() {
            if iterator.is_forward() {
                if index < self.elements.len() && iterator.position() == offset {
                    return Some((index, offset));
                }
            } else if let Some(position) = self.elements.len().checked_sub(index + 1) {
                let element = &self.elements[position];
                let end = self.length - iterator.position();
                if let Some(start) = end.checked_sub(element.len())
                    && start <= offset
                    && offset < end
                {
                    return Some((position, start));
                }
            }
        }
        self.positions()
            .enumerate()
            .find(|(_, (start, element))| *start <= offset && offset < start + element.len())
            .map(|(index, (start, _))| (index, start))
    }

    /// Index of the element starting exactly at `position`, counted from the
    /// front, or from the back when `forward` is false.
    pub(crate) fn index_at(&self, forward: bool, position: usize) -> Option<usize> {
        let mut boundary = 0;
        let elements: Box<dyn Iterator<Item = &Arc<Chunk>>> = if forward {
            Box::new(self.elements.iter())
        } else {
            Box::new(self.elements.iter().rev())
        };
        for (index, element) in elements.enumerate() {
            if boundary == position {
                return Some(index);
            }
            boundary += element.len();
            if boundary > position {
                return None;
            }
        }
        (boundary == position).then_some(self.elements.len())
    }
}
