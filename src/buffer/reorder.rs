//! Buffer that releases stream data in offset order.

use std::sync::Arc;

use log::{debug, trace};

use super::ChunkBuffer;
use crate::chunk::{Chunk, ChunkError};

/// Stores out-of-order stream segments and hands them out contiguously.
///
/// # Examples
///
/// ```
/// use wirechunk::{Chunk, ReorderBuffer};
///
/// let mut buffer = ReorderBuffer::new(1000);
/// buffer.replace(1010, Chunk::bytes(vec![2; 10]).into_shared()).unwrap();
/// assert!(buffer.pop_available_data(None).unwrap().is_none());
/// buffer.replace(1000, Chunk::bytes(vec![1; 10]).into_shared()).unwrap();
/// let data = buffer.pop_available_data(None).unwrap().unwrap();
/// assert_eq!(data.len(), 20);
/// assert_eq!(buffer.expected_offset(), 1020);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ReorderBuffer {
    buffer: ChunkBuffer,
    expected_offset: usize,
}

impl ReorderBuffer {
    /// Create an empty buffer whose next deliverable byte is `expected_offset`.
    #[must_use]
    pub fn new(expected_offset: usize) -> Self {
        Self {
            buffer: ChunkBuffer::new("reorder"),
            expected_offset,
        }
    }

    /// Offset of the next byte to deliver.
    #[must_use]
    pub const fn expected_offset(&self) -> usize { self.expected_offset }

    /// Move the delivery cursor.
    pub fn set_expected_offset(&mut self, expected_offset: usize) { self.expected_offset = expected_offset; }

    /// Underlying regions.
    #[must_use]
    pub const fn buffer(&self) -> &ChunkBuffer { &self.buffer }

    /// Store a segment at `offset`.
    ///
    /// # Errors
    ///
    /// Propagates [`ChunkBuffer::replace`] failures.
    pub fn replace(&mut self, offset: usize, chunk: Arc<Chunk>) -> Result<(), ChunkError> {
        self.buffer.replace(offset, chunk)
    }

    /// Drop data in `length` bytes at `offset`.
    ///
    /// # Errors
    ///
    /// Propagates [`ChunkBuffer::clear`] failures.
    pub fn clear(&mut self, offset: usize, length: usize) -> Result<(), ChunkError> {
        self.buffer.clear(offset, length)
    }

    /// Number of contiguous bytes available at the expected offset.
    #[must_use]
    pub fn available_data_length(&self) -> usize {
        self.buffer
            .region(0)
            .filter(|region| region.offset() == self.expected_offset)
            .map_or(0, super::Region::len)
    }

    /// Remove and return up to `max_length` contiguous bytes starting at the
    /// expected offset, advancing the offset past them.
    ///
    /// Returns `Ok(None)` without side effects when nothing starts at the
    /// expected offset or `max_length` is zero.
    ///
    /// # Errors
    ///
    /// Propagates failures from peeking or clearing the stored region.
    pub fn pop_available_data(&mut self, max_length: Option<usize>) -> Result<Option<Arc<Chunk>>, ChunkError> {
        let available = self.available_data_length();
        let length = max_length.map_or(available, |max| max.min(available));
        if length == 0 {
            trace!("reorder: nothing available at offset {}", self.expected_offset);
            return Ok(None);
        }
        let Some(region) = self.buffer.region(0) else {
            return Ok(None);
        };
        let data = region.data().peek(0, Some(length))?;
        self.buffer.clear(self.expected_offset, length)?;
        debug!(
            "reorder: popped {length} bytes at offset {}",
            self.expected_offset
        );
        self.expected_offset += length;
        Ok(Some(data))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rstest::{fixture, rstest};

    use super::ReorderBuffer;
    use crate::chunk::Chunk;

    fn bytes(length: usize) -> Arc<Chunk> { Chunk::bytes(vec![0x11; length]).into_shared() }

    #[fixture]
    fn buffer() -> ReorderBuffer { ReorderBuffer::new(1000) }

    #[rstest]
    fn pops_data_at_the_expected_offset(mut buffer: ReorderBuffer) {
        buffer.replace(1000, bytes(10)).expect("segment");
        let data = buffer
            .pop_available_data(None)
            .expect("pop")
            .expect("data available");
        assert_eq!(data.len(), 10);
        assert_eq!(buffer.expected_offset(), 1010);
        assert!(buffer.buffer().is_empty());
    }

    #[rstest]
    fn out_of_order_segments_are_released_together(mut buffer: ReorderBuffer) {
        buffer.replace(1020, bytes(10)).expect("third");
        buffer.replace(1000, bytes(10)).expect("first");
        buffer.replace(1010, bytes(10)).expect("second");
        let data = buffer
            .pop_available_data(None)
            .expect("pop")
            .expect("data available");
        assert_eq!(data.len(), 30);
        assert_eq!(buffer.expected_offset(), 1030);
    }

    #[rstest]
    fn gaps_block_delivery(mut buffer: ReorderBuffer) {
        buffer.replace(1005, bytes(10)).expect("late segment");
        assert_eq!(buffer.available_data_length(), 0);
        assert!(buffer.pop_available_data(None).expect("pop").is_none());
        assert_eq!(buffer.expected_offset(), 1000);
        assert_eq!(buffer.buffer().len(), 1);
    }

    #[rstest]
    #[case(Some(4), 4, 1004)]
    #[case(Some(40), 10, 1010)]
    #[case(Some(0), 0, 1000)]
    fn max_length_bounds_the_pop(
        mut buffer: ReorderBuffer,
        #[case] max_length: Option<usize>,
        #[case] popped: usize,
        #[case] expected_offset: usize,
    ) {
        buffer.replace(1000, bytes(10)).expect("segment");
        let data = buffer.pop_available_data(max_length).expect("pop");
        assert_eq!(data.map_or(0, |data| data.len()), popped);
        assert_eq!(buffer.expected_offset(), expected_offset);
        assert_eq!(buffer.available_data_length(), 10 - popped);
    }
}
