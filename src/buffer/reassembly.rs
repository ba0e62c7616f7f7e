//! Buffer that collects out-of-order fragments of a message of known length.

use std::sync::Arc;

use log::debug;

use super::ChunkBuffer;
use crate::chunk::{Chunk, ChunkError};

/// Collects data for `[0, expected_length)` in any order.
///
/// The message is complete once a single region spans the whole range.
#[derive(Clone, Debug, Default)]
pub struct ReassemblyBuffer {
    buffer: ChunkBuffer,
    expected_length: usize,
}

impl ReassemblyBuffer {
    /// Create an empty buffer waiting for `expected_length` bytes.
    #[must_use]
    pub fn new(expected_length: usize) -> Self {
        Self {
            buffer: ChunkBuffer::new("reassembly"),
            expected_length,
        }
    }

    /// Total length of the message being reassembled.
    #[must_use]
    pub const fn expected_length(&self) -> usize { self.expected_length }

    /// Change the total length, e.g. once the last fragment reveals it.
    pub fn set_expected_length(&mut self, expected_length: usize) { self.expected_length = expected_length; }

    /// Underlying regions.
    #[must_use]
    pub const fn buffer(&self) -> &ChunkBuffer { &self.buffer }

    /// Store a fragment at `offset`.
    ///
    /// # Errors
    ///
    /// Propagates [`ChunkBuffer::replace`] failures.
    pub fn replace(&mut self, offset: usize, chunk: Arc<Chunk>) -> Result<(), ChunkError> {
        self.buffer.replace(offset, chunk)?;
        if self.is_complete() {
            debug!("reassembly complete: {} bytes", self.expected_length);
        }
        Ok(())
    }

    /// Drop data in `length` bytes at `offset`.
    ///
    /// # Errors
    ///
    /// Propagates [`ChunkBuffer::clear`] failures.
    pub fn clear(&mut self, offset: usize, length: usize) -> Result<(), ChunkError> {
        self.buffer.clear(offset, length)
    }

    /// Whether exactly one region spans `[0, expected_length)`.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(
            self.buffer.regions(),
            [region] if region.offset() == 0 && region.len() == self.expected_length
        )
    }

    /// The reassembled message.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::IncompleteReassembly`] until
    /// [`ReassemblyBuffer::is_complete`] holds.
    pub fn reassembled_data(&self) -> Result<Arc<Chunk>, ChunkError> {
        match self.buffer.regions() {
            [region] if self.is_complete() => Ok(Arc::clone(region.data())),
            _ => Err(ChunkError::IncompleteReassembly {
                expected_length: self.expected_length,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rstest::rstest;

    use super::ReassemblyBuffer;
    use crate::chunk::{Chunk, ChunkError};

    fn bytes(length: usize) -> Arc<Chunk> { Chunk::bytes(vec![0x5a; length]).into_shared() }

    #[rstest]
    #[case(&[0, 10, 20])]
    #[case(&[20, 0, 10])]
    #[case(&[10, 20, 0])]
    fn completes_regardless_of_arrival_order(#[case] offsets: &[usize]) {
        let mut buffer = ReassemblyBuffer::new(30);
        for (index, offset) in offsets.iter().copied().enumerate() {
            assert!(!buffer.is_complete(), "complete after {index} fragments");
            buffer.replace(offset, bytes(10)).expect("fragment");
        }
        assert!(buffer.is_complete());
        let data = buffer.reassembled_data().expect("reassembled");
        assert_eq!(data.len(), 30);
        assert!(data.is_immutable());
    }

    #[test]
    fn incomplete_data_is_not_released() {
        let mut buffer = ReassemblyBuffer::new(20);
        buffer.replace(0, bytes(10)).expect("first half");
        assert!(matches!(
            buffer.reassembled_data(),
            Err(ChunkError::IncompleteReassembly { expected_length: 20 })
        ));
        buffer.set_expected_length(10);
        assert!(buffer.is_complete());
    }

    #[test]
    fn data_beyond_the_expected_length_prevents_completion() {
        let mut buffer = ReassemblyBuffer::new(10);
        buffer.replace(0, bytes(12)).expect("oversized");
        assert!(!buffer.is_complete());
        buffer.clear(10, 2).expect("trim excess");
        assert!(buffer.is_complete());
    }
}
