//! Offset-addressed collection of chunk regions.
//!
//! [`ChunkBuffer`] keeps regions sorted by offset, never overlapping and never
//! adjacent: writing data next to an existing region merges the two with
//! [`Chunk::concat`], and writing over existing data slices the old regions
//! down to the parts that survive.

use std::{fmt, sync::Arc};

use log::{debug, trace};

use crate::chunk::{Chunk, ChunkError, check_range};

/// A chunk stored at an absolute offset.
#[derive(Clone, Debug)]
pub struct Region {
    offset: usize,
    data: Arc<Chunk>,
}

impl Region {
    /// Start of the region.
    #[must_use]
    pub const fn offset(&self) -> usize { self.offset }

    /// Stored data.
    #[must_use]
    pub const fn data(&self) -> &Arc<Chunk> { &self.data }

    /// Length of the region.
    #[must_use]
    pub fn len(&self) -> usize { self.data.len() }

    /// Whether the region holds no data. Stored regions never are.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.data.is_empty() }

    /// End of the region, exclusive.
    #[must_use]
    pub fn end(&self) -> usize { self.offset + self.len() }
}

/// How an existing region relates to a range being overwritten or cleared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Overlap {
    /// The region lies entirely inside the range.
    Drop,
    /// The range lies strictly inside the region; both ends survive.
    Split,
    /// Only the part before the range survives.
    KeepHead,
    /// Only the part after the range survives.
    KeepTail,
}

impl Overlap {
    fn classify(region: &Region, offset: usize, end: usize) -> Self {
        match (region.offset < offset, region.end() > end) {
            (false, false) => Self::Drop,
            (true, true) => Self::Split,
            (true, false) => Self::KeepHead,
            (false, true) => Self::KeepTail,
        }
    }
}

/// Sorted, non-overlapping, non-adjacent regions of data.
///
/// # Examples
///
/// ```
/// use wirechunk::{Chunk, ChunkBuffer};
///
/// let mut buffer = ChunkBuffer::new("rx");
/// buffer.replace(0, Chunk::bytes(vec![1; 10]).into_shared()).unwrap();
/// buffer.replace(10, Chunk::bytes(vec![2; 10]).into_shared()).unwrap();
/// assert_eq!(buffer.len(), 1);
/// assert_eq!(buffer.regions()[0].len(), 20);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ChunkBuffer {
    name: String,
    regions: Vec<Region>,
}

impl ChunkBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            regions: Vec::new(),
        }
    }

    /// Name used in logs and [`fmt::Display`] output.
    #[must_use]
    pub fn name(&self) -> &str { &self.name }

    /// Number of regions.
    #[must_use]
    pub fn len(&self) -> usize { self.regions.len() }

    /// Whether the buffer holds no data.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.regions.is_empty() }

    /// Regions in offset order.
    #[must_use]
    pub fn regions(&self) -> &[Region] { &self.regions }

    /// The region at `index`, if any.
    #[must_use]
    pub fn region(&self, index: usize) -> Option<&Region> { self.regions.get(index) }

    /// Store `chunk` at `offset`, overwriting whatever was there and merging
    /// with adjacent regions.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::EmptyChunk`] for zero-length chunks,
    /// [`ChunkError::OutOfRange`] when the chunk would end past `usize::MAX`,
    /// or an error from slicing the regions being overwritten.
    pub fn replace(&mut self, offset: usize, chunk: Arc<Chunk>) -> Result<(), ChunkError> {
        if chunk.is_empty() {
            return Err(ChunkError::EmptyChunk);
        }
        let length = chunk.len();
        check_range(offset, length, usize::MAX)?;
        chunk.mark_immutable();
        trace!(
            "buffer {}: replace {length} bytes at offset {offset}",
            self.name
        );
        self.cut(offset, length)?;
        let index = self.regions.partition_point(|region| region.offset < offset);
        self.regions.insert(
            index,
            Region {
                offset,
                data: chunk,
            },
        );
        self.merge_with_next(index);
        if index > 0 {
            self.merge_with_next(index - 1);
        }
        Ok(())
    }

    /// Remove the data in `length` bytes at `offset`, keeping whatever lies
    /// outside the range.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::OutOfRange`] when the range ends past
    /// `usize::MAX`, or an error from slicing partially cleared regions.
    pub fn clear(&mut self, offset: usize, length: usize) -> Result<(), ChunkError> {
        if length == 0 {
            return Ok(());
        }
        check_range(offset, length, usize::MAX)?;
        trace!(
            "buffer {}: clear {length} bytes at offset {offset}",
            self.name
        );
        if let Some(index) = self
            .regions
            .iter()
            .position(|region| region.offset == offset && region.len() == length)
        {
            self.regions.remove(index);
            return Ok(());
        }
        self.cut(offset, length)
    }

    /// Remove every region.
    pub fn clear_all(&mut self) { self.regions.clear(); }

    /// Carve `[offset, offset + length)` out of the stored regions. The range
    /// has been checked to fit `usize`.
    fn cut(&mut self, offset: usize, length: usize) -> Result<(), ChunkError> {
        let end = offset + length;
        let first = self.regions.partition_point(|region| region.end() <= offset);
        let last = first
            + self.regions[first..]
                .iter()
                .take_while(|region| region.offset < end)
                .count();
        if first == last {
            return Ok(());
        }
        let mut survivors = Vec::with_capacity(2);
        for region in &self.regions[first..last] {
            let overlap = Overlap::classify(region, offset, end);
            trace!(
                "buffer {}: region at {} with length {} overlaps cleared range: {overlap:?}",
                self.name,
                region.offset,
                region.len()
            );
            if matches!(overlap, Overlap::Split | Overlap::KeepHead) {
                survivors.push(Region {
                    offset: region.offset,
                    data: region.data.peek(0, Some(offset - region.offset))?,
                });
            }
            if matches!(overlap, Overlap::Split | Overlap::KeepTail) {
                survivors.push(Region {
                    offset: end,
                    data: region.data.peek(end - region.offset, None)?,
                });
            }
        }
        self.regions.splice(first..last, survivors);
        Ok(())
    }

    fn merge_with_next(&mut self, index: usize) {
        let Some((current, next)) = self.regions.get(index).zip(self.regions.get(index + 1)) else {
            return;
        };
        if current.end() != next.offset {
            return;
        }
        let merged = Chunk::concat(&current.data, &next.data);
        debug!(
            "buffer {}: merged regions at {} and {} into {} bytes",
            self.name,
            current.offset,
            next.offset,
            merged.len()
        );
        self.regions[index].data = merged;
        self.regions.remove(index + 1);
    }
}

impl fmt::Display for ChunkBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkBuffer {}, regions = {}", self.name, self.regions.len())?;
        for region in &self.regions {
            write!(f, ", {{offset = {}, data = {}}}", region.offset, region.data)?;
        }
        Ok(())
    }
}
