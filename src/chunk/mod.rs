//! Immutable, structurally shared packet data.
//!
//! A [`Chunk`] is one of a closed set of representations ([`ChunkData`]):
//! placeholders, explicit bytes, windows into other chunks, sequences and
//! structured protocol fields. Chunks are shared through `Arc` once sealed
//! with [`Chunk::mark_immutable`]; the only way to change shared data is to
//! clone it first with [`Chunk::dup_shared`].
//!
//! Reading a part of a chunk goes through [`Chunk::peek`] (any
//! representation) or [`Chunk::peek_as`] (a specific [`ChunkType`]), both of
//! which prefer reusing existing chunks over building new ones.

mod count;
pub mod error;
mod fields;
mod flags;
mod iterator;
mod merge;
mod peek;
mod raw;
mod sequence;
mod slice;

use std::{fmt, sync::Arc};

use bytes::Bytes;
pub use count::ByteCountChunk;
pub use error::{ChunkError, QualityMarker};
pub use fields::{DynFields, FieldsChunk, FieldsData};
pub use flags::DataQuality;
use flags::SealFlag;
pub use iterator::{ChunkIterator, Direction};
pub use peek::{ChunkType, Conversion, PeekFlags};
pub use raw::BytesChunk;
pub use sequence::SequenceChunk;
pub use slice::SliceChunk;

/// The representation held by a [`Chunk`].
#[derive(Clone, Debug)]
pub enum ChunkData {
    /// No data at all.
    Empty,
    /// Length-only placeholder.
    ByteCount(ByteCountChunk),
    /// Explicit bytes.
    Bytes(BytesChunk),
    /// Window into another chunk.
    Slice(SliceChunk),
    /// Concatenation of other chunks.
    Sequence(SequenceChunk),
    /// Structured protocol fields.
    Fields(FieldsData),
}

/// A unit of packet data plus its mutability and data-quality state.
#[derive(Clone, Debug)]
pub struct Chunk {
    sealed: SealFlag,
    quality: DataQuality,
    data: ChunkData,
}

impl Chunk {
    pub(crate) fn from_data(data: ChunkData) -> Self {
        Self {
            sealed: SealFlag::default(),
            quality: DataQuality::GOOD,
            data,
        }
    }

    /// A zero-length chunk.
    #[must_use]
    pub fn empty() -> Self { Self::from_data(ChunkData::Empty) }

    /// A placeholder for `length` bytes of irrelevant content.
    #[must_use]
    pub fn byte_count(length: usize) -> Self {
        Self::from_data(ChunkData::ByteCount(ByteCountChunk::new(length)))
    }

    /// A chunk holding `data`.
    #[must_use]
    pub fn bytes(data: impl Into<Bytes>) -> Self {
        Self::from_data(ChunkData::Bytes(BytesChunk::new(data)))
    }

    /// A window of `length` bytes at `offset` into `chunk`.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::OutOfRange`] when the window exceeds `chunk`.
    pub fn slice(chunk: &Arc<Chunk>, offset: usize, length: usize) -> Result<Self, ChunkError> {
        check_range(offset, length, chunk.len())?;
        chunk.mark_immutable();
        Ok(Self::from_data(ChunkData::Slice(SliceChunk::new(
            chunk, offset, length,
        ))))
    }

    /// A sequence of `elements` in order.
    #[must_use]
    pub fn sequence(elements: impl IntoIterator<Item = Arc<Chunk>>) -> Self {
        let mut sequence = SequenceChunk::new();
        for element in elements {
            sequence.push_back(element);
        }
        Self::from_data(ChunkData::Sequence(sequence))
    }

    /// Shared concatenation of `parts`. A sole remaining part is returned
    /// as the same allocation.
    pub(crate) fn assemble(parts: impl IntoIterator<Item = Arc<Chunk>>) -> Arc<Chunk> {
        let mut sequence = SequenceChunk::new();
        for part in parts {
            sequence.push_back(part);
        }
        match sequence.element_count() {
            0 => Self::empty().into_shared(),
            1 => sequence
                .element(0)
                .map_or_else(|| Self::empty().into_shared(), Arc::clone),
            _ => Self::from_data(ChunkData::Sequence(sequence)).into_shared(),
        }
    }

    /// A structured chunk holding `value`.
    #[must_use]
    pub fn fields<T: FieldsChunk>(value: T) -> Self {
        let length = value.chunk_length();
        Self::from_boxed_fields(Box::new(value), length)
    }

    pub(crate) fn from_boxed_fields(value: Box<dyn DynFields>, length: usize) -> Self {
        Self::from_data(ChunkData::Fields(FieldsData::new(value, length)))
    }

    /// Seal the chunk and move it behind an `Arc`.
    #[must_use]
    pub fn into_shared(self) -> Arc<Self> {
        self.mark_immutable();
        Arc::new(self)
    }

    /// Borrow the representation.
    #[must_use]
    pub const fn data(&self) -> &ChunkData { &self.data }

    /// Length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.data {
            ChunkData::Empty => 0,
            ChunkData::ByteCount(count) => count.len(),
            ChunkData::Bytes(bytes) => bytes.len(),
            ChunkData::Slice(slice) => slice.len(),
            ChunkData::Sequence(sequence) => sequence.len(),
            ChunkData::Fields(fields) => fields.len(),
        }
    }

    /// Whether the chunk covers no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Short name of the representation.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match &self.data {
            ChunkData::Empty => "EmptyChunk",
            ChunkData::ByteCount(_) => "ByteCountChunk",
            ChunkData::Bytes(_) => "BytesChunk",
            ChunkData::Slice(_) => "SliceChunk",
            ChunkData::Sequence(_) => "SequenceChunk",
            ChunkData::Fields(fields) => fields.type_name(),
        }
    }

    /// Downcast a fields chunk to `T`.
    #[must_use]
    pub fn as_fields<T: FieldsChunk>(&self) -> Option<&T> {
        match &self.data {
            ChunkData::Fields(fields) => fields.downcast::<T>(),
            _ => None,
        }
    }

    /// Borrow the bytes of a bytes chunk.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match &self.data {
            ChunkData::Bytes(bytes) => Some(bytes.bytes()),
            _ => None,
        }
    }

    /// Whether the content is made only of explicit bytes, so converting it
    /// to a fields chunk is plain parsing rather than a re-serialization.
    #[must_use]
    pub fn is_raw(&self) -> bool {
        match &self.data {
            ChunkData::Bytes(_) => true,
            ChunkData::Slice(slice) => slice.chunk().is_raw(),
            ChunkData::Sequence(sequence) => sequence.elements().all(|element| element.is_raw()),
            ChunkData::Empty | ChunkData::ByteCount(_) | ChunkData::Fields(_) => false,
        }
    }

    /// Whether the chunk has been sealed.
    #[must_use]
    pub fn is_immutable(&self) -> bool { self.sealed.is_set() }

    /// Whether the chunk can still be changed.
    #[must_use]
    pub fn is_mutable(&self) -> bool { !self.is_immutable() }

    /// Seal the chunk. There is no way back other than cloning.
    pub fn mark_immutable(&self) { self.sealed.set(); }

    fn check_mutable(&self) -> Result<(), ChunkError> {
        if self.is_immutable() {
            return Err(ChunkError::Immutable);
        }
        Ok(())
    }

    /// Data-quality markers, including those of sequence elements.
    #[must_use]
    pub fn quality(&self) -> DataQuality {
        match &self.data {
            ChunkData::Sequence(sequence) => sequence
                .elements()
                .fold(self.quality, |quality, element| quality.union(element.quality())),
            _ => self.quality,
        }
    }

    /// Whether the chunk holds all the data it describes.
    #[must_use]
    pub fn is_complete(&self) -> bool { !self.quality().is_incomplete() }

    /// Whether the chunk is missing data.
    #[must_use]
    pub fn is_incomplete(&self) -> bool { self.quality().is_incomplete() }

    /// Whether the content passed validation.
    #[must_use]
    pub fn is_correct(&self) -> bool { !self.quality().is_incorrect() }

    /// Whether the content failed validation.
    #[must_use]
    pub fn is_incorrect(&self) -> bool { self.quality().is_incorrect() }

    /// Whether the chunk faithfully represents its bytes.
    #[must_use]
    pub fn is_properly_represented(&self) -> bool { !self.quality().is_improperly_represented() }

    /// Whether the chunk cannot faithfully represent its bytes.
    #[must_use]
    pub fn is_improperly_represented(&self) -> bool { self.quality().is_improperly_represented() }

    /// Mark the chunk incomplete.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::Immutable`] when the chunk is sealed.
    pub fn mark_incomplete(&mut self) -> Result<(), ChunkError> {
        self.check_mutable()?;
        self.quality = self.quality.with_incomplete();
        Ok(())
    }

    /// Mark the chunk incorrect.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::Immutable`] when the chunk is sealed.
    pub fn mark_incorrect(&mut self) -> Result<(), ChunkError> {
        self.check_mutable()?;
        self.quality = self.quality.with_incorrect();
        Ok(())
    }

    /// Mark the chunk improperly represented.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::Immutable`] when the chunk is sealed.
    pub fn mark_improperly_represented(&mut self) -> Result<(), ChunkError> {
        self.check_mutable()?;
        self.quality = self.quality.with_improperly_represented();
        Ok(())
    }

    pub(crate) fn set_quality(&mut self, quality: DataQuality) { self.quality = quality; }

    /// Clone into a mutable chunk. Underlying shared chunks stay shared.
    #[must_use]
    pub fn dup_shared(&self) -> Self {
        let mut copy = self.clone();
        copy.sealed.clear();
        copy
    }

    /// Take a mutable chunk out of `chunk`, reusing the allocation when no
    /// other owner exists and cloning otherwise.
    #[must_use]
    pub fn make_exclusively_owned_mutable(chunk: Arc<Chunk>) -> Self {
        match Arc::try_unwrap(chunk) {
            Ok(mut owned) => {
                owned.sealed.clear();
                owned
            }
            Err(shared) => shared.dup_shared(),
        }
    }

    /// Concatenate two chunks into the most compact representation.
    #[must_use]
    pub fn concat(front: &Arc<Chunk>, back: &Arc<Chunk>) -> Arc<Chunk> { merge::concat(front, back) }

    /// Replace the content of a bytes chunk.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::Immutable`] when sealed, or
    /// [`ChunkError::WrongVariant`] when this is not a bytes chunk.
    pub fn set_bytes(&mut self, data: impl Into<Bytes>) -> Result<(), ChunkError> {
        self.check_mutable()?;
        let found = self.kind_name();
        match &mut self.data {
            ChunkData::Bytes(bytes) => {
                bytes.set_bytes(data.into());
                Ok(())
            }
            _ => Err(wrong_variant("BytesChunk", found)),
        }
    }

    /// Overwrite one byte of a bytes chunk.
    ///
    /// # Errors
    ///
    /// Fails when sealed, when this is not a bytes chunk, or when `index` is
    /// out of range.
    pub fn set_byte(&mut self, index: usize, value: u8) -> Result<(), ChunkError> {
        self.check_mutable()?;
        let length = self.len();
        let found = self.kind_name();
        match &mut self.data {
            ChunkData::Bytes(bytes) => {
                if bytes.set_byte(index, value) {
                    Ok(())
                } else {
                    Err(ChunkError::out_of_range(index, 1, length))
                }
            }
            _ => Err(wrong_variant("BytesChunk", found)),
        }
    }

    /// Change the length of a byte-count chunk.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::Immutable`] when sealed, or
    /// [`ChunkError::WrongVariant`] when this is not a byte-count chunk.
    pub fn set_length(&mut self, length: usize) -> Result<(), ChunkError> {
        self.check_mutable()?;
        let found = self.kind_name();
        match &mut self.data {
            ChunkData::ByteCount(count) => {
                count.set_len(length);
                Ok(())
            }
            _ => Err(wrong_variant("ByteCountChunk", found)),
        }
    }

    /// Change the value of a fields chunk, dropping its serialized cache.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::Immutable`] when sealed, or
    /// [`ChunkError::WrongVariant`] when the chunk does not hold a `T`.
    pub fn update_fields<T: FieldsChunk>(
        &mut self,
        update: impl FnOnce(&mut T),
    ) -> Result<(), ChunkError> {
        self.check_mutable()?;
        let updated = match &mut self.data {
            ChunkData::Fields(fields) => fields.update(update),
            _ => false,
        };
        if updated {
            Ok(())
        } else {
            Err(wrong_variant(std::any::type_name::<T>(), self.kind_name()))
        }
    }

    /// Append `chunk` to this mutable chunk, merging where possible and
    /// turning the chunk into a sequence otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::Immutable`] when sealed.
    pub fn insert_at_back(&mut self, chunk: Arc<Chunk>) -> Result<(), ChunkError> {
        self.check_mutable()?;
        self.splice(|sequence| sequence.push_back(chunk));
        Ok(())
    }

    /// Prepend `chunk` to this mutable chunk.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::Immutable`] when sealed.
    pub fn insert_at_front(&mut self, chunk: Arc<Chunk>) -> Result<(), ChunkError> {
        self.check_mutable()?;
        self.splice(|sequence| sequence.push_front(chunk));
        Ok(())
    }

    /// Drop `length` bytes from the front of this mutable chunk.
    ///
    /// # Errors
    ///
    /// Fails when sealed or when `length` exceeds the chunk.
    pub fn remove_at_front(&mut self, length: usize) -> Result<(), ChunkError> {
        self.check_mutable()?;
        check_range(0, length, self.len())?;
        let mut outcome = Ok(());
        self.splice(|sequence| outcome = sequence.remove_front(length));
        outcome
    }

    /// Drop `length` bytes from the back of this mutable chunk.
    ///
    /// # Errors
    ///
    /// Fails when sealed or when `length` exceeds the chunk.
    pub fn remove_at_back(&mut self, length: usize) -> Result<(), ChunkError> {
        self.check_mutable()?;
        check_range(0, length, self.len())?;
        let mut outcome = Ok(());
        self.splice(|sequence| outcome = sequence.remove_back(length));
        outcome
    }

    /// Run `edit` on the content viewed as a sequence, then store the most
    /// compact result back.
    fn splice(&mut self, edit: impl FnOnce(&mut SequenceChunk)) {
        let quality = self.quality;
        let current = std::mem::replace(&mut self.data, ChunkData::Empty);
        let mut sequence = match current {
            ChunkData::Sequence(sequence) => sequence,
            other => {
                let mut wrapped = SequenceChunk::new();
                let mut previous = Chunk::from_data(other);
                previous.quality = quality;
                wrapped.push_back(previous.into_shared());
                wrapped
            }
        };
        edit(&mut sequence);
        self.data = match sequence.element_count() {
            0 => ChunkData::Empty,
            1 => match sequence.element(0) {
                Some(only) => {
                    self.quality = self.quality.union(only.quality());
                    only.data().clone()
                }
                None => ChunkData::Empty,
            },
            _ => ChunkData::Sequence(sequence),
        };
    }

    /// Untyped peek: the cheapest chunk covering `length` bytes at `offset`
    /// (the remainder when `length` is `None`).
    ///
    /// Returns the chunk itself for a full-range peek, an existing sequence
    /// element when the range matches one, a narrowed bytes or byte-count
    /// chunk, a shorter sequence for ranges spanning several elements, and a
    /// slice otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::OutOfRange`] when the range exceeds the chunk
    /// and [`ChunkError::Empty`] for zero-length ranges.
    pub fn peek(self: &Arc<Self>, offset: usize, length: Option<usize>) -> Result<Arc<Chunk>, ChunkError> {
        let total = self.len();
        if offset > total {
            return Err(ChunkError::out_of_range(offset, length.unwrap_or(0), total));
        }
        let length = length.unwrap_or(total - offset);
        check_range(offset, length, total)?;
        if length == 0 {
            return Err(ChunkError::Empty("peeked range"));
        }
        self.mark_immutable();
        let iterator = ChunkIterator::forward(offset);
        let chunk = match self.find_unchecked(&|_: &Chunk| true, &iterator, Some(length), length) {
            Some(found) => found,
            None => self.convert_untyped(offset, length)?,
        };
        chunk.mark_immutable();
        Ok(chunk)
    }

    /// Build a new chunk for a range no existing chunk covers: a shorter
    /// sequence for sequences, a slice for everything else.
    pub(crate) fn convert_untyped(self: &Arc<Self>, offset: usize, length: usize) -> Result<Arc<Chunk>, ChunkError> {
        let ChunkData::Sequence(sequence) = &self.data else {
            return Ok(SliceChunk::make(self, offset, length));
        };
        let end = offset + length;
        let mut shorter = SequenceChunk::new();
        for (start, element) in sequence.positions() {
            let element_end = start + element.len();
            if element_end <= offset {
                continue;
            }
            if start >= end {
                break;
            }
            let from = offset.max(start) - start;
            let to = end.min(element_end) - start;
            shorter.push_back(element.peek(from, Some(to - from))?);
        }
        if shorter.element_count() == 1
            && let Some(only) = shorter.element(0)
        {
            return Ok(Arc::clone(only));
        }
        Ok(Chunk::from_data(ChunkData::Sequence(shorter)).into_shared())
    }

    /// Advance `iterator` by `length` bytes, keeping the element index when
    /// the move steps over exactly one sequence element.
    pub fn move_iterator(&self, iterator: &mut ChunkIterator, length: usize) {
        let position = iterator.position() + length;
        let index = match &self.data {
            ChunkData::Sequence(sequence) => {
                if position == sequence.len() {
                    Some(sequence.element_count())
                } else {
                    iterator.index().and_then(|index| {
                        let element = if iterator.is_forward() {
                            sequence.element(index)
                        } else {
                            sequence
                                .element_count()
                                .checked_sub(index + 1)
                                .and_then(|position| sequence.element(position))
                        };
                        element
                            .filter(|element| element.len() == length)
                            .map(|_| index + 1)
                    })
                }
            }
            _ => None,
        };
        iterator.set(position, index);
    }

    /// Move `iterator` to `position`, recomputing the element index.
    pub fn seek_iterator(&self, iterator: &mut ChunkIterator, position: usize) {
        let index = match &self.data {
            ChunkData::Sequence(sequence) => sequence.index_at(iterator.is_forward(), position),
            _ => None,
        };
        iterator.set(position, index);
    }
}

const fn wrong_variant(expected: &'static str, found: &'static str) -> ChunkError {
    ChunkError::WrongVariant { expected, found }
}

pub(crate) fn check_range(offset: usize, length: usize, available: usize) -> Result<(), ChunkError> {
    match offset.checked_add(length) {
        Some(end) if end <= available => Ok(()),
        _ => Err(ChunkError::out_of_range(offset, length, available)),
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, length = {} B", self.kind_name(), self.len())?;
        match &self.data {
            ChunkData::Bytes(bytes) => {
                write!(f, ", bytes = {{")?;
                for (index, byte) in bytes.bytes().iter().take(16).enumerate() {
                    if index > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{byte:02X}")?;
                }
                if bytes.len() > 16 {
                    f.write_str(" ...")?;
                }
                f.write_str("}")?;
            }
            ChunkData::Slice(slice) => {
                write!(f, ", offset = {}, chunk = {{{}}}", slice.offset(), slice.chunk())?;
            }
            ChunkData::Sequence(sequence) => {
                f.write_str(", elements = [")?;
                for (index, element) in sequence.elements().enumerate() {
                    if index > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{element}")?;
                }
                f.write_str("]")?;
            }
            ChunkData::Fields(fields) => write!(f, ", value = {:?}", fields.value())?,
            ChunkData::Empty | ChunkData::ByteCount(_) => {}
        }
        for marker in self.quality().markers() {
            write!(f, ", {marker}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
