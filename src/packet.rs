//! Packets: sealed content plus front and back cursors and metadata.
//!
//! Protocol layers consume headers from the front and trailers from the back
//! of the data region by moving cursors over the content, never copying it.
//! Every edit builds a new sealed content chunk out of peeks of the old one,
//! so clones of a packet never observe each other's changes.

use std::{fmt, sync::Arc};

use log::trace;

use crate::{
    chunk::{BytesChunk, Chunk, ChunkError, ChunkIterator, ChunkType, PeekFlags, check_range},
    error::Result,
    serializer::SerializerRegistry,
    tag::{RegionTag, RegionTagSet, Tag, TagError, TagSet},
};

/// A named unit of transmitted data.
///
/// The data region is `[front_offset, back_offset)` of the content; bytes
/// before and after it have been popped by the layers that processed the
/// packet so far.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use wirechunk::{BytesChunk, Chunk, Packet, SerializerRegistry};
///
/// let mut packet = Packet::new("ping", Arc::new(SerializerRegistry::new()));
/// packet.insert_at_back(Chunk::bytes(vec![1, 2, 3, 4]).into_shared()).unwrap();
/// let head = packet.pop_at_front::<BytesChunk>(Some(1)).unwrap();
/// assert_eq!(head.as_bytes().unwrap().as_ref(), &[1]);
/// assert_eq!(packet.data_length(), 3);
/// ```
#[derive(Clone)]
pub struct Packet {
    name: String,
    registry: Arc<SerializerRegistry>,
    content: Arc<Chunk>,
    front: ChunkIterator,
    back: ChunkIterator,
    tags: TagSet,
    region_tags: RegionTagSet,
}

/// Signed distance region tags move by when `length` bytes are inserted or
/// erased, if representable.
fn tag_shift(length: usize) -> Option<isize> { isize::try_from(length).ok() }

impl Packet {
    /// Create an empty packet.
    #[must_use]
    pub fn new(name: impl Into<String>, registry: Arc<SerializerRegistry>) -> Self {
        Self::with_content(name, registry, Chunk::empty().into_shared())
    }

    /// Create a packet holding `content`, which is sealed.
    #[must_use]
    pub fn with_content(name: impl Into<String>, registry: Arc<SerializerRegistry>, content: Arc<Chunk>) -> Self {
        content.mark_immutable();
        Self {
            name: name.into(),
            registry,
            content,
            front: ChunkIterator::forward(0),
            back: ChunkIterator::backward(0),
            tags: TagSet::default(),
            region_tags: RegionTagSet::default(),
        }
    }

    /// Packet name.
    #[must_use]
    pub fn name(&self) -> &str { &self.name }

    /// Rename the packet.
    pub fn set_name(&mut self, name: impl Into<String>) { self.name = name.into(); }

    /// Registry used for typed peeks.
    #[must_use]
    pub const fn registry(&self) -> &Arc<SerializerRegistry> { &self.registry }

    /// The whole content, including popped parts.
    #[must_use]
    pub const fn content(&self) -> &Arc<Chunk> { &self.content }

    /// Length of the whole content.
    #[must_use]
    pub fn total_length(&self) -> usize { self.content.len() }

    /// Start of the data region.
    #[must_use]
    pub const fn front_offset(&self) -> usize { self.front.position() }

    /// End of the data region, exclusive.
    #[must_use]
    pub fn back_offset(&self) -> usize { self.total_length().saturating_sub(self.back.position()) }

    /// Length of the data region.
    #[must_use]
    pub fn data_length(&self) -> usize { self.back_offset().saturating_sub(self.front_offset()) }

    /// Move the start of the data region.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::OutOfRange`] if `offset` lies beyond the back
    /// offset.
    pub fn set_front_offset(&mut self, offset: usize) -> Result<(), ChunkError> {
        check_range(offset, 0, self.back_offset())?;
        self.content.seek_iterator(&mut self.front, offset);
        Ok(())
    }

    /// Move the end of the data region.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::OutOfRange`] if `offset` lies before the front
    /// offset or beyond the content.
    pub fn set_back_offset(&mut self, offset: usize) -> Result<(), ChunkError> {
        let total = self.total_length();
        let front = self.front_offset();
        if offset < front {
            return Err(ChunkError::out_of_range(offset, 0, front));
        }
        check_range(offset, 0, total)?;
        self.content.seek_iterator(&mut self.back, total - offset);
        Ok(())
    }

    /// Peek a `T` at the front of the data region.
    ///
    /// # Errors
    ///
    /// See [`Chunk::peek_as`].
    pub fn peek_at_front<T: ChunkType>(&self, length: Option<usize>) -> Result<Arc<Chunk>, ChunkError> {
        self.peek_at_front_with::<T>(length, PeekFlags::default())
    }

    /// [`Packet::peek_at_front`] with explicit flags.
    ///
    /// # Errors
    ///
    /// See [`Chunk::peek_as`].
    pub fn peek_at_front_with<T: ChunkType>(
        &self,
        length: Option<usize>,
        flags: PeekFlags,
    ) -> Result<Arc<Chunk>, ChunkError> {
        self.content
            .peek_bounded::<T>(&self.registry, &self.front, length, self.data_length(), flags)
    }

    /// Peek a `T` at the back of the data region. Without a length the
    /// whole data region is interpreted; structured fields need an explicit
    /// length since their start cannot be found from the back.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::LengthRequired`] for a fields type without a
    /// length, otherwise see [`Chunk::peek_as`].
    pub fn peek_at_back<T: ChunkType>(&self, length: Option<usize>) -> Result<Arc<Chunk>, ChunkError> {
        self.peek_at_back_with::<T>(length, PeekFlags::default())
    }

    /// [`Packet::peek_at_back`] with explicit flags.
    ///
    /// # Errors
    ///
    /// See [`Chunk::peek_as`].
    pub fn peek_at_back_with<T: ChunkType>(
        &self,
        length: Option<usize>,
        flags: PeekFlags,
    ) -> Result<Arc<Chunk>, ChunkError> {
        let data_length = self.data_length();
        let length = length.or_else(|| (!T::is_self_delimiting()).then_some(data_length));
        self.content
            .peek_bounded::<T>(&self.registry, &self.back, length, data_length, flags)
    }

    /// Peek the whole data region as a `T`.
    ///
    /// # Errors
    ///
    /// See [`Chunk::peek_as`].
    pub fn peek_data<T: ChunkType>(&self) -> Result<Arc<Chunk>, ChunkError> { self.peek_data_with::<T>(PeekFlags::default()) }

    /// [`Packet::peek_data`] with explicit flags.
    ///
    /// # Errors
    ///
    /// See [`Chunk::peek_as`].
    pub fn peek_data_with<T: ChunkType>(&self, flags: PeekFlags) -> Result<Arc<Chunk>, ChunkError> {
        let data_length = self.data_length();
        self.content
            .peek_bounded::<T>(&self.registry, &self.front, Some(data_length), data_length, flags)
    }

    /// Peek a `T` at `offset` relative to the start of the data region.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::OutOfRange`] if `offset` lies beyond the data
    /// region, otherwise see [`Chunk::peek_as`].
    pub fn peek_data_at<T: ChunkType>(&self, offset: usize, length: Option<usize>) -> Result<Arc<Chunk>, ChunkError> {
        self.peek_data_at_with::<T>(offset, length, PeekFlags::default())
    }

    /// [`Packet::peek_data_at`] with explicit flags.
    ///
    /// # Errors
    ///
    /// See [`Packet::peek_data_at`].
    pub fn peek_data_at_with<T: ChunkType>(
        &self,
        offset: usize,
        length: Option<usize>,
        flags: PeekFlags,
    ) -> Result<Arc<Chunk>, ChunkError> {
        let data_length = self.data_length();
        check_range(offset, 0, data_length)?;
        let iterator = self.iterator_at(self.front_offset() + offset);
        self.content
            .peek_bounded::<T>(&self.registry, &iterator, length, data_length - offset, flags)
    }

    /// Peek a `T` at an absolute content offset, ignoring the data region.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::OutOfRange`] if `offset` lies beyond the content,
    /// otherwise see [`Chunk::peek_as`].
    pub fn peek_at<T: ChunkType>(&self, offset: usize, length: Option<usize>) -> Result<Arc<Chunk>, ChunkError> {
        self.peek_at_with::<T>(offset, length, PeekFlags::default())
    }

    /// [`Packet::peek_at`] with explicit flags.
    ///
    /// # Errors
    ///
    /// See [`Packet::peek_at`].
    pub fn peek_at_with<T: ChunkType>(
        &self,
        offset: usize,
        length: Option<usize>,
        flags: PeekFlags,
    ) -> Result<Arc<Chunk>, ChunkError> {
        let total = self.total_length();
        check_range(offset, 0, total)?;
        let iterator = self.iterator_at(offset);
        self.content
            .peek_bounded::<T>(&self.registry, &iterator, length, total - offset, flags)
    }

    /// Peek the whole content as a `T`.
    ///
    /// # Errors
    ///
    /// See [`Chunk::peek_as`].
    pub fn peek_all<T: ChunkType>(&self) -> Result<Arc<Chunk>, ChunkError> { self.peek_all_with::<T>(PeekFlags::default()) }

    /// [`Packet::peek_all`] with explicit flags.
    ///
    /// # Errors
    ///
    /// See [`Chunk::peek_as`].
    pub fn peek_all_with<T: ChunkType>(&self, flags: PeekFlags) -> Result<Arc<Chunk>, ChunkError> {
        self.peek_at_with::<T>(0, Some(self.total_length()), flags)
    }

    /// The data region as a bytes chunk.
    ///
    /// # Errors
    ///
    /// See [`Chunk::peek_as`].
    pub fn peek_data_as_bytes(&self) -> Result<Arc<Chunk>, ChunkError> { self.peek_data::<BytesChunk>() }

    /// The whole content as a bytes chunk.
    ///
    /// # Errors
    ///
    /// See [`Chunk::peek_as`].
    pub fn peek_all_as_bytes(&self) -> Result<Arc<Chunk>, ChunkError> { self.peek_all::<BytesChunk>() }

    /// Whether a complete `T` can be peeked at the front.
    ///
    /// Returns `Ok(false)` when the data region is too short or the peeked
    /// `T` is incomplete.
    ///
    /// # Errors
    ///
    /// Propagates peek failures other than running out of data.
    pub fn has_at_front<T: ChunkType>(&self, length: Option<usize>) -> Result<bool, ChunkError> {
        if !self.can_hold(length) {
            return Ok(false);
        }
        let chunk = self.peek_at_front_with::<T>(length, PeekFlags::default().allow_incomplete())?;
        Ok(chunk.is_complete())
    }

    /// Whether a complete `T` can be peeked at the back.
    ///
    /// # Errors
    ///
    /// Propagates peek failures other than running out of data.
    pub fn has_at_back<T: ChunkType>(&self, length: Option<usize>) -> Result<bool, ChunkError> {
        if !self.can_hold(length) {
            return Ok(false);
        }
        let chunk = self.peek_at_back_with::<T>(length, PeekFlags::default().allow_incomplete())?;
        Ok(chunk.is_complete())
    }

    fn can_hold(&self, length: Option<usize>) -> bool {
        let data_length = self.data_length();
        data_length > 0 && length.is_none_or(|length| length > 0 && length <= data_length)
    }

    /// Peek a `T` at the front and move the front offset past it.
    ///
    /// # Errors
    ///
    /// See [`Chunk::peek_as`].
    pub fn pop_at_front<T: ChunkType>(&mut self, length: Option<usize>) -> Result<Arc<Chunk>, ChunkError> {
        self.pop_at_front_with::<T>(length, PeekFlags::default())
    }

    /// [`Packet::pop_at_front`] with explicit flags.
    ///
    /// # Errors
    ///
    /// See [`Chunk::peek_as`].
    pub fn pop_at_front_with<T: ChunkType>(
        &mut self,
        length: Option<usize>,
        flags: PeekFlags,
    ) -> Result<Arc<Chunk>, ChunkError> {
        let chunk = self.peek_at_front_with::<T>(length, flags)?;
        self.content.move_iterator(&mut self.front, chunk.len());
        Ok(chunk)
    }

    /// Peek a `T` at the back and move the back offset before it.
    ///
    /// # Errors
    ///
    /// See [`Chunk::peek_as`].
    pub fn pop_at_back<T: ChunkType>(&mut self, length: Option<usize>) -> Result<Arc<Chunk>, ChunkError> {
        self.pop_at_back_with::<T>(length, PeekFlags::default())
    }

    /// [`Packet::pop_at_back`] with explicit flags.
    ///
    /// # Errors
    ///
    /// See [`Chunk::peek_as`].
    pub fn pop_at_back_with<T: ChunkType>(
        &mut self,
        length: Option<usize>,
        flags: PeekFlags,
    ) -> Result<Arc<Chunk>, ChunkError> {
        let chunk = self.peek_at_back_with::<T>(length, flags)?;
        self.content.move_iterator(&mut self.back, chunk.len());
        Ok(chunk)
    }

    /// Insert `chunk` at the start of the data region.
    ///
    /// # Errors
    ///
    /// See [`Packet::insert_at`].
    pub fn insert_at_front(&mut self, chunk: Arc<Chunk>) -> Result<(), ChunkError> {
        self.insert_at(self.front_offset(), chunk)
    }

    /// Insert `chunk` at the end of the data region.
    ///
    /// # Errors
    ///
    /// See [`Packet::insert_at`].
    pub fn insert_at_back(&mut self, chunk: Arc<Chunk>) -> Result<(), ChunkError> {
        self.insert_at(self.back_offset(), chunk)
    }

    /// Insert `chunk` at content `offset`, which must lie in the data
    /// region. Region tags at and after `offset` move along.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::EmptyChunk`] for zero-length chunks and
    /// [`ChunkError::OutOfRange`] when `offset` is outside the data region.
    pub fn insert_at(&mut self, offset: usize, chunk: Arc<Chunk>) -> Result<(), ChunkError> {
        if chunk.is_empty() {
            return Err(ChunkError::EmptyChunk);
        }
        let front = self.front_offset();
        if offset < front {
            return Err(ChunkError::out_of_range(offset, chunk.len(), front));
        }
        check_range(offset, 0, self.back_offset())?;
        let length = chunk.len();
        let total = self.total_length();
        let shift = tag_shift(length)
            .filter(|_| total.checked_add(length).is_some())
            .ok_or(ChunkError::out_of_range(offset, length, total))?;
        let mut parts = Vec::with_capacity(3);
        if offset > 0 {
            parts.push(self.content.peek(0, Some(offset))?);
        }
        parts.push(chunk);
        if offset < total {
            parts.push(self.content.peek(offset, None)?);
        }
        trace!("packet {}: inserted {length} bytes at offset {offset}", self.name);
        self.replace_content(Chunk::assemble(parts), front, self.back.position());
        self.region_tags.split_at(offset);
        self.region_tags.move_tags(offset, shift);
        Ok(())
    }

    /// Erase `length` bytes at content `offset`, which must lie in the data
    /// region. Region tags in the range are dropped and later ones move back.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::OutOfRange`] when the range leaves the data
    /// region.
    pub fn erase_at(&mut self, offset: usize, length: usize) -> Result<(), ChunkError> {
        let front = self.front_offset();
        if offset < front {
            return Err(ChunkError::out_of_range(offset, length, front));
        }
        check_range(offset, length, self.back_offset())?;
        self.erase_range(offset, length, front, self.back.position())
    }

    /// Erase `length` bytes at the start of the data region.
    ///
    /// # Errors
    ///
    /// See [`Packet::erase_at`].
    pub fn erase_at_front(&mut self, length: usize) -> Result<(), ChunkError> { self.erase_at(self.front_offset(), length) }

    /// Erase `length` bytes at the end of the data region.
    ///
    /// # Errors
    ///
    /// See [`Packet::erase_at`].
    pub fn erase_at_back(&mut self, length: usize) -> Result<(), ChunkError> {
        let back = self.back_offset();
        let offset = back
            .checked_sub(length)
            .ok_or(ChunkError::out_of_range(0, length, back))?;
        self.erase_at(offset, length)
    }

    /// Pop a `T` off the front of the data region, erase it from the content
    /// and hand it back as an exclusively owned mutable chunk.
    ///
    /// # Errors
    ///
    /// See [`Chunk::peek_as`].
    pub fn remove_at_front<T: ChunkType>(&mut self, length: Option<usize>) -> Result<Chunk, ChunkError> {
        let chunk = self.peek_at_front::<T>(length)?;
        self.erase_at_front(chunk.len())?;
        Ok(Chunk::make_exclusively_owned_mutable(chunk))
    }

    /// Pop a `T` off the back of the data region, erase it from the content
    /// and hand it back as an exclusively owned mutable chunk.
    ///
    /// # Errors
    ///
    /// See [`Chunk::peek_as`].
    pub fn remove_at_back<T: ChunkType>(&mut self, length: Option<usize>) -> Result<Chunk, ChunkError> {
        let chunk = self.peek_at_back::<T>(length)?;
        self.erase_at_back(chunk.len())?;
        Ok(Chunk::make_exclusively_owned_mutable(chunk))
    }

    /// Drop the content popped from the front.
    ///
    /// # Errors
    ///
    /// Propagates failures peeking the remaining content.
    pub fn trim_front(&mut self) -> Result<(), ChunkError> {
        let front = self.front_offset();
        self.erase_range(0, front, 0, self.back.position())
    }

    /// Drop the content popped from the back.
    ///
    /// # Errors
    ///
    /// Propagates failures peeking the remaining content.
    pub fn trim_back(&mut self) -> Result<(), ChunkError> {
        let back = self.back_offset();
        let popped = self.back.position();
        self.erase_range(back, popped, self.front_offset(), 0)
    }

    /// Drop everything outside the data region.
    ///
    /// # Errors
    ///
    /// Propagates failures peeking the remaining content.
    pub fn trim(&mut self) -> Result<(), ChunkError> {
        self.trim_front()?;
        self.trim_back()
    }

    fn erase_range(&mut self, offset: usize, length: usize, front: usize, back: usize) -> Result<(), ChunkError> {
        if length == 0 {
            return Ok(());
        }
        let total = self.total_length();
        check_range(offset, length, total)?;
        let shift = tag_shift(length).ok_or(ChunkError::out_of_range(offset, length, total))?;
        let end = offset + length;
        let mut parts = Vec::with_capacity(2);
        if offset > 0 {
            parts.push(self.content.peek(0, Some(offset))?);
        }
        if end < total {
            parts.push(self.content.peek(end, None)?);
        }
        trace!("packet {}: erased {length} bytes at offset {offset}", self.name);
        self.replace_content(Chunk::assemble(parts), front, back);
        self.region_tags.clear_tags(offset, length);
        self.region_tags.move_tags(end, -shift);
        Ok(())
    }

    fn replace_content(&mut self, content: Arc<Chunk>, front: usize, back: usize) {
        self.content = content;
        self.front = ChunkIterator::forward(0);
        self.content.seek_iterator(&mut self.front, front);
        self.back = ChunkIterator::backward(0);
        self.content.seek_iterator(&mut self.back, back);
    }

    fn iterator_at(&self, position: usize) -> ChunkIterator {
        let mut iterator = ChunkIterator::forward(0);
        self.content.seek_iterator(&mut iterator, position);
        iterator
    }

    /// Attach a packet tag.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::AlreadyPresent`] if a `T` is already attached.
    pub fn add_tag<T: Tag>(&mut self, tag: T) -> Result<&mut T, TagError> { self.tags.add(tag) }

    /// The `T` packet tag, attaching a default one if absent.
    ///
    /// # Errors
    ///
    /// See [`TagSet::add_if_absent`].
    pub fn add_tag_if_absent<T: Tag + Default>(&mut self) -> Result<&mut T, TagError> { self.tags.add_if_absent::<T>() }

    /// Borrow the `T` packet tag.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::Absent`] if no `T` is attached.
    pub fn tag<T: Tag>(&self) -> Result<&T, TagError> { self.tags.get::<T>() }

    /// Borrow the `T` packet tag, if attached.
    #[must_use]
    pub fn find_tag<T: Tag>(&self) -> Option<&T> { self.tags.find::<T>() }

    /// Mutably borrow the `T` packet tag.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::Absent`] if no `T` is attached.
    pub fn tag_mut<T: Tag>(&mut self) -> Result<&mut T, TagError> { self.tags.get_mut::<T>() }

    /// Detach the `T` packet tag.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::Absent`] if no `T` is attached.
    pub fn remove_tag<T: Tag>(&mut self) -> Result<Arc<T>, TagError> { self.tags.remove::<T>() }

    /// Detach the `T` packet tag, if attached.
    pub fn remove_tag_if_present<T: Tag>(&mut self) -> Option<Arc<T>> { self.tags.remove_if_present::<T>() }

    /// Packet tags.
    #[must_use]
    pub const fn tags(&self) -> &TagSet { &self.tags }

    /// Mutable packet tags.
    pub fn tags_mut(&mut self) -> &mut TagSet { &mut self.tags }

    /// Tag `length` bytes of content at `offset`.
    ///
    /// # Errors
    ///
    /// Fails when the range leaves the content or overlaps another `T`.
    pub fn add_region_tag<T: Tag>(&mut self, offset: usize, length: usize, tag: T) -> Result<()> {
        check_range(offset, length, self.total_length())?;
        self.region_tags.add(offset, length, tag)?;
        Ok(())
    }

    /// Borrow the `T` region tag covering exactly the range.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::NoExactMatch`] if no such tag exists.
    pub fn region_tag<T: Tag>(&self, offset: usize, length: usize) -> Result<&T, TagError> {
        self.region_tags.get::<T>(offset, length)
    }

    /// Borrow the `T` region tag covering exactly the range, if any.
    #[must_use]
    pub fn find_region_tag<T: Tag>(&self, offset: usize, length: usize) -> Option<&T> {
        self.region_tags.find::<T>(offset, length)
    }

    /// Detach the `T` region tag covering exactly the range.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::NoExactMatch`] if no such tag exists.
    pub fn remove_region_tag<T: Tag>(&mut self, offset: usize, length: usize) -> Result<Arc<T>, TagError> {
        self.region_tags.remove::<T>(offset, length)
    }

    /// Detach the `T` region tag covering exactly the range, if any.
    pub fn remove_region_tag_if_present<T: Tag>(&mut self, offset: usize, length: usize) -> Option<Arc<T>> {
        self.region_tags.remove_if_present::<T>(offset, length)
    }

    /// Every `T` region tag overlapping the range, trimmed to it.
    #[must_use]
    pub fn all_region_tags<T: Tag>(&self, offset: usize, length: usize) -> Vec<RegionTag<T>> {
        self.region_tags.all_tags::<T>(offset, length)
    }

    /// Visit every `T` region tag overlapping the range, trimmed to it.
    pub fn map_all_region_tags<T: Tag>(&self, offset: usize, length: usize, visit: impl FnMut(usize, usize, &T)) {
        self.region_tags.map_all_tags::<T>(offset, length, visit);
    }

    /// Update every `T` region tag overlapping the range; parts outside the
    /// range keep their old value.
    pub fn map_all_region_tags_for_update<T: Tag>(
        &mut self,
        offset: usize,
        length: usize,
        update: impl FnMut(usize, usize, &mut T),
    ) {
        self.region_tags.map_all_tags_for_update::<T>(offset, length, update);
    }

    /// Region tags.
    #[must_use]
    pub const fn region_tags(&self) -> &RegionTagSet { &self.region_tags }

    /// Mutable region tags.
    pub fn region_tags_mut(&mut self) -> &mut RegionTagSet { &mut self.region_tags }
}

impl fmt::Debug for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Packet")
            .field("name", &self.name)
            .field("front_offset", &self.front_offset())
            .field("back_offset", &self.back_offset())
            .field("content", &self.content)
            .field("tags", &self.tags)
            .field("region_tags", &self.region_tags)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Packet {}, length = {} B, data = [{}, {}), content = {{{}}}",
            self.name,
            self.total_length(),
            self.front_offset(),
            self.back_offset(),
            self.content
        )
    }
}

#[cfg(test)]
mod tests;
