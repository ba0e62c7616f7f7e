//! Typed peeking and representation conversion.
//!
//! A typed peek first looks for an existing chunk of the requested type that
//! covers the range (the whole chunk, a sequence element, a narrowed bytes
//! run, the target of a slice). Only when none exists is a new
//! representation built by [`ChunkType::convert`], which for structured
//! fields means serializing the range and parsing it again.

use std::{any::type_name, sync::Arc};

use super::{
    ByteCountChunk,
    BytesChunk,
    Chunk,
    ChunkData,
    ChunkError,
    ChunkIterator,
    FieldsChunk,
    QualityMarker,
    SequenceChunk,
    SliceChunk,
    check_range,
};
use crate::{
    metrics,
    serializer::{MemoryInputStream, SerializerRegistry},
};

/// Per-call policy for peeks.
///
/// By default only complete, correct, properly represented results are
/// returned and structured fields are never produced by re-serializing other
/// structured data.
///
/// # Examples
///
/// ```
/// use wirechunk::PeekFlags;
///
/// let flags = PeekFlags::default().allow_incomplete().allow_serialization();
/// assert!(flags.allows_incomplete());
/// assert!(!flags.allows_incorrect());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PeekFlags {
    allow_incomplete: bool,
    allow_incorrect: bool,
    allow_improperly_represented: bool,
    allow_serialization: bool,
}

impl PeekFlags {
    /// Accept everything.
    pub const ALL: Self = Self {
        allow_incomplete: true,
        allow_incorrect: true,
        allow_improperly_represented: true,
        allow_serialization: true,
    };

    /// Accept incomplete results.
    #[must_use]
    pub const fn allow_incomplete(mut self) -> Self {
        self.allow_incomplete = true;
        self
    }

    /// Accept incorrect results.
    #[must_use]
    pub const fn allow_incorrect(mut self) -> Self {
        self.allow_incorrect = true;
        self
    }

    /// Accept improperly represented results.
    #[must_use]
    pub const fn allow_improperly_represented(mut self) -> Self {
        self.allow_improperly_represented = true;
        self
    }

    /// Permit converting structured data through serialization.
    #[must_use]
    pub const fn allow_serialization(mut self) -> Self {
        self.allow_serialization = true;
        self
    }

    /// Whether incomplete results are accepted.
    #[must_use]
    pub const fn allows_incomplete(self) -> bool { self.allow_incomplete }

    /// Whether incorrect results are accepted.
    #[must_use]
    pub const fn allows_incorrect(self) -> bool { self.allow_incorrect }

    /// Whether improperly represented results are accepted.
    #[must_use]
    pub const fn allows_improperly_represented(self) -> bool { self.allow_improperly_represented }

    /// Whether conversion through serialization is permitted.
    #[must_use]
    pub const fn allows_serialization(self) -> bool { self.allow_serialization }

    /// Reject `chunk` if it carries a marker these flags do not accept.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::QualityRejected`] naming the first such marker.
    pub fn check(self, chunk: &Chunk) -> Result<(), ChunkError> {
        let rejected = chunk.quality().markers().find(|marker| match marker {
            QualityMarker::Incomplete => !self.allow_incomplete,
            QualityMarker::Incorrect => !self.allow_incorrect,
            QualityMarker::ImproperlyRepresented => !self.allow_improperly_represented,
        });
        match rejected {
            Some(marker) => Err(ChunkError::QualityRejected { marker }),
            None => Ok(()),
        }
    }
}

/// A conversion request handed to [`ChunkType::convert`].
#[derive(Clone, Copy, Debug)]
pub struct Conversion<'a> {
    registry: &'a SerializerRegistry,
    source: &'a Arc<Chunk>,
    offset: usize,
    length: Option<usize>,
    limit: usize,
    flags: PeekFlags,
}

impl<'a> Conversion<'a> {
    /// Registry used for any serialization.
    #[must_use]
    pub const fn registry(&self) -> &'a SerializerRegistry { self.registry }

    /// Chunk being converted.
    #[must_use]
    pub const fn source(&self) -> &'a Arc<Chunk> { self.source }

    /// Start of the range within the source.
    #[must_use]
    pub const fn offset(&self) -> usize { self.offset }

    /// Exact length of the range, or `None` when the target type decides.
    #[must_use]
    pub const fn length(&self) -> Option<usize> { self.length }

    /// Maximum number of bytes available from the offset.
    #[must_use]
    pub const fn limit(&self) -> usize { self.limit }

    /// Length of the range, falling back to everything available.
    #[must_use]
    pub fn length_or_limit(&self) -> usize { self.length.unwrap_or(self.limit) }

    /// Flags of the originating peek.
    #[must_use]
    pub const fn flags(&self) -> PeekFlags { self.flags }
}

/// A representation a typed peek can ask for.
///
/// Implemented by [`Chunk`] (any representation), the built-in variant types
/// and every [`FieldsChunk`].
pub trait ChunkType: 'static {
    /// Human-readable name used in errors.
    fn type_name() -> &'static str;

    /// Whether an existing chunk already is this type.
    fn matches(chunk: &Chunk) -> bool;

    /// Whether values of this type determine their own length when the peek
    /// length is unspecified.
    fn is_self_delimiting() -> bool { false }

    /// Build a new chunk of this type for the requested range.
    ///
    /// # Errors
    ///
    /// Returns an error when the representation cannot be produced.
    fn convert(request: &Conversion<'_>) -> Result<Arc<Chunk>, ChunkError>;
}

impl ChunkType for Chunk {
    fn type_name() -> &'static str { "Chunk" }

    fn matches(_chunk: &Chunk) -> bool { true }

    fn convert(request: &Conversion<'_>) -> Result<Arc<Chunk>, ChunkError> {
        request
            .source
            .convert_untyped(request.offset, request.length_or_limit())
    }
}

impl ChunkType for ByteCountChunk {
    fn type_name() -> &'static str { "ByteCountChunk" }

    fn matches(chunk: &Chunk) -> bool { matches!(chunk.data(), ChunkData::ByteCount(_)) }

    fn convert(request: &Conversion<'_>) -> Result<Arc<Chunk>, ChunkError> {
        let mut chunk = Chunk::byte_count(request.length_or_limit());
        chunk.set_quality(request.source.quality());
        Ok(chunk.into_shared())
    }
}

impl ChunkType for BytesChunk {
    fn type_name() -> &'static str { "BytesChunk" }

    fn matches(chunk: &Chunk) -> bool { matches!(chunk.data(), ChunkData::Bytes(_)) }

    fn convert(request: &Conversion<'_>) -> Result<Arc<Chunk>, ChunkError> {
        let bytes = request.registry.serialize_range(
            request.source,
            request.offset,
            request.length_or_limit(),
        )?;
        let mut chunk = Chunk::bytes(bytes);
        chunk.set_quality(request.source.quality());
        Ok(chunk.into_shared())
    }
}

impl ChunkType for SliceChunk {
    fn type_name() -> &'static str { "SliceChunk" }

    fn matches(chunk: &Chunk) -> bool { matches!(chunk.data(), ChunkData::Slice(_)) }

    fn convert(request: &Conversion<'_>) -> Result<Arc<Chunk>, ChunkError> {
        Ok(Chunk::slice(request.source, request.offset, request.length_or_limit())?.into_shared())
    }
}

impl ChunkType for SequenceChunk {
    fn type_name() -> &'static str { "SequenceChunk" }

    fn matches(chunk: &Chunk) -> bool { matches!(chunk.data(), ChunkData::Sequence(_)) }

    fn convert(request: &Conversion<'_>) -> Result<Arc<Chunk>, ChunkError> {
        let natural = request
            .source
            .peek(request.offset, Some(request.length_or_limit()))?;
        if Self::matches(&natural) {
            return Ok(natural);
        }
        let mut sequence = SequenceChunk::new();
        sequence.push_back(natural);
        Ok(Chunk::from_data(ChunkData::Sequence(sequence)).into_shared())
    }
}

impl<T: FieldsChunk> ChunkType for T {
    fn type_name() -> &'static str { type_name::<T>() }

    fn matches(chunk: &Chunk) -> bool { chunk.as_fields::<T>().is_some() }

    fn is_self_delimiting() -> bool { true }

    fn convert(request: &Conversion<'_>) -> Result<Arc<Chunk>, ChunkError> {
        let registry = request.registry;
        if !request.source.is_raw()
            && !request.flags.allows_serialization()
            && !registry.config().implicit_serialization
        {
            return Err(ChunkError::SerializationDisabled {
                type_name: type_name::<T>(),
            });
        }
        let bytes = registry.serialize_range(
            request.source,
            request.offset,
            request.length_or_limit(),
        )?;
        let mut stream = MemoryInputStream::new(bytes);
        let chunk = registry.deserialize::<T>(&mut stream)?;
        metrics::inc_conversions();
        tracing::trace!(
            target_type = type_name::<T>(),
            source = request.source.kind_name(),
            length = chunk.len(),
            "converted chunk through serialization"
        );
        Ok(chunk.into_shared())
    }
}

impl Chunk {
    /// Typed peek of `length` bytes (or as many as the type needs, up to
    /// the rest of the chunk) at `iterator`.
    ///
    /// # Errors
    ///
    /// Fails on out-of-range or empty requests, with
    /// [`ChunkError::LengthRequired`] for a self-delimiting `T` behind a
    /// backward iterator without a length, when conversion is needed
    /// but not permitted or not possible, and when the result carries a
    /// data-quality marker `flags` do not accept.
    pub fn peek_as<T: ChunkType>(
        self: &Arc<Self>,
        registry: &SerializerRegistry,
        iterator: &ChunkIterator,
        length: Option<usize>,
        flags: PeekFlags,
    ) -> Result<Arc<Chunk>, ChunkError> {
        let available = self.len().saturating_sub(iterator.position());
        self.peek_bounded::<T>(registry, iterator, length, available, flags)
    }

    /// Typed peek limited to `limit` bytes from the iterator.
    pub(crate) fn peek_bounded<T: ChunkType>(
        self: &Arc<Self>,
        registry: &SerializerRegistry,
        iterator: &ChunkIterator,
        length: Option<usize>,
        limit: usize,
        flags: PeekFlags,
    ) -> Result<Arc<Chunk>, ChunkError> {
        let total = self.len();
        check_range(iterator.position(), 0, total)?;
        let limit = limit.min(total - iterator.position());
        if let Some(length) = length {
            check_range(0, length, limit)?;
        }
        let length = if T::is_self_delimiting() {
            if length.is_none() && !iterator.is_forward() {
                return Err(ChunkError::LengthRequired {
                    type_name: T::type_name(),
                });
            }
            length
        } else {
            Some(length.unwrap_or(limit))
        };
        if length == Some(0) || limit == 0 {
            return Err(ChunkError::Empty("peeked range"));
        }
        self.mark_immutable();
        let chunk = match self.find_unchecked(&T::matches, iterator, length, limit) {
            Some(found) => found,
            None => T::convert(&Conversion {
                registry,
                source: self,
                offset: iterator.forward_offset(total, length),
                length,
                limit,
                flags,
            })?,
        };
        chunk.mark_immutable();
        flags.check(&chunk)?;
        Ok(chunk)
    }

    /// Find an existing representation satisfying `predicate` for the range,
    /// without building new structure beyond narrowing bytes.
    pub(crate) fn find_unchecked(
        self: &Arc<Self>,
        predicate: &dyn Fn(&Chunk) -> bool,
        iterator: &ChunkIterator,
        length: Option<usize>,
        limit: usize,
    ) -> Option<Arc<Chunk>> {
        let total = self.len();
        let offset = iterator.forward_offset(total, length);
        let whole = offset == 0
            && match length {
                Some(length) => length == total,
                None => total <= limit,
            };
        if whole && predicate(self) {
            return Some(Arc::clone(self));
        }
        match &self.data {
            ChunkData::Sequence(sequence) => {
                let (index, start) = sequence.locate(iterator, offset)?;
                let element = sequence.element(index)?;
                let fits = match length {
                    Some(length) => length == element.len(),
                    None => element.len() <= limit,
                };
                if start == offset && fits && predicate(element) {
                    return Some(Arc::clone(element));
                }
                let element_end = start + element.len();
                match length {
                    Some(length) if offset + length <= element_end => element.find_unchecked(
                        predicate,
                        &ChunkIterator::forward(offset - start),
                        Some(length),
                        length,
                    ),
                    Some(_) => None,
                    None => element.find_unchecked(
                        predicate,
                        &ChunkIterator::forward(offset - start),
                        None,
                        limit.min(element_end - offset),
                    ),
                }
            }
            ChunkData::Slice(slice) => slice.chunk().find_unchecked(
                predicate,
                &ChunkIterator::forward(slice.offset() + offset),
                length,
                limit.min(slice.len() - offset),
            ),
            ChunkData::Bytes(bytes) => {
                let length = length?;
                let mut narrowed = Chunk::from_data(ChunkData::Bytes(bytes.narrow(offset, length)));
                narrowed.quality = self.quality;
                predicate(&narrowed).then(|| narrowed.into_shared())
            }
            ChunkData::ByteCount(_) => {
                let mut narrowed = Chunk::byte_count(length?);
                narrowed.quality = self.quality;
                predicate(&narrowed).then(|| narrowed.into_shared())
            }
            ChunkData::Fields(_) | ChunkData::Empty => None,
        }
    }
}
