//! Conversion between chunks and flat byte streams.
//!
//! Built-in chunk variants are serialized by the [`SerializerRegistry`]
//! itself. Structured chunks go through a [`FieldsSerializer`] registered for
//! their concrete type; the registry is an explicit object handed to every
//! caller that needs it rather than process-wide state.

mod bincode_bridge;
mod error;
mod stream;

use std::{
    any::{TypeId, type_name},
    collections::HashMap,
    fmt,
    sync::Arc,
};

use bytes::Bytes;

pub use self::{
    bincode_bridge::BincodeFieldsSerializer,
    error::SerializerError,
    stream::{MemoryInputStream, MemoryOutputStream},
};
use crate::{
    chunk::{Chunk, ChunkData, ChunkError, DataQuality, DynFields, FieldsChunk, FieldsData, check_range},
    config::RegistryConfig,
    metrics,
};

/// Result of deserializing a fields value.
#[derive(Clone, Debug)]
pub struct Decoded<T> {
    /// The parsed value.
    pub fields: T,
    /// Data-quality markers to attach to the resulting chunk.
    pub quality: DataQuality,
}

impl<T> Decoded<T> {
    /// A well-formed result.
    #[must_use]
    pub const fn new(fields: T) -> Self {
        Self {
            fields,
            quality: DataQuality::GOOD,
        }
    }

    /// Mark the result incorrect, for values that failed validation.
    #[must_use]
    pub const fn incorrect(mut self) -> Self {
        self.quality = self.quality.with_incorrect();
        self
    }

    /// Mark the result improperly represented.
    #[must_use]
    pub const fn improperly_represented(mut self) -> Self {
        self.quality = self.quality.with_improperly_represented();
        self
    }
}

impl<T> From<T> for Decoded<T> {
    fn from(fields: T) -> Self { Self::new(fields) }
}

/// Converts one concrete [`FieldsChunk`] type to and from bytes.
///
/// Implementations write exactly [`FieldsChunk::chunk_length`] bytes and
/// should tolerate short input: a [`MemoryInputStream`] yields zeros past its
/// end and the registry marks the resulting chunk incomplete.
pub trait FieldsSerializer: Send + Sync + 'static {
    /// Fields type handled by this serializer.
    type Fields: FieldsChunk;

    /// Write `fields` to `stream`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be encoded.
    fn serialize(&self, stream: &mut MemoryOutputStream, fields: &Self::Fields) -> Result<(), SerializerError>;

    /// Parse a value from `stream`.
    ///
    /// # Errors
    ///
    /// Returns an error if no value can be produced at all.
    fn deserialize(&self, stream: &mut MemoryInputStream) -> Result<Decoded<Self::Fields>, SerializerError>;
}

trait ErasedSerializer: Send + Sync {
    fn serialize_dyn(&self, stream: &mut MemoryOutputStream, fields: &dyn DynFields) -> Result<(), SerializerError>;

    fn deserialize_dyn(
        &self,
        stream: &mut MemoryInputStream,
    ) -> Result<(Box<dyn DynFields>, DataQuality), SerializerError>;
}

impl<S: FieldsSerializer> ErasedSerializer for S {
    fn serialize_dyn(&self, stream: &mut MemoryOutputStream, fields: &dyn DynFields) -> Result<(), SerializerError> {
        let Some(fields) = fields.as_any().downcast_ref::<S::Fields>() else {
            return Err(SerializerError::TypeMismatch {
                expected: type_name::<S::Fields>(),
                found: fields.dyn_type_name(),
            });
        };
        self.serialize(stream, fields)
    }

    fn deserialize_dyn(
        &self,
        stream: &mut MemoryInputStream,
    ) -> Result<(Box<dyn DynFields>, DataQuality), SerializerError> {
        let decoded = self.deserialize(stream)?;
        let fields: Box<dyn DynFields> = Box::new(decoded.fields);
        Ok((fields, decoded.quality))
    }
}

#[derive(Clone)]
struct Registration {
    type_name: &'static str,
    serializer: Arc<dyn ErasedSerializer>,
}

/// Serializers keyed by fields type, plus the serialization policy.
///
/// # Examples
///
/// ```
/// use wirechunk::{Chunk, SerializerRegistry};
///
/// let registry = SerializerRegistry::new();
/// let chunk = Chunk::sequence([
///     Chunk::bytes(vec![1, 2]).into_shared(),
///     Chunk::byte_count(2).into_shared(),
/// ]);
/// assert_eq!(registry.serialize(&chunk).unwrap().as_ref(), &[1, 2, 0, 0]);
/// ```
#[derive(Clone, Default)]
pub struct SerializerRegistry {
    config: RegistryConfig,
    serializers: HashMap<TypeId, Registration>,
}

impl SerializerRegistry {
    /// Create an empty registry with the default policy.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Create an empty registry using `config`.
    #[must_use]
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            serializers: HashMap::new(),
        }
    }

    /// Serialization policy.
    #[must_use]
    pub const fn config(&self) -> &RegistryConfig { &self.config }

    /// Register `serializer` for its fields type.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::DuplicateSerializer`] if the type already has one.
    pub fn register<S: FieldsSerializer>(&mut self, serializer: S) -> Result<(), ChunkError> {
        let type_name = type_name::<S::Fields>();
        let type_id = TypeId::of::<S::Fields>();
        if self.serializers.contains_key(&type_id) {
            return Err(ChunkError::DuplicateSerializer { type_name });
        }
        self.serializers.insert(
            type_id,
            Registration {
                type_name,
                serializer: Arc::new(serializer),
            },
        );
        tracing::debug!(fields = type_name, "registered chunk serializer");
        Ok(())
    }

    /// Builder-style [`SerializerRegistry::register`].
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::DuplicateSerializer`] if the type already has one.
    pub fn with_serializer<S: FieldsSerializer>(mut self, serializer: S) -> Result<Self, ChunkError> {
        self.register(serializer)?;
        Ok(self)
    }

    /// Whether a serializer is registered for `T`.
    #[must_use]
    pub fn contains<T: FieldsChunk>(&self) -> bool { self.serializers.contains_key(&TypeId::of::<T>()) }

    /// Number of registered serializers.
    #[must_use]
    pub fn len(&self) -> usize { self.serializers.len() }

    /// Whether no serializer is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.serializers.is_empty() }

    fn lookup(&self, type_id: TypeId, type_name: &'static str) -> Result<&Registration, ChunkError> {
        self.serializers
            .get(&type_id)
            .ok_or(ChunkError::NoSerializer { type_name })
    }

    /// Serialize the whole chunk.
    ///
    /// # Errors
    ///
    /// Fails when a fields chunk has no serializer or its serializer fails.
    pub fn serialize(&self, chunk: &Chunk) -> Result<Bytes, ChunkError> {
        self.serialize_range(chunk, 0, chunk.len())
    }

    /// Serialize `length` bytes at `offset` within the chunk.
    ///
    /// Bytes chunks are returned without copying.
    ///
    /// # Errors
    ///
    /// Fails when the range exceeds the chunk, a fields chunk has no
    /// serializer, or a serializer fails.
    pub fn serialize_range(&self, chunk: &Chunk, offset: usize, length: usize) -> Result<Bytes, ChunkError> {
        check_range(offset, length, chunk.len())?;
        match chunk.data() {
            ChunkData::Bytes(bytes) => Ok(bytes.bytes().slice(offset..offset + length)),
            ChunkData::Fields(fields) => {
                let bytes = self.serialize_fields(fields, chunk.quality())?;
                Ok(bytes.slice(offset..offset + length))
            }
            _ => {
                let mut stream = MemoryOutputStream::with_capacity(length);
                self.write_range(&mut stream, chunk, offset, length)?;
                Ok(stream.into_bytes())
            }
        }
    }

    /// Append the whole chunk to `stream`.
    ///
    /// # Errors
    ///
    /// Fails when a fields chunk has no serializer or its serializer fails.
    pub fn serialize_into(&self, stream: &mut MemoryOutputStream, chunk: &Chunk) -> Result<(), ChunkError> {
        self.write_range(stream, chunk, 0, chunk.len())
    }

    fn write_range(
        &self,
        stream: &mut MemoryOutputStream,
        chunk: &Chunk,
        offset: usize,
        length: usize,
    ) -> Result<(), ChunkError> {
        match chunk.data() {
            ChunkData::Empty => {}
            ChunkData::ByteCount(_) => stream.write_repeated(0, length),
            ChunkData::Bytes(bytes) => stream.write_bytes(&bytes.bytes()[offset..offset + length]),
            ChunkData::Slice(slice) => {
                self.write_range(stream, slice.chunk(), slice.offset() + offset, length)?;
            }
            ChunkData::Sequence(sequence) => {
                let end = offset + length;
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
                    self.write_range(stream, element, from, to - from)?;
                }
            }
            ChunkData::Fields(fields) => {
                let bytes = self.serialize_fields(fields, chunk.quality())?;
                stream.write_bytes(&bytes[offset..offset + length]);
            }
        }
        Ok(())
    }

    /// Serialized form of a fields chunk, from its cache when present.
    fn serialize_fields(&self, fields: &FieldsData, quality: DataQuality) -> Result<Bytes, ChunkError> {
        if let Some(cached) = fields.cached_bytes() {
            metrics::inc_serializations(metrics::CacheOutcome::Hit);
            return Ok(cached.clone());
        }
        let registration = self.lookup(fields.value_type_id(), fields.type_name())?;
        let mut stream = MemoryOutputStream::with_capacity(fields.len());
        registration
            .serializer
            .serialize_dyn(&mut stream, fields.value())?;
        if stream.len() != fields.len() {
            if quality.is_incomplete() && stream.len() > fields.len() {
                stream.truncate(fields.len());
            } else {
                return Err(ChunkError::SerializedLengthMismatch {
                    type_name: registration.type_name,
                    expected: fields.len(),
                    actual: stream.len(),
                });
            }
        }
        metrics::inc_serializations(metrics::CacheOutcome::Miss);
        Ok(fields.cache(stream.into_bytes()))
    }

    /// Parse a `T` from `stream` into a new mutable chunk.
    ///
    /// The chunk length is the number of bytes consumed. A stream that ran
    /// dry yields an incomplete chunk; complete chunks keep the consumed
    /// bytes as their serialized form.
    ///
    /// # Errors
    ///
    /// Fails when `T` has no serializer or its serializer fails.
    pub fn deserialize<T: FieldsChunk>(&self, stream: &mut MemoryInputStream) -> Result<Chunk, ChunkError> {
        let registration = self.lookup(TypeId::of::<T>(), type_name::<T>())?;
        let start = stream.position();
        let (value, quality) = registration.serializer.deserialize_dyn(stream)?;
        let end = stream.position();
        let mut chunk = Chunk::from_boxed_fields(value, end - start);
        let complete = !stream.is_read_beyond_end();
        chunk.set_quality(if complete {
            quality
        } else {
            quality.with_incomplete()
        });
        if complete && let ChunkData::Fields(fields) = chunk.data() {
            fields.cache(stream.slice(start, end));
        }
        metrics::inc_deserializations(complete);
        Ok(chunk)
    }

    /// Read `length` explicit bytes, marking the chunk incomplete when the
    /// stream holds fewer.
    #[must_use]
    pub fn deserialize_bytes(&self, stream: &mut MemoryInputStream, length: usize) -> Chunk {
        let bytes = stream.read_available(length);
        let mut chunk = Chunk::bytes(bytes);
        if chunk.len() < length {
            chunk.set_quality(DataQuality::GOOD.with_incomplete());
        }
        chunk
    }

    /// Skip `length` bytes and return a byte-count placeholder for them.
    #[must_use]
    pub fn deserialize_byte_count(&self, stream: &mut MemoryInputStream, length: usize) -> Chunk {
        let skipped = stream.read_available(length).len();
        let mut chunk = Chunk::byte_count(skipped);
        if skipped < length {
            chunk.set_quality(DataQuality::GOOD.with_incomplete());
        }
        chunk
    }
}

impl fmt::Debug for SerializerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self
            .serializers
            .values()
            .map(|registration| registration.type_name)
            .collect();
        names.sort_unstable();
        f.debug_struct("SerializerRegistry")
            .field("config", &self.config)
            .field("serializers", &names)
            .finish()
    }
}
