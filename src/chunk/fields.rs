//! Structured chunks carrying protocol fields.
//!
//! Protocol models implement [`FieldsChunk`] for their header types and
//! register a [`FieldsSerializer`](crate::serializer::FieldsSerializer) for
//! them. The chunk stores the value type-erased and caches its serialized
//! form until the value changes.

use std::{
    any::{Any, TypeId, type_name},
    fmt,
    sync::OnceLock,
};

use bytes::Bytes;

/// A structured header or trailer that can live inside a [`Chunk`](super::Chunk).
///
/// # Examples
///
/// ```
/// use wirechunk::FieldsChunk;
///
/// #[derive(Clone, Debug, Default)]
/// struct Marker {
///     value: u32,
/// }
///
/// impl FieldsChunk for Marker {
///     fn chunk_length(&self) -> usize { 4 }
/// }
/// ```
pub trait FieldsChunk: Any + Clone + fmt::Debug + Send + Sync {
    /// Number of bytes the serialized form of this value occupies.
    fn chunk_length(&self) -> usize;
}

/// Object-safe view of a [`FieldsChunk`].
pub trait DynFields: Any + fmt::Debug + Send + Sync {
    /// Borrow as [`Any`] for downcasting.
    fn as_any(&self) -> &dyn Any;
    /// Mutably borrow as [`Any`] for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// Clone into a new box.
    fn clone_box(&self) -> Box<dyn DynFields>;
    /// Name of the concrete type.
    fn dyn_type_name(&self) -> &'static str;
    /// Serialized length of the value.
    fn dyn_chunk_length(&self) -> usize;
}

impl<T: FieldsChunk> DynFields for T {
    fn as_any(&self) -> &dyn Any { self }

    fn as_any_mut(&mut self) -> &mut dyn Any { self }

    fn clone_box(&self) -> Box<dyn DynFields> { Box::new(self.clone()) }

    fn dyn_type_name(&self) -> &'static str { type_name::<T>() }

    fn dyn_chunk_length(&self) -> usize { <T as FieldsChunk>::chunk_length(self) }
}

impl Clone for Box<dyn DynFields> {
    fn clone(&self) -> Self { (**self).clone_box() }
}

/// Type-erased fields value plus its length and serialization cache.
#[derive(Clone, Debug)]
pub struct FieldsData {
    value: Box<dyn DynFields>,
    length: usize,
    serialized: OnceLock<Bytes>,
}

impl FieldsData {
    pub(crate) fn new(value: Box<dyn DynFields>, length: usize) -> Self {
        Self {
            value,
            length,
            serialized: OnceLock::new(),
        }
    }

    /// Borrow the type-erased value.
    #[must_use]
    pub fn value(&self) -> &dyn DynFields { self.value.as_ref() }

    /// Downcast the value to `T`.
    #[must_use]
    pub fn downcast<T: FieldsChunk>(&self) -> Option<&T> { self.value.as_any().downcast_ref::<T>() }

    /// Name of the concrete fields type.
    #[must_use]
    pub fn type_name(&self) -> &'static str { self.value.dyn_type_name() }

    pub(crate) fn value_type_id(&self) -> TypeId { self.value.as_any().type_id() }

    /// Chunk length in bytes.
    #[must_use]
    pub const fn len(&self) -> usize { self.length }

    /// Whether the chunk covers no bytes.
    #[must_use]
    pub const fn is_empty(&self) -> bool { self.length == 0 }

    /// Serialized bytes, if cached.
    #[must_use]
    pub fn cached_bytes(&self) -> Option<&Bytes> { self.serialized.get() }

    pub(crate) fn cache(&self, bytes: Bytes) -> Bytes { self.serialized.get_or_init(|| bytes).clone() }

    /// Apply `update` to the value, then recompute the length and drop the
    /// cache. Returns `false` when the value is not a `T`.
    pub(crate) fn update<T: FieldsChunk>(&mut self, update: impl FnOnce(&mut T)) -> bool {
        let Some(value) = self.value.as_any_mut().downcast_mut::<T>() else {
            return false;
        };
        update(value);
        self.length = <T as FieldsChunk>::chunk_length(value);
        self.serialized = OnceLock::new();
        true
    }
}
