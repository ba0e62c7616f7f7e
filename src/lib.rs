#![doc(html_root_url = "https://docs.rs/wirechunk/latest")]
//! Packet data model for protocol implementations.
//!
//! `wirechunk` represents packet data as a tree of immutable, structurally
//! shared [`Chunk`]s: length-only placeholders, raw bytes, slices of other
//! chunks, sequences and typed protocol fields. A [`SerializerRegistry`]
//! converts between fields and bytes on demand and caches the result.
//! [`Packet`] consumes headers and trailers by moving cursors over its
//! content; [`ChunkBuffer`], [`ReassemblyBuffer`] and [`ReorderBuffer`]
//! collect data by offset. [`TagSet`] and [`RegionTagSet`] attach metadata
//! to whole packets and to byte ranges.

pub mod buffer;
pub mod chunk;
pub mod config;
pub mod error;
pub mod metrics;
pub mod packet;
pub mod serializer;
pub mod tag;

pub use buffer::{ChunkBuffer, ReassemblyBuffer, ReorderBuffer, Region};
pub use chunk::{
    ByteCountChunk,
    BytesChunk,
    Chunk,
    ChunkData,
    ChunkError,
    ChunkIterator,
    ChunkType,
    DataQuality,
    FieldsChunk,
    PeekFlags,
    QualityMarker,
    SequenceChunk,
    SliceChunk,
};
pub use config::RegistryConfig;
pub use error::{Error, Result};
pub use packet::Packet;
pub use serializer::{
    BincodeFieldsSerializer,
    Decoded,
    FieldsSerializer,
    MemoryInputStream,
    MemoryOutputStream,
    SerializerError,
    SerializerRegistry,
};
pub use tag::{RegionTag, RegionTagSet, Tag, TagError, TagSet};
