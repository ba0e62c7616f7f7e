//! Pairwise merging of adjacent chunks.

use std::sync::Arc;

use super::{BytesChunk, Chunk, ChunkData, SequenceChunk, SliceChunk};

/// Merge `front` and `back` into one chunk when their variants allow it.
///
/// Merging requires identical data-quality markers. Returns `None` when the
/// pair has to stay separate.
pub(crate) fn try_merge(front: &Arc<Chunk>, back: &Arc<Chunk>) -> Option<Arc<Chunk>> {
    if front.quality() != back.quality() {
        return None;
    }
    let data = match (front.data(), back.data()) {
        (ChunkData::ByteCount(a), ChunkData::ByteCount(b)) => {
            ChunkData::ByteCount(super::ByteCountChunk::new(a.len() + b.len()))
        }
        (ChunkData::Bytes(a), ChunkData::Bytes(b)) => {
            ChunkData::Bytes(BytesChunk::concat(Some(a.bytes()), Some(b.bytes()), 0))
        }
        (ChunkData::Bytes(a), ChunkData::ByteCount(b)) => {
            ChunkData::Bytes(BytesChunk::concat(Some(a.bytes()), None, b.len()))
        }
        (ChunkData::ByteCount(a), ChunkData::Bytes(b)) => {
            ChunkData::Bytes(BytesChunk::concat(None, Some(b.bytes()), a.len()))
        }
        (ChunkData::Slice(a), ChunkData::Slice(b)) if a.is_followed_by(b) => {
            return Some(SliceChunk::make(a.chunk(), a.offset(), a.len() + b.len()));
        }
        _ => return None,
    };
    let mut merged = Chunk::from_data(data);
    merged.quality = front.quality();
    Some(merged.into_shared())
}

/// Concatenate two chunks, producing the most compact representation.
pub(crate) fn concat(front: &Arc<Chunk>, back: &Arc<Chunk>) -> Arc<Chunk> {
    if back.is_empty() {
        front.mark_immutable();
        return Arc::clone(front);
    }
    if front.is_empty() {
        back.mark_immutable();
        return Arc::clone(back);
    }
    if let Some(merged) = try_merge(front, back) {
        return merged;
    }
    let mut sequence = match front.data() {
        ChunkData::Sequence(existing) => existing.clone(),
        _ => {
            let mut fresh = SequenceChunk::new();
            fresh.push_back(Arc::clone(front));
            fresh
        }
    };
    sequence.push_back(Arc::clone(back));
    Chunk::from_data(ChunkData::Sequence(sequence)).into_shared()
}
