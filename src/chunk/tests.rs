//! Unit tests for chunk construction, peeking and copy-on-write.

use std::sync::Arc;

use rstest::{fixture, rstest};
use tracing_test::traced_test;

use super::{
    ByteCountChunk,
    BytesChunk,
    Chunk,
    ChunkData,
    ChunkError,
    ChunkIterator,
    FieldsChunk,
    PeekFlags,
    QualityMarker,
    SequenceChunk,
    SliceChunk,
};
use crate::serializer::{Decoded, FieldsSerializer, MemoryInputStream, MemoryOutputStream, SerializerError, SerializerRegistry};

#[derive(Clone, Debug, PartialEq, Eq)]
struct Marker {
    value: u16,
}

impl FieldsChunk for Marker {
    fn chunk_length(&self) -> usize { 2 }
}

struct MarkerSerializer;

impl FieldsSerializer for MarkerSerializer {
    type Fields = Marker;

    fn serialize(&self, stream: &mut MemoryOutputStream, fields: &Marker) -> Result<(), SerializerError> {
        stream.write_u16_be(fields.value);
        Ok(())
    }

    fn deserialize(&self, stream: &mut MemoryInputStream) -> Result<Decoded<Marker>, SerializerError> {
        Ok(Marker {
            value: stream.read_u16_be(),
        }
        .into())
    }
}

#[fixture]
fn registry() -> SerializerRegistry {
    SerializerRegistry::new()
        .with_serializer(MarkerSerializer)
        .expect("register marker serializer")
}

fn shared(chunk: Chunk) -> Arc<Chunk> { chunk.into_shared() }

fn bytes_of(chunk: &Chunk) -> Vec<u8> {
    SerializerRegistry::new()
        .serialize(chunk)
        .expect("serialize built-in chunk")
        .to_vec()
}

#[rstest]
#[case(shared(Chunk::bytes(vec![1, 2, 3])))]
#[case(shared(Chunk::byte_count(4)))]
#[case(shared(Chunk::sequence([shared(Chunk::bytes(vec![1])), shared(Chunk::byte_count(1))])))]
fn full_peek_returns_the_chunk_itself(#[case] chunk: Arc<Chunk>) {
    let peeked = chunk.peek(0, None).expect("peek whole chunk");
    assert!(Arc::ptr_eq(&peeked, &chunk));
}

#[test]
fn bytes_peek_narrows_without_copying() {
    let chunk = shared(Chunk::bytes(vec![10, 11, 12, 13]));
    let peeked = chunk.peek(1, Some(2)).expect("peek middle");
    let original = chunk.as_bytes().expect("bytes chunk");
    let narrowed = peeked.as_bytes().expect("narrowed bytes chunk");
    assert_eq!(narrowed.as_ref(), &[11, 12]);
    assert_eq!(narrowed.as_ptr(), original[1..].as_ptr());
    assert!(peeked.is_immutable());
}

#[test]
fn byte_count_peek_narrows() {
    let chunk = shared(Chunk::byte_count(10));
    let peeked = chunk.peek(3, Some(4)).expect("peek byte count");
    assert!(matches!(peeked.data(), ChunkData::ByteCount(count) if count.len() == 4));
}

#[test]
fn sequence_peek_prefers_existing_elements() {
    let header = shared(Chunk::fields(Marker { value: 1 }));
    let payload = shared(Chunk::bytes(vec![1, 2, 3]));
    let sequence = shared(Chunk::sequence([Arc::clone(&header), Arc::clone(&payload)]));

    let first = sequence.peek(0, Some(2)).expect("peek header");
    assert!(Arc::ptr_eq(&first, &header));
    let second = sequence.peek(2, None).expect("peek payload");
    assert!(Arc::ptr_eq(&second, &payload));
    let inside = sequence.peek(3, Some(1)).expect("peek inside payload");
    assert_eq!(inside.as_bytes().map(AsRef::as_ref), Some(&[2][..]));
}

#[test]
fn sequence_peek_across_elements_builds_shorter_sequence() {
    let sequence = shared(Chunk::sequence([
        shared(Chunk::fields(Marker { value: 1 })),
        shared(Chunk::byte_count(2)),
        shared(Chunk::fields(Marker { value: 2 })),
    ]));
    let peeked = sequence.peek(1, Some(4)).expect("peek across elements");
    let ChunkData::Sequence(inner) = peeked.data() else {
        panic!("expected a sequence, got {peeked}");
    };
    assert_eq!(peeked.len(), 4);
    assert_eq!(inner.element_count(), 3);
    assert!(matches!(inner.element(0).map(|e| e.data()), Some(ChunkData::Slice(_))));
}

#[test]
fn fields_peek_falls_back_to_a_slice() {
    let chunk = shared(Chunk::fields(Marker { value: 7 }));
    let peeked = chunk.peek(1, Some(1)).expect("peek half of the marker");
    let ChunkData::Slice(slice) = peeked.data() else {
        panic!("expected a slice, got {peeked}");
    };
    assert!(Arc::ptr_eq(slice.chunk(), &chunk));
    assert_eq!((slice.offset(), slice.len()), (1, 1));
}

#[test]
fn slices_of_slices_target_the_innermost_chunk() {
    let base = shared(Chunk::fields(Marker { value: 7 }));
    let outer = shared(Chunk::slice(&base, 0, 2).expect("slice whole marker"));
    let inner = Chunk::slice(&outer, 1, 1).expect("slice of slice");
    let ChunkData::Slice(slice) = inner.data() else {
        panic!("expected a slice");
    };
    assert!(Arc::ptr_eq(slice.chunk(), &base));
    assert_eq!(slice.offset(), 1);
}

#[rstest]
#[case(2, Some(3))]
#[case(6, None)]
fn peek_rejects_out_of_range(#[case] offset: usize, #[case] length: Option<usize>) {
    let chunk = shared(Chunk::bytes(vec![0; 4]));
    let err = chunk.peek(offset, length).expect_err("range exceeds chunk");
    assert!(matches!(err, ChunkError::OutOfRange { .. }));
}

#[test]
fn peek_rejects_empty_ranges() {
    let chunk = shared(Chunk::bytes(vec![0; 4]));
    assert!(matches!(chunk.peek(4, None), Err(ChunkError::Empty(_))));
}

#[test]
fn sealed_chunks_refuse_mutation() {
    let mut chunk = Chunk::bytes(vec![1, 2]);
    chunk.mark_immutable();
    assert!(matches!(chunk.set_byte(0, 9), Err(ChunkError::Immutable)));
    assert!(matches!(chunk.mark_incomplete(), Err(ChunkError::Immutable)));
    assert!(matches!(
        chunk.insert_at_back(shared(Chunk::byte_count(1))),
        Err(ChunkError::Immutable)
    ));
}

#[test]
fn mutation_checks_the_variant() {
    let mut chunk = Chunk::byte_count(2);
    assert!(matches!(
        chunk.set_bytes(vec![1]),
        Err(ChunkError::WrongVariant {
            expected: "BytesChunk",
            ..
        })
    ));
    chunk.set_length(5).expect("byte count is mutable");
    assert_eq!(chunk.len(), 5);
}

#[test]
fn dup_shared_clones_into_a_mutable_chunk() {
    let original = shared(Chunk::bytes(vec![1, 2, 3]));
    let mut copy = original.dup_shared();
    assert!(copy.is_mutable());
    copy.set_byte(0, 9).expect("copy is mutable");
    assert_eq!(bytes_of(&copy), vec![9, 2, 3]);
    assert_eq!(bytes_of(&original), vec![1, 2, 3]);
}

#[test]
fn exclusively_owned_chunks_are_reused() {
    let unique = shared(Chunk::bytes(vec![1, 2, 3]));
    let address = unique.as_bytes().map(|bytes| bytes.as_ptr());
    let owned = Chunk::make_exclusively_owned_mutable(unique);
    assert!(owned.is_mutable());
    assert_eq!(owned.as_bytes().map(|bytes| bytes.as_ptr()), address);

    let first = shared(Chunk::byte_count(3));
    let second = Arc::clone(&first);
    let mut owned = Chunk::make_exclusively_owned_mutable(first);
    owned.set_length(1).expect("clone is mutable");
    assert_eq!(second.len(), 3);
}

#[test]
fn insertion_and_removal_keep_the_most_compact_form() {
    let mut chunk = Chunk::bytes(vec![1, 2]);
    chunk
        .insert_at_back(shared(Chunk::byte_count(2)))
        .expect("mutable chunk");
    assert!(matches!(chunk.data(), ChunkData::Bytes(bytes) if bytes.len() == 4));
    chunk
        .insert_at_front(shared(Chunk::fields(Marker { value: 3 })))
        .expect("mutable chunk");
    assert!(matches!(chunk.data(), ChunkData::Sequence(sequence) if sequence.element_count() == 2));
    chunk.remove_at_front(3).expect("remove marker and a byte");
    assert_eq!(bytes_of(&chunk), vec![2, 0, 0]);
    chunk.remove_at_back(2).expect("remove trailing zeros");
    assert_eq!(bytes_of(&chunk), vec![2]);
    assert!(matches!(
        chunk.remove_at_back(2),
        Err(ChunkError::OutOfRange { .. })
    ));
}

#[rstest]
fn typed_peek_parses_raw_bytes(registry: SerializerRegistry) {
    let chunk = shared(Chunk::bytes(vec![0x01, 0x02, 0xff]));
    let marker = chunk
        .peek_as::<Marker>(&registry, &ChunkIterator::forward(0), None, PeekFlags::default())
        .expect("raw bytes parse without permission");
    assert_eq!(marker.as_fields::<Marker>(), Some(&Marker { value: 0x0102 }));
    assert_eq!(marker.len(), 2);
}

#[traced_test]
#[test]
fn conversion_through_serialization_is_traced() {
    let chunk = shared(Chunk::bytes(vec![0x00, 0x07]));
    chunk
        .peek_as::<Marker>(&registry(), &ChunkIterator::forward(0), None, PeekFlags::default())
        .expect("raw bytes parse");
    assert!(logs_contain("converted chunk through serialization"));
}

#[rstest]
fn typed_peek_reuses_matching_elements(registry: SerializerRegistry) {
    let header = shared(Chunk::fields(Marker { value: 4 }));
    let sequence = shared(Chunk::sequence([
        shared(Chunk::byte_count(3)),
        Arc::clone(&header),
    ]));
    let peeked = sequence
        .peek_as::<Marker>(&registry, &ChunkIterator::forward(3), None, PeekFlags::default())
        .expect("marker element exists");
    assert!(Arc::ptr_eq(&peeked, &header));
    let from_back = sequence
        .peek_as::<Marker>(&registry, &ChunkIterator::backward(0), Some(2), PeekFlags::default())
        .expect("marker is the last element");
    assert!(Arc::ptr_eq(&from_back, &header));
}

#[rstest]
fn typed_peek_of_structured_data_needs_permission(registry: SerializerRegistry) {
    let chunk = shared(Chunk::byte_count(2));
    let iterator = ChunkIterator::forward(0);
    let err = chunk
        .peek_as::<Marker>(&registry, &iterator, None, PeekFlags::default())
        .expect_err("byte count is not raw data");
    assert!(matches!(err, ChunkError::SerializationDisabled { .. }));

    let allowed = chunk
        .peek_as::<Marker>(
            &registry,
            &iterator,
            None,
            PeekFlags::default().allow_serialization(),
        )
        .expect("serialization allowed");
    assert_eq!(allowed.as_fields::<Marker>(), Some(&Marker { value: 0 }));
}

#[rstest]
fn typed_peek_rejects_incomplete_results(registry: SerializerRegistry) {
    let chunk = shared(Chunk::bytes(vec![0x05]));
    let iterator = ChunkIterator::forward(0);
    let err = chunk
        .peek_as::<Marker>(&registry, &iterator, None, PeekFlags::default())
        .expect_err("one byte cannot hold a marker");
    assert!(matches!(
        err,
        ChunkError::QualityRejected {
            marker: QualityMarker::Incomplete
        }
    ));
    let partial = chunk
        .peek_as::<Marker>(&registry, &iterator, None, PeekFlags::default().allow_incomplete())
        .expect("incomplete allowed");
    assert!(partial.is_incomplete());
    assert_eq!(partial.as_fields::<Marker>(), Some(&Marker { value: 0x0500 }));
}

#[rstest]
fn typed_peek_of_builtin_variants(registry: SerializerRegistry) {
    let chunk = shared(Chunk::fields(Marker { value: 0x0a0b }));
    let iterator = ChunkIterator::forward(0);
    let flags = PeekFlags::default();
    let bytes = chunk
        .peek_as::<BytesChunk>(&registry, &iterator, None, flags)
        .expect("bytes are always available");
    assert_eq!(bytes.as_bytes().map(AsRef::as_ref), Some(&[0x0a, 0x0b][..]));
    let count = chunk
        .peek_as::<ByteCountChunk>(&registry, &iterator, Some(1), flags)
        .expect("byte count of one byte");
    assert_eq!(count.len(), 1);
    let slice = chunk
        .peek_as::<SliceChunk>(&registry, &iterator, None, flags)
        .expect("slice over the whole marker");
    assert!(matches!(slice.data(), ChunkData::Slice(_)));
    let sequence = chunk
        .peek_as::<SequenceChunk>(&registry, &iterator, None, flags)
        .expect("sequence wrapping the marker");
    assert!(matches!(sequence.data(), ChunkData::Sequence(inner) if inner.element_count() == 1));
}

#[test]
fn iterator_index_advances_over_single_elements() {
    let sequence = Chunk::sequence([
        shared(Chunk::fields(Marker { value: 1 })),
        shared(Chunk::byte_count(3)),
        shared(Chunk::fields(Marker { value: 2 })),
    ]);
    let mut iterator = ChunkIterator::forward(0);
    sequence.move_iterator(&mut iterator, 2);
    assert_eq!((iterator.position(), iterator.index()), (2, Some(1)));
    sequence.move_iterator(&mut iterator, 1);
    assert_eq!((iterator.position(), iterator.index()), (3, None));
    sequence.seek_iterator(&mut iterator, 5);
    assert_eq!(iterator.index(), Some(2));
    sequence.move_iterator(&mut iterator, 2);
    assert_eq!(iterator.index(), Some(3));

    let mut backward = ChunkIterator::backward(0);
    sequence.move_iterator(&mut backward, 2);
    assert_eq!(backward.index(), Some(1));
}

#[test]
fn display_summarises_content() {
    let chunk = Chunk::sequence([shared(Chunk::bytes(vec![0xab, 0x01])), shared(Chunk::fields(Marker { value: 1 }))]);
    let rendered = chunk.to_string();
    assert!(rendered.starts_with("SequenceChunk, length = 4 B"));
    assert!(rendered.contains("AB 01"));
    assert!(rendered.contains("Marker { value: 1 }"));
}

#[test]
fn peek_flags_accept_listed_markers() {
    let mut chunk = Chunk::byte_count(1);
    chunk.mark_incorrect().expect("mutable chunk");
    assert!(PeekFlags::default().check(&chunk).is_err());
    assert!(PeekFlags::default().allow_incorrect().check(&chunk).is_ok());
    assert!(PeekFlags::ALL.check(&chunk).is_ok());
}
