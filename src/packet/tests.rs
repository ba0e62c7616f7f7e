//! Unit tests for `Packet`.

use std::sync::Arc;

use rstest::{fixture, rstest};
use serde::{Deserialize, Serialize};

use super::Packet;
use crate::{
    chunk::{BytesChunk, Chunk, ChunkData, ChunkError, FieldsChunk},
    error::Error,
    serializer::{BincodeFieldsSerializer, SerializerRegistry},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct Header {
    kind: u8,
    length: u16,
}

impl FieldsChunk for Header {
    fn chunk_length(&self) -> usize { 3 }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Flow(u32);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Hops(u8);

#[fixture]
fn registry() -> Arc<SerializerRegistry> {
    let registry = SerializerRegistry::new()
        .with_serializer(BincodeFieldsSerializer::<Header>::new())
        .expect("register header serializer");
    Arc::new(registry)
}

fn bytes(data: &[u8]) -> Arc<Chunk> { Chunk::bytes(data.to_vec()).into_shared() }

fn content_of(chunk: &Chunk) -> Vec<u8> {
    chunk
        .as_bytes()
        .map(|bytes| bytes.to_vec())
        .unwrap_or_else(|| panic!("expected bytes, got {chunk}"))
}

#[rstest]
fn pops_move_the_data_region(registry: Arc<SerializerRegistry>) {
    let mut packet = Packet::with_content("data", registry, bytes(&[1, 2, 3, 4, 5, 6]));
    let front = packet.pop_at_front::<BytesChunk>(Some(1)).expect("pop front");
    let back = packet.pop_at_back::<BytesChunk>(Some(2)).expect("pop back");
    assert_eq!(content_of(&front), vec![1]);
    assert_eq!(content_of(&back), vec![5, 6]);
    assert_eq!((packet.front_offset(), packet.back_offset()), (1, 4));
    assert_eq!(packet.data_length(), 3);
    assert_eq!(packet.total_length(), 6);
    assert_eq!(
        content_of(&packet.peek_data_as_bytes().expect("data")),
        vec![2, 3, 4]
    );
    assert_eq!(
        content_of(&packet.peek_data_at::<BytesChunk>(1, Some(1)).expect("middle")),
        vec![3]
    );
}

#[rstest]
fn inserted_header_is_popped_without_conversion(registry: Arc<SerializerRegistry>) {
    let header = Chunk::fields(Header { kind: 7, length: 4 }).into_shared();
    let mut packet = Packet::new("frame", registry);
    packet.insert_at_back(bytes(&[9, 9, 9, 9])).expect("payload");
    packet.insert_at_front(Arc::clone(&header)).expect("header");
    assert_eq!(packet.total_length(), 7);
    let popped = packet.pop_at_front::<Header>(None).expect("pop header");
    assert!(Arc::ptr_eq(&popped, &header));
    assert_eq!(packet.front_offset(), 3);
}

#[rstest]
fn serialized_packet_reloads_header_fields(registry: Arc<SerializerRegistry>) {
    let mut packet = Packet::new("original", Arc::clone(&registry));
    packet
        .insert_at_front(Chunk::fields(Header { kind: 1, length: 0x0203 }).into_shared())
        .expect("header");
    let wire = packet.peek_all_as_bytes().expect("serialize");
    assert_eq!(content_of(&wire), vec![1, 2, 3]);

    let mut reloaded = Packet::with_content("reloaded", registry, wire);
    let header = reloaded.pop_at_front::<Header>(None).expect("deserialize header");
    assert_eq!(
        header.as_fields::<Header>(),
        Some(&Header { kind: 1, length: 0x0203 })
    );
    assert_eq!(reloaded.data_length(), 0);
}

#[rstest]
#[case(&[1, 2], None, false)]
#[case(&[1, 2, 3], None, true)]
#[case(&[1, 2, 3], Some(4), false)]
#[case(&[], None, false)]
fn has_at_front_reports_complete_headers(
    registry: Arc<SerializerRegistry>,
    #[case] data: &[u8],
    #[case] length: Option<usize>,
    #[case] expected: bool,
) {
    let content = if data.is_empty() {
        Chunk::empty().into_shared()
    } else {
        bytes(data)
    };
    let packet = Packet::with_content("probe", registry, content);
    assert_eq!(packet.has_at_front::<Header>(length).expect("probe"), expected);
}

#[rstest]
fn has_at_back_checks_the_trailer(registry: Arc<SerializerRegistry>) {
    let packet = Packet::with_content("probe", registry, bytes(&[1, 2, 3, 4]));
    assert!(packet.has_at_back::<BytesChunk>(Some(2)).expect("probe"));
    assert!(!packet.has_at_back::<BytesChunk>(Some(5)).expect("probe"));
}

#[rstest]
fn insertion_shifts_region_tags(registry: Arc<SerializerRegistry>) {
    let mut packet = Packet::with_content("tagged", registry, bytes(&[0; 10]));
    packet.add_region_tag(2, 6, Flow(1)).expect("tag");
    packet.insert_at(5, bytes(&[1; 4])).expect("insert");
    let ranges: Vec<_> = packet
        .all_region_tags::<Flow>(0, packet.total_length())
        .iter()
        .map(|tag| (tag.offset(), tag.length()))
        .collect();
    assert_eq!(ranges, vec![(2, 3), (9, 3)]);
}

#[rstest]
fn erasure_drops_and_shifts_region_tags(registry: Arc<SerializerRegistry>) {
    let mut packet = Packet::with_content("tagged", registry, bytes(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]));
    packet.add_region_tag(0, 4, Flow(1)).expect("first");
    packet.add_region_tag(4, 6, Flow(2)).expect("second");
    packet.erase_at(2, 4).expect("erase");
    assert_eq!(
        content_of(&packet.peek_all_as_bytes().expect("content")),
        vec![0, 1, 6, 7, 8, 9]
    );
    let tags: Vec<_> = packet
        .all_region_tags::<Flow>(0, 6)
        .iter()
        .map(|tag| (tag.offset(), tag.length(), tag.tag().0))
        .collect();
    assert_eq!(tags, vec![(0, 2, 1), (2, 4, 2)]);
}

#[rstest]
fn edits_outside_the_data_region_fail(registry: Arc<SerializerRegistry>) {
    let mut packet = Packet::with_content("bounded", registry, bytes(&[1, 2, 3, 4]));
    packet.pop_at_front::<BytesChunk>(Some(2)).expect("pop");
    assert!(matches!(packet.erase_at(0, 1), Err(ChunkError::OutOfRange { .. })));
    assert!(matches!(
        packet.insert_at(1, bytes(&[0])),
        Err(ChunkError::OutOfRange { .. })
    ));
    assert!(matches!(
        packet.insert_at_back(Chunk::empty().into_shared()),
        Err(ChunkError::EmptyChunk)
    ));
    assert!(matches!(packet.erase_at_back(3), Err(ChunkError::OutOfRange { .. })));
    assert!(packet.set_front_offset(5).is_err());
    assert!(packet.set_back_offset(1).is_err());
}

#[rstest]
fn oversized_insertions_fail_before_editing(registry: Arc<SerializerRegistry>) {
    let mut packet = Packet::with_content("huge", registry, bytes(&[1, 2, 3, 4]));
    packet.add_region_tag(0, 4, Flow(1)).expect("tag");
    assert!(matches!(
        packet.insert_at_back(Chunk::byte_count(usize::MAX - 1).into_shared()),
        Err(ChunkError::OutOfRange { .. })
    ));
    assert!(matches!(
        packet.insert_at_front(Chunk::byte_count(usize::MAX / 2 + 1).into_shared()),
        Err(ChunkError::OutOfRange { .. })
    ));
    assert_eq!(packet.total_length(), 4);
    assert_eq!(packet.region_tag::<Flow>(0, 4), Ok(&Flow(1)));
}

#[rstest]
fn removed_chunks_are_mutable(registry: Arc<SerializerRegistry>) {
    let mut packet = Packet::with_content("owned", registry, bytes(&[1, 2, 3, 4]));
    let mut removed = packet.remove_at_front::<BytesChunk>(Some(2)).expect("remove");
    assert!(removed.is_mutable());
    removed.set_byte(0, 9).expect("mutable bytes");
    assert_eq!(content_of(&removed), vec![9, 2]);
    assert_eq!(packet.total_length(), 2);
    assert_eq!(
        content_of(&packet.peek_all_as_bytes().expect("rest")),
        vec![3, 4]
    );
    let tail = packet.remove_at_back::<BytesChunk>(Some(1)).expect("remove back");
    assert_eq!(content_of(&tail), vec![4]);
}

#[rstest]
fn trim_drops_popped_content(registry: Arc<SerializerRegistry>) {
    let mut packet = Packet::with_content("trimmed", registry, bytes(&[1, 2, 3, 4, 5]));
    packet.pop_at_front::<BytesChunk>(Some(1)).expect("front");
    packet.pop_at_back::<BytesChunk>(Some(2)).expect("back");
    packet.trim().expect("trim");
    assert_eq!((packet.front_offset(), packet.back_offset()), (0, 2));
    assert_eq!(
        content_of(&packet.peek_all_as_bytes().expect("content")),
        vec![2, 3]
    );
}

#[rstest]
fn clones_do_not_share_edits(registry: Arc<SerializerRegistry>) {
    let mut original = Packet::with_content("original", registry, bytes(&[1, 2]));
    original.add_tag(Hops(1)).expect("tag");
    let mut copy = original.clone();
    copy.insert_at_back(bytes(&[3])).expect("grow copy");
    copy.tag_mut::<Hops>().expect("hops").0 = 2;
    copy.add_tag_if_absent::<Hops>().expect("still attached").0 += 1;
    assert_eq!(original.total_length(), 2);
    assert_eq!(original.tag::<Hops>(), Ok(&Hops(1)));
    assert_eq!(copy.find_tag::<Hops>(), Some(&Hops(3)));
    assert!(copy.remove_tag::<Hops>().is_ok());
    assert!(copy.remove_tag_if_present::<Hops>().is_none());
}

#[rstest]
fn region_tags_must_fit_the_content(registry: Arc<SerializerRegistry>) {
    let mut packet = Packet::with_content("tagged", registry, bytes(&[0; 4]));
    assert!(matches!(
        packet.add_region_tag(2, 4, Flow(1)),
        Err(Error::Chunk(ChunkError::OutOfRange { .. }))
    ));
    packet.add_region_tag(0, 4, Flow(1)).expect("whole content");
    assert!(matches!(packet.add_region_tag(1, 1, Flow(2)), Err(Error::Tag(_))));
    assert_eq!(packet.region_tag::<Flow>(0, 4), Ok(&Flow(1)));
    assert!(packet.find_region_tag::<Flow>(0, 2).is_none());
    packet.map_all_region_tags_for_update::<Flow>(0, 2, |_, _, flow| flow.0 = 5);
    let mut seen = Vec::new();
    packet.map_all_region_tags::<Flow>(0, 4, |offset, length, flow| seen.push((offset, length, flow.0)));
    assert_eq!(seen, vec![(0, 2, 5), (2, 2, 1)]);
    assert!(packet.remove_region_tag::<Flow>(0, 2).is_ok());
    assert!(packet.remove_region_tag_if_present::<Flow>(0, 2).is_none());
    assert_eq!(packet.region_tags().len(), 1);
}

#[rstest]
fn whole_content_peek_reuses_the_content(registry: Arc<SerializerRegistry>) {
    let content = bytes(&[5; 3]);
    let packet = Packet::with_content("whole", registry, Arc::clone(&content));
    let all = packet.peek_all::<Chunk>().expect("peek all");
    assert!(Arc::ptr_eq(&all, &content));
    assert!(matches!(packet.peek_at::<Chunk>(1, None).expect("tail").data(), ChunkData::Bytes(_)));
}

#[rstest]
fn display_shows_the_data_region(registry: Arc<SerializerRegistry>) {
    let packet = Packet::with_content("p", registry, bytes(&[0xab]));
    assert_eq!(
        packet.to_string(),
        "Packet p, length = 1 B, data = [0, 1), content = {BytesChunk, length = 1 B, bytes = {AB}}"
    );
}
