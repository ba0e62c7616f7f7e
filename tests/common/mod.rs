//! Shared fixtures for integration tests.
//!
//! Provides an `ApplicationHeader` fields chunk with a hand-written
//! serializer and a registry fixture that knows about it.

// Items in this shared module may not be used by all test binaries that import it.
#![allow(
    dead_code,
    reason = "shared test utilities are not used by all test binaries"
)]

use std::sync::Arc;

use proptest::test_runner::{Config as ProptestConfig, RngAlgorithm, TestRng, TestRunner};
use rstest::fixture;
use wirechunk::{
    Chunk,
    Decoded,
    FieldsChunk,
    FieldsSerializer,
    MemoryInputStream,
    MemoryOutputStream,
    SerializerError,
    SerializerRegistry,
};

/// Serialized length of [`ApplicationHeader`].
pub const APPLICATION_HEADER_LENGTH: usize = 10;

/// Application-level header: a 16-bit field followed by a 64-bit sequence
/// number, both in network byte order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApplicationHeader {
    /// Arbitrary application value.
    pub some_field: i16,
    /// Sequence number of the message.
    pub sequence_number: u64,
}

impl FieldsChunk for ApplicationHeader {
    fn chunk_length(&self) -> usize { APPLICATION_HEADER_LENGTH }
}

/// Serializer for [`ApplicationHeader`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ApplicationHeaderSerializer;

impl FieldsSerializer for ApplicationHeaderSerializer {
    type Fields = ApplicationHeader;

    fn serialize(&self, stream: &mut MemoryOutputStream, fields: &ApplicationHeader) -> Result<(), SerializerError> {
        stream.write_u16_be(u16::from_be_bytes(fields.some_field.to_be_bytes()));
        stream.write_u64_be(fields.sequence_number);
        Ok(())
    }

    fn deserialize(&self, stream: &mut MemoryInputStream) -> Result<Decoded<ApplicationHeader>, SerializerError> {
        let some_field = i16::from_be_bytes(stream.read_u16_be().to_be_bytes());
        let sequence_number = stream.read_u64_be();
        Ok(ApplicationHeader {
            some_field,
            sequence_number,
        }
        .into())
    }
}

/// Registry knowing the [`ApplicationHeader`] serializer.
#[fixture]
pub fn registry() -> Arc<SerializerRegistry> {
    let registry = SerializerRegistry::new()
        .with_serializer(ApplicationHeaderSerializer)
        .expect("register application header serializer");
    Arc::new(registry)
}

/// Shared bytes chunk holding `data`.
pub fn bytes(data: &[u8]) -> Arc<Chunk> { Chunk::bytes(data.to_vec()).into_shared() }

/// Content of a bytes chunk.
pub fn content_of(chunk: &Chunk) -> Vec<u8> {
    chunk
        .as_bytes()
        .map(|bytes| bytes.to_vec())
        .unwrap_or_else(|| panic!("expected a bytes chunk, got {chunk}"))
}

/// Proptest runner with a fixed seed so failures reproduce.
pub fn deterministic_runner(cases: u32) -> TestRunner {
    let config = ProptestConfig {
        cases,
        ..ProptestConfig::default()
    };
    let rng = TestRng::deterministic_rng(RngAlgorithm::ChaCha);
    TestRunner::new_with_rng(config, rng)
}
