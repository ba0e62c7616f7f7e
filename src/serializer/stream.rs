//! In-memory byte streams used by chunk serializers.
//!
//! Integers are written and read in network byte order. The clippy
//! expectations stay scoped to the conversion points so serializer code can
//! remain explicit about wire endianness.

use bytes::{BufMut, Bytes, BytesMut};

/// Growable output stream.
#[derive(Clone, Debug, Default)]
pub struct MemoryOutputStream {
    data: BytesMut,
}

impl MemoryOutputStream {
    /// Create an empty stream.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Create an empty stream with room for `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: BytesMut::with_capacity(capacity),
        }
    }

    /// Number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize { self.data.len() }

    /// Whether nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.data.is_empty() }

    /// Borrow the written bytes.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] { &self.data }

    /// Append raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) { self.data.extend_from_slice(bytes); }

    /// Append `count` copies of `byte`.
    pub fn write_repeated(&mut self, byte: u8, count: usize) { self.data.put_bytes(byte, count); }

    /// Append one byte.
    pub fn write_u8(&mut self, value: u8) { self.data.put_u8(value); }

    /// Append a `u16` in network byte order.
    pub fn write_u16_be(&mut self, value: u16) {
        #[expect(
            clippy::big_endian_bytes,
            reason = "Network byte order requires big-endian bytes."
        )]
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    /// Append a `u32` in network byte order.
    pub fn write_u32_be(&mut self, value: u32) {
        #[expect(
            clippy::big_endian_bytes,
            reason = "Network byte order requires big-endian bytes."
        )]
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    /// Append a `u64` in network byte order.
    pub fn write_u64_be(&mut self, value: u64) {
        #[expect(
            clippy::big_endian_bytes,
            reason = "Network byte order requires big-endian bytes."
        )]
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    /// Drop everything past the first `length` bytes.
    pub fn truncate(&mut self, length: usize) { self.data.truncate(length); }

    /// Freeze the written bytes.
    #[must_use]
    pub fn into_bytes(self) -> Bytes { self.data.freeze() }
}

/// Read cursor over a shared byte buffer.
///
/// Reading past the end never fails: missing bytes read as zero, the
/// position stops at the end, and [`MemoryInputStream::is_read_beyond_end`]
/// turns true so the deserializer can mark its chunk incomplete.
#[derive(Clone, Debug)]
pub struct MemoryInputStream {
    data: Bytes,
    position: usize,
    read_beyond_end: bool,
}

impl MemoryInputStream {
    /// Create a stream positioned at the start of `data`.
    #[must_use]
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            position: 0,
            read_beyond_end: false,
        }
    }

    /// Current read offset.
    #[must_use]
    pub const fn position(&self) -> usize { self.position }

    /// Total number of bytes in the stream.
    #[must_use]
    pub fn len(&self) -> usize { self.data.len() }

    /// Whether the stream holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.data.is_empty() }

    /// Bytes left to read.
    #[must_use]
    pub fn remaining(&self) -> usize { self.data.len() - self.position }

    /// Whether some read asked for more bytes than were available.
    #[must_use]
    pub const fn is_read_beyond_end(&self) -> bool { self.read_beyond_end }

    /// Shared view of the unread bytes.
    #[must_use]
    pub fn remaining_bytes(&self) -> Bytes { self.data.slice(self.position..) }

    pub(crate) fn slice(&self, start: usize, end: usize) -> Bytes { self.data.slice(start..end) }

    /// Read up to `length` bytes, returning only what is available.
    pub fn read_available(&mut self, length: usize) -> Bytes {
        let taken = length.min(self.remaining());
        if taken < length {
            self.read_beyond_end = true;
        }
        let bytes = self.data.slice(self.position..self.position + taken);
        self.position += taken;
        bytes
    }

    /// Fill `buffer`, zero-padding whatever the stream cannot supply.
    pub fn read_into(&mut self, buffer: &mut [u8]) {
        let available = self.read_available(buffer.len());
        let (head, tail) = buffer.split_at_mut(available.len());
        head.copy_from_slice(&available);
        tail.fill(0);
    }

    /// Skip `length` bytes.
    pub fn skip(&mut self, length: usize) { let _ = self.read_available(length); }

    /// Move the cursor to `position`, clamped to the end.
    pub fn seek(&mut self, position: usize) {
        if position > self.data.len() {
            self.read_beyond_end = true;
        }
        self.position = position.min(self.data.len());
    }

    /// Read one byte.
    pub fn read_u8(&mut self) -> u8 {
        let mut buffer = [0; 1];
        self.read_into(&mut buffer);
        buffer[0]
    }

    /// Read a network-order `u16`.
    pub fn read_u16_be(&mut self) -> u16 {
        let mut buffer = [0; 2];
        self.read_into(&mut buffer);
        #[expect(
            clippy::big_endian_bytes,
            reason = "Network byte order requires big-endian bytes."
        )]
        u16::from_be_bytes(buffer)
    }

    /// Read a network-order `u32`.
    pub fn read_u32_be(&mut self) -> u32 {
        let mut buffer = [0; 4];
        self.read_into(&mut buffer);
        #[expect(
            clippy::big_endian_bytes,
            reason = "Network byte order requires big-endian bytes."
        )]
        u32::from_be_bytes(buffer)
    }

    /// Read a network-order `u64`.
    pub fn read_u64_be(&mut self) -> u64 {
        let mut buffer = [0; 8];
        self.read_into(&mut buffer);
        #[expect(
            clippy::big_endian_bytes,
            reason = "Network byte order requires big-endian bytes."
        )]
        u64::from_be_bytes(buffer)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{MemoryInputStream, MemoryOutputStream};

    #[test]
    fn integers_use_network_byte_order() {
        let mut output = MemoryOutputStream::new();
        output.write_u16_be(0x1234);
        output.write_u32_be(0x5678_9abc);
        output.write_u8(0xde);
        assert_eq!(output.as_slice(), &[0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc, 0xde]);

        let mut input = MemoryInputStream::new(output.into_bytes());
        assert_eq!(input.read_u16_be(), 0x1234);
        assert_eq!(input.read_u32_be(), 0x5678_9abc);
        assert_eq!(input.read_u8(), 0xde);
        assert!(!input.is_read_beyond_end());
    }

    #[rstest]
    #[case(vec![], 0)]
    #[case(vec![0xff], 0xff00)]
    fn short_reads_pad_with_zeros(#[case] data: Vec<u8>, #[case] expected: u16) {
        let length = data.len();
        let mut input = MemoryInputStream::new(data);
        assert_eq!(input.read_u16_be(), expected);
        assert!(input.is_read_beyond_end());
        assert_eq!(input.position(), length);
    }

    #[test]
    fn read_available_returns_only_what_exists() {
        let mut input = MemoryInputStream::new(vec![1, 2, 3]);
        assert_eq!(input.read_available(2).as_ref(), &[1, 2]);
        assert_eq!(input.read_available(5).as_ref(), &[3]);
        assert!(input.is_read_beyond_end());
        assert_eq!(input.remaining(), 0);
    }
}
