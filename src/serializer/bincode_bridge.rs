//! Ready-made serializer for `serde` fields types, encoded with `bincode`.

use std::{fmt, marker::PhantomData};

use bincode::{
    config::{self, BigEndian, Configuration, Fixint},
    error::DecodeError,
    serde::{decode_from_slice, encode_to_vec},
};
use serde::{Serialize, de::DeserializeOwned};

use super::{Decoded, FieldsSerializer, MemoryInputStream, MemoryOutputStream, SerializerError};
use crate::chunk::FieldsChunk;

type WireConfig = Configuration<BigEndian, Fixint>;

const fn wire_config() -> WireConfig { config::standard().with_big_endian().with_fixed_int_encoding() }

/// Serializes `T` with `bincode` using big-endian fixed-width integers, so
/// types made of fixed-size fields have a stable encoded length.
///
/// Short input is zero-padded before decoding; the registry then marks the
/// resulting chunk incomplete.
///
/// # Examples
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use wirechunk::{BincodeFieldsSerializer, Chunk, FieldsChunk, SerializerRegistry};
///
/// #[derive(Clone, Debug, Serialize, Deserialize)]
/// struct Port {
///     number: u16,
/// }
///
/// impl FieldsChunk for Port {
///     fn chunk_length(&self) -> usize { 2 }
/// }
///
/// let mut registry = SerializerRegistry::new();
/// registry.register(BincodeFieldsSerializer::<Port>::new()).unwrap();
/// let bytes = registry.serialize(&Chunk::fields(Port { number: 0x0102 })).unwrap();
/// assert_eq!(bytes.as_ref(), &[1, 2]);
/// ```
pub struct BincodeFieldsSerializer<T> {
    _fields: PhantomData<fn() -> T>,
}

impl<T> BincodeFieldsSerializer<T> {
    /// Create the serializer.
    #[must_use]
    pub const fn new() -> Self { Self { _fields: PhantomData } }
}

impl<T> Default for BincodeFieldsSerializer<T> {
    fn default() -> Self { Self::new() }
}

impl<T> Clone for BincodeFieldsSerializer<T> {
    fn clone(&self) -> Self { *self }
}

impl<T> Copy for BincodeFieldsSerializer<T> {}

impl<T> fmt::Debug for BincodeFieldsSerializer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BincodeFieldsSerializer")
            .field("fields", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> FieldsSerializer for BincodeFieldsSerializer<T>
where
    T: FieldsChunk + Serialize + DeserializeOwned,
{
    type Fields = T;

    fn serialize(&self, stream: &mut MemoryOutputStream, fields: &T) -> Result<(), SerializerError> {
        let encoded = encode_to_vec(fields, wire_config())?;
        stream.write_bytes(&encoded);
        Ok(())
    }

    fn deserialize(&self, stream: &mut MemoryInputStream) -> Result<Decoded<T>, SerializerError> {
        let mut input = stream.remaining_bytes().to_vec();
        loop {
            match decode_from_slice::<T, _>(&input, wire_config()) {
                Ok((fields, consumed)) => {
                    stream.skip(consumed);
                    return Ok(Decoded::new(fields));
                }
                Err(DecodeError::UnexpectedEnd { additional }) => {
                    input.resize(input.len() + additional, 0);
                }
                Err(error) => return Err(error.into()),
            }
        }
    }
}
