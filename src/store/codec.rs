//! Deterministic value codec for store records.
//!
//! Records are encoded with bincode using fixed-width integers, big-endian
//! byte order and strict trailing-byte rejection, so the same value always
//! produces the same bytes on every replica and a truncated or padded record
//! never decodes.

use bincode::Options;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Byte length of an encoded counter value.
pub const COUNTER_LEN: usize = std::mem::size_of::<u64>();

/// Failure to encode or decode a stored value.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The value could not be serialized.
    #[error("encode error: {0}")]
    Encode(String),

    /// The stored bytes do not describe a valid value.
    #[error("decode error: {0}")]
    Decode(String),
}

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_big_endian()
        .reject_trailing_bytes()
}

/// Serializes a record into its canonical bytes.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if serde rejects the value.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
    options()
        .serialize(value)
        .map_err(|e| CodecError::Encode(e.to_string()))
}

/// Deserializes a record from its canonical bytes.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] on truncated, padded or otherwise
/// malformed input.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    options()
        .deserialize(bytes)
        .map_err(|e| CodecError::Decode(e.to_string()))
}

/// Encodes a counter as 8 big-endian bytes.
#[must_use]
pub fn encode_counter(value: u64) -> [u8; COUNTER_LEN] {
    value.to_be_bytes()
}

/// Decodes a counter written by [`encode_counter`].
///
/// # Errors
///
/// Returns [`CodecError::Decode`] when `bytes` is not exactly 8 bytes long.
pub fn decode_counter(bytes: &[u8]) -> Result<u64, CodecError> {
    let raw: [u8; COUNTER_LEN] = bytes.try_into().map_err(|_| {
        CodecError::Decode(format!(
            "counter must be {COUNTER_LEN} bytes, got {}",
            bytes.len()
        ))
    })?;
    Ok(u64::from_be_bytes(raw))
}
