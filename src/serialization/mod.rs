//! CBOR encoding for governance snapshots.
//!
//! Snapshots are a single CBOR item. Decoding rejects bytes left over after
//! that item, so a torn or concatenated file never loads as valid state.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("CBOR encoding failed: {0}")]
    Encode(String),

    #[error("CBOR decoding failed: {0}")]
    Decode(String),
}

pub fn to_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializationError> {
    let mut bytes = Vec::new();
    ciborium::into_writer(value, &mut bytes)
        .map_err(|e| SerializationError::Encode(e.to_string()))?;
    Ok(bytes)
}

/// Decode exactly one CBOR item from `bytes`.
pub fn from_cbor<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SerializationError> {
    let mut reader = bytes;
    let value = ciborium::from_reader(&mut reader)
        .map_err(|e| SerializationError::Decode(e.to_string()))?;
    if !reader.is_empty() {
        return Err(SerializationError::Decode(format!(
            "{} trailing bytes after snapshot",
            reader.len()
        )));
    }
    Ok(value)
}
