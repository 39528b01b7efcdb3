//! Session identifier generation.

use rand::TryRngCore;
use rand::rngs::OsRng;

use crate::error::{Error, Result};

/// Generate a session identifier of `key_size` random bytes, lowercase hex encoded.
///
/// Bytes come straight from the operating system RNG. A failing RNG yields
/// [`Error::Entropy`]; no partial identifier is ever returned.
pub fn generate(key_size: usize) -> Result<String> {
    let mut bytes = vec![0u8; key_size];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| Error::Entropy(e.to_string()))?;
    Ok(hex::encode(bytes))
}

/// Shortened identifier for log fields.
pub(crate) fn short(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
