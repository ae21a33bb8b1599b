//! Shared SHA-256 hex digest utilities.

use sha2::{Digest, Sha256};

use crate::value::canonicalize;

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

/// Content hash of a document: SHA-256 over its canonical (key-sorted) JSON.
pub fn content_hash(value: &serde_json::Value) -> String {
    let canonical = canonicalize(value);
    let bytes = serde_json::to_vec(&canonical).unwrap_or_default();
    sha256_hex(&bytes)
}
