//! Content hashing for emitted filenames.
//!
//! # Usage
//!
//! ```ignore
//! use crate::utils::hash;
//!
//! let name = format!("photo-{}.webp", hash::filename_hash(&bytes)); // 12 hex chars
//! ```

/// Compute blake3 hash for filename (12 hex chars).
///
/// Used for cache-correct file naming: content changes → filename changes.
pub fn filename_hash(content: &[u8]) -> String {
    let hash = blake3::hash(content);
    hash.to_hex()[..12].to_string()
}
