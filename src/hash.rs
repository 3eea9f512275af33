use sha2::{Digest, Sha256};

/// Stable identity for a page URL or a resolved image URL.
///
/// Lower-case hex SHA-256 of the UTF-8 bytes, 64 characters long. Used both as
/// the report key for pages and as the deduplication key for images.
pub fn resource_id(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}
