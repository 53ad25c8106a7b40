//! Content addressing for generated grammar artifacts.
//!
//! The digest is an identity key, not an integrity check: two rule lists
//! that assemble to the same document text map to the same artifact name,
//! which is how redundant regenerations are detected and skipped.

use sha2::{Digest, Sha256};

/// Prefix marking a file as a generated grammar artifact.
pub const ARTIFACT_PREFIX: &str = "ttl-";

/// Suffix of generated grammar artifacts.
pub const ARTIFACT_SUFFIX: &str = ".json";

/// Lowercase hex SHA-256 of the serialized document text.
pub fn digest(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Artifact name for a digest: `ttl-<hex>.json`.
pub fn artifact_filename(digest: &str) -> String {
    format!("{ARTIFACT_PREFIX}{digest}{ARTIFACT_SUFFIX}")
}

/// Whether a store entry follows the generated-artifact naming convention.
///
/// Names that don't match are never touched during cleanup.
pub fn is_artifact_filename(name: &str) -> bool {
    let Some(stem) = name.strip_prefix(ARTIFACT_PREFIX) else {
        return false;
    };
    let Some(hex) = stem.strip_suffix(ARTIFACT_SUFFIX) else {
        return false;
    };
    !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit())
}
