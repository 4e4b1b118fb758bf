//! Utility functions for openapi2crd

use sha2::{Digest, Sha256};

/// Root segment of every converter path
pub const ROOT_SEGMENT: &str = "$";

/// Array wildcard segment
pub const ITEMS_SEGMENT: &str = "[*]";

/// Render converter path segments as a JSON path.
///
/// Segments are joined with `.`, except the array wildcard which is glued to
/// its parent: `["$", "items", "[*]", "name"]` renders as `$.items[*].name`.
pub fn json_path(segments: &[String]) -> String {
    let mut path = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 && segment != ITEMS_SEGMENT {
            path.push('.');
        }
        path.push_str(segment);
    }
    path
}

/// Whether the segments denote the root of a conversion
pub fn is_root(segments: &[String]) -> bool {
    segments.len() <= 1
}

/// Last dotted segment of a JSON path, with any array wildcard stripped
pub fn leaf_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches(ITEMS_SEGMENT);
    trimmed.rsplit('.').next().unwrap_or(trimmed)
}

/// Calculate SHA256 hash of a byte slice, hex encoded
pub fn calculate_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}
