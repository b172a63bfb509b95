//! Hex blake3 digests of emitted bulk-load files

use std::io;
use std::path::Path;

/// Hex characters shown for a digest in tables and log lines.
const SHORT_LEN: usize = 8;

/// Digest of one emitted file.
pub fn file_digest(path: &Path) -> io::Result<String> {
    let mut hasher = blake3::Hasher::new();
    hasher.update_mmap(path)?;
    Ok(hasher.finalize().to_hex().to_string())
}

/// Digest of a whole dataset: blake3 over the decoded file digests, in
/// the order given. `None` if any digest is not 64 hex characters.
pub fn dataset_digest<'a>(digests: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let mut hasher = blake3::Hasher::new();
    for hex in digests {
        let hash = blake3::Hash::from_hex(hex).ok()?;
        hasher.update(hash.as_bytes());
    }
    Some(hasher.finalize().to_hex().to_string())
}

/// Display prefix of a hex digest.
pub fn short_digest(hex: &str) -> &str {
    hex.get(..SHORT_LEN).unwrap_or(hex)
}
