//! scholargraph-store: content hashes and run manifests for emitted datasets
//!
//! After a successful conversion the output directory carries a
//! `manifest.json` listing every bulk-load file with its row count and
//! blake3 digest, so later inspection can tell whether files were touched.

pub mod hash;
pub mod manifest;

pub use hash::{dataset_digest, file_digest, short_digest};
pub use manifest::{FileEntry, MANIFEST_FILE, RunManifest};
