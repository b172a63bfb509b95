//! Run manifest: what a conversion run emitted, with content hashes

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::hash;

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Content rows; absent for header files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
    /// Full blake3 hex digest.
    pub hash: String,
}

/// Written next to the emitted files after a successful commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    /// Schema variant that produced the output (`enriched`, `raw`).
    pub variant: String,
    /// File name → entry, sorted by name.
    pub files: BTreeMap<String, FileEntry>,
    /// Combined hash of all files in name order.
    pub content_hash: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl RunManifest {
    /// Hash every listed file under `dir`.
    pub fn build(
        variant: &str,
        dir: &Path,
        files: impl IntoIterator<Item = (String, Option<usize>)>,
    ) -> Result<Self> {
        let mut entries = BTreeMap::new();
        for (name, rows) in files {
            let path = dir.join(&name);
            let hash = hash::file_digest(&path)
                .with_context(|| format!("failed to hash {}", path.display()))?;
            entries.insert(name, FileEntry { rows, hash });
        }
        let content_hash = hash::dataset_digest(entries.values().map(|e| e.hash.as_str()))
            .context("invalid file digest")?;
        Ok(Self {
            variant: variant.to_string(),
            files: entries,
            content_hash,
            created_at: chrono::Utc::now(),
        })
    }

    /// Short form of the combined hash for display.
    pub fn short_hash(&self) -> &str {
        hash::short_digest(&self.content_hash)
    }

    /// Files whose current content no longer matches the recorded hash
    /// (missing files included).
    pub fn stale_files(&self, dir: &Path) -> Vec<String> {
        self.files
            .iter()
            .filter(|(name, entry)| match hash::file_digest(&dir.join(name)) {
                Ok(hash) => hash != entry.hash,
                Err(_) => true,
            })
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Glob for bulk-load files in `dir` not listed in the manifest.
    pub fn untracked_files(&self, dir: &Path) -> Result<Vec<String>> {
        let pattern = dir.join("*.csv");
        let mut untracked: Vec<String> = glob::glob(&pattern.to_string_lossy())
            .context("invalid glob pattern")?
            .filter_map(|e| e.ok())
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .filter(|name| !self.files.contains_key(name))
            .collect();
        untracked.sort();
        Ok(untracked)
    }

    pub fn write_to(&self, dir: &Path) -> Result<()> {
        let path = dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(self).context("failed to serialize manifest")?;
        std::fs::write(&path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;
        log::debug!("Wrote {} ({} files)", path.display(), self.files.len());
        Ok(())
    }

    pub fn read_from(dir: &Path) -> Result<Self> {
        let path = dir.join(MANIFEST_FILE);
        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("failed to parse {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(dir: &Path) -> Vec<(String, Option<usize>)> {
        std::fs::write(dir.join("venues_header.csv"), "venue_ID:ID(Venue-ID),:LABEL").unwrap();
        std::fs::write(dir.join("venues.csv"), "V1,Venue\nV2,Venue\n").unwrap();
        vec![
            ("venues_header.csv".to_string(), None),
            ("venues.csv".to_string(), Some(2)),
        ]
    }

    #[test]
    fn build_and_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let files = fixture(dir.path());
        let manifest = RunManifest::build("enriched", dir.path(), files).unwrap();
        manifest.write_to(dir.path()).unwrap();

        let loaded = RunManifest::read_from(dir.path()).unwrap();
        assert_eq!(loaded.variant, "enriched");
        assert_eq!(loaded.files, manifest.files);
        assert_eq!(loaded.files["venues.csv"].rows, Some(2));
        assert_eq!(loaded.content_hash, manifest.content_hash);
    }

    #[test]
    fn content_hash_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let a = RunManifest::build("raw", dir.path(), fixture(dir.path())).unwrap();
        let b = RunManifest::build("raw", dir.path(), fixture(dir.path())).unwrap();
        assert_eq!(a.content_hash, b.content_hash);
        assert_eq!(a.short_hash(), &a.content_hash[..8]);
    }

    #[test]
    fn stale_and_untracked_files() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = RunManifest::build("raw", dir.path(), fixture(dir.path())).unwrap();
        assert!(manifest.stale_files(dir.path()).is_empty());

        std::fs::write(dir.path().join("venues.csv"), "V1,Venue\n").unwrap();
        std::fs::write(dir.path().join("extra.csv"), "x").unwrap();
        assert_eq!(manifest.stale_files(dir.path()), vec!["venues.csv".to_string()]);
        assert_eq!(
            manifest.untracked_files(dir.path()).unwrap(),
            vec!["extra.csv".to_string()]
        );
    }

    #[test]
    fn missing_file_fails_build() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![("nope.csv".to_string(), Some(0))];
        assert!(RunManifest::build("raw", dir.path(), files).is_err());
    }
}
