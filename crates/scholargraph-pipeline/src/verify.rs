//! Output verification: re-read an emitted dataset and check its invariants
//!
//! Checks, per file pair found in the directory:
//! - the header parses as a node or relationship header
//! - every content row has the header's field count
//! - node ids are unique within their namespace
//! - every relationship endpoint exists in the node files of its namespace

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use scholargraph_core::sink::{STAGING_DIR, content_file_name};
use scholargraph_core::{IdSet, Namespace, ParsedHeader, parse_header};

/// Examples quoted per violation message.
const MAX_EXAMPLES: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileKind {
    Node(Namespace),
    Relationship { start: Namespace, end: Namespace },
}

#[derive(Debug, Clone)]
pub struct FileReport {
    pub name: String,
    pub kind: FileKind,
    pub rows: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub file: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct VerifyReport {
    pub files: Vec<FileReport>,
    pub violations: Vec<Violation>,
}

impl VerifyReport {
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }

    fn violation(&mut self, file: &str, message: impl Into<String>) {
        self.violations.push(Violation {
            file: file.to_string(),
            message: message.into(),
        });
    }
}

fn summarize(count: usize, what: &str, examples: &[String]) -> String {
    format!("{count} {what} (e.g. {})", examples.join(", "))
}

fn read_rows(path: &Path) -> Result<Vec<csv::StringRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    reader
        .records()
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to read {}", path.display()))
}

/// Verify every `<name>_header.csv` / `<name>.csv` pair in `dir`.
pub fn verify(dir: &Path) -> Result<VerifyReport> {
    let pattern = dir.join("*_header.csv");
    let mut headers: Vec<_> = glob::glob(&pattern.to_string_lossy())
        .context("Invalid glob pattern")?
        .filter_map(|e| e.ok())
        .collect();
    headers.sort();

    let mut report = VerifyReport::default();
    if dir.join(STAGING_DIR).exists() {
        report.violation(STAGING_DIR, "leftover staging directory from an interrupted run");
    }

    let mut ids: FxHashMap<Namespace, IdSet> = FxHashMap::default();
    let mut edges: Vec<(String, Namespace, Namespace, Vec<csv::StringRecord>)> = Vec::new();

    for header_path in headers {
        let Some(name) = header_path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_suffix("_header.csv"))
            .map(str::to_string)
        else {
            continue;
        };
        let header = fs::read_to_string(&header_path)
            .with_context(|| format!("Failed to read {}", header_path.display()))?;
        let Some(parsed) = parse_header(&header) else {
            report.violation(&name, format!("unrecognised header: {header}"));
            continue;
        };
        let content_path = dir.join(content_file_name(&name));
        if !content_path.exists() {
            report.violation(&name, "content file missing");
            continue;
        }
        let rows = read_rows(&content_path)?;

        let width = match parsed {
            ParsedHeader::Node { width, .. } | ParsedHeader::Relationship { width, .. } => width,
        };
        let ragged: Vec<String> = rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r.len() != width)
            .map(|(i, _)| format!("line {}", i + 1))
            .collect();
        if !ragged.is_empty() {
            let examples = &ragged[..ragged.len().min(MAX_EXAMPLES)];
            report.violation(
                &name,
                summarize(ragged.len(), &format!("rows without {width} fields"), examples),
            );
        }

        match parsed {
            ParsedHeader::Node {
                id_index,
                namespace,
                ..
            } => {
                let set = ids.entry(namespace).or_default();
                let mut duplicates = Vec::new();
                for id in rows.iter().filter_map(|row| row.get(id_index)) {
                    if !set.insert(id.to_string()) {
                        duplicates.push(id.to_string());
                    }
                }
                if !duplicates.is_empty() {
                    let examples = &duplicates[..duplicates.len().min(MAX_EXAMPLES)];
                    report.violation(
                        &name,
                        summarize(duplicates.len(), &format!("duplicate {namespace} values"), examples),
                    );
                }
                report.files.push(FileReport {
                    name,
                    kind: FileKind::Node(namespace),
                    rows: rows.len(),
                });
            }
            ParsedHeader::Relationship { start, end, .. } => {
                report.files.push(FileReport {
                    name: name.clone(),
                    kind: FileKind::Relationship { start, end },
                    rows: rows.len(),
                });
                edges.push((name, start, end, rows));
            }
        }
    }

    let empty = IdSet::default();
    for (name, start, end, rows) in edges {
        let start_ids = ids.get(&start).unwrap_or(&empty);
        let end_ids = ids.get(&end).unwrap_or(&empty);
        let dangling: Vec<String> = rows
            .iter()
            .filter_map(|row| {
                let (s, e) = (row.get(0)?, row.get(1)?);
                (!start_ids.contains(s) || !end_ids.contains(e)).then(|| format!("{s}->{e}"))
            })
            .collect();
        if !dangling.is_empty() {
            let examples = &dangling[..dangling.len().min(MAX_EXAMPLES)];
            report.violation(&name, summarize(dangling.len(), "dangling edges", examples));
        }
    }

    log::debug!(
        "Verified {} files in {}: {} violations",
        report.files.len(),
        dir.display(),
        report.violations.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_pair(dir: &Path, name: &str, header: &str, content: &str) {
        fs::write(dir.join(format!("{name}_header.csv")), header).unwrap();
        fs::write(dir.join(format!("{name}.csv")), content).unwrap();
    }

    fn dataset(dir: &Path) {
        write_pair(
            dir,
            "authors",
            "author_ID:ID(Author-ID),full_name,:LABEL",
            "A1,Ada,Author\nA2,Bob,Author\n",
        );
        write_pair(
            dir,
            "publications",
            "publication_ID:ID(Publication-ID),:LABEL",
            "P1,Publication\n",
        );
    }

    #[test]
    fn clean_dataset_passes() {
        let dir = TempDir::new().unwrap();
        dataset(dir.path());
        write_pair(
            dir.path(),
            "author_of",
            ":START_ID(Author-ID),:END_ID(Publication-ID),:TYPE",
            "A1,P1,AUTHOR_OF\nA2,P1,AUTHOR_OF\n",
        );
        let report = verify(dir.path()).unwrap();
        assert!(report.is_ok(), "{:?}", report.violations);
        assert_eq!(report.files.len(), 3);
        assert_eq!(report.files[0].name, "author_of");
        assert_eq!(report.files[0].rows, 2);
    }

    #[test]
    fn dangling_edge_is_reported() {
        let dir = TempDir::new().unwrap();
        dataset(dir.path());
        write_pair(
            dir.path(),
            "author_of",
            ":START_ID(Author-ID),:END_ID(Publication-ID),:TYPE",
            "A1,P1,AUTHOR_OF\nA9,P1,AUTHOR_OF\n",
        );
        let report = verify(dir.path()).unwrap();
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].file, "author_of");
        assert!(report.violations[0].message.contains("A9->P1"));
    }

    #[test]
    fn duplicate_ids_and_ragged_rows_are_reported() {
        let dir = TempDir::new().unwrap();
        write_pair(
            dir.path(),
            "authors",
            "author_ID:ID(Author-ID),full_name,:LABEL",
            "A1,Ada,Author\nA1,Ada,Author\nA2,Author\n",
        );
        let report = verify(dir.path()).unwrap();
        assert_eq!(report.violations.len(), 2);
    }

    #[test]
    fn missing_content_and_bad_header() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("venues_header.csv"), "venue_ID:ID(Venue-ID),:LABEL").unwrap();
        write_pair(dir.path(), "misc", "a,b,c", "1,2,3\n");
        let report = verify(dir.path()).unwrap();
        let files: Vec<&str> = report.violations.iter().map(|v| v.file.as_str()).collect();
        assert_eq!(files, vec!["misc", "venues"]);
    }
}
