//! Bulk-load file emitter with staged, all-or-nothing replacement
//!
//! Files are written into `<output_dir>/.staging` and only moved over the
//! previous outputs by [`GraphSink::commit`]. A run that fails before commit
//! leaves the last good dataset in place. A committed run owns the whole
//! directory: file pairs it did not stage are removed.

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;

use crate::error::{Error, Result};
use crate::extract::NodeTable;
use crate::join::Pair;
use crate::schema::RelationshipSchema;
use crate::table::Table;

/// Staging directory name inside the output directory.
pub const STAGING_DIR: &str = ".staging";

pub fn header_file_name(name: &str) -> String {
    format!("{name}_header.csv")
}

pub fn content_file_name(name: &str) -> String {
    format!("{name}.csv")
}

/// Write one bulk-load file pair.
///
/// `header_line` goes verbatim into `header_path` (no trailing newline).
/// `table` rows go into `content_path` comma-delimited, without a header
/// row, absent values as empty fields. Parent directories are created and
/// existing files overwritten.
pub fn emit(header_line: &str, table: &Table, header_path: &Path, content_path: &Path) -> Result<usize> {
    for path in [header_path, content_path] {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(header_path, header_line)?;

    let file = BufWriter::new(File::create(content_path)?);
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b',')
        .terminator(csv::Terminator::Any(b'\n'))
        .has_headers(false)
        .from_writer(file);
    for row in table.rows() {
        writer
            .write_record(row.iter().map(|v| v.as_deref().unwrap_or_default()))
            .map_err(|e| Error::from_csv(content_path, e))?;
    }
    writer.flush()?;
    Ok(table.len())
}

/// One file produced by a committed sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedFile {
    pub file_name: String,
    pub path: PathBuf,
    /// Content rows; `None` for header files.
    pub rows: Option<usize>,
}

/// Staged writer for a whole output dataset.
pub struct GraphSink {
    output_dir: PathBuf,
    staging_dir: PathBuf,
    staged: Vec<(String, Option<usize>)>,
}

impl std::fmt::Debug for GraphSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphSink")
            .field("output_dir", &self.output_dir)
            .field("staged", &self.staged.len())
            .finish_non_exhaustive()
    }
}

impl GraphSink {
    /// Prepare `output_dir` and a fresh staging directory inside it.
    pub fn create(output_dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(output_dir)?;
        let staging_dir = output_dir.join(STAGING_DIR);

        // Left behind by a run that failed before commit
        if staging_dir.exists() {
            log::warn!("Removing stale staging dir: {}", staging_dir.display());
            fs::remove_dir_all(&staging_dir)?;
        }
        fs::create_dir_all(&staging_dir)?;

        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            staging_dir,
            staged: Vec::new(),
        })
    }

    /// Stage `<name>_header.csv` and `<name>.csv`. Returns the row count.
    pub fn emit(&mut self, name: &str, header_line: &str, table: &Table) -> Result<usize> {
        let header = header_file_name(name);
        let content = content_file_name(name);
        let rows = emit(
            header_line,
            table,
            &self.staging_dir.join(&header),
            &self.staging_dir.join(&content),
        )?;
        self.staged.push((header, None));
        self.staged.push((content, Some(rows)));
        log::debug!("Staged {name}: {rows} rows");
        Ok(rows)
    }

    pub fn emit_nodes(&mut self, nodes: &NodeTable) -> Result<usize> {
        self.emit(nodes.schema.file_stem, &nodes.header, &nodes.table)
    }

    pub fn emit_edges(&mut self, schema: &RelationshipSchema, pairs: &[Pair]) -> Result<usize> {
        self.emit(schema.file_stem, &schema.header_line(), &schema.edge_table(pairs))
    }

    /// Stems of `<stem>_header.csv` files in the output dir that this sink
    /// has not staged.
    fn leftover_stems(&self) -> io::Result<Vec<String>> {
        let staged: FxHashSet<&str> = self.staged.iter().map(|(name, _)| name.as_str()).collect();
        let dir = glob::Pattern::escape(&self.output_dir.to_string_lossy());
        let pattern = format!("{dir}/{}", header_file_name("*"));
        let mut stems: Vec<String> = glob::glob(&pattern)
            .map_err(io::Error::other)?
            .filter_map(|entry| entry.ok())
            .filter_map(|path| {
                let name = path.file_name()?.to_str()?;
                if staged.contains(name) {
                    return None;
                }
                name.strip_suffix("_header.csv").map(str::to_string)
            })
            .collect();
        stems.sort();
        Ok(stems)
    }

    /// Move every staged file over its final path, remove file pairs left
    /// by earlier runs, and drop the staging dir.
    ///
    /// Files are renamed one at a time. An I/O failure partway through
    /// leaves a mix of old and new files with the staging dir still present,
    /// which `verify` reports; rerunning restores a consistent dataset.
    pub fn commit(self) -> io::Result<Vec<EmittedFile>> {
        let leftovers = self.leftover_stems()?;

        let mut emitted = Vec::with_capacity(self.staged.len());
        for (file_name, rows) in self.staged {
            let path = self.output_dir.join(&file_name);
            fs::rename(self.staging_dir.join(&file_name), &path)?;
            emitted.push(EmittedFile {
                file_name,
                path,
                rows,
            });
        }

        for stem in &leftovers {
            for file_name in [header_file_name(stem), content_file_name(stem)] {
                let path = self.output_dir.join(file_name);
                if path.exists() {
                    fs::remove_file(&path)?;
                }
            }
            log::info!("Removed {stem} left by an earlier run");
        }
        fs::remove_dir_all(&self.staging_dir)?;
        log::debug!(
            "Committed {} files to {}",
            emitted.len(),
            self.output_dir.display()
        );
        Ok(emitted)
    }
}
