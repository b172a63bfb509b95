//! Tabular record source: delimited text and JSON-lines files
//!
//! The format is chosen from the file extension:
//! - `.tsv` → tab-delimited
//! - `.json` / `.jsonl` → one JSON object per line
//! - anything else → comma-delimited
//!
//! A trailing `.gz` is decoded transparently and ignored for the decision.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::table::{Row, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Delimited(u8),
    JsonLines,
}

fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

/// Infer the on-disk format from the file extension.
pub fn infer_format(path: &Path) -> SourceFormat {
    let effective = if is_gzip(path) {
        Path::new(path.file_stem().unwrap_or_default())
    } else {
        path
    };
    match effective.extension().and_then(|e| e.to_str()) {
        Some("tsv") => SourceFormat::Delimited(b'\t'),
        Some("json" | "jsonl") => SourceFormat::JsonLines,
        _ => SourceFormat::Delimited(b','),
    }
}

fn open(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path)?;
    if is_gzip(path) {
        Ok(Box::new(GzDecoder::new(BufReader::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Table name derived from the file name without extensions.
fn table_name(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.split('.').next().unwrap_or_default().to_string()
}

/// Load a whole file into memory, preserving column order and raw strings.
pub fn read_table(path: &Path) -> Result<Table> {
    let table = match infer_format(path) {
        SourceFormat::Delimited(delimiter) => read_delimited(path, delimiter)?,
        SourceFormat::JsonLines => read_json_table(path)?,
    };
    log::debug!(
        "Loaded {} rows x {} columns from {}",
        table.len(),
        table.columns().len(),
        path.display()
    );
    Ok(table)
}

fn read_delimited(path: &Path, delimiter: u8) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(false)
        .from_reader(open(path)?);

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| Error::from_csv(path, e))?
        .iter()
        .map(str::to_string)
        .collect();
    let mut table = Table::new(table_name(path), columns);

    for record in reader.records() {
        let record = record.map_err(|e| Error::from_csv(path, e))?;
        table.push(
            record
                .iter()
                .map(|v| (!v.is_empty()).then(|| v.to_string()))
                .collect(),
        );
    }
    Ok(table)
}

/// Visit each non-blank line with its 1-based line number.
fn for_each_line(path: &Path, mut f: impl FnMut(u64, &str) -> Result<()>) -> Result<()> {
    let mut reader = BufReader::new(open(path)?);
    let mut buf = String::with_capacity(4096);
    let mut line_no = 0u64;
    loop {
        buf.clear();
        if reader.read_line(&mut buf)? == 0 {
            break;
        }
        line_no += 1;
        let line = buf.trim();
        if !line.is_empty() {
            f(line_no, line)?;
        }
    }
    Ok(())
}

/// Deserialize every line of a JSON-lines file into `T`.
pub fn read_json_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut records = Vec::new();
    for_each_line(path, |line_no, line| {
        let record = serde_json::from_str(line)
            .map_err(|e| Error::malformed(path, line_no, e.to_string()))?;
        records.push(record);
        Ok(())
    })?;
    Ok(records)
}

fn render(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(_) | Value::Number(_) => Some(value.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

/// Generic JSON-lines table: columns are keys in first-seen order, nested
/// values are kept as compact JSON text.
fn read_json_table(path: &Path) -> Result<Table> {
    let mut objects = Vec::new();
    for_each_line(path, |line_no, line| {
        match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(map)) => objects.push(map),
            Ok(_) => return Err(Error::malformed(path, line_no, "expected a JSON object")),
            Err(e) => return Err(Error::malformed(path, line_no, e.to_string())),
        }
        Ok(())
    })?;

    let mut columns: Vec<String> = Vec::new();
    for map in &objects {
        for key in map.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }

    let mut table = Table::new(table_name(path), columns);
    for map in &objects {
        let row: Row = table
            .columns()
            .iter()
            .map(|c| map.get(c).and_then(render))
            .collect();
        table.push(row);
    }
    Ok(table)
}
