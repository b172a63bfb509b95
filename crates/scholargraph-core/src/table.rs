//! In-memory row set with named columns
//!
//! Values are kept as raw strings; `None` marks an absent value (empty
//! delimited field, JSON `null`, or the unmatched side of a left join).

use rustc_hash::FxHashSet;

use crate::error::{Error, Result};
use crate::schema::Coercion;

/// One row, positionally aligned with [`Table::columns`].
pub type Row = Vec<Option<String>>;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from string literals. Empty strings become `None`.
    pub fn from_rows(name: &str, columns: &[&str], rows: &[&[&str]]) -> Self {
        let mut table = Self::new(name, columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            table.push(
                row.iter()
                    .map(|v| (!v.is_empty()).then(|| v.to_string()))
                    .collect(),
            );
        }
        table
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a row. Panics in debug builds on a width mismatch.
    pub fn push(&mut self, row: Row) {
        debug_assert_eq!(row.len(), self.columns.len(), "row width mismatch");
        self.rows.push(row);
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn column_index(&self, column: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| Error::MissingColumn {
                table: self.name.clone(),
                column: column.to_string(),
            })
    }

    /// Select `(source, target)` columns in declaration order, renaming each
    /// source column to its target. Columns not listed are dropped.
    pub fn project(&self, mapping: &[(&str, &str)]) -> Result<Table> {
        let indices = mapping
            .iter()
            .map(|(source, _)| self.column_index(source))
            .collect::<Result<Vec<_>>>()?;
        let columns = mapping.iter().map(|(_, target)| target.to_string()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Ok(Table {
            name: self.name.clone(),
            columns,
            rows,
        })
    }

    /// All values of one column, in row order.
    pub fn column_values(&self, column: &str) -> Result<impl Iterator<Item = Option<&str>>> {
        let idx = self.column_index(column)?;
        Ok(self.rows.iter().map(move |row| row[idx].as_deref()))
    }

    /// Replace each row by one row per element that `split` returns for the
    /// value in `column`. `split` also gets the row's position. Rows whose
    /// value is absent, or splits into nothing, disappear.
    pub fn explode<F>(&self, column: &str, mut split: F) -> Result<Table>
    where
        F: FnMut(usize, &str) -> Result<Vec<String>>,
    {
        let idx = self.column_index(column)?;
        let mut out = Table::new(self.name.clone(), self.columns.clone());
        for (i, row) in self.rows.iter().enumerate() {
            let Some(value) = row[idx].as_deref() else {
                continue;
            };
            for item in split(i, value)? {
                let mut exploded = row.clone();
                exploded[idx] = Some(item);
                out.rows.push(exploded);
            }
        }
        Ok(out)
    }

    /// Keep the first row for every distinct combination of `key` values.
    /// Returns the number of rows removed.
    pub fn dedup_by(&mut self, key: &[&str]) -> Result<usize> {
        let indices = key
            .iter()
            .map(|c| self.column_index(c))
            .collect::<Result<Vec<_>>>()?;
        let before = self.rows.len();
        let mut seen: FxHashSet<Vec<Option<String>>> = FxHashSet::default();
        self.rows.retain(|row| {
            let k: Vec<Option<String>> = indices.iter().map(|&i| row[i].clone()).collect();
            seen.insert(k)
        });
        Ok(before - self.rows.len())
    }

    /// Apply `coercion` to every present value of `column` in place.
    /// Absent values stay absent.
    pub fn coerce_column(&mut self, column: &str, coercion: Coercion) -> Result<()> {
        let idx = self.column_index(column)?;
        for row in &mut self.rows {
            if row[idx].is_none() {
                continue;
            }
            let value = coercion.apply(column, row[idx].as_deref())?;
            row[idx] = (!value.is_empty()).then_some(value);
        }
        Ok(())
    }
}
