//! Declarative node/relationship schemas for bulk-load files
//!
//! A schema is the single source of truth for both the header line and the
//! column order of the content file. Headers use the bulk-loader decoration
//! syntax:
//!
//! - identifier: `name:ID(Namespace-ID)`
//! - integer attribute: `name:int`
//! - string attribute: `name`
//! - trailing `:LABEL` (nodes) or `:TYPE` (relationships)

use std::fmt;

use chrono::{Datelike, NaiveDate};

use crate::error::{Error, Result};
use crate::table::Table;

/// Identifier space that relationship files reference by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Namespace {
    Venue,
    Author,
    Affiliation,
    Publication,
    ArxivCategory,
}

impl Namespace {
    pub const ALL: [Namespace; 5] = [
        Self::Venue,
        Self::Author,
        Self::Affiliation,
        Self::Publication,
        Self::ArxivCategory,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Venue => "Venue-ID",
            Self::Author => "Author-ID",
            Self::Affiliation => "Affiliation-ID",
            Self::Publication => "Publication-ID",
            Self::ArxivCategory => "Arxiv-Category-ID",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ns| ns.as_str() == s)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Str,
    Int,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Id(Namespace),
    Attribute(ValueType),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeColumn {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl NodeColumn {
    pub const fn id(name: &'static str, namespace: Namespace) -> Self {
        Self {
            name,
            kind: ColumnKind::Id(namespace),
        }
    }

    pub const fn string(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Attribute(ValueType::Str),
        }
    }

    pub const fn int(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Attribute(ValueType::Int),
        }
    }

    /// Decorated header name, e.g. `venue_ID:ID(Venue-ID)` or `year:int`.
    pub fn header_name(&self) -> String {
        match self.kind {
            ColumnKind::Id(ns) => format!("{}:ID({ns})", self.name),
            ColumnKind::Attribute(ValueType::Int) => format!("{}:int", self.name),
            ColumnKind::Attribute(ValueType::Str) => self.name.to_string(),
        }
    }

    pub fn is_id(&self) -> bool {
        matches!(self.kind, ColumnKind::Id(_))
    }
}

pub const LABEL_COLUMN: &str = ":LABEL";
pub const TYPE_COLUMN: &str = ":TYPE";

/// Node type: label, output file stem and ordered columns.
#[derive(Debug, Clone, Copy)]
pub struct NodeSchema {
    pub label: &'static str,
    pub file_stem: &'static str,
    pub columns: &'static [NodeColumn],
}

impl NodeSchema {
    /// The identifier column. Every node schema declares exactly one.
    pub fn id_column(&self) -> &NodeColumn {
        self.columns
            .iter()
            .find(|c| c.is_id())
            .unwrap_or(&self.columns[0])
    }

    pub fn namespace(&self) -> Namespace {
        match self.id_column().kind {
            ColumnKind::Id(ns) => ns,
            ColumnKind::Attribute(_) => unreachable!("node schema without id column"),
        }
    }

    /// Header line for the full column set.
    pub fn header_line(&self) -> String {
        Self::header_for(self.columns.iter())
    }

    /// Header line for a subset of columns, in the order given.
    pub fn header_for<'a>(columns: impl Iterator<Item = &'a NodeColumn>) -> String {
        let mut fields: Vec<String> = columns.map(NodeColumn::header_name).collect();
        fields.push(LABEL_COLUMN.to_string());
        fields.join(",")
    }
}

/// Directed relationship type between two namespaces.
#[derive(Debug, Clone, Copy)]
pub struct RelationshipSchema {
    pub rel_type: &'static str,
    pub file_stem: &'static str,
    pub start: Namespace,
    pub end: Namespace,
    /// Relationship is a set: duplicate (start, end) pairs are collapsed.
    pub dedup: bool,
}

impl RelationshipSchema {
    pub fn start_column(&self) -> String {
        format!(":START_ID({})", self.start)
    }

    pub fn end_column(&self) -> String {
        format!(":END_ID({})", self.end)
    }

    pub fn header_line(&self) -> String {
        format!("{},{},{TYPE_COLUMN}", self.start_column(), self.end_column())
    }

    /// Content table: start, end, relationship type.
    pub fn edge_table(&self, pairs: &[(String, String)]) -> Table {
        let mut table = Table::new(
            self.file_stem,
            vec![
                self.start_column(),
                self.end_column(),
                TYPE_COLUMN.to_string(),
            ],
        );
        for (start, end) in pairs {
            table.push(vec![
                Some(start.clone()),
                Some(end.clone()),
                Some(self.rel_type.to_string()),
            ]);
        }
        table
    }
}

/// Value cast applied while projecting a source column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Verbatim; absent becomes an empty field.
    Text,
    /// Whitespace runs (newlines included) collapsed to a single space.
    Title,
    /// Decimal integer; integral floats like `12.0` are accepted.
    Int,
    /// Integer with a sentinel for absent or unparsable values.
    IntOr(i64),
    /// `YYYY-MM-DD` date truncated to its year.
    Year,
}

impl Coercion {
    fn target(self) -> &'static str {
        match self {
            Self::Text | Self::Title => "string",
            Self::Int | Self::IntOr(_) => "int",
            Self::Year => "date (YYYY-MM-DD)",
        }
    }

    pub fn apply(self, column: &str, value: Option<&str>) -> Result<String> {
        let fail = || Error::Coercion {
            column: column.to_string(),
            value: value.map(str::to_string),
            target: self.target(),
        };
        match self {
            Self::Text => Ok(value.unwrap_or_default().to_string()),
            Self::Title => Ok(value
                .unwrap_or_default()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")),
            Self::Int => value.and_then(parse_int).map(|n| n.to_string()).ok_or_else(fail),
            Self::IntOr(sentinel) => Ok(value.and_then(parse_int).unwrap_or(sentinel).to_string()),
            Self::Year => value
                .and_then(|v| NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d").ok())
                .map(|d| format!("{:04}", d.year()))
                .ok_or_else(fail),
        }
    }
}

fn parse_int(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(n) = s.parse::<i64>() {
        return Some(n);
    }
    let f = s.parse::<f64>().ok()?;
    (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64)
}

/// Where a node column's values come from in a source table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    /// Undecorated node column name (`NodeColumn::name`).
    pub target: &'static str,
    /// Column name in the source table.
    pub source: &'static str,
    pub coercion: Coercion,
}

impl ColumnMap {
    pub const fn new(target: &'static str, source: &'static str, coercion: Coercion) -> Self {
        Self {
            target,
            source,
            coercion,
        }
    }

    pub const fn text(target: &'static str, source: &'static str) -> Self {
        Self::new(target, source, Coercion::Text)
    }
}

/// What a bulk-load header declares, recovered from its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedHeader {
    Node {
        id_index: usize,
        namespace: Namespace,
        width: usize,
    },
    Relationship {
        start: Namespace,
        end: Namespace,
        width: usize,
    },
}

fn decorated_namespace(field: &str, prefix: &str) -> Option<Namespace> {
    let idx = field.find(prefix)?;
    let rest = &field[idx + prefix.len()..];
    Namespace::parse(rest.strip_suffix(')')?)
}

/// Parse a header line produced by [`NodeSchema::header_line`] or
/// [`RelationshipSchema::header_line`]. Returns `None` for anything else.
pub fn parse_header(line: &str) -> Option<ParsedHeader> {
    let fields: Vec<&str> = line.trim_end().split(',').collect();
    let width = fields.len();

    let start = fields.iter().find_map(|f| decorated_namespace(f, ":START_ID("));
    let end = fields.iter().find_map(|f| decorated_namespace(f, ":END_ID("));
    if let (Some(start), Some(end)) = (start, end) {
        return Some(ParsedHeader::Relationship { start, end, width });
    }

    fields.iter().enumerate().find_map(|(i, f)| {
        decorated_namespace(f, ":ID(").map(|namespace| ParsedHeader::Node {
            id_index: i,
            namespace,
            width,
        })
    })
}
