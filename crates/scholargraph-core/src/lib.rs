//! scholargraph-core - building blocks for bulk-load graph datasets
//!
//! Loads relational exports into in-memory tables, derives node and
//! relationship sets from them (projection, joins, co-occurrence expansion)
//! and writes the header/content file pairs a graph bulk loader consumes.

pub mod cooccur;
pub mod error;
pub mod extract;
pub mod join;
pub mod logging;
pub mod progress;
pub mod schema;
pub mod sink;
pub mod source;
pub mod table;

// Re-exports for convenience
pub use cooccur::{expand, expand_unique};
pub use error::{Error, Result};
pub use extract::{NodeTable, extract};
pub use join::{IdSet, JoinKind, Pair, dedup_pairs, id_set, join, project_pairs, retain_closed};
pub use logging::init_logging;
pub use progress::{ProgressContext, finish_step, fmt_num};
pub use schema::{
    ColumnMap, Coercion, Namespace, NodeColumn, NodeSchema, ParsedHeader, RelationshipSchema,
    parse_header,
};
pub use sink::{EmittedFile, GraphSink, emit};
pub use source::{read_json_records, read_table};
pub use table::{Row, Table};
