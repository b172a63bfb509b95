//! scholargraph-pipeline: scholarly exports → property-graph bulk-load files
//!
//! [`graph`] declares the target node and relationship types, [`variant`]
//! adapts each supported source export into canonical [`sources`], and
//! [`runner::run`] drives the one fixed conversion pass.

pub mod graph;
mod runner;
pub mod sources;
pub mod variant;
mod verify;

pub use runner::{StepKind, StepSummary, Summary, run};
pub use sources::{Links, NodeSource, Sources};
pub use variant::{EnrichedPaths, EnrichedVariant, RawVariant, SchemaVariant, VariantKind};
pub use verify::{FileKind, FileReport, VerifyReport, Violation, verify};
