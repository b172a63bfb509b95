//! Schema variants: how one kind of source export maps onto the graph

pub mod enriched;
pub mod raw;

use std::fmt;
use std::str::FromStr;

use anyhow::Result;

use crate::sources::Sources;

pub use enriched::{EnrichedPaths, EnrichedVariant};
pub use raw::RawVariant;

/// A source export the driver can convert.
pub trait SchemaVariant {
    /// Short name recorded in the run manifest.
    fn name(&self) -> &'static str;

    /// Load every input file and normalise it into canonical sources.
    fn load(&self) -> Result<Sources>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantKind {
    Enriched,
    Raw,
}

impl VariantKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Enriched => "enriched",
            Self::Raw => "raw",
        }
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariantKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "enriched" => Ok(Self::Enriched),
            "raw" => Ok(Self::Raw),
            other => Err(format!("unknown schema variant: {other} (expected enriched or raw)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_kind_roundtrip() {
        for kind in [VariantKind::Enriched, VariantKind::Raw] {
            assert_eq!(kind.as_str().parse::<VariantKind>().unwrap(), kind);
        }
        assert!("json".parse::<VariantKind>().is_err());
    }
}
