//! Canonical inputs the driver consumes, whatever the source export looks like
//!
//! A schema variant loads its concrete files and normalises them into
//! [`Sources`]: one node source per entity it can provide, and link tables
//! whose columns carry the canonical names in [`col`].

use scholargraph_core::{ColumnMap, Table};

/// Canonical link-table column names.
pub mod col {
    pub const AUTHOR: &str = "author_id";
    pub const PUBLICATION: &str = "publication_id";
    pub const AFFILIATION: &str = "affiliation_id";
    pub const VENUE: &str = "venue_id";
    /// arXiv category code, the ScientificDomain identifier.
    pub const DOMAIN: &str = "domain_id";
    /// One DOI of a publication citing the row's publication.
    pub const CITING_DOI: &str = "citing_doi";
}

/// Source rows for one node type plus how its columns map onto the schema.
#[derive(Debug, Clone)]
pub struct NodeSource {
    pub table: Table,
    pub mapping: &'static [ColumnMap],
}

impl NodeSource {
    pub fn new(table: Table, mapping: &'static [ColumnMap]) -> Self {
        Self { table, mapping }
    }
}

/// Link tables; each has exactly the two canonical columns its name implies.
#[derive(Debug, Clone, Default)]
pub struct Links {
    /// [`col::AUTHOR`], [`col::PUBLICATION`]
    pub author_publication: Option<Table>,
    /// [`col::AUTHOR`], [`col::AFFILIATION`]
    pub author_affiliation: Option<Table>,
    /// [`col::PUBLICATION`], [`col::VENUE`]
    pub publication_venue: Option<Table>,
    /// [`col::PUBLICATION`], [`col::DOMAIN`]
    pub publication_domain: Option<Table>,
    /// [`col::PUBLICATION`], [`col::CITING_DOI`], one DOI per row
    pub citations: Option<Table>,
    /// [`col::PUBLICATION`], [`col::AFFILIATION`]
    pub publication_affiliation: Option<Table>,
}

#[derive(Debug, Clone, Default)]
pub struct Sources {
    pub venues: Option<NodeSource>,
    pub authors: Option<NodeSource>,
    pub affiliations: Option<NodeSource>,
    pub publications: Option<NodeSource>,
    pub domains: Option<NodeSource>,
    pub links: Links,
}

/// Select two source columns under their canonical names.
pub fn link_table(
    name: &str,
    source: &Table,
    start: (&str, &str),
    end: (&str, &str),
) -> scholargraph_core::Result<Table> {
    Ok(source.project(&[start, end])?.with_name(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_table_renames_and_drops_extra_columns() {
        let src = Table::from_rows(
            "author2pub",
            &["", "author_ID", "publication_ID"],
            &[&["0", "A1", "P1"]],
        );
        let t = link_table(
            "author_publication",
            &src,
            ("author_ID", col::AUTHOR),
            ("publication_ID", col::PUBLICATION),
        )
        .unwrap();
        assert_eq!(t.name(), "author_publication");
        assert_eq!(t.columns(), &[col::AUTHOR, col::PUBLICATION]);
        assert_eq!(t.rows()[0], vec![Some("A1".into()), Some("P1".into())]);
    }

    #[test]
    fn link_table_missing_column_is_an_error() {
        let src = Table::from_rows("x", &["author_ID"], &[]);
        assert!(link_table("x", &src, ("author_ID", col::AUTHOR), ("nope", col::VENUE)).is_err());
    }
}
