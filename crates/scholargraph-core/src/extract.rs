//! Entity extraction: source table → node rows
//!
//! Projects the mapped columns in schema order, applies each column's
//! coercion, deduplicates on the identifier (first occurrence wins) and
//! appends the node label.

use crate::error::{Error, Result};
use crate::schema::{ColumnMap, LABEL_COLUMN, NodeColumn, NodeSchema};
use crate::table::Table;

/// Node rows ready for emission, plus the header that describes them.
#[derive(Debug, Clone)]
pub struct NodeTable {
    pub schema: NodeSchema,
    pub header: String,
    pub table: Table,
    /// Position of the identifier column in `table`.
    pub id_index: usize,
}

impl NodeTable {
    /// Identifier values in emission order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.table
            .rows()
            .iter()
            .filter_map(move |row| row[self.id_index].as_deref())
    }
}

/// Resolve which schema columns the mapping provides, in schema order.
fn resolve<'a>(
    schema: &'a NodeSchema,
    mapping: &'a [ColumnMap],
) -> Result<Vec<(&'a NodeColumn, &'a ColumnMap)>> {
    let layout: Vec<_> = schema
        .columns
        .iter()
        .filter_map(|col| {
            mapping
                .iter()
                .find(|m| m.target == col.name)
                .map(|m| (col, m))
        })
        .collect();

    if !layout.iter().any(|(col, _)| col.is_id()) {
        return Err(Error::MissingColumn {
            table: schema.file_stem.to_string(),
            column: schema.id_column().name.to_string(),
        });
    }
    Ok(layout)
}

/// Extract one node type from `source`.
///
/// Schema columns with no entry in `mapping` are left out of both header
/// and content. Columns of `source` not named by `mapping` are ignored.
pub fn extract(source: &Table, schema: &NodeSchema, mapping: &[ColumnMap]) -> Result<NodeTable> {
    let layout = resolve(schema, mapping)?;
    let indices = layout
        .iter()
        .map(|(_, m)| source.column_index(m.source))
        .collect::<Result<Vec<_>>>()?;

    let mut columns: Vec<String> = layout.iter().map(|(col, _)| col.header_name()).collect();
    columns.push(LABEL_COLUMN.to_string());
    let id_index = layout
        .iter()
        .position(|(col, _)| col.is_id())
        .unwrap_or_default();

    let id_source = indices[id_index];
    let mut table = Table::new(schema.file_stem, columns);
    let mut without_id = 0usize;
    for row in source.rows() {
        // Checked before coercion so an absent id never reaches a strict cast
        if row[id_source].is_none() {
            without_id += 1;
            continue;
        }
        let mut out = Vec::with_capacity(layout.len() + 1);
        for ((col, map), &idx) in layout.iter().zip(&indices) {
            let value = map.coercion.apply(col.name, row[idx].as_deref())?;
            out.push((!value.is_empty()).then_some(value));
        }
        if out[id_index].is_none() {
            without_id += 1;
            continue;
        }
        out.push(Some(schema.label.to_string()));
        table.push(out);
    }
    if without_id > 0 {
        log::warn!("{}: skipped {without_id} rows without an identifier", schema.label);
    }

    let id_header = table.columns()[id_index].clone();
    let before = table.len();
    let removed = table.dedup_by(&[id_header.as_str()])?;
    if removed > 0 {
        log::info!(
            "{}: dropped {removed} of {before} rows with a duplicate {}",
            schema.label,
            schema.id_column().name
        );
    }

    let header = NodeSchema::header_for(layout.iter().map(|(col, _)| *col));
    Ok(NodeTable {
        schema: *schema,
        header,
        table,
        id_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Coercion, Namespace};

    const AUTHOR: NodeSchema = NodeSchema {
        label: "Author",
        file_stem: "authors",
        columns: &[
            NodeColumn::id("author_ID", Namespace::Author),
            NodeColumn::string("full_name"),
            NodeColumn::int("h_index_real"),
            NodeColumn::int("h_index_calculated"),
        ],
    };

    const MAPPING: &[ColumnMap] = &[
        ColumnMap::text("author_ID", "author_ID"),
        ColumnMap::text("full_name", "full_name"),
        ColumnMap::new("h_index_real", "h_idex_real", Coercion::IntOr(-1)),
        ColumnMap::new("h_index_calculated", "h_idex_calculated", Coercion::Int),
    ];

    fn authors() -> Table {
        Table::from_rows(
            "authors",
            &["", "author_ID", "full_name", "h_idex_real", "h_idex_calculated", "unused"],
            &[
                &["0", "A1", "Ada", "3.0", "4", "x"],
                &["1", "A4", "Bob", "", "2", "y"],
                &["2", "A1", "Ada again", "9", "9", "z"],
            ],
        )
    }

    #[test]
    fn header_and_rows_follow_schema() {
        let nodes = extract(&authors(), &AUTHOR, MAPPING).unwrap();
        assert_eq!(
            nodes.header,
            "author_ID:ID(Author-ID),full_name,h_index_real:int,h_index_calculated:int,:LABEL"
        );
        assert_eq!(nodes.table.columns().len(), 5);
        assert_eq!(
            nodes.table.rows()[0],
            vec![
                Some("A1".into()),
                Some("Ada".into()),
                Some("3".into()),
                Some("4".into()),
                Some("Author".into())
            ]
        );
    }

    #[test]
    fn missing_h_index_real_uses_sentinel() {
        let nodes = extract(&authors(), &AUTHOR, MAPPING).unwrap();
        assert_eq!(nodes.table.rows()[1][2].as_deref(), Some("-1"));
    }

    #[test]
    fn duplicates_keep_first_occurrence() {
        let nodes = extract(&authors(), &AUTHOR, MAPPING).unwrap();
        assert_eq!(nodes.table.len(), 2);
        assert_eq!(nodes.ids().collect::<Vec<_>>(), vec!["A1", "A4"]);
        assert_eq!(nodes.table.rows()[0][1].as_deref(), Some("Ada"));
    }

    #[test]
    fn unmapped_attributes_are_omitted() {
        let mapping = &[ColumnMap::text("author_ID", "author_ID")];
        let nodes = extract(&authors(), &AUTHOR, mapping).unwrap();
        assert_eq!(nodes.header, "author_ID:ID(Author-ID),:LABEL");
        assert_eq!(nodes.table.rows()[0].len(), 2);
    }

    #[test]
    fn missing_id_mapping_is_an_error() {
        let mapping = &[ColumnMap::text("full_name", "full_name")];
        assert!(extract(&authors(), &AUTHOR, mapping).is_err());
    }

    #[test]
    fn rows_without_identifier_are_skipped() {
        let mut src = authors();
        src.push(vec![None, None, Some("Nobody".into()), None, Some("1".into()), None]);
        let nodes = extract(&src, &AUTHOR, MAPPING).unwrap();
        assert_eq!(nodes.table.len(), 2);
    }

    #[test]
    fn absent_integer_id_is_skipped_not_coerced() {
        const AFFILIATION: NodeSchema = NodeSchema {
            label: "Affiliation",
            file_stem: "affiliations",
            columns: &[
                NodeColumn::id("affiliation_ID", Namespace::Affiliation),
                NodeColumn::string("institution_name"),
            ],
        };
        const MAP: &[ColumnMap] = &[
            ColumnMap::new("affiliation_ID", "affiliation_ID", Coercion::Int),
            ColumnMap::text("institution_name", "institution_name"),
        ];
        let src = Table::from_rows(
            "affiliations",
            &["affiliation_ID", "institution_name"],
            &[&["1.0", "MIT"], &["", "Nowhere"], &["2", "ETH"]],
        );
        let nodes = extract(&src, &AFFILIATION, MAP).unwrap();
        assert_eq!(nodes.ids().collect::<Vec<_>>(), vec!["1", "2"]);
    }

    #[test]
    fn failed_cast_without_sentinel_is_fatal() {
        let mut src = authors();
        src.push(vec![
            Some("3".into()),
            Some("A9".into()),
            Some("Eve".into()),
            None,
            Some("n/a".into()),
            None,
        ]);
        let err = extract(&src, &AUTHOR, MAPPING).unwrap_err();
        assert!(matches!(err, Error::Coercion { ref column, .. } if column == "h_index_calculated"));
    }
}
