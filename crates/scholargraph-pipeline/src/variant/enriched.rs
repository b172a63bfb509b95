//! Enriched relational export: one table per entity plus explicit link tables
//!
//! Files written by dataframe exports carry a leading unnamed index column;
//! every table is accessed by column name, so it never matters.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use scholargraph_core::{ColumnMap, Coercion, Error, JoinKind, Table, join, read_table};

use super::SchemaVariant;
use crate::sources::{Links, NodeSource, Sources, col, link_table};

/// Input files of the enriched export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedPaths {
    pub venues: PathBuf,
    pub authors: PathBuf,
    pub affiliations: PathBuf,
    pub publications: PathBuf,
    pub publication_venues: PathBuf,
    pub domains: PathBuf,
    pub author_publications: PathBuf,
    pub author_affiliations: PathBuf,
    pub publication_categories: PathBuf,
    pub categories: PathBuf,
    pub citations: PathBuf,
    pub publication_affiliations: PathBuf,
}

impl EnrichedPaths {
    /// Default export file names under `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            venues: dir.join("venues.csv"),
            authors: dir.join("authors.csv"),
            affiliations: dir.join("affiliations.csv"),
            publications: dir.join("publications.csv"),
            publication_venues: dir.join("pub2venue_.csv"),
            domains: dir.join("lookup_table_domains.csv"),
            author_publications: dir.join("author2pub.csv"),
            author_affiliations: dir.join("author2affiliation.csv"),
            publication_categories: dir.join("publication2arxiv_df.tsv"),
            categories: dir.join("arxiv_categories.csv"),
            citations: dir.join("citing_pub_df200000.tsv"),
            publication_affiliations: dir.join("pub2affiliation.csv"),
        }
    }
}

const VENUE_MAP: &[ColumnMap] = &[
    ColumnMap::text("venue_ID", "venue_ID"),
    ColumnMap::text("full_name", "full_name"),
    ColumnMap::new("h_index_calculated", "h_index_calculated", Coercion::Int),
];

// Upstream spells h-index "h_idex"
const AUTHOR_MAP: &[ColumnMap] = &[
    ColumnMap::text("author_ID", "author_ID"),
    ColumnMap::text("full_name", "full_name"),
    ColumnMap::new("h_index_real", "h_idex_real", Coercion::IntOr(-1)),
    ColumnMap::new("h_index_calculated", "h_idex_calculated", Coercion::Int),
];

const AFFILIATION_MAP: &[ColumnMap] = &[
    ColumnMap::new("affiliation_ID", "affiliation_ID", Coercion::Int),
    ColumnMap::text("name", "institution_name"),
    ColumnMap::text("place", "institution_place"),
];

const VENUE_NAME: &str = "venue_name";

const PUBLICATION_MAP: &[ColumnMap] = &[
    ColumnMap::text("publication_ID", "publication_ID"),
    ColumnMap::new("title", "title", Coercion::Title),
    ColumnMap::text("doi", "DOI"),
    ColumnMap::new("year", "date", Coercion::Year),
    ColumnMap::text("venue", VENUE_NAME),
];

const DOMAIN_MAP: &[ColumnMap] = &[
    ColumnMap::text("arxiv_category", "arxiv_category"),
    ColumnMap::text("major_field", "major_field"),
    ColumnMap::text("sub_category", "sub_category"),
    ColumnMap::text("exact_category", "exact_category"),
];

#[derive(Debug, Clone)]
pub struct EnrichedVariant {
    paths: EnrichedPaths,
}

impl EnrichedVariant {
    pub fn new(paths: EnrichedPaths) -> Self {
        Self { paths }
    }
}

fn load(path: &Path) -> Result<Table> {
    read_table(path).with_context(|| format!("Failed to load {}", path.display()))
}

impl SchemaVariant for EnrichedVariant {
    fn name(&self) -> &'static str {
        "enriched"
    }

    fn load(&self) -> Result<Sources> {
        let p = &self.paths;
        let venues = load(&p.venues)?;
        let pub2venue = load(&p.publication_venues)?;
        let publications = publications_with_venue(&load(&p.publications)?, &pub2venue, &venues)?;

        let links = Links {
            author_publication: Some(link_table(
                "author_publication",
                &load(&p.author_publications)?,
                ("author_ID", col::AUTHOR),
                ("publication_ID", col::PUBLICATION),
            )?),
            author_affiliation: Some(affiliation_link(
                "author_affiliation",
                &load(&p.author_affiliations)?,
                ("author_ID", col::AUTHOR),
            )?),
            publication_venue: Some(link_table(
                "publication_venue",
                &pub2venue,
                ("publication_ID", col::PUBLICATION),
                ("venue_ID", col::VENUE),
            )?),
            publication_domain: Some(publication_domains(
                &load(&p.publication_categories)?,
                &load(&p.categories)?,
            )?),
            citations: Some(citations(&load(&p.citations)?, &p.citations)?),
            publication_affiliation: Some(affiliation_link(
                "publication_affiliation",
                &load(&p.publication_affiliations)?,
                ("publication_ID", col::PUBLICATION),
            )?),
        };

        Ok(Sources {
            venues: Some(NodeSource::new(venues, VENUE_MAP)),
            authors: Some(NodeSource::new(load(&p.authors)?, AUTHOR_MAP)),
            affiliations: Some(NodeSource::new(load(&p.affiliations)?, AFFILIATION_MAP)),
            publications: Some(NodeSource::new(publications, PUBLICATION_MAP)),
            domains: Some(NodeSource::new(load(&p.domains)?, DOMAIN_MAP)),
            links,
        })
    }
}

/// Publications left-joined with their venue's full name.
///
/// A publication listed under several venues yields several rows; entity
/// extraction keeps the first.
fn publications_with_venue(publications: &Table, pub2venue: &Table, venues: &Table) -> Result<Table> {
    let pub2venue = pub2venue.project(&[
        ("publication_ID", "publication_ID"),
        ("venue_ID", "venue_ID"),
    ])?;
    let venue_names = venues.project(&[("venue_ID", "venue_ID"), ("full_name", VENUE_NAME)])?;
    let with_venue_id = join(
        publications,
        &pub2venue,
        "publication_ID",
        "publication_ID",
        JoinKind::Left,
    )?;
    Ok(join(&with_venue_id, &venue_names, "venue_ID", "venue_ID", JoinKind::Left)?)
}

/// Link table whose second column is an affiliation id, coerced to an
/// integer the same way the affiliation nodes are.
fn affiliation_link(name: &str, source: &Table, start: (&str, &str)) -> Result<Table> {
    let mut table = link_table(name, source, start, ("affiliation_ID", col::AFFILIATION))?;
    table.coerce_column(col::AFFILIATION, Coercion::Int)?;
    Ok(table)
}

/// Publication → category code, resolving numeric category ids through the
/// category lookup table.
fn publication_domains(pub2category: &Table, categories: &Table) -> Result<Table> {
    let pub2category = pub2category.project(&[
        ("publication_ID", "publication_ID"),
        ("arxiv_category_ID", "arxiv_category_ID"),
    ])?;
    let categories = categories.project(&[
        ("arxiv_category_ID", "arxiv_category_ID"),
        ("arxiv_category", "arxiv_category"),
    ])?;
    let resolved = join(
        &pub2category,
        &categories,
        "arxiv_category_ID",
        "arxiv_category_ID",
        JoinKind::Inner,
    )?;
    Ok(link_table(
        "publication_domain",
        &resolved,
        ("publication_ID", col::PUBLICATION),
        ("arxiv_category", col::DOMAIN),
    )?)
}

/// One row per (cited publication, citing DOI).
///
/// The citing DOIs arrive as a bracketed list literal such as
/// `['10.1/a', "10.1/b"]`. Line numbers in errors assume one record per
/// line after the header.
fn citations(source: &Table, path: &Path) -> Result<Table> {
    let projected = link_table(
        "citations",
        source,
        ("publication_ID", col::PUBLICATION),
        ("citing_publication_DOI", col::CITING_DOI),
    )?;
    let out = projected.explode(col::CITING_DOI, |i, literal| {
        parse_list_literal(literal).map_err(|msg| Error::malformed(path, i as u64 + 2, msg))
    })?;
    log::debug!("citations: {} rows exploded into {} DOIs", projected.len(), out.len());
    Ok(out)
}

/// Parse a bracketed list of quoted strings. Single and double quotes are
/// accepted, backslash escapes the next character.
pub fn parse_list_literal(s: &str) -> std::result::Result<Vec<String>, String> {
    let inner = s
        .trim()
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| format!("expected a bracketed list, got {s:?}"))?;

    let mut items = Vec::new();
    let mut chars = inner.chars().peekable();
    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let Some(quote) = chars.next() else {
            break;
        };
        if quote != '\'' && quote != '"' {
            return Err(format!("expected a quoted string in {s:?}"));
        }
        let mut item = String::new();
        let mut closed = false;
        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        item.push(escaped);
                    }
                }
                c if c == quote => {
                    closed = true;
                    break;
                }
                c => item.push(c),
            }
        }
        if !closed {
            return Err(format!("unterminated string in {s:?}"));
        }
        items.push(item);

        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        match chars.next() {
            None => break,
            Some(',') => continue,
            Some(c) => return Err(format!("unexpected {c:?} in {s:?}")),
        }
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_literal_forms() {
        assert_eq!(parse_list_literal("[]").unwrap(), Vec::<String>::new());
        assert_eq!(parse_list_literal("['D1']").unwrap(), vec!["D1"]);
        assert_eq!(
            parse_list_literal(" ['10.1/a', \"10.1/b\" ,'c,d'] ").unwrap(),
            vec!["10.1/a", "10.1/b", "c,d"]
        );
        assert_eq!(parse_list_literal("['it\\'s']").unwrap(), vec!["it's"]);
        assert_eq!(parse_list_literal("['a',]").unwrap(), vec!["a"]);
    }

    #[test]
    fn list_literal_rejects_garbage() {
        assert!(parse_list_literal("D1").is_err());
        assert!(parse_list_literal("[D1]").is_err());
        assert!(parse_list_literal("['D1'").is_err());
        assert!(parse_list_literal("['D1' 'D2']").is_err());
        assert!(parse_list_literal("['D1]").is_err());
    }

    #[test]
    fn citations_explode_per_doi() {
        let src = Table::from_rows(
            "citing",
            &["publication_ID", "citing_publication_DOI"],
            &[&["P1", "['D2', 'D3']"], &["P2", "[]"], &["P3", ""]],
        );
        let t = citations(&src, Path::new("citing.tsv")).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.rows()[1], vec![Some("P1".into()), Some("D3".into())]);
    }

    #[test]
    fn bad_citation_literal_reports_line() {
        let src = Table::from_rows(
            "citing",
            &["publication_ID", "citing_publication_DOI"],
            &[&["P1", "[]"], &["P2", "nan"]],
        );
        let err = citations(&src, Path::new("citing.tsv")).unwrap_err();
        let err = err.downcast::<Error>().unwrap();
        assert!(matches!(err, Error::MalformedRecord { line: 3, .. }));
    }

    #[test]
    fn publication_venue_is_left_joined() {
        let pubs = Table::from_rows(
            "publications",
            &["", "publication_ID", "title"],
            &[&["0", "P1", "A"], &["1", "P2", "B"]],
        );
        let pub2venue = Table::from_rows(
            "pub2venue_",
            &["", "publication_ID", "venue_ID"],
            &[&["0", "P1", "V1"]],
        );
        let venues = Table::from_rows(
            "venues",
            &["", "venue_ID", "full_name", "h_index_calculated"],
            &[&["0", "V1", "ACM", "5"]],
        );
        let t = publications_with_venue(&pubs, &pub2venue, &venues).unwrap();
        let names: Vec<_> = t.column_values(VENUE_NAME).unwrap().collect();
        assert_eq!(names, vec![Some("ACM"), None]);
    }

    #[test]
    fn categories_resolve_to_codes() {
        let p2c = Table::from_rows(
            "publication2arxiv_df",
            &["publication_ID", "arxiv_category_ID"],
            &[&["P1", "1"], &["P1", "2"], &["P2", "9"]],
        );
        let cats = Table::from_rows(
            "arxiv_categories",
            &["arxiv_category_ID", "arxiv_category"],
            &[&["1", "cs.AI"], &["2", "cs.LG"]],
        );
        let t = publication_domains(&p2c, &cats).unwrap();
        assert_eq!(t.columns(), &[col::PUBLICATION, col::DOMAIN]);
        let codes: Vec<_> = t.column_values(col::DOMAIN).unwrap().collect();
        assert_eq!(codes, vec![Some("cs.AI"), Some("cs.LG")]);
    }

    #[test]
    fn affiliation_links_are_integer_ids() {
        let src = Table::from_rows(
            "author2affiliation",
            &["", "author_ID", "affiliation_ID"],
            &[&["0", "A1", "12.0"], &["1", "A2", ""]],
        );
        let t = affiliation_link("author_affiliation", &src, ("author_ID", col::AUTHOR)).unwrap();
        let ids: Vec<_> = t.column_values(col::AFFILIATION).unwrap().collect();
        assert_eq!(ids, vec![Some("12"), None]);
    }

    #[test]
    fn default_paths() {
        let p = EnrichedPaths::in_dir(Path::new("/data"));
        assert_eq!(p.publication_venues, PathBuf::from("/data/pub2venue_.csv"));
        assert_eq!(p.citations, PathBuf::from("/data/citing_pub_df200000.tsv"));
    }
}
