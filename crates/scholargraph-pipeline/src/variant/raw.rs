//! Raw arXiv metadata export: one JSON object per publication with a nested
//! author list.
//!
//! There are no explicit ids for authors or venues here: an author is
//! identified by their display name, a venue by the first segment of the
//! journal reference. No affiliation or citation data exists, so those
//! node and relationship types are not produced.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rustc_hash::FxHashSet;
use scholargraph_core::{ColumnMap, Coercion, Table, read_json_records};
use serde::Deserialize;

use super::SchemaVariant;
use crate::sources::{Links, NodeSource, Sources, col, link_table};

#[derive(Debug, Clone, Deserialize)]
pub struct ArxivRecord {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub doi: Option<String>,
    #[serde(default, rename = "journal-ref")]
    pub journal_ref: Option<String>,
    /// Space-separated category codes, e.g. `"cs.AI math.CO"`.
    #[serde(default)]
    pub categories: Option<String>,
    #[serde(default)]
    pub update_date: Option<String>,
    /// `[last, first, suffix]` per author.
    #[serde(default)]
    pub authors_parsed: Vec<Vec<String>>,
}

impl ArxivRecord {
    /// First comma-separated segment of the journal reference.
    pub fn venue(&self) -> Option<String> {
        let journal = self.journal_ref.as_deref()?;
        let venue = journal.split(',').next().unwrap_or_default().trim();
        (!venue.is_empty()).then(|| venue.to_string())
    }

    /// Author display names, in list order.
    pub fn author_names(&self) -> Vec<String> {
        self.authors_parsed
            .iter()
            .map(|parts| author_name(parts))
            .filter(|name| !name.is_empty())
            .collect()
    }

    pub fn category_codes(&self) -> impl Iterator<Item = &str> {
        self.categories.as_deref().unwrap_or_default().split_whitespace()
    }
}

/// `[last, first, suffix]` → `"suffix first last"`, empty parts dropped.
pub fn author_name(parts: &[String]) -> String {
    parts
        .iter()
        .rev()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

// Fan-out table columns
const ID: &str = "id";
const TITLE: &str = "title";
const DOI: &str = "doi";
const UPDATE_DATE: &str = "update_date";
const VENUE: &str = "venue";
const AUTHOR: &str = "author";
const CATEGORY: &str = "category";

const AUTHOR_MAP: &[ColumnMap] = &[
    ColumnMap::text("author_ID", AUTHOR),
    ColumnMap::text("full_name", AUTHOR),
];

const PUBLICATION_MAP: &[ColumnMap] = &[
    ColumnMap::text("publication_ID", ID),
    ColumnMap::new("title", TITLE, Coercion::Title),
    ColumnMap::text("doi", DOI),
    ColumnMap::new("year", UPDATE_DATE, Coercion::Year),
    ColumnMap::text("venue", VENUE),
];

const VENUE_MAP: &[ColumnMap] = &[
    ColumnMap::text("venue_ID", VENUE),
    ColumnMap::text("full_name", VENUE),
];

const DOMAIN_MAP: &[ColumnMap] = &[ColumnMap::text("arxiv_category", CATEGORY)];

#[derive(Debug, Clone)]
pub struct RawVariant {
    input: PathBuf,
}

impl RawVariant {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
        }
    }

    pub fn input(&self) -> &Path {
        &self.input
    }
}

impl SchemaVariant for RawVariant {
    fn name(&self) -> &'static str {
        "raw"
    }

    fn load(&self) -> Result<Sources> {
        let records: Vec<ArxivRecord> = read_json_records(&self.input)
            .with_context(|| format!("Failed to load {}", self.input.display()))?;
        log::info!("{}: {} records", self.input.display(), records.len());
        sources_from_records(&records)
    }
}

/// One row per (record, author). A record without authors still yields one
/// row with the author absent, so no publication is lost.
fn fan_out(records: &[ArxivRecord]) -> Table {
    let columns = [ID, TITLE, DOI, UPDATE_DATE, VENUE, AUTHOR];
    let mut table = Table::new("authorships", columns.map(String::from).to_vec());
    for record in records {
        let base = vec![
            Some(record.id.clone()),
            record.title.clone(),
            record.doi.clone(),
            record.update_date.clone(),
            record.venue(),
        ];
        let names = record.author_names();
        if names.is_empty() {
            let mut row = base;
            row.push(None);
            table.push(row);
            continue;
        }
        for name in names {
            let mut row = base.clone();
            row.push(Some(name));
            table.push(row);
        }
    }
    table
}

pub fn sources_from_records(records: &[ArxivRecord]) -> Result<Sources> {
    let authorships = fan_out(records);

    let mut venues = Table::new("venues", vec![VENUE.to_string()]);
    let mut publication_venue = Table::new(
        "publication_venue",
        vec![col::PUBLICATION.to_string(), col::VENUE.to_string()],
    );
    let mut domains = Table::new("domains", vec![CATEGORY.to_string()]);
    let mut publication_domain = Table::new(
        "publication_domain",
        vec![col::PUBLICATION.to_string(), col::DOMAIN.to_string()],
    );

    let mut seen_codes: FxHashSet<&str> = FxHashSet::default();
    for record in records {
        if let Some(venue) = record.venue() {
            venues.push(vec![Some(venue.clone())]);
            publication_venue.push(vec![Some(record.id.clone()), Some(venue)]);
        }
        for code in record.category_codes() {
            if seen_codes.insert(code) {
                domains.push(vec![Some(code.to_string())]);
            }
            publication_domain.push(vec![Some(record.id.clone()), Some(code.to_string())]);
        }
    }

    let links = Links {
        author_publication: Some(link_table(
            "author_publication",
            &authorships,
            (AUTHOR, col::AUTHOR),
            (ID, col::PUBLICATION),
        )?),
        publication_venue: Some(publication_venue),
        publication_domain: Some(publication_domain),
        ..Links::default()
    };

    Ok(Sources {
        venues: Some(NodeSource::new(venues, VENUE_MAP)),
        authors: Some(NodeSource::new(authorships.clone(), AUTHOR_MAP)),
        affiliations: None,
        publications: Some(NodeSource::new(authorships, PUBLICATION_MAP)),
        domains: Some(NodeSource::new(domains, DOMAIN_MAP)),
        links,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(json: &str) -> ArxivRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn author_name_reverses_parts() {
        let parts = vec!["Curie".to_string(), "Marie".to_string(), String::new()];
        assert_eq!(author_name(&parts), "Marie Curie");
        let parts = vec!["King".to_string(), "Martin Luther".to_string(), "Jr.".to_string()];
        assert_eq!(author_name(&parts), "Jr. Martin Luther King");
    }

    #[test]
    fn venue_is_first_journal_ref_segment() {
        let r = record(r#"{"id":"1","journal-ref":" Phys. Rev. D 76 , 013009 (2007)"}"#);
        assert_eq!(r.venue().as_deref(), Some("Phys. Rev. D 76"));
        let r = record(r#"{"id":"1","journal-ref":null}"#);
        assert_eq!(r.venue(), None);
    }

    #[test]
    fn fan_out_keeps_publication_fields() {
        let records = vec![
            record(
                r#"{"id":"0704.0001","title":"T","doi":"D","update_date":"2008-11-13",
                    "authors_parsed":[["A","X",""],["B","Y",""]]}"#,
            ),
            record(r#"{"id":"0704.0002","title":"U","update_date":"2008-12-13","authors_parsed":[]}"#),
        ];
        let t = fan_out(&records);
        assert_eq!(t.len(), 3);
        assert_eq!(t.rows()[1][0].as_deref(), Some("0704.0001"));
        assert_eq!(t.rows()[1][1].as_deref(), Some("T"));
        assert_eq!(t.rows()[1][5].as_deref(), Some("Y B"));
        assert_eq!(t.rows()[2][5], None);
    }

    #[test]
    fn domains_are_distinct_codes() {
        let records = vec![
            record(r#"{"id":"1","categories":"cs.AI cs.LG"}"#),
            record(r#"{"id":"2","categories":"cs.LG"}"#),
        ];
        let sources = sources_from_records(&records).unwrap();
        let domains = sources.domains.unwrap().table;
        assert_eq!(domains.len(), 2);
        assert_eq!(sources.links.publication_domain.unwrap().len(), 3);
        assert!(sources.affiliations.is_none());
        assert!(sources.links.citations.is_none());
    }
}
