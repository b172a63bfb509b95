//! Pipeline driver: one fixed pass from canonical sources to a committed
//! bulk-load dataset.
//!
//! Order: load sources, extract and stage every node type, derive and stage
//! every relationship type (each filtered against the node ids staged in
//! the same run), commit, write the manifest. Steps whose inputs the
//! variant does not provide are skipped.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use scholargraph_core::{
    GraphSink, IdSet, JoinKind, Namespace, NodeSchema, NodeTable, Pair, ProgressContext,
    RelationshipSchema, Table, dedup_pairs, expand, expand_unique, extract, finish_step, id_set,
    join, project_pairs, retain_closed,
};
use scholargraph_store::RunManifest;

use crate::graph;
use crate::sources::{Links, NodeSource, Sources, col};
use crate::variant::SchemaVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Node,
    Relationship,
}

/// Outcome of one emitted file pair.
#[derive(Debug, Clone)]
pub struct StepSummary {
    pub name: &'static str,
    pub kind: StepKind,
    pub rows: usize,
    /// Rows removed by deduplication or the referential-closure filter.
    pub dropped: usize,
}

/// Summary statistics from a conversion run.
#[derive(Debug, Clone)]
pub struct Summary {
    pub variant: &'static str,
    pub output_dir: PathBuf,
    pub steps: Vec<StepSummary>,
    pub content_hash: String,
}

impl Summary {
    pub fn total_rows(&self, kind: StepKind) -> usize {
        self.steps.iter().filter(|s| s.kind == kind).map(|s| s.rows).sum()
    }
}

/// Emitted node tables, looked up by namespace.
#[derive(Default)]
struct Nodes {
    tables: FxHashMap<Namespace, NodeTable>,
    ids: FxHashMap<Namespace, IdSet>,
}

impl Nodes {
    fn insert(&mut self, nodes: NodeTable) {
        let ns = nodes.schema.namespace();
        self.ids.insert(ns, id_set(&nodes));
        self.tables.insert(ns, nodes);
    }

    fn ids(&self, ns: Namespace) -> Option<&IdSet> {
        self.ids.get(&ns)
    }

    fn table(&self, ns: Namespace) -> Option<&NodeTable> {
        self.tables.get(&ns)
    }
}

struct Driver<'a> {
    sink: GraphSink,
    progress: &'a ProgressContext,
    nodes: Nodes,
    steps: Vec<StepSummary>,
}

impl Driver<'_> {
    fn node_step(&mut self, schema: &NodeSchema, source: Option<&NodeSource>) -> Result<()> {
        let Some(source) = source else {
            log::debug!("{}: no source in this variant, skipped", schema.label);
            return Ok(());
        };
        let pb = self.progress.step_line(schema.file_stem);
        let nodes = extract(&source.table, schema, source.mapping)
            .with_context(|| format!("Failed to extract {} nodes", schema.label))?;
        let rows = self
            .sink
            .emit_nodes(&nodes)
            .with_context(|| format!("Failed to write {}", schema.file_stem))?;
        finish_step(&pb, rows);
        log::info!("{}: {rows} nodes", schema.label);

        self.steps.push(StepSummary {
            name: schema.file_stem,
            kind: StepKind::Node,
            rows,
            dropped: source.table.len() - rows,
        });
        self.nodes.insert(nodes);
        Ok(())
    }

    /// Deduplicate (set relationships only), enforce referential closure and
    /// stage the pairs.
    fn edge_step(&mut self, schema: &RelationshipSchema, pairs: Option<Vec<Pair>>) -> Result<()> {
        let Some(mut pairs) = pairs else {
            log::debug!("{}: no source in this variant, skipped", schema.file_stem);
            return Ok(());
        };
        let (Some(start_ids), Some(end_ids)) =
            (self.nodes.ids(schema.start), self.nodes.ids(schema.end))
        else {
            log::warn!(
                "{}: no {} or {} nodes emitted, skipped",
                schema.file_stem,
                schema.start,
                schema.end
            );
            return Ok(());
        };

        let pb = self.progress.step_line(schema.file_stem);
        let derived = pairs.len();
        if schema.dedup {
            let removed = dedup_pairs(&mut pairs);
            if removed > 0 {
                log::debug!("{}: removed {removed} duplicate pairs", schema.file_stem);
            }
        }
        let dangling = retain_closed(&mut pairs, start_ids, end_ids);
        if dangling > 0 {
            log::info!(
                "{}: dropped {dangling} edges with an endpoint outside the emitted nodes",
                schema.file_stem
            );
        }

        let rows = self
            .sink
            .emit_edges(schema, &pairs)
            .with_context(|| format!("Failed to write {}", schema.file_stem))?;
        finish_step(&pb, rows);
        log::info!("{}: {rows} edges", schema.file_stem);

        self.steps.push(StepSummary {
            name: schema.file_stem,
            kind: StepKind::Relationship,
            rows,
            dropped: derived - rows,
        });
        Ok(())
    }
}

/// Inner join of two link tables on their shared publication column,
/// projected to `(start, end)`.
fn via_publication(left: &Table, right: &Table, start: &str, end: &str) -> Result<Vec<Pair>> {
    let joined = join(left, right, col::PUBLICATION, col::PUBLICATION, JoinKind::Inner)?;
    Ok(project_pairs(&joined, start, end)?)
}

fn pairs_of(link: Option<&Table>, start: &str, end: &str) -> Result<Option<Vec<Pair>>> {
    Ok(link.map(|t| project_pairs(t, start, end)).transpose()?)
}

/// Co-author pairs. Repeated (publication, author) rows are removed first so
/// no author is paired with themselves.
fn author_collaborations(author_publication: &Table) -> Result<Vec<Pair>> {
    let mut memberships = author_publication.clone();
    memberships.dedup_by(&[col::PUBLICATION, col::AUTHOR])?;
    Ok(expand(&memberships, col::PUBLICATION, col::AUTHOR)?)
}

/// Affiliations sharing a publication through its authors.
fn affiliation_collaborations(
    author_publication: &Table,
    publication_affiliation: &Table,
) -> Result<Vec<Pair>> {
    let joined = join(
        author_publication,
        publication_affiliation,
        col::PUBLICATION,
        col::PUBLICATION,
        JoinKind::Inner,
    )?;
    Ok(expand_unique(&joined, col::PUBLICATION, col::AFFILIATION)?)
}

const CITING_PUBLICATION: &str = "citing_publication_id";

/// (cited, citing) publication pairs, resolving each citing DOI to the
/// emitted publication carrying it. Self-citations are dropped.
fn citations(citations: &Table, publications: &NodeTable) -> Result<Vec<Pair>> {
    let columns = publications.table.columns();
    if !columns.iter().any(|c| c == "doi") {
        log::warn!("Publications carry no doi column, citations cannot be resolved");
        return Ok(Vec::new());
    }
    let id_column = columns[publications.id_index].clone();
    let by_doi = publications
        .table
        .project(&[(id_column.as_str(), CITING_PUBLICATION), ("doi", col::CITING_DOI)])?
        .with_name("publications");

    let resolved = join(citations, &by_doi, col::CITING_DOI, col::CITING_DOI, JoinKind::Inner)?;
    let mut pairs = project_pairs(&resolved, col::PUBLICATION, CITING_PUBLICATION)?;

    let before = pairs.len();
    pairs.retain(|(cited, citing)| cited != citing);
    let self_citations = before - pairs.len();
    if self_citations > 0 {
        log::info!("cited_by: dropped {self_citations} self-citations");
    }
    Ok(pairs)
}

fn relationship_steps(driver: &mut Driver<'_>, links: &Links) -> Result<()> {
    let ap = links.author_publication.as_ref();
    let aa = links.author_affiliation.as_ref();
    let pv = links.publication_venue.as_ref();
    let pd = links.publication_domain.as_ref();
    let pa = links.publication_affiliation.as_ref();

    driver.edge_step(&graph::AUTHOR_OF, pairs_of(ap, col::AUTHOR, col::PUBLICATION)?)?;
    driver.edge_step(
        &graph::AUTHOR_COLLABORATES_WITH,
        ap.map(author_collaborations).transpose()?,
    )?;
    driver.edge_step(&graph::WORKS_AT, pairs_of(aa, col::AUTHOR, col::AFFILIATION)?)?;
    driver.edge_step(&graph::PUBLISHED_IN, pairs_of(pv, col::PUBLICATION, col::VENUE)?)?;
    driver.edge_step(&graph::BELONGS_TO, pairs_of(pd, col::PUBLICATION, col::DOMAIN)?)?;

    let cited_by = match (links.citations.as_ref(), driver.nodes.table(Namespace::Publication)) {
        (Some(c), Some(pubs)) => Some(citations(c, pubs)?),
        _ => None,
    };
    driver.edge_step(&graph::CITED_BY, cited_by)?;

    let covers = match (pa, pd) {
        (Some(pa), Some(pd)) => Some(via_publication(pa, pd, col::AFFILIATION, col::DOMAIN)?),
        _ => None,
    };
    driver.edge_step(&graph::COVERS, covers)?;

    let affiliation_collab = match (ap, pa) {
        (Some(ap), Some(pa)) => Some(affiliation_collaborations(ap, pa)?),
        _ => None,
    };
    driver.edge_step(&graph::AFFILIATION_COLLABORATES_WITH, affiliation_collab)?;

    let publishes_in = match (pa, pv) {
        (Some(pa), Some(pv)) => Some(via_publication(pa, pv, col::AFFILIATION, col::VENUE)?),
        _ => None,
    };
    driver.edge_step(&graph::PUBLISHES_IN, publishes_in)?;

    let publishes_at = match (ap, pv) {
        (Some(ap), Some(pv)) => Some(via_publication(ap, pv, col::AUTHOR, col::VENUE)?),
        _ => None,
    };
    driver.edge_step(&graph::PUBLISHES_AT, publishes_at)?;
    Ok(())
}

/// Run one variant end to end into `output_dir`.
///
/// Nothing under `output_dir` changes unless every step succeeds.
pub fn run(
    variant: &dyn SchemaVariant,
    output_dir: &Path,
    progress: &ProgressContext,
) -> Result<Summary> {
    log::info!("Converting {} export into {}", variant.name(), output_dir.display());

    let pb = progress.step_line("load sources");
    let sources: Sources = variant
        .load()
        .with_context(|| format!("Failed to load {} sources", variant.name()))?;
    pb.finish_with_message("done");

    let sink = GraphSink::create(output_dir)
        .with_context(|| format!("Failed to prepare output dir: {}", output_dir.display()))?;
    let mut driver = Driver {
        sink,
        progress,
        nodes: Nodes::default(),
        steps: Vec::new(),
    };

    driver.node_step(&graph::VENUE, sources.venues.as_ref())?;
    driver.node_step(&graph::AUTHOR, sources.authors.as_ref())?;
    driver.node_step(&graph::AFFILIATION, sources.affiliations.as_ref())?;
    driver.node_step(&graph::PUBLICATION, sources.publications.as_ref())?;
    driver.node_step(&graph::DOMAIN, sources.domains.as_ref())?;
    relationship_steps(&mut driver, &sources.links)?;

    let Driver { sink, steps, .. } = driver;
    let emitted = sink
        .commit()
        .with_context(|| format!("Failed to commit output into {}", output_dir.display()))?;

    let manifest = RunManifest::build(
        variant.name(),
        output_dir,
        emitted.iter().map(|f| (f.file_name.clone(), f.rows)),
    )?;
    manifest.write_to(output_dir)?;
    log::info!(
        "Done: {} files, content hash {}",
        emitted.len(),
        manifest.short_hash()
    );

    Ok(Summary {
        variant: variant.name(),
        output_dir: output_dir.to_path_buf(),
        steps,
        content_hash: manifest.content_hash,
    })
}
