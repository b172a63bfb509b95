//! `scholargraph convert` - run one schema variant into bulk-load files

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use comfy_table::{Cell, CellAlignment};

use scholargraph_core::{ProgressContext, fmt_num};
use scholargraph_pipeline::{EnrichedVariant, RawVariant, SchemaVariant, StepKind, Summary};
use scholargraph_store::short_digest;

use crate::config::Config;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Variant {
    /// Relational export with explicit id columns and link tables
    Enriched,
    /// arXiv metadata JSON lines with nested author lists
    Raw,
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Source export schema
    #[arg(value_enum)]
    pub variant: Variant,

    /// Input location: export directory (enriched) or JSON-lines file (raw)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output directory for the bulk-load files
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: ConvertArgs, config: &Config, progress: &ProgressContext) -> Result<()> {
    let output_dir = args.output.unwrap_or_else(|| config.output.dir.clone());
    let variant: Box<dyn SchemaVariant> = match args.variant {
        Variant::Enriched => Box::new(EnrichedVariant::new(
            config.enriched.paths(args.input.as_deref()),
        )),
        Variant::Raw => Box::new(RawVariant::new(
            args.input.unwrap_or_else(|| config.raw.input.clone()),
        )),
    };

    let summary = scholargraph_pipeline::run(variant.as_ref(), &output_dir, progress)?;
    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &Summary) {
    let mut table = super::styled_table(&["File", "Kind", "Rows", "Dropped"]);
    for step in &summary.steps {
        let kind = match step.kind {
            StepKind::Node => "node",
            StepKind::Relationship => "relationship",
        };
        table.add_row(vec![
            Cell::new(step.name),
            Cell::new(kind),
            Cell::new(fmt_num(step.rows)).set_alignment(CellAlignment::Right),
            Cell::new(fmt_num(step.dropped)).set_alignment(CellAlignment::Right),
        ]);
    }

    eprintln!("\n{table}");
    eprintln!(
        "{} variant: {} nodes, {} edges -> {} (content {})",
        summary.variant,
        fmt_num(summary.total_rows(StepKind::Node)),
        fmt_num(summary.total_rows(StepKind::Relationship)),
        summary.output_dir.display(),
        short_digest(&summary.content_hash),
    );
}
