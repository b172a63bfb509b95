//! scholargraph - convert scholarly relational exports into graph bulk-load files
//!
//! Reads an enriched relational export (CSV/TSV) or raw arXiv metadata
//! (JSON lines) and writes one header/content file pair per node label and
//! relationship type.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "scholargraph")]
#[command(about = "Convert scholarly exports into property-graph bulk-load files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./scholargraph.toml or ~/.config/scholargraph/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a source export into bulk-load files
    Convert(cmd::convert::ConvertArgs),
    /// Check an emitted dataset for duplicate ids and dangling edges
    Verify(cmd::verify::VerifyArgs),
    /// Show the manifest of an emitted dataset
    Status(cmd::status::StatusArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let progress = scholargraph_core::ProgressContext::new();

    // Logging:
    //   TTY:     warn unless --debug, spinners show activity
    //   non-TTY: info unless --debug, logs are the only progress indicator
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = if is_tty { !cli.debug } else { false };
    scholargraph_core::init_logging(quiet, cli.debug, multi);

    let config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };

    match cli.command {
        Command::Convert(args) => cmd::convert::run(args, &config, &progress),
        Command::Verify(args) => cmd::verify::run(args, &config),
        Command::Status(args) => cmd::status::run(args, &config),
        Command::Config => {
            let mut table = cmd::styled_table(&["Setting", "Value"]);
            let enriched = config.enriched.paths(None);

            table.add_row(vec![
                "Output directory".to_string(),
                config.output.dir.display().to_string(),
            ]);
            table.add_row(vec![
                "Raw input".to_string(),
                config.raw.input.display().to_string(),
            ]);
            table.add_row(vec![
                "Enriched directory".to_string(),
                config.enriched.dir.display().to_string(),
            ]);
            for (name, path) in [
                ("venues", &enriched.venues),
                ("authors", &enriched.authors),
                ("affiliations", &enriched.affiliations),
                ("publications", &enriched.publications),
                ("publication_venues", &enriched.publication_venues),
                ("domains", &enriched.domains),
                ("author_publications", &enriched.author_publications),
                ("author_affiliations", &enriched.author_affiliations),
                ("publication_categories", &enriched.publication_categories),
                ("categories", &enriched.categories),
                ("citations", &enriched.citations),
                ("publication_affiliations", &enriched.publication_affiliations),
            ] {
                table.add_row(vec![format!("  {name}"), path.display().to_string()]);
            }

            eprintln!("\n{table}");
            Ok(())
        }
    }
}
