//! `scholargraph verify` - check uniqueness and referential closure of an
//! emitted dataset

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, CellAlignment, Color};

use scholargraph_core::fmt_num;
use scholargraph_pipeline::FileKind;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Dataset directory (default: configured output dir)
    pub dir: Option<PathBuf>,
}

pub fn run(args: VerifyArgs, config: &Config) -> Result<()> {
    let dir = args.dir.unwrap_or_else(|| config.output.dir.clone());
    let report = scholargraph_pipeline::verify(&dir)?;

    if report.files.is_empty() {
        anyhow::bail!("No bulk-load files found in {}", dir.display());
    }

    let mut table = super::styled_table(&["File", "Declares", "Rows", "Status"]);
    for file in &report.files {
        let declares = match &file.kind {
            FileKind::Node(ns) => ns.to_string(),
            FileKind::Relationship { start, end } => format!("{start} -> {end}"),
        };
        let clean = !report.violations.iter().any(|v| v.file == file.name);
        table.add_row(vec![
            Cell::new(&file.name),
            Cell::new(declares),
            Cell::new(fmt_num(file.rows)).set_alignment(CellAlignment::Right),
            if clean {
                Cell::new("ok").fg(Color::Green)
            } else {
                Cell::new("FAIL").fg(Color::Red)
            },
        ]);
    }
    eprintln!("\n{table}");

    if report.is_ok() {
        eprintln!("{} files verified, no violations", report.files.len());
        return Ok(());
    }
    for v in &report.violations {
        eprintln!("  {}: {}", v.file, v.message);
    }
    anyhow::bail!("{} violations in {}", report.violations.len(), dir.display())
}
