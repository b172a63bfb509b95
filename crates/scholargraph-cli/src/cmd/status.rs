//! `scholargraph status` - show the manifest of an emitted dataset

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, CellAlignment, Color};

use scholargraph_core::fmt_num;
use scholargraph_store::{RunManifest, short_digest};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Dataset directory (default: configured output dir)
    pub dir: Option<PathBuf>,
}

pub fn run(args: StatusArgs, config: &Config) -> Result<()> {
    let dir = args.dir.unwrap_or_else(|| config.output.dir.clone());
    let manifest = RunManifest::read_from(&dir)?;
    let stale = manifest.stale_files(&dir);

    let mut table = super::styled_table(&["File", "Rows", "Hash", "State"]);
    for (name, entry) in &manifest.files {
        let rows = entry.rows.map(fmt_num).unwrap_or_else(|| "-".to_string());
        let state = if stale.contains(name) {
            Cell::new("modified").fg(Color::Yellow)
        } else {
            Cell::new("ok").fg(Color::Green)
        };
        table.add_row(vec![
            Cell::new(name),
            Cell::new(rows).set_alignment(CellAlignment::Right),
            Cell::new(short_digest(&entry.hash)),
            state,
        ]);
    }

    eprintln!("\n{table}");
    eprintln!(
        "{} variant, written {}, content {}",
        manifest.variant,
        manifest.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        manifest.short_hash(),
    );
    if !stale.is_empty() {
        eprintln!("{} files changed since the run", stale.len());
    }
    let untracked = manifest.untracked_files(&dir)?;
    if !untracked.is_empty() {
        eprintln!("Not from this run: {}", untracked.join(", "));
    }
    Ok(())
}
