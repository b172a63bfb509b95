//! Configuration loading from TOML files

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use scholargraph_pipeline::EnrichedPaths;

/// Global configuration for scholargraph
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub enriched: EnrichedConfig,
    pub raw: RawConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./import"),
        }
    }
}

/// Enriched export location. Per-file overrides are resolved against `dir`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnrichedConfig {
    pub dir: PathBuf,
    pub venues: Option<PathBuf>,
    pub authors: Option<PathBuf>,
    pub affiliations: Option<PathBuf>,
    pub publications: Option<PathBuf>,
    pub publication_venues: Option<PathBuf>,
    pub domains: Option<PathBuf>,
    pub author_publications: Option<PathBuf>,
    pub author_affiliations: Option<PathBuf>,
    pub publication_categories: Option<PathBuf>,
    pub categories: Option<PathBuf>,
    pub citations: Option<PathBuf>,
    pub publication_affiliations: Option<PathBuf>,
}

impl Default for EnrichedConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./dataset/enriched"),
            venues: None,
            authors: None,
            affiliations: None,
            publications: None,
            publication_venues: None,
            domains: None,
            author_publications: None,
            author_affiliations: None,
            publication_categories: None,
            categories: None,
            citations: None,
            publication_affiliations: None,
        }
    }
}

impl EnrichedConfig {
    /// Input paths under `dir` (or the configured dir), with overrides applied.
    pub fn paths(&self, dir: Option<&Path>) -> EnrichedPaths {
        let dir = dir.unwrap_or(&self.dir);
        let mut paths = EnrichedPaths::in_dir(dir);
        let overrides = [
            (&mut paths.venues, &self.venues),
            (&mut paths.authors, &self.authors),
            (&mut paths.affiliations, &self.affiliations),
            (&mut paths.publications, &self.publications),
            (&mut paths.publication_venues, &self.publication_venues),
            (&mut paths.domains, &self.domains),
            (&mut paths.author_publications, &self.author_publications),
            (&mut paths.author_affiliations, &self.author_affiliations),
            (&mut paths.publication_categories, &self.publication_categories),
            (&mut paths.categories, &self.categories),
            (&mut paths.citations, &self.citations),
            (&mut paths.publication_affiliations, &self.publication_affiliations),
        ];
        for (slot, file) in overrides {
            if let Some(file) = file {
                *slot = dir.join(file);
            }
        }
        paths
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub input: PathBuf,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("./dataset/sample.json"),
        }
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./scholargraph.toml (current directory)
    /// 2. ~/.config/scholargraph/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("scholargraph.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "scholargraph") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}
