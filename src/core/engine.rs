// src/core/engine.rs
use std::path::PathBuf;
use anyhow::Result;
use tracing::{info, warn, debug};

use crate::config::Config;
use super::{
    collect_sources, DocFile, FileView, FsLoader, Publisher, SymbolResolver, TracingReporter,
};

/// Name written by `init`
pub const CONFIG_FILE_NAME: &str = "symdoc.toml";

/// Main orchestration engine: find sources, resolve them, publish the result
pub struct Engine {
    config: Config,
    resolver: SymbolResolver,
    publisher: Publisher,
}

impl Engine {
    /// Create a new engine instance from a loaded configuration
    pub fn new(config: Config) -> Result<Self> {
        debug!("Loaded configuration: {:?}", config);

        let resolver = SymbolResolver::new(config.resolve)?;
        let publisher = Publisher::new(&config.output)?;

        Ok(Self {
            config,
            resolver,
            publisher,
        })
    }

    /// Resolve the given files and directories (or the configured source dirs)
    pub async fn resolve(&mut self, sources: Vec<PathBuf>) -> Result<Vec<DocFile>> {
        let inputs = if sources.is_empty() {
            self.config.project.source_dirs.clone()
        } else {
            sources
        };

        let extensions: Vec<String> = if self.config.project.extensions.is_empty() {
            self.resolver.file_extensions().iter().map(|ext| ext.to_string()).collect()
        } else {
            self.config.project.extensions.clone()
        };
        debug!("Scanning for {} sources: {:?}", self.resolver.language_name(), extensions);

        let paths = collect_sources(&inputs, &extensions, self.config.project.recurse_depth)?;
        info!("Found {} source files", paths.len());

        let files = self.resolver.resolve(paths, &FsLoader, &TracingReporter).await?;

        let symbols: usize = files.iter().map(DocFile::len).sum();
        info!("Resolved {} symbols across {} files", symbols, files.len());
        Ok(files)
    }

    /// Resolve sources and render them into the output directory
    pub async fn generate(&mut self, sources: Vec<PathBuf>) -> Result<Vec<PathBuf>> {
        info!("Output: {}", self.publisher.directory().display());

        let files = self.resolve(sources).await?;
        let written = self.publisher.publish(&self.config.project.name, &files).await?;

        info!("Documentation generation complete!");
        Ok(written)
    }

    /// Resolve sources and return the linked symbol graph as JSON
    pub async fn inspect(&mut self, sources: Vec<PathBuf>) -> Result<String> {
        let files = self.resolve(sources).await?;
        let views = FileView::all(&files);
        Ok(serde_json::to_string_pretty(&views)?)
    }

    /// Write a default configuration file into `path` (or the current directory)
    pub fn init(path: Option<PathBuf>) -> Result<PathBuf> {
        let dir = path.unwrap_or_else(|| PathBuf::from("."));
        std::fs::create_dir_all(&dir)?;

        let target = dir.join(CONFIG_FILE_NAME);
        if target.exists() {
            warn!("{} already exists, leaving it untouched", target.display());
            return Ok(target);
        }

        Config::default().save(&target)?;
        info!("Wrote {}", target.display());
        Ok(target)
    }
}
