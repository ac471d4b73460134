use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{SymdocError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project configuration
    pub project: ProjectConfig,

    /// Symbol filtering options
    pub resolve: ResolveOptions,

    /// Output settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project name
    pub name: String,

    /// Source directories to scan when no sources are given
    pub source_dirs: Vec<PathBuf>,

    /// File extensions to scan
    pub extensions: Vec<String>,

    /// How many directory levels to descend into (None = top level only)
    pub recurse_depth: Option<usize>,
}

/// Options that decide which parsed symbols survive resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveOptions {
    /// Keep symbols tagged `@private`
    pub include_private: bool,

    /// Keep undocumented symbols
    pub all_functions: bool,

    /// Keep undocumented symbols, including underscored ones
    pub all_functions_underscored: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Documentation output directory
    pub directory: PathBuf,

    /// Custom template directory holding `file.tera` and `index.tera`
    pub template_dir: Option<PathBuf>,

    /// Output format
    pub format: OutputFormat,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "Unnamed Project".to_string(),
            source_dirs: vec![PathBuf::from("src")],
            extensions: vec!["js".to_string()],
            recurse_depth: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("js_docs_out"),
            template_dir: None,
            format: OutputFormat::Markdown,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| SymdocError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SymdocError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => {
                if p.as_ref().exists() {
                    Self::load(p)
                } else {
                    Ok(Self::default())
                }
            }
            None => {
                // Try common config file locations
                let candidates = [
                    "Symdoc.toml",
                    "symdoc.toml",
                    ".symdoc.toml",
                ];

                for candidate in &candidates {
                    if Path::new(candidate).exists() {
                        return Self::load(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }
}
