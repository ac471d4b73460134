use async_trait::async_trait;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

use crate::error::{SymdocError, Result};

/// Supplies the text of a source identifier.
#[async_trait]
pub trait SourceLoader: Send + Sync {
    async fn load(&self, path: &Path) -> Result<String>;
}

/// Reads sources from disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsLoader;

#[async_trait]
impl SourceLoader for FsLoader {
    async fn load(&self, path: &Path) -> Result<String> {
        Ok(tokio::fs::read_to_string(path).await?)
    }
}

/// Source identifiers, given one at a time or as a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSet(Vec<PathBuf>);

impl SourceSet {
    /// Paths in ascending lexical order.
    pub fn sorted(mut self) -> Vec<PathBuf> {
        self.0.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
        self.0
    }
}

impl From<PathBuf> for SourceSet {
    fn from(path: PathBuf) -> Self {
        Self(vec![path])
    }
}

impl From<&Path> for SourceSet {
    fn from(path: &Path) -> Self {
        Self(vec![path.to_path_buf()])
    }
}

impl From<&str> for SourceSet {
    fn from(path: &str) -> Self {
        Self(vec![PathBuf::from(path)])
    }
}

impl From<Vec<PathBuf>> for SourceSet {
    fn from(paths: Vec<PathBuf>) -> Self {
        Self(paths)
    }
}

impl From<&[&str]> for SourceSet {
    fn from(paths: &[&str]) -> Self {
        Self(paths.iter().map(PathBuf::from).collect())
    }
}

impl<const N: usize> From<[&str; N]> for SourceSet {
    fn from(paths: [&str; N]) -> Self {
        Self(paths.iter().map(PathBuf::from).collect())
    }
}

/// Expand files and directories into the source files to document.
///
/// Directories are walked `recurse_depth` levels deep (only their own
/// files when `None`); files given directly are kept whatever their
/// extension.
pub fn collect_sources(inputs: &[PathBuf], extensions: &[String], recurse_depth: Option<usize>) -> Result<Vec<PathBuf>> {
    let mut sources = Vec::new();

    for input in inputs {
        if input.is_file() {
            sources.push(input.clone());
            continue;
        }
        if !input.is_dir() {
            return Err(SymdocError::FileSystem(format!("{} is not a file or directory", input.display())));
        }

        let walker = WalkBuilder::new(input)
            .hidden(false)
            .git_ignore(true)
            .max_depth(Some(recurse_depth.unwrap_or(0) + 1))
            .build();

        for entry in walker {
            let entry = entry.map_err(|e| SymdocError::FileSystem(e.to_string()))?;
            let path = entry.path();

            if path.is_file() && has_extension(path, extensions) {
                sources.push(path.to_path_buf());
            }
        }
    }

    if sources.is_empty() {
        let searched: Vec<String> = inputs.iter().map(|p| p.display().to_string()).collect();
        return Err(SymdocError::NoSources(searched.join(", ")));
    }

    sources.sort();
    sources.dedup();
    Ok(sources)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|wanted| wanted.eq_ignore_ascii_case(ext)))
}

/// Serves sources from memory.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryLoader {
    pub files: std::collections::HashMap<PathBuf, String>,
}

#[cfg(test)]
impl MemoryLoader {
    pub fn with(mut self, path: &str, text: &str) -> Self {
        self.files.insert(PathBuf::from(path), text.to_string());
        self
    }
}

#[cfg(test)]
#[async_trait]
impl SourceLoader for MemoryLoader {
    async fn load(&self, path: &Path) -> Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            SymdocError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, path.display().to_string()))
        })
    }
}
