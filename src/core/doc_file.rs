use serde::Serialize;
use std::path::{Path, PathBuf};

use super::symbol::{Symbol, SymbolId};

/// Overview used when a source file carries no `@fileOverview` comment.
pub const DEFAULT_OVERVIEW: &str = "/** @overview No overview provided. */";

/// Resolved symbols of one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocFile {
    pub path: PathBuf,
    pub overview: Symbol,
    pub symbols: Vec<Symbol>,
}

impl DocFile {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            overview: Symbol::overview(path, DEFAULT_OVERVIEW),
            symbols: Vec::new(),
        }
    }

    /// Append a symbol; no deduplication.
    pub fn add_symbol(&mut self, symbol: Symbol) -> SymbolId {
        self.symbols.push(symbol);
        SymbolId(self.symbols.len() - 1)
    }

    /// Id the next added symbol will receive.
    pub fn next_id(&self) -> SymbolId {
        SymbolId(self.symbols.len())
    }

    /// First symbol whose alias equals `alias`.
    pub fn get_symbol(&self, alias: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.alias == alias)
    }

    pub(crate) fn get_symbol_mut(&mut self, alias: &str) -> Option<&mut Symbol> {
        self.symbols.iter_mut().find(|s| s.alias == alias)
    }

    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.index())
    }

    pub fn set_overview(&mut self, overview: Symbol) {
        self.overview = overview;
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }
}
