use serde::Serialize;
use std::path::Path;

use super::tags::{DocComment, TagSet};

/// Index of a symbol inside its [`DocFile`](super::DocFile).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SymbolId(pub usize);

impl SymbolId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SymbolKind {
    File,
    Object,
    Namespace,
    Function,
    Constructor,
}

/// Which list of its parent a member symbol joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberRole {
    Method,
    Property,
}

impl SymbolKind {
    pub fn member_role(self) -> Option<MemberRole> {
        match self {
            SymbolKind::Function | SymbolKind::Constructor => Some(MemberRole::Method),
            SymbolKind::Object | SymbolKind::Namespace => Some(MemberRole::Property),
            SymbolKind::File => None,
        }
    }

    pub fn is_function(self) -> bool {
        self.member_role() == Some(MemberRole::Method)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "state", content = "text")]
pub enum Description {
    /// No doc comment was attached to the symbol.
    Undocumented,
    Text(String),
}

impl Description {
    pub fn is_undocumented(&self) -> bool {
        matches!(self, Description::Undocumented)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Description::Undocumented => "",
            Description::Text(text) => text,
        }
    }
}

/// One documented entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Symbol {
    /// Parser-assigned name; becomes the short name once resolved
    pub name: String,

    /// Dotted canonical identifier used for lookups
    pub alias: String,

    pub kind: SymbolKind,

    pub description: Description,

    pub tags: TagSet,

    /// Dotted name of the enclosing symbol
    pub memberof: Option<String>,

    pub properties: Vec<SymbolId>,

    pub methods: Vec<SymbolId>,

    /// Base symbol names declared by the author
    pub inherits: Vec<String>,

    pub inherited_methods: Vec<SymbolId>,

    pub inherited_properties: Vec<SymbolId>,

    /// 1-based source line the symbol was declared on
    pub line: usize,
}

impl Symbol {
    pub fn new(name: impl Into<String>, tags: TagSet, kind: SymbolKind, description: Description) -> Self {
        let name = name.into();
        Self {
            alias: name.clone(),
            name,
            kind,
            description,
            tags,
            memberof: None,
            properties: Vec::new(),
            methods: Vec::new(),
            inherits: Vec::new(),
            inherited_methods: Vec::new(),
            inherited_properties: Vec::new(),
            line: 0,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    /// Wrap a file overview comment as a FILE symbol aliased by the file path.
    pub fn overview(path: &Path, raw_comment: &str) -> Self {
        let doc = DocComment::parse(raw_comment);
        let text = ["fileOverview", "overview"]
            .iter()
            .find_map(|title| doc.tags.get_tag(title).first().map(|t| t.to_string()))
            .filter(|text| !text.is_empty())
            .unwrap_or(doc.description);

        let path = path.display().to_string();
        Self::new(path, doc.tags, SymbolKind::File, Description::Text(text))
    }

    pub fn is_undocumented(&self) -> bool {
        self.description.is_undocumented()
    }
}
