//! Language-specific front ends.
//!
//! Each language turns source text into tokens and tokens into raw,
//! unresolved symbols. Linking those symbols together is left to the
//! resolver.

mod javascript;

pub use javascript::JavaScriptParser;

use crate::error::Result;
use super::Symbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `/** ... */`
    DocComment,
    Comment,
    Name,
    Keyword,
    String,
    Number,
    Regex,
    Punct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// 1-based line
    pub line: usize,
}

impl Token {
    pub fn is(&self, kind: TokenKind, text: &str) -> bool {
        self.kind == kind && self.text == text
    }

    pub fn is_punct(&self, text: &str) -> bool {
        self.is(TokenKind::Punct, text)
    }

    pub fn is_keyword(&self, text: &str) -> bool {
        self.is(TokenKind::Keyword, text)
    }

    pub fn is_comment(&self) -> bool {
        matches!(self.kind, TokenKind::Comment | TokenKind::DocComment)
    }
}

/// Parser output for one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedSource {
    /// Raw symbols in source order
    pub symbols: Vec<Symbol>,

    /// Raw text of the file overview comment
    pub overview: Option<String>,
}

/// Trait that all language front ends must implement
pub trait LanguageParser {
    /// Split source text into tokens
    fn tokenize(&mut self, content: &str) -> Result<Vec<Token>>;

    /// Extract raw symbols and the file overview from tokens
    fn parse(&self, tokens: &[Token]) -> ParsedSource;

    /// Get the file extensions this parser handles
    fn file_extensions(&self) -> &[&str];

    /// Get the language name
    fn language_name(&self) -> &str;
}
