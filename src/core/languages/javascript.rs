use tree_sitter::{Node, Parser};

use crate::core::symbol::{Description, Symbol, SymbolKind};
use crate::core::tags::{DocComment, TagSet};
use crate::error::{SymdocError, Result};
use super::{LanguageParser, ParsedSource, Token, TokenKind};

/// Nodes emitted as a single token instead of being walked into.
const ATOMIC_KINDS: &[&str] = &["comment", "html_comment", "string", "template_string", "regex", "number"];

/// Keywords that may precede a declaration without changing what it declares.
const MODIFIERS: &[&str] = &["export", "default", "async", "static", "get", "set"];

/// Tags naming a base symbol.
const BASE_TAGS: &[&str] = &["augments", "extends", "inherits"];

/// How far to look for the `{` opening a class body.
const BRACE_SEARCH_LIMIT: usize = 256;

/// JavaScript front end using Tree-sitter for tokenizing
pub struct JavaScriptParser {
    parser: Parser,
}

impl JavaScriptParser {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let javascript_language = tree_sitter_javascript::language();
        parser.set_language(&javascript_language)
            .map_err(|e| SymdocError::Tokenize(format!("Failed to set JavaScript language: {}", e)))?;

        Ok(Self { parser })
    }
}

impl LanguageParser for JavaScriptParser {
    fn tokenize(&mut self, content: &str) -> Result<Vec<Token>> {
        let tree = self.parser.parse(content, None)
            .ok_or_else(|| SymdocError::Tokenize("Failed to parse JavaScript code".to_string()))?;

        let mut tokens = Vec::new();
        collect_tokens(tree.root_node(), content, &mut tokens);
        Ok(tokens)
    }

    fn parse(&self, tokens: &[Token]) -> ParsedSource {
        Scanner::new(tokens).run()
    }

    fn file_extensions(&self) -> &[&str] {
        &["js", "jsx", "mjs", "cjs"]
    }

    fn language_name(&self) -> &str {
        "javascript"
    }
}

/// Flatten the syntax tree into its leaves, in source order.
fn collect_tokens(node: Node, source: &str, tokens: &mut Vec<Token>) {
    if node.is_missing() {
        return;
    }

    if node.child_count() == 0 || ATOMIC_KINDS.contains(&node.kind()) {
        if let Some(token) = leaf_token(node, source) {
            tokens.push(token);
        }
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_tokens(child, source, tokens);
    }
}

fn leaf_token(node: Node, source: &str) -> Option<Token> {
    let text = node.utf8_text(source.as_bytes()).ok()?;
    if text.is_empty() {
        return None;
    }

    let kind = match node.kind() {
        "comment" | "html_comment" => {
            if text.starts_with("/**") && text != "/**/" {
                TokenKind::DocComment
            } else {
                TokenKind::Comment
            }
        }
        "string" | "template_string" => TokenKind::String,
        "regex" => TokenKind::Regex,
        "number" => TokenKind::Number,
        kind if node.is_named() && kind.ends_with("identifier") => TokenKind::Name,
        _ if text.chars().all(|c| c.is_ascii_alphabetic()) => TokenKind::Keyword,
        _ => TokenKind::Punct,
    };

    Some(Token {
        kind,
        text: text.to_string(),
        line: node.start_position().row + 1,
    })
}

/// What a declaration site declares.
#[derive(Debug)]
struct Found {
    name: String,
    kind: SymbolKind,
    inherits: Vec<String>,
    /// Code index of the `{` that opens a named object literal or class body
    body: Option<usize>,
}

impl Found {
    fn new(name: String, kind: SymbolKind) -> Self {
        Self {
            name,
            kind,
            inherits: Vec::new(),
            body: None,
        }
    }
}

/// A `{ ... }` block. Named blocks are object literals or class bodies whose
/// members are documented as `Name/member`.
#[derive(Debug)]
struct Scope {
    name: Option<String>,
    /// Open `(` and `[` inside this block
    parens: usize,
}

struct Scanner<'t> {
    tokens: &'t [Token],
    code: Vec<&'t Token>,
    scopes: Vec<Scope>,
    body_scope: Option<(usize, String)>,
    pending: Option<DocComment>,
    output: ParsedSource,
}

impl<'t> Scanner<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self {
            tokens,
            code: tokens.iter().filter(|t| !t.is_comment()).collect(),
            scopes: vec![Scope { name: None, parens: 0 }],
            body_scope: None,
            pending: None,
            output: ParsedSource::default(),
        }
    }

    fn run(mut self) -> ParsedSource {
        let mut ci = 0;
        for token in self.tokens {
            match token.kind {
                TokenKind::DocComment => self.on_doc_comment(token),
                TokenKind::Comment => {}
                _ => {
                    self.on_code(ci);
                    ci += 1;
                }
            }
        }
        self.output
    }

    fn on_doc_comment(&mut self, token: &Token) {
        let doc = DocComment::parse(&token.text);

        if doc.tags.has_tag("fileOverview") || doc.tags.has_tag("overview") {
            if self.output.overview.is_none() {
                self.output.overview = Some(token.text.clone());
            }
            return;
        }

        let name = doc.tags.get_tag("name").first().and_then(|text| virtual_name(text));
        if let Some(name) = name {
            let kind = kind_from_tags(&doc.tags).unwrap_or(SymbolKind::Object);
            let symbol = documented(Found::new(name, kind), doc, token.line);
            self.output.symbols.push(symbol);
            self.pending = None;
            return;
        }

        self.pending = Some(doc);
    }

    fn on_code(&mut self, ci: usize) {
        let token = self.code[ci];
        let doc = self.pending.take();

        if self.at_boundary(ci) {
            if let Some(found) = self.detect(ci) {
                // members of function-local objects have no documentable path
                if let Some(body) = found.body.filter(|_| !self.in_code_block()) {
                    self.body_scope = Some((body, found.name.clone()));
                }
                self.emit(found, doc, token.line);
            }
        }

        if token.kind != TokenKind::Punct {
            return;
        }
        match token.text.as_str() {
            "{" => {
                let name = match self.body_scope.take() {
                    Some((at, name)) if at == ci => Some(name),
                    other => {
                        self.body_scope = other;
                        None
                    }
                };
                self.scopes.push(Scope { name, parens: 0 });
            }
            "}" => {
                if self.scopes.len() > 1 {
                    self.scopes.pop();
                }
            }
            "(" | "[" => {
                if let Some(scope) = self.scopes.last_mut() {
                    scope.parens += 1;
                }
            }
            ")" | "]" => {
                if let Some(scope) = self.scopes.last_mut() {
                    scope.parens = scope.parens.saturating_sub(1);
                }
            }
            _ => {}
        }
    }

    fn emit(&mut self, found: Found, doc: Option<DocComment>, line: usize) {
        let symbol = match doc {
            Some(doc) => documented(found, doc, line),
            None if found.kind.is_function() && !self.in_code_block() => {
                let mut symbol = Symbol::new(found.name, TagSet::new(), found.kind, Description::Undocumented)
                    .at_line(line);
                symbol.inherits = found.inherits;
                symbol
            }
            None => return,
        };
        self.output.symbols.push(symbol);
    }

    fn at(&self, i: usize) -> Option<&'t Token> {
        self.code.get(i).copied()
    }

    fn current_scope(&self) -> Option<&str> {
        self.scopes.last().and_then(|scope| scope.name.as_deref())
    }

    /// Inside a function body or other unnamed block.
    fn in_code_block(&self) -> bool {
        self.scopes.iter().skip(1).any(|scope| scope.name.is_none())
    }

    fn at_boundary(&self, ci: usize) -> bool {
        if self.scopes.last().is_some_and(|scope| scope.parens > 0) {
            return false;
        }

        let Some(prev) = ci.checked_sub(1).and_then(|p| self.at(p)) else {
            return true;
        };

        if prev.kind == TokenKind::Punct {
            match prev.text.as_str() {
                ";" | "{" | "}" => return true,
                "," if self.current_scope().is_some() => return true,
                _ => {}
            }
        }

        // statement ended by a line break
        let ends_expression = match prev.kind {
            TokenKind::Name | TokenKind::Number | TokenKind::String | TokenKind::Regex => true,
            TokenKind::Punct => prev.text == ")" || prev.text == "]",
            _ => false,
        };
        ends_expression && prev.line < self.code[ci].line
    }

    fn detect(&self, ci: usize) -> Option<Found> {
        match self.current_scope() {
            Some(scope) => self.detect_member(ci, scope),
            None => self.detect_statement(ci),
        }
    }

    fn detect_statement(&self, ci: usize) -> Option<Found> {
        let i = self.skip_modifiers(ci);
        let token = self.at(i)?;

        match (token.kind, token.text.as_str()) {
            (TokenKind::Keyword, "function") => {
                let mut i = i + 1;
                if self.at(i)?.is_punct("*") {
                    i += 1;
                }
                let name = self.at(i).filter(|t| t.kind == TokenKind::Name)?;
                Some(Found::new(name.text.clone(), SymbolKind::Function))
            }
            (TokenKind::Keyword, "class") => {
                let name = self.at(i + 1).filter(|t| t.kind == TokenKind::Name)?;
                Some(self.class_tail(i + 2, name.text.clone()))
            }
            (TokenKind::Keyword, "var" | "let" | "const") => {
                let name = self.at(i + 1).filter(|t| t.kind == TokenKind::Name)?;
                match self.at(i + 2) {
                    Some(t) if t.is_punct("=") => Some(self.classify_rhs(i + 3, name.text.clone())),
                    _ => Some(Found::new(name.text.clone(), SymbolKind::Object)),
                }
            }
            (TokenKind::Name, _) => {
                let (segments, next) = self.read_chain(i);
                if !self.at(next)?.is_punct("=") {
                    return None;
                }
                let name = chain_path(&segments)?;
                Some(self.classify_rhs(next + 1, name))
            }
            _ => None,
        }
    }

    fn detect_member(&self, ci: usize, scope: &str) -> Option<Found> {
        let mut i = self.skip_modifiers(ci);
        if self.at(i)?.is_punct("*") {
            i += 1;
        }

        let key = self.at(i)?;
        let key = match key.kind {
            TokenKind::Name | TokenKind::Number => key.text.clone(),
            TokenKind::String => unquote(&key.text).to_string(),
            _ => return None,
        };
        let name = format!("{}/{}", scope, key);

        let next = self.at(i + 1).filter(|t| t.kind == TokenKind::Punct)?;
        match next.text.as_str() {
            ":" | "=" => Some(self.classify_rhs(i + 2, name)),
            "(" if key != "constructor" => Some(Found::new(name, SymbolKind::Function)),
            ";" => Some(Found::new(name, SymbolKind::Object)),
            _ => None,
        }
    }

    fn skip_modifiers(&self, mut i: usize) -> usize {
        while let Some(token) = self.at(i) {
            let is_modifier = token.kind == TokenKind::Keyword && MODIFIERS.contains(&token.text.as_str());
            if !is_modifier {
                break;
            }
            i += 1;
        }
        i
    }

    /// Read `a.b.c` starting at a name. Returns the segments and the index after them.
    fn read_chain(&self, start: usize) -> (Vec<&'t str>, usize) {
        let mut segments = Vec::new();
        let mut i = start;

        while let Some(token) = self.at(i).filter(|t| t.kind == TokenKind::Name) {
            segments.push(token.text.as_str());
            i += 1;
            match (self.at(i), self.at(i + 1)) {
                (Some(dot), Some(next)) if dot.is_punct(".") && next.kind == TokenKind::Name => i += 1,
                _ => break,
            }
        }

        (segments, i)
    }

    /// Classify the value assigned to `name`, starting at code index `j`.
    fn classify_rhs(&self, mut j: usize, name: String) -> Found {
        if self.at(j).is_some_and(|t| t.is_keyword("async")) {
            j += 1;
        }
        let Some(token) = self.at(j) else {
            return Found::new(name, SymbolKind::Object);
        };

        match (token.kind, token.text.as_str()) {
            (TokenKind::Keyword, "function") => Found::new(name, SymbolKind::Function),
            (TokenKind::Keyword, "class") => {
                let mut k = j + 1;
                if self.at(k).is_some_and(|t| t.kind == TokenKind::Name) {
                    k += 1;
                }
                self.class_tail(k, name)
            }
            (TokenKind::Punct, "{") => Found {
                body: Some(j),
                ..Found::new(name, SymbolKind::Object)
            },
            (TokenKind::Punct, "(") if self.is_arrow_params(j) => Found::new(name, SymbolKind::Function),
            (TokenKind::Name, _) if self.at(j + 1).is_some_and(|t| t.is_punct("=>")) => {
                Found::new(name, SymbolKind::Function)
            }
            _ => Found::new(name, SymbolKind::Object),
        }
    }

    /// Everything after `class Name`: an optional `extends` clause and the body.
    fn class_tail(&self, i: usize, name: String) -> Found {
        let mut found = Found::new(name, SymbolKind::Constructor);

        if self.at(i).is_some_and(|t| t.is_keyword("extends")) {
            let (segments, _) = self.read_chain(i + 1);
            if !segments.is_empty() {
                found.inherits.push(segments.join("."));
            }
        }

        found.body = self.find_body_brace(i);
        found
    }

    fn find_body_brace(&self, from: usize) -> Option<usize> {
        let mut depth = 0usize;
        for j in from..(from + BRACE_SEARCH_LIMIT).min(self.code.len()) {
            let token = self.code[j];
            if token.kind != TokenKind::Punct {
                continue;
            }
            match token.text.as_str() {
                "(" | "[" => depth += 1,
                ")" | "]" => depth = depth.saturating_sub(1),
                "{" if depth == 0 => return Some(j),
                ";" | "}" if depth == 0 => return None,
                _ => {}
            }
        }
        None
    }

    fn is_arrow_params(&self, open: usize) -> bool {
        let mut depth = 0usize;
        for j in open..self.code.len() {
            let token = self.code[j];
            if token.is_punct("(") {
                depth += 1;
            } else if token.is_punct(")") {
                depth -= 1;
                if depth == 0 {
                    return self.at(j + 1).is_some_and(|t| t.is_punct("=>"));
                }
            }
        }
        false
    }
}

fn documented(found: Found, doc: DocComment, line: usize) -> Symbol {
    let kind = kind_from_tags(&doc.tags).unwrap_or(found.kind);
    let mut inherits = found.inherits;
    for base in tag_bases(&doc.tags) {
        if !inherits.contains(&base) {
            inherits.push(base);
        }
    }

    let mut symbol = Symbol::new(found.name, doc.tags, kind, Description::Text(doc.description))
        .at_line(line);
    symbol.inherits = inherits;
    symbol
}

fn kind_from_tags(tags: &TagSet) -> Option<SymbolKind> {
    if tags.has_tag("constructor") || tags.has_tag("class") {
        Some(SymbolKind::Constructor)
    } else if tags.has_tag("function") || tags.has_tag("method") {
        Some(SymbolKind::Function)
    } else if tags.has_tag("namespace") {
        Some(SymbolKind::Namespace)
    } else if tags.has_tag("field") {
        Some(SymbolKind::Object)
    } else {
        None
    }
}

fn tag_bases(tags: &TagSet) -> Vec<String> {
    BASE_TAGS
        .iter()
        .flat_map(|title| tags.get_tag(title))
        .filter_map(|text| text.split_whitespace().next())
        .map(|base| base.trim_matches(|c| c == '{' || c == '}').to_string())
        .filter(|base| !base.is_empty())
        .collect()
}

/// `Foo.bar` or `Foo#bar` in an `@name` tag, as a `/` path.
fn virtual_name(text: &str) -> Option<String> {
    let word = text.split_whitespace().next()?;
    let segments: Vec<&str> = word.split(['.', '#']).collect();
    chain_path(&segments)
}

fn chain_path(segments: &[&str]) -> Option<String> {
    let kept: Vec<&str> = segments
        .iter()
        .copied()
        .filter(|s| !s.is_empty() && *s != "prototype")
        .collect();

    if kept.is_empty() {
        None
    } else {
        Some(kept.join("/"))
    }
}

fn unquote(text: &str) -> &str {
    text.trim_matches(|c| c == '"' || c == '\'' || c == '`')
}
