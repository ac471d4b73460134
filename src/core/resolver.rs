//! Symbol resolution: turns each file's raw parser output into a linked
//! [`DocFile`].
//!
//! Resolution is a single forward pass over the symbols in parser order.
//! A member or derived symbol can only link to a parent or base that was
//! added earlier in the same file; anything else is reported and left
//! unlinked.

use std::path::Path;

use crate::config::ResolveOptions;
use crate::error::Result;
use super::doc_file::{DocFile, DEFAULT_OVERVIEW};
use super::languages::{JavaScriptParser, LanguageParser, ParsedSource};
use super::report::Reporter;
use super::sources::{SourceLoader, SourceSet};
use super::symbol::{MemberRole, Symbol};

pub struct SymbolResolver {
    options: ResolveOptions,
    language: Box<dyn LanguageParser + Send>,
}

impl SymbolResolver {
    pub fn new(options: ResolveOptions) -> Result<Self> {
        Ok(Self::with_language(options, Box::new(JavaScriptParser::new()?)))
    }

    pub fn with_language(options: ResolveOptions, language: Box<dyn LanguageParser + Send>) -> Self {
        Self { options, language }
    }

    pub fn language_name(&self) -> &str {
        self.language.language_name()
    }

    pub fn file_extensions(&self) -> &[&str] {
        self.language.file_extensions()
    }

    /// Resolve every source, in ascending path order, into one `DocFile` each.
    ///
    /// Loading or tokenizing failures abort the whole batch.
    pub async fn resolve<L>(
        &mut self,
        sources: impl Into<SourceSet>,
        loader: &L,
        reporter: &dyn Reporter,
    ) -> Result<Vec<DocFile>>
    where
        L: SourceLoader + ?Sized,
    {
        let paths = sources.into().sorted();
        let mut files = Vec::with_capacity(paths.len());

        for (n, path) in paths.iter().enumerate() {
            reporter.inform(&format!("Tokenizing: file {}, {}", n + 1, path.display()));
            let text = loader.load(path).await?;
            files.push(self.resolve_source(path, &text, reporter)?);
        }

        Ok(files)
    }

    /// Tokenize, parse and link one source text.
    pub fn resolve_source(&mut self, path: &Path, text: &str, reporter: &dyn Reporter) -> Result<DocFile> {
        let tokens = self.language.tokenize(text)?;
        reporter.inform(&format!("\t{} tokens found.", tokens.len()));

        let parsed = self.language.parse(&tokens);
        reporter.inform(&format!("\t{} symbols found.", parsed.symbols.len()));

        Ok(self.link(path, parsed, reporter))
    }

    /// Filter, rename and cross-link parsed symbols into a `DocFile`.
    pub fn link(&self, path: &Path, parsed: ParsedSource, reporter: &dyn Reporter) -> DocFile {
        let mut file = DocFile::new(path);

        for raw in parsed.symbols {
            let Some(mut symbol) = self.admit(raw) else {
                continue;
            };

            link_parent(&mut file, &mut symbol, reporter);
            link_inherited(&file, &mut symbol, reporter);
            file.add_symbol(symbol);
        }

        let overview = parsed.overview.as_deref().unwrap_or(DEFAULT_OVERVIEW);
        file.set_overview(Symbol::overview(path, overview));
        file
    }

    /// Apply the filters and fold `@memberof` into the name.
    /// Returns `None` when the symbol is to be discarded.
    fn admit(&self, mut symbol: Symbol) -> Option<Symbol> {
        if !symbol.tags.get_tag("ignore").is_empty() {
            return None;
        }

        if !symbol.tags.get_tag("private").is_empty() && !self.options.include_private {
            return None;
        }

        let parent = symbol.tags.get_tag("memberof").first().map(|p| p.to_string());
        if let Some(parent) = parent {
            symbol.name = format!("{}/{}", parent, symbol.name);
            symbol.tags.drop_tag("memberof");
        }

        if symbol.is_undocumented() {
            if is_underscored(&symbol.name) && !self.options.all_functions_underscored {
                return None;
            }
            if !self.options.all_functions && !self.options.all_functions_underscored {
                return None;
            }
        }

        Some(symbol)
    }
}

/// Split a `parent/child` name and attach the symbol to its parent.
fn link_parent(file: &mut DocFile, symbol: &mut Symbol, reporter: &dyn Reporter) {
    let Some((parent_path, child)) = symbol.name.rsplit_once('/') else {
        symbol.alias = symbol.name.clone();
        return;
    };
    if parent_path.is_empty() || child.is_empty() {
        symbol.alias = symbol.name.clone();
        return;
    }

    let parent_name = parent_path.replace('/', ".");
    let child = child.to_string();

    symbol.alias = symbol.name.replace('/', ".");
    symbol.name = child;
    symbol.memberof = Some(parent_name.clone());

    let id = file.next_id();
    match file.get_symbol_mut(&parent_name) {
        None => reporter.warn(&format!(
            "{}, line {}: Member '{}' documented but no documentation exists for parent object '{}'.",
            file.path.display(),
            symbol.line,
            symbol.name,
            parent_name
        )),
        Some(parent) => match symbol.kind.member_role() {
            Some(MemberRole::Method) => parent.methods.push(id),
            Some(MemberRole::Property) => parent.properties.push(id),
            None => {}
        },
    }
}

/// Copy each found base's own methods and properties into the inherited lists.
fn link_inherited(file: &DocFile, symbol: &mut Symbol, reporter: &dyn Reporter) {
    for base_name in &symbol.inherits {
        match file.get_symbol(base_name) {
            None => reporter.warn(&format!(
                "{}, line {}: Can't determine inherited methods or properties from unfound '{}' symbol.",
                file.path.display(),
                symbol.line,
                base_name
            )),
            Some(base) => {
                symbol.inherited_methods.extend_from_slice(&base.methods);
                symbol.inherited_properties.extend_from_slice(&base.properties);
            }
        }
    }
}

/// `_name`, `Parent._name` or `Parent/_name`.
fn is_underscored(name: &str) -> bool {
    name.starts_with('_') || name.contains("._") || name.contains("/_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::report::RecordingReporter;
    use crate::core::sources::MemoryLoader;
    use crate::core::symbol::{Description, SymbolId, SymbolKind};
    use crate::core::tags::TagSet;
    use std::path::PathBuf;

    fn resolver(options: ResolveOptions) -> SymbolResolver {
        SymbolResolver::new(options).unwrap()
    }

    fn symbol(name: &str, kind: SymbolKind, tags: &[(&str, &str)]) -> Symbol {
        Symbol::new(
            name,
            tags.iter().copied().collect::<TagSet>(),
            kind,
            Description::Text(format!("{} docs", name)),
        )
    }

    fn undocumented(name: &str) -> Symbol {
        Symbol::new(name, TagSet::new(), SymbolKind::Function, Description::Undocumented)
    }

    fn parsed(symbols: Vec<Symbol>) -> ParsedSource {
        ParsedSource { symbols, overview: None }
    }

    fn link(options: ResolveOptions, symbols: Vec<Symbol>) -> (DocFile, RecordingReporter) {
        let reporter = RecordingReporter::default();
        let file = resolver(options).link(Path::new("a.js"), parsed(symbols), &reporter);
        (file, reporter)
    }

    fn names(file: &DocFile) -> Vec<&str> {
        file.symbols.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_member_links_to_parent() {
        let (file, reporter) = link(ResolveOptions::default(), vec![
            symbol("Foo", SymbolKind::Object, &[]),
            symbol("bar", SymbolKind::Function, &[("memberof", "Foo")]),
        ]);

        let bar = &file.symbols[1];
        assert_eq!(bar.name, "bar");
        assert_eq!(bar.alias, "Foo.bar");
        assert_eq!(bar.memberof.as_deref(), Some("Foo"));

        let foo = file.get_symbol("Foo").unwrap();
        assert_eq!(foo.methods, vec![SymbolId(1)]);
        assert!(foo.properties.is_empty());
        assert!(reporter.warnings.borrow().is_empty());
    }

    #[test]
    fn test_missing_parent_warns_and_keeps_member() {
        let (file, reporter) = link(ResolveOptions::default(), vec![
            symbol("bar", SymbolKind::Function, &[("memberof", "Missing")]),
        ]);

        assert_eq!(names(&file), vec!["bar"]);
        assert_eq!(file.symbols[0].alias, "Missing.bar");

        let warnings = reporter.warnings.borrow();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("no documentation exists for parent object 'Missing'"));
    }

    #[test]
    fn test_inheritance_copies_base_members() {
        let mut derived = symbol("Derived", SymbolKind::Constructor, &[]);
        derived.inherits = vec!["Base".to_string()];

        let (file, reporter) = link(ResolveOptions::default(), vec![
            symbol("Base", SymbolKind::Constructor, &[]),
            symbol("Base/m1", SymbolKind::Function, &[]),
            symbol("Base/p1", SymbolKind::Object, &[]),
            derived,
        ]);
        assert!(reporter.warnings.borrow().is_empty());

        let derived = file.get_symbol("Derived").unwrap();
        assert_eq!(derived.inherited_methods, vec![SymbolId(1)]);
        assert_eq!(derived.inherited_properties, vec![SymbolId(2)]);
        assert_eq!(file.symbol(SymbolId(1)).unwrap().alias, "Base.m1");
        assert_eq!(file.symbol(SymbolId(2)).unwrap().alias, "Base.p1");
    }

    #[test]
    fn test_multiple_bases_concatenate_in_order() {
        let mut derived = symbol("Derived", SymbolKind::Constructor, &[]);
        derived.inherits = vec!["B".to_string(), "Nope".to_string(), "A".to_string()];

        let (file, reporter) = link(ResolveOptions::default(), vec![
            symbol("A", SymbolKind::Object, &[]),
            symbol("A/a1", SymbolKind::Function, &[]),
            symbol("B", SymbolKind::Object, &[]),
            symbol("B/b1", SymbolKind::Function, &[]),
            symbol("B/b2", SymbolKind::Function, &[]),
            derived,
        ]);

        let derived = file.get_symbol("Derived").unwrap();
        assert_eq!(derived.inherited_methods, vec![SymbolId(3), SymbolId(4), SymbolId(1)]);

        let warnings = reporter.warnings.borrow();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("unfound 'Nope'"));
    }

    #[test]
    fn test_inheritance_is_shallow() {
        let mut middle = symbol("Middle", SymbolKind::Constructor, &[]);
        middle.inherits = vec!["Root".to_string()];
        let mut leaf = symbol("Leaf", SymbolKind::Constructor, &[]);
        leaf.inherits = vec!["Middle".to_string()];

        let (file, _) = link(ResolveOptions::default(), vec![
            symbol("Root", SymbolKind::Constructor, &[]),
            symbol("Root/r", SymbolKind::Function, &[]),
            middle,
            symbol("Middle/m", SymbolKind::Function, &[]),
            leaf,
        ]);

        let middle = file.get_symbol("Middle").unwrap();
        assert_eq!(middle.inherited_methods, vec![SymbolId(1)]);

        let leaf = file.get_symbol("Leaf").unwrap();
        assert_eq!(leaf.inherited_methods, vec![SymbolId(3)]);
    }

    #[test]
    fn test_ignore_and_private_filters() {
        let symbols = vec![
            symbol("gone", SymbolKind::Function, &[("ignore", "")]),
            symbol("secret", SymbolKind::Function, &[("private", "")]),
            symbol("open", SymbolKind::Function, &[]),
        ];

        let (file, _) = link(ResolveOptions::default(), symbols.clone());
        assert_eq!(names(&file), vec!["open"]);

        let options = ResolveOptions { include_private: true, ..Default::default() };
        let (file, _) = link(options, symbols);
        assert_eq!(names(&file), vec!["secret", "open"]);
    }

    #[test]
    fn test_undocumented_filter() {
        let symbols = vec![
            undocumented("plain"),
            undocumented("_hidden"),
            undocumented("Foo._hidden"),
            undocumented("Foo/_hidden"),
            symbol("Foo", SymbolKind::Object, &[]),
        ];

        let (file, _) = link(ResolveOptions::default(), symbols.clone());
        assert_eq!(names(&file), vec!["Foo"]);

        let options = ResolveOptions { all_functions: true, ..Default::default() };
        let (file, _) = link(options, symbols.clone());
        assert_eq!(names(&file), vec!["plain", "Foo"]);

        let options = ResolveOptions { all_functions_underscored: true, ..Default::default() };
        let (file, _) = link(options, symbols);
        assert_eq!(names(&file), vec!["plain", "_hidden", "Foo._hidden", "_hidden", "Foo"]);
    }

    #[test]
    fn test_underscore_check_sees_folded_memberof() {
        let mut raw = undocumented("run");
        raw.tags.push("memberof", "_Internal");

        let options = ResolveOptions { all_functions: true, ..Default::default() };
        let (file, _) = link(options, vec![raw]);
        assert!(file.symbols.is_empty());
    }

    #[test]
    fn test_memberof_tag_is_consumed() {
        let (file, _) = link(ResolveOptions::default(), vec![
            symbol("Foo", SymbolKind::Object, &[]),
            symbol("bar", SymbolKind::Object, &[("memberof", "Foo"), ("memberof", "Other"), ("type", "number")]),
        ]);

        assert!(file.symbols.iter().all(|s| s.tags.get_tag("memberof").is_empty()));
        assert_eq!(file.symbols[1].tags.get_tag("type"), vec!["number"]);
        assert_eq!(file.get_symbol("Foo").unwrap().properties, vec![SymbolId(1)]);
    }

    #[test]
    fn test_nested_paths_use_dotted_parent() {
        let (file, reporter) = link(ResolveOptions::default(), vec![
            symbol("Outer", SymbolKind::Namespace, &[]),
            symbol("Outer/Inner", SymbolKind::Namespace, &[]),
            symbol("Outer/Inner/run", SymbolKind::Function, &[]),
        ]);

        assert!(reporter.warnings.borrow().is_empty());
        let run = &file.symbols[2];
        assert_eq!(run.alias, "Outer.Inner.run");
        assert_eq!(run.memberof.as_deref(), Some("Outer.Inner"));
        assert_eq!(file.get_symbol("Outer.Inner").unwrap().methods, vec![SymbolId(2)]);
        assert_eq!(file.get_symbol("Outer").unwrap().properties, vec![SymbolId(1)]);
    }

    #[test]
    fn test_unclassified_member_adds_nothing_to_parent() {
        let (file, reporter) = link(ResolveOptions::default(), vec![
            symbol("Foo", SymbolKind::Object, &[]),
            symbol("Foo/readme", SymbolKind::File, &[]),
        ]);

        let readme = &file.symbols[1];
        assert_eq!(readme.alias, "Foo.readme");
        assert_eq!(readme.memberof.as_deref(), Some("Foo"));

        let foo = file.get_symbol("Foo").unwrap();
        assert!(foo.methods.is_empty());
        assert!(foo.properties.is_empty());
        assert!(reporter.warnings.borrow().is_empty());
    }

    #[test]
    fn test_malformed_paths_are_not_split() {
        let (file, reporter) = link(ResolveOptions::default(), vec![
            symbol("/x", SymbolKind::Object, &[]),
            symbol("y/", SymbolKind::Function, &[]),
        ]);

        for (symbol, name) in file.symbols.iter().zip(["/x", "y/"]) {
            assert_eq!(symbol.name, name);
            assert_eq!(symbol.alias, name);
            assert_eq!(symbol.memberof, None);
        }
        assert!(reporter.warnings.borrow().is_empty());
    }

    #[test]
    fn test_child_before_parent_is_not_linked() {
        let (file, reporter) = link(ResolveOptions::default(), vec![
            symbol("Foo/bar", SymbolKind::Function, &[]),
            symbol("Foo", SymbolKind::Object, &[]),
        ]);

        assert_eq!(names(&file), vec!["bar", "Foo"]);
        assert!(file.get_symbol("Foo").unwrap().methods.is_empty());
        assert_eq!(reporter.warnings.borrow().len(), 1);
    }

    #[test]
    fn test_overview_from_parser_or_default() {
        let reporter = RecordingReporter::default();
        let resolver = resolver(ResolveOptions::default());

        let with = ParsedSource {
            symbols: Vec::new(),
            overview: Some("/** @fileOverview Widgets. */".to_string()),
        };
        let file = resolver.link(Path::new("w.js"), with, &reporter);
        assert_eq!(file.overview.description.as_str(), "Widgets.");
        assert_eq!(file.overview.kind, SymbolKind::File);

        let file = resolver.link(Path::new("w.js"), parsed(Vec::new()), &reporter);
        assert_eq!(file.overview.description.as_str(), "No overview provided.");
    }

    #[test]
    fn test_relinking_is_idempotent() {
        let symbols = vec![
            symbol("Foo", SymbolKind::Constructor, &[]),
            symbol("go", SymbolKind::Function, &[("memberof", "Foo")]),
            symbol("Foo/size", SymbolKind::Object, &[]),
        ];

        let (first, _) = link(ResolveOptions::default(), symbols.clone());
        let (second, _) = link(ResolveOptions::default(), symbols);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_resolve_orders_files_by_path() {
        let loader = MemoryLoader::default()
            .with("b.js", "/** B. */\nfunction b() {}\n")
            .with("a.js", "/** A. */\nfunction a() {}\n");
        let reporter = RecordingReporter::default();

        let files = resolver(ResolveOptions::default())
            .resolve(["b.js", "a.js"], &loader, &reporter)
            .await
            .unwrap();

        let paths: Vec<&PathBuf> = files.iter().map(|f| &f.path).collect();
        assert_eq!(paths, vec![&PathBuf::from("a.js"), &PathBuf::from("b.js")]);
        assert_eq!(files[0].symbols[0].name, "a");

        let notes = reporter.notes.borrow();
        assert_eq!(notes[0], "Tokenizing: file 1, a.js");
        assert!(notes.iter().any(|n| n.contains("1 symbols found.")));
    }

    #[tokio::test]
    async fn test_resolve_links_parsed_source() {
        let source = r#"
/** A registry. */
var Registry = {};

/**
 * Add an entry.
 * @memberof Registry
 */
function add(entry) {}

/** Size. */
Registry.size = 0;

/**
 * Ordered registry.
 * @augments Registry
 */
function Ordered() {}

/** @memberof Nowhere */
function stray() {}
"#;
        let loader = MemoryLoader::default().with("reg.js", source);
        let reporter = RecordingReporter::default();

        let files = resolver(ResolveOptions::default())
            .resolve("reg.js", &loader, &reporter)
            .await
            .unwrap();
        let file = &files[0];

        let registry = file.get_symbol("Registry").unwrap();
        assert_eq!(registry.methods.len(), 1);
        assert_eq!(registry.properties.len(), 1);

        let ordered = file.get_symbol("Ordered").unwrap();
        assert_eq!(ordered.inherited_methods, registry.methods);
        assert_eq!(ordered.inherited_properties, registry.properties);

        assert!(file.get_symbol("Nowhere.stray").is_some());
        assert_eq!(reporter.warnings.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_function_local_object_stays_out_of_global() {
        let source = r#"
/** Global config. */
var config = {};

function setup() {
    var config = {
        /** Local flag. */
        flag: true
    };
}
"#;
        let loader = MemoryLoader::default().with("cfg.js", source);
        let reporter = RecordingReporter::default();

        let files = resolver(ResolveOptions::default())
            .resolve("cfg.js", &loader, &reporter)
            .await
            .unwrap();
        let file = &files[0];

        assert!(file.get_symbol("config.flag").is_none());
        assert!(file.get_symbol("config").unwrap().properties.is_empty());
        assert!(reporter.warnings.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_load_failure_aborts_batch() {
        let loader = MemoryLoader::default().with("a.js", "var a;");
        let reporter = RecordingReporter::default();

        let result = resolver(ResolveOptions::default())
            .resolve(["a.js", "missing.js"], &loader, &reporter)
            .await;
        assert!(result.is_err());
    }
}
