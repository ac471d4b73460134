use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tera::{Context, Tera};
use tracing::{debug, info, warn};

use crate::config::{OutputConfig, OutputFormat};
use crate::error::{SymdocError, Result};
use super::doc_file::DocFile;
use super::symbol::{Symbol, SymbolId, SymbolKind};
use super::tags::Tag;

const FILE_TEMPLATE: &str = "file.tera";
const INDEX_TEMPLATE: &str = "index.tera";
const INDEX_DOCUMENT: &str = "index.md";

const DEFAULT_FILE_TEMPLATE: &str = r#"# {{ file.path }}

{{ file.overview.description }}
{% for symbol in file.symbols %}
## {{ symbol.alias }}

*{{ symbol.kind }}*{% if symbol.memberof %} member of `{{ symbol.memberof }}`{% endif %}

{% if symbol.undocumented %}_Undocumented._{% else %}{{ symbol.description }}{% endif %}
{% for tag in symbol.tags %}
- **@{{ tag.title }}** {{ tag.text }}{% endfor %}
{% if symbol.methods %}
### Methods
{% for m in symbol.methods %}
- `{{ m.alias }}`{% endfor %}
{% endif %}{% if symbol.properties %}
### Properties
{% for p in symbol.properties %}
- `{{ p.alias }}`{% endfor %}
{% endif %}{% if symbol.inherited_methods %}
### Inherited methods
{% for m in symbol.inherited_methods %}
- `{{ m.alias }}`{% endfor %}
{% endif %}{% if symbol.inherited_properties %}
### Inherited properties
{% for p in symbol.inherited_properties %}
- `{{ p.alias }}`{% endfor %}
{% endif %}{% endfor %}
---
Generated {{ generated_at }}
"#;

const DEFAULT_INDEX_TEMPLATE: &str = r#"# {{ project }}

{% for file in files %}- [{{ file.path }}]({{ file.output }}): {{ file.overview.description }}
{% endfor %}
---
Generated {{ generated_at }}
"#;

/// A linked symbol as seen by templates.
#[derive(Debug, Clone, Serialize)]
pub struct SymbolRef {
    pub name: String,
    pub alias: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SymbolView {
    pub name: String,
    pub alias: String,
    pub kind: SymbolKind,
    pub description: String,
    pub undocumented: bool,
    pub memberof: Option<String>,
    pub line: usize,
    pub tags: Vec<Tag>,
    pub inherits: Vec<String>,
    pub methods: Vec<SymbolRef>,
    pub properties: Vec<SymbolRef>,
    pub inherited_methods: Vec<SymbolRef>,
    pub inherited_properties: Vec<SymbolRef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileView {
    pub path: String,
    /// Document name relative to the output directory
    pub output: String,
    pub overview: SymbolView,
    pub symbols: Vec<SymbolView>,
}

impl FileView {
    pub fn new(file: &DocFile) -> Self {
        Self {
            path: file.path.display().to_string(),
            output: output_name(&file.path),
            overview: SymbolView::new(&file.overview, file),
            symbols: file.symbols.iter().map(|s| SymbolView::new(s, file)).collect(),
        }
    }

    /// Views for a batch of files. Document names that flatten to the same
    /// string get a numeric suffix so no document overwrites another.
    pub fn all(files: &[DocFile]) -> Vec<Self> {
        let mut taken: HashSet<String> = HashSet::from([INDEX_DOCUMENT.to_string()]);

        files
            .iter()
            .map(|file| {
                let mut view = Self::new(file);
                if !taken.insert(view.output.clone()) {
                    let stem = view.output.trim_end_matches(".md").to_string();
                    let unique = (2..)
                        .map(|n| format!("{}-{}.md", stem, n))
                        .find(|name| !taken.contains(name))
                        .unwrap_or_default();
                    warn!(
                        "{} flattens to the taken document name {}; writing {} instead",
                        view.path, view.output, unique
                    );
                    taken.insert(unique.clone());
                    view.output = unique;
                }
                view
            })
            .collect()
    }
}

impl SymbolView {
    fn new(symbol: &Symbol, file: &DocFile) -> Self {
        let refs = |ids: &[SymbolId]| -> Vec<SymbolRef> {
            ids.iter()
                .filter_map(|id| file.symbol(*id))
                .map(|s| SymbolRef {
                    name: s.name.clone(),
                    alias: s.alias.clone(),
                })
                .collect()
        };

        Self {
            name: symbol.name.clone(),
            alias: symbol.alias.clone(),
            kind: symbol.kind,
            description: symbol.description.as_str().to_string(),
            undocumented: symbol.is_undocumented(),
            memberof: symbol.memberof.clone(),
            line: symbol.line,
            tags: symbol.tags.iter().cloned().collect(),
            inherits: symbol.inherits.clone(),
            methods: refs(&symbol.methods),
            properties: refs(&symbol.properties),
            inherited_methods: refs(&symbol.inherited_methods),
            inherited_properties: refs(&symbol.inherited_properties),
        }
    }
}

/// `src/app.js` becomes `src_app.js.md`.
pub fn output_name(path: &Path) -> String {
    let flat: String = path
        .to_string_lossy()
        .trim_start_matches(['.', '/', '\\'])
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect();
    format!("{}.md", flat)
}

/// Renders resolved files into an output directory.
pub struct Publisher {
    tera: Tera,
    format: OutputFormat,
    directory: PathBuf,
}

impl Publisher {
    pub fn new(config: &OutputConfig) -> Result<Self> {
        let tera = match &config.template_dir {
            Some(dir) => {
                let pattern = dir.join("*.tera");
                let tera = Tera::new(&pattern.to_string_lossy())?;
                for required in [FILE_TEMPLATE, INDEX_TEMPLATE] {
                    if !tera.get_template_names().any(|name| name == required) {
                        return Err(SymdocError::Config(format!(
                            "Template directory {} has no {}",
                            dir.display(),
                            required
                        )));
                    }
                }
                tera
            }
            None => {
                let mut tera = Tera::default();
                tera.add_raw_template(FILE_TEMPLATE, DEFAULT_FILE_TEMPLATE)?;
                tera.add_raw_template(INDEX_TEMPLATE, DEFAULT_INDEX_TEMPLATE)?;
                tera
            }
        };

        Ok(Self {
            tera,
            format: config.format,
            directory: config.directory.clone(),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Write the documents for `files`; returns the written paths.
    pub async fn publish(&self, project: &str, files: &[DocFile]) -> Result<Vec<PathBuf>> {
        tokio::fs::create_dir_all(&self.directory).await?;

        let views = FileView::all(files);
        let mut written = Vec::new();

        match self.format {
            OutputFormat::Json => {
                let target = self.directory.join("symbols.json");
                tokio::fs::write(&target, serde_json::to_string_pretty(&views)?).await?;
                written.push(target);
            }
            OutputFormat::Markdown => {
                let generated_at = chrono::Utc::now().to_rfc3339();

                for view in &views {
                    let mut context = Context::new();
                    context.insert("file", view);
                    context.insert("generated_at", &generated_at);

                    let target = self.directory.join(&view.output);
                    let rendered = self.tera.render(FILE_TEMPLATE, &context)?;
                    tokio::fs::write(&target, rendered).await?;
                    debug!("Wrote {}", target.display());
                    written.push(target);
                }

                let mut context = Context::new();
                context.insert("project", project);
                context.insert("files", &views);
                context.insert("generated_at", &generated_at);

                let target = self.directory.join(INDEX_DOCUMENT);
                tokio::fs::write(&target, self.tera.render(INDEX_TEMPLATE, &context)?).await?;
                written.push(target);
            }
        }

        info!("Published {} documents to {}", written.len(), self.directory.display());
        Ok(written)
    }
}
