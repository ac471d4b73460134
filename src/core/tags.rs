//! Documentation tags and the doc comment grammar they are read from.
//!
//! A doc comment is a `/** ... */` block. Lines before the first `@tag`
//! line form the description; every `@tag` line opens a tag whose text
//! continues over the following non-tag lines.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static RE_TAG_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@([A-Za-z_][\w-]*)\s*(.*)$").unwrap());

/// One `@title text` annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub title: String,
    pub text: String,
}

/// Ordered multimap from tag title to argument strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TagSet {
    tags: Vec<Tag>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, title: impl Into<String>, text: impl Into<String>) {
        self.tags.push(Tag {
            title: title.into(),
            text: text.into(),
        });
    }

    /// All arguments recorded for `title`, in declaration order. Empty when absent.
    pub fn get_tag(&self, title: &str) -> Vec<&str> {
        self.tags
            .iter()
            .filter(|tag| tag.title == title)
            .map(|tag| tag.text.as_str())
            .collect()
    }

    pub fn has_tag(&self, title: &str) -> bool {
        self.tags.iter().any(|tag| tag.title == title)
    }

    /// Remove every entry for `title`. Dropping an absent tag is a no-op.
    pub fn drop_tag(&mut self, title: &str) {
        self.tags.retain(|tag| tag.title != title);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter()
    }
}

impl<T: Into<String>, U: Into<String>> FromIterator<(T, U)> for TagSet {
    fn from_iter<I: IntoIterator<Item = (T, U)>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for (title, text) in iter {
            set.push(title, text);
        }
        set
    }
}

/// A parsed `/** ... */` block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocComment {
    pub description: String,
    pub tags: TagSet,
}

impl DocComment {
    pub fn parse(raw: &str) -> Self {
        let body = raw.trim();
        let body = body.strip_prefix("/**").unwrap_or(body);
        let body = body.strip_suffix("*/").unwrap_or(body);

        let mut description_lines: Vec<&str> = Vec::new();
        let mut tags: Vec<(String, Vec<&str>)> = Vec::new();

        for line in body.lines() {
            let line = strip_margin(line);

            if let Some(caps) = RE_TAG_LINE.captures(line) {
                let title = caps[1].to_string();
                let first = caps.get(2).map(|m| m.as_str()).unwrap_or("");
                tags.push((title, vec![first]));
            } else if let Some((_, lines)) = tags.last_mut() {
                lines.push(line);
            } else {
                description_lines.push(line);
            }
        }

        let mut comment = DocComment {
            description: description_lines.join("\n").trim().to_string(),
            tags: TagSet::new(),
        };

        for (title, lines) in tags {
            comment.tags.push(title, lines.join("\n").trim());
        }

        for title in ["desc", "description"] {
            if let Some(text) = comment.tags.get_tag(title).first() {
                comment.description = text.to_string();
            }
        }

        comment
    }
}

/// Strip the leading `*` gutter of a doc comment line.
fn strip_margin(line: &str) -> &str {
    let line = line.trim_start();
    match line.strip_prefix('*') {
        Some(rest) => rest.strip_prefix(' ').unwrap_or(rest).trim_end(),
        None => line.trim_end(),
    }
}
