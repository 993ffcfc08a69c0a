//! YAML front-matter extraction.
//!
//! A document may start with a metadata block fenced by `---` lines:
//!
//! ```text
//! ---
//! title: Shipping an AI support desk
//! date: 2024-05-02
//! tags: [ai, support]
//! ---
//! Body text...
//! ```
//!
//! Documents without a fence have empty metadata and the whole text as body.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Front-matter of a blog post document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostFrontMatter {
    pub title: Option<String>,
    pub date: Option<String>,
    pub author: Option<String>,
    #[serde(alias = "description")]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub tags: StringList,
    #[serde(default, alias = "category")]
    pub categories: StringList,
    #[serde(alias = "cover_image", alias = "image")]
    pub cover_image: Option<String>,
    pub published: Option<bool>,
    pub draft: Option<bool>,
}

impl PostFrontMatter {
    /// `published` wins over `draft`; a post is published unless told otherwise.
    pub fn is_published(&self) -> bool {
        match (self.published, self.draft) {
            (Some(published), _) => published,
            (None, Some(draft)) => !draft,
            (None, None) => true,
        }
    }
}

/// Front-matter of an author profile document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorFrontMatter {
    pub name: Option<String>,
    pub bio: Option<String>,
    #[serde(alias = "avatarUrl", alias = "image")]
    pub avatar: Option<String>,
    pub email: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub website: Option<String>,
}

/// A list field that may be written as a YAML sequence or as a single
/// comma-separated string.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawStringList")]
pub struct StringList(pub Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawStringList {
    One(String),
    Many(Vec<serde_yaml::Value>),
    Missing(()),
}

/// Scalars become their YAML text (`2024`, `true`); nulls and nested
/// collections are dropped.
fn scalar_text(value: serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Tagged(tagged) => scalar_text(tagged.value),
        _ => None,
    }
}

impl From<RawStringList> for StringList {
    fn from(raw: RawStringList) -> Self {
        let values = match raw {
            RawStringList::One(s) => s.split(',').map(|v| v.trim().to_string()).collect(),
            RawStringList::Many(items) => items.into_iter().filter_map(scalar_text).collect(),
            RawStringList::Missing(()) => Vec::new(),
        };
        StringList(values)
    }
}

impl StringList {
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

/// Split `source` into its raw YAML block and body. Returns `None` when the
/// document has no front-matter fence.
pub fn split_front_matter(source: &str) -> Option<(&str, &str)> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let rest = source
        .strip_prefix("---\r\n")
        .or_else(|| source.strip_prefix("---\n"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Some((yaml, body));
        }
        offset += line.len();
    }
    None
}

/// Parse the front-matter of `source` into `T`, returning it with the body.
pub fn parse_front_matter<T>(source: &str) -> Result<(T, &str)>
where
    T: DeserializeOwned + Default,
{
    match split_front_matter(source) {
        Some((yaml, body)) => {
            let meta = if yaml.trim().is_empty() {
                T::default()
            } else {
                serde_yaml::from_str(yaml).context("invalid front-matter")?
            };
            Ok((meta, body))
        }
        None => Ok((T::default(), source)),
    }
}
