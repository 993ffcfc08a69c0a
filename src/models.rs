//! Core data models shared by every source, the query layer, and the
//! HTTP API.
//!
//! Both backends converge on these types: the Markdown reader and the CMS
//! reader each normalize their native records into a [`PostSummary`] (or
//! [`PostDetail`] / [`Author`]) tagged with its [`Source`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which backing store produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Markdown,
    Cms,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Markdown => "markdown",
            Source::Cms => "cms",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// The unit exchanged by the query layer and the relatedness engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub slug: String,
    pub title: String,
    /// ISO-8601 date as authored; compared per [`crate::config::DateOrder`].
    pub date: String,
    pub author: String,
    pub excerpt: String,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub cover_image: Option<String>,
    pub read_time_minutes: u32,
    pub published: bool,
    pub source: Source,
}

/// Body of a single post, in whatever shape its source produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum PostBody {
    /// Rendered HTML (Markdown posts).
    Html(String),
    /// Structured rich-text blocks (CMS posts).
    Blocks(Vec<serde_json::Value>),
}

/// A post with its full body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub summary: PostSummary,
    pub body: PostBody,
}

impl PostDetail {
    pub fn slug(&self) -> &str {
        &self.summary.slug
    }
}

/// Named social channels of an author.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialLinks {
    pub email: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub slug: String,
    pub name: String,
    pub bio: String,
    pub avatar_url: Option<String>,
    pub social: SocialLinks,
    pub source: Source,
}
