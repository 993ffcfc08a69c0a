//! Markdown source reader.
//!
//! Walks the configured posts directory and turns every matching document
//! (default `*.md` / `*.mdx`) into a post. The slug is the file stem; the
//! metadata comes from YAML front-matter (see [`crate::frontmatter`]).
//! Author profiles are read the same way from `[content].authors_dir`.
//!
//! # Configuration
//!
//! ```toml
//! [content]
//! posts_dir = "content/blog"
//! authors_dir = "content/authors"
//! include_globs = ["*.md", "*.mdx"]
//! exclude_globs = ["drafts/**"]
//! follow_symlinks = false
//! ```
//!
//! A document that cannot be read or parsed is skipped with a warning when
//! listing; a missing or unreadable directory fails the whole scan, which
//! [`list_markdown_posts`] turns into an empty result.

use anyhow::{bail, Result};
use async_trait::async_trait;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::{Config, ContentConfig};
use crate::error::ResolveError;
use crate::frontmatter::{parse_front_matter, AuthorFrontMatter, PostFrontMatter};
use crate::models::{Author, PostDetail, PostSummary, Source};
use crate::normalize::{
    markdown_post_detail, normalize_markdown_author, normalize_markdown_post, NormalizeOptions,
};
use crate::traits::PostSource;

/// A content document found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentFile {
    pub slug: String,
    pub path: PathBuf,
}

/// List content documents under `root` that pass the include/exclude
/// globs, sorted by relative path.
pub fn collect_documents(root: &Path, content: &ContentConfig) -> Result<Vec<ContentFile>> {
    if !root.is_dir() {
        bail!("content directory does not exist: {}", root.display());
    }

    let include_set = build_globset(&content.include_globs)?;

    let mut default_excludes = vec!["**/.git/**".to_string(), "**/node_modules/**".to_string()];
    default_excludes.extend(content.exclude_globs.clone());
    let exclude_set = build_globset(&default_excludes)?;

    let mut files: Vec<(String, ContentFile)> = Vec::new();
    for entry in WalkDir::new(root).follow_links(content.follow_symlinks) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().replace('\\', "/");

        if exclude_set.is_match(&rel_str) || !include_set.is_match(&rel_str) {
            continue;
        }

        let Some(slug) = path.file_stem().map(|s| s.to_string_lossy().to_string()) else {
            continue;
        };
        files.push((
            rel_str,
            ContentFile {
                slug,
                path: path.to_path_buf(),
            },
        ));
    }

    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files.into_iter().map(|(_, f)| f).collect())
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

fn find_document(
    root: &Path,
    content: &ContentConfig,
    slug: &str,
) -> Result<ContentFile, ResolveError> {
    let files = collect_documents(root, content).map_err(|e| {
        warn!(dir = %root.display(), error = %e, "content directory unavailable");
        ResolveError::not_found(slug)
    })?;
    files
        .into_iter()
        .find(|f| f.slug == slug)
        .ok_or_else(|| ResolveError::not_found(slug))
}

// ═══════════════════════════════════════════════════════════════════════
// Posts
// ═══════════════════════════════════════════════════════════════════════

/// Scan the posts directory. Unpublished posts are included; the
/// aggregator filters them.
pub fn scan_markdown_posts(
    content: &ContentConfig,
    opts: &NormalizeOptions,
) -> Result<Vec<PostSummary>> {
    let files = collect_documents(&content.posts_dir, content)?;
    let mut posts = Vec::with_capacity(files.len());

    for file in files {
        let source = match std::fs::read_to_string(&file.path) {
            Ok(s) => s,
            Err(e) => {
                warn!(path = %file.path.display(), error = %e, "skipping unreadable post");
                continue;
            }
        };
        match parse_front_matter::<PostFrontMatter>(&source) {
            Ok((front, body)) => posts.push(normalize_markdown_post(&file.slug, front, body, opts)),
            Err(e) => {
                warn!(path = %file.path.display(), error = %e, "skipping malformed post");
            }
        }
    }

    debug!(count = posts.len(), dir = %content.posts_dir.display(), "scanned markdown posts");
    Ok(posts)
}

/// Soft listing: any directory-level failure is logged and yields an empty
/// sequence.
pub fn list_markdown_posts(content: &ContentConfig, opts: &NormalizeOptions) -> Vec<PostSummary> {
    scan_markdown_posts(content, opts).unwrap_or_else(|e| {
        warn!(error = %e, "markdown post listing failed");
        Vec::new()
    })
}

/// Read one post by slug and render its body to HTML.
pub fn get_markdown_post(
    content: &ContentConfig,
    opts: &NormalizeOptions,
    slug: &str,
) -> Result<PostDetail, ResolveError> {
    let file = find_document(&content.posts_dir, content, slug)?;
    let source =
        std::fs::read_to_string(&file.path).map_err(|e| ResolveError::malformed(slug, e))?;
    let (front, body) = parse_front_matter::<PostFrontMatter>(&source)
        .map_err(|e| ResolveError::malformed(slug, format!("{:#}", e)))?;
    Ok(markdown_post_detail(slug, front, body, opts))
}

// ═══════════════════════════════════════════════════════════════════════
// Authors
// ═══════════════════════════════════════════════════════════════════════

/// Scan the authors directory. No directory configured → empty.
pub fn scan_markdown_authors(
    content: &ContentConfig,
    opts: &NormalizeOptions,
) -> Result<Vec<Author>> {
    let Some(dir) = &content.authors_dir else {
        return Ok(Vec::new());
    };

    let mut authors = Vec::new();
    for file in collect_documents(dir, content)? {
        let parsed = std::fs::read_to_string(&file.path)
            .map_err(anyhow::Error::from)
            .and_then(|s| {
                let (front, body) = parse_front_matter::<AuthorFrontMatter>(&s)?;
                Ok(normalize_markdown_author(&file.slug, front, body, opts))
            });
        match parsed {
            Ok(author) => authors.push(author),
            Err(e) => warn!(path = %file.path.display(), error = %e, "skipping malformed author"),
        }
    }
    Ok(authors)
}

pub fn get_markdown_author(
    content: &ContentConfig,
    opts: &NormalizeOptions,
    slug: &str,
) -> Result<Author, ResolveError> {
    let Some(dir) = &content.authors_dir else {
        return Err(ResolveError::not_found(slug));
    };
    let file = find_document(dir, content, slug)?;
    let source =
        std::fs::read_to_string(&file.path).map_err(|e| ResolveError::malformed(slug, e))?;
    let (front, body) = parse_front_matter::<AuthorFrontMatter>(&source)
        .map_err(|e| ResolveError::malformed(slug, format!("{:#}", e)))?;
    Ok(normalize_markdown_author(slug, front, body, opts))
}

// ═══════════════════════════════════════════════════════════════════════
// PostSource implementation
// ═══════════════════════════════════════════════════════════════════════

/// The Markdown source reader. File I/O runs on the blocking pool.
#[derive(Debug, Clone)]
pub struct MarkdownSource {
    content: ContentConfig,
    opts: NormalizeOptions,
}

impl MarkdownSource {
    pub fn new(config: &Config) -> Self {
        Self {
            content: config.content.clone(),
            opts: NormalizeOptions::from_config(config),
        }
    }
}

#[async_trait]
impl PostSource for MarkdownSource {
    fn name(&self) -> &str {
        "markdown"
    }

    fn provenance(&self) -> Source {
        Source::Markdown
    }

    fn is_configured(&self) -> bool {
        self.content.posts_dir.is_dir()
    }

    fn location(&self) -> String {
        self.content.posts_dir.display().to_string()
    }

    async fn list_posts(&self) -> Result<Vec<PostSummary>> {
        let (content, opts) = (self.content.clone(), self.opts.clone());
        tokio::task::spawn_blocking(move || scan_markdown_posts(&content, &opts)).await?
    }

    async fn get_post(&self, slug: &str) -> Result<PostDetail, ResolveError> {
        let (content, opts, owned) = (self.content.clone(), self.opts.clone(), slug.to_string());
        tokio::task::spawn_blocking(move || get_markdown_post(&content, &opts, &owned))
            .await
            .map_err(|e| ResolveError::malformed(slug, e))?
    }

    async fn list_authors(&self) -> Result<Vec<Author>> {
        let (content, opts) = (self.content.clone(), self.opts.clone());
        tokio::task::spawn_blocking(move || scan_markdown_authors(&content, &opts)).await?
    }

    async fn get_author(&self, slug: &str) -> Result<Author, ResolveError> {
        let (content, opts, owned) = (self.content.clone(), self.opts.clone(), slug.to_string());
        tokio::task::spawn_blocking(move || get_markdown_author(&content, &opts, &owned))
            .await
            .map_err(|e| ResolveError::malformed(slug, e))?
    }
}
