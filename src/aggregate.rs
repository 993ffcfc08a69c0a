//! The aggregator: one merged, newest-first feed over every source.
//!
//! [`ContentService`] is a stateless read-through projector. Each call asks
//! every registered [`PostSource`] for its records, so results always
//! reflect the current state of the backing stores.
//!
//! # Merge rules
//!
//! 1. Sources are read in registration order (Markdown, then CMS).
//! 2. A source that fails to list degrades to an empty result.
//! 3. Unpublished posts are dropped.
//! 4. Slug collisions follow [`SlugCollision`].
//! 5. Posts are stable-sorted newest-first per [`DateOrder`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::{Config, DateOrder, SlugCollision};
use crate::connector_cms::CmsSource;
use crate::connector_md::MarkdownSource;
use crate::error::ResolveError;
use crate::models::{Author, PostDetail, PostSummary};
use crate::traits::PostSource;

/// Parse an authored date into an instant. Accepts RFC 3339, a naive
/// `YYYY-MM-DDTHH:MM:SS` timestamp, or a bare `YYYY-MM-DD` date.
pub fn parse_post_date(date: &str) -> Option<DateTime<Utc>> {
    let date = date.trim();
    if date.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Ordering for a newest-first sort: `Less` means `a` comes first.
pub fn compare_dates_desc(a: &str, b: &str, order: DateOrder) -> Ordering {
    match order {
        DateOrder::Lexicographic => b.cmp(a),
        DateOrder::Chronological => match (parse_post_date(a), parse_post_date(b)) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    }
}

/// Stable newest-first sort.
pub fn sort_newest_first(posts: &mut [PostSummary], order: DateOrder) {
    posts.sort_by(|a, b| compare_dates_desc(&a.date, &b.date, order));
}

/// Merge per-source listings (in source order) into the exposed feed.
pub fn merge_posts(
    batches: Vec<Vec<PostSummary>>,
    collision: SlugCollision,
    order: DateOrder,
) -> Vec<PostSummary> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::new();

    for post in batches.into_iter().flatten() {
        if !post.published {
            continue;
        }
        if collision == SlugCollision::FirstWins && !seen.insert(post.slug.clone()) {
            warn!(slug = %post.slug, source = %post.source, "dropping post with duplicate slug");
            continue;
        }
        merged.push(post);
    }

    sort_newest_first(&mut merged, order);
    merged
}

/// Unified content service over an ordered list of sources.
#[derive(Clone)]
pub struct ContentService {
    sources: Arc<Vec<Box<dyn PostSource>>>,
    collision: SlugCollision,
    date_order: DateOrder,
    related_limit: usize,
}

impl ContentService {
    /// Build the service with the built-in Markdown and CMS sources.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let sources: Vec<Box<dyn PostSource>> = vec![
            Box::new(MarkdownSource::new(config)),
            Box::new(CmsSource::new(config)?),
        ];
        Ok(Self::with_sources(config, sources))
    }

    /// Build the service over custom sources, in priority order.
    pub fn with_sources(config: &Config, sources: Vec<Box<dyn PostSource>>) -> Self {
        Self {
            sources: Arc::new(sources),
            collision: config.content.slug_collision,
            date_order: config.content.date_order,
            related_limit: config.query.related_limit,
        }
    }

    pub fn sources(&self) -> &[Box<dyn PostSource>] {
        &self.sources
    }

    pub fn default_related_limit(&self) -> usize {
        self.related_limit
    }

    /// All published posts from every source, newest first. Never fails.
    pub async fn list_all_posts(&self) -> Vec<PostSummary> {
        let mut batches = Vec::with_capacity(self.sources.len());
        for source in self.sources.iter() {
            match source.list_posts().await {
                Ok(posts) => {
                    debug!(source = source.name(), count = posts.len(), "listed posts");
                    batches.push(posts);
                }
                Err(e) => {
                    warn!(source = source.name(), error = %e, "source unavailable, continuing without it");
                }
            }
        }
        merge_posts(batches, self.collision, self.date_order)
    }

    /// Resolve one published post. The first source with a published record
    /// for the slug wins; unpublished records count as absent.
    pub async fn get_post(&self, slug: &str) -> Result<PostDetail, ResolveError> {
        let mut malformed = None;
        for source in self.sources.iter() {
            match source.get_post(slug).await {
                Ok(detail) if detail.summary.published => return Ok(detail),
                Ok(_) => {
                    debug!(slug, source = source.name(), "post is unpublished, trying next source");
                    continue;
                }
                Err(ResolveError::NotFound(_)) => continue,
                Err(e @ ResolveError::Malformed { .. }) => {
                    warn!(slug, source = source.name(), error = %e, "malformed post");
                    malformed.get_or_insert(e);
                }
            }
        }
        Err(malformed.unwrap_or_else(|| ResolveError::not_found(slug)))
    }

    /// All authors from every source sorted by name; the first source wins
    /// on duplicate slugs.
    pub async fn list_all_authors(&self) -> Vec<Author> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut authors = Vec::new();
        for source in self.sources.iter() {
            match source.list_authors().await {
                Ok(list) => {
                    for author in list {
                        if seen.insert(author.slug.clone()) {
                            authors.push(author);
                        }
                    }
                }
                Err(e) => {
                    warn!(source = source.name(), error = %e, "author listing unavailable");
                }
            }
        }
        authors.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        authors
    }

    pub async fn get_author(&self, slug: &str) -> Result<Author, ResolveError> {
        let mut malformed = None;
        for source in self.sources.iter() {
            match source.get_author(slug).await {
                Ok(author) => return Ok(author),
                Err(ResolveError::NotFound(_)) => continue,
                Err(e) => {
                    malformed.get_or_insert(e);
                }
            }
        }
        Err(malformed.unwrap_or_else(|| ResolveError::not_found(slug)))
    }
}
