//! Query layer: filters and facets over the aggregated feed.
//!
//! The free functions work on any slice of posts and keep its order. The
//! [`ContentService`] methods re-read every source on each call and then
//! apply the same functions.

use std::collections::BTreeSet;

use crate::aggregate::ContentService;
use crate::error::ResolveError;
use crate::models::PostSummary;

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Posts with a category equal to `name`, ignoring case.
pub fn filter_by_category(posts: &[PostSummary], name: &str) -> Vec<PostSummary> {
    posts
        .iter()
        .filter(|p| p.categories.iter().any(|c| eq_ignore_case(c, name)))
        .cloned()
        .collect()
}

/// Posts with a tag equal to `name`, ignoring case.
pub fn filter_by_tag(posts: &[PostSummary], name: &str) -> Vec<PostSummary> {
    posts
        .iter()
        .filter(|p| p.tags.iter().any(|t| eq_ignore_case(t, name)))
        .cloned()
        .collect()
}

/// Posts whose author display name equals `name`, ignoring case.
pub fn filter_by_author(posts: &[PostSummary], name: &str) -> Vec<PostSummary> {
    posts
        .iter()
        .filter(|p| eq_ignore_case(&p.author, name))
        .cloned()
        .collect()
}

/// Case-insensitive substring match over title, excerpt, and tags. A blank
/// query matches nothing.
pub fn search_posts(posts: &[PostSummary], query: &str) -> Vec<PostSummary> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    posts
        .iter()
        .filter(|p| {
            p.title.to_lowercase().contains(&needle)
                || p.excerpt.to_lowercase().contains(&needle)
                || p.tags.iter().any(|t| t.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

/// Distinct categories, sorted ascending.
pub fn distinct_categories(posts: &[PostSummary]) -> Vec<String> {
    posts
        .iter()
        .flat_map(|p| p.categories.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct tags, sorted ascending.
pub fn distinct_tags(posts: &[PostSummary]) -> Vec<String> {
    posts
        .iter()
        .flat_map(|p| p.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Combined filter used by the HTTP API and CLI. Empty fields are ignored.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub category: Option<String>,
    pub tag: Option<String>,
    pub author: Option<String>,
    pub query: Option<String>,
}

impl PostFilter {
    pub fn apply(&self, posts: Vec<PostSummary>) -> Vec<PostSummary> {
        let mut posts = posts;
        if let Some(category) = non_empty(&self.category) {
            posts = filter_by_category(&posts, category);
        }
        if let Some(tag) = non_empty(&self.tag) {
            posts = filter_by_tag(&posts, tag);
        }
        if let Some(author) = non_empty(&self.author) {
            posts = filter_by_author(&posts, author);
        }
        if let Some(query) = non_empty(&self.query) {
            posts = search_posts(&posts, query);
        }
        posts
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl ContentService {
    pub async fn by_category(&self, name: &str) -> Vec<PostSummary> {
        filter_by_category(&self.list_all_posts().await, name)
    }

    pub async fn by_tag(&self, name: &str) -> Vec<PostSummary> {
        filter_by_tag(&self.list_all_posts().await, name)
    }

    pub async fn by_author(&self, name: &str) -> Vec<PostSummary> {
        filter_by_author(&self.list_all_posts().await, name)
    }

    pub async fn search(&self, query: &str) -> Vec<PostSummary> {
        search_posts(&self.list_all_posts().await, query)
    }

    pub async fn all_categories(&self) -> Vec<String> {
        distinct_categories(&self.list_all_posts().await)
    }

    pub async fn all_tags(&self) -> Vec<String> {
        distinct_tags(&self.list_all_posts().await)
    }

    pub async fn filtered(&self, filter: &PostFilter) -> Vec<PostSummary> {
        filter.apply(self.list_all_posts().await)
    }

    /// Posts written by the author with `slug`, matched on display name.
    pub async fn posts_by_author_slug(&self, slug: &str) -> Result<Vec<PostSummary>, ResolveError> {
        let author = self.get_author(slug).await?;
        Ok(self.by_author(&author.name).await)
    }
}
