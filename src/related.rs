//! Relatedness engine.
//!
//! A candidate's score against a post is
//!
//! ```text
//! score = 2 * |shared tags| + |shared categories|
//! ```
//!
//! Candidates with score 0 and the post itself are excluded. Ties keep the
//! incoming (newest-first) order.

use std::collections::HashSet;

use crate::aggregate::ContentService;
use crate::models::PostSummary;

pub const TAG_WEIGHT: u32 = 2;
pub const CATEGORY_WEIGHT: u32 = 1;

fn overlap(a: &[String], b: &[String]) -> u32 {
    let a: HashSet<&str> = a.iter().map(String::as_str).collect();
    let b: HashSet<&str> = b.iter().map(String::as_str).collect();
    a.intersection(&b).count() as u32
}

pub fn relatedness_score(post: &PostSummary, other: &PostSummary) -> u32 {
    TAG_WEIGHT * overlap(&post.tags, &other.tags)
        + CATEGORY_WEIGHT * overlap(&post.categories, &other.categories)
}

/// Scored candidates, best first, at most `limit` of them.
pub fn scored_related(
    post: &PostSummary,
    candidates: &[PostSummary],
    limit: usize,
) -> Vec<(PostSummary, u32)> {
    let mut scored: Vec<(PostSummary, u32)> = candidates
        .iter()
        .filter(|c| c.slug != post.slug)
        .map(|c| (c, relatedness_score(post, c)))
        .filter(|(_, score)| *score > 0)
        .map(|(c, score)| (c.clone(), score))
        .collect();

    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.truncate(limit);
    scored
}

pub fn related_to(post: &PostSummary, candidates: &[PostSummary], limit: usize) -> Vec<PostSummary> {
    scored_related(post, candidates, limit)
        .into_iter()
        .map(|(p, _)| p)
        .collect()
}

impl ContentService {
    /// Related posts from the full published feed. `None` uses the
    /// configured default limit.
    pub async fn related_to(&self, post: &PostSummary, limit: Option<usize>) -> Vec<PostSummary> {
        let limit = limit.unwrap_or_else(|| self.default_related_limit());
        related_to(post, &self.list_all_posts().await, limit)
    }
}
