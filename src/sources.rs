//! Source health and status listing.
//!
//! Used by both `blogctl sources` and `GET /sources`.
//!
//! | Source | Configured when | Healthy when |
//! |--------|-----------------|--------------|
//! | `markdown` | posts directory exists | listing succeeds |
//! | `cms` | a project id is set | query succeeds |

use serde::Serialize;

use crate::aggregate::ContentService;

/// Health and configuration status of a single source.
#[derive(Debug, Clone, Serialize)]
pub struct SourceStatus {
    pub name: String,
    pub configured: bool,
    pub healthy: bool,
    /// Number of posts (published or not) the source listed.
    pub posts: Option<usize>,
    pub notes: Option<String>,
}

/// Probe every registered source with a full listing.
pub async fn get_sources(service: &ContentService) -> Vec<SourceStatus> {
    let mut statuses = Vec::new();

    for source in service.sources() {
        let location = source.location();
        if !source.is_configured() {
            statuses.push(SourceStatus {
                name: source.name().to_string(),
                configured: false,
                healthy: false,
                posts: None,
                notes: Some(format!("not configured: {}", location)),
            });
            continue;
        }

        let status = match source.list_posts().await {
            Ok(posts) => SourceStatus {
                name: source.name().to_string(),
                configured: true,
                healthy: true,
                posts: Some(posts.len()),
                notes: Some(location),
            },
            Err(e) => SourceStatus {
                name: source.name().to_string(),
                configured: true,
                healthy: false,
                posts: None,
                notes: Some(format!("{}: {:#}", location, e)),
            },
        };
        statuses.push(status);
    }

    statuses
}

/// CLI entry point for `blogctl sources`.
pub async fn list_sources(service: &ContentService) {
    let sources = get_sources(service).await;

    println!("{:<10} {:<16} {:<8} {:>6}  NOTES", "SOURCE", "STATUS", "HEALTHY", "POSTS");
    for s in &sources {
        let status_str = if s.configured { "OK" } else { "NOT CONFIGURED" };
        let posts = s.posts.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string());
        println!(
            "{:<10} {:<16} {:<8} {:>6}  {}",
            s.name,
            status_str,
            s.healthy,
            posts,
            s.notes.as_deref().unwrap_or("")
        );
    }
}
