//! The source-reader extension point.
//!
//! Both built-in readers (Markdown files and the headless CMS) implement
//! [`PostSource`]. [`crate::aggregate::ContentService`] only talks to this
//! trait, so additional backends, or in-memory fakes in tests, can be
//! registered alongside the built-in ones.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use anyhow::Result;
//! use blog_resolver::error::ResolveError;
//! use blog_resolver::models::{PostDetail, PostSummary, Source};
//! use blog_resolver::traits::PostSource;
//!
//! pub struct NoPosts;
//!
//! #[async_trait]
//! impl PostSource for NoPosts {
//!     fn name(&self) -> &str { "empty" }
//!     fn provenance(&self) -> Source { Source::Markdown }
//!
//!     async fn list_posts(&self) -> Result<Vec<PostSummary>> {
//!         Ok(vec![])
//!     }
//!
//!     async fn get_post(&self, slug: &str) -> Result<PostDetail, ResolveError> {
//!         Err(ResolveError::not_found(slug))
//!     }
//! }
//! ```

use anyhow::Result;
use async_trait::async_trait;

use crate::error::ResolveError;
use crate::models::{Author, PostDetail, PostSummary, Source};

/// A backing store that yields posts (and optionally authors).
///
/// Listing methods return `Err` when the whole source is unavailable; the
/// aggregator logs that and carries on with an empty result for this
/// source. Lookups distinguish a missing record from a malformed one.
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Short identifier used in logs and `blogctl sources`.
    fn name(&self) -> &str;

    /// Provenance stamped on every record from this source.
    fn provenance(&self) -> Source;

    /// Whether the source has what it needs to serve content.
    fn is_configured(&self) -> bool {
        true
    }

    /// Human-readable location (directory, endpoint URL).
    fn location(&self) -> String {
        String::new()
    }

    async fn list_posts(&self) -> Result<Vec<PostSummary>>;

    async fn get_post(&self, slug: &str) -> Result<PostDetail, ResolveError>;

    async fn list_authors(&self) -> Result<Vec<Author>> {
        Ok(Vec::new())
    }

    async fn get_author(&self, slug: &str) -> Result<Author, ResolveError> {
        Err(ResolveError::not_found(slug))
    }
}
