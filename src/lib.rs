//! # Blog Resolver
//!
//! **Unified blog content resolution over Markdown files and a headless CMS.**
//!
//! Blog Resolver reads posts and author profiles from two backends, a
//! directory of Markdown documents with YAML front-matter and a headless
//! CMS query API, and projects them into one newest-first feed with
//! category/tag/author filters, search, and related-post suggestions.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌────────────┐   ┌────────────┐   ┌──────────────┐
//! │ Markdown dir │──▶│            │   │            │──▶│ Query layer  │
//! └──────────────┘   │ Normalizer │──▶│ Aggregator │   └──────────────┘
//! ┌──────────────┐   │            │   │            │   ┌──────────────┐
//! │  CMS API     │──▶│            │   │            │──▶│ Relatedness  │
//! └──────────────┘   └────────────┘   └────────────┘   └──────────────┘
//!                                           │
//!                             ┌─────────────┴───────────┐
//!                             ▼                         ▼
//!                       ┌──────────┐              ┌──────────┐
//!                       │   CLI    │              │   HTTP   │
//!                       │(blogctl) │              │  (JSON)  │
//!                       └──────────┘              └──────────┘
//! ```
//!
//! There is no storage of its own: every call re-reads both sources. A
//! source that is missing, unconfigured, or failing contributes nothing
//! instead of failing the request.
//!
//! ## Quick Start
//!
//! ```bash
//! blogctl list                       # merged feed
//! blogctl tag ai                     # filter by tag
//! blogctl related shipping-ai-desk   # suggested further reading
//! blogctl serve                      # JSON API
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration, environment overrides, validation |
//! | [`models`] | `PostSummary`, `PostDetail`, `Author`, `Source` |
//! | [`error`] | `ResolveError` for lookups by slug |
//! | [`frontmatter`] | YAML front-matter parsing |
//! | [`markdown`] | Markdown → HTML, excerpt text |
//! | [`image`] | Image reference → URL resolution |
//! | [`normalize`] | Per-source mapping to the canonical model |
//! | [`connector_md`] | Markdown source reader |
//! | [`connector_cms`] | Headless CMS source reader |
//! | [`traits`] | `PostSource` extension trait |
//! | [`aggregate`] | `ContentService`: merge, filter, sort |
//! | [`query`] | Category/tag/author filters, search, facets |
//! | [`related`] | Related-post scoring |
//! | [`sources`] | Source status listing |
//! | [`server`] | Axum JSON API |

pub mod aggregate;
pub mod config;
pub mod connector_cms;
pub mod connector_md;
pub mod error;
pub mod frontmatter;
pub mod image;
pub mod markdown;
pub mod models;
pub mod normalize;
pub mod query;
pub mod related;
pub mod server;
pub mod sources;
pub mod traits;

pub use aggregate::ContentService;
pub use error::ResolveError;
pub use models::{Author, PostBody, PostDetail, PostSummary, Source};
pub use traits::PostSource;
