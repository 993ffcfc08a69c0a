//! Headless CMS source reader.
//!
//! Queries the CMS HTTP query API with GROQ and normalizes the returned
//! documents. References (author, tags, categories) are joined inside the
//! query projection, so each document arrives self-contained.
//!
//! # Configuration
//!
//! ```toml
//! [cms]
//! project_id = "abc123"
//! dataset = "production"
//! api_version = "2024-01-01"
//! use_cdn = true
//! ```
//!
//! # Degraded modes
//!
//! - No project identity configured: every operation returns empty /
//!   not-found without touching the network.
//! - Network, HTTP status, or decode failure: logged and treated as "no
//!   results". There are no retries; the request timeout comes from
//!   `[cms].timeout_secs`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{CmsConfig, Config};
use crate::error::ResolveError;
use crate::image::ImageRef;
use crate::models::{Author, PostDetail, PostSummary, Source};
use crate::normalize::{cms_post_detail, normalize_cms_author, normalize_cms_post, NormalizeOptions};
use crate::traits::PostSource;

const POST_PROJECTION: &str = r#"{
  title,
  "slug": slug.current,
  "date": coalesce(date, publishedAt),
  excerpt,
  content,
  readTime,
  published,
  coverImage,
  author->{name, "slug": slug.current, image},
  tags[]->{title},
  categories[]->{title}
}"#;

const AUTHOR_PROJECTION: &str = r#"{
  name,
  "slug": slug.current,
  bio,
  image,
  email,
  linkedin,
  github,
  website
}"#;

fn posts_query() -> String {
    format!(
        r#"*[_type == "post" && published != false] | order(date desc) {}"#,
        POST_PROJECTION
    )
}

fn post_by_slug_query() -> String {
    format!(
        r#"*[_type == "post" && slug.current == $slug][0] {}"#,
        POST_PROJECTION
    )
}

fn authors_query() -> String {
    format!(r#"*[_type == "author"] | order(name asc) {}"#, AUTHOR_PROJECTION)
}

fn author_by_slug_query() -> String {
    format!(
        r#"*[_type == "author" && slug.current == $slug][0] {}"#,
        AUTHOR_PROJECTION
    )
}

// ═══════════════════════════════════════════════════════════════════════
// Wire types
// ═══════════════════════════════════════════════════════════════════════

/// A slug as projected (`"slug": slug.current`) or as the raw slug object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CmsSlug {
    Plain(String),
    Object { current: Option<String> },
}

impl CmsSlug {
    pub fn current(&self) -> Option<String> {
        let value = match self {
            CmsSlug::Plain(s) => Some(s.as_str()),
            CmsSlug::Object { current } => current.as_deref(),
        }?;
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    }
}

/// A joined tag/category reference, or a bare name.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CmsReference {
    Name(String),
    Doc {
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        name: Option<String>,
    },
    Other(Value),
}

impl CmsReference {
    pub fn display_name(&self) -> Option<String> {
        match self {
            CmsReference::Name(name) => Some(name.clone()),
            CmsReference::Doc { title, name } => title.clone().or_else(|| name.clone()),
            CmsReference::Other(_) => None,
        }
    }
}

/// Text that may be plain or rich-text blocks.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CmsText {
    Plain(String),
    Blocks(Vec<Value>),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CmsAuthorRef {
    Name(String),
    Doc(CmsAuthorDoc),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CmsPostDoc {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<CmsSlug>,
    #[serde(default, alias = "publishedAt")]
    pub date: Option<String>,
    #[serde(default)]
    pub author: Option<CmsAuthorRef>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: Option<Vec<Value>>,
    #[serde(default)]
    pub tags: Option<Vec<CmsReference>>,
    #[serde(default)]
    pub categories: Option<Vec<CmsReference>>,
    #[serde(default)]
    pub cover_image: Option<ImageRef>,
    #[serde(default)]
    pub read_time: Option<f64>,
    #[serde(default)]
    pub published: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CmsAuthorDoc {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<CmsSlug>,
    #[serde(default)]
    pub bio: Option<CmsText>,
    #[serde(default)]
    pub image: Option<ImageRef>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub github: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    result: T,
}

/// Decode result documents one by one; a document that does not fit the
/// wire shape is logged and skipped.
fn decode_each<T: DeserializeOwned>(docs: Vec<Value>, kind: &str) -> Vec<T> {
    docs.into_iter()
        .filter_map(|doc| {
            let id = doc.get("slug").cloned().unwrap_or(Value::Null);
            serde_json::from_value(doc)
                .map_err(|e| warn!(kind, slug = %id, error = %e, "skipping malformed cms document"))
                .ok()
        })
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════
// HTTP client
// ═══════════════════════════════════════════════════════════════════════

/// Thin client for the CMS query endpoint.
#[derive(Debug, Clone)]
pub struct CmsClient {
    http: reqwest::Client,
    config: CmsConfig,
}

impl CmsClient {
    pub fn new(config: &CmsConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build CMS HTTP client")?;
        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    /// Run a GROQ query. Parameter values are JSON-encoded as the API
    /// expects (`$slug="my-post"`).
    pub async fn query<T>(&self, groq: &str, params: &[(&str, &str)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let mut pairs: Vec<(String, String)> = vec![("query".to_string(), groq.to_string())];
        for (name, value) in params {
            pairs.push((format!("${}", name), serde_json::to_string(value)?));
        }

        let url = self.config.query_url();
        let mut request = self.http.get(&url).query(&pairs);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("CMS request to {} failed", url))?
            .error_for_status()
            .context("CMS query returned an error status")?;

        let body: QueryResponse<T> = response
            .json()
            .await
            .context("Failed to decode CMS query response")?;
        Ok(body.result)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Source reader
// ═══════════════════════════════════════════════════════════════════════

/// The CMS source reader.
pub struct CmsSource {
    config: CmsConfig,
    client: CmsClient,
    opts: NormalizeOptions,
}

impl CmsSource {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            config: config.cms.clone(),
            client: CmsClient::new(&config.cms)?,
            opts: NormalizeOptions::from_config(config),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    /// Fetch and normalize all published posts. Unconfigured → empty.
    pub async fn fetch_posts(&self) -> Result<Vec<PostSummary>> {
        if !self.is_configured() {
            debug!("cms not configured, skipping post listing");
            return Ok(Vec::new());
        }

        let docs: Vec<Value> = self.client.query(&posts_query(), &[]).await?;
        let mut posts = Vec::with_capacity(docs.len());
        for doc in decode_each::<CmsPostDoc>(docs, "post") {
            match normalize_cms_post(&doc, &self.opts) {
                Some(post) => posts.push(post),
                None => warn!(title = ?doc.title, "skipping cms post without slug"),
            }
        }
        debug!(count = posts.len(), "fetched cms posts");
        Ok(posts)
    }

    /// Soft listing: failures are logged and yield an empty sequence.
    pub async fn list_cms_posts(&self) -> Vec<PostSummary> {
        self.fetch_posts().await.unwrap_or_else(|e| {
            warn!(error = %e, "cms post listing failed");
            Vec::new()
        })
    }

    pub async fn get_cms_post(&self, slug: &str) -> Result<PostDetail, ResolveError> {
        if !self.is_configured() {
            return Err(ResolveError::not_found(slug));
        }

        let raw: Value = match self
            .client
            .query(&post_by_slug_query(), &[("slug", slug)])
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                warn!(slug, error = %e, "cms post lookup failed");
                return Err(ResolveError::not_found(slug));
            }
        };
        if raw.is_null() {
            return Err(ResolveError::not_found(slug));
        }

        let doc: CmsPostDoc =
            serde_json::from_value(raw).map_err(|e| ResolveError::malformed(slug, e))?;
        cms_post_detail(doc, &self.opts)
            .ok_or_else(|| ResolveError::malformed(slug, "document has no slug"))
    }

    pub async fn fetch_authors(&self) -> Result<Vec<Author>> {
        if !self.is_configured() {
            return Ok(Vec::new());
        }

        let docs: Vec<Value> = self.client.query(&authors_query(), &[]).await?;
        Ok(decode_each::<CmsAuthorDoc>(docs, "author")
            .iter()
            .filter_map(|doc| normalize_cms_author(doc, &self.opts))
            .collect())
    }

    pub async fn list_cms_authors(&self) -> Vec<Author> {
        self.fetch_authors().await.unwrap_or_else(|e| {
            warn!(error = %e, "cms author listing failed");
            Vec::new()
        })
    }

    pub async fn get_cms_author(&self, slug: &str) -> Result<Author, ResolveError> {
        if !self.is_configured() {
            return Err(ResolveError::not_found(slug));
        }

        let raw: Value = match self
            .client
            .query(&author_by_slug_query(), &[("slug", slug)])
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                warn!(slug, error = %e, "cms author lookup failed");
                return Err(ResolveError::not_found(slug));
            }
        };
        if raw.is_null() {
            return Err(ResolveError::not_found(slug));
        }

        let doc: CmsAuthorDoc =
            serde_json::from_value(raw).map_err(|e| ResolveError::malformed(slug, e))?;
        normalize_cms_author(&doc, &self.opts)
            .ok_or_else(|| ResolveError::malformed(slug, "document has no slug"))
    }
}

#[async_trait]
impl PostSource for CmsSource {
    fn name(&self) -> &str {
        "cms"
    }

    fn provenance(&self) -> Source {
        Source::Cms
    }

    fn is_configured(&self) -> bool {
        CmsSource::is_configured(self)
    }

    fn location(&self) -> String {
        if self.is_configured() {
            self.config.query_url()
        } else {
            "(no project id)".to_string()
        }
    }

    async fn list_posts(&self) -> Result<Vec<PostSummary>> {
        self.fetch_posts().await
    }

    async fn get_post(&self, slug: &str) -> Result<PostDetail, ResolveError> {
        self.get_cms_post(slug).await
    }

    async fn list_authors(&self) -> Result<Vec<Author>> {
        self.fetch_authors().await
    }

    async fn get_author(&self, slug: &str) -> Result<Author, ResolveError> {
        self.get_cms_author(slug).await
    }
}
