//! Configuration parsing and validation.
//!
//! Blog Resolver is configured via a TOML file (default: `config/blog.toml`).
//! Every section is optional; a missing file yields the defaults, which read
//! Markdown posts from `content/blog` and leave the CMS unconfigured.
//!
//! # Example
//!
//! ```toml
//! [content]
//! posts_dir = "content/blog"
//! authors_dir = "content/authors"
//! include_globs = ["*.md", "*.mdx"]
//! words_per_minute = 200
//!
//! [cms]
//! project_id = "abc123"
//! dataset = "production"
//! api_version = "2024-01-01"
//! use_cdn = true
//!
//! [query]
//! related_limit = 3
//!
//! [server]
//! bind = "127.0.0.1:3000"
//! ```
//!
//! # Environment Variables
//!
//! - `BLOG_CMS_PROJECT_ID`: overrides `[cms].project_id`
//! - `BLOG_CMS_DATASET`: overrides `[cms].dataset`
//! - `BLOG_CMS_TOKEN`: bearer token for private datasets (never read from the file)

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub cms: CmsConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// How posts with the same slug from different sources are merged.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SlugCollision {
    /// The first registered source wins; later duplicates are dropped.
    #[default]
    FirstWins,
    /// Keep every record, duplicates included.
    KeepAll,
}

/// How post dates are compared when sorting newest-first.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    /// Parse dates and compare instants; unparseable dates sort last.
    #[default]
    Chronological,
    /// Compare the raw date strings.
    Lexicographic,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContentConfig {
    #[serde(default = "default_posts_dir")]
    pub posts_dir: PathBuf,
    #[serde(default)]
    pub authors_dir: Option<PathBuf>,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
    #[serde(default = "default_words_per_minute")]
    pub words_per_minute: u32,
    #[serde(default = "default_author")]
    pub default_author: String,
    #[serde(default)]
    pub slug_collision: SlugCollision,
    #[serde(default)]
    pub date_order: DateOrder,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            posts_dir: default_posts_dir(),
            authors_dir: None,
            include_globs: default_include_globs(),
            exclude_globs: Vec::new(),
            follow_symlinks: false,
            words_per_minute: default_words_per_minute(),
            default_author: default_author(),
            slug_collision: SlugCollision::default(),
            date_order: DateOrder::default(),
        }
    }
}

fn default_posts_dir() -> PathBuf {
    PathBuf::from("content/blog")
}
fn default_include_globs() -> Vec<String> {
    vec!["*.md".to_string(), "*.mdx".to_string()]
}
fn default_words_per_minute() -> u32 {
    200
}
fn default_author() -> String {
    "Editorial Team".to_string()
}

/// Connection settings for the headless CMS query API.
#[derive(Debug, Deserialize, Clone)]
pub struct CmsConfig {
    #[serde(default)]
    pub project_id: String,
    #[serde(default = "default_dataset")]
    pub dataset: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_use_cdn")]
    pub use_cdn: bool,
    /// Overrides the `https://{project_id}.api.sanity.io` base URL.
    #[serde(default)]
    pub api_host: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub cover_width: Option<u32>,
    #[serde(default)]
    pub cover_height: Option<u32>,
    #[serde(skip)]
    pub token: Option<String>,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            dataset: default_dataset(),
            api_version: default_api_version(),
            use_cdn: default_use_cdn(),
            api_host: None,
            timeout_secs: default_timeout_secs(),
            cover_width: None,
            cover_height: None,
            token: None,
        }
    }
}

fn default_dataset() -> String {
    "production".to_string()
}
fn default_api_version() -> String {
    "2024-01-01".to_string()
}
fn default_use_cdn() -> bool {
    true
}
fn default_timeout_secs() -> u64 {
    10
}

impl CmsConfig {
    /// True when a project identity is present. An unconfigured CMS is
    /// never contacted.
    pub fn is_configured(&self) -> bool {
        !self.project_id.trim().is_empty()
    }

    /// Base URL of the query API, without a trailing slash.
    pub fn api_base(&self) -> String {
        match &self.api_host {
            Some(host) => host.trim_end_matches('/').to_string(),
            None => {
                let api = if self.use_cdn { "apicdn" } else { "api" };
                format!("https://{}.{}.sanity.io", self.project_id.trim(), api)
            }
        }
    }

    /// Full URL of the query endpoint for the configured dataset.
    pub fn query_url(&self) -> String {
        format!(
            "{}/v{}/data/query/{}",
            self.api_base(),
            self.api_version.trim_start_matches('v'),
            self.dataset
        )
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct QueryConfig {
    #[serde(default = "default_related_limit")]
    pub related_limit: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            related_limit: default_related_limit(),
        }
    }
}

fn default_related_limit() -> usize {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

impl Config {
    /// Apply environment overrides using the given lookup function.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(project_id) = lookup("BLOG_CMS_PROJECT_ID") {
            self.cms.project_id = project_id;
        }
        if let Some(dataset) = lookup("BLOG_CMS_DATASET") {
            self.cms.dataset = dataset;
        }
        if let Some(token) = lookup("BLOG_CMS_TOKEN").filter(|t| !t.trim().is_empty()) {
            self.cms.token = Some(token);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.content.words_per_minute == 0 {
            bail!("content.words_per_minute must be > 0");
        }
        if self.query.related_limit < 1 {
            bail!("query.related_limit must be >= 1");
        }
        if self.cms.timeout_secs == 0 {
            bail!("cms.timeout_secs must be > 0");
        }
        if self.cms.is_configured() && self.cms.dataset.trim().is_empty() {
            bail!("cms.dataset must be set when cms.project_id is configured");
        }
        Ok(())
    }
}

/// Parse configuration from TOML text and validate it. Environment
/// overrides are not applied.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    config.validate()?;
    Ok(config)
}

/// Load the configuration file at `path`, falling back to defaults when it
/// does not exist, then apply environment overrides and validate.
pub fn load_config(path: &Path) -> Result<Config> {
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content).with_context(|| "Failed to parse config file")?
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        Config::default()
    };

    config.apply_env(|key| std::env::var(key).ok());
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.content.posts_dir, PathBuf::from("content/blog"));
        assert_eq!(config.content.words_per_minute, 200);
        assert_eq!(config.query.related_limit, 3);
        assert_eq!(config.content.slug_collision, SlugCollision::FirstWins);
        assert_eq!(config.content.date_order, DateOrder::Chronological);
        assert!(!config.cms.is_configured());
    }

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r#"
[content]
posts_dir = "posts"
authors_dir = "authors"
slug_collision = "keep_all"
date_order = "lexicographic"

[cms]
project_id = "abc123"
dataset = "staging"
use_cdn = false

[query]
related_limit = 5
"#,
        )
        .unwrap();
        assert_eq!(config.content.authors_dir, Some(PathBuf::from("authors")));
        assert_eq!(config.content.slug_collision, SlugCollision::KeepAll);
        assert_eq!(config.content.date_order, DateOrder::Lexicographic);
        assert!(config.cms.is_configured());
        assert_eq!(
            config.cms.query_url(),
            "https://abc123.api.sanity.io/v2024-01-01/data/query/staging"
        );
        assert_eq!(config.query.related_limit, 5);
    }

    #[test]
    fn test_api_host_override() {
        let mut cms = CmsConfig {
            project_id: "p".to_string(),
            api_host: Some("http://127.0.0.1:9999/".to_string()),
            ..CmsConfig::default()
        };
        cms.api_version = "v2023-05-03".to_string();
        assert_eq!(
            cms.query_url(),
            "http://127.0.0.1:9999/v2023-05-03/data/query/production"
        );
    }

    #[test]
    fn test_rejects_zero_words_per_minute() {
        let err = parse_config("[content]\nwords_per_minute = 0\n").unwrap_err();
        assert!(err.to_string().contains("words_per_minute"));
    }

    #[test]
    fn test_rejects_zero_related_limit() {
        assert!(parse_config("[query]\nrelated_limit = 0\n").is_err());
    }

    #[test]
    fn test_rejects_unknown_collision_policy() {
        assert!(parse_config("[content]\nslug_collision = \"merge\"\n").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("BLOG_CMS_PROJECT_ID", "fromenv"),
            ("BLOG_CMS_TOKEN", "secret"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));
        assert!(config.cms.is_configured());
        assert_eq!(config.cms.project_id, "fromenv");
        assert_eq!(config.cms.token.as_deref(), Some("secret"));
        assert_eq!(config.cms.dataset, "production");
    }

    #[test]
    fn test_blank_project_id_is_unconfigured() {
        let config = parse_config("[cms]\nproject_id = \"   \"\n").unwrap();
        assert!(!config.cms.is_configured());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = load_config(Path::new("/nonexistent/blog.toml")).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:3000");
    }
}
