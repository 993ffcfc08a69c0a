//! End-to-end tests of the aggregation pipeline over in-memory and
//! on-disk sources.

use anyhow::{bail, Result};
use async_trait::async_trait;
use blog_resolver::aggregate::{parse_post_date, ContentService};
use blog_resolver::config::{Config, ContentConfig, DateOrder};
use blog_resolver::connector_cms::CmsSource;
use blog_resolver::connector_md::{get_markdown_post, list_markdown_posts, MarkdownSource};
use blog_resolver::error::ResolveError;
use blog_resolver::models::{Author, PostBody, PostDetail, PostSummary, SocialLinks, Source};
use blog_resolver::normalize::{word_count, NormalizeOptions};
use blog_resolver::related::scored_related;
use blog_resolver::traits::PostSource;
use std::fs;
use tempfile::TempDir;

// ─── In-memory sources ──────────────────────────────────────────────

struct InMemorySource {
    provenance: Source,
    posts: Vec<PostSummary>,
    authors: Vec<Author>,
}

impl InMemorySource {
    fn new(provenance: Source, posts: Vec<PostSummary>) -> Self {
        Self {
            provenance,
            posts,
            authors: Vec::new(),
        }
    }
}

#[async_trait]
impl PostSource for InMemorySource {
    fn name(&self) -> &str {
        "inmemory"
    }

    fn provenance(&self) -> Source {
        self.provenance
    }

    async fn list_posts(&self) -> Result<Vec<PostSummary>> {
        Ok(self.posts.clone())
    }

    async fn get_post(&self, slug: &str) -> Result<PostDetail, ResolveError> {
        self.posts
            .iter()
            .find(|p| p.slug == slug)
            .map(|p| PostDetail {
                summary: p.clone(),
                body: PostBody::Blocks(vec![]),
            })
            .ok_or_else(|| ResolveError::not_found(slug))
    }

    async fn list_authors(&self) -> Result<Vec<Author>> {
        Ok(self.authors.clone())
    }

    async fn get_author(&self, slug: &str) -> Result<Author, ResolveError> {
        self.authors
            .iter()
            .find(|a| a.slug == slug)
            .cloned()
            .ok_or_else(|| ResolveError::not_found(slug))
    }
}

/// A source whose backing store is unreachable.
struct FailingSource;

#[async_trait]
impl PostSource for FailingSource {
    fn name(&self) -> &str {
        "failing"
    }

    fn provenance(&self) -> Source {
        Source::Markdown
    }

    async fn list_posts(&self) -> Result<Vec<PostSummary>> {
        bail!("read error: permission denied")
    }

    async fn get_post(&self, slug: &str) -> Result<PostDetail, ResolveError> {
        Err(ResolveError::malformed(slug, "read error"))
    }

    async fn list_authors(&self) -> Result<Vec<Author>> {
        bail!("read error: permission denied")
    }
}

fn post(slug: &str, date: &str, tags: &[&str], categories: &[&str], source: Source) -> PostSummary {
    PostSummary {
        slug: slug.to_string(),
        title: format!("Post {}", slug),
        date: date.to_string(),
        author: "Ada".to_string(),
        excerpt: format!("Excerpt for {}", slug),
        tags: tags.iter().map(|s| s.to_string()).collect(),
        categories: categories.iter().map(|s| s.to_string()).collect(),
        cover_image: None,
        read_time_minutes: 1,
        published: true,
        source,
    }
}

fn cms_posts() -> Vec<PostSummary> {
    vec![
        post("cms-one", "2024-04-01", &["ai"], &["Engineering"], Source::Cms),
        post("cms-two", "2023-11-15", &["ops"], &["Operations"], Source::Cms),
    ]
}

fn slugs(posts: &[PostSummary]) -> Vec<&str> {
    posts.iter().map(|p| p.slug.as_str()).collect()
}

// ─── Scenarios ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_failing_markdown_still_yields_cms_posts() {
    let service = ContentService::with_sources(
        &Config::default(),
        vec![
            Box::new(FailingSource),
            Box::new(InMemorySource::new(Source::Cms, cms_posts())),
        ],
    );

    let posts = service.list_all_posts().await;
    assert_eq!(slugs(&posts), vec!["cms-one", "cms-two"]);
    assert!(posts.iter().all(|p| p.source == Source::Cms));
    assert_eq!(service.all_categories().await, vec!["Engineering", "Operations"]);
    assert!(service.list_all_authors().await.is_empty());
}

#[tokio::test]
async fn test_malformed_reported_when_no_source_has_post() {
    let service = ContentService::with_sources(
        &Config::default(),
        vec![
            Box::new(FailingSource),
            Box::new(InMemorySource::new(Source::Cms, cms_posts())),
        ],
    );

    assert!(matches!(
        service.get_post("missing").await,
        Err(ResolveError::Malformed { .. })
    ));
    assert_eq!(service.get_post("cms-two").await.unwrap().slug(), "cms-two");
}

#[tokio::test]
async fn test_unconfigured_cms_yields_markdown_only() {
    let tmp = TempDir::new().unwrap();
    let blog = tmp.path().join("blog");
    fs::create_dir_all(&blog).unwrap();
    fs::write(
        blog.join("local.md"),
        "---\ntitle: Local\ndate: 2024-02-01\ncategories: [Guides]\n---\nBody text.",
    )
    .unwrap();

    let config = Config {
        content: ContentConfig {
            posts_dir: blog,
            ..ContentConfig::default()
        },
        ..Config::default()
    };
    assert!(!config.cms.is_configured());

    let service = ContentService::from_config(&config).unwrap();
    let posts = service.list_all_posts().await;
    assert_eq!(slugs(&posts), vec!["local"]);
    assert_eq!(posts[0].source, Source::Markdown);
    assert_eq!(service.all_categories().await, vec!["Guides"]);

    let cms = CmsSource::new(&config).unwrap();
    assert!(cms.list_cms_posts().await.is_empty());
}

#[tokio::test]
async fn test_related_scenario_through_service() {
    let service = ContentService::with_sources(
        &Config::default(),
        vec![Box::new(InMemorySource::new(
            Source::Cms,
            vec![
                post("a", "2024-01-02", &["ai", "support"], &["eng"], Source::Cms),
                post("b", "2024-01-01", &["ai"], &["eng"], Source::Cms),
            ],
        ))],
    );

    let all = service.list_all_posts().await;
    let a = all.iter().find(|p| p.slug == "a").unwrap().clone();

    let related = service.related_to(&a, Some(3)).await;
    assert_eq!(slugs(&related), vec!["b"]);

    let scored = scored_related(&a, &all, 3);
    assert_eq!(scored[0].1, 3);
}

#[tokio::test]
async fn test_unpublished_never_exposed() {
    let mut hidden = post("hidden", "2025-01-01", &["ai"], &["eng"], Source::Cms);
    hidden.published = false;
    let service = ContentService::with_sources(
        &Config::default(),
        vec![Box::new(InMemorySource::new(
            Source::Cms,
            vec![hidden, post("shown", "2024-01-01", &["ai"], &["eng"], Source::Cms)],
        ))],
    );

    let posts = service.list_all_posts().await;
    assert!(posts.iter().all(|p| p.published));
    assert_eq!(slugs(&posts), vec!["shown"]);
    assert!(service.get_post("hidden").await.unwrap_err().is_not_found());
    assert!(service.by_tag("AI").await.iter().all(|p| p.slug != "hidden"));
}

#[tokio::test]
async fn test_unpublished_markdown_does_not_shadow_cms_post() {
    let mut draft = post("dup", "2024-05-01", &["ai"], &["eng"], Source::Markdown);
    draft.published = false;
    let service = ContentService::with_sources(
        &Config::default(),
        vec![
            Box::new(InMemorySource::new(Source::Markdown, vec![draft])),
            Box::new(InMemorySource::new(
                Source::Cms,
                vec![post("dup", "2024-04-01", &["ai"], &["eng"], Source::Cms)],
            )),
        ],
    );

    let listed = service.list_all_posts().await;
    assert_eq!(slugs(&listed), vec!["dup"]);
    assert_eq!(listed[0].source, Source::Cms);

    let detail = service.get_post("dup").await.unwrap();
    assert_eq!(detail.summary.source, Source::Cms);
    assert!(detail.summary.published);
}

#[tokio::test]
async fn test_properties_over_mixed_feed() {
    let markdown = vec![
        post("md-1", "2024-03-10", &["AI", "Rust"], &["Engineering"], Source::Markdown),
        post("md-2", "not a date", &["writing"], &["Culture"], Source::Markdown),
        post("md-3", "2022-07-01", &["ai"], &["engineering"], Source::Markdown),
    ];
    let service = ContentService::with_sources(
        &Config::default(),
        vec![
            Box::new(InMemorySource::new(Source::Markdown, markdown)),
            Box::new(InMemorySource::new(Source::Cms, cms_posts())),
        ],
    );

    let all = service.list_all_posts().await;
    assert_eq!(all.len(), 5);

    // Newest first, unparseable dates last.
    for pair in all.windows(2) {
        match (parse_post_date(&pair[0].date), parse_post_date(&pair[1].date)) {
            (Some(a), Some(b)) => assert!(a >= b),
            (None, Some(_)) => panic!("unparseable date sorted before a valid one"),
            _ => {}
        }
    }
    assert_eq!(all.last().unwrap().slug, "md-2");

    // byTag is exactly the case-insensitive subset.
    let tagged = service.by_tag("ai").await;
    let expected: Vec<&PostSummary> = all
        .iter()
        .filter(|p| p.tags.iter().any(|t| t.eq_ignore_ascii_case("ai")))
        .collect();
    assert_eq!(tagged.len(), expected.len());
    assert!(tagged.iter().zip(expected).all(|(a, b)| a.slug == b.slug));

    // Facets are distinct and sorted.
    for values in [service.all_tags().await, service.all_categories().await] {
        let mut sorted = values.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(values, sorted);
    }

    // Related never includes the post itself and respects the limit.
    for p in &all {
        let related = service.related_to(p, Some(2)).await;
        assert!(related.len() <= 2);
        assert!(related.iter().all(|r| r.slug != p.slug));
    }
}

#[tokio::test]
async fn test_lexicographic_date_order() {
    let mut config = Config::default();
    config.content.date_order = DateOrder::Lexicographic;
    let service = ContentService::with_sources(
        &config,
        vec![Box::new(InMemorySource::new(
            Source::Cms,
            vec![
                post("x", "2024-01-01", &[], &[], Source::Cms),
                post("y", "zzz", &[], &[], Source::Cms),
            ],
        ))],
    );
    assert_eq!(slugs(&service.list_all_posts().await), vec!["y", "x"]);
}

#[tokio::test]
async fn test_posts_by_author_slug() {
    let mut source = InMemorySource::new(Source::Cms, cms_posts());
    source.authors = vec![Author {
        slug: "ada".to_string(),
        name: "ADA".to_string(),
        bio: String::new(),
        avatar_url: None,
        social: SocialLinks::default(),
        source: Source::Cms,
    }];
    let service = ContentService::with_sources(&Config::default(), vec![Box::new(source)]);

    let posts = service.posts_by_author_slug("ada").await.unwrap();
    assert_eq!(posts.len(), 2);
    assert!(service.posts_by_author_slug("nobody").await.unwrap_err().is_not_found());
}

// ─── Markdown on disk ───────────────────────────────────────────────

#[tokio::test]
async fn test_markdown_round_trip_and_read_time() {
    let tmp = TempDir::new().unwrap();
    let blog = tmp.path().join("blog");
    fs::create_dir_all(&blog).unwrap();

    let long_body = "lorem ".repeat(401);
    fs::write(
        blog.join("long-read.md"),
        format!("---\ntitle: Long\ndate: 2024-05-05\n---\n{}", long_body),
    )
    .unwrap();
    fs::write(blog.join("short.mdx"), "---\ntitle: Short\n---\nTiny.").unwrap();
    fs::write(blog.join("plain.md"), "No front matter at all.").unwrap();

    let content = ContentConfig {
        posts_dir: blog.clone(),
        ..ContentConfig::default()
    };
    let opts = NormalizeOptions::default();

    let posts = list_markdown_posts(&content, &opts);
    assert_eq!(posts.len(), 3);
    for p in &posts {
        let detail = get_markdown_post(&content, &opts, &p.slug).unwrap();
        assert_eq!(detail.summary.slug, p.slug);
        assert!(p.read_time_minutes >= 1);
    }

    let long = posts.iter().find(|p| p.slug == "long-read").unwrap();
    assert_eq!(word_count(&long_body), 401);
    assert_eq!(long.read_time_minutes, 3);

    let config = Config {
        content,
        ..Config::default()
    };
    let source = MarkdownSource::new(&config);
    let plain = source.get_post("plain").await.unwrap();
    assert_eq!(plain.summary.title, "Plain");
    assert!(matches!(plain.body, PostBody::Html(ref html) if html.contains("No front matter")));
}
