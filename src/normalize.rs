//! Normalization of source-native records into the canonical model.
//!
//! One mapping per source: Markdown front-matter + body, and CMS query
//! documents with joined references. Both produce [`PostSummary`] /
//! [`Author`] records tagged with their [`Source`].

use serde_json::Value;

use crate::config::Config;
use crate::connector_cms::{CmsAuthorDoc, CmsAuthorRef, CmsPostDoc, CmsReference, CmsText};
use crate::frontmatter::{AuthorFrontMatter, PostFrontMatter};
use crate::image::{ImageResolver, ImageSize};
use crate::markdown;
use crate::models::{Author, PostBody, PostDetail, PostSummary, SocialLinks, Source};

/// Maximum length of a derived excerpt, in characters.
pub const EXCERPT_MAX_CHARS: usize = 160;

/// Settings shared by every normalization function.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    pub words_per_minute: u32,
    pub default_author: String,
    pub images: ImageResolver,
    pub cover_size: ImageSize,
}

impl NormalizeOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            words_per_minute: config.content.words_per_minute,
            default_author: config.content.default_author.clone(),
            images: ImageResolver::new(&config.cms),
            cover_size: ImageSize::new(config.cms.cover_width, config.cms.cover_height),
        }
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// `max(1, ceil(words / words_per_minute))`.
pub fn read_time_minutes(words: usize, words_per_minute: u32) -> u32 {
    let wpm = words_per_minute.max(1) as usize;
    words.div_ceil(wpm).max(1) as u32
}

/// Trim values, drop blanks, and remove duplicates keeping the first one.
pub fn clean_list<I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut out: Vec<String> = Vec::new();
    for value in values {
        let value = value.trim();
        if value.is_empty() || out.iter().any(|v| v == value) {
            continue;
        }
        out.push(value.to_string());
    }
    out
}

/// First paragraph of the Markdown body as plain text, shortened to
/// [`EXCERPT_MAX_CHARS`].
pub fn derive_excerpt(body: &str) -> String {
    markdown::truncate_words(&markdown::first_paragraph_text(body), EXCERPT_MAX_CHARS)
}

/// `"shipping-ai-support"` → `"Shipping ai support"`.
fn title_from_slug(slug: &str) -> String {
    let spaced = slug.replace(['-', '_'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ═══════════════════════════════════════════════════════════════════════
// Markdown
// ═══════════════════════════════════════════════════════════════════════

pub fn normalize_markdown_post(
    slug: &str,
    front: PostFrontMatter,
    body: &str,
    opts: &NormalizeOptions,
) -> PostSummary {
    let published = front.is_published();
    let excerpt = non_blank(front.excerpt).unwrap_or_else(|| derive_excerpt(body));
    let cover_image = front
        .cover_image
        .as_deref()
        .and_then(|c| opts.images.resolve_str(c, ImageSize::default()));

    PostSummary {
        slug: slug.to_string(),
        title: non_blank(front.title).unwrap_or_else(|| title_from_slug(slug)),
        date: front.date.map(|d| d.trim().to_string()).unwrap_or_default(),
        author: non_blank(front.author).unwrap_or_else(|| opts.default_author.clone()),
        excerpt,
        tags: clean_list(front.tags.into_vec()),
        categories: clean_list(front.categories.into_vec()),
        cover_image,
        read_time_minutes: read_time_minutes(word_count(body), opts.words_per_minute),
        published,
        source: Source::Markdown,
    }
}

/// Summary plus the body rendered to HTML.
pub fn markdown_post_detail(
    slug: &str,
    front: PostFrontMatter,
    body: &str,
    opts: &NormalizeOptions,
) -> PostDetail {
    PostDetail {
        summary: normalize_markdown_post(slug, front, body, opts),
        body: PostBody::Html(markdown::render_html(body)),
    }
}

/// When the front-matter has no `bio`, the document body is the bio.
pub fn normalize_markdown_author(
    slug: &str,
    front: AuthorFrontMatter,
    body: &str,
    opts: &NormalizeOptions,
) -> Author {
    let bio = non_blank(front.bio).unwrap_or_else(|| body.trim().to_string());
    Author {
        slug: slug.to_string(),
        name: non_blank(front.name).unwrap_or_else(|| title_from_slug(slug)),
        bio,
        avatar_url: front
            .avatar
            .as_deref()
            .and_then(|a| opts.images.resolve_str(a, ImageSize::default())),
        social: SocialLinks {
            email: non_blank(front.email),
            linkedin: non_blank(front.linkedin),
            github: non_blank(front.github),
            website: non_blank(front.website),
        },
        source: Source::Markdown,
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CMS
// ═══════════════════════════════════════════════════════════════════════

/// Plain text of rich-text blocks. Spans of one block are concatenated as
/// written (a word may be split across marks); blocks are separated by a
/// space. Non-block entries (images, embeds) contribute nothing.
pub fn blocks_text(blocks: &[Value]) -> String {
    let mut paragraphs: Vec<String> = Vec::new();
    for block in blocks {
        if block.get("_type").and_then(Value::as_str) != Some("block") {
            continue;
        }
        let Some(children) = block.get("children").and_then(Value::as_array) else {
            continue;
        };
        let text: String = children
            .iter()
            .filter_map(|child| child.get("text").and_then(Value::as_str))
            .collect();
        let text = text.trim();
        if !text.is_empty() {
            paragraphs.push(text.to_string());
        }
    }
    paragraphs.join(" ")
}

fn reference_names(refs: Option<&Vec<CmsReference>>) -> Vec<String> {
    clean_list(
        refs.into_iter()
            .flatten()
            .filter_map(CmsReference::display_name),
    )
}

fn cms_read_time(doc: &CmsPostDoc, words_per_minute: u32) -> u32 {
    match &doc.content {
        Some(blocks) if !blocks.is_empty() => {
            read_time_minutes(word_count(&blocks_text(blocks)), words_per_minute)
        }
        _ => doc
            .read_time
            .filter(|t| t.is_finite() && *t > 0.0)
            .map(|t| t.ceil() as u32)
            .unwrap_or(1)
            .max(1),
    }
}

/// Returns `None` for documents without a usable slug.
pub fn normalize_cms_post(doc: &CmsPostDoc, opts: &NormalizeOptions) -> Option<PostSummary> {
    let slug = doc.slug.as_ref().and_then(|s| s.current())?;

    let author = match &doc.author {
        Some(CmsAuthorRef::Name(name)) => non_blank(Some(name.clone())),
        Some(CmsAuthorRef::Doc(author)) => non_blank(author.name.clone()),
        None => None,
    }
    .unwrap_or_else(|| opts.default_author.clone());

    let excerpt = non_blank(doc.excerpt.clone()).unwrap_or_else(|| {
        doc.content
            .as_deref()
            .map(|blocks| markdown::truncate_words(&blocks_text(blocks), EXCERPT_MAX_CHARS))
            .unwrap_or_default()
    });

    Some(PostSummary {
        title: non_blank(doc.title.clone()).unwrap_or_else(|| title_from_slug(&slug)),
        date: doc.date.clone().map(|d| d.trim().to_string()).unwrap_or_default(),
        author,
        excerpt,
        tags: reference_names(doc.tags.as_ref()),
        categories: reference_names(doc.categories.as_ref()),
        cover_image: doc
            .cover_image
            .as_ref()
            .and_then(|image| opts.images.resolve(image, opts.cover_size)),
        read_time_minutes: cms_read_time(doc, opts.words_per_minute),
        published: doc.published.unwrap_or(true),
        source: Source::Cms,
        slug,
    })
}

pub fn cms_post_detail(doc: CmsPostDoc, opts: &NormalizeOptions) -> Option<PostDetail> {
    let summary = normalize_cms_post(&doc, opts)?;
    Some(PostDetail {
        summary,
        body: PostBody::Blocks(doc.content.unwrap_or_default()),
    })
}

pub fn normalize_cms_author(doc: &CmsAuthorDoc, opts: &NormalizeOptions) -> Option<Author> {
    let slug = doc.slug.as_ref().and_then(|s| s.current())?;
    let bio = match &doc.bio {
        Some(CmsText::Plain(text)) => text.trim().to_string(),
        Some(CmsText::Blocks(blocks)) => blocks_text(blocks),
        None => String::new(),
    };

    Some(Author {
        name: non_blank(doc.name.clone()).unwrap_or_else(|| title_from_slug(&slug)),
        bio,
        avatar_url: doc
            .image
            .as_ref()
            .and_then(|image| opts.images.resolve(image, ImageSize::default())),
        social: SocialLinks {
            email: non_blank(doc.email.clone()),
            linkedin: non_blank(doc.linkedin.clone()),
            github: non_blank(doc.github.clone()),
            website: non_blank(doc.website.clone()),
        },
        source: Source::Cms,
        slug,
    })
}
