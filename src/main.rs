//! # Blog Resolver CLI (`blogctl`)
//!
//! Prints the merged blog feed and its facets, or serves them as a JSON
//! API.
//!
//! ## Usage
//!
//! ```bash
//! blogctl --config ./config/blog.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `blogctl list` | All published posts, newest first |
//! | `blogctl get <slug>` | One post with its body |
//! | `blogctl category <name>` | Posts in a category |
//! | `blogctl tag <name>` | Posts with a tag |
//! | `blogctl author <name>` | Posts by an author display name |
//! | `blogctl search "<query>"` | Substring search over title, excerpt, tags |
//! | `blogctl related <slug>` | Related posts |
//! | `blogctl categories` / `tags` | Distinct facet values |
//! | `blogctl authors` | Author profiles |
//! | `blogctl sources` | Source configuration and health |
//! | `blogctl serve` | Start the JSON HTTP API |

use anyhow::Result;
use blog_resolver::aggregate::ContentService;
use blog_resolver::config::load_config;
use blog_resolver::models::{Author, PostBody, PostDetail, PostSummary};
use blog_resolver::{server, sources};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Blog Resolver CLI: unified blog content from Markdown files and a
/// headless CMS.
#[derive(Parser)]
#[command(
    name = "blogctl",
    about = "Blog Resolver: unified blog content from Markdown files and a headless CMS",
    version
)]
struct Cli {
    /// Path to configuration file (TOML). Missing file → defaults.
    #[arg(long, global = true, default_value = "./config/blog.toml")]
    config: PathBuf,

    /// Print JSON instead of a text table.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all published posts, newest first.
    List,

    /// Show one post with its body.
    Get {
        slug: String,
    },

    /// Posts in a category (case-insensitive).
    Category {
        name: String,
    },

    /// Posts with a tag (case-insensitive).
    Tag {
        name: String,
    },

    /// Posts by an author display name (case-insensitive).
    Author {
        name: String,
    },

    /// Search titles, excerpts, and tags.
    Search {
        query: String,
    },

    /// Related posts for a slug.
    Related {
        slug: String,

        /// Maximum number of results (defaults to `[query].related_limit`).
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Distinct categories.
    Categories,

    /// Distinct tags.
    Tags,

    /// Author profiles.
    Authors,

    /// Source configuration and health.
    Sources,

    /// Start the JSON HTTP API on `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blog_resolver=info,blogctl=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let cfg = load_config(&cli.config)?;
    let service = ContentService::from_config(&cfg)?;
    let json = cli.json;

    match cli.command {
        Commands::List => print_posts(&service.list_all_posts().await, json)?,
        Commands::Get { slug } => match service.get_post(&slug).await {
            Ok(detail) => print_detail(&detail, json)?,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        Commands::Category { name } => print_posts(&service.by_category(&name).await, json)?,
        Commands::Tag { name } => print_posts(&service.by_tag(&name).await, json)?,
        Commands::Author { name } => print_posts(&service.by_author(&name).await, json)?,
        Commands::Search { query } => print_posts(&service.search(&query).await, json)?,
        Commands::Related { slug, limit } => {
            let detail = match service.get_post(&slug).await {
                Ok(d) => d,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };
            print_posts(&service.related_to(&detail.summary, limit).await, json)?;
        }
        Commands::Categories => print_values(&service.all_categories().await, json)?,
        Commands::Tags => print_values(&service.all_tags().await, json)?,
        Commands::Authors => print_authors(&service.list_all_authors().await, json)?,
        Commands::Sources => {
            if json {
                print_json(&sources::get_sources(&service).await)?;
            } else {
                sources::list_sources(&service).await;
            }
        }
        Commands::Serve => server::run_server(&cfg, service).await?,
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_posts(posts: &[PostSummary], json: bool) -> Result<()> {
    if json {
        return print_json(posts);
    }
    if posts.is_empty() {
        println!("No posts.");
        return Ok(());
    }

    println!("{:<12} {:<9} {:>4}  {:<32} TITLE", "DATE", "SOURCE", "MIN", "SLUG");
    for p in posts {
        let date: String = p.date.chars().take(10).collect();
        println!(
            "{:<12} {:<9} {:>4}  {:<32} {}",
            date, p.source, p.read_time_minutes, p.slug, p.title
        );
    }
    Ok(())
}

fn print_detail(detail: &PostDetail, json: bool) -> Result<()> {
    if json {
        return print_json(detail);
    }

    let p = &detail.summary;
    println!("--- Post ---");
    println!("slug:       {}", p.slug);
    println!("title:      {}", p.title);
    println!("date:       {}", p.date);
    println!("author:     {}", p.author);
    println!("source:     {}", p.source);
    println!("read time:  {} min", p.read_time_minutes);
    println!("tags:       {}", p.tags.join(", "));
    println!("categories: {}", p.categories.join(", "));
    if let Some(ref cover) = p.cover_image {
        println!("cover:      {}", cover);
    }
    println!("excerpt:    {}", p.excerpt);
    println!();

    println!("--- Body ---");
    match &detail.body {
        PostBody::Html(html) => println!("{}", html),
        PostBody::Blocks(blocks) => println!("{}", serde_json::to_string_pretty(blocks)?),
    }
    Ok(())
}

fn print_values(values: &[String], json: bool) -> Result<()> {
    if json {
        return print_json(values);
    }
    for v in values {
        println!("{}", v);
    }
    Ok(())
}

fn print_authors(authors: &[Author], json: bool) -> Result<()> {
    if json {
        return print_json(authors);
    }
    if authors.is_empty() {
        println!("No authors.");
        return Ok(());
    }

    println!("{:<24} {:<9} NAME", "SLUG", "SOURCE");
    for a in authors {
        println!("{:<24} {:<9} {}", a.slug, a.source, a.name);
    }
    Ok(())
}
