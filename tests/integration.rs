use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn blogctl_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_blogctl"))
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let blog_dir = root.join("content").join("blog");
    fs::create_dir_all(&blog_dir).unwrap();
    let authors_dir = root.join("content").join("authors");
    fs::create_dir_all(&authors_dir).unwrap();

    fs::write(
        blog_dir.join("ai-support-desk.md"),
        "---\ntitle: Building an AI support desk\ndate: 2024-05-02\nauthor: Ada Lovelace\ntags: [ai, support]\ncategories: [Engineering]\n---\nWe replaced our ticket triage with a model.\n\nHere is how.",
    )
    .unwrap();
    fs::write(
        blog_dir.join("evaluating-llms.md"),
        "---\ntitle: Evaluating LLMs\ndate: 2024-03-20\nauthor: Grace Hopper\ntags: [ai]\ncategories: [Engineering, Research]\n---\nBenchmarks lie.",
    )
    .unwrap();
    fs::write(
        blog_dir.join("pricing-consulting.md"),
        "---\ntitle: Pricing consulting work\ndate: 2023-12-01\nauthor: Ada Lovelace\ntags: [business]\ncategories: [Strategy]\n---\nValue, not hours.",
    )
    .unwrap();
    fs::write(
        blog_dir.join("unreleased.md"),
        "---\ntitle: Coming soon\ndate: 2025-01-01\npublished: false\n---\nSecret.",
    )
    .unwrap();
    fs::write(
        authors_dir.join("ada-lovelace.md"),
        "---\nname: Ada Lovelace\ngithub: https://github.com/ada\n---\nFirst programmer.",
    )
    .unwrap();

    let config_content = format!(
        r#"[content]
posts_dir = "{root}/content/blog"
authors_dir = "{root}/content/authors"

[cms]
project_id = ""

[query]
related_limit = 3

[server]
bind = "127.0.0.1:7391"
"#,
        root = root.display()
    );

    let config_path = config_dir.join("blog.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_blogctl(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = blogctl_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .current_dir(config_path.parent().unwrap())
        .env_remove("BLOG_CMS_PROJECT_ID")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run blogctl binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[test]
fn test_list_newest_first_without_unpublished() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_blogctl(&config_path, &["list"]);
    assert!(success, "list failed: stdout={}, stderr={}", stdout, stderr);
    assert!(!stdout.contains("unreleased"));

    let first = stdout.find("ai-support-desk").unwrap();
    let second = stdout.find("evaluating-llms").unwrap();
    let third = stdout.find("pricing-consulting").unwrap();
    assert!(first < second && second < third);
}

#[test]
fn test_list_json() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_blogctl(&config_path, &["--json", "list"]);
    assert!(success);
    let posts: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let posts = posts.as_array().unwrap();
    assert_eq!(posts.len(), 3);
    assert!(posts.iter().all(|p| p["source"] == "markdown"));
    assert!(posts.iter().all(|p| p["published"] == true));
}

#[test]
fn test_get_post() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_blogctl(&config_path, &["get", "ai-support-desk"]);
    assert!(success, "get failed: {}", stderr);
    assert!(stdout.contains("slug:       ai-support-desk"));
    assert!(stdout.contains("<p>We replaced our ticket triage with a model.</p>"));
}

#[test]
fn test_get_unknown_slug_fails() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_blogctl(&config_path, &["get", "no-such-post"]);
    assert!(!success);
    assert!(stderr.contains("not found"));
}

#[test]
fn test_get_unpublished_is_not_found() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success) = run_blogctl(&config_path, &["get", "unreleased"]);
    assert!(!success);
}

#[test]
fn test_filters() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, _) = run_blogctl(&config_path, &["tag", "AI"]);
    assert!(stdout.contains("ai-support-desk"));
    assert!(stdout.contains("evaluating-llms"));
    assert!(!stdout.contains("pricing-consulting"));

    let (stdout, _, _) = run_blogctl(&config_path, &["category", "strategy"]);
    assert!(stdout.contains("pricing-consulting"));
    assert!(!stdout.contains("ai-support-desk"));

    let (stdout, _, _) = run_blogctl(&config_path, &["author", "ada lovelace"]);
    assert!(stdout.contains("ai-support-desk"));
    assert!(stdout.contains("pricing-consulting"));
    assert!(!stdout.contains("evaluating-llms"));

    let (stdout, _, _) = run_blogctl(&config_path, &["search", "zzz-nothing"]);
    assert!(stdout.contains("No posts."));
}

#[test]
fn test_facets() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_blogctl(&config_path, &["categories"]);
    assert!(success);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["Engineering", "Research", "Strategy"]);

    let (stdout, _, _) = run_blogctl(&config_path, &["tags"]);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["ai", "business", "support"]);
}

#[test]
fn test_related() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) =
        run_blogctl(&config_path, &["--json", "related", "ai-support-desk"]);
    assert!(success, "related failed: {}", stderr);
    let related: Vec<serde_json::Value> = serde_json::from_str(&stdout).unwrap();
    assert_eq!(related.len(), 1);
    assert_eq!(related[0]["slug"], "evaluating-llms");
}

#[test]
fn test_authors() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_blogctl(&config_path, &["authors"]);
    assert!(success);
    assert!(stdout.contains("ada-lovelace"));
}

#[test]
fn test_sources_report_unconfigured_cms() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_blogctl(&config_path, &["sources"]);
    assert!(success);
    assert!(stdout.contains("markdown"));
    assert!(stdout.contains("NOT CONFIGURED"));
}

#[test]
fn test_missing_config_uses_defaults() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("absent.toml");

    let (stdout, stderr, success) = run_blogctl(&config_path, &["list"]);
    assert!(success, "list failed: {}", stderr);
    assert!(stdout.contains("No posts."));
}
