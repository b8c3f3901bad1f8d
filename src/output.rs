//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Every entity (post,
//! project, page) leads with its positional index and title; filesystem paths
//! follow as indented `Source:` lines so the output reads as a content
//! inventory while still pointing back at the files.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Posts
//! 001 Ownership Without Tears (2024-03-02)
//!     Source: blog/rust/ownership.md
//!     Tags: rust, memory
//!     A gentle tour of moves, borrows, and lifetimes
//! 002 Untitled Thoughts (undated)
//!     Source: blog/drafts/untitled-thoughts.md
//!
//! Projects
//! 001 Trail Log [Android, 2024]
//!     Source: projects/trail-log.md
//!
//! Config
//!     config.toml
//!     assets/
//! ```
//!
//! ## Generate
//!
//! ```text
//! Home → index.html
//! Blog → blog/index.html
//!     001 Ownership Without Tears → blog/rust/ownership/index.html
//! Projects → projects/index.html
//! Not found → 404.html
//!
//! Assets
//!     style.3f9a0c1d2e.css
//!     theme.8b7e6d5c4a.js
//!
//! Generated 5 pages (1 post), copied 4 asset files
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O beyond checking which config files exist.

use crate::generate::{PageKind, SiteReport};
use crate::scan::Manifest;
use std::path::Path;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut)
    }
}

fn plural(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{} {}", n, singular)
    } else {
        format!("{} {}", n, plural)
    }
}

// ============================================================================
// Stage 1: Scan output
// ============================================================================

/// Format scan stage output showing discovered content.
pub fn format_scan_output(manifest: &Manifest, source_root: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Posts".to_string());
    for (i, post) in manifest.posts.iter().enumerate() {
        let date = post
            .date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "undated".to_string());
        lines.push(format!("{} {} ({})", format_index(i + 1), post.title, date));
        lines.push(format!("{}Source: {}", indent(1), post.source_path));
        if !post.tags.is_empty() {
            lines.push(format!("{}Tags: {}", indent(1), post.tags.join(", ")));
        }
        let description = truncate_desc(post.description.trim(), 60);
        if !description.is_empty() {
            lines.push(format!("{}{}", indent(1), description));
        }
    }

    lines.push(String::new());
    lines.push("Projects".to_string());
    for (i, project) in manifest.projects.iter().enumerate() {
        lines.push(format!(
            "{} {} [{}, {}]",
            format_index(i + 1),
            project.title,
            project.category,
            project.year()
        ));
        lines.push(format!("{}Source: {}", indent(1), project.source_path));
    }

    lines.push(String::new());
    lines.push("Config".to_string());
    if source_root.join("config.toml").exists() {
        lines.push(format!("{}config.toml", indent(1)));
    }
    if source_root.join(&manifest.config.assets_dir).is_dir() {
        lines.push(format!("{}{}/", indent(1), manifest.config.assets_dir));
    }

    lines
}

/// Print scan output to stdout.
pub fn print_scan_output(manifest: &Manifest, source_root: &Path) {
    for line in format_scan_output(manifest, source_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Stage 2: Generate output
// ============================================================================

/// Format generate stage output showing written pages.
///
/// Post pages are listed under the blog index with their positional index.
pub fn format_generate_output(report: &SiteReport) -> Vec<String> {
    let mut lines = Vec::new();
    let mut post_index = 0;

    for page in &report.pages {
        match page.kind {
            PageKind::Post => {
                post_index += 1;
                lines.push(format!(
                    "{}{} {} \u{2192} {}",
                    indent(1),
                    format_index(post_index),
                    page.title,
                    page.path
                ));
            }
            PageKind::Home => lines.push(format!("Home \u{2192} {}", page.path)),
            _ => lines.push(format!("{} \u{2192} {}", page.title, page.path)),
        }
    }

    if !report.assets.is_empty() {
        lines.push(String::new());
        lines.push("Assets".to_string());
        for asset in &report.assets {
            lines.push(format!("{}{}", indent(1), asset));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Generated {} ({}), copied {}",
        plural(report.pages.len(), "page", "pages"),
        plural(report.count(PageKind::Post), "post", "posts"),
        plural(report.copied, "asset file", "asset files"),
    ));

    lines
}

/// Print generate output to stdout.
pub fn print_generate_output(report: &SiteReport) {
    for line in format_generate_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Check output
// ============================================================================

/// One-line summary of validated content.
pub fn format_check_output(manifest: &Manifest) -> String {
    format!(
        "Content OK: {}, {}",
        plural(manifest.posts.len(), "post", "posts"),
        plural(manifest.projects.len(), "project", "projects"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::generate::PageEntry;
    use crate::test_helpers::*;
    use crate::types::{Category, Collection, Post};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn manifest() -> Manifest {
        Manifest {
            posts: Collection::new(vec![
                Post {
                    date: NaiveDate::from_ymd_opt(2024, 3, 2),
                    tags: vec!["rust".into(), "memory".into()],
                    ..post("rust/ownership")
                },
                post("drafts/later"),
            ])
            .unwrap(),
            projects: Collection::new(vec![project("trail-log", Category::Android)]).unwrap(),
            config: SiteConfig::default(),
        }
    }

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1234), "1234");
    }

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate_desc("short", 10), "short");
        assert_eq!(truncate_desc("héllo wörld", 5), "héllo...");
    }

    #[test]
    fn scan_output_lists_posts_with_context() {
        let tmp = TempDir::new().unwrap();
        let lines = format_scan_output(&manifest(), tmp.path());
        assert_eq!(lines[0], "Posts");
        assert_eq!(lines[1], "001 Post rust/ownership (2024-03-02)");
        assert_eq!(lines[2], "    Source: blog/rust/ownership.md");
        assert_eq!(lines[3], "    Tags: rust, memory");
        assert!(lines.contains(&"002 Post drafts/later (undated)".to_string()));
    }

    #[test]
    fn scan_output_lists_projects() {
        let tmp = TempDir::new().unwrap();
        let lines = format_scan_output(&manifest(), tmp.path());
        assert!(lines.contains(&"001 Project trail-log [Android, 2023]".to_string()));
        assert!(lines.contains(&"    Source: projects/trail-log.md".to_string()));
    }

    #[test]
    fn scan_output_config_section_reflects_files() {
        let tmp = TempDir::new().unwrap();
        let lines = format_scan_output(&manifest(), tmp.path());
        assert_eq!(lines.last().map(String::as_str), Some("Config"));

        write_file(tmp.path(), "config.toml", "");
        write_file(tmp.path(), "assets/favicon.svg", "");
        let lines = format_scan_output(&manifest(), tmp.path());
        assert!(lines.contains(&"    config.toml".to_string()));
        assert!(lines.contains(&"    assets/".to_string()));
    }

    #[test]
    fn generate_output_nests_posts() {
        let report = SiteReport {
            pages: vec![
                PageEntry {
                    kind: PageKind::Home,
                    title: "Ada".into(),
                    path: "index.html".into(),
                },
                PageEntry {
                    kind: PageKind::BlogIndex,
                    title: "Blog".into(),
                    path: "blog/index.html".into(),
                },
                PageEntry {
                    kind: PageKind::Post,
                    title: "Hello".into(),
                    path: "blog/hello/index.html".into(),
                },
            ],
            assets: vec!["style.abc.css".into()],
            copied: 1,
        };
        let lines = format_generate_output(&report);
        assert_eq!(lines[0], "Home \u{2192} index.html");
        assert_eq!(lines[1], "Blog \u{2192} blog/index.html");
        assert_eq!(lines[2], "    001 Hello \u{2192} blog/hello/index.html");
        assert!(lines.contains(&"    style.abc.css".to_string()));
        assert_eq!(
            lines.last().unwrap(),
            "Generated 3 pages (1 post), copied 1 asset file"
        );
    }

    #[test]
    fn check_output_counts() {
        assert_eq!(format_check_output(&manifest()), "Content OK: 2 posts, 1 project");
    }
}
