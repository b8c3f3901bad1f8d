//! Shared test utilities.
//!
//! Document builders with sensible defaults for unit tests, plus fixture
//! setup and lookups for tests that scan `fixtures/content`.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let manifest = scan(tmp.path()).unwrap();
//! let post = find_post(&manifest, "rust/ownership");
//! assert_eq!(post.title, "Ownership Without Tears");
//! ```

use chrono::NaiveDate;
use std::path::Path;
use tempfile::TempDir;

use crate::scan::Manifest;
use crate::types::{Category, Post, Project};

// =========================================================================
// Document builders
// =========================================================================

/// A minimal post with the given slug.
pub fn post(slug: &str) -> Post {
    Post {
        slug: slug.to_string(),
        title: format!("Post {slug}"),
        description: format!("About {slug}"),
        date: None,
        tags: Vec::new(),
        image: None,
        image_caption: None,
        author: None,
        body: "Some *markdown*.".to_string(),
        source_path: format!("blog/{slug}.md"),
    }
}

/// A minimal project with the given slug and category, dated 2023-05-01.
pub fn project(slug: &str, category: Category) -> Project {
    Project {
        slug: slug.to_string(),
        title: format!("Project {slug}"),
        description: format!("About {slug}"),
        date: NaiveDate::from_ymd_opt(2023, 5, 1).unwrap(),
        category,
        tags: Vec::new(),
        url: None,
        icon: None,
        features: Vec::new(),
        screenshot: None,
        body: String::new(),
        source_path: format!("projects/{slug}.md"),
    }
}

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Write a file below `root`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

// =========================================================================
// Manifest lookups; panic with a clear message on miss
// =========================================================================

/// Find a post by slug. Panics if not found.
pub fn find_post<'a>(manifest: &'a Manifest, slug: &str) -> &'a Post {
    manifest
        .posts
        .iter()
        .find(|p| p.slug == slug)
        .unwrap_or_else(|| {
            let slugs: Vec<&str> = post_slugs(manifest);
            panic!("post '{slug}' not found. Available: {slugs:?}")
        })
}

/// Find a project by slug. Panics if not found.
pub fn find_project<'a>(manifest: &'a Manifest, slug: &str) -> &'a Project {
    manifest
        .projects
        .iter()
        .find(|p| p.slug == slug)
        .unwrap_or_else(|| {
            let slugs: Vec<&str> = project_slugs(manifest);
            panic!("project '{slug}' not found. Available: {slugs:?}")
        })
}

/// All post slugs in manifest order.
pub fn post_slugs(manifest: &Manifest) -> Vec<&str> {
    manifest.posts.iter().map(|p| p.slug.as_str()).collect()
}

/// All project slugs in manifest order.
pub fn project_slugs(manifest: &Manifest) -> Vec<&str> {
    manifest.projects.iter().map(|p| p.slug.as_str()).collect()
}
