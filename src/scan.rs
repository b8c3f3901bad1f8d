//! Content scanning and manifest generation.
//!
//! Stage 1 of the build pipeline. Walks the content directory, parses each
//! document's front matter, and produces a [`Manifest`] of typed, slug-unique
//! collections that the generate stage consumes without touching the content
//! directory again.
//!
//! ## Directory Structure
//!
//! ```text
//! content/
//! ├── config.toml                  # Site configuration (optional)
//! ├── assets/                      # Copied verbatim to the output root
//! ├── blog/
//! │   ├── hello-world.md           # slug: hello-world
//! │   └── rust/
//! │       ├── index.md             # slug: rust
//! │       └── ownership.md         # slug: rust/ownership
//! └── projects/
//!     ├── pixel-tracker.md
//!     └── trail-log.md
//! ```
//!
//! ## Document Format
//!
//! Each document opens with TOML front matter between `+++` lines, followed
//! by the markdown body:
//!
//! ```text
//! +++
//! title = "Ownership Without Tears"
//! description = "A gentle tour of moves and borrows"
//! date = 2024-03-02
//! tags = ["rust"]
//! image = "https://images.unsplash.com/photo-1"
//! image_caption = "Photo by someone"
//!
//! [author]
//! name = "Ada"
//! twitter = "@ada"
//! +++
//!
//! Body in *markdown*.
//! ```
//!
//! Projects additionally require `date` and `category` (`Android`, `Web`, or
//! anything else for `Other`) and accept `url`, `icon`, `features`, and
//! `screenshot`.
//!
//! ## Validation
//!
//! The scanner rejects:
//! - Documents without front matter, or with unknown front matter keys
//! - Two documents with the same slug in one collection
//! - File or directory names outside `[A-Za-z0-9._~-]`, which would need
//!   encoding in every link to the document
//! - Absolute image URLs whose host is not listed in `images.domains`

use crate::config::{self, SiteConfig};
use crate::naming::{is_url_safe_slug, slug_from_path};
use crate::types::{Author, Category, Collection, CollectionError, Post, Project};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Directory under the content root holding posts.
pub const BLOG_DIR: &str = "blog";
/// Directory under the content root holding projects.
pub const PROJECTS_DIR: &str = "projects";

const FRONT_MATTER_DELIMITER: &str = "+++";

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("{0}")]
    Collection(#[from] CollectionError),
    #[error("Missing '+++' front matter in {0}")]
    MissingFrontMatter(PathBuf),
    #[error("Invalid front matter in {path}: {source}")]
    FrontMatter {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid date '{value}' in {path}: expected YYYY-MM-DD")]
    InvalidDate { path: PathBuf, value: String },
    #[error("Cannot derive a slug from {0}")]
    EmptySlug(PathBuf),
    #[error("Slug '{slug}' from {path} is not URL-safe: use only letters, digits, '.', '_', '~' and '-'")]
    InvalidSlug { path: PathBuf, slug: String },
    #[error("Duplicate slug '{slug}': {first} and {second}")]
    DuplicateSlug {
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },
    #[error("Image host not allowed in {path}: {url} (add it to images.domains)")]
    DisallowedImage { path: PathBuf, url: String },
}

/// Manifest output from the scan stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub posts: Collection<Post>,
    pub projects: Collection<Project>,
    pub config: SiteConfig,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PostFrontMatter {
    title: String,
    description: String,
    #[serde(default)]
    date: Option<toml::value::Datetime>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    image_caption: Option<String>,
    #[serde(default)]
    author: Option<Author>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProjectFrontMatter {
    title: String,
    description: String,
    date: toml::value::Datetime,
    category: Category,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    features: Vec<String>,
    #[serde(default)]
    screenshot: Option<String>,
}

/// A markdown file found under a collection directory.
struct SourceFile {
    slug: String,
    /// Path relative to the content root, `/`-joined.
    source_path: String,
    path: PathBuf,
}

pub fn scan(root: &Path) -> Result<Manifest, ScanError> {
    let config = config::load_config(root)?;

    let posts = collect_sources(root, BLOG_DIR)?
        .into_iter()
        .map(|source| parse_post(&source, &config))
        .collect::<Result<Vec<_>, _>>()?;
    let posts = Collection::new(sort_posts(posts))?;

    let projects = collect_sources(root, PROJECTS_DIR)?
        .into_iter()
        .map(|source| parse_project(&source, &config))
        .collect::<Result<Vec<_>, _>>()?;
    let projects = Collection::new(sort_projects(projects))?;

    debug!(
        posts = posts.len(),
        projects = projects.len(),
        "scanned content"
    );

    Ok(Manifest {
        posts,
        projects,
        config,
    })
}

/// Find every markdown file below `root/section`, in path order.
///
/// A missing section directory yields no documents.
fn collect_sources(root: &Path, section: &str) -> Result<Vec<SourceFile>, ScanError> {
    let dir = root.join(section);
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "content section missing, skipping");
        return Ok(Vec::new());
    }

    let mut sources = Vec::new();
    let mut seen: HashMap<String, PathBuf> = HashMap::new();

    let walker = WalkDir::new(&dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));

    for entry in walker {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || !is_markdown(path) {
            continue;
        }

        let relative = path.strip_prefix(&dir).unwrap_or(path);
        let slug =
            slug_from_path(relative).ok_or_else(|| ScanError::EmptySlug(path.to_path_buf()))?;
        if !is_url_safe_slug(&slug) {
            return Err(ScanError::InvalidSlug {
                path: path.to_path_buf(),
                slug,
            });
        }

        if let Some(first) = seen.get(&slug) {
            return Err(ScanError::DuplicateSlug {
                slug,
                first: first.clone(),
                second: path.to_path_buf(),
            });
        }
        seen.insert(slug.clone(), path.to_path_buf());

        let source_path = path
            .strip_prefix(root)
            .unwrap_or(path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect::<Vec<_>>()
            .join("/");

        sources.push(SourceFile {
            slug,
            source_path,
            path: path.to_path_buf(),
        });
    }

    Ok(sources)
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("md"))
        .unwrap_or(false)
}

/// Split a document into its front matter and body.
///
/// The document must open with a `+++` line; the front matter runs to the
/// next line consisting of `+++`. Returns `None` when either delimiter is
/// missing.
pub fn split_front_matter(content: &str) -> Option<(&str, &str)> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let rest = content.strip_prefix(FRONT_MATTER_DELIMITER)?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == FRONT_MATTER_DELIMITER {
            let front = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Some((front, body.trim_start_matches(['\r', '\n'])));
        }
        offset += line.len();
    }
    None
}

fn read_document<T>(source: &SourceFile) -> Result<(T, String), ScanError>
where
    T: for<'de> Deserialize<'de>,
{
    let content = fs::read_to_string(&source.path)?;
    let (front, body) = split_front_matter(&content)
        .ok_or_else(|| ScanError::MissingFrontMatter(source.path.clone()))?;
    let meta: T = toml::from_str(front).map_err(|e| ScanError::FrontMatter {
        path: source.path.clone(),
        source: e,
    })?;
    Ok((meta, body.to_string()))
}

fn to_naive_date(path: &Path, value: &toml::value::Datetime) -> Result<NaiveDate, ScanError> {
    value
        .date
        .and_then(|d| NaiveDate::from_ymd_opt(i32::from(d.year), u32::from(d.month), u32::from(d.day)))
        .ok_or_else(|| ScanError::InvalidDate {
            path: path.to_path_buf(),
            value: value.to_string(),
        })
}

fn check_image(path: &Path, config: &SiteConfig, reference: Option<&str>) -> Result<(), ScanError> {
    match reference {
        Some(url) if !config.images.allows(url) => Err(ScanError::DisallowedImage {
            path: path.to_path_buf(),
            url: url.to_string(),
        }),
        _ => Ok(()),
    }
}

fn parse_post(source: &SourceFile, config: &SiteConfig) -> Result<Post, ScanError> {
    let (meta, body): (PostFrontMatter, String) = read_document(source)?;
    check_image(&source.path, config, meta.image.as_deref())?;
    let date = meta
        .date
        .as_ref()
        .map(|d| to_naive_date(&source.path, d))
        .transpose()?;

    Ok(Post {
        slug: source.slug.clone(),
        title: meta.title,
        description: meta.description,
        date,
        tags: meta.tags,
        image: meta.image,
        image_caption: meta.image_caption,
        author: meta.author,
        body,
        source_path: source.source_path.clone(),
    })
}

fn parse_project(source: &SourceFile, config: &SiteConfig) -> Result<Project, ScanError> {
    let (meta, body): (ProjectFrontMatter, String) = read_document(source)?;
    check_image(&source.path, config, meta.icon.as_deref())?;
    check_image(&source.path, config, meta.screenshot.as_deref())?;

    Ok(Project {
        slug: source.slug.clone(),
        title: meta.title,
        description: meta.description,
        date: to_naive_date(&source.path, &meta.date)?,
        category: meta.category,
        tags: meta.tags,
        url: meta.url.filter(|u| !u.trim().is_empty()),
        icon: meta.icon.filter(|i| !i.trim().is_empty()),
        features: meta.features,
        screenshot: meta.screenshot.filter(|s| !s.trim().is_empty()),
        body,
        source_path: source.source_path.clone(),
    })
}

/// Newest first; undated posts last, in slug order.
fn sort_posts(mut posts: Vec<Post>) -> Vec<Post> {
    posts.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| a.slug.cmp(&b.slug))
    });
    posts
}

/// Newest first, then by title.
fn sort_projects(mut projects: Vec<Project>) -> Vec<Project> {
    projects.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.title.cmp(&b.title)));
    projects
}
