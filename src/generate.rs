//! HTML site generation.
//!
//! Stage 2 of the build pipeline. Takes the scan manifest and writes the final
//! static site. Pages are pure functions of the manifest; post pages are
//! rendered in parallel on a pool sized by `processing.max_processes` and
//! written afterwards.
//!
//! ## Generated Pages
//!
//! - **Home** (`/index.html`): intro and the latest posts
//! - **Blog index** (`/blog/index.html`): every post, newest first
//! - **Post pages** (`/blog/{slug}/index.html`): one per static param
//! - **Projects** (`/projects/index.html`): project showcase, newest first
//! - **Not found** (`/404.html`): rendered with empty metadata
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── 404.html
//! ├── style.3f9a0c1d2e.css        # Fingerprinted: colors from config + base styles
//! ├── theme.8b7e6d5c4a.js         # Theme switch behavior
//! ├── blog/
//! │   ├── index.html
//! │   ├── hello-world/index.html
//! │   └── rust/ownership/index.html
//! ├── projects/
//! │   └── index.html
//! └── favicon.svg                 # Copied from content/assets/
//! ```
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating;
//! all interpolation is escaped. Post bodies are compiled from markdown with
//! pulldown-cmark and inserted pre-escaped.

use crate::config;
use crate::config::SiteSection;
use crate::metadata::{self, PageMetadata};
use crate::resolve::{resolve, static_params};
use crate::scan::Manifest;
use crate::theme::{self, Theme};
use crate::types::{Category, Post, Project};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Options, Parser, html as md_html};
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Asset copy error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

const CSS_STATIC: &str = include_str!("../static/style.css");
const THEME_JS: &str = include_str!("../static/theme.js");

/// Number of posts featured on the home page.
const HOME_POST_COUNT: usize = 3;

const GENERATOR: &str = concat!("folio ", env!("CARGO_PKG_VERSION"));

/// What kind of page a generated file is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Home,
    BlogIndex,
    Post,
    Projects,
    NotFound,
}

/// One written page, for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct PageEntry {
    pub kind: PageKind,
    pub title: String,
    /// Path relative to the output directory.
    pub path: String,
}

/// Everything the generate stage wrote.
#[derive(Debug, Clone, Default)]
pub struct SiteReport {
    pub pages: Vec<PageEntry>,
    /// Fingerprinted stylesheet and script, relative to the output directory.
    pub assets: Vec<String>,
    /// Files copied from the content assets directory.
    pub copied: usize,
}

impl SiteReport {
    pub fn count(&self, kind: PageKind) -> usize {
        self.pages.iter().filter(|p| p.kind == kind).count()
    }
}

/// Top-level site section, used to mark the current nav link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Home,
    Blog,
    Projects,
    None,
}

/// Per-site values every page needs.
struct Layout<'a> {
    site: &'a SiteSection,
    stylesheet: String,
    script: String,
}

/// Read the scan manifest from disk and generate the site.
///
/// `site_url` replaces the manifest's `site.url` before rendering and is
/// validated like a configured one.
pub fn generate(
    manifest_path: &Path,
    source_root: &Path,
    output_dir: &Path,
    site_url: Option<&str>,
) -> Result<SiteReport, GenerateError> {
    let manifest_content = fs::read_to_string(manifest_path)?;
    let mut manifest: Manifest = serde_json::from_str(&manifest_content)?;
    if let Some(url) = site_url {
        manifest.config.override_site_url(url)?;
    }
    generate_site(&manifest, source_root, output_dir)
}

/// Generate the site from an in-memory manifest.
pub fn generate_site(
    manifest: &Manifest,
    source_root: &Path,
    output_dir: &Path,
) -> Result<SiteReport, GenerateError> {
    let mut report = SiteReport::default();
    fs::create_dir_all(output_dir)?;

    let css = format!(
        "{}\n\n{}",
        config::generate_color_css(&manifest.config.colors),
        CSS_STATIC
    );
    let stylesheet = fingerprint("style", "css", &css);
    let script = fingerprint("theme", "js", THEME_JS);
    fs::write(output_dir.join(&stylesheet), &css)?;
    fs::write(output_dir.join(&script), THEME_JS)?;
    report.assets.push(stylesheet.clone());
    report.assets.push(script.clone());

    report.copied = copy_assets(&source_root.join(&manifest.config.assets_dir), output_dir)?;

    let layout = Layout {
        site: &manifest.config.site,
        stylesheet,
        script,
    };

    write_page(
        output_dir,
        "index.html",
        render_home(&layout, manifest),
        &mut report,
        PageKind::Home,
        &layout.site.title,
    )?;

    write_page(
        output_dir,
        "blog/index.html",
        render_blog_index(&layout, manifest.posts.as_slice()),
        &mut report,
        PageKind::BlogIndex,
        "Blog",
    )?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config::effective_threads(&manifest.config.processing))
        .build()?;
    let params = static_params(&manifest.posts);
    let rendered: Vec<(String, String, String)> = pool.install(|| {
        params
            .par_iter()
            .map(|route| {
                let path = format!("{}/{}/index.html", metadata::BLOG_SECTION, route.joined());
                match resolve(&manifest.posts, &route.slug) {
                    Some(post) => (path, post.title.clone(), render_post_page(&layout, post).into_string()),
                    None => (path, "Not found".to_string(), render_not_found(&layout).into_string()),
                }
            })
            .collect()
    });

    for (path, title, html) in rendered {
        let target = output_dir.join(&path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, html)?;
        debug!(%path, "wrote post page");
        report.pages.push(PageEntry {
            kind: PageKind::Post,
            title,
            path,
        });
    }

    write_page(
        output_dir,
        "projects/index.html",
        render_projects_page(&layout, manifest.projects.as_slice()),
        &mut report,
        PageKind::Projects,
        "Projects",
    )?;

    write_page(
        output_dir,
        "404.html",
        render_not_found(&layout),
        &mut report,
        PageKind::NotFound,
        "Not found",
    )?;

    info!(
        pages = report.pages.len(),
        output = %output_dir.display(),
        "site generated"
    );
    Ok(report)
}

fn write_page(
    output_dir: &Path,
    path: &str,
    markup: Markup,
    report: &mut SiteReport,
    kind: PageKind,
    title: &str,
) -> Result<(), GenerateError> {
    let target = output_dir.join(path);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&target, markup.into_string())?;
    debug!(%path, "wrote page");
    report.pages.push(PageEntry {
        kind,
        title: title.to_string(),
        path: path.to_string(),
    });
    Ok(())
}

/// Content-addressed asset filename: `{name}.{hash10}.{ext}`.
pub fn fingerprint(name: &str, ext: &str, content: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(content.as_bytes()));
    format!("{}.{}.{}", name, &digest[..10], ext)
}

/// Copy every file under `assets_dir` into `output_dir`, keeping relative paths.
///
/// A missing assets directory copies nothing.
fn copy_assets(assets_dir: &Path, output_dir: &Path) -> Result<usize, GenerateError> {
    if !assets_dir.is_dir() {
        return Ok(0);
    }
    let mut copied = 0;
    for entry in WalkDir::new(assets_dir) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry.path().strip_prefix(assets_dir).unwrap_or(entry.path());
        let target = output_dir.join(rel);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(entry.path(), &target)?;
        copied += 1;
    }
    Ok(copied)
}

/// Compile a markdown body to HTML.
pub fn markdown_to_html(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;
    let parser = Parser::new_ext(markdown, options);
    let mut body_html = String::new();
    md_html::push_html(&mut body_html, parser);
    body_html
}

fn format_date(date: chrono::NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(layout: &Layout, meta: &PageMetadata, section: Section, content: Markup) -> Markup {
    let title = meta.title.as_deref().unwrap_or(&layout.site.title);
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                meta name="generator" content=(GENERATOR);
                title { (title) }
                (head_tags(meta))
                script { (PreEscaped(theme::prepaint_script())) }
                link rel="stylesheet" href={ "/" (layout.stylesheet) };
                script src={ "/" (layout.script) } defer {}
            }
            body {
                (site_header(layout.site, section))
                (content)
                footer.site-footer {
                    p { "© " (layout.site.title) }
                }
            }
        }
    }
}

/// Renders the metadata head tags. Absent fields emit nothing.
pub fn head_tags(meta: &PageMetadata) -> Markup {
    html! {
        @if let Some(description) = &meta.description {
            meta name="description" content=(description);
        }
        @if let Some(author) = &meta.author {
            @if let Some(name) = &author.name {
                meta name="author" content=(name);
            }
            @if let Some(url) = &author.url {
                link rel="author" href=(url);
            }
        }
        @if let Some(og) = &meta.open_graph {
            link rel="canonical" href=(og.url);
            meta property="og:title" content=(og.title);
            meta property="og:description" content=(og.description);
            meta property="og:type" content=(og.kind);
            meta property="og:url" content=(og.url);
            @for image in &og.images {
                meta property="og:image" content=(image.url);
                meta property="og:image:width" content=(image.width);
                meta property="og:image:height" content=(image.height);
                meta property="og:image:alt" content=(image.alt);
            }
        }
        @if let Some(twitter) = &meta.twitter {
            meta name="twitter:card" content=(twitter.card);
            meta name="twitter:title" content=(twitter.title);
            meta name="twitter:description" content=(twitter.description);
            @if let Some(site) = &twitter.site {
                meta name="twitter:site" content=(site);
            }
            @for image in &twitter.images {
                meta name="twitter:image" content=(image);
            }
        }
    }
}

/// Renders the site header with navigation and the theme switch
fn site_header(site: &SiteSection, section: Section) -> Markup {
    let links = [
        (Section::Home, "/", "Home"),
        (Section::Blog, "/blog/", "Blog"),
        (Section::Projects, "/projects/", "Projects"),
    ];
    html! {
        header.site-header {
            a.site-title href="/" { (site.title) }
            nav.site-nav {
                ul {
                    @for (target, href, label) in links {
                        li class=[(target == section).then_some("current")] {
                            a href=(href) { (label) }
                        }
                    }
                }
            }
            (render_theme_switch(Theme::default()))
        }
    }
}

/// Renders the theme switch in the given state.
///
/// The switch's look follows the root `dark` class, which the inline head
/// script sets before first paint. `theme.js` syncs `aria-checked` on load.
pub fn render_theme_switch(theme: Theme) -> Markup {
    let dark = theme.is_dark();
    html! {
        button.theme-switch id="theme-switch" type="button" role="switch"
            aria-checked=(dark) data-theme=(theme.as_str()) {
            span.sr-only { "Toggle dark mode" }
            span.theme-icon.sun aria-hidden="true" { "☀" }
            span.theme-icon.moon aria-hidden="true" { "☾" }
            span.theme-knob aria-hidden="true" {}
        }
    }
}

fn render_tags(tags: &[String]) -> Markup {
    html! {
        @if !tags.is_empty() {
            ul.tags {
                @for tag in tags {
                    li.tag { (tag) }
                }
            }
        }
    }
}

fn post_card(post: &Post) -> Markup {
    html! {
        article.post-card {
            h2 {
                a href={ "/" (metadata::BLOG_SECTION) "/" (post.slug) "/" } { (post.title) }
            }
            @if let Some(date) = post.date {
                time datetime=(date.to_string()) { (format_date(date)) }
            }
            p.post-card-description { (post.description) }
            (render_tags(&post.tags))
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders the home page: intro plus the latest posts
fn render_home(layout: &Layout, manifest: &Manifest) -> Markup {
    let meta = metadata::site_page_metadata(layout.site, None, "");
    let content = html! {
        main.home-page {
            section.intro {
                h1 { (layout.site.title) }
                p.intro-description { (layout.site.description) }
            }
            @if !manifest.posts.is_empty() {
                section.latest-posts {
                    h2 { "Latest posts" }
                    @for post in manifest.posts.iter().take(HOME_POST_COUNT) {
                        (post_card(post))
                    }
                    a.more-link href="/blog/" { "All posts →" }
                }
            }
            @if !manifest.projects.is_empty() {
                section.project-teaser {
                    a.more-link href="/projects/" {
                        "Projects (" (manifest.projects.len()) ") →"
                    }
                }
            }
        }
    };
    base_document(layout, &meta, Section::Home, content)
}

/// Renders the blog index with every post
fn render_blog_index(layout: &Layout, posts: &[Post]) -> Markup {
    let meta = metadata::site_page_metadata(layout.site, Some("Blog"), metadata::BLOG_SECTION);
    let content = html! {
        main.blog-index {
            h1 { "Blog" }
            @if posts.is_empty() {
                p.empty { "Nothing here yet." }
            }
            @for post in posts {
                (post_card(post))
            }
        }
    };
    base_document(layout, &meta, Section::Blog, content)
}

/// Renders a post: title block, subtitle, primary image with caption, body
fn render_post_page(layout: &Layout, post: &Post) -> Markup {
    let meta = metadata::post_metadata(Some(post), layout.site);
    let body_html = markdown_to_html(&post.body);

    let content = html! {
        main.post-page {
            div.post-title-block {
                h1.post-title { (post.title) }
            }
            div.post-intro {
                span.post-description { (post.description) }
                @if post.date.is_some() || post.author.is_some() {
                    p.post-byline {
                        @if let Some(author) = &post.author {
                            span.post-author { (author.name) }
                        }
                        @if let Some(date) = post.date {
                            time datetime=(date.to_string()) { (format_date(date)) }
                        }
                    }
                }
                (render_tags(&post.tags))
                @if let Some(image) = &post.image {
                    figure.post-figure {
                        div.post-image-frame {
                            img.post-image src=(image) alt=(post.title) fetchpriority="high";
                        }
                        @if let Some(caption) = &post.image_caption {
                            figcaption { (caption) }
                        }
                    }
                }
            }
            article.post-body {
                (PreEscaped(body_html))
            }
        }
    };
    base_document(layout, &meta, Section::Blog, content)
}

/// Renders the not-found page with empty metadata
fn render_not_found(layout: &Layout) -> Markup {
    let meta = metadata::post_metadata(None, layout.site);
    let content = html! {
        main.not-found {
            h1 { "Page not found" }
            p { "There is nothing at this address." }
            a href="/" { "Back home" }
        }
    };
    base_document(layout, &meta, Section::None, content)
}

/// Renders the projects page
fn render_projects_page(layout: &Layout, projects: &[Project]) -> Markup {
    let meta = metadata::site_page_metadata(layout.site, Some("Projects"), "projects");
    let content = html! {
        main.projects-page {
            h1 { "Projects" }
            @if projects.is_empty() {
                p.empty { "Nothing here yet." }
            }
            @for (idx, project) in projects.iter().enumerate() {
                (render_project_item(project, idx + 1 == projects.len()))
            }
        }
    };
    base_document(layout, &meta, Section::Projects, content)
}

// ============================================================================
// Project display
// ============================================================================

/// Renders one project showcase entry.
///
/// `line` marks the last item of a list: it suppresses the trailing separator.
pub fn render_project_item(project: &Project, line: bool) -> Markup {
    html! {
        section.project-item {
            p.project-year { (project.year()) }
            div.project-line {}
            div.project-browser {
                div.browser-bar {
                    span.browser-dots aria-hidden="true" { span {} span {} span {} }
                    @if let Some(url) = &project.url {
                        a.browser-url href=(url) target="_blank" rel="noopener" { (url) }
                    } @else {
                        span.browser-url {}
                    }
                }
                (render_project_container(project.category, html! {
                    div.project-summary {
                        (render_project_header(project))
                        @if !project.features.is_empty() {
                            ul.project-features {
                                @for feature in &project.features {
                                    li { (feature) }
                                }
                            }
                        }
                    }
                    @if let Some(screenshot) = &project.screenshot {
                        img.project-screenshot src=(screenshot)
                            alt={ (project.title) " screenshot" } loading="lazy";
                    }
                }))
            }
        }
        @if !line {
            div.project-line.trailing {}
        }
    }
}

/// Renders the project body container; the category picks the column layout.
pub fn render_project_container(category: Category, content: Markup) -> Markup {
    let columns = match category {
        Category::Web => "single-column",
        Category::Android | Category::Other => "two-column",
    };
    html! {
        div class={ "project-container " (columns) } data-category=(category.as_str()) {
            (content)
        }
    }
}

fn render_project_header(project: &Project) -> Markup {
    html! {
        header.project-header {
            @if let Some(icon) = &project.icon {
                img.project-icon src=(icon) alt="" width="48" height="48";
            }
            div {
                h2 { (project.title) }
                p.project-description { (project.description) }
                (render_tags(&project.tags))
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
