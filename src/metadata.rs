//! Page and social metadata.
//!
//! Every rendered page carries a [`PageMetadata`] that becomes its `<head>`
//! tags: title, description, author, Open Graph and Twitter card. For posts
//! the metadata is derived entirely from the resolved document and the site
//! config; nothing here performs I/O.
//!
//! ## Social preview images
//!
//! Preview images come from an external image service. This module only
//! builds the URL: description, title, each tag, and slug are passed as
//! percent-encoded query parameters, in that order.
//!
//! ```text
//! https://example.dev/api/og?description=A%20tour&title=Ownership&tags=rust&tags=memory&slug=rust%2Fownership
//! ```
//!
//! ## Absent documents
//!
//! [`post_metadata`] with `None` returns [`PageMetadata::default`], which has
//! no populated field. The not-found page renders with that, so its head is
//! valid but minimal.

use crate::config::SiteSection;
use crate::types::Post;
use serde::Serialize;

/// Width of generated social preview images.
pub const OG_IMAGE_WIDTH: u32 = 1200;
/// Height of generated social preview images.
pub const OG_IMAGE_HEIGHT: u32 = 630;

/// Section of the site under which posts are published.
pub const BLOG_SECTION: &str = "blog";

/// Head metadata for one page. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_graph: Option<OpenGraph>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<TwitterCard>,
}

impl PageMetadata {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenGraph {
    pub title: String,
    pub description: String,
    /// `og:type`, `article` for posts and `website` elsewhere.
    pub kind: &'static str,
    pub url: String,
    pub images: Vec<OgImage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OgImage {
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TwitterCard {
    pub card: &'static str,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
    pub images: Vec<String>,
}

/// Canonical URL of a post: `<site-url>/blog/<slug>`.
pub fn post_url(site: &SiteSection, slug: &str) -> String {
    format!("{}/{}/{}", site.base_url(), BLOG_SECTION, slug)
}

/// Build the social preview image URL for a document.
pub fn og_image_url(endpoint: &str, description: &str, title: &str, tags: &[String], slug: &str) -> String {
    let mut query = vec![
        format!("description={}", urlencoding::encode(description)),
        format!("title={}", urlencoding::encode(title)),
    ];
    query.extend(
        tags.iter()
            .map(|tag| format!("tags={}", urlencoding::encode(tag))),
    );
    query.push(format!("slug={}", urlencoding::encode(slug)));
    format!("{}?{}", endpoint, query.join("&"))
}

/// Metadata for a post page, or empty metadata when the post is absent.
pub fn post_metadata(post: Option<&Post>, site: &SiteSection) -> PageMetadata {
    let Some(post) = post else {
        return PageMetadata::default();
    };

    let image_url = og_image_url(
        &site.og_endpoint_url(),
        &post.description,
        &post.title,
        &post.tags,
        &post.slug,
    );

    PageMetadata {
        title: Some(post.title.clone()),
        description: Some(post.description.clone()),
        author: post.author.as_ref().map(|a| AuthorMeta {
            name: Some(a.name.clone()),
            url: a.profile_url(),
        }),
        open_graph: Some(OpenGraph {
            title: post.title.clone(),
            description: post.description.clone(),
            kind: "article",
            url: post_url(site, &post.slug),
            images: vec![OgImage {
                url: image_url.clone(),
                width: OG_IMAGE_WIDTH,
                height: OG_IMAGE_HEIGHT,
                alt: post.title.clone(),
            }],
        }),
        twitter: Some(TwitterCard {
            card: "summary_large_image",
            title: post.title.clone(),
            description: post.description.clone(),
            site: twitter_site(site),
            images: vec![image_url],
        }),
    }
}

/// Metadata for a site-level page (home, index, projects).
///
/// `path` is the page path below the site root, empty for the home page.
pub fn site_page_metadata(site: &SiteSection, page_title: Option<&str>, path: &str) -> PageMetadata {
    let title = match page_title {
        Some(t) => format!("{} | {}", t, site.title),
        None => site.title.clone(),
    };
    let url = if path.is_empty() {
        format!("{}/", site.base_url())
    } else {
        format!("{}/{}", site.base_url(), path.trim_matches('/'))
    };

    PageMetadata {
        title: Some(title.clone()),
        description: Some(site.description.clone()),
        author: (!site.author.is_empty()).then(|| AuthorMeta {
            name: Some(site.author.clone()),
            url: None,
        }),
        open_graph: Some(OpenGraph {
            title: title.clone(),
            description: site.description.clone(),
            kind: "website",
            url,
            images: Vec::new(),
        }),
        twitter: Some(TwitterCard {
            card: "summary",
            title,
            description: site.description.clone(),
            site: twitter_site(site),
            images: Vec::new(),
        }),
    }
}

fn twitter_site(site: &SiteSection) -> Option<String> {
    let handle = site.twitter.trim().trim_start_matches('@');
    (!handle.is_empty()).then(|| format!("@{handle}"))
}
