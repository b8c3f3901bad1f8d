//! Slug derivation and path-segment handling.
//!
//! Every document's slug comes from its path relative to the collection
//! directory, so the filesystem stays the single source of truth:
//!
//! - `blog/hello-world.md` → `hello-world`
//! - `blog/rust/ownership.md` → `rust/ownership`
//! - `blog/rust/index.md` → `rust`
//!
//! Slugs are joined from and split into path segments by the same two
//! functions, so a slug round-trips through the static param enumeration
//! unchanged.

use std::path::{Component, Path};

/// Derive a slug from a document path relative to its collection directory.
///
/// The extension is dropped, components are joined with `/` regardless of
/// platform, and a trailing `index` segment collapses into its parent.
/// Returns `None` for paths that would produce an empty slug (a bare
/// `index.md` at the collection root).
pub fn slug_from_path(relative: &Path) -> Option<String> {
    let stem = relative.with_extension("");
    let mut segments: Vec<String> = stem
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().to_string()),
            _ => None,
        })
        .collect();

    if segments.last().is_some_and(|s| s == "index") {
        segments.pop();
    }
    if segments.is_empty() {
        return None;
    }
    Some(join_segments(&segments))
}

/// Whether a slug segment can appear in a URL path without encoding.
///
/// Allows the RFC 3986 unreserved characters: ASCII letters, digits, and
/// `.`, `_`, `~`, `-`.
pub fn is_url_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'~' | b'-'))
}

/// Whether every segment of `slug` is URL-safe.
pub fn is_url_safe_slug(slug: &str) -> bool {
    slug.split('/').all(is_url_safe_segment)
}

/// Join path segments into a slug string.
pub fn join_segments<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("/")
}

/// Split a slug into its path segments.
pub fn split_slug(slug: &str) -> Vec<String> {
    slug.split('/').map(str::to_string).collect()
}
