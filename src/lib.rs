//! # Folio
//!
//! A static site generator for a personal blog and project portfolio. Posts
//! and projects are markdown files with TOML front matter; the site is plain
//! HTML, one stylesheet, and a small theme script.
//!
//! # Architecture: Two-Stage Pipeline
//!
//! ```text
//! 1. Scan      content/  →  manifest.json    (files → typed collections)
//! 2. Generate  manifest  →  dist/            (final HTML site)
//! ```
//!
//! The manifest is human-readable JSON, so each stage can be inspected and
//! tested on its own. Rendering is a pure function of the manifest.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1: walks `blog/` and `projects/`, parses front matter, produces the manifest |
//! | [`generate`] | Stage 2: renders every page with Maud and writes the site |
//! | [`config`] | `config.toml` loading, validation, merging, and color CSS generation |
//! | [`types`] | Documents (`Post`, `Project`) and the slug-unique `Collection` |
//! | [`naming`] | Slug derivation from content paths |
//! | [`resolve`] | Slug lookup and static route enumeration |
//! | [`metadata`] | Page head metadata: Open Graph, Twitter card, preview image URLs |
//! | [`theme`] | Light/dark theme state machine mirrored by the client script |
//! | [`output`] | CLI output formatting for each stage |
//!
//! # Design Decisions
//!
//! ## Slugs Are Paths
//!
//! A post's slug is its path below `blog/` without the extension, so the
//! content tree and the URL tree are the same tree. `index.md` takes its
//! directory's slug. Slugs are unique per collection; [`types::Collection`]
//! refuses to hold duplicates.
//!
//! ## Absence Is a Value
//!
//! [`resolve::resolve`] returns `Option`. A missing document is an ordinary
//! outcome that renders the not-found page with empty metadata, never an
//! error.
//!
//! ## Class-Based Dark Mode
//!
//! Dark colors hang off a `dark` class on the root element. An inline script
//! in every `<head>` sets it before first paint, so a stored dark preference
//! never flashes light.

pub mod config;
pub mod generate;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod resolve;
pub mod scan;
pub mod theme;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
