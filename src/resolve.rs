//! Slug routing over a content collection.
//!
//! Two operations drive which pages exist:
//!
//! - [`resolve`] maps a request path (as segments) to a document, or to
//!   `None` when nothing matches. Absence is an ordinary outcome; callers turn
//!   it into the not-found page.
//! - [`static_params`] enumerates every resolvable path ahead of time, one
//!   entry per document, by splitting each slug into segments.
//!
//! For any collection, resolving each enumerated entry yields the documents
//! of the collection in order.

use crate::naming::{join_segments, split_slug};
use crate::types::{Collection, Document};
use serde::{Deserialize, Serialize};

/// Route parameters for one statically generated page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlugParams {
    pub slug: Vec<String>,
}

impl SlugParams {
    /// Output path of the page relative to its section directory.
    pub fn joined(&self) -> String {
        join_segments(&self.slug)
    }
}

/// Find the document whose slug equals the joined `segments`.
pub fn resolve<'a, T, S>(collection: &'a Collection<T>, segments: &[S]) -> Option<&'a T>
where
    T: Document,
    S: AsRef<str>,
{
    let slug = join_segments(segments);
    collection.iter().find(|doc| doc.slug() == slug)
}

/// Enumerate the route parameters of every document in the collection.
pub fn static_params<T: Document>(collection: &Collection<T>) -> Vec<SlugParams> {
    collection
        .iter()
        .map(|doc| SlugParams {
            slug: split_slug(doc.slug()),
        })
        .collect()
}
