//! Document types shared by every pipeline stage.
//!
//! These types are serialized into the scan manifest and read back by the
//! generate stage, so the scan output is the only content representation the
//! renderer ever sees. Documents are immutable once scanned.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum CollectionError {
    #[error("Duplicate slug '{0}' in collection")]
    DuplicateSlug(String),
}

/// Anything addressable by slug within a [`Collection`].
pub trait Document {
    fn slug(&self) -> &str;
    fn title(&self) -> &str;
}

/// Author attribution for a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Author {
    pub name: String,
    /// Twitter/X handle, with or without the leading `@`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
}

impl Author {
    /// Profile URL derived from the twitter handle.
    pub fn profile_url(&self) -> Option<String> {
        self.twitter
            .as_deref()
            .map(|handle| handle.trim_start_matches('@'))
            .filter(|handle| !handle.is_empty())
            .map(|handle| format!("https://twitter.com/{handle}"))
    }
}

/// A blog post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Path below the blog directory, `/`-joined (e.g. `rust/ownership`).
    pub slug: String,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    /// Raw markdown body, compiled to HTML at render time.
    pub body: String,
    /// Source file relative to the content root.
    pub source_path: String,
}

impl Document for Post {
    fn slug(&self) -> &str {
        &self.slug
    }

    fn title(&self) -> &str {
        &self.title
    }
}

/// Layout family of a project showcase.
///
/// Any category string other than `Android` or `Web` reads as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    #[serde(alias = "android")]
    Android,
    #[serde(alias = "web")]
    Web,
    #[serde(other)]
    Other,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Android => "Android",
            Category::Web => "Web",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A project showcase entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub category: Category,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
    pub body: String,
    pub source_path: String,
}

impl Project {
    pub fn year(&self) -> i32 {
        self.date.year()
    }
}

impl Document for Project {
    fn slug(&self) -> &str {
        &self.slug
    }

    fn title(&self) -> &str {
        &self.title
    }
}

/// An ordered list of documents with unique slugs.
///
/// Uniqueness is checked on construction and again on deserialization, so a
/// hand-edited manifest cannot smuggle in a duplicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "Vec<T>",
    into = "Vec<T>",
    bound(
        serialize = "T: Serialize + Clone",
        deserialize = "T: Deserialize<'de> + Document"
    )
)]
pub struct Collection<T> {
    items: Vec<T>,
}

impl<T: Document> Collection<T> {
    pub fn new(items: Vec<T>) -> Result<Self, CollectionError> {
        let mut seen = HashSet::new();
        for item in &items {
            if !seen.insert(item.slug()) {
                return Err(CollectionError::DuplicateSlug(item.slug().to_string()));
            }
        }
        Ok(Self { items })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Document> TryFrom<Vec<T>> for Collection<T> {
    type Error = CollectionError;

    fn try_from(items: Vec<T>) -> Result<Self, Self::Error> {
        Self::new(items)
    }
}

impl<T> From<Collection<T>> for Vec<T> {
    fn from(collection: Collection<T>) -> Self {
        collection.items
    }
}

impl<'a, T> IntoIterator for &'a Collection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{post, project};

    #[test]
    fn collection_accepts_unique_slugs() {
        let posts = Collection::new(vec![post("a"), post("b/c")]).unwrap();
        assert_eq!(posts.len(), 2);
        assert!(!posts.is_empty());
    }

    #[test]
    fn collection_rejects_duplicate_slug() {
        let result = Collection::new(vec![post("a"), post("b"), post("a")]);
        assert_eq!(result, Err(CollectionError::DuplicateSlug("a".into())));
    }

    #[test]
    fn collection_preserves_order() {
        let posts = Collection::new(vec![post("z"), post("a"), post("m")]).unwrap();
        let slugs: Vec<&str> = posts.iter().map(|p| p.slug()).collect();
        assert_eq!(slugs, vec!["z", "a", "m"]);
    }

    #[test]
    fn collection_deserialize_rejects_duplicates() {
        let json = serde_json::to_string(&vec![post("dup"), post("dup")]).unwrap();
        let result: Result<Collection<Post>, _> = serde_json::from_str(&json);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Duplicate slug 'dup'"), "got: {err}");
    }

    #[test]
    fn collection_serializes_as_plain_list() {
        let posts = Collection::new(vec![post("a")]).unwrap();
        let value = serde_json::to_value(&posts).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["slug"], "a");
    }

    #[test]
    fn category_known_values() {
        let web: Category = serde_json::from_str(r#""Web""#).unwrap();
        let android: Category = serde_json::from_str(r#""android""#).unwrap();
        assert_eq!(web, Category::Web);
        assert_eq!(android, Category::Android);
    }

    #[test]
    fn category_unknown_value_is_other() {
        let cat: Category = serde_json::from_str(r#""Embedded""#).unwrap();
        assert_eq!(cat, Category::Other);
    }

    #[test]
    fn author_profile_url_strips_at() {
        let author = Author {
            name: "Ada".into(),
            twitter: Some("@ada".into()),
        };
        assert_eq!(
            author.profile_url().as_deref(),
            Some("https://twitter.com/ada")
        );
    }

    #[test]
    fn author_without_handle_has_no_url() {
        let author = Author {
            name: "Ada".into(),
            twitter: None,
        };
        assert_eq!(author.profile_url(), None);
    }

    #[test]
    fn project_year_comes_from_date() {
        let p = project("tracker", Category::Web);
        assert_eq!(p.year(), 2023);
    }
}
