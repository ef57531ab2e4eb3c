//! Public API surface for the posts backend.
//!
//! This file consolidates the record types exchanged between the handler
//! layer and the storage collaborator. All types derive Serialize/Deserialize
//! for JSON serialization.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Post identifier (database primary key).
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PostId(pub i64);

/// Comment identifier.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CommentId(pub i64);

impl PostId {
    pub fn new(value: i64) -> Self {
        PostId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// Parse a path parameter into a post id.
    ///
    /// Returns `None` for anything that is not a base-10 integer; such a
    /// value can never name a stored post.
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse::<i64>().ok().map(PostId)
    }
}

impl CommentId {
    pub fn new(value: i64) -> Self {
        CommentId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub contents: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A stored comment attached to exactly one post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub text: String,
    /// Rendered as text, the form it takes in the request path.
    #[serde(with = "post_id_text")]
    pub post_id: PostId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

mod post_id_text {
    use super::*;
    use serde::de::Error;

    pub fn serialize<S: Serializer>(id: &PostId, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(id)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PostId, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(PostId(n)),
            Raw::Text(text) => PostId::parse(&text)
                .ok_or_else(|| D::Error::custom(format!("invalid post id '{}'", text))),
        }
    }
}

/// Payload for inserting a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub contents: String,
}

/// Field replacements for an existing post. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contents: Option<String>,
}

impl PostChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.contents.is_none()
    }
}

impl From<NewPost> for PostChanges {
    fn from(post: NewPost) -> Self {
        Self {
            title: Some(post.title),
            contents: Some(post.contents),
        }
    }
}

/// Payload for inserting a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    pub text: String,
    pub post_id: PostId,
}

/// Query parameters forwarded verbatim from `GET /posts` to the store.
///
/// Stores match `id`, `title` and `contents` by equality and ignore any
/// other key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostFilter(pub BTreeMap<String, String>);

impl PostFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.get("title")
    }

    pub fn contents(&self) -> Option<&str> {
        self.get("contents")
    }

    /// The `id` key as raw text. See [`PostFilter::matches`] for how a
    /// non-numeric value is treated.
    pub fn id(&self) -> Option<&str> {
        self.get("id")
    }

    /// Whether `post` satisfies every recognised key of this filter.
    pub fn matches(&self, post: &Post) -> bool {
        if let Some(raw) = self.id() {
            match PostId::parse(raw) {
                Some(id) if id == post.id => {}
                _ => return false,
            }
        }
        if let Some(title) = self.title() {
            if post.title != title {
                return false;
            }
        }
        if let Some(contents) = self.contents() {
            if post.contents != contents {
                return false;
            }
        }
        true
    }
}

impl From<BTreeMap<String, String>> for PostFilter {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}
