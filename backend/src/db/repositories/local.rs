//! In-memory local repository implementation.
//!
//! Suitable for unit testing and local development. All data lives in
//! ordered maps behind a single lock, so results come back sorted by id and
//! every run is deterministic.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use parking_lot::RwLock;

use crate::api::{
    Comment, CommentId, NewComment, NewPost, Post, PostChanges, PostFilter, PostId,
};
use crate::db::repository::{
    CommentRepository, ErrorContext, PostRepository, RepositoryError, RepositoryResult,
};

/// In-memory local repository.
///
/// Clones share the same underlying storage.
///
/// # Example
/// ```
/// use posts_api::api::NewPost;
/// use posts_api::db::repositories::LocalRepository;
/// use posts_api::db::repository::PostRepository;
///
/// #[tokio::main]
/// async fn main() {
///     let repo = LocalRepository::new();
///     let post = repo
///         .insert(&NewPost { title: "A".into(), contents: "B".into() })
///         .await
///         .unwrap();
///     assert_eq!(post.id.value(), 1);
/// }
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    posts: BTreeMap<PostId, Post>,
    comments: BTreeMap<CommentId, Comment>,

    // ID counters
    next_post_id: i64,
    next_comment_id: i64,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            posts: BTreeMap::new(),
            comments: BTreeMap::new(),
            next_post_id: 1,
            next_comment_id: 1,
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Set the health status for testing connection failures.
    ///
    /// While unhealthy, every operation except `health_check` fails with a
    /// connection error.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all data and reset the id counters.
    pub fn clear(&self) {
        let mut data = self.data.write();
        *data = LocalData {
            is_healthy: data.is_healthy,
            ..Default::default()
        };
    }

    pub fn post_count(&self) -> usize {
        self.data.read().posts.len()
    }

    pub fn comment_count(&self) -> usize {
        self.data.read().comments.len()
    }

    /// Check if a post exists without going through the async trait.
    pub fn has_post(&self, id: PostId) -> bool {
        self.data.read().posts.contains_key(&id)
    }

    /// Helper to check health and return error if unhealthy.
    fn check_health(&self, operation: &str) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection_with_context(
                "Database is not healthy",
                ErrorContext::new(operation),
            ));
        }
        Ok(())
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn find(&self, filter: &PostFilter) -> RepositoryResult<Vec<Post>> {
        self.check_health("find")?;
        let data = self.data.read();
        Ok(data
            .posts
            .values()
            .filter(|post| filter.matches(post))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: PostId) -> RepositoryResult<Option<Post>> {
        self.check_health("find_by_id")?;
        Ok(self.data.read().posts.get(&id).cloned())
    }

    async fn insert(&self, post: &NewPost) -> RepositoryResult<Post> {
        self.check_health("insert")?;
        let mut data = self.data.write();
        let id = PostId(data.next_post_id);
        data.next_post_id += 1;

        let now = Utc::now();
        let stored = Post {
            id,
            title: post.title.clone(),
            contents: post.contents.clone(),
            created_at: now,
            updated_at: now,
        };
        data.posts.insert(id, stored.clone());
        debug!("Inserted post id={}", id);
        Ok(stored)
    }

    async fn update(&self, id: PostId, changes: &PostChanges) -> RepositoryResult<usize> {
        self.check_health("update")?;
        let mut data = self.data.write();
        let Some(post) = data.posts.get_mut(&id) else {
            return Ok(0);
        };

        if let Some(title) = &changes.title {
            post.title = title.clone();
        }
        if let Some(contents) = &changes.contents {
            post.contents = contents.clone();
        }
        post.updated_at = Utc::now();
        Ok(1)
    }

    async fn remove(&self, id: PostId) -> RepositoryResult<usize> {
        self.check_health("remove")?;
        let mut data = self.data.write();
        if data.posts.remove(&id).is_none() {
            return Ok(0);
        }
        data.comments.retain(|_, comment| comment.post_id != id);
        debug!("Removed post id={} and its comments", id);
        Ok(1)
    }
}

#[async_trait]
impl CommentRepository for LocalRepository {
    async fn find_post_comments(&self, post_id: PostId) -> RepositoryResult<Vec<Comment>> {
        self.check_health("find_post_comments")?;
        let data = self.data.read();
        Ok(data
            .comments
            .values()
            .filter(|comment| comment.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn insert_comment(&self, comment: &NewComment) -> RepositoryResult<Comment> {
        self.check_health("insert_comment")?;
        let mut data = self.data.write();
        let id = CommentId(data.next_comment_id);
        data.next_comment_id += 1;

        let now = Utc::now();
        let stored = Comment {
            id,
            text: comment.text.clone(),
            post_id: comment.post_id,
            created_at: now,
            updated_at: now,
        };
        data.comments.insert(id, stored.clone());
        debug!("Inserted comment id={} on post id={}", id, comment.post_id);
        Ok(stored)
    }
}
