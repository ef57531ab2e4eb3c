//! Repository traits for abstracting storage operations.
//!
//! The handler layer only ever talks to a [`FullRepository`]; the in-memory
//! and Postgres implementations are swapped via dependency injection.
//!
//! Absence is not an error at this boundary: `find_by_id` answers `Ok(None)`
//! for an unknown id, and `update`/`remove` answer with an affected-row count.

use async_trait::async_trait;

use crate::api::{Comment, NewComment, NewPost, Post, PostChanges, PostFilter, PostId};

mod error;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

/// Storage operations on posts.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` so a single instance can be shared
/// across request tasks.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Check if the backing store is reachable.
    ///
    /// # Returns
    /// - `Ok(true)` if the store is healthy
    /// - `Ok(false)` if it is unhealthy but no error occurred
    /// - `Err(RepositoryError)` if the check itself failed
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// List posts matching `filter`, ordered by id.
    async fn find(&self, filter: &PostFilter) -> RepositoryResult<Vec<Post>>;

    /// Fetch a single post. `Ok(None)` when no post has this id.
    async fn find_by_id(&self, id: PostId) -> RepositoryResult<Option<Post>>;

    /// Insert a post and return the stored record, including its assigned id.
    async fn insert(&self, post: &NewPost) -> RepositoryResult<Post>;

    /// Apply `changes` to a post.
    ///
    /// # Returns
    /// * `Ok(n)` - Number of rows affected (0 when the id is unknown)
    async fn update(&self, id: PostId, changes: &PostChanges) -> RepositoryResult<usize>;

    /// Delete a post together with its comments.
    ///
    /// # Returns
    /// * `Ok(n)` - Number of posts removed (0 when the id is unknown)
    async fn remove(&self, id: PostId) -> RepositoryResult<usize>;
}

/// Storage operations on comments.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// All comments attached to `post_id`, ordered by id.
    async fn find_post_comments(&self, post_id: PostId) -> RepositoryResult<Vec<Comment>>;

    /// Insert a comment and return the stored record.
    ///
    /// Implementations are not required to check that the referenced post
    /// exists; callers verify it first.
    async fn insert_comment(&self, comment: &NewComment) -> RepositoryResult<Comment>;
}

/// Everything the handler layer needs from a store.
pub trait FullRepository: PostRepository + CommentRepository {}

impl<T> FullRepository for T where T: PostRepository + CommentRepository {}
