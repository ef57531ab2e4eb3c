#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use parking_lot::Mutex as PlMutex;
use serde_json::json;

use posts_api::api::{Comment, NewComment, NewPost, Post, PostChanges, PostFilter, PostId};
use posts_api::db::repositories::LocalRepository;
use posts_api::db::repository::{
    CommentRepository, ErrorContext, PostRepository, RepositoryError, RepositoryResult,
};
use posts_api::routes::ApiRequest;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

// =============================================================================
// Recording repository
// =============================================================================

/// Store operation names as recorded by [`RecordingRepository`].
pub mod op {
    pub const FIND: &str = "find";
    pub const FIND_BY_ID: &str = "find_by_id";
    pub const INSERT: &str = "insert";
    pub const UPDATE: &str = "update";
    pub const REMOVE: &str = "remove";
    pub const FIND_POST_COMMENTS: &str = "find_post_comments";
    pub const INSERT_COMMENT: &str = "insert_comment";
}

/// Wraps a [`LocalRepository`], recording every call and failing the
/// operations named in `fail_on`.
#[derive(Default)]
pub struct RecordingRepository {
    pub inner: LocalRepository,
    calls: PlMutex<Vec<&'static str>>,
    fail_on: PlMutex<HashSet<&'static str>>,
    vanish_on_update: PlMutex<bool>,
}

impl RecordingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(self, operation: &'static str) -> Self {
        self.fail_on.lock().insert(operation);
        self
    }

    /// Make `update` delete the post right after applying the changes.
    pub fn vanishing_on_update(self) -> Self {
        *self.vanish_on_update.lock() = true;
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().clear();
    }

    fn record(&self, operation: &'static str) -> RepositoryResult<()> {
        self.calls.lock().push(operation);
        if self.fail_on.lock().contains(operation) {
            return Err(RepositoryError::query_with_context(
                "injected failure",
                ErrorContext::new(operation),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl PostRepository for RecordingRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.inner.health_check().await
    }

    async fn find(&self, filter: &PostFilter) -> RepositoryResult<Vec<Post>> {
        self.record(op::FIND)?;
        self.inner.find(filter).await
    }

    async fn find_by_id(&self, id: PostId) -> RepositoryResult<Option<Post>> {
        self.record(op::FIND_BY_ID)?;
        self.inner.find_by_id(id).await
    }

    async fn insert(&self, post: &NewPost) -> RepositoryResult<Post> {
        self.record(op::INSERT)?;
        self.inner.insert(post).await
    }

    async fn update(&self, id: PostId, changes: &PostChanges) -> RepositoryResult<usize> {
        self.record(op::UPDATE)?;
        let updated = self.inner.update(id, changes).await?;
        let vanish = *self.vanish_on_update.lock();
        if vanish {
            self.inner.remove(id).await?;
        }
        Ok(updated)
    }

    async fn remove(&self, id: PostId) -> RepositoryResult<usize> {
        self.record(op::REMOVE)?;
        self.inner.remove(id).await
    }
}

#[async_trait]
impl CommentRepository for RecordingRepository {
    async fn find_post_comments(&self, post_id: PostId) -> RepositoryResult<Vec<Comment>> {
        self.record(op::FIND_POST_COMMENTS)?;
        self.inner.find_post_comments(post_id).await
    }

    async fn insert_comment(&self, comment: &NewComment) -> RepositoryResult<Comment> {
        self.record(op::INSERT_COMMENT)?;
        self.inner.insert_comment(comment).await
    }
}

// =============================================================================
// Request builders
// =============================================================================

pub fn post_request(title: &str, contents: &str) -> ApiRequest {
    ApiRequest::new().with_body(json!({ "title": title, "contents": contents }))
}

pub fn id_request(id: &str) -> ApiRequest {
    ApiRequest::new().with_param("id", id)
}

pub fn comment_request(id: &str, text: &str) -> ApiRequest {
    id_request(id).with_body(json!({ "text": text }))
}

/// Insert a post directly into the store.
pub async fn seed_post(repo: &LocalRepository, title: &str, contents: &str) -> Post {
    repo.insert(&NewPost {
        title: title.to_string(),
        contents: contents.to_string(),
    })
    .await
    .unwrap()
}
