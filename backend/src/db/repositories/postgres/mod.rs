//! Postgres repository implementation using Diesel.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures
//! - Automatic migration execution
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::{debug, warn};
use std::time::Duration;
use tokio::task;

use crate::api::{Comment, NewComment, NewPost, Post, PostChanges, PostFilter, PostId};
use crate::db::repository::{
    CommentRepository, ErrorContext, PostRepository, RepositoryError, RepositoryResult,
};

mod models;
mod schema;

use models::*;
use schema::{comments, posts};

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    ///
    /// See the module documentation for the recognised variables.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let defaults = Self::default();
        Ok(Self {
            database_url,
            max_pool_size: env_or("PG_POOL_MAX", defaults.max_pool_size),
            min_pool_size: env_or("PG_POOL_MIN", defaults.min_pool_size),
            connection_timeout_sec: env_or("PG_CONN_TIMEOUT_SEC", defaults.connection_timeout_sec),
            idle_timeout_sec: env_or("PG_IDLE_TIMEOUT_SEC", defaults.idle_timeout_sec),
            max_retries: env_or("PG_MAX_RETRIES", defaults.max_retries),
            retry_delay_ms: env_or("PG_RETRY_DELAY_MS", defaults.retry_delay_ms),
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Diesel-backed repository for Postgres.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        Ok(Self { pool, config })
    }

    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;

        Ok(())
    }

    /// Execute a database operation with automatic retry for transient failures.
    ///
    /// Diesel is synchronous, so the operation runs on the blocking pool.
    /// Retryable errors (connection errors, timeouts, serialization failures)
    /// are retried up to `max_retries` times with exponential backoff.
    async fn with_conn<T, F>(&self, operation: &'static str, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2;
                }

                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::connection_with_context(
                            e.to_string(),
                            ErrorContext::new(operation)
                                .with_details(format!("attempt={}", attempt + 1)),
                        );
                        if attempt < max_retries {
                            warn!("{} could not get a connection, retrying: {}", operation, err);
                            last_error = Some(err);
                            continue;
                        }
                        return Err(err);
                    }
                };

                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        warn!("{} failed with a retryable error: {}", operation, e);
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => return Err(e.with_operation(operation)),
                }
            }

            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }
}

fn map_diesel_error(err: diesel::result::Error) -> RepositoryError {
    RepositoryError::from(err)
}

#[async_trait]
impl PostRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn("health_check", |conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn find(&self, filter: &PostFilter) -> RepositoryResult<Vec<Post>> {
        let filter = filter.clone();
        self.with_conn("find", move |conn| {
            let mut query = posts::table
                .select(PostRow::as_select())
                .order(posts::id.asc())
                .into_boxed();

            if let Some(raw) = filter.id() {
                match PostId::parse(raw) {
                    Some(id) => query = query.filter(posts::id.eq(id.value())),
                    None => return Ok(Vec::new()),
                }
            }
            if let Some(title) = filter.title() {
                query = query.filter(posts::title.eq(title.to_string()));
            }
            if let Some(contents) = filter.contents() {
                query = query.filter(posts::contents.eq(contents.to_string()));
            }

            let rows = query.load::<PostRow>(conn).map_err(map_diesel_error)?;
            Ok(rows.into_iter().map(Post::from).collect())
        })
        .await
    }

    async fn find_by_id(&self, id: PostId) -> RepositoryResult<Option<Post>> {
        self.with_conn("find_by_id", move |conn| {
            posts::table
                .find(id.value())
                .select(PostRow::as_select())
                .first::<PostRow>(conn)
                .optional()
                .map(|row| row.map(Post::from))
                .map_err(|e| map_diesel_error(e).with_post(id))
        })
        .await
    }

    async fn insert(&self, post: &NewPost) -> RepositoryResult<Post> {
        let row = NewPostRow::from(post);
        let stored = self
            .with_conn("insert", move |conn| {
                diesel::insert_into(posts::table)
                    .values(&row)
                    .returning(PostRow::as_returning())
                    .get_result::<PostRow>(conn)
                    .map_err(map_diesel_error)
            })
            .await?;
        debug!("Inserted post id={}", stored.id);
        Ok(stored.into())
    }

    async fn update(&self, id: PostId, changes: &PostChanges) -> RepositoryResult<usize> {
        let changeset = PostChangesetRow::new(changes, Utc::now());
        self.with_conn("update", move |conn| {
            diesel::update(posts::table.find(id.value()))
                .set(&changeset)
                .execute(conn)
                .map_err(|e| map_diesel_error(e).with_post(id))
        })
        .await
    }

    async fn remove(&self, id: PostId) -> RepositoryResult<usize> {
        // comments go with the post via ON DELETE CASCADE
        let removed = self
            .with_conn("remove", move |conn| {
                diesel::delete(posts::table.find(id.value()))
                    .execute(conn)
                    .map_err(|e| map_diesel_error(e).with_post(id))
            })
            .await?;
        debug!("Removed {} post(s) for id={}", removed, id);
        Ok(removed)
    }
}

#[async_trait]
impl CommentRepository for PostgresRepository {
    async fn find_post_comments(&self, post_id: PostId) -> RepositoryResult<Vec<Comment>> {
        self.with_conn("find_post_comments", move |conn| {
            let rows = comments::table
                .filter(comments::post_id.eq(post_id.value()))
                .order(comments::id.asc())
                .select(CommentRow::as_select())
                .load::<CommentRow>(conn)
                .map_err(|e| map_diesel_error(e).with_post(post_id))?;
            Ok(rows.into_iter().map(Comment::from).collect())
        })
        .await
    }

    async fn insert_comment(&self, comment: &NewComment) -> RepositoryResult<Comment> {
        let post_id = comment.post_id;
        let row = NewCommentRow::from(comment);
        let stored = self
            .with_conn("insert_comment", move |conn| {
                diesel::insert_into(comments::table)
                    .values(&row)
                    .returning(CommentRow::as_returning())
                    .get_result::<CommentRow>(conn)
                    .map_err(|e| map_diesel_error(e).with_post(post_id))
            })
            .await?;
        debug!("Inserted comment id={} on post id={}", stored.id, post_id);
        Ok(stored.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = PostgresConfig::with_url("postgres://localhost/posts");
        assert_eq!(config.database_url, "postgres://localhost/posts");
        assert_eq!(config.max_pool_size, 10);
        assert_eq!(config.min_pool_size, 1);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay_ms, 100);
    }
}
