//! High-level database service layer.
//!
//! Repository-agnostic operations shared by every caller of the store. The
//! handler layer goes through these instead of interpreting store results
//! itself.

use log::debug;

use crate::api::PostId;

use super::repository::{FullRepository, RepositoryResult};

/// Check if the store is reachable.
///
/// This is a simple pass-through to the repository's health check.
pub async fn health_check<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

/// Existence check for a post.
///
/// Gates every operation that reads or mutates a post's dependents, so the
/// callers branch on a boolean rather than on how the store reports absence.
///
/// # Returns
/// * `Ok(true)` if a post with `id` is stored
/// * `Ok(false)` if it is not
/// * `Err` if the lookup itself failed
pub async fn post_exists<R: FullRepository + ?Sized>(
    repo: &R,
    id: PostId,
) -> RepositoryResult<bool> {
    let exists = repo.find_by_id(id).await?.is_some();
    debug!("post_exists id={} -> {}", id, exists);
    Ok(exists)
}
