use super::repositories::LocalRepository;
use super::repository::{PostRepository, RepositoryError};
use super::services;
use crate::api::{NewPost, PostId};

#[tokio::test]
async fn test_post_exists_tracks_store_contents() {
    let repo = LocalRepository::new();
    assert!(!services::post_exists(&repo, PostId(1)).await.unwrap());

    let post = repo
        .insert(&NewPost {
            title: "A".to_string(),
            contents: "B".to_string(),
        })
        .await
        .unwrap();
    assert!(services::post_exists(&repo, post.id).await.unwrap());

    repo.remove(post.id).await.unwrap();
    assert!(!services::post_exists(&repo, post.id).await.unwrap());
}

#[tokio::test]
async fn test_post_exists_propagates_store_failure() {
    let repo = LocalRepository::new();
    repo.set_healthy(false);

    let err = services::post_exists(&repo, PostId(1)).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Connection { .. }));
}

#[tokio::test]
async fn test_health_check_through_trait_object() {
    let repo: std::sync::Arc<dyn super::repository::FullRepository> =
        std::sync::Arc::new(LocalRepository::new());
    assert!(services::health_check(repo.as_ref()).await.unwrap());
}
