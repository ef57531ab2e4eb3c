//! Post and comment handlers.
//!
//! Each handler validates the request, checks that the addressed post exists
//! when the operation depends on it, issues the store call and maps the
//! outcome to a response. Any failure ends the request at that gate; there
//! are no retries here.

use crate::api::{NewComment, NewPost, PostChanges, PostFilter, PostId};
use crate::db::repository::{ErrorContext, FullRepository, RepositoryError};
use crate::db::services;

use super::request::{ApiRequest, ApiResponse};
use super::validation::{required_text, required_texts};
use super::{respond, HandlerError};

pub const LIST_POSTS: &str = "list_posts";
pub const GET_POST: &str = "get_post";
pub const LIST_POST_COMMENTS: &str = "list_post_comments";
pub const CREATE_POST: &str = "create_post";
pub const CREATE_COMMENT: &str = "create_comment";
pub const UPDATE_POST: &str = "update_post";
pub const DELETE_POST: &str = "delete_post";

pub const MISSING_POST_FIELDS: &str = "Please provide title and contents for the post.";
pub const MISSING_COMMENT_TEXT: &str = "Please provide text for the comment.";
pub const POSTS_NOT_RETRIEVED: &str = "The posts information could not be retrieved.";
pub const POST_NOT_RETRIEVED: &str = "The post information could not be retrieved.";
pub const POST_NOT_SAVED: &str = "There was an error while saving the post to the database";
pub const COMMENT_NOT_SAVED: &str =
    "There was an error while saving the comment to the database";
pub const POST_NOT_MODIFIED: &str = "The post information could not be modified.";

type HandlerResult = Result<ApiResponse, HandlerError>;

fn storage(message: &'static str) -> impl FnOnce(RepositoryError) -> HandlerError {
    move |source| HandlerError::storage(message, source)
}

/// The `id` path parameter. A value that is not a post id can never match a
/// stored post, so it is reported as not found.
fn path_post_id(request: &ApiRequest) -> Result<PostId, HandlerError> {
    let raw = request.param("id").unwrap_or_default();
    PostId::parse(raw).ok_or_else(|| HandlerError::NotFound(raw.to_string()))
}

/// Existence gate: `NotFound` if the post is absent, `Storage` if the check fails.
async fn require_post<R, F>(repo: &R, id: PostId, on_failure: F) -> Result<(), HandlerError>
where
    R: FullRepository + ?Sized,
    F: FnOnce(RepositoryError) -> HandlerError,
{
    if services::post_exists(repo, id).await.map_err(on_failure)? {
        Ok(())
    } else {
        Err(HandlerError::NotFound(id.to_string()))
    }
}

/// `GET /posts`
pub async fn list_posts<R: FullRepository + ?Sized>(repo: &R, request: &ApiRequest) -> ApiResponse {
    respond(LIST_POSTS, try_list_posts(repo, request).await)
}

async fn try_list_posts<R: FullRepository + ?Sized>(repo: &R, request: &ApiRequest) -> HandlerResult {
    let filter = PostFilter::from(request.query.clone());
    let posts = repo.find(&filter).await.map_err(storage(POSTS_NOT_RETRIEVED))?;
    Ok(ApiResponse::ok(&posts))
}

/// `GET /posts/:id`
pub async fn get_post<R: FullRepository + ?Sized>(repo: &R, request: &ApiRequest) -> ApiResponse {
    respond(GET_POST, try_get_post(repo, request).await)
}

async fn try_get_post<R: FullRepository + ?Sized>(repo: &R, request: &ApiRequest) -> HandlerResult {
    let id = path_post_id(request)?;
    match repo.find_by_id(id).await.map_err(storage(POST_NOT_RETRIEVED))? {
        Some(post) => Ok(ApiResponse::ok(&post)),
        None => Err(HandlerError::NotFound(id.to_string())),
    }
}

/// `GET /posts/:id/comments`
pub async fn list_post_comments<R: FullRepository + ?Sized>(
    repo: &R,
    request: &ApiRequest,
) -> ApiResponse {
    respond(LIST_POST_COMMENTS, try_list_post_comments(repo, request).await)
}

async fn try_list_post_comments<R: FullRepository + ?Sized>(
    repo: &R,
    request: &ApiRequest,
) -> HandlerResult {
    let id = path_post_id(request)?;
    require_post(repo, id, storage(POST_NOT_RETRIEVED)).await?;
    let comments = repo
        .find_post_comments(id)
        .await
        .map_err(storage(POST_NOT_RETRIEVED))?;
    Ok(ApiResponse::ok(&comments))
}

/// `POST /posts`
pub async fn create_post<R: FullRepository + ?Sized>(repo: &R, request: &ApiRequest) -> ApiResponse {
    respond(CREATE_POST, try_create_post(repo, request).await)
}

async fn try_create_post<R: FullRepository + ?Sized>(repo: &R, request: &ApiRequest) -> HandlerResult {
    let [title, contents] = required_texts(request, ["title", "contents"])
        .ok_or(HandlerError::Validation(MISSING_POST_FIELDS))?;

    let post = repo
        .insert(&NewPost { title, contents })
        .await
        .map_err(storage(POST_NOT_SAVED))?;
    Ok(ApiResponse::created(&post))
}

/// `POST /posts/:id/comments`
///
/// The comment's `post_id` always comes from the path, never the body.
pub async fn create_comment<R: FullRepository + ?Sized>(
    repo: &R,
    request: &ApiRequest,
) -> ApiResponse {
    respond(CREATE_COMMENT, try_create_comment(repo, request).await)
}

async fn try_create_comment<R: FullRepository + ?Sized>(
    repo: &R,
    request: &ApiRequest,
) -> HandlerResult {
    let text = required_text(request, "text")
        .ok_or(HandlerError::Validation(MISSING_COMMENT_TEXT))?;
    let post_id = path_post_id(request)?;

    require_post(repo, post_id, |source| {
        HandlerError::storage_with_diagnostics(COMMENT_NOT_SAVED, source)
    })
    .await?;

    let comment = repo
        .insert_comment(&NewComment { text, post_id })
        .await
        .map_err(|source| HandlerError::storage_with_diagnostics(COMMENT_NOT_SAVED, source))?;
    Ok(ApiResponse::created(&comment))
}

/// `PUT /posts/:id`
///
/// Responds with the record as re-read after the update.
pub async fn update_post<R: FullRepository + ?Sized>(repo: &R, request: &ApiRequest) -> ApiResponse {
    respond(UPDATE_POST, try_update_post(repo, request).await)
}

async fn try_update_post<R: FullRepository + ?Sized>(repo: &R, request: &ApiRequest) -> HandlerResult {
    let [title, contents] = required_texts(request, ["title", "contents"])
        .ok_or(HandlerError::Validation(MISSING_POST_FIELDS))?;
    let id = path_post_id(request)?;

    require_post(repo, id, storage(POST_NOT_MODIFIED)).await?;

    let changes = PostChanges::from(NewPost { title, contents });
    repo.update(id, &changes)
        .await
        .map_err(storage(POST_NOT_MODIFIED))?;

    // a concurrent delete can slip in between the update and the re-read
    let refreshed = repo
        .find_by_id(id)
        .await
        .map_err(storage(POST_NOT_MODIFIED))?
        .ok_or_else(|| {
            HandlerError::storage(
                POST_NOT_MODIFIED,
                RepositoryError::not_found_with_context(
                    "post vanished after update",
                    ErrorContext::for_post("find_by_id", id),
                ),
            )
        })?;
    Ok(ApiResponse::ok(&refreshed))
}

/// `DELETE /posts/:id`
pub async fn delete_post<R: FullRepository + ?Sized>(repo: &R, request: &ApiRequest) -> ApiResponse {
    respond(DELETE_POST, try_delete_post(repo, request).await)
}

async fn try_delete_post<R: FullRepository + ?Sized>(repo: &R, request: &ApiRequest) -> HandlerResult {
    let id = path_post_id(request)?;
    require_post(repo, id, storage(POST_NOT_RETRIEVED)).await?;
    repo.remove(id).await.map_err(storage(POST_NOT_RETRIEVED))?;
    Ok(ApiResponse::no_content())
}
