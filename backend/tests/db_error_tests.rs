//! Tests for db::repository::error module.

use posts_api::api::PostId;
use posts_api::db::repository::{ErrorContext, RepositoryError, RepositoryResult};

#[test]
fn test_error_context_new() {
    let ctx = ErrorContext::new("find_by_id");
    assert_eq!(ctx.operation, Some("find_by_id".to_string()));
    assert!(ctx.entity.is_none());
    assert!(ctx.entity_id.is_none());
    assert!(ctx.details.is_none());
    assert!(!ctx.retryable);
}

#[test]
fn test_error_context_for_post() {
    let ctx = ErrorContext::for_post("remove", PostId(7));
    assert_eq!(ctx.entity, Some("post".to_string()));
    assert_eq!(ctx.entity_id, Some("7".to_string()));
}

#[test]
fn test_error_context_chaining() {
    let ctx = ErrorContext::new("insert_comment")
        .with_entity("comment")
        .with_entity_id(42)
        .with_details("timeout occurred")
        .retryable();

    assert_eq!(ctx.operation, Some("insert_comment".to_string()));
    assert_eq!(ctx.entity, Some("comment".to_string()));
    assert_eq!(ctx.entity_id, Some("42".to_string()));
    assert_eq!(ctx.details, Some("timeout occurred".to_string()));
    assert!(ctx.retryable);
}

#[test]
fn test_error_context_display() {
    let ctx = ErrorContext::new("test_op")
        .with_entity("test_entity")
        .with_entity_id("123")
        .with_details("extra info")
        .retryable();

    let display = format!("{}", ctx);
    assert!(display.contains("operation=test_op"));
    assert!(display.contains("entity=test_entity"));
    assert!(display.contains("id=123"));
    assert!(display.contains("details=extra info"));
    assert!(display.contains("retryable=true"));
}

#[test]
fn test_error_context_default() {
    let ctx = ErrorContext::default();
    assert!(ctx.operation.is_none());
    assert!(!ctx.retryable);
    assert_eq!(ctx.to_string(), "[]");
}

#[test]
fn test_repository_error_messages() {
    let cases = [
        (
            RepositoryError::connection_with_context("connection failed", ErrorContext::default()),
            "Connection error",
        ),
        (RepositoryError::query("invalid SQL"), "Query error"),
        (RepositoryError::not_found("post missing"), "Not found"),
        (RepositoryError::configuration("missing config"), "Configuration error"),
        (RepositoryError::internal("unexpected state"), "Internal error"),
    ];
    for (err, prefix) in cases {
        assert!(err.to_string().starts_with(prefix), "{err}");
    }
}

#[test]
fn test_repository_error_connection_with_context() {
    let ctx = ErrorContext::new("connect").with_entity("database");
    let err = RepositoryError::connection_with_context("failed to connect", ctx);
    let err_str = err.to_string();
    assert!(err_str.contains("failed to connect"));
    assert!(err_str.contains("operation=connect"));
}

#[test]
fn test_repository_error_retryability() {
    let down = RepositoryError::connection_with_context("temp failure", ErrorContext::new("find"));
    assert!(down.is_retryable());
    assert!(down.context().retryable);
    assert!(!RepositoryError::not_found("missing").is_retryable());
    assert!(!RepositoryError::configuration("bad").is_retryable());
}

#[test]
fn test_repository_error_with_operation_and_post() {
    let err = RepositoryError::query("error")
        .with_operation("update")
        .with_post(PostId(3));
    let err_str = err.to_string();
    assert!(err_str.contains("operation=update"));
    assert!(err_str.contains("entity=post"));
    assert!(err_str.contains("id=3"));
    assert_eq!(err.context().entity_id.as_deref(), Some("3"));
}

#[test]
fn test_repository_error_internal_keeps_context() {
    let err = RepositoryError::internal_with_context(
        "join failed",
        ErrorContext::for_post("update", PostId(9)),
    );
    assert!(matches!(err, RepositoryError::Internal { .. }));
    assert!(!err.is_retryable());
    assert_eq!(err.context().operation.as_deref(), Some("update"));
}

#[test]
fn test_repository_result_err() {
    let result: RepositoryResult<i32> = Err(RepositoryError::not_found("test"));
    assert!(result.is_err());
}
