//! Storage failures.
//!
//! A [`RepositoryError`] names what kind of failure happened; its
//! [`ErrorContext`] says which store call and which post it happened on, so
//! the 500 logged by the handler layer points at the call that broke.

use std::fmt;

use crate::api::PostId;

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Where a storage failure happened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// Store call, e.g. `insert_comment`.
    pub operation: Option<String>,
    /// `post` or `comment`.
    pub entity: Option<String>,
    pub entity_id: Option<String>,
    pub details: Option<String>,
    /// Set when replaying the call may succeed.
    pub retryable: bool,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    /// `operation` applied to post `id`.
    pub fn for_post(operation: impl Into<String>, id: PostId) -> Self {
        Self::new(operation).with_entity("post").with_entity_id(id)
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    pub fn with_entity_id(mut self, id: impl ToString) -> Self {
        self.entity_id = Some(id.to_string());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }
}

/// Renders as `[operation=.., entity=.., id=.., details=..]`, skipping unset fields.
impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = [
            ("operation", self.operation.as_deref()),
            ("entity", self.entity.as_deref()),
            ("id", self.entity_id.as_deref()),
            ("details", self.details.as_deref()),
            ("retryable", self.retryable.then_some("true")),
        ];
        let rendered: Vec<String> = fields
            .iter()
            .filter_map(|(key, value)| value.map(|v| format!("{}={}", key, v)))
            .collect();
        write!(f, "[{}]", rendered.join(", "))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// The store could not be reached. Retryable.
    #[error("Connection error: {message} {context}")]
    Connection {
        message: String,
        context: ErrorContext,
    },

    #[error("Query error: {message} {context}")]
    Query {
        message: String,
        context: ErrorContext,
    },

    #[error("Not found: {message} {context}")]
    NotFound {
        message: String,
        context: ErrorContext,
    },

    /// Bad or missing backend settings; raised before any store call.
    #[error("Configuration error: {message} {context}")]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Internal error: {message} {context}")]
    Internal {
        message: String,
        context: ErrorContext,
    },
}

impl RepositoryError {
    /// Connection failures are always marked retryable.
    pub fn connection_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::Connection {
            message: message.into(),
            context: context.retryable(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::query_with_context(message, ErrorContext::default())
    }

    pub fn query_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::Query {
            message: message.into(),
            context,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::not_found_with_context(message, ErrorContext::default())
    }

    pub fn not_found_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::NotFound {
            message: message.into(),
            context,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::internal_with_context(message, ErrorContext::default())
    }

    pub fn internal_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::Internal {
            message: message.into(),
            context,
        }
    }

    /// Only connection and query failures can be replayed, and only when
    /// their context says so.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Connection { context, .. } | Self::Query { context, .. } => context.retryable,
            _ => false,
        }
    }

    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::Connection { context, .. }
            | Self::Query { context, .. }
            | Self::NotFound { context, .. }
            | Self::Configuration { context, .. }
            | Self::Internal { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::Connection { context, .. }
            | Self::Query { context, .. }
            | Self::NotFound { context, .. }
            | Self::Configuration { context, .. }
            | Self::Internal { context, .. } => context,
        }
    }

    /// Stamp the store call name, replacing any earlier one.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context_mut().operation = Some(operation.into());
        self
    }

    pub fn with_post(mut self, id: PostId) -> Self {
        let context = self.context_mut();
        context.entity = Some("post".to_string());
        context.entity_id = Some(id.to_string());
        self
    }
}

#[cfg(feature = "postgres-repo")]
impl From<diesel::result::Error> for RepositoryError {
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};

        match err {
            Error::NotFound => RepositoryError::not_found("Record not found"),
            Error::DatabaseError(kind, info) => {
                let mut context = ErrorContext::default().with_details(format!("{:?}", kind));
                if matches!(kind, DatabaseErrorKind::SerializationFailure) {
                    context = context.retryable();
                }
                RepositoryError::query_with_context(info.message(), context)
            }
            Error::DeserializationError(e) | Error::SerializationError(e) => {
                RepositoryError::internal(format!("Row conversion failed: {}", e))
            }
            other => RepositoryError::query(other.to_string()),
        }
    }
}

#[cfg(feature = "postgres-repo")]
impl From<diesel::r2d2::PoolError> for RepositoryError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        RepositoryError::connection_with_context(
            err.to_string(),
            ErrorContext::default().with_details("pool checkout"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_display() {
        let ctx = ErrorContext::for_post("remove", PostId::new(4)).with_details("boom");
        assert_eq!(
            ctx.to_string(),
            "[operation=remove, entity=post, id=4, details=boom]"
        );
        assert_eq!(ErrorContext::default().to_string(), "[]");
        assert_eq!(
            ErrorContext::default().retryable().to_string(),
            "[retryable=true]"
        );
    }

    #[test]
    fn test_only_marked_failures_are_retryable() {
        let down = RepositoryError::connection_with_context("down", ErrorContext::new("find"));
        assert!(down.is_retryable());
        let deadlock =
            RepositoryError::query_with_context("deadlock", ErrorContext::default().retryable());
        assert!(deadlock.is_retryable());
        assert!(!RepositoryError::query("bad sql").is_retryable());
        assert!(!RepositoryError::internal("bug").is_retryable());
    }

    #[test]
    fn test_with_operation_and_post() {
        let err = RepositoryError::query("bad")
            .with_operation("update")
            .with_post(PostId::new(2));
        let ctx = err.context();
        assert_eq!(ctx.operation.as_deref(), Some("update"));
        assert_eq!(ctx.entity.as_deref(), Some("post"));
        assert_eq!(ctx.entity_id.as_deref(), Some("2"));
        assert!(err.to_string().starts_with("Query error: bad"));
    }
}
