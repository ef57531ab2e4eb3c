//! Transport-neutral request and response values.
//!
//! Handlers in [`super::posts`] consume an [`ApiRequest`] and produce an
//! [`ApiResponse`], so they can be driven directly from tests without a
//! network stack. The HTTP layer builds the former from extractors and renders
//! the latter.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::{Map, Value};

/// Response status codes the handler layer can emit.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Status {
    Ok,
    Created,
    NoContent,
    BadRequest,
    NotFound,
    InternalServerError,
}

impl Status {
    /// Numeric HTTP status code.
    pub fn code(self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::Created => 201,
            Status::NoContent => 204,
            Status::BadRequest => 400,
            Status::NotFound => 404,
            Status::InternalServerError => 500,
        }
    }

    pub fn is_success(self) -> bool {
        self.code() < 300
    }
}

/// An inbound request: path parameters, query parameters and JSON body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiRequest {
    pub params: HashMap<String, String>,
    pub query: BTreeMap<String, String>,
    pub body: Value,
}

impl ApiRequest {
    pub fn new() -> Self {
        Self {
            body: Value::Object(Map::new()),
            ..Default::default()
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_query(mut self, query: BTreeMap<String, String>) -> Self {
        self.query = query;
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Look up a top-level body field. A non-object body has no fields.
    pub fn body_field(&self, key: &str) -> Option<&Value> {
        self.body.as_object().and_then(|fields| fields.get(key))
    }
}

/// An outbound response. `body` is `None` for 204 No Content.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: Status,
    pub body: Option<Value>,
}

impl ApiResponse {
    pub fn new(status: Status, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    pub fn no_content() -> Self {
        Self {
            status: Status::NoContent,
            body: None,
        }
    }

    pub fn ok<T: Serialize>(payload: &T) -> Self {
        Self::from_payload(Status::Ok, payload)
    }

    pub fn created<T: Serialize>(payload: &T) -> Self {
        Self::from_payload(Status::Created, payload)
    }

    fn from_payload<T: Serialize>(status: Status, payload: &T) -> Self {
        match serde_json::to_value(payload) {
            Ok(body) => Self::new(status, body),
            // Record types are plain data; this only fires on a programming error.
            Err(e) => Self::new(
                Status::InternalServerError,
                serde_json::json!({ "error": format!("Failed to serialize response: {}", e) }),
            ),
        }
    }

    /// A string field of the body, for assertions and logging.
    pub fn body_str(&self, key: &str) -> Option<&str> {
        self.body.as_ref()?.get(key)?.as_str()
    }
}
