//! Data Transfer Objects owned by the HTTP layer.
//!
//! Post and comment payloads are the records from [`crate::api`]; only the
//! service-level endpoints need types of their own.

use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Database connection status
    pub database: String,
}
