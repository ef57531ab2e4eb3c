//! # Posts API
//!
//! A small REST service managing blog posts and the comments attached to them.
//!
//! ## Architecture
//!
//! - [`api`]: Record types (posts, comments, ids, filters)
//! - [`db`]: Repository traits, storage backends and the global repository
//! - [`routes`]: Transport-neutral handlers with validation and status mapping
//! - [`http`]: Axum server adapting HTTP requests onto [`routes`]
//! - [`config`]: Server settings from the environment
//!
//! ## Storage backends
//!
//! - `local-repo` (default): in-memory store
//! - `postgres-repo`: Diesel over an r2d2 connection pool

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;
pub mod config;
pub mod db;
pub mod routes;

#[cfg(feature = "http-server")]
pub mod http;
