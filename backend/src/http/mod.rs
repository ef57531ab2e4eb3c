//! HTTP server module.
//!
//! Exposes the post and comment handlers from [`crate::routes`] as a REST API
//! on axum. The handlers themselves are transport-neutral; this layer only
//! turns extractors into an [`ApiRequest`](crate::routes::ApiRequest) and
//! renders the resulting [`ApiResponse`](crate::routes::ApiResponse).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum adapters)                               │
//! │  - Path/query/body extraction                             │
//! │  - CORS, compression, tracing                             │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Handler Layer (routes::posts)                            │
//! │  - Validation, existence checks, status mapping           │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Repository Layer (db/)                                   │
//! │  - LocalRepository / PostgresRepository                   │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod dto;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
