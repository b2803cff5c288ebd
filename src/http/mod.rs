//! HTTP API
//!
//! Exposes the voting operations as JSON endpoints next to the health endpoints
//! and the Prometheus scrape endpoint.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;

pub use auth::CurrentUser;
pub use error::{ApiError, ApiResult};
pub use server::{create_router, ApiServer, ApiServerConfig};
