//! Service layer for the vote4goat service
//!
//! This module contains the main application state, the client-facing
//! voting facade and health reporting.

pub mod app;
pub mod health;
pub mod voting;

pub use app::{AppState, ServiceError};
pub use health::{ComponentCheck, HealthCheck, HealthStatus, ServiceStats};
pub use voting::VotingService;
