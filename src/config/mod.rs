//! Configuration management for the vote4goat service
//!
//! This module handles configuration loading from TOML files and environment
//! variables, validation, and default values.

pub mod app;
pub mod rating;

// Re-export commonly used types
pub use app::{
    validate_config, AppConfig, DuelSettings, DuelStrategy, RankingSettings, ServiceSettings,
};
pub use rating::{RatingSettings, VotingSettings};
