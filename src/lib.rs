//! vote4goat - Head-to-head athlete voting service
//!
//! Visitors are shown duels between two athletes of the same sport and pick
//! a winner. Every vote updates both athletes' Elo ratings atomically, and the
//! ratings drive per-sport ranking tables. Users can also submit ordered
//! Top-10 lists for themed categories.

pub mod accounts;
pub mod config;
pub mod duel;
pub mod error;
pub mod http;
pub mod metrics;
pub mod ranking;
pub mod rating;
pub mod service;
pub mod storage;
pub mod top10;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{Result, VoteError};
pub use types::*;

// Re-export key components
pub use duel::{DuelMaker, DuelSelector};
pub use rating::{RatingCalculator, RatingUpdater};
pub use service::{AppState, VotingService};
pub use storage::{InMemoryStorage, Storage};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
