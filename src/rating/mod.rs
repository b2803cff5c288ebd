//! Rating system integration using the Elo algorithm
//!
//! This module provides rating calculations and the vote updater that commits
//! them, built on the skillratings crate.

pub mod calculator;
pub mod elo;
pub mod updater;

// Re-export commonly used types
pub use calculator::{RatingCalculator, VoteRatingResult};
pub use elo::{EloRatingCalculator, ExtendedEloConfig};
pub use updater::{RatingUpdater, RetryPolicy};
