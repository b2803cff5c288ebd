//! Rating calculator trait
//!
//! This module defines the interface for turning a head-to-head vote into
//! new ratings for the winner and the loser.

use crate::types::{EntityId, RatingChange};
use serde::{Deserialize, Serialize};

/// Result of a rating calculation for one vote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteRatingResult {
    pub winner: RatingChange,
    pub loser: RatingChange,
    /// Probability the winner had of winning before the vote
    pub winner_expected_score: f64,
}

impl VoteRatingResult {
    /// Sum of both rating deltas, zero for a conserving system
    pub fn net_change(&self) -> f64 {
        self.winner.delta() + self.loser.delta()
    }
}

/// Trait for calculating rating changes after votes
#[cfg_attr(test, mockall::automock)]
pub trait RatingCalculator: Send + Sync {
    /// Calculate new ratings after `winner` beat `loser`
    ///
    /// # Arguments
    /// * `winner` - (entity_id, current_rating) of the chosen entity
    /// * `loser` - (entity_id, current_rating) of the other entity
    fn calculate_vote(
        &self,
        winner: (EntityId, f64),
        loser: (EntityId, f64),
    ) -> crate::error::Result<VoteRatingResult>;

    /// Probability that an entity rated `rating` beats one rated `opponent`
    fn expected_score(&self, rating: f64, opponent: f64) -> f64;

    /// Rating assigned to new entities
    fn initial_rating(&self) -> f64;

    /// Get current configuration as JSON
    fn config(&self) -> serde_json::Value;
}
