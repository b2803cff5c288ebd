//! Elo rating system implementation
//!
//! This module provides a concrete implementation of the rating calculator
//! using the Elo algorithm from the skillratings crate. With the default
//! K-factor of 32, two entities at 1500 move to 1516 and 1484 after a vote.

use crate::error::VoteError;
use crate::rating::calculator::{RatingCalculator, VoteRatingResult};
use crate::types::{EntityId, RatingChange};
use serde::{Deserialize, Serialize};
use skillratings::elo::{elo, expected_score, EloConfig, EloRating};
use skillratings::Outcomes;

/// Extended configuration for the Elo rating system
/// This wraps the skillratings EloConfig with the baseline for new entities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtendedEloConfig {
    /// Core Elo parameters
    pub elo_config: EloConfig,
    /// Initial rating for new entities
    pub initial_rating: f64,
}

impl Default for ExtendedEloConfig {
    fn default() -> Self {
        Self {
            elo_config: EloConfig { k: 32.0 },
            initial_rating: 1500.0,
        }
    }
}

impl ExtendedEloConfig {
    pub fn new(k_factor: f64, initial_rating: f64) -> Self {
        Self {
            elo_config: EloConfig { k: k_factor },
            initial_rating,
        }
    }

    /// Create conservative configuration (slower rating changes)
    pub fn conservative() -> Self {
        Self::new(16.0, 1500.0)
    }

    /// Create aggressive configuration (faster rating changes)
    pub fn aggressive() -> Self {
        Self::new(48.0, 1500.0)
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> crate::error::Result<()> {
        if !self.elo_config.k.is_finite() || self.elo_config.k <= 0.0 {
            return Err(VoteError::Configuration {
                message: "K-factor must be positive".to_string(),
            });
        }

        if !self.initial_rating.is_finite() {
            return Err(VoteError::Configuration {
                message: "Initial rating must be finite".to_string(),
            });
        }

        Ok(())
    }
}

/// Elo rating calculator implementation
#[derive(Debug)]
pub struct EloRatingCalculator {
    config: ExtendedEloConfig,
}

impl EloRatingCalculator {
    /// Create a new Elo rating calculator
    pub fn new(config: ExtendedEloConfig) -> crate::error::Result<Self> {
        config.validate()?;

        Ok(Self { config })
    }

    pub fn k_factor(&self) -> f64 {
        self.config.elo_config.k
    }
}

impl RatingCalculator for EloRatingCalculator {
    fn calculate_vote(
        &self,
        winner: (EntityId, f64),
        loser: (EntityId, f64),
    ) -> crate::error::Result<VoteRatingResult> {
        let (winner_id, winner_rating) = winner;
        let (loser_id, loser_rating) = loser;

        if winner_id == loser_id {
            return Err(VoteError::invalid_pair(format!(
                "entity {} cannot beat itself",
                winner_id
            )));
        }
        if !winner_rating.is_finite() || !loser_rating.is_finite() {
            return Err(VoteError::validation(format!(
                "non-finite rating for pair {} vs {}",
                winner_id, loser_id
            )));
        }

        let winner_elo = EloRating {
            rating: winner_rating,
        };
        let loser_elo = EloRating {
            rating: loser_rating,
        };

        let (winner_expected, _) = expected_score(&winner_elo, &loser_elo);
        let (new_winner, new_loser) = elo(
            &winner_elo,
            &loser_elo,
            &Outcomes::WIN,
            &self.config.elo_config,
        );

        Ok(VoteRatingResult {
            winner: RatingChange {
                entity_id: winner_id,
                old_rating: winner_rating,
                new_rating: new_winner.rating,
            },
            loser: RatingChange {
                entity_id: loser_id,
                old_rating: loser_rating,
                new_rating: new_loser.rating,
            },
            winner_expected_score: winner_expected,
        })
    }

    fn expected_score(&self, rating: f64, opponent: f64) -> f64 {
        let (expected, _) = expected_score(
            &EloRating { rating },
            &EloRating { rating: opponent },
        );
        expected
    }

    fn initial_rating(&self) -> f64 {
        self.config.initial_rating
    }

    fn config(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "elo",
            "k_factor": self.config.elo_config.k,
            "initial_rating": self.config.initial_rating
        })
    }
}
