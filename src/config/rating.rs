//! Rating and vote-commit configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Elo parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingSettings {
    /// Maximum rating change per vote
    pub k_factor: f64,
    /// Rating assigned to newly created entities
    pub initial_rating: f64,
}

impl Default for RatingSettings {
    fn default() -> Self {
        Self {
            k_factor: 32.0,
            initial_rating: 1500.0,
        }
    }
}

/// Retry and timeout policy for committing votes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VotingSettings {
    /// Commit attempts before a conflict is surfaced to the caller
    pub max_retry_attempts: u32,
    /// First backoff delay in milliseconds, doubled after each conflict
    pub retry_base_delay_ms: u64,
    /// Upper bound for a single backoff delay
    pub retry_max_delay_ms: u64,
    /// Upper bound for the whole vote transaction
    pub transaction_timeout_ms: u64,
}

impl Default for VotingSettings {
    fn default() -> Self {
        Self {
            max_retry_attempts: 5,
            retry_base_delay_ms: 5,
            retry_max_delay_ms: 200,
            transaction_timeout_ms: 2000,
        }
    }
}

impl VotingSettings {
    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    pub fn retry_max_delay(&self) -> Duration {
        Duration::from_millis(self.retry_max_delay_ms)
    }

    pub fn transaction_timeout(&self) -> Duration {
        Duration::from_millis(self.transaction_timeout_ms)
    }
}
