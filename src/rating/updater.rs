//! Atomic vote processing
//!
//! A vote reads both ratings with their versions, computes the Elo update
//! outside any lock and asks storage to commit. A version mismatch means a
//! concurrent vote touched one of the entities; the attempt is retried with
//! exponential backoff until the attempt budget or the transaction timeout
//! runs out.

use crate::config::VotingSettings;
use crate::error::{Result, VoteError};
use crate::metrics::MetricsCollector;
use crate::rating::calculator::RatingCalculator;
use crate::storage::{RatingUpdate, Storage, VoteCommit};
use crate::types::{CategoryId, Sport, VoteOutcome, VoteRecord, VoteRequest};
use crate::utils::{current_timestamp, generate_vote_id};
use rand::Rng;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

/// Retry policy for vote commits
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub transaction_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&VotingSettings::default())
    }
}

impl From<&VotingSettings> for RetryPolicy {
    fn from(settings: &VotingSettings) -> Self {
        Self {
            max_attempts: settings.max_retry_attempts.max(1),
            base_delay: settings.retry_base_delay(),
            max_delay: settings.retry_max_delay(),
            transaction_timeout: settings.transaction_timeout(),
        }
    }
}

/// Backoff delay with up to 50% random jitter added
fn jittered(delay: Duration) -> Duration {
    let max_jitter = delay.as_millis() as u64 / 2;
    if max_jitter == 0 {
        return delay;
    }
    delay + Duration::from_millis(rand::rng().random_range(0..=max_jitter))
}

/// Applies votes to entity ratings
pub struct RatingUpdater {
    storage: Arc<dyn Storage>,
    calculator: Arc<dyn RatingCalculator>,
    policy: RetryPolicy,
    metrics: Option<Arc<MetricsCollector>>,
}

impl RatingUpdater {
    pub fn new(
        storage: Arc<dyn Storage>,
        calculator: Arc<dyn RatingCalculator>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            storage,
            calculator,
            policy,
            metrics: None,
        }
    }

    /// Attach a metrics collector
    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Record a vote and update both ratings atomically
    pub async fn record_vote(&self, request: VoteRequest) -> Result<VoteOutcome> {
        let start_time = Instant::now();

        let result = match timeout(
            self.policy.transaction_timeout,
            self.commit_with_retry(&request),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(VoteError::Unavailable {
                message: format!(
                    "vote {} over {} exceeded {}ms",
                    request.winner_id,
                    request.loser_id,
                    self.policy.transaction_timeout.as_millis()
                ),
            }),
        };

        let elapsed = start_time.elapsed();
        match &result {
            Ok(outcome) => {
                info!(
                    "Vote committed - winner: {} ({:.1} -> {:.1}), loser: {} ({:.1} -> {:.1}), attempts: {}, time: {:.2}ms",
                    outcome.winner.entity_id,
                    outcome.winner.old_rating,
                    outcome.winner.new_rating,
                    outcome.loser.entity_id,
                    outcome.loser.old_rating,
                    outcome.loser.new_rating,
                    outcome.attempts,
                    elapsed.as_secs_f64() * 1000.0
                );
            }
            Err(e) => {
                warn!(
                    "Vote rejected - winner: {}, loser: {}, time: {:.2}ms, error: {}",
                    request.winner_id,
                    request.loser_id,
                    elapsed.as_secs_f64() * 1000.0,
                    e
                );
                if let Some(metrics) = &self.metrics {
                    metrics.record_vote_rejected(e);
                }
            }
        }

        result
    }

    /// Check the pair is two distinct known entities of one category
    fn validate_pair(&self, request: &VoteRequest) -> Result<CategoryId> {
        if request.winner_id == request.loser_id {
            return Err(VoteError::invalid_pair(format!(
                "winner and loser are the same entity {}",
                request.winner_id
            )));
        }

        let winner = self
            .storage
            .get_entity(request.winner_id)?
            .ok_or_else(|| VoteError::not_found("entity", request.winner_id))?;
        let loser = self
            .storage
            .get_entity(request.loser_id)?
            .ok_or_else(|| VoteError::not_found("entity", request.loser_id))?;

        if winner.category_id != loser.category_id {
            return Err(VoteError::invalid_pair(format!(
                "entity {} is in category {} but entity {} is in category {}",
                winner.id, winner.category_id, loser.id, loser.category_id
            )));
        }

        Ok(winner.category_id)
    }

    async fn commit_with_retry(&self, request: &VoteRequest) -> Result<VoteOutcome> {
        let category_id = self.validate_pair(request)?;

        let mut delay = self.policy.base_delay;
        let mut attempt = 0;

        loop {
            attempt += 1;

            match self.try_commit(request, category_id, attempt) {
                Ok(outcome) => return Ok(outcome),
                Err(VoteError::Conflict { message }) => {
                    if attempt >= self.policy.max_attempts {
                        return Err(VoteError::Conflict {
                            message: format!(
                                "vote not committed after {} attempts: {}",
                                attempt, message
                            ),
                        });
                    }

                    debug!(
                        "Vote commit conflict (attempt {}/{}), retrying in {:?}: {}",
                        attempt, self.policy.max_attempts, delay, message
                    );
                    if let Some(metrics) = &self.metrics {
                        metrics.record_vote_retry();
                    }

                    sleep(jittered(delay)).await;
                    delay = (delay * 2).min(self.policy.max_delay);
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn try_commit(
        &self,
        request: &VoteRequest,
        category_id: CategoryId,
        attempt: u32,
    ) -> Result<VoteOutcome> {
        let winner = self
            .storage
            .get_rating(request.winner_id)?
            .ok_or_else(|| VoteError::not_found("rating", request.winner_id))?;
        let loser = self
            .storage
            .get_rating(request.loser_id)?
            .ok_or_else(|| VoteError::not_found("rating", request.loser_id))?;

        let calc_start = Instant::now();
        let result = self.calculator.calculate_vote(
            (request.winner_id, winner.rating),
            (request.loser_id, loser.rating),
        )?;
        if let Some(metrics) = &self.metrics {
            metrics.record_rating_calculation(calc_start.elapsed());
        }

        let vote_id = generate_vote_id();
        let commit = VoteCommit {
            winner: RatingUpdate {
                entity_id: request.winner_id,
                expected_version: winner.version,
                new_rating: result.winner.new_rating,
            },
            loser: RatingUpdate {
                entity_id: request.loser_id,
                expected_version: loser.version,
                new_rating: result.loser.new_rating,
            },
            record: VoteRecord {
                id: vote_id,
                category_id,
                winner_id: request.winner_id,
                loser_id: request.loser_id,
                winner_rating_before: result.winner.old_rating,
                winner_rating_after: result.winner.new_rating,
                loser_rating_before: result.loser.old_rating,
                loser_rating_after: result.loser.new_rating,
                user_id: request.user_id,
                ip: request.ip.clone(),
                created_at: current_timestamp(),
            },
        };

        self.storage.commit_vote(commit)?;

        if let Some(metrics) = &self.metrics {
            metrics.record_vote_committed(Sport::from_category_id(category_id), result.winner.delta());
        }

        Ok(VoteOutcome {
            vote_id,
            winner: result.winner,
            loser: result.loser,
            attempts: attempt,
        })
    }
}
