//! Client-facing voting operations
//!
//! [`VotingService`] wires storage, the rating engine, duel selection,
//! rankings, Top-10 lists and accounts together behind the operations the
//! HTTP API exposes.

use crate::accounts::{ProfileService, SessionAuthenticator};
use crate::config::AppConfig;
use crate::duel::{selector_for, DuelMaker, DuelSelector};
use crate::error::{Result, VoteError};
use crate::metrics::MetricsCollector;
use crate::ranking::RankingReader;
use crate::rating::{EloRatingCalculator, ExtendedEloConfig, RatingCalculator, RatingUpdater, RetryPolicy};
use crate::storage::Storage;
use crate::top10::{Top10CategoryView, Top10Service};
use crate::types::{
    CategoryId, Duel, Entity, EntityId, NewProfile, ProfileView, RankingPage, Top10CategoryId,
    Top10Submission, Top10SubmissionRequest, UserId, UserProfile, VoteHistoryEntry, VoteOutcome,
    VoteRequest,
};
use std::sync::Arc;
use tracing::debug;

/// Facade over every client operation
pub struct VotingService {
    storage: Arc<dyn Storage>,
    updater: RatingUpdater,
    duels: DuelMaker,
    rankings: RankingReader,
    top10: Top10Service,
    profiles: ProfileService,
    authenticator: Arc<dyn SessionAuthenticator>,
    metrics: Arc<MetricsCollector>,
}

impl VotingService {
    /// Build the service from configuration with the configured duel selector
    pub fn new(
        config: &AppConfig,
        storage: Arc<dyn Storage>,
        authenticator: Arc<dyn SessionAuthenticator>,
        metrics: Arc<MetricsCollector>,
    ) -> Result<Self> {
        Self::with_selector(config, storage, authenticator, metrics, selector_for(&config.duel))
    }

    /// Build the service with an explicit duel selector
    pub fn with_selector(
        config: &AppConfig,
        storage: Arc<dyn Storage>,
        authenticator: Arc<dyn SessionAuthenticator>,
        metrics: Arc<MetricsCollector>,
        selector: Arc<dyn DuelSelector>,
    ) -> Result<Self> {
        let calculator: Arc<dyn RatingCalculator> =
            Arc::new(EloRatingCalculator::new(ExtendedEloConfig::new(
                config.rating.k_factor,
                config.rating.initial_rating,
            ))?);

        let updater = RatingUpdater::new(
            storage.clone(),
            calculator,
            RetryPolicy::from(&config.voting),
        )
        .with_metrics(metrics.clone());
        let duels = DuelMaker::new(storage.clone(), selector).with_metrics(metrics.clone());
        let rankings =
            RankingReader::new(storage.clone(), config.ranking.clone()).with_metrics(metrics.clone());
        let top10 = Top10Service::new(storage.clone()).with_metrics(metrics.clone());
        let profiles = ProfileService::new(storage.clone());

        debug!(
            "Voting service ready - k: {}, baseline: {}, selector: {}",
            config.rating.k_factor,
            config.rating.initial_rating,
            duels.selector_name()
        );

        Ok(Self {
            storage,
            updater,
            duels,
            rankings,
            top10,
            profiles,
            authenticator,
            metrics,
        })
    }

    pub fn storage(&self) -> Arc<dyn Storage> {
        self.storage.clone()
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    /// Resolve an optional bearer token.
    ///
    /// No token means an anonymous caller; an unknown token is rejected.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<Option<UserId>> {
        match token {
            Some(token) => self.authenticator.require_user(token).await.map(Some),
            None => Ok(None),
        }
    }

    pub fn get_duel(&self, category_id: CategoryId, rank_limit: Option<usize>) -> Result<Duel> {
        self.timed("get_duel", || self.duels.get_duel(category_id, rank_limit))
    }

    pub fn get_manual_duel(&self, first_id: EntityId, second_id: EntityId) -> Result<Duel> {
        self.timed("get_manual_duel", || {
            self.duels.get_manual_duel(first_id, second_id)
        })
    }

    /// Record a vote and update both ratings
    pub async fn vote(&self, request: VoteRequest) -> Result<VoteOutcome> {
        let timer = self.metrics.start_timer();
        let result = self.updater.record_vote(request).await;
        self.metrics.record_operation("vote", timer.stop());
        result
    }

    pub fn list_ranking(&self, category_id: CategoryId, limit: Option<usize>) -> Result<RankingPage> {
        self.timed("list_ranking", || self.rankings.list_ranking(category_id, limit))
    }

    pub fn list_top10_categories(&self, sport: Option<CategoryId>) -> Result<Vec<Top10CategoryView>> {
        self.top10.list_categories(sport)
    }

    pub fn list_top10_candidates(&self, id: Top10CategoryId) -> Result<Vec<Entity>> {
        self.timed("list_top10_candidates", || self.top10.list_candidates(id))
    }

    pub fn submit_top10(&self, request: Top10SubmissionRequest) -> Result<Top10Submission> {
        self.timed("submit_top10", || self.top10.submit(request))
    }

    pub fn register_profile(&self, user_id: UserId, new_profile: NewProfile) -> Result<UserProfile> {
        self.profiles.register_profile(user_id, new_profile)
    }

    pub fn get_profile(&self, user_id: UserId) -> Result<ProfileView> {
        self.profiles.get_profile(user_id)
    }

    pub fn set_votes_visible(&self, owner: UserId, visible: bool) -> Result<UserProfile> {
        self.profiles.set_votes_visible(owner, visible)
    }

    pub fn vote_history(&self, viewer: Option<UserId>, subject: UserId) -> Result<Vec<VoteHistoryEntry>> {
        self.profiles.vote_history(viewer, subject)
    }

    /// Require an authenticated caller
    pub fn require_user(user: Option<UserId>) -> Result<UserId> {
        user.ok_or_else(|| VoteError::Unauthorized {
            reason: "sign in required".to_string(),
        })
    }

    fn timed<T>(&self, operation: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let timer = self.metrics.start_timer();
        let result = f();
        self.metrics.record_operation(operation, timer.stop());
        result
    }
}
