//! Ranking table reads
//!
//! Entities are ordered by descending rating with ties broken by ascending
//! id, so the order is total and a longer page always extends a shorter one.

use crate::config::RankingSettings;
use crate::error::{Result, VoteError};
use crate::metrics::MetricsCollector;
use crate::storage::Storage;
use crate::types::{CategoryId, RankedEntity, RankingPage, RatedEntity, Sport};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::debug;

/// Sort entities into ranking order
pub fn order_by_rating(entities: &mut [RatedEntity]) {
    entities.sort_by(|a, b| {
        b.rating
            .rating
            .partial_cmp(&a.rating.rating)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.entity.id.cmp(&b.entity.id))
    });
}

/// A category's entities in ranking order, truncated to `limit` when given.
///
/// Fails with `NotFound` when the category is unknown.
pub fn ordered_pool(
    storage: &dyn Storage,
    category_id: CategoryId,
    limit: Option<usize>,
) -> Result<Vec<RatedEntity>> {
    if !storage.category_exists(category_id)? {
        return Err(VoteError::not_found("category", category_id));
    }

    let mut pool = storage.category_snapshot(category_id)?;
    order_by_rating(&mut pool);
    if let Some(limit) = limit {
        pool.truncate(limit);
    }

    Ok(pool)
}

/// Reads paginated ranking tables
pub struct RankingReader {
    storage: Arc<dyn Storage>,
    settings: RankingSettings,
    metrics: Option<Arc<MetricsCollector>>,
}

impl RankingReader {
    pub fn new(storage: Arc<dyn Storage>, settings: RankingSettings) -> Self {
        Self {
            storage,
            settings,
            metrics: None,
        }
    }

    /// Attach a metrics collector
    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn settings(&self) -> &RankingSettings {
        &self.settings
    }

    /// Read the top `limit` entities of a category.
    ///
    /// `None` uses the configured default limit; larger limits than the
    /// configured maximum are clamped and zero is rejected.
    pub fn list_ranking(&self, category_id: CategoryId, limit: Option<usize>) -> Result<RankingPage> {
        let limit = match limit {
            Some(0) => {
                return Err(VoteError::validation("ranking limit must be at least 1"));
            }
            Some(limit) => limit.min(self.settings.max_limit),
            None => self.settings.default_limit,
        };

        // One extra row tells whether more entities exist past this page
        let mut pool = ordered_pool(self.storage.as_ref(), category_id, Some(limit + 1))?;
        let more_available = pool.len() > limit;
        pool.truncate(limit);

        let entries: Vec<RankedEntity> = pool
            .into_iter()
            .enumerate()
            .map(|(index, rated)| RankedEntity {
                rank: index as u32 + 1,
                rating: rated.rating.rating,
                wins: rated.rating.wins,
                losses: rated.rating.losses,
                entity: rated.entity,
            })
            .collect();

        let next_limit = if more_available && limit < self.settings.show_more_cap {
            Some((limit + self.settings.page_step).min(self.settings.show_more_cap))
        } else {
            None
        };

        let sport = Sport::from_category_id(category_id);
        if let Some(metrics) = &self.metrics {
            metrics.record_ranking_read(sport);
        }

        debug!(
            "Ranking read - category: {}, limit: {}, rows: {}, next_limit: {:?}",
            category_id,
            limit,
            entries.len(),
            next_limit
        );

        Ok(RankingPage {
            category_id,
            sport,
            limit,
            entries,
            has_more: next_limit.is_some(),
            next_limit,
        })
    }
}
