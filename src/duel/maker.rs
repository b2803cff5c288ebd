//! Duel assembly
//!
//! Random duels draw from a category's ranking-ordered pool, optionally
//! restricted to its top `rank_limit` entities. Manual duels pair two
//! explicitly chosen entities after validating they may face each other.

use super::selector::DuelSelector;
use crate::error::{Result, VoteError};
use crate::metrics::MetricsCollector;
use crate::ranking::ordered_pool;
use crate::storage::Storage;
use crate::types::{CategoryId, Duel, DuelEntry, EntityId, RatedEntity, Sport};
use std::sync::Arc;
use tracing::debug;

/// Produces duels from storage using a pluggable selector
pub struct DuelMaker {
    storage: Arc<dyn Storage>,
    selector: Arc<dyn DuelSelector>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl DuelMaker {
    pub fn new(storage: Arc<dyn Storage>, selector: Arc<dyn DuelSelector>) -> Self {
        Self {
            storage,
            selector,
            metrics: None,
        }
    }

    /// Attach a metrics collector
    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn selector_name(&self) -> &'static str {
        self.selector.name()
    }

    /// Draw a random duel from a category.
    ///
    /// With `rank_limit` set only the top entities by rating are eligible.
    /// Fails with `NotFound` when the category is unknown or fewer than two
    /// entities are eligible.
    pub fn get_duel(&self, category_id: CategoryId, rank_limit: Option<usize>) -> Result<Duel> {
        let pool = ordered_pool(self.storage.as_ref(), category_id, rank_limit)?;
        if pool.len() < 2 {
            return Err(VoteError::not_found(
                "duel",
                format!("category {} has fewer than two eligible entities", category_id),
            ));
        }

        let (first, second) = self
            .selector
            .select_pair(&pool)
            .filter(|(a, b)| a != b && *a < pool.len() && *b < pool.len())
            .ok_or_else(|| {
                VoteError::not_found("duel", format!("no pair available in category {}", category_id))
            })?;

        let sport = Sport::from_category_id(category_id);
        if let Some(metrics) = &self.metrics {
            metrics.record_duel_served(sport, pool.len());
        }

        debug!(
            "Duel served - category: {}, pool: {}, selector: {}, pair: ({}, {})",
            category_id,
            pool.len(),
            self.selector.name(),
            pool[first].entity.id,
            pool[second].entity.id
        );

        Ok(Duel {
            category_id,
            sport,
            entries: [DuelEntry::from(&pool[first]), DuelEntry::from(&pool[second])],
        })
    }

    /// Build a duel between two chosen entities of the same category
    pub fn get_manual_duel(&self, first_id: EntityId, second_id: EntityId) -> Result<Duel> {
        if first_id == second_id {
            return Err(VoteError::invalid_pair(format!(
                "entity {} cannot face itself",
                first_id
            )));
        }

        let first = self.load(first_id)?;
        let second = self.load(second_id)?;
        if first.entity.category_id != second.entity.category_id {
            return Err(VoteError::invalid_pair(format!(
                "entities {} and {} belong to different categories",
                first_id, second_id
            )));
        }

        let category_id = first.entity.category_id;
        let sport = Sport::from_category_id(category_id);
        if let Some(metrics) = &self.metrics {
            metrics.record_duel_served(sport, 2);
        }

        Ok(Duel {
            category_id,
            sport,
            entries: [DuelEntry::from(&first), DuelEntry::from(&second)],
        })
    }

    fn load(&self, entity_id: EntityId) -> Result<RatedEntity> {
        self.storage
            .get_rated_entity(entity_id)?
            .ok_or_else(|| VoteError::not_found("entity", entity_id))
    }
}
