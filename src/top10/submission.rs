//! Top-10 candidates and submissions

use super::category::Top10CategoryView;
use crate::error::{Result, VoteError};
use crate::metrics::MetricsCollector;
use crate::storage::Storage;
use crate::types::{
    CategoryId, Entity, EntityId, Top10Category, Top10CategoryId, Top10Submission,
    Top10SubmissionRequest, TOP10_SIZE,
};
use crate::utils::{current_timestamp, generate_submission_id};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Check an ordered list against a category's candidate set.
///
/// The list must hold exactly ten distinct candidate ids.
pub fn validate_submission(entity_ids: &[EntityId], candidates: &HashSet<EntityId>) -> Result<()> {
    if entity_ids.len() != TOP10_SIZE {
        return Err(VoteError::validation(format!(
            "a Top-10 list needs exactly {} entries, got {}",
            TOP10_SIZE,
            entity_ids.len()
        )));
    }

    let mut seen = HashSet::with_capacity(TOP10_SIZE);
    for entity_id in entity_ids {
        if !seen.insert(*entity_id) {
            return Err(VoteError::validation(format!(
                "entity {} appears more than once",
                entity_id
            )));
        }
        if !candidates.contains(entity_id) {
            return Err(VoteError::validation(format!(
                "entity {} is not a candidate for this list",
                entity_id
            )));
        }
    }

    Ok(())
}

/// Serves Top-10 categories and records submissions
pub struct Top10Service {
    storage: Arc<dyn Storage>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl Top10Service {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            metrics: None,
        }
    }

    /// Attach a metrics collector
    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Active categories ordered by title, optionally for one sport only
    pub fn list_categories(&self, sport: Option<CategoryId>) -> Result<Vec<Top10CategoryView>> {
        let mut categories: Vec<Top10Category> = self
            .storage
            .top10_categories()?
            .into_iter()
            .filter(|category| category.is_active)
            .filter(|category| sport.map_or(true, |sport| category.category_id == sport))
            .collect();

        categories.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));

        Ok(categories.into_iter().map(Top10CategoryView::from).collect())
    }

    /// Look up a category that accepts submissions
    pub fn active_category(&self, id: Top10CategoryId) -> Result<Top10Category> {
        self.storage
            .get_top10_category(id)?
            .filter(|category| category.is_active)
            .ok_or_else(|| VoteError::not_found("top10 category", id))
    }

    /// Candidate entities of a category ordered by name
    pub fn list_candidates(&self, id: Top10CategoryId) -> Result<Vec<Entity>> {
        self.active_category(id)?;

        let mut candidates = Vec::new();
        for entity_id in self.storage.top10_candidates(id)? {
            match self.storage.get_entity(entity_id)? {
                Some(entity) => candidates.push(entity),
                None => warn!(
                    "Top-10 category {} lists unknown entity {}",
                    id, entity_id
                ),
            }
        }

        candidates.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        debug!("Listed {} candidates for Top-10 category {}", candidates.len(), id);
        Ok(candidates)
    }

    /// Validate and store a Top-10 list.
    ///
    /// Every call creates an independent record, including repeat
    /// submissions by the same user.
    pub fn submit(&self, request: Top10SubmissionRequest) -> Result<Top10Submission> {
        let result = self.try_submit(request);

        if let Some(metrics) = &self.metrics {
            metrics.record_top10_submission(result.is_ok());
        }

        match &result {
            Ok(submission) => info!(
                "Top-10 submitted - id: {}, category: {}, user: {:?}",
                submission.id, submission.top10_category_id, submission.user_id
            ),
            Err(e) => warn!("Top-10 submission rejected: {}", e),
        }

        result
    }

    fn try_submit(&self, request: Top10SubmissionRequest) -> Result<Top10Submission> {
        let category = self.active_category(request.top10_category_id)?;

        let candidates: HashSet<EntityId> =
            self.storage.top10_candidates(category.id)?.into_iter().collect();
        validate_submission(&request.entity_ids, &candidates)?;

        let submission = Top10Submission {
            id: generate_submission_id(),
            top10_category_id: category.id,
            entity_ids: request.entity_ids,
            user_id: request.user_id,
            ip: request.ip,
            created_at: current_timestamp(),
        };

        self.storage.append_submission(submission.clone())?;
        Ok(submission)
    }
}
