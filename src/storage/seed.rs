//! Seed data loading
//!
//! The catalog (entities, Top-10 categories and their candidate sets) is
//! authored outside this service and handed over as a JSON document. Profiles
//! and session tokens can be included for local runs and tests.

use crate::storage::Storage;
use crate::types::{Entity, EntityId, Top10Category, UserId, UserProfile};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::info;

/// An entity with an optional pre-existing rating
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedEntity {
    #[serde(flatten)]
    pub entity: Entity,
    #[serde(default)]
    pub rating: Option<f64>,
}

/// A Top-10 category with its candidate set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedTop10Category {
    #[serde(flatten)]
    pub category: Top10Category,
    pub candidates: Vec<EntityId>,
}

/// Contents of a seed file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedData {
    pub entities: Vec<SeedEntity>,
    pub top10_categories: Vec<SeedTop10Category>,
    pub profiles: Vec<UserProfile>,
    /// Bearer token to user id
    pub sessions: HashMap<String, UserId>,
}

/// Counts of what was loaded
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedSummary {
    pub entities: usize,
    pub top10_categories: usize,
    pub profiles: usize,
}

impl SeedData {
    /// Read and validate a seed file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read seed file {}", path.display()))?;
        Self::from_json(&contents)
            .with_context(|| format!("Invalid seed file {}", path.display()))
    }

    /// Parse and validate a seed document
    pub fn from_json(json: &str) -> Result<Self> {
        let seed: SeedData = serde_json::from_str(json).context("Failed to parse seed JSON")?;
        seed.validate()?;
        Ok(seed)
    }

    /// Check ids are unique and candidate sets reference known entities
    pub fn validate(&self) -> Result<()> {
        let mut entity_ids = HashSet::new();
        for seed in &self.entities {
            if !entity_ids.insert(seed.entity.id) {
                return Err(anyhow!("Duplicate entity id {}", seed.entity.id));
            }
            if seed.entity.name.trim().is_empty() {
                return Err(anyhow!("Entity {} has an empty name", seed.entity.id));
            }
            if let Some(rating) = seed.rating {
                if !rating.is_finite() {
                    return Err(anyhow!("Entity {} has a non-finite rating", seed.entity.id));
                }
            }
        }

        let mut top10_ids = HashSet::new();
        for seed in &self.top10_categories {
            if !top10_ids.insert(seed.category.id) {
                return Err(anyhow!("Duplicate top10 category id {}", seed.category.id));
            }
            if let Some(missing) = seed
                .candidates
                .iter()
                .find(|candidate| !entity_ids.contains(candidate))
            {
                return Err(anyhow!(
                    "Top10 category '{}' references unknown entity {}",
                    seed.category.slug,
                    missing
                ));
            }
        }

        Ok(())
    }

    /// Write the seed into a store
    pub fn load_into(
        &self,
        storage: &dyn Storage,
        initial_rating: f64,
    ) -> crate::error::Result<SeedSummary> {
        for seed in &self.entities {
            storage.upsert_entity(seed.entity.clone(), seed.rating.unwrap_or(initial_rating))?;
        }

        for seed in &self.top10_categories {
            storage.upsert_top10_category(seed.category.clone(), seed.candidates.clone())?;
        }

        let mut profiles = 0;
        for profile in &self.profiles {
            if storage.get_profile(profile.user_id)?.is_none() {
                storage.insert_profile(profile.clone())?;
                profiles += 1;
            }
        }

        let summary = SeedSummary {
            entities: self.entities.len(),
            top10_categories: self.top10_categories.len(),
            profiles,
        };

        info!(
            "Loaded seed data: {} entities, {} top10 categories, {} profiles",
            summary.entities, summary.top10_categories, summary.profiles
        );

        Ok(summary)
    }
}
