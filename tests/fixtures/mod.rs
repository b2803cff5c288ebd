//! Test fixtures and storage doubles for integration testing

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use uuid::Uuid;
use vote4goat::config::AppConfig;
use vote4goat::error::{Result, VoteError};
use vote4goat::storage::seed::{SeedEntity, SeedTop10Category};
use vote4goat::storage::{
    EntityStorage, InMemoryStorage, ProfileStorage, RatingStorage, SeedData, Storage,
    Top10Storage, VoteCommit,
};
use vote4goat::types::{
    CategoryId, Entity, EntityId, EntityRating, RatedEntity, Top10Category, Top10CategoryId,
    Top10Submission, UserId, UserProfile, VoteRecord,
};

/// Football category id
pub const FOOTBALL: CategoryId = 1;
/// Basketball category id
pub const BASKETBALL: CategoryId = 2;

/// Bearer token that resolves to [`fan_id`]
pub const FAN_TOKEN: &str = "fan-token";

pub fn fan_id() -> UserId {
    Uuid::parse_str("0b8f0f7e-4a43-4e0a-a1b2-6c3f0d7c9e21").unwrap_or_default()
}

const FOOTBALLERS: &[(&str, &str)] = &[
    ("Lionel Messi", "Argentina"),
    ("Cristiano Ronaldo", "Portugal"),
    ("Pelé", "Brazil"),
    ("Diego Maradona", "Argentina"),
    ("Johan Cruyff", "Netherlands"),
    ("Zinedine Zidane", "France"),
    ("Franz Beckenbauer", "Germany"),
    ("Ronaldo Nazário", "Brazil"),
    ("Ronaldinho", "Brazil"),
    ("Garrincha", "Brazil"),
    ("Zico", "Brazil"),
    ("Romário", "Brazil"),
];

const BASKETBALLERS: &[(&str, &str)] = &[
    ("Michael Jordan", "USA"),
    ("LeBron James", "USA"),
    ("Kareem Abdul-Jabbar", "USA"),
    ("Magic Johnson", "USA"),
];

fn entity(id: EntityId, category_id: CategoryId, name: &str, country: &str) -> SeedEntity {
    SeedEntity {
        entity: Entity {
            id,
            category_id,
            name: name.to_string(),
            image_url: None,
            country_primary: Some(country.to_string()),
            country_secondary: None,
        },
        rating: None,
    }
}

/// Seed with 12 footballers (ids 1..=12), 4 basketball players (101..=104),
/// a Brazil Top-10 list, an inactive list and one session token
pub fn sample_seed() -> SeedData {
    let mut entities: Vec<SeedEntity> = FOOTBALLERS
        .iter()
        .enumerate()
        .map(|(i, (name, country))| entity(i as EntityId + 1, FOOTBALL, name, country))
        .collect();
    entities.extend(
        BASKETBALLERS
            .iter()
            .enumerate()
            .map(|(i, (name, country))| entity(i as EntityId + 101, BASKETBALL, name, country)),
    );

    let top10_categories = vec![
        SeedTop10Category {
            category: Top10Category {
                id: 1,
                slug: "brazil-all-time".to_string(),
                title: "Brazil all-time".to_string(),
                description: None,
                category_id: FOOTBALL,
                is_active: true,
            },
            candidates: (1..=12).collect(),
        },
        SeedTop10Category {
            category: Top10Category {
                id: 2,
                slug: "real-madrid".to_string(),
                title: "Real Madrid all-time".to_string(),
                description: None,
                category_id: FOOTBALL,
                is_active: false,
            },
            candidates: (1..=12).collect(),
        },
    ];

    let mut sessions = HashMap::new();
    sessions.insert(FAN_TOKEN.to_string(), fan_id());

    SeedData {
        entities,
        top10_categories,
        profiles: Vec::new(),
        sessions,
    }
}

/// Seed with `count` footballers and nothing else, for load tests
pub fn football_seed(count: usize) -> SeedData {
    SeedData {
        entities: (1..=count as EntityId)
            .map(|id| entity(id, FOOTBALL, &format!("Player {}", id), "Nowhere"))
            .collect(),
        ..SeedData::default()
    }
}

/// Config with retries generous enough for heavily contended tests
pub fn contended_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.voting.max_retry_attempts = 200;
    config.voting.retry_base_delay_ms = 1;
    config.voting.retry_max_delay_ms = 5;
    config.voting.transaction_timeout_ms = 30_000;
    config
}

/// In-memory store that rejects the first `conflicts` vote commits
///
/// Used to drive the optimistic retry path without real contention.
pub struct FlakyStorage {
    inner: InMemoryStorage,
    remaining_conflicts: AtomicU32,
    commit_attempts: AtomicU32,
}

impl FlakyStorage {
    pub fn new(seed: &SeedData, conflicts: u32) -> Arc<Self> {
        let storage = Arc::new(Self {
            inner: InMemoryStorage::new(),
            remaining_conflicts: AtomicU32::new(conflicts),
            commit_attempts: AtomicU32::new(0),
        });
        seed.load_into(storage.as_ref() as &dyn Storage, 1500.0)
            .unwrap();
        storage
    }

    pub fn commit_attempts(&self) -> u32 {
        self.commit_attempts.load(Ordering::SeqCst)
    }
}

impl EntityStorage for FlakyStorage {
    fn get_entity(&self, entity_id: EntityId) -> Result<Option<Entity>> {
        self.inner.get_entity(entity_id)
    }

    fn get_rated_entity(&self, entity_id: EntityId) -> Result<Option<RatedEntity>> {
        self.inner.get_rated_entity(entity_id)
    }

    fn category_exists(&self, category_id: CategoryId) -> Result<bool> {
        self.inner.category_exists(category_id)
    }

    fn category_snapshot(&self, category_id: CategoryId) -> Result<Vec<RatedEntity>> {
        self.inner.category_snapshot(category_id)
    }

    fn upsert_entity(&self, entity: Entity, initial_rating: f64) -> Result<()> {
        self.inner.upsert_entity(entity, initial_rating)
    }

    fn entity_count(&self) -> Result<usize> {
        self.inner.entity_count()
    }
}

impl RatingStorage for FlakyStorage {
    fn get_rating(&self, entity_id: EntityId) -> Result<Option<EntityRating>> {
        self.inner.get_rating(entity_id)
    }

    fn commit_vote(&self, commit: VoteCommit) -> Result<()> {
        self.commit_attempts.fetch_add(1, Ordering::SeqCst);

        let injected = self
            .remaining_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if injected {
            return Err(VoteError::Conflict {
                message: "injected conflict".to_string(),
            });
        }

        self.inner.commit_vote(commit)
    }

    fn votes_by_user(&self, user_id: UserId) -> Result<Vec<VoteRecord>> {
        self.inner.votes_by_user(user_id)
    }

    fn vote_count(&self) -> Result<usize> {
        self.inner.vote_count()
    }
}

impl Top10Storage for FlakyStorage {
    fn top10_categories(&self) -> Result<Vec<Top10Category>> {
        self.inner.top10_categories()
    }

    fn get_top10_category(&self, id: Top10CategoryId) -> Result<Option<Top10Category>> {
        self.inner.get_top10_category(id)
    }

    fn top10_candidates(&self, id: Top10CategoryId) -> Result<Vec<EntityId>> {
        self.inner.top10_candidates(id)
    }

    fn upsert_top10_category(
        &self,
        category: Top10Category,
        candidates: Vec<EntityId>,
    ) -> Result<()> {
        self.inner.upsert_top10_category(category, candidates)
    }

    fn append_submission(&self, submission: Top10Submission) -> Result<()> {
        self.inner.append_submission(submission)
    }

    fn submissions_for(&self, id: Top10CategoryId) -> Result<Vec<Top10Submission>> {
        self.inner.submissions_for(id)
    }

    fn submission_count(&self) -> Result<usize> {
        self.inner.submission_count()
    }
}

impl ProfileStorage for FlakyStorage {
    fn get_profile(&self, user_id: UserId) -> Result<Option<UserProfile>> {
        self.inner.get_profile(user_id)
    }

    fn insert_profile(&self, profile: UserProfile) -> Result<()> {
        self.inner.insert_profile(profile)
    }

    fn update_profile(&self, profile: UserProfile) -> Result<()> {
        self.inner.update_profile(profile)
    }
}
