//! Storage interfaces and implementations
//!
//! Reference data (entities, Top-10 categories) and append-only facts
//! (votes, submissions) live behind these traits. Rating updates use
//! optimistic concurrency: readers take a versioned snapshot, and
//! [`RatingStorage::commit_vote`] only applies when both versions still match.

pub mod memory;
pub mod seed;

use crate::types::{
    CategoryId, Entity, EntityId, EntityRating, RatedEntity, Top10Category, Top10CategoryId,
    Top10Submission, UserId, UserProfile, VoteRecord,
};

pub use memory::InMemoryStorage;
pub use seed::SeedData;

/// Expected version and new rating for one side of a vote
#[derive(Debug, Clone, PartialEq)]
pub struct RatingUpdate {
    pub entity_id: EntityId,
    pub expected_version: u64,
    pub new_rating: f64,
}

/// Everything a vote writes, applied atomically or not at all
#[derive(Debug, Clone)]
pub struct VoteCommit {
    pub winner: RatingUpdate,
    pub loser: RatingUpdate,
    pub record: VoteRecord,
}

/// Entity catalog operations
pub trait EntityStorage: Send + Sync {
    /// Get an entity by id
    fn get_entity(&self, entity_id: EntityId) -> crate::error::Result<Option<Entity>>;

    /// Get an entity with its current rating
    fn get_rated_entity(&self, entity_id: EntityId) -> crate::error::Result<Option<RatedEntity>>;

    /// Whether any entity belongs to this category
    fn category_exists(&self, category_id: CategoryId) -> crate::error::Result<bool>;

    /// All entities of a category with their ratings, in no particular order
    fn category_snapshot(&self, category_id: CategoryId)
        -> crate::error::Result<Vec<RatedEntity>>;

    /// Insert or replace an entity, creating its rating at `initial_rating`
    /// when it has none yet
    fn upsert_entity(&self, entity: Entity, initial_rating: f64) -> crate::error::Result<()>;

    /// Total number of entities
    fn entity_count(&self) -> crate::error::Result<usize>;
}

/// Rating and vote operations
pub trait RatingStorage: Send + Sync {
    /// Get an entity's rating entry
    fn get_rating(&self, entity_id: EntityId) -> crate::error::Result<Option<EntityRating>>;

    /// Apply both rating updates and append the vote record atomically.
    ///
    /// Fails with `Conflict` when either entity's version moved since it was
    /// read, leaving storage untouched.
    fn commit_vote(&self, commit: VoteCommit) -> crate::error::Result<()>;

    /// Votes cast by a user, newest first
    fn votes_by_user(&self, user_id: UserId) -> crate::error::Result<Vec<VoteRecord>>;

    /// Total number of recorded votes
    fn vote_count(&self) -> crate::error::Result<usize>;
}

/// Top-10 list operations
pub trait Top10Storage: Send + Sync {
    /// All Top-10 categories, active or not
    fn top10_categories(&self) -> crate::error::Result<Vec<Top10Category>>;

    fn get_top10_category(
        &self,
        id: Top10CategoryId,
    ) -> crate::error::Result<Option<Top10Category>>;

    /// Candidate entity ids of a Top-10 category
    fn top10_candidates(&self, id: Top10CategoryId) -> crate::error::Result<Vec<EntityId>>;

    /// Insert or replace a Top-10 category and its candidate set
    fn upsert_top10_category(
        &self,
        category: Top10Category,
        candidates: Vec<EntityId>,
    ) -> crate::error::Result<()>;

    /// Append a validated submission
    fn append_submission(&self, submission: Top10Submission) -> crate::error::Result<()>;

    /// Submissions for one Top-10 category, oldest first
    fn submissions_for(&self, id: Top10CategoryId) -> crate::error::Result<Vec<Top10Submission>>;

    /// Total number of submissions
    fn submission_count(&self) -> crate::error::Result<usize>;
}

/// Account profile operations
pub trait ProfileStorage: Send + Sync {
    fn get_profile(&self, user_id: UserId) -> crate::error::Result<Option<UserProfile>>;

    /// Insert a new profile, failing with `Validation` if one exists
    fn insert_profile(&self, profile: UserProfile) -> crate::error::Result<()>;

    /// Replace an existing profile, failing with `NotFound` if absent
    fn update_profile(&self, profile: UserProfile) -> crate::error::Result<()>;
}

/// Everything the services need from a backing store
pub trait Storage: EntityStorage + RatingStorage + Top10Storage + ProfileStorage {}

impl<T> Storage for T where T: EntityStorage + RatingStorage + Top10Storage + ProfileStorage {}
