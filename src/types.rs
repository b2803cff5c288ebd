//! Common types used throughout the voting service

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use skillratings::elo::EloRating;
use uuid::Uuid;

/// Unique identifier for voteable entities (athletes)
pub type EntityId = i64;

/// Unique identifier for categories (sports)
pub type CategoryId = i64;

/// Unique identifier for Top-10 list categories
pub type Top10CategoryId = i64;

/// Identifier assigned by the external authentication subsystem
pub type UserId = Uuid;

/// Unique identifier for recorded votes
pub type VoteId = Uuid;

/// Unique identifier for Top-10 submissions
pub type SubmissionId = Uuid;

/// Number of ranked slots in a Top-10 list
pub const TOP10_SIZE: usize = 10;

/// Sport a category belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sport {
    Football,
    Basketball,
    Tennis,
    Other,
}

impl Sport {
    /// Map a category id onto its sport
    pub fn from_category_id(category_id: CategoryId) -> Self {
        match category_id {
            1 => Sport::Football,
            2 => Sport::Basketball,
            3 => Sport::Tennis,
            _ => Sport::Other,
        }
    }
}

impl std::fmt::Display for Sport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sport::Football => write!(f, "Football"),
            Sport::Basketball => write!(f, "Basketball"),
            Sport::Tennis => write!(f, "Tennis"),
            Sport::Other => write!(f, "Other"),
        }
    }
}

/// A voteable athlete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub category_id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub country_primary: Option<String>,
    #[serde(default)]
    pub country_secondary: Option<String>,
}

impl Entity {
    /// Name split into stacked display lines
    pub fn display_lines(&self) -> Vec<String> {
        match crate::utils::split_display_name(&self.name) {
            (Some(first), rest) => vec![first, rest],
            (None, name) => vec![name],
        }
    }
}

/// Current rating of an entity together with its concurrency version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRating {
    pub entity_id: EntityId,
    pub rating: f64,
    pub wins: u64,
    pub losses: u64,
    /// Bumped on every committed change
    pub version: u64,
    pub last_updated: DateTime<Utc>,
}

impl EntityRating {
    /// Create a fresh rating at the given baseline
    pub fn new(entity_id: EntityId, initial_rating: f64) -> Self {
        Self {
            entity_id,
            rating: initial_rating,
            wins: 0,
            losses: 0,
            version: 0,
            last_updated: Utc::now(),
        }
    }

    /// Apply a won vote
    pub fn record_win(&mut self, new_rating: f64) {
        self.rating = new_rating;
        self.wins += 1;
        self.touch();
    }

    /// Apply a lost vote
    pub fn record_loss(&mut self, new_rating: f64) {
        self.rating = new_rating;
        self.losses += 1;
        self.touch();
    }

    pub fn votes(&self) -> u64 {
        self.wins + self.losses
    }

    fn touch(&mut self) {
        self.version += 1;
        self.last_updated = Utc::now();
    }
}

impl From<&EntityRating> for EloRating {
    fn from(rating: &EntityRating) -> Self {
        Self {
            rating: rating.rating,
        }
    }
}

/// An entity joined with its current rating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatedEntity {
    pub entity: Entity,
    pub rating: EntityRating,
}

/// One row of a ranking table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntity {
    /// 1-based position
    pub rank: u32,
    pub entity: Entity,
    pub rating: f64,
    pub wins: u64,
    pub losses: u64,
}

/// A page of the ranking table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingPage {
    pub category_id: CategoryId,
    pub sport: Sport,
    pub limit: usize,
    pub entries: Vec<RankedEntity>,
    pub has_more: bool,
    /// Limit to request for the "show more" step, if any
    pub next_limit: Option<usize>,
}

/// One side of a duel as presented to a voter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuelEntry {
    pub entity: Entity,
    pub rating: f64,
    pub display_lines: Vec<String>,
}

impl From<&RatedEntity> for DuelEntry {
    fn from(rated: &RatedEntity) -> Self {
        Self {
            display_lines: rated.entity.display_lines(),
            entity: rated.entity.clone(),
            rating: rated.rating.rating,
        }
    }
}

/// Two distinct entities of one category presented for a vote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Duel {
    pub category_id: CategoryId,
    pub sport: Sport,
    pub entries: [DuelEntry; 2],
}

impl Duel {
    pub fn entity_ids(&self) -> (EntityId, EntityId) {
        (self.entries[0].entity.id, self.entries[1].entity.id)
    }
}

/// Rating change of one entity caused by a vote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingChange {
    pub entity_id: EntityId,
    pub old_rating: f64,
    pub new_rating: f64,
}

impl RatingChange {
    pub fn delta(&self) -> f64 {
        self.new_rating - self.old_rating
    }
}

/// A vote as submitted by a client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteRequest {
    pub winner_id: EntityId,
    pub loser_id: EntityId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    /// Opaque provenance string, stored verbatim
    #[serde(default)]
    pub ip: Option<String>,
}

/// Immutable record of a committed vote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub id: VoteId,
    pub category_id: CategoryId,
    pub winner_id: EntityId,
    pub loser_id: EntityId,
    pub winner_rating_before: f64,
    pub winner_rating_after: f64,
    pub loser_rating_before: f64,
    pub loser_rating_after: f64,
    pub user_id: Option<UserId>,
    pub ip: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Result of a successful vote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteOutcome {
    pub vote_id: VoteId,
    pub winner: RatingChange,
    pub loser: RatingChange,
    /// Commit attempts needed, 1 when there was no contention
    pub attempts: u32,
}

/// A themed Top-10 list users can rank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Top10Category {
    pub id: Top10CategoryId,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Sport category this list belongs to
    pub category_id: CategoryId,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// A submitted ordered Top-10 list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Top10Submission {
    pub id: SubmissionId,
    pub top10_category_id: Top10CategoryId,
    /// Index 0 is rank 1
    pub entity_ids: Vec<EntityId>,
    pub user_id: Option<UserId>,
    pub ip: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A Top-10 list as submitted by a client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Top10SubmissionRequest {
    pub top10_category_id: Top10CategoryId,
    pub entity_ids: Vec<EntityId>,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub ip: Option<String>,
}

/// Account profile owned by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub username: String,
    pub birthdate: NaiveDate,
    pub country: String,
    #[serde(default = "default_true")]
    pub votes_visible: bool,
    #[serde(default = "crate::utils::current_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Profile fields supplied at sign-up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProfile {
    pub username: String,
    pub birthdate: NaiveDate,
    pub country: String,
}

/// Profile view with derived fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileView {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub age: u32,
}

/// One line of a user's vote history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteHistoryEntry {
    pub vote_id: VoteId,
    pub created_at: DateTime<Utc>,
    pub winner_name: String,
    pub loser_name: String,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_entity(id: EntityId, name: &str) -> Entity {
        Entity {
            id,
            category_id: 1,
            name: name.to_string(),
            image_url: None,
            country_primary: Some("PT".to_string()),
            country_secondary: None,
        }
    }

    #[test]
    fn test_sport_from_category_id() {
        assert_eq!(Sport::from_category_id(1), Sport::Football);
        assert_eq!(Sport::from_category_id(2), Sport::Basketball);
        assert_eq!(Sport::from_category_id(3), Sport::Tennis);
        assert_eq!(Sport::from_category_id(42), Sport::Other);
        assert_eq!(Sport::Basketball.to_string(), "Basketball");
    }

    #[test]
    fn test_entity_display_lines() {
        let entity = create_test_entity(1, "Cristiano Ronaldo");
        assert_eq!(entity.display_lines(), vec!["CRISTIANO", "RONALDO"]);

        let entity = create_test_entity(2, "Pelé");
        assert_eq!(entity.display_lines(), vec!["PELÉ"]);
    }

    #[test]
    fn test_entity_rating_updates_bump_version() {
        let mut rating = EntityRating::new(1, 1500.0);
        assert_eq!(rating.version, 0);

        rating.record_win(1516.0);
        assert_eq!(rating.version, 1);
        assert_eq!(rating.wins, 1);

        rating.record_loss(1500.0);
        assert_eq!(rating.version, 2);
        assert_eq!(rating.losses, 1);
        assert_eq!(rating.votes(), 2);
        assert_eq!(rating.rating, 1500.0);
    }

    #[test]
    fn test_entity_deserializes_with_optional_fields_missing() {
        let entity: Entity =
            serde_json::from_str(r#"{"id": 5, "category_id": 2, "name": "Michael Jordan"}"#)
                .unwrap();
        assert_eq!(entity.id, 5);
        assert!(entity.image_url.is_none());
        assert!(entity.country_primary.is_none());
    }

    #[test]
    fn test_top10_category_defaults_to_active() {
        let category: Top10Category = serde_json::from_str(
            r#"{"id": 1, "slug": "real-madrid", "title": "Real Madrid", "category_id": 1}"#,
        )
        .unwrap();
        assert!(category.is_active);
    }
}
