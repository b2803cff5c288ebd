//! In-memory storage implementation
//!
//! All tables live behind one `RwLock`, so a vote commit observes and
//! mutates both ratings and the vote log under a single write guard.

use crate::error::VoteError;
use crate::storage::{
    EntityStorage, ProfileStorage, RatingStorage, RatingUpdate, Top10Storage, VoteCommit,
};
use crate::types::{
    CategoryId, Entity, EntityId, EntityRating, RatedEntity, Top10Category, Top10CategoryId,
    Top10Submission, UserId, UserProfile, VoteRecord,
};
use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct StoreState {
    entities: HashMap<EntityId, Entity>,
    ratings: HashMap<EntityId, EntityRating>,
    categories: HashSet<CategoryId>,
    votes: Vec<VoteRecord>,
    top10_categories: HashMap<Top10CategoryId, Top10Category>,
    top10_candidates: HashMap<Top10CategoryId, Vec<EntityId>>,
    submissions: Vec<Top10Submission>,
    profiles: HashMap<UserId, UserProfile>,
}

/// Thread-safe in-memory store for every table of the service
///
/// Every call takes a blocking `std::sync::RwLock`. A vote commit waiting on
/// the write lock is not interrupted by the vote timeout, which only fires at
/// the retry backoff points.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    state: RwLock<StoreState>,
}

impl InMemoryStorage {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> crate::error::Result<RwLockReadGuard<'_, StoreState>> {
        self.state.read().map_err(|_| VoteError::Unavailable {
            message: "Failed to acquire storage read lock".to_string(),
        })
    }

    fn write(&self) -> crate::error::Result<RwLockWriteGuard<'_, StoreState>> {
        self.state.write().map_err(|_| VoteError::Unavailable {
            message: "Failed to acquire storage write lock".to_string(),
        })
    }
}

fn check_version(state: &StoreState, update: &RatingUpdate) -> crate::error::Result<()> {
    let current = state
        .ratings
        .get(&update.entity_id)
        .ok_or_else(|| VoteError::not_found("entity", update.entity_id))?;

    if current.version != update.expected_version {
        return Err(VoteError::Conflict {
            message: format!(
                "entity {} changed from version {} to {}",
                update.entity_id, update.expected_version, current.version
            ),
        });
    }

    Ok(())
}

impl EntityStorage for InMemoryStorage {
    fn get_entity(&self, entity_id: EntityId) -> crate::error::Result<Option<Entity>> {
        Ok(self.read()?.entities.get(&entity_id).cloned())
    }

    fn get_rated_entity(&self, entity_id: EntityId) -> crate::error::Result<Option<RatedEntity>> {
        let state = self.read()?;

        let rated = state.entities.get(&entity_id).and_then(|entity| {
            state.ratings.get(&entity_id).map(|rating| RatedEntity {
                entity: entity.clone(),
                rating: rating.clone(),
            })
        });

        Ok(rated)
    }

    fn category_exists(&self, category_id: CategoryId) -> crate::error::Result<bool> {
        Ok(self.read()?.categories.contains(&category_id))
    }

    fn category_snapshot(
        &self,
        category_id: CategoryId,
    ) -> crate::error::Result<Vec<RatedEntity>> {
        let state = self.read()?;

        let snapshot = state
            .entities
            .values()
            .filter(|entity| entity.category_id == category_id)
            .filter_map(|entity| {
                state.ratings.get(&entity.id).map(|rating| RatedEntity {
                    entity: entity.clone(),
                    rating: rating.clone(),
                })
            })
            .collect();

        Ok(snapshot)
    }

    fn upsert_entity(&self, entity: Entity, initial_rating: f64) -> crate::error::Result<()> {
        let mut state = self.write()?;

        state.categories.insert(entity.category_id);
        state
            .ratings
            .entry(entity.id)
            .or_insert_with(|| EntityRating::new(entity.id, initial_rating));
        state.entities.insert(entity.id, entity);

        Ok(())
    }

    fn entity_count(&self) -> crate::error::Result<usize> {
        Ok(self.read()?.entities.len())
    }
}

impl RatingStorage for InMemoryStorage {
    fn get_rating(&self, entity_id: EntityId) -> crate::error::Result<Option<EntityRating>> {
        Ok(self.read()?.ratings.get(&entity_id).cloned())
    }

    fn commit_vote(&self, commit: VoteCommit) -> crate::error::Result<()> {
        let mut state = self.write()?;

        check_version(&state, &commit.winner)?;
        check_version(&state, &commit.loser)?;

        // Both versions verified under the guard, so the updates cannot fail
        if let Some(winner) = state.ratings.get_mut(&commit.winner.entity_id) {
            winner.record_win(commit.winner.new_rating);
        }
        if let Some(loser) = state.ratings.get_mut(&commit.loser.entity_id) {
            loser.record_loss(commit.loser.new_rating);
        }
        state.votes.push(commit.record);

        Ok(())
    }

    fn votes_by_user(&self, user_id: UserId) -> crate::error::Result<Vec<VoteRecord>> {
        let state = self.read()?;

        let mut votes: Vec<VoteRecord> = state
            .votes
            .iter()
            .filter(|vote| vote.user_id == Some(user_id))
            .cloned()
            .collect();
        votes.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(votes)
    }

    fn vote_count(&self) -> crate::error::Result<usize> {
        Ok(self.read()?.votes.len())
    }
}

impl Top10Storage for InMemoryStorage {
    fn top10_categories(&self) -> crate::error::Result<Vec<Top10Category>> {
        Ok(self.read()?.top10_categories.values().cloned().collect())
    }

    fn get_top10_category(
        &self,
        id: Top10CategoryId,
    ) -> crate::error::Result<Option<Top10Category>> {
        Ok(self.read()?.top10_categories.get(&id).cloned())
    }

    fn top10_candidates(&self, id: Top10CategoryId) -> crate::error::Result<Vec<EntityId>> {
        Ok(self
            .read()?
            .top10_candidates
            .get(&id)
            .cloned()
            .unwrap_or_default())
    }

    fn upsert_top10_category(
        &self,
        category: Top10Category,
        candidates: Vec<EntityId>,
    ) -> crate::error::Result<()> {
        let mut state = self.write()?;

        state.top10_candidates.insert(category.id, candidates);
        state.top10_categories.insert(category.id, category);

        Ok(())
    }

    fn append_submission(&self, submission: Top10Submission) -> crate::error::Result<()> {
        let mut state = self.write()?;

        if !state
            .top10_categories
            .contains_key(&submission.top10_category_id)
        {
            return Err(VoteError::not_found(
                "top10 category",
                submission.top10_category_id,
            ));
        }
        state.submissions.push(submission);

        Ok(())
    }

    fn submissions_for(&self, id: Top10CategoryId) -> crate::error::Result<Vec<Top10Submission>> {
        Ok(self
            .read()?
            .submissions
            .iter()
            .filter(|submission| submission.top10_category_id == id)
            .cloned()
            .collect())
    }

    fn submission_count(&self) -> crate::error::Result<usize> {
        Ok(self.read()?.submissions.len())
    }
}

impl ProfileStorage for InMemoryStorage {
    fn get_profile(&self, user_id: UserId) -> crate::error::Result<Option<UserProfile>> {
        Ok(self.read()?.profiles.get(&user_id).cloned())
    }

    fn insert_profile(&self, profile: UserProfile) -> crate::error::Result<()> {
        let mut state = self.write()?;

        if state.profiles.contains_key(&profile.user_id) {
            return Err(VoteError::validation(format!(
                "profile already exists for user {}",
                profile.user_id
            )));
        }
        state.profiles.insert(profile.user_id, profile);

        Ok(())
    }

    fn update_profile(&self, profile: UserProfile) -> crate::error::Result<()> {
        let mut state = self.write()?;

        match state.profiles.get_mut(&profile.user_id) {
            Some(existing) => {
                *existing = profile;
                Ok(())
            }
            None => Err(VoteError::not_found("profile", profile.user_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{current_timestamp, generate_vote_id};
    use std::sync::Arc;

    fn create_test_entity(id: EntityId, category_id: CategoryId, name: &str) -> Entity {
        Entity {
            id,
            category_id,
            name: name.to_string(),
            image_url: None,
            country_primary: None,
            country_secondary: None,
        }
    }

    fn create_test_storage() -> InMemoryStorage {
        let storage = InMemoryStorage::new();
        storage
            .upsert_entity(create_test_entity(1, 1, "Lionel Messi"), 1500.0)
            .unwrap();
        storage
            .upsert_entity(create_test_entity(2, 1, "Cristiano Ronaldo"), 1500.0)
            .unwrap();
        storage
            .upsert_entity(create_test_entity(3, 1, "Diego Maradona"), 1500.0)
            .unwrap();
        storage
            .upsert_entity(create_test_entity(10, 2, "Michael Jordan"), 1500.0)
            .unwrap();
        storage
    }

    fn create_test_commit(
        storage: &InMemoryStorage,
        winner_id: EntityId,
        loser_id: EntityId,
    ) -> VoteCommit {
        let winner = storage.get_rating(winner_id).unwrap().unwrap();
        let loser = storage.get_rating(loser_id).unwrap().unwrap();

        VoteCommit {
            winner: RatingUpdate {
                entity_id: winner_id,
                expected_version: winner.version,
                new_rating: winner.rating + 16.0,
            },
            loser: RatingUpdate {
                entity_id: loser_id,
                expected_version: loser.version,
                new_rating: loser.rating - 16.0,
            },
            record: VoteRecord {
                id: generate_vote_id(),
                category_id: 1,
                winner_id,
                loser_id,
                winner_rating_before: winner.rating,
                winner_rating_after: winner.rating + 16.0,
                loser_rating_before: loser.rating,
                loser_rating_after: loser.rating - 16.0,
                user_id: None,
                ip: Some("203.0.113.7".to_string()),
                created_at: current_timestamp(),
            },
        }
    }

    #[test]
    fn test_upsert_creates_rating_and_category() {
        let storage = create_test_storage();

        assert_eq!(storage.entity_count().unwrap(), 4);
        assert!(storage.category_exists(1).unwrap());
        assert!(storage.category_exists(2).unwrap());
        assert!(!storage.category_exists(3).unwrap());

        let rating = storage.get_rating(1).unwrap().unwrap();
        assert_eq!(rating.rating, 1500.0);
        assert_eq!(rating.version, 0);
    }

    #[test]
    fn test_upsert_keeps_existing_rating() {
        let storage = create_test_storage();
        storage
            .commit_vote(create_test_commit(&storage, 1, 2))
            .unwrap();

        storage
            .upsert_entity(create_test_entity(1, 1, "Leo Messi"), 1500.0)
            .unwrap();

        assert_eq!(storage.get_entity(1).unwrap().unwrap().name, "Leo Messi");
        assert_eq!(storage.get_rating(1).unwrap().unwrap().rating, 1516.0);
    }

    #[test]
    fn test_category_snapshot_filters_by_category() {
        let storage = create_test_storage();

        let football = storage.category_snapshot(1).unwrap();
        assert_eq!(football.len(), 3);
        assert!(football.iter().all(|rated| rated.entity.category_id == 1));

        assert_eq!(storage.category_snapshot(2).unwrap().len(), 1);
        assert!(storage.category_snapshot(99).unwrap().is_empty());
    }

    #[test]
    fn test_commit_vote_applies_both_sides() {
        let storage = create_test_storage();
        storage
            .commit_vote(create_test_commit(&storage, 1, 2))
            .unwrap();

        let winner = storage.get_rating(1).unwrap().unwrap();
        let loser = storage.get_rating(2).unwrap().unwrap();

        assert_eq!(winner.rating, 1516.0);
        assert_eq!(winner.wins, 1);
        assert_eq!(winner.version, 1);
        assert_eq!(loser.rating, 1484.0);
        assert_eq!(loser.losses, 1);
        assert_eq!(loser.version, 1);
        assert_eq!(storage.vote_count().unwrap(), 1);
    }

    #[test]
    fn test_interleaved_commits_conflict() {
        let storage = create_test_storage();

        // Both transactions read before either commits
        let first = create_test_commit(&storage, 1, 2);
        let second = create_test_commit(&storage, 1, 3);

        storage.commit_vote(first).unwrap();
        let result = storage.commit_vote(second);

        assert!(matches!(result, Err(VoteError::Conflict { .. })));

        // The rejected commit left nothing behind
        assert_eq!(storage.get_rating(1).unwrap().unwrap().rating, 1516.0);
        assert_eq!(storage.get_rating(3).unwrap().unwrap().rating, 1500.0);
        assert_eq!(storage.get_rating(3).unwrap().unwrap().version, 0);
        assert_eq!(storage.vote_count().unwrap(), 1);
    }

    #[test]
    fn test_disjoint_commits_both_apply() {
        let storage = create_test_storage();
        storage
            .upsert_entity(create_test_entity(4, 1, "Johan Cruyff"), 1500.0)
            .unwrap();

        let first = create_test_commit(&storage, 1, 2);
        let second = create_test_commit(&storage, 3, 4);

        storage.commit_vote(first).unwrap();
        storage.commit_vote(second).unwrap();

        assert_eq!(storage.vote_count().unwrap(), 2);
        assert_eq!(storage.get_rating(3).unwrap().unwrap().rating, 1516.0);
    }

    #[test]
    fn test_votes_by_user_newest_first() {
        let storage = create_test_storage();
        let user_id = uuid::Uuid::new_v4();

        let mut first = create_test_commit(&storage, 1, 2);
        first.record.user_id = Some(user_id);
        first.record.created_at = current_timestamp() - chrono::Duration::minutes(5);
        storage.commit_vote(first).unwrap();

        let mut second = create_test_commit(&storage, 3, 1);
        second.record.user_id = Some(user_id);
        storage.commit_vote(second).unwrap();

        storage
            .commit_vote(create_test_commit(&storage, 2, 3))
            .unwrap();

        let votes = storage.votes_by_user(user_id).unwrap();
        assert_eq!(votes.len(), 2);
        assert_eq!(votes[0].winner_id, 3);
        assert_eq!(votes[1].winner_id, 1);
    }

    #[test]
    fn test_profile_insert_and_update() {
        let storage = InMemoryStorage::new();
        let profile = UserProfile {
            user_id: uuid::Uuid::new_v4(),
            username: "goatfan".to_string(),
            birthdate: chrono::NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            country: "Brazil".to_string(),
            votes_visible: true,
            created_at: current_timestamp(),
        };

        storage.insert_profile(profile.clone()).unwrap();
        assert!(matches!(
            storage.insert_profile(profile.clone()),
            Err(VoteError::Validation { .. })
        ));

        let mut hidden = profile.clone();
        hidden.votes_visible = false;
        storage.update_profile(hidden).unwrap();
        assert!(
            !storage
                .get_profile(profile.user_id)
                .unwrap()
                .unwrap()
                .votes_visible
        );

        let mut stranger = profile;
        stranger.user_id = uuid::Uuid::new_v4();
        assert!(matches!(
            storage.update_profile(stranger),
            Err(VoteError::NotFound { .. })
        ));
    }

    #[test]
    fn test_submission_requires_known_category() {
        let storage = InMemoryStorage::new();
        let submission = Top10Submission {
            id: uuid::Uuid::new_v4(),
            top10_category_id: 7,
            entity_ids: (1..=10).collect(),
            user_id: None,
            ip: None,
            created_at: current_timestamp(),
        };

        assert!(matches!(
            storage.append_submission(submission),
            Err(VoteError::NotFound { .. })
        ));
        assert_eq!(storage.submission_count().unwrap(), 0);
    }

    #[test]
    fn test_poisoned_lock_maps_to_unavailable() {
        let storage = Arc::new(create_test_storage());

        let poisoner = storage.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.state.write().unwrap();
            panic!("poison the storage lock");
        })
        .join();

        let result = storage.get_rating(1);
        assert!(matches!(result, Err(VoteError::Unavailable { .. })));
        assert!(result.unwrap_err().is_retryable());
    }
}
