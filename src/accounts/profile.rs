//! Account profiles and vote history

use crate::error::{Result, VoteError};
use crate::storage::Storage;
use crate::types::{NewProfile, ProfileView, UserId, UserProfile, VoteHistoryEntry};
use crate::utils::{age_on, current_timestamp};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::{debug, info};

/// Manages user profiles
pub struct ProfileService {
    storage: Arc<dyn Storage>,
}

impl ProfileService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Create the profile of a signed-in user
    pub fn register_profile(&self, user_id: UserId, new_profile: NewProfile) -> Result<UserProfile> {
        self.register_profile_on(user_id, new_profile, Utc::now().date_naive())
    }

    fn register_profile_on(
        &self,
        user_id: UserId,
        new_profile: NewProfile,
        today: NaiveDate,
    ) -> Result<UserProfile> {
        let username = required("username", &new_profile.username)?;
        let country = required("country", &new_profile.country)?;
        if new_profile.birthdate > today {
            return Err(VoteError::validation("birthdate cannot be in the future"));
        }

        let profile = UserProfile {
            user_id,
            username,
            birthdate: new_profile.birthdate,
            country,
            votes_visible: true,
            created_at: current_timestamp(),
        };
        self.storage.insert_profile(profile.clone())?;

        info!("Profile registered - user: {}, username: {}", user_id, profile.username);
        Ok(profile)
    }

    /// A user's profile with their current age
    pub fn get_profile(&self, user_id: UserId) -> Result<ProfileView> {
        let profile = self.load(user_id)?;
        let age = age_on(profile.birthdate, Utc::now().date_naive());
        Ok(ProfileView { profile, age })
    }

    /// Let the owner show or hide their vote history
    pub fn set_votes_visible(&self, owner: UserId, visible: bool) -> Result<UserProfile> {
        let mut profile = self.load(owner)?;
        profile.votes_visible = visible;
        self.storage.update_profile(profile.clone())?;

        debug!("Vote visibility for {} set to {}", owner, visible);
        Ok(profile)
    }

    /// Votes cast by `subject`, newest first.
    ///
    /// The owner always sees their history. Anyone else only sees it while
    /// the subject keeps their votes visible.
    pub fn vote_history(&self, viewer: Option<UserId>, subject: UserId) -> Result<Vec<VoteHistoryEntry>> {
        if viewer != Some(subject) {
            let profile = self.load(subject)?;
            if !profile.votes_visible {
                return Err(VoteError::Forbidden {
                    reason: format!("user {} keeps their votes private", subject),
                });
            }
        }

        let mut entries = Vec::new();
        for record in self.storage.votes_by_user(subject)? {
            entries.push(VoteHistoryEntry {
                vote_id: record.id,
                created_at: record.created_at,
                winner_name: self.entity_name(record.winner_id)?,
                loser_name: self.entity_name(record.loser_id)?,
            });
        }

        Ok(entries)
    }

    fn load(&self, user_id: UserId) -> Result<UserProfile> {
        self.storage
            .get_profile(user_id)?
            .ok_or_else(|| VoteError::not_found("profile", user_id))
    }

    fn entity_name(&self, entity_id: i64) -> Result<String> {
        Ok(self
            .storage
            .get_entity(entity_id)?
            .map(|entity| entity.name)
            .unwrap_or_else(|| format!("#{}", entity_id)))
    }
}

fn required(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(VoteError::validation(format!("{} is required", field)));
    }
    Ok(value.to_string())
}
