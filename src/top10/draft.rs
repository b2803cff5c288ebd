//! Client-side Top-10 draft
//!
//! A draft holds up to ten ranked slots while a user builds their list. Its
//! state follows from the slot count plus a submitted flag:
//! `Empty -> Partial(1..9) -> Complete -> Submitted`. Reordering a submitted
//! draft keeps it submitted; emptying any slot drops it back to partial.

use crate::error::{Result, VoteError};
use crate::types::{EntityId, Top10CategoryId, Top10SubmissionRequest, UserId, TOP10_SIZE};
use serde::{Deserialize, Serialize};

/// Draft lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "filled", rename_all = "lowercase")]
pub enum DraftState {
    Empty,
    Partial(usize),
    Complete,
    Submitted,
}

/// A Top-10 list under construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Top10Draft {
    top10_category_id: Top10CategoryId,
    slots: [Option<EntityId>; TOP10_SIZE],
    submitted: bool,
}

impl Top10Draft {
    pub fn new(top10_category_id: Top10CategoryId) -> Self {
        Self {
            top10_category_id,
            slots: [None; TOP10_SIZE],
            submitted: false,
        }
    }

    pub fn top10_category_id(&self) -> Top10CategoryId {
        self.top10_category_id
    }

    pub fn slots(&self) -> &[Option<EntityId>; TOP10_SIZE] {
        &self.slots
    }

    /// Number of filled slots
    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn state(&self) -> DraftState {
        match self.filled() {
            0 => DraftState::Empty,
            n if n < TOP10_SIZE => DraftState::Partial(n),
            _ if self.submitted => DraftState::Submitted,
            _ => DraftState::Complete,
        }
    }

    pub fn contains(&self, entity_id: EntityId) -> bool {
        self.position_of(entity_id).is_some()
    }

    /// Slot index holding `entity_id`
    pub fn position_of(&self, entity_id: EntityId) -> Option<usize> {
        self.slots.iter().position(|slot| *slot == Some(entity_id))
    }

    /// Put an entity into the first free slot and return that slot
    pub fn add(&mut self, entity_id: EntityId) -> Result<usize> {
        if self.contains(entity_id) {
            return Err(VoteError::validation(format!(
                "entity {} is already in the list",
                entity_id
            )));
        }

        let slot = self
            .slots
            .iter()
            .position(Option::is_none)
            .ok_or_else(|| VoteError::validation("the list already has ten entries"))?;

        self.slots[slot] = Some(entity_id);
        Ok(slot)
    }

    /// Put an entity into a specific slot.
    ///
    /// An entity already in the draft moves out of its old slot. Returns the
    /// entity displaced from `slot`, if any.
    pub fn place(&mut self, slot: usize, entity_id: EntityId) -> Result<Option<EntityId>> {
        Self::check_slot(slot)?;

        if let Some(previous) = self.position_of(entity_id) {
            self.slots[previous] = None;
        }
        let displaced = self.slots[slot].replace(entity_id);

        self.settle();
        Ok(displaced.filter(|displaced| *displaced != entity_id))
    }

    /// Take an entity out of the draft and return the slot it held
    pub fn remove(&mut self, entity_id: EntityId) -> Result<usize> {
        let slot = self
            .position_of(entity_id)
            .ok_or_else(|| VoteError::not_found("draft entry", entity_id))?;

        self.slots[slot] = None;
        self.settle();
        Ok(slot)
    }

    /// Exchange the contents of two slots
    pub fn swap(&mut self, first: usize, second: usize) -> Result<()> {
        Self::check_slot(first)?;
        Self::check_slot(second)?;

        self.slots.swap(first, second);
        Ok(())
    }

    /// Mark a complete draft as submitted.
    ///
    /// A submitted draft may be submitted again; every submission is stored
    /// as its own record.
    pub fn mark_submitted(&mut self) -> Result<()> {
        match self.state() {
            DraftState::Complete | DraftState::Submitted => {
                self.submitted = true;
                Ok(())
            }
            _ => Err(VoteError::validation(format!(
                "the list needs {} entries, it has {}",
                TOP10_SIZE,
                self.filled()
            ))),
        }
    }

    /// Empty every slot and forget any earlier submission
    pub fn clear(&mut self) {
        self.slots = [None; TOP10_SIZE];
        self.submitted = false;
    }

    /// Ordered entity ids, available once every slot is filled
    pub fn entity_ids(&self) -> Option<Vec<EntityId>> {
        self.slots.iter().copied().collect()
    }

    /// Build a submission request from a complete draft
    pub fn to_request(&self, user_id: Option<UserId>, ip: Option<String>) -> Result<Top10SubmissionRequest> {
        let entity_ids = self.entity_ids().ok_or_else(|| {
            VoteError::validation(format!(
                "the list needs {} entries, it has {}",
                TOP10_SIZE,
                self.filled()
            ))
        })?;

        Ok(Top10SubmissionRequest {
            top10_category_id: self.top10_category_id,
            entity_ids,
            user_id,
            ip,
        })
    }

    fn check_slot(slot: usize) -> Result<()> {
        if slot >= TOP10_SIZE {
            return Err(VoteError::validation(format!(
                "slot {} is out of range, the list has {} slots",
                slot, TOP10_SIZE
            )));
        }
        Ok(())
    }

    /// A draft with an empty slot is no longer submitted
    fn settle(&mut self) {
        if self.filled() < TOP10_SIZE {
            self.submitted = false;
        }
    }
}
