use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::models::{Decision, DecisionKind, ProfileUpdate, User};
use crate::services::store::{resolve_record, DecisionStore, RecordOutcome, StoreError, UserDirectory};

#[derive(Debug, Default)]
struct MemoryState {
    users: BTreeMap<i64, User>,
    decisions: Vec<Decision>,
}

/// In-process user directory and decision store
///
/// Every operation runs under a single lock, so the eligibility re-check and
/// insert of [`DecisionStore::record_if_eligible`] are serialized.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user record
    pub async fn insert_user(&self, user: User) {
        self.state.write().await.users.insert(user.id, user);
    }

    /// Total number of stored decisions
    pub async fn decision_count(&self) -> usize {
        self.state.read().await.decisions.len()
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn get_user(&self, user_id: i64) -> Result<User, StoreError> {
        self.state
            .read()
            .await
            .users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("User {} not found", user_id)))
    }

    async fn candidate_pool(&self, user: &User) -> Result<Vec<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .filter(|u| u.id != user.id)
            .cloned()
            .collect())
    }

    async fn update_profile(&self, user_id: i64, update: ProfileUpdate) -> Result<User, StoreError> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| StoreError::NotFound(format!("User {} not found", user_id)))?;

        user.email = update.email;
        user.first_name = update.first_name;
        user.last_name = update.last_name;
        user.hobbies = update.hobbies;
        user.interests = update.interests;
        user.zip_code = update.zip_code;
        user.friend_radius_miles = update.friend_radius_miles;
        user.coordinates = update.coordinates;
        if let Some(image_url) = update.image_url {
            user.image_url = image_url;
        }

        Ok(user.clone())
    }
}

#[async_trait]
impl DecisionStore for MemoryStore {
    async fn decisions_by_actor(&self, user_id: i64) -> Result<Vec<Decision>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .decisions
            .iter()
            .filter(|d| d.actor_id == user_id)
            .cloned()
            .collect())
    }

    async fn decisions_by_target(&self, user_id: i64) -> Result<Vec<Decision>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .decisions
            .iter()
            .filter(|d| d.target_id == user_id)
            .cloned()
            .collect())
    }

    async fn record_if_eligible(
        &self,
        actor_id: i64,
        target_id: i64,
        kind: DecisionKind,
    ) -> Result<RecordOutcome, StoreError> {
        let mut state = self.state.write().await;

        let lookup = |id: i64| {
            state
                .users
                .get(&id)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(format!("User {} not found", id)))
        };
        let actor = lookup(actor_id)?;
        let target = lookup(target_id)?;

        let pair_decisions: Vec<Decision> = state
            .decisions
            .iter()
            .filter(|d| {
                (d.actor_id == actor_id && d.target_id == target_id)
                    || (d.actor_id == target_id && d.target_id == actor_id)
            })
            .cloned()
            .collect();

        match resolve_record(&actor, &target, kind, &pair_decisions) {
            Ok(decision) => {
                state.decisions.push(decision.clone());
                Ok(RecordOutcome::Recorded(decision))
            }
            Err(outcome) => Ok(outcome),
        }
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}
