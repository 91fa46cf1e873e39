use std::sync::Arc;
use thiserror::Error;

use crate::core::{find_potential_friends, Ineligible};
use crate::models::{Decision, DecisionKind, ProfileUpdate, User};
use crate::services::geocoder::{GeocodeError, Geocoder};
use crate::services::store::{DecisionStore, RecordOutcome, StoreError, UserDirectory};

/// Errors surfaced by [`FriendService`]
#[derive(Debug, Error)]
pub enum FriendServiceError {
    #[error("User not found: {0}")]
    NotFound(String),

    #[error("User is not a potential friend: {0}")]
    NotPotentialFriend(Ineligible),

    #[error("Storage error: {0}")]
    Store(StoreError),

    #[error("Geocoding error: {0}")]
    Geocode(#[from] GeocodeError),
}

impl From<StoreError> for FriendServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => FriendServiceError::NotFound(msg),
            other => FriendServiceError::Store(other),
        }
    }
}

/// Whether a successful write created a new decision
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    New(Decision),
    Existing,
}

/// Orchestrates the user directory, decision store and geocoder
#[derive(Clone)]
pub struct FriendService {
    users: Arc<dyn UserDirectory>,
    decisions: Arc<dyn DecisionStore>,
    geocoder: Arc<dyn Geocoder>,
}

impl FriendService {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        decisions: Arc<dyn DecisionStore>,
        geocoder: Arc<dyn Geocoder>,
    ) -> Self {
        Self {
            users,
            decisions,
            geocoder,
        }
    }

    pub async fn get_user(&self, user_id: i64) -> Result<User, FriendServiceError> {
        Ok(self.users.get_user(user_id).await?)
    }

    /// Potential friends of `user_id`, ordered by id
    pub async fn potential_friends(&self, user_id: i64) -> Result<Vec<User>, FriendServiceError> {
        let current_user = self.users.get_user(user_id).await?;
        let pool = self.users.candidate_pool(&current_user).await?;

        let mut decisions = self.decisions.decisions_by_actor(user_id).await?;
        decisions.extend(self.decisions.decisions_by_target(user_id).await?);

        let result = find_potential_friends(&current_user, pool, &decisions);

        tracing::info!(
            "Returning {} potential friends for user {} (from {} candidates)",
            result.candidates.len(),
            user_id,
            result.total_candidates
        );

        Ok(result.candidates)
    }

    /// Record a like or dislike from `actor_id` toward `target_id`
    ///
    /// The target must currently be a potential friend of the actor; the
    /// check and the insert happen atomically in the decision store.
    /// Repeating an identical decision succeeds without writing anything.
    pub async fn record_decision(
        &self,
        actor_id: i64,
        target_id: i64,
        kind: DecisionKind,
    ) -> Result<Recorded, FriendServiceError> {
        match self.decisions.record_if_eligible(actor_id, target_id, kind).await? {
            RecordOutcome::Recorded(decision) => {
                tracing::info!("Recorded {:?} from {} to {}", kind, actor_id, target_id);
                Ok(Recorded::New(decision))
            }
            RecordOutcome::AlreadyRecorded => {
                tracing::debug!("Duplicate {:?} from {} to {} absorbed", kind, actor_id, target_id);
                Ok(Recorded::Existing)
            }
            RecordOutcome::Rejected(reason) => {
                tracing::info!(
                    "Rejected {:?} from {} to {}: {}",
                    kind,
                    actor_id,
                    target_id,
                    reason
                );
                Err(FriendServiceError::NotPotentialFriend(reason))
            }
        }
    }

    /// Update a user's profile, re-deriving coordinates from the zip code
    ///
    /// An unknown zip code leaves the user without coordinates, which makes
    /// them unmatchable until corrected.
    pub async fn edit_profile(
        &self,
        user_id: i64,
        mut update: ProfileUpdate,
    ) -> Result<User, FriendServiceError> {
        update.coordinates = self.geocoder.locate(&update.zip_code).await?;
        if update.coordinates.is_none() {
            tracing::warn!("No coordinates for zip code {} (user {})", update.zip_code, user_id);
        }

        Ok(self.users.update_profile(user_id, update).await?)
    }

    /// Health check for the backing storage
    pub async fn health_check(&self) -> bool {
        match self.decisions.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                tracing::warn!("Storage health check failed: {}", e);
                false
            }
        }
    }
}
