use async_trait::async_trait;
use thiserror::Error;

use crate::core::Ineligible;
use crate::models::{Decision, DecisionKind, ProfileUpdate, User};

/// Errors that can occur in the user directory or decision store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Outcome of an attempt to record a decision
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    /// A new decision row was written
    Recorded(Decision),
    /// The identical decision already existed; nothing was written
    AlreadyRecorded,
    /// The target is not a potential friend of the actor
    Rejected(Ineligible),
}

/// Source of user records
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Fetch a single user by id
    async fn get_user(&self, user_id: i64) -> Result<User, StoreError>;

    /// Users that may be potential friends of `user`
    ///
    /// Implementations may narrow the pool geographically but must not drop
    /// anyone within `user`'s radius.
    async fn candidate_pool(&self, user: &User) -> Result<Vec<User>, StoreError>;

    /// Overwrite the editable profile fields of a user
    async fn update_profile(&self, user_id: i64, update: ProfileUpdate) -> Result<User, StoreError>;
}

/// Source and sink of like/dislike decisions
#[async_trait]
pub trait DecisionStore: Send + Sync {
    /// Decisions made by `user_id`
    async fn decisions_by_actor(&self, user_id: i64) -> Result<Vec<Decision>, StoreError>;

    /// Decisions made about `user_id`
    async fn decisions_by_target(&self, user_id: i64) -> Result<Vec<Decision>, StoreError>;

    /// Re-check that `target_id` is a potential friend of `actor_id` and
    /// insert the decision, atomically
    async fn record_if_eligible(
        &self,
        actor_id: i64,
        target_id: i64,
        kind: DecisionKind,
    ) -> Result<RecordOutcome, StoreError>;

    /// Health check for the backing storage
    async fn health_check(&self) -> Result<bool, StoreError>;
}

/// Decide the outcome of a write given fresh rows for both users and every
/// decision between them
///
/// Shared by the store implementations so both apply the same rules inside
/// their own critical section.
pub fn resolve_record(
    actor: &User,
    target: &User,
    kind: DecisionKind,
    pair_decisions: &[Decision],
) -> Result<Decision, RecordOutcome> {
    let duplicate = pair_decisions
        .iter()
        .any(|d| d.actor_id == actor.id && d.target_id == target.id && d.kind == kind);
    if duplicate {
        return Err(RecordOutcome::AlreadyRecorded);
    }

    let index = crate::core::DecisionIndex::build(actor.id, pair_decisions);
    crate::core::check_eligibility(actor, target, &index).map_err(RecordOutcome::Rejected)?;

    Ok(Decision::new(actor.id, target.id, kind))
}
