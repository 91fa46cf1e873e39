use std::collections::HashSet;
use std::fmt;

use crate::core::distance::distance_between;
use crate::models::{Decision, DecisionKind, User};

/// Why a user is not a potential friend of another
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligible {
    /// The candidate is the requester
    SelfDecision,
    /// The requester already liked or disliked the candidate
    AlreadyDecided,
    /// The candidate disliked the requester
    DislikedByTarget,
    /// One side has no usable coordinates or radius
    MissingLocation,
    /// The distance exceeds at least one of the two radii
    OutOfRange,
}

impl fmt::Display for Ineligible {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Ineligible::SelfDecision => "cannot decide on yourself",
            Ineligible::AlreadyDecided => "decision already recorded",
            Ineligible::DislikedByTarget => "user is not available",
            Ineligible::MissingLocation => "location unknown",
            Ineligible::OutOfRange => "outside friend radius",
        };
        f.write_str(reason)
    }
}

/// Decisions involving one requester, indexed for membership tests
#[derive(Debug, Default)]
pub struct DecisionIndex {
    decided: HashSet<i64>,
    disliked_by: HashSet<i64>,
}

impl DecisionIndex {
    /// Build the index for `user_id`; decisions not involving that user are ignored
    pub fn build<'a, I>(user_id: i64, decisions: I) -> Self
    where
        I: IntoIterator<Item = &'a Decision>,
    {
        let mut index = Self::default();
        for decision in decisions {
            if decision.actor_id == user_id {
                index.decided.insert(decision.target_id);
            } else if decision.target_id == user_id && decision.kind == DecisionKind::Dislike {
                index.disliked_by.insert(decision.actor_id);
            }
        }
        index
    }

    /// Requester already liked or disliked `other_id`
    #[inline]
    pub fn has_decided(&self, other_id: i64) -> bool {
        self.decided.contains(&other_id)
    }

    /// `other_id` disliked the requester
    #[inline]
    pub fn is_disliked_by(&self, other_id: i64) -> bool {
        self.disliked_by.contains(&other_id)
    }
}

/// Check the mutual radius constraint between two users
///
/// Both users need valid coordinates and a positive radius, and the distance
/// between them must be within both radii.
#[inline]
pub fn within_mutual_radius(current: &User, candidate: &User) -> Result<(), Ineligible> {
    let (here, there) = match (current.location(), candidate.location()) {
        (Some(here), Some(there)) => (here, there),
        _ => return Err(Ineligible::MissingLocation),
    };
    let (own_radius, their_radius) = match (current.radius(), candidate.radius()) {
        (Some(own), Some(theirs)) => (own, theirs),
        _ => return Err(Ineligible::MissingLocation),
    };

    let distance = distance_between(&here, &there);
    if distance <= own_radius && distance <= their_radius {
        Ok(())
    } else {
        Err(Ineligible::OutOfRange)
    }
}

/// Evaluate every matching rule for a single pair
///
/// This is the per-pair form of the potential friends query, used when a
/// decision is written so that eligibility is re-checked without rebuilding
/// the whole candidate list.
pub fn check_eligibility(
    current: &User,
    candidate: &User,
    index: &DecisionIndex,
) -> Result<(), Ineligible> {
    if candidate.id == current.id {
        return Err(Ineligible::SelfDecision);
    }
    if index.has_decided(candidate.id) {
        return Err(Ineligible::AlreadyDecided);
    }
    if index.is_disliked_by(candidate.id) {
        return Err(Ineligible::DislikedByTarget);
    }
    within_mutual_radius(current, candidate)
}
