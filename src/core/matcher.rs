use crate::core::filters::{check_eligibility, DecisionIndex};
use crate::models::{Decision, User};

/// Result of the matching process
#[derive(Debug)]
pub struct MatchResult {
    pub candidates: Vec<User>,
    pub total_candidates: usize,
}

/// Compute the potential friends of `current_user`
///
/// A candidate from `pool` is kept when it is not the requester, the
/// requester has not decided on it yet, it has not disliked the requester,
/// and the distance between the two is within both friend radii. Users
/// without usable coordinates never match. The result is ordered by id and
/// contains each user at most once.
///
/// # Arguments
/// * `current_user` - The requesting user
/// * `pool` - Candidate users, possibly pre-filtered geographically
/// * `decisions` - Decisions with the requester as actor or target
pub fn find_potential_friends(
    current_user: &User,
    pool: Vec<User>,
    decisions: &[Decision],
) -> MatchResult {
    let total_candidates = pool.len();
    let index = DecisionIndex::build(current_user.id, decisions);

    let mut candidates: Vec<User> = pool
        .into_iter()
        .filter(|candidate| check_eligibility(current_user, candidate, &index).is_ok())
        .collect();

    candidates.sort_by_key(|candidate| candidate.id);
    candidates.dedup_by_key(|candidate| candidate.id);

    MatchResult {
        candidates,
        total_candidates,
    }
}

/// Convenience form of [`find_potential_friends`] returning only the users
pub fn potential_friends(current_user: &User, pool: Vec<User>, decisions: &[Decision]) -> Vec<User> {
    find_potential_friends(current_user, pool, decisions).candidates
}
