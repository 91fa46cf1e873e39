// Core algorithm exports
pub mod distance;
pub mod filters;
pub mod matcher;

pub use distance::{haversine_distance, distance_between, calculate_bounding_box, is_within_bounding_box};
pub use filters::{check_eligibility, within_mutual_radius, DecisionIndex, Ineligible};
pub use matcher::{find_potential_friends, potential_friends, MatchResult};
