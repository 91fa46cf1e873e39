//! Friender - potential-friend matching service
//!
//! This library provides the matching filter that decides which users are
//! potential friends of a requester, based on prior like/dislike decisions
//! and a mutual friend-radius constraint, plus the storage and HTTP plumbing
//! around it.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use self::core::{potential_friends, find_potential_friends, check_eligibility, distance::{haversine_distance, calculate_bounding_box}};
pub use models::{User, Coordinates, Decision, DecisionKind};
