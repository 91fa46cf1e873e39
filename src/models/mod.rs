// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{User, Coordinates, Decision, DecisionKind, ProfileUpdate, BoundingBox};
pub use requests::EditProfileRequest;
pub use responses::{UserResponse, PotentialFriendsResponse, DecisionResponse, HealthResponse, ErrorResponse};
