use serde::{Deserialize, Serialize};
use crate::models::domain::User;

/// Response wrapping a single user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: User,
}

/// Response for the potential friends endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PotentialFriendsResponse {
    pub user_options: Vec<User>,
}

/// Response for like/dislike endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionResponse {
    pub status: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
