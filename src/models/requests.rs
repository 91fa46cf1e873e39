use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to edit the caller's profile
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EditProfileRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 30))]
    pub first_name: String,
    #[validate(length(min = 1, max = 30))]
    pub last_name: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub hobbies: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub interests: String,
    #[validate(length(min = 3, max = 10))]
    pub zip_code: String,
    #[validate(range(min = 1.0, max = 12500.0))]
    pub friend_radius_miles: f64,
    #[serde(default)]
    #[validate(url)]
    pub image_url: Option<String>,
}
