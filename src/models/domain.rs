use serde::{Deserialize, Serialize};

/// Geographic position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Both components finite and inside the valid degree ranges
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// A registered user as seen by the matching core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub image_url: String,
    #[serde(default)]
    pub hobbies: String,
    #[serde(default)]
    pub interests: String,
    pub zip_code: String,
    pub friend_radius_miles: f64,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

impl User {
    /// Coordinates usable for distance checks, if any
    pub fn location(&self) -> Option<Coordinates> {
        self.coordinates.filter(Coordinates::is_valid)
    }

    /// Search radius in miles, if it is a usable positive number
    pub fn radius(&self) -> Option<f64> {
        let radius = self.friend_radius_miles;
        (radius.is_finite() && radius > 0.0).then_some(radius)
    }
}

/// Polarity of a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "decision_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DecisionKind {
    Like,
    Dislike,
}

impl DecisionKind {
    /// Status string returned to clients once the decision is stored
    pub fn status(&self) -> &'static str {
        match self {
            DecisionKind::Like => "user-liked",
            DecisionKind::Dislike => "user-disliked",
        }
    }
}

/// A like or dislike from one user toward another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub actor_id: i64,
    pub target_id: i64,
    pub kind: DecisionKind,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Decision {
    pub fn new(actor_id: i64, target_id: i64, kind: DecisionKind) -> Self {
        Self {
            actor_id,
            target_id,
            kind,
            created_at: chrono::Utc::now(),
        }
    }
}

/// Profile fields a user may change; coordinates are derived from `zip_code`
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub hobbies: String,
    pub interests: String,
    pub zip_code: String,
    pub friend_radius_miles: f64,
    pub image_url: Option<String>,
    pub coordinates: Option<Coordinates>,
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}
