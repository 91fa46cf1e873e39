use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};

use crate::routes::error::ApiError;
use crate::routes::users::AppState;

/// Token payload issued at login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    pub user_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
}

/// Verifies HS256 tokens signed with the shared secret
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Tokens without `exp` are accepted; an `exp` that is present is enforced
        validation.required_spec_claims.clear();

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.key, &self.validation).map(|data| data.claims)
    }
}

/// The caller, as identified by the `Authorization` header
///
/// Accepts the raw token or `Bearer <token>`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub username: String,
}

impl AuthenticatedUser {
    /// Reject callers acting on another user's resources
    pub fn ensure_is(&self, user_id: i64) -> Result<(), ApiError> {
        if self.user_id == user_id {
            Ok(())
        } else {
            Err(ApiError::invalid_credentials("Token does not belong to this user"))
        }
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, ApiError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| ApiError::invalid_credentials("Authentication unavailable"))?;

    let header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::invalid_credentials("Missing Authorization header"))?;
    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();

    let claims = state.tokens.verify(token).map_err(|e| {
        tracing::debug!("Rejected token on {}: {}", req.path(), e);
        ApiError::invalid_credentials("Token invalid or expired")
    })?;

    Ok(AuthenticatedUser {
        user_id: claims.user_id,
        username: claims.username,
    })
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}
