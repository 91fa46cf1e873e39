use actix_web::{web, HttpResponse};
use std::sync::Arc;
use validator::Validate;

use crate::models::{
    DecisionKind, DecisionResponse, EditProfileRequest, HealthResponse, PotentialFriendsResponse,
    ProfileUpdate, UserResponse,
};
use crate::routes::auth::{AuthenticatedUser, TokenVerifier};
use crate::routes::error::ApiError;
use crate::services::FriendService;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub friends: FriendService,
    pub tokens: Arc<TokenVerifier>,
}

/// Configure all user-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/users/{user_id}", web::get().to(show_user))
        .route("/users/{user_id}/potentials", web::get().to(get_potential_friends))
        .route("/users/{user_id}/edit", web::post().to(edit_user))
        .route("/users/like/{other_id}", web::post().to(like_potential_friend))
        .route("/users/dislike/{other_id}", web::post().to(dislike_potential_friend));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let status = if state.friends.health_check().await { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Get a user's info
///
/// GET /api/v1/users/{user_id}
async fn show_user(
    state: web::Data<AppState>,
    _caller: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let user = state.friends.get_user(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(UserResponse { user }))
}

/// List users that are potential friends of the caller
///
/// GET /api/v1/users/{user_id}/potentials
///
/// Potential friends are users the caller has not liked or disliked, who
/// have not disliked the caller, and whose distance is within both users'
/// friend radius.
async fn get_potential_friends(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();
    caller.ensure_is(user_id)?;

    let user_options = state.friends.potential_friends(user_id).await?;

    Ok(HttpResponse::Ok().json(PotentialFriendsResponse { user_options }))
}

/// Update the caller's profile
///
/// POST /api/v1/users/{user_id}/edit
///
/// Request body:
/// ```json
/// {
///   "email": "test1@test.com",
///   "first_name": "test",
///   "last_name": "test",
///   "hobbies": "test",
///   "interests": "test",
///   "zip_code": "94103",
///   "friend_radius_miles": 5,
///   "image_url": "https://..."
/// }
/// ```
async fn edit_user(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
    path: web::Path<i64>,
    req: web::Json<EditProfileRequest>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();
    caller.ensure_is(user_id)?;

    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for edit of user {}: {:?}", user_id, errors);
        return Err(ApiError::bad_request("unable-to-update-user", errors.to_string()));
    }

    let req = req.into_inner();
    let update = ProfileUpdate {
        email: req.email,
        first_name: req.first_name,
        last_name: req.last_name,
        hobbies: req.hobbies,
        interests: req.interests,
        zip_code: req.zip_code,
        friend_radius_miles: req.friend_radius_miles,
        image_url: req.image_url,
        coordinates: None,
    };

    let user = state.friends.edit_profile(user_id, update).await?;

    Ok(HttpResponse::Ok().json(UserResponse { user }))
}

/// Like a potential friend of the caller
///
/// POST /api/v1/users/like/{other_id}
async fn like_potential_friend(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    record(&state, &caller, path.into_inner(), DecisionKind::Like).await
}

/// Dislike a potential friend of the caller
///
/// POST /api/v1/users/dislike/{other_id}
async fn dislike_potential_friend(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    record(&state, &caller, path.into_inner(), DecisionKind::Dislike).await
}

async fn record(
    state: &AppState,
    caller: &AuthenticatedUser,
    other_id: i64,
    kind: DecisionKind,
) -> Result<HttpResponse, ApiError> {
    state.friends.record_decision(caller.user_id, other_id, kind).await?;

    Ok(HttpResponse::Ok().json(DecisionResponse {
        status: kind.status().to_string(),
    }))
}
