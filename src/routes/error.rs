use actix_web::{error, http::StatusCode, HttpResponse};
use std::fmt;

use crate::models::ErrorResponse;
use crate::services::FriendServiceError;

pub const INVALID_CREDENTIALS: &str = "invalid-credentials";

/// JSON error returned by every handler and extractor
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: String,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, error: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            error: error.to_string(),
            message: message.into(),
        }
    }

    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS, message)
    }

    pub fn bad_request(error: &str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error, message)
    }

    pub fn body(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.error.clone(),
            message: self.message.clone(),
            status_code: self.status.as_u16(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for ApiError {}

impl error::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status).json(self.body())
    }
}

impl From<FriendServiceError> for ApiError {
    fn from(err: FriendServiceError) -> Self {
        match err {
            FriendServiceError::NotFound(msg) => {
                ApiError::new(StatusCode::NOT_FOUND, "user-not-found", msg)
            }
            FriendServiceError::NotPotentialFriend(reason) => {
                ApiError::bad_request("user-not-potential-friend", reason.to_string())
            }
            FriendServiceError::Store(e) => {
                tracing::error!("Storage failure: {}", e);
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "storage-error", e.to_string())
            }
            FriendServiceError::Geocode(e) => {
                tracing::error!("Geocoding failure: {}", e);
                ApiError::new(StatusCode::BAD_GATEWAY, "geocoding-failed", e.to_string())
            }
        }
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    ApiError::bad_request("invalid_json", format!("Invalid JSON: {}", err)).into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    ApiError::bad_request("invalid_query", format!("Invalid query: {}", err)).into()
}

/// Handle path parameter errors
pub fn handle_path_error(err: error::PathError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    ApiError::new(StatusCode::NOT_FOUND, "not-found", format!("Invalid path: {}", err)).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Ineligible;
    use actix_web::ResponseError;

    #[test]
    fn test_not_potential_friend_maps_to_bad_request() {
        let err: ApiError = FriendServiceError::NotPotentialFriend(Ineligible::OutOfRange).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.body().error, "user-not-potential-friend");
        assert_eq!(err.body().message, "outside friend radius");
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let err: ApiError = FriendServiceError::NotFound("User 9 not found".into()).into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
