// Integration tests for Friender: services over the memory store, the HTTP
// geocoder against a mock server, and the HTTP routes end to end

use actix_web::{http::StatusCode, test, web, App};
use async_trait::async_trait;
use friender::core::Ineligible;
use friender::models::{Coordinates, DecisionKind, ProfileUpdate, User};
use friender::routes::{self, auth::{Claims, TokenVerifier}, AppState};
use friender::services::{
    DecisionStore, FriendService, FriendServiceError, GeocodeError, Geocoder, HttpGeocoder,
    MemoryStore, Recorded,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

const SECRET: &str = "test-secret";

/// Geocoder answering from a fixed table
struct FixedGeocoder(HashMap<String, Coordinates>);

#[async_trait]
impl Geocoder for FixedGeocoder {
    async fn locate(&self, postal_code: &str) -> Result<Option<Coordinates>, GeocodeError> {
        Ok(self.0.get(postal_code).copied())
    }
}

fn create_user(id: i64, lat: f64, lon: f64, radius: f64) -> User {
    User {
        id,
        username: format!("test{}", id),
        email: format!("test{}@test.com", id),
        first_name: "test".to_string(),
        last_name: "test".to_string(),
        image_url: "/static/images/default-pic.png".to_string(),
        hobbies: "test".to_string(),
        interests: "test".to_string(),
        zip_code: "94103".to_string(),
        friend_radius_miles: radius,
        coordinates: Some(Coordinates::new(lat, lon)),
    }
}

/// Users 1-3 close together in San Francisco, user 4 in Oakland, user 5 in New York
async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.insert_user(create_user(1, 37.7749, -122.4194, 10.0)).await;
    store.insert_user(create_user(2, 37.7790, -122.4180, 10.0)).await;
    store.insert_user(create_user(3, 37.7700, -122.4250, 10.0)).await;
    store.insert_user(create_user(4, 37.8044, -122.2712, 5.0)).await;
    store.insert_user(create_user(5, 40.7128, -74.0060, 50.0)).await;
    store
}

fn service(store: Arc<MemoryStore>) -> FriendService {
    let mut zips = HashMap::new();
    zips.insert("94612".to_string(), Coordinates::new(37.8044, -122.2712));
    FriendService::new(store.clone(), store, Arc::new(FixedGeocoder(zips)))
}

fn token_for(user_id: i64) -> String {
    let claims = Claims {
        username: format!("test{}", user_id),
        user_id,
        exp: None,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
}

fn ids(users: &[User]) -> Vec<i64> {
    users.iter().map(|u| u.id).collect()
}

#[tokio::test]
async fn test_potential_friends_through_service() {
    let friends = service(seeded_store().await);

    let result = friends.potential_friends(1).await.unwrap();

    // User 4 is ~8mi away but only searches 5mi; user 5 is across the country
    assert_eq!(ids(&result), vec![2, 3]);
}

#[tokio::test]
async fn test_like_removes_candidate_and_dislike_hides_actor() {
    let store = seeded_store().await;
    let friends = service(store.clone());

    let outcome = friends.record_decision(1, 2, DecisionKind::Like).await.unwrap();
    assert!(matches!(outcome, Recorded::New(_)));
    assert_eq!(ids(&friends.potential_friends(1).await.unwrap()), vec![3]);

    // User 1 still sees 3; after 3 dislikes 1, they disappear from 1's list
    friends.record_decision(3, 1, DecisionKind::Dislike).await.unwrap();
    assert!(friends.potential_friends(1).await.unwrap().is_empty());

    // A like toward user 1 does not hide user 1 from user 2
    assert_eq!(ids(&friends.potential_friends(2).await.unwrap()), vec![1, 3]);
}

#[tokio::test]
async fn test_record_rejects_non_candidates() {
    let store = seeded_store().await;
    let friends = service(store.clone());

    let far = friends.record_decision(1, 5, DecisionKind::Like).await;
    assert!(matches!(far, Err(FriendServiceError::NotPotentialFriend(Ineligible::OutOfRange))));

    let own = friends.record_decision(1, 1, DecisionKind::Like).await;
    assert!(matches!(own, Err(FriendServiceError::NotPotentialFriend(Ineligible::SelfDecision))));

    let missing = friends.record_decision(1, 42, DecisionKind::Like).await;
    assert!(matches!(missing, Err(FriendServiceError::NotFound(_))));

    assert_eq!(store.decision_count().await, 0);
}

#[tokio::test]
async fn test_duplicate_like_is_absorbed() {
    let store = seeded_store().await;
    let friends = service(store.clone());

    friends.record_decision(1, 2, DecisionKind::Like).await.unwrap();
    let again = friends.record_decision(1, 2, DecisionKind::Like).await.unwrap();

    assert_eq!(again, Recorded::Existing);
    assert_eq!(store.decisions_by_actor(1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_like_after_being_disliked_rejected() {
    let store = seeded_store().await;
    let friends = service(store.clone());

    friends.record_decision(2, 1, DecisionKind::Dislike).await.unwrap();
    let result = friends.record_decision(1, 2, DecisionKind::Like).await;

    assert!(matches!(
        result,
        Err(FriendServiceError::NotPotentialFriend(Ineligible::DislikedByTarget))
    ));
}

#[tokio::test]
async fn test_edit_profile_geocodes_zip() {
    let store = seeded_store().await;
    let friends = service(store.clone());

    let update = ProfileUpdate {
        email: "moved@test.com".to_string(),
        first_name: "test".to_string(),
        last_name: "test".to_string(),
        hobbies: String::new(),
        interests: String::new(),
        zip_code: "94612".to_string(),
        friend_radius_miles: 5.0,
        image_url: None,
        coordinates: None,
    };
    let user = friends.edit_profile(1, update.clone()).await.unwrap();
    assert_eq!(user.coordinates, Some(Coordinates::new(37.8044, -122.2712)));
    assert_eq!(user.image_url, "/static/images/default-pic.png");

    // Now co-located with user 4
    assert_eq!(ids(&friends.potential_friends(1).await.unwrap()), vec![4]);

    // Unknown zip: stored without coordinates and unmatchable
    let unknown = ProfileUpdate { zip_code: "00000".to_string(), ..update };
    let user = friends.edit_profile(1, unknown).await.unwrap();
    assert!(user.coordinates.is_none());
    assert!(friends.potential_friends(1).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_http_geocoder_reads_center() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/geocoding/v5/mapbox.places/94103.json")
        .match_query(mockito::Matcher::AllOf(vec![
            mockito::Matcher::UrlEncoded("types".into(), "postcode".into()),
            mockito::Matcher::UrlEncoded("access_token".into(), "token".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"features":[{"center":[-122.42,37.76]}]}"#)
        .create_async()
        .await;

    let geocoder = HttpGeocoder::new(
        server.url(),
        "token".to_string(),
        "us".to_string(),
        Duration::from_secs(5),
    )
    .unwrap();

    let coords = geocoder.locate("94103").await.unwrap();

    mock.assert_async().await;
    assert_eq!(coords, Some(Coordinates::new(37.76, -122.42)));
}

#[tokio::test]
async fn test_http_geocoder_errors() {
    let mut server = mockito::Server::new_async().await;
    let _unauthorized = server
        .mock("GET", "/geocoding/v5/mapbox.places/11111.json")
        .match_query(mockito::Matcher::Any)
        .with_status(401)
        .create_async()
        .await;
    let _empty = server
        .mock("GET", "/geocoding/v5/mapbox.places/22222.json")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(r#"{"features":[]}"#)
        .create_async()
        .await;

    let geocoder = HttpGeocoder::new(
        server.url(),
        "bad".to_string(),
        "us".to_string(),
        Duration::from_secs(5),
    )
    .unwrap();

    assert!(matches!(geocoder.locate("11111").await, Err(GeocodeError::Unauthorized)));
    assert!(geocoder.locate("22222").await.unwrap().is_none());
}

async fn app_state() -> AppState {
    AppState {
        friends: service(seeded_store().await),
        tokens: Arc::new(TokenVerifier::new(SECRET)),
    }
}

#[actix_web::test]
async fn test_route_potentials_and_like() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state().await))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/v1/users/1/potentials")
        .insert_header(("Authorization", token_for(1)))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let options: Vec<i64> = body["user_options"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["id"].as_i64().unwrap())
        .collect();
    assert_eq!(options, vec![2, 3]);

    let req = test::TestRequest::post()
        .uri("/api/v1/users/like/2")
        .insert_header(("Authorization", format!("Bearer {}", token_for(1))))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "status": "user-liked" }));

    // Repeating the like is absorbed
    let req = test::TestRequest::post()
        .uri("/api/v1/users/like/2")
        .insert_header(("Authorization", token_for(1)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Disliking the same user afterwards is rejected
    let req = test::TestRequest::post()
        .uri("/api/v1/users/dislike/2")
        .insert_header(("Authorization", token_for(1)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "user-not-potential-friend");
}

#[actix_web::test]
async fn test_route_auth_failures() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state().await))
            .configure(routes::configure_routes),
    )
    .await;

    // No token
    let req = test::TestRequest::get().uri("/api/v1/users/1").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Someone else's potentials
    let req = test::TestRequest::get()
        .uri("/api/v1/users/1/potentials")
        .insert_header(("Authorization", token_for(2)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid-credentials");

    // Unknown user
    let req = test::TestRequest::get()
        .uri("/api/v1/users/99")
        .insert_header(("Authorization", token_for(1)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_route_edit_validates_body() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state().await))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/users/1/edit")
        .insert_header(("Authorization", token_for(1)))
        .set_json(json!({
            "email": "not-an-email",
            "first_name": "test",
            "last_name": "test",
            "zip_code": "94612",
            "friend_radius_miles": 5
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/v1/users/1/edit")
        .insert_header(("Authorization", token_for(1)))
        .set_json(json!({
            "email": "test1@test.com",
            "first_name": "test",
            "last_name": "test",
            "zip_code": "94612",
            "friend_radius_miles": 5
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["user"]["zip_code"], "94612");
    assert_eq!(body["user"]["coordinates"]["latitude"], 37.8044);
}

#[actix_web::test]
async fn test_route_health() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state().await))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "healthy");
}
