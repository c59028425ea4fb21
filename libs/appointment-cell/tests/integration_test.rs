use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, Local};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::router::appointment_routes;
use shared_config::AppConfig;
use shared_utils::test_utils::{JwtTestUtils, MockPortalResponses, TestConfig, TestUser};

fn create_test_app(config: AppConfig) -> Router {
    appointment_routes(Arc::new(config))
}

#[tokio::test]
async fn request_without_token_is_unauthorized() {
    let config = TestConfig::default();
    let app = create_test_app(config.to_app_config());

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/requests")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_with_bad_signature_is_unauthorized() {
    let config = TestConfig::default();
    let app = create_test_app(config.to_app_config());

    let user = TestUser::patient("alice@example.com");
    let token = JwtTestUtils::create_invalid_signature_token(&user);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/requests")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_unauthorized() {
    let config = TestConfig::default();
    let app = create_test_app(config.to_app_config());

    let user = TestUser::patient("alice@example.com");
    let token = JwtTestUtils::create_expired_token(&user, &config.jwt_secret);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/requests")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn patient_books_their_own_appointment() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_portal_url(&mock_server.uri());
    let app = create_test_app(config.to_app_config());

    let user = TestUser::patient("alice@example.com");
    let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, None);
    let date = Local::now().date_naive() + Duration::days(1);

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockPortalResponses::doctor_response("Dr. Reyes", "General Dentistry")
        ])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockPortalResponses::appointment_response(
                &user.id,
                "Dr. Reyes",
                &date.to_string(),
                "10:00",
                "pending"
            )
        ])))
        .mount(&mock_server)
        .await;

    let body = json!({
        "patient_id": user.id,
        "patient_name": "Alice Mercer",
        "doctor": "Dr. Reyes",
        "date": date.to_string(),
        "time": "10:00",
        "reason": "checkup"
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header("Authorization", format!("Bearer {}", token))
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn booked_out_slot_returns_conflict() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_portal_url(&mock_server.uri());
    let app = create_test_app(config.to_app_config());

    let user = TestUser::patient("alice@example.com");
    let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, None);
    let date = Local::now().date_naive() + Duration::days(1);

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockPortalResponses::doctor_response("Dr. Reyes", "General Dentistry")
        ])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockPortalResponses::appointment_response(
                &Uuid::new_v4().to_string(),
                "Dr. Reyes",
                &date.to_string(),
                "10:00",
                "confirmed"
            )
        ])))
        .mount(&mock_server)
        .await;

    let body = json!({
        "patient_id": user.id,
        "patient_name": "Alice Mercer",
        "doctor": "Dr. Reyes",
        "date": date.to_string(),
        "time": "10:00",
        "reason": "checkup"
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header("Authorization", format!("Bearer {}", token))
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}
