// Integration tests for /api/contacts

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use nearby::api::{create_app, AppParts};
use nearby::assistant::DisabledAssistant;
use nearby::config::ApiConfig;
use nearby::contact::demo_roster;
use nearby::location::UnavailablePosition;
use nearby::state::{EngineOptions, RadarEngine};
use nearby::telephony::LogDialer;
use std::sync::Arc;
use tower::ServiceExt;

fn create_test_app() -> (Router, Arc<RadarEngine>) {
    let engine = Arc::new(RadarEngine::new(
        EngineOptions::default(),
        Arc::new(UnavailablePosition),
        demo_roster(),
    ));
    let app = create_app(
        AppParts {
            engine: Arc::clone(&engine),
            assistant: Arc::new(DisabledAssistant),
            dialer: Arc::new(LogDialer),
        },
        &ApiConfig::default(),
    );
    (app, engine)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// GET /api/contacts returns the seeded roster in order.
#[tokio::test]
async fn test_list_contacts() {
    let (app, _) = create_test_app();

    let (status, body) = send(&app, get("/api/contacts")).await;

    assert_eq!(status, StatusCode::OK);
    let contacts = body.as_array().unwrap();
    assert_eq!(contacts.len(), 7);
    assert_eq!(contacts[0]["id"], "c-001");
    assert_eq!(contacts[0]["name"], "Sarah Chen");
    assert!(contacts[0]["position"]["latitude"].is_number());
}

/// POST /api/contacts appends a contact with defaults filled in.
#[tokio::test]
async fn test_add_contact() {
    let (app, engine) = create_test_app();

    let (status, body) = send(
        &app,
        post_json(
            "/api/contacts",
            serde_json::json!({ "name": "  Dana Park ", "phone": "+1 212 555 0199" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Dana Park");
    assert_eq!(body["registered"], false);
    assert!(body["avatar"].as_str().unwrap().contains("Dana"));

    let contacts = engine.contacts();
    assert_eq!(contacts.len(), 8);
    assert_eq!(contacts[7].name, "Dana Park");

    let id = body["id"].as_str().unwrap();
    let (status, fetched) = send(&app, get(&format!("/api/contacts/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["phone"], "+1 212 555 0199");
}

/// Empty name is rejected and the roster is unchanged.
#[tokio::test]
async fn test_add_contact_empty_name_rejected() {
    let (app, engine) = create_test_app();

    let (status, body) = send(
        &app,
        post_json(
            "/api/contacts",
            serde_json::json!({ "name": "   ", "phone": "+1 212 555 0199" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());
    assert_eq!(engine.contacts().len(), 7);
}

/// Empty phone is rejected as well.
#[tokio::test]
async fn test_add_contact_empty_phone_rejected() {
    let (app, engine) = create_test_app();

    let (status, _) = send(
        &app,
        post_json("/api/contacts", serde_json::json!({ "name": "Dana", "phone": "" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(engine.contacts().len(), 7);
}

/// Unknown ids return 404.
#[tokio::test]
async fn test_get_unknown_contact() {
    let (app, _) = create_test_app();

    let (status, body) = send(&app, get("/api/contacts/c-404")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Contact not found");
}

/// A call needs explicit confirmation before anything is dialled.
#[tokio::test]
async fn test_call_flow() {
    let (app, _) = create_test_app();

    let (status, body) = send(
        &app,
        post_json("/api/contacts/c-001/call", serde_json::json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "confirmation_required");
    assert_eq!(body["prompt"], "Call Sarah Chen at +1 (212) 555-0142?");

    let (status, body) = send(
        &app,
        post_json("/api/contacts/c-001/call", serde_json::json!({ "confirm": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "dialing");
    assert_eq!(body["uri"], "tel:+12125550142");
}
