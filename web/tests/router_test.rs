//! End-to-end router tests over the in-memory store.

#![allow(clippy::unwrap_used)]

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{NaiveDate, Utc};
use eventease_core::event::{CategoryInventory, Event, TicketInventory};
use eventease_core::store::{MemoryRepository, TicketingRepository};
use eventease_core::types::{EventId, TicketCategory, UserId};
use eventease_core::user::{User, UserRole};
use eventease_web::auth::{Identity, StaticTokenSessions};
use eventease_web::{build_router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

struct TestApp {
    router: Router,
    event_id: EventId,
}

async fn spawn_app() -> TestApp {
    let repository = Arc::new(MemoryRepository::new());

    let admin = User::new(UserId::new(), "Admin", "admin@test.local").with_role(UserRole::Admin);
    let user = User::new(UserId::new(), "Buyer", "buyer@test.local").with_wallet(100_000);

    let sessions = StaticTokenSessions::new();
    sessions.register(
        "admin-token",
        Identity {
            user_id: admin.id,
            role: UserRole::Admin,
        },
    );
    sessions.register(
        "user-token",
        Identity {
            user_id: user.id,
            role: UserRole::User,
        },
    );

    let mut inventory = TicketInventory::default();
    *inventory.category_mut(TicketCategory::Vip) = CategoryInventory {
        remaining: 5,
        issued: 0,
        price: 2_000,
    };
    let event = Event {
        id: EventId::new(),
        name: "Router Test Concert".to_string(),
        description: "integration fixture".to_string(),
        date: NaiveDate::from_ymd_opt(2027, 6, 1).unwrap(),
        time: "19:30".to_string(),
        location: "Test Hall".to_string(),
        image_url: None,
        inventory,
        created_at: Utc::now(),
    };
    let event_id = event.id;

    repository.insert_user(&admin).await.unwrap();
    repository.insert_user(&user).await.unwrap();
    repository.insert_event(&event).await.unwrap();

    let state = AppState::new(repository, Arc::new(sessions));
    TestApp {
        router: build_router(state),
        event_id,
    }
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, token: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_endpoint_is_public() {
    let app = spawn_app().await;
    let response = app.router.oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn availability_is_public() {
    let app = spawn_app().await;
    let uri = format!("/api/events/{}/availability", app.event_id.as_uuid());
    let response = app.router.oneshot(get(&uri, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["VIP"]["remaining"], 5);
    assert_eq!(body["VIP"]["price"], 2_000);
}

#[tokio::test]
async fn requests_without_token_are_unauthorized() {
    let app = spawn_app().await;
    let response = app.router.oneshot(get("/api/tickets", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_endpoints_reject_regular_users() {
    let app = spawn_app().await;
    let response = app
        .router
        .oneshot(get("/api/tickets/resale", Some("user-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn purchase_and_list_round_trip() {
    let app = spawn_app().await;

    let request = post_json(
        "/api/tickets/purchase",
        "user-token",
        &json!({
            "event_id": app.event_id.as_uuid(),
            "category": "VIP",
            "quantity": 2,
            "payment_method": "wallet",
        }),
    );
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = json_body(response).await;
    let tickets = body["tickets"].as_array().unwrap();
    assert_eq!(tickets.len(), 2);
    assert_eq!(tickets[0]["seat_label"], "VIP-1");
    assert_eq!(tickets[1]["seat_label"], "VIP-2");

    let response = app
        .router
        .oneshot(get("/api/tickets", Some("user-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn unknown_payment_method_is_rejected() {
    let app = spawn_app().await;
    let request = post_json(
        "/api/tickets/purchase",
        "user-token",
        &json!({
            "event_id": app.event_id.as_uuid(),
            "category": "VIP",
            "quantity": 1,
            "payment_method": "crypto",
        }),
    );
    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["code"], "INVALID_PAYMENT_METHOD");
}

#[tokio::test]
async fn insufficient_inventory_reports_remaining() {
    let app = spawn_app().await;
    let request = post_json(
        "/api/tickets/purchase",
        "user-token",
        &json!({
            "event_id": app.event_id.as_uuid(),
            "category": "VIP",
            "quantity": 6,
            "payment_method": "card",
        }),
    );
    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["code"], "INSUFFICIENT_INVENTORY");
}
