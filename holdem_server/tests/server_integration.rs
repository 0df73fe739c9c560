//! Integration tests for the HTTP API.
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot` over an
//! in-memory balance store, so no database or socket is needed.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use holdem_server::api::{AppState, create_router};
use holdem_table::table::{TableConfig, TableManager};
use holdem_table::wallet::{BalanceStore, InMemoryBalanceStore, TableId};
use holdem_table::{Address, Round, Snapshot};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tower::ServiceExt; // For `oneshot` method

const STARTING_BALANCE: i64 = 500;

async fn create_test_server() -> (axum::Router, Arc<InMemoryBalanceStore>, TableId) {
    let store = Arc::new(InMemoryBalanceStore::with_default_balance(STARTING_BALANCE));
    let table_manager = TableManager::new(store.clone());
    let table_id = table_manager
        .create_table(TableConfig {
            name: "Test Table".to_string(),
            deck_seed: Some(11),
            ..Default::default()
        })
        .await
        .unwrap();

    let app = create_router(AppState::new(table_manager, None));
    (app, store, table_id)
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

async fn get(app: &axum::Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn post(app: &axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, bytes) = send(app, request).await;
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn snapshot(app: &axum::Router, table_id: TableId, viewer: &str) -> Snapshot {
    let (status, body) = get(
        app,
        &format!("/api/v1/tables/{}?viewer={}", table_id, viewer),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice(&body).unwrap()
}

async fn seat(app: &axum::Router, table_id: TableId, address: &str, position: usize) -> StatusCode {
    let (status, _) = post(
        app,
        &format!("/api/v1/tables/{}/seat", table_id),
        json!({"address": address, "position": position, "buy_in": 100}),
    )
    .await;
    status
}

// ============================================================================
// Health and lobby
// ============================================================================

#[tokio::test]
async fn test_health_check_endpoint() {
    let (app, _, _) = create_test_server().await;

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);

    let health: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["status"], "healthy");
    assert!(health["database"].is_null());
    assert_eq!(health["tables"]["active_count"], 1);
}

#[tokio::test]
async fn test_list_tables() {
    let (app, _, table_id) = create_test_server().await;

    let (status, body) = get(&app, "/api/v1/tables").await;
    assert_eq!(status, StatusCode::OK);

    let tables: Value = serde_json::from_slice(&body).unwrap();
    let tables = tables.as_array().unwrap();
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0]["id"], table_id);
    assert_eq!(tables[0]["name"], "Test Table");
    assert_eq!(tables[0]["occupied_seats"], 0);
}

#[tokio::test]
async fn test_unknown_table_is_not_found() {
    let (app, _, _) = create_test_server().await;

    let (status, _) = get(&app, "/api/v1/tables/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = post(
        &app,
        "/api/v1/tables/999/leave",
        json!({"address": "alice"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Table not found");
}

// ============================================================================
// Seating
// ============================================================================

#[tokio::test]
async fn test_take_seat_and_leave() {
    let (app, store, table_id) = create_test_server().await;

    assert_eq!(seat(&app, table_id, "alice", 2).await, StatusCode::OK);
    let alice = store.get_user(&Address::new("alice")).await.unwrap();
    assert_eq!(alice.balance, STARTING_BALANCE - 100);

    let view = snapshot(&app, table_id, "alice").await;
    assert_eq!(view.own_seat, Some(2));
    assert_eq!(view.seats[2].stack, 100);

    // Seat taken
    assert_eq!(seat(&app, table_id, "bob", 2).await, StatusCode::CONFLICT);
    // Already seated
    assert_eq!(seat(&app, table_id, "alice", 4).await, StatusCode::CONFLICT);

    let uri = format!("/api/v1/tables/{}/leave", table_id);
    let (status, _) = post(&app, &uri, json!({"address": "alice"})).await;
    assert_eq!(status, StatusCode::OK);
    let alice = store.get_user(&Address::new("alice")).await.unwrap();
    assert_eq!(alice.balance, STARTING_BALANCE);

    let (status, body) = post(&app, &uri, json!({"address": "alice"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "not seated");
}

#[tokio::test]
async fn test_buy_in_out_of_range() {
    let (app, _, table_id) = create_test_server().await;

    let (status, body) = post(
        &app,
        &format!("/api/v1/tables/{}/seat", table_id),
        json!({"address": "alice", "position": 0, "buy_in": 10_000}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("buy-in"));
}

// ============================================================================
// Playing a hand
// ============================================================================

#[tokio::test]
async fn test_heads_up_fold_over_http() {
    let (app, _, table_id) = create_test_server().await;
    let action_uri = format!("/api/v1/tables/{}/action", table_id);

    let (status, _) = post(
        &app,
        &action_uri,
        json!({"address": "alice", "action": {"type": "check"}}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "alice is not seated yet");

    assert_eq!(seat(&app, table_id, "alice", 0).await, StatusCode::OK);
    assert_eq!(seat(&app, table_id, "bob", 1).await, StatusCode::OK);

    let view = timeout(Duration::from_secs(10), async {
        loop {
            let view = snapshot(&app, table_id, "alice").await;
            if view.current_seat.is_some() {
                return view;
            }
            sleep(Duration::from_millis(100)).await;
        }
    })
    .await
    .expect("hand never started");

    assert_eq!(view.round, Round::Preflop);
    assert_eq!(view.pot, 3);
    assert_eq!(view.current_seat, Some(1));
    assert_eq!(view.seats[0].hole_cards.len(), 2);
    assert!(view.seats[1].hole_cards.is_empty());

    // Alice is the big blind and must wait for bob.
    let (status, body) = post(
        &app,
        &action_uri,
        json!({"address": "alice", "action": {"type": "check"}}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "not your turn");

    // A raise below the minimum is rejected without touching the table.
    let (status, _) = post(
        &app,
        &action_uri,
        json!({"address": "bob", "action": {"type": "raise", "amount": 1}}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(snapshot(&app, table_id, "bob").await.pot, 3);

    let (status, _) = post(
        &app,
        &action_uri,
        json!({"address": "bob", "action": {"type": "fold"}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let view = snapshot(&app, table_id, "alice").await;
    assert_eq!(view.round, Round::Settle);
    assert_eq!(view.prizes.map(|p| p[0]), Some(3));
    assert!(view.community_cards.is_empty());
}
