//! Integration tests for the HTTP API.
//!
//! Drives the full router (middleware included) over an in-memory store.

use argon2::Params;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tourney::AuthManager;
use tourney::db::{MemoryStore, Store};
use tourney::TournamentManager;
use tourney_server::api::{AppState, create_router, request_id::REQUEST_ID_HEADER};
use tower::ServiceExt; // For `oneshot` method

/// Helper to create a test server with the default tournaments
async fn create_test_server() -> axum::Router {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    TournamentManager::new(store.clone())
        .seed_defaults()
        .await
        .unwrap();

    let params =
        Params::new(Params::MIN_M_COST, Params::MIN_T_COST, Params::MIN_P_COST, None).unwrap();
    let auth = AuthManager::with_hash_params(
        store.clone(),
        "test_pepper_for_testing_only".to_string(),
        params,
    );

    create_router(AppState::with_auth(store, auth))
}

struct TestResponse {
    status: StatusCode,
    request_id: Option<String>,
    body: Value,
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> TestResponse {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let request_id = response
        .headers()
        .get(REQUEST_ID_HEADER)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    TestResponse {
        status,
        request_id,
        body,
    }
}

async fn register(app: &axum::Router, username: &str) -> i64 {
    let res = send(
        app,
        "POST",
        "/api/users/register",
        Some(json!({"username": username, "password": "pw"})),
    )
    .await;
    assert_eq!(res.status, StatusCode::CREATED);
    res.body["id"].as_i64().unwrap()
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check_endpoint() {
    let app = create_test_server().await;

    let res = send(&app, "GET", "/health", None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["status"], "healthy");
    assert_eq!(res.body["database"], true);
    assert!(res.request_id.is_some());
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let app = create_test_server().await;

    let request = Request::builder()
        .uri("/api/tournaments")
        .header(REQUEST_ID_HEADER, "trace-me-42")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response.headers().get(REQUEST_ID_HEADER).unwrap(),
        "trace-me-42"
    );
}

// ============================================================================
// User Tests
// ============================================================================

#[tokio::test]
async fn test_register_and_login() {
    let app = create_test_server().await;
    let id = register(&app, "alice").await;

    let res = send(
        &app,
        "POST",
        "/api/users/login",
        Some(json!({"username": "alice", "password": "pw"})),
    )
    .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["userId"], id);
    assert_eq!(res.body["username"], "alice");
    assert!(res.body["message"].is_string());

    let res = send(
        &app,
        "POST",
        "/api/users/login",
        Some(json!({"username": "alice", "password": "nope"})),
    )
    .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["error"], "unauthorized");
}

#[tokio::test]
async fn test_register_errors() {
    let app = create_test_server().await;
    register(&app, "alice").await;

    let res = send(
        &app,
        "POST",
        "/api/users/register",
        Some(json!({"username": "alice", "password": "pw"})),
    )
    .await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.body["error"], "conflict");

    let res = send(
        &app,
        "POST",
        "/api/users/register",
        Some(json!({"username": "bob"})),
    )
    .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "validation_error");

    let request = Request::builder()
        .method("POST")
        .uri("/api/users/register")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Tournament Tests
// ============================================================================

#[tokio::test]
async fn test_list_seeded_tournaments() {
    let app = create_test_server().await;

    let res = send(&app, "GET", "/api/tournaments", None).await;
    assert_eq!(res.status, StatusCode::OK);
    let list = res.body.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["name"], "Campeonato de Valorant");
    assert_eq!(list[1]["game"], "Counter-Strike");
    assert!(list[0]["participants"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_tournament_and_route() {
    let app = create_test_server().await;

    let res = send(&app, "GET", "/api/tournaments/99", None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["error"], "not_found");

    let res = send(&app, "GET", "/api/tournaments/abc", None).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = send(&app, "GET", "/api/nothing-here", None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_join_errors() {
    let app = create_test_server().await;
    let alice = register(&app, "alice").await;

    let res = send(&app, "POST", "/api/tournaments/1/join", Some(json!({"userId": 9999}))).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = send(&app, "POST", "/api/tournaments/1/join", Some(json!({}))).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = send(&app, "POST", "/api/tournaments/1/join", Some(json!({"userId": alice}))).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["participants"][0]["username"], "alice");

    let res = send(&app, "POST", "/api/tournaments/1/join", Some(json!({"userId": alice}))).await;
    assert_eq!(res.status, StatusCode::CONFLICT);
}

// ============================================================================
// Full Flow
// ============================================================================

#[tokio::test]
async fn test_full_flow_over_http() {
    let app = create_test_server().await;
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;

    for user in [alice, bob] {
        let res = send(&app, "POST", "/api/tournaments/1/join", Some(json!({"userId": user}))).await;
        assert_eq!(res.status, StatusCode::OK);
        send(&app, "GET", &format!("/api/notifications/{user}"), None).await;
    }

    let res = send(
        &app,
        "POST",
        "/api/tournaments/1/matches",
        Some(json!({"player1Id": alice, "player2Id": bob})),
    )
    .await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["state"], "Pending");
    assert_eq!(res.body["status"], "Pendente");
    let match_id = res.body["id"].as_i64().unwrap();

    let res = send(
        &app,
        "POST",
        "/api/tournaments/1/matches",
        Some(json!({"player1Id": alice, "player2Id": alice})),
    )
    .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = send(
        &app,
        "POST",
        "/api/tournaments/1/matches",
        Some(json!({"player1Id": 9999, "player2Id": 9999})),
    )
    .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = send(&app, "GET", &format!("/api/notifications/{alice}"), None).await;
    let unread = res.body.as_array().unwrap();
    assert_eq!(unread.len(), 1);
    assert_eq!(
        unread[0]["message"],
        "Nova partida criada contra bob em Campeonato de Valorant"
    );

    let uri = format!("/api/matches/{match_id}/result");
    let res = send(&app, "PUT", &uri, Some(json!({"winnerId": 4242, "score": "2-1"}))).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = send(&app, "PUT", &uri, Some(json!({"winnerId": alice, "score": "2-1"}))).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["winnerId"], alice);
    assert_eq!(res.body["score"], "2-1");
    assert_eq!(res.body["status"], "Finalizada");

    let res = send(&app, "PUT", &uri, Some(json!({"winnerId": bob, "score": "0-2"}))).await;
    assert_eq!(res.status, StatusCode::CONFLICT);

    let res = send(&app, "PUT", "/api/matches/999/result", Some(json!({"winnerId": bob, "score": "1-0"}))).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = send(&app, "GET", "/api/tournaments/1", None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["name"], "Campeonato de Valorant");
    assert_eq!(res.body["matches"].as_array().unwrap().len(), 1);
    assert_eq!(res.body["matches"][0]["status"], "Finalizada");
    assert_eq!(res.body["ranking"][0]["userId"], alice);
    assert_eq!(res.body["ranking"][0]["points"], 3);
    assert_eq!(res.body["ranking"][1]["points"], 0);

    let res = send(&app, "GET", &format!("/api/notifications/{bob}"), None).await;
    let unread = res.body.as_array().unwrap();
    assert_eq!(unread.len(), 2);
    assert_eq!(unread[0]["message"], "Você perdeu a partida contra alice (2-1).");

    let res = send(&app, "GET", &format!("/api/notifications/{bob}"), None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.as_array().unwrap().is_empty());
}
