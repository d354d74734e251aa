// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::NaiveDate;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;
use trainplan_ops::config::Config;
use trainplan_ops::db::{seed, FirestoreDb, MemoryStore};
use trainplan_ops::routes::create_router;
use trainplan_ops::AppState;

/// Owner of the seeded test plan.
#[allow(dead_code)]
pub const OWNER: &str = "runner-1";

/// Plan ID of the seeded test plan.
#[allow(dead_code)]
pub const PLAN_ID: &str = seed::DEMO_PLAN_ID;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Monday 2025-03-03; week N starts 7 * (N - 1) days later.
#[allow(dead_code)]
pub fn plan_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
}

/// Memory store holding the four-week demo plan owned by `OWNER`.
///
/// Workouts are `demo-w{week}-d{day}`; day 3 is rest and day 7 is empty.
#[allow(dead_code)]
pub fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    seed::seed_demo_plan(&store, PLAN_ID, OWNER, plan_start());
    store
}

/// Create a test app over a seeded memory store.
/// Returns the router, the shared state and the store for inspection.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, MemoryStore) {
    create_test_app_with(Config::default())
}

#[allow(dead_code)]
pub fn create_test_app_with(config: Config) -> (axum::Router, Arc<AppState>, MemoryStore) {
    let store = seeded_store();
    let state = Arc::new(AppState::new(config, Arc::new(store.clone())));
    (create_router(state.clone()), state, store)
}

/// Create a test JWT token.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, signing_key: &[u8]) -> String {
    #[derive(Serialize)]
    struct Claims {
        sub: String,
        exp: usize,
        iat: usize,
    }

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        exp: now + 86400,
        iat: now,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )
    .unwrap()
}

/// POST a JSON body with a bearer token; returns status and parsed body.
#[allow(dead_code)]
pub async fn post_json(
    app: &axum::Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let response = app
        .clone()
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// URI of a plan operation endpoint (`validate`, `preview` or `apply`).
#[allow(dead_code)]
pub fn operations_uri(action: &str) -> String {
    format!("/api/plans/{}/operations/{}", PLAN_ID, action)
}
