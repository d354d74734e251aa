// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Plan operation endpoint tests: validate, preview and apply over HTTP.

use axum::http::StatusCode;
use serde_json::json;
use std::time::Duration;
use trainplan_ops::config::Config;
use trainplan_ops::db::ScheduleStore;
use trainplan_ops::routes::plans::MAX_BATCH_SIZE;

mod common;
use common::{create_test_app, create_test_app_with, create_test_jwt, operations_uri, OWNER, PLAN_ID};

#[tokio::test]
async fn test_validate_reports_errors_without_writing() {
    let (app, state, _) = create_test_app();
    let token = create_test_jwt(OWNER, &state.config.jwt_signing_key);

    let (status, body) = common::post_json(
        &app,
        &operations_uri("validate"),
        Some(&token),
        json!({"operations": [
            {"op": "SwapDays", "dayA": 1, "dayB": 9},
            {"op": "ScaleWeekVolume", "weekNumber": 2, "factor": 3.0}
        ]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);
    assert_eq!(body["errors"].as_array().unwrap().len(), 1);
    assert!(body["errors"][0].as_str().unwrap().contains("day 9"));
    assert!(body["warnings"][0]
        .as_str()
        .unwrap()
        .starts_with("Operation 2 (ScaleWeekVolume):"));
}

#[tokio::test]
async fn test_out_of_range_days_reach_the_validator() {
    let (app, state, _) = create_test_app();
    let token = create_test_jwt(OWNER, &state.config.jwt_signing_key);

    let (status, body) = common::post_json(
        &app,
        &operations_uri("validate"),
        Some(&token),
        json!({"operations": [{"op": "SwapDays", "dayA": -1, "dayB": 300}]}),
    )
    .await;

    // A normal validation result, not an extractor rejection
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["valid"], false);
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    assert!(errors[1].as_str().unwrap().contains("day 300"));
}

#[tokio::test]
async fn test_preview_response_shape() {
    let (app, state, store) = create_test_app();
    let token = create_test_jwt(OWNER, &state.config.jwt_signing_key);

    let (status, body) = common::post_json(
        &app,
        &operations_uri("preview"),
        Some(&token),
        json!({"operations": [
            {"op": "ChangeWorkoutDistance", "ref": "W2:D4", "distance": 15000},
            {"op": "ChangeWorkoutType", "ref": "W2:D4", "category": "race"}
        ]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["validation"]["valid"], true);

    let previews = body["previews"].as_array().unwrap();
    assert_eq!(previews.len(), 2);
    assert_eq!(previews[0]["operation"]["op"], "ChangeWorkoutDistance");
    assert_eq!(previews[0]["humanDescription"], "Set W2:D4 distance to 15.0 km");

    let entity = &previews[0]["affectedEntities"][0];
    assert_eq!(entity["weekNumber"], 2);
    assert_eq!(entity["day"], 4);
    assert_eq!(entity["before"]["category"], "easy_run");
    assert_eq!(entity["before"]["date"], "2025-03-13");
    assert_eq!(entity["after"]["category"], "race");
    assert_eq!(entity["after"]["distance"], 15000.0);
    assert_eq!(entity["after"]["description"], "15.0 km race");
    assert!(previews[1]["affectedEntities"].as_array().unwrap().is_empty());

    // Preview never writes
    let untouched = store.get_workout(PLAN_ID, "demo-w2-d4").await.unwrap().unwrap();
    assert_eq!(untouched.version, 0);
}

#[tokio::test]
async fn test_preview_of_invalid_batch_has_no_previews() {
    let (app, state, _) = create_test_app();
    let token = create_test_jwt(OWNER, &state.config.jwt_signing_key);

    let (status, body) = common::post_json(
        &app,
        &operations_uri("preview"),
        Some(&token),
        json!({"operations": [{"op": "ChangeIntensity", "ref": "week2", "intensity": "hard"}]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["validation"]["valid"], false);
    assert!(body["previews"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_apply_updates_store() {
    let (app, state, store) = create_test_app();
    let token = create_test_jwt(OWNER, &state.config.jwt_signing_key);

    let (status, body) = common::post_json(
        &app,
        &operations_uri("apply"),
        Some(&token),
        json!({"operations": [
            {"op": "ChangeWorkoutDistance", "ref": "W2:D4", "distance": 15000},
            {"op": "ChangeWorkoutType", "ref": "W2:D4", "category": "race"}
        ]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(
        body,
        json!({"success": true, "operationsApplied": 2, "entitiesModified": 1, "errors": []})
    );

    let race = store.get_workout(PLAN_ID, "demo-w2-d4").await.unwrap().unwrap();
    assert_eq!(race.description, "15.0 km race");
}

#[tokio::test]
async fn test_apply_invalid_batch_is_unprocessable() {
    let (app, state, _) = create_test_app();
    let token = create_test_jwt(OWNER, &state.config.jwt_signing_key);

    let (status, body) = common::post_json(
        &app,
        &operations_uri("apply"),
        Some(&token),
        json!({"operations": [{"op": "ScaleWorkoutDistance", "ref": "W1:D1", "factor": -1}]}),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "invalid_operations");
    assert!(body["details"]
        .as_str()
        .unwrap()
        .contains("factor must be positive"));
}

#[tokio::test]
async fn test_unknown_operation_is_rejected() {
    let (app, state, _) = create_test_app();
    let token = create_test_jwt(OWNER, &state.config.jwt_signing_key);

    let (status, _) = common::post_json(
        &app,
        &operations_uri("validate"),
        Some(&token),
        json!({"operations": [{"op": "DeleteEverything"}]}),
    )
    .await;

    // Rejected by the JSON extractor: the operation set is closed
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_oversized_batch_is_bad_request() {
    let (app, state, _) = create_test_app();
    let token = create_test_jwt(OWNER, &state.config.jwt_signing_key);

    let batch = |len: u64| {
        let operations: Vec<serde_json::Value> = (0..len)
            .map(|_| json!({"op": "ChangeIntensity", "ref": "W1:D1", "intensity": "easy"}))
            .collect();
        json!({ "operations": operations })
    };

    let (status, body) = common::post_json(
        &app,
        &operations_uri("validate"),
        Some(&token),
        batch(MAX_BATCH_SIZE + 1),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    // Exactly at the limit is accepted
    let (status, body) = common::post_json(
        &app,
        &operations_uri("validate"),
        Some(&token),
        batch(MAX_BATCH_SIZE),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["valid"], true);
}

#[tokio::test]
async fn test_apply_is_rate_limited_per_user() {
    let config = Config {
        apply_rate_limit: 1,
        apply_rate_window: Duration::from_secs(3600),
        ..Config::default()
    };
    let (app, state, _) = create_test_app_with(config);
    let token = create_test_jwt(OWNER, &state.config.jwt_signing_key);
    let batch = json!({"operations": [{"op": "ChangeIntensity", "ref": "W1:D1", "intensity": "easy"}]});

    let (first, _) =
        common::post_json(&app, &operations_uri("apply"), Some(&token), batch.clone()).await;
    assert_eq!(first, StatusCode::OK);

    let (second, body) =
        common::post_json(&app, &operations_uri("apply"), Some(&token), batch.clone()).await;
    assert_eq!(second, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "rate_limited");

    // Validate and preview are not limited
    let (preview, _) =
        common::post_json(&app, &operations_uri("preview"), Some(&token), batch).await;
    assert_eq!(preview, StatusCode::OK);
}

#[tokio::test]
async fn test_apply_requires_ownership() {
    let (app, state, store) = create_test_app();
    let token = create_test_jwt("intruder", &state.config.jwt_signing_key);

    let (status, _) = common::post_json(
        &app,
        &operations_uri("apply"),
        Some(&token),
        json!({"operations": [{"op": "ChangeWorkoutDistance", "ref": "W1:D1", "distance": 1}]}),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    let workout = store.get_workout(PLAN_ID, "demo-w1-d1").await.unwrap().unwrap();
    assert_eq!(workout.distance, 6000.0);
}
