// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trainplan-Ops API Server
//!
//! Validates, previews and applies batches of edits to training-plan
//! schedules stored in Firestore (or in memory for local development).

use std::sync::Arc;
use trainplan_ops::{
    config::{Config, StoreBackend},
    db::{seed, FirestoreDb, MemoryStore, ScheduleStore},
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        backend = ?config.store_backend,
        unit = config.distance_unit.suffix(),
        "Starting Trainplan-Ops API"
    );

    let store: Arc<dyn ScheduleStore> = match config.store_backend {
        StoreBackend::Firestore => Arc::new(FirestoreDb::new(&config.gcp_project_id).await?),
        StoreBackend::Memory => {
            let store = MemoryStore::new();
            seed::seed_demo_plan(
                &store,
                seed::DEMO_PLAN_ID,
                &config.demo_owner_id,
                chrono::Utc::now().date_naive(),
            );
            tracing::warn!("Using in-memory store; changes are lost on restart");
            Arc::new(store)
        }
    };

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), store));

    // Build router
    let app = trainplan_ops::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("trainplan_ops=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
