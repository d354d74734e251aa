// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Trainplan-Ops: batch operations on training-plan schedules
//!
//! This crate provides the backend API for validating, previewing and
//! applying batches of schedule edits (swaps, moves, distance and volume
//! changes) to a training plan.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;
pub mod units;

use config::Config;
use services::{ApplyRateLimiter, PlanOperationsEngine};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub engine: PlanOperationsEngine,
    pub rate_limiter: ApplyRateLimiter,
}

impl AppState {
    /// Build state around an already-connected store.
    pub fn new(config: Config, store: std::sync::Arc<dyn db::ScheduleStore>) -> Self {
        let engine =
            PlanOperationsEngine::new(store, config.distance_unit, config.operation_timeout);
        let rate_limiter = ApplyRateLimiter::new(config.apply_rate_limit, config.apply_rate_window);
        Self {
            config,
            engine,
            rate_limiter,
        }
    }
}
