// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod defaults;
pub mod engine;
pub mod executor;
pub mod preview;
pub mod rate_limit;
pub mod resolver;
pub mod validator;

pub use engine::PlanOperationsEngine;
pub use executor::Executor;
pub use preview::{describe, preview_operations};
pub use rate_limit::ApplyRateLimiter;
pub use resolver::{ReferenceResolver, Resolution};
pub use validator::validate_operations;
