// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Results returned to callers: validation, preview and apply outcomes.

use crate::models::operation::Operation;
use crate::models::schedule::SnapshotWorkout;
use crate::models::workout::{Workout, WorkoutCategory};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Outcome of validating a batch. Errors block execution; warnings do not.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn from_messages(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

/// One side (before or after) of an entity diff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WorkoutView {
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub date: NaiveDate,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub category: WorkoutCategory,
    pub description: String,
    /// Distance in metres
    pub distance: f64,
    #[serde(default)]
    pub intensity: Option<String>,
}

impl WorkoutView {
    /// Synthetic empty-slot view, shown when an operation targets a day with no workout.
    pub fn empty_slot(date: NaiveDate) -> Self {
        Self {
            date,
            category: WorkoutCategory::Rest,
            description: "Rest day".to_string(),
            distance: 0.0,
            intensity: Some("rest".to_string()),
        }
    }
}

impl From<&SnapshotWorkout> for WorkoutView {
    fn from(workout: &SnapshotWorkout) -> Self {
        Self {
            date: workout.date,
            category: workout.category.clone(),
            description: workout.description.clone(),
            distance: workout.distance,
            intensity: workout.intensity.clone(),
        }
    }
}

impl From<&Workout> for WorkoutView {
    fn from(workout: &Workout) -> Self {
        Self {
            date: workout.date,
            category: workout.category.clone(),
            description: workout.description.clone(),
            distance: workout.distance,
            intensity: workout.intensity.clone(),
        }
    }
}

/// Before/after for one schedule slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AffectedEntity {
    pub week_number: u32,
    pub day: u8,
    pub before: WorkoutView,
    pub after: WorkoutView,
}

/// What one operation would do.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct OperationPreview {
    #[cfg_attr(feature = "binding-generation", ts(type = "unknown"))]
    pub operation: Operation,
    pub human_description: String,
    pub affected_entities: Vec<AffectedEntity>,
}

/// Outcome of applying a batch.
///
/// `success` is only true when no operation failed; partial application is
/// possible and visible through `operations_applied` and `errors`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ApplyResult {
    pub success: bool,
    pub operations_applied: u32,
    pub entities_modified: u32,
    pub errors: Vec<String>,
}
