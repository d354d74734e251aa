// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer: the schedule store interface and its implementations.

pub mod firestore;
pub mod memory;
pub mod seed;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::error::Result;
use crate::models::{NewWorkout, ScheduleSnapshot, TrainingPlan, Workout};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    pub const PLANS: &str = "plans";
    /// Plan weeks (keyed by `{plan_id}_{week_number}`)
    pub const PLAN_WEEKS: &str = "plan_weeks";
    pub const WORKOUTS: &str = "workouts";
}

/// Persistent storage for schedule entities.
///
/// Writes are version-checked: `update_workout` and `update_workouts_atomic`
/// fail with `AppError::Conflict` when the stored version differs from the
/// one being written, and return the workouts with their bumped versions.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Get a plan header.
    async fn get_plan(&self, plan_id: &str) -> Result<Option<TrainingPlan>>;

    /// Build a fresh read-only snapshot of the plan's schedule.
    async fn load_snapshot(&self, plan_id: &str) -> Result<ScheduleSnapshot>;

    /// Read the workout occupying a week/day slot.
    async fn find_workout_at(
        &self,
        plan_id: &str,
        week_number: u32,
        day: u8,
    ) -> Result<Option<Workout>>;

    /// Read a workout by identity.
    async fn get_workout(&self, plan_id: &str, workout_id: &str) -> Result<Option<Workout>>;

    /// All workouts in one week, ordered by day.
    async fn list_week_workouts(&self, plan_id: &str, week_number: u32) -> Result<Vec<Workout>>;

    /// Store a new workout and return it with its assigned identity.
    async fn create_workout(&self, workout: &NewWorkout) -> Result<Workout>;

    /// Write one workout.
    async fn update_workout(&self, workout: &Workout) -> Result<Workout>;

    /// Write several workouts; either all writes land or none do.
    async fn update_workouts_atomic(&self, workouts: &[Workout]) -> Result<Vec<Workout>>;
}

/// Document ID for a plan week.
pub fn plan_week_doc_id(plan_id: &str, week_number: u32) -> String {
    format!("{}_{}", plan_id, week_number)
}
