// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod operation;
pub mod results;
pub mod schedule;
pub mod workout;

pub use operation::{Operation, SlotRef, WeekSelector, WorkoutTarget};
pub use results::{AffectedEntity, ApplyResult, OperationPreview, ValidationResult, WorkoutView};
pub use schedule::{ScheduleSnapshot, SnapshotWeek, SnapshotWorkout};
pub use workout::{NewWorkout, PlanWeek, TrainingPlan, Workout, WorkoutCategory};
