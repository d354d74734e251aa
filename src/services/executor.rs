// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Batch execution against the schedule store.
//!
//! Handles the apply workflow:
//! 1. Resolve every symbolic reference once, up front (may create placeholders)
//! 2. Order operations by the fixed priority table
//! 3. Apply each operation as read-modify-write, under a per-operation timeout
//! 4. Collect per-operation failures without aborting the rest of the batch
//!
//! Multi-entity writes (swaps, moves, bulk edits) go through a single atomic
//! store call, so an operation either lands completely or not at all.

use crate::db::ScheduleStore;
use crate::error::{AppError, Result};
use crate::models::operation::{
    slot_day, ChangeIntensity, ChangeWorkoutDistance, ChangeWorkoutType, MoveWorkoutType,
    RemoveWorkoutType, RescheduleWorkout, ScalePhaseVolume, ScaleWeekVolume, ScaleWorkoutDistance,
    SwapDays,
};
use crate::models::{ApplyResult, Operation, ScheduleSnapshot, Workout, WorkoutCategory};
use crate::services::defaults::{category_change, CategoryChange};
use crate::services::resolver::{ReferenceResolver, Resolution};
use crate::time_utils::{date_for_day, day_in_week, parse_iso_date};
use crate::units::{round_meters, DistanceUnit};
use std::collections::HashSet;
use std::time::Duration;

/// An operation with its single-entity target resolved to a stable identity.
#[derive(Debug, Clone)]
struct PreparedOperation {
    /// 0-based position in the submitted batch
    index: usize,
    operation: Operation,
    workout_id: Option<String>,
}

impl PreparedOperation {
    fn label(&self) -> String {
        format!("Operation {} ({})", self.index + 1, self.operation.kind())
    }
}

/// Applies validated batches to a store.
pub struct Executor<'a> {
    store: &'a dyn ScheduleStore,
    unit: DistanceUnit,
    timeout: Duration,
}

impl<'a> Executor<'a> {
    pub fn new(store: &'a dyn ScheduleStore, unit: DistanceUnit, timeout: Duration) -> Self {
        Self {
            store,
            unit,
            timeout,
        }
    }

    /// Apply a validated batch. Never fails as a whole: every per-operation
    /// problem is reported in `ApplyResult::errors`.
    pub async fn apply(
        &self,
        plan_id: &str,
        operations: &[Operation],
        snapshot: &ScheduleSnapshot,
    ) -> ApplyResult {
        let mut errors = Vec::new();
        let mut modified: HashSet<String> = HashSet::new();

        // 1. Resolve all references before anything moves.
        let mut prepared = Vec::with_capacity(operations.len());
        for (index, operation) in operations.iter().enumerate() {
            let mut item = PreparedOperation {
                index,
                operation: operation.clone(),
                workout_id: None,
            };

            if let Some(target) = operation.target() {
                let resolver = ReferenceResolver::new(self.store);
                let resolved = tokio::time::timeout(
                    self.timeout,
                    resolver.resolve_target(plan_id, target, snapshot),
                )
                .await;

                match resolved {
                    Ok(Ok(Some(resolution))) => {
                        if let Resolution::Created(ref created) = resolution {
                            modified.insert(created.workout_id.clone());
                        }
                        item.workout_id = Some(resolution.workout_id().to_string());
                    }
                    Ok(Ok(None)) => {
                        errors.push(format!(
                            "{}: could not resolve target {}",
                            item.label(),
                            target.label()
                        ));
                        continue;
                    }
                    Ok(Err(e)) => {
                        errors.push(format!("{}: {}", item.label(), e));
                        continue;
                    }
                    Err(_) => {
                        errors.push(format!(
                            "{}: resolving {} timed out after {} ms",
                            item.label(),
                            target.label(),
                            self.timeout.as_millis()
                        ));
                        continue;
                    }
                }
            }

            prepared.push(item);
        }

        // 2. Priority order; stable, so equal priorities keep batch order.
        prepared.sort_by_key(|p| p.operation.priority());

        // 3. Apply.
        let mut applied = 0u32;
        for item in &prepared {
            let outcome =
                tokio::time::timeout(self.timeout, self.execute(plan_id, item, snapshot)).await;

            match outcome {
                Ok(Ok(written)) => {
                    applied += 1;
                    tracing::info!(
                        plan_id,
                        operation = item.index + 1,
                        kind = item.operation.kind(),
                        entities = written.len(),
                        "Operation applied"
                    );
                    modified.extend(written);
                }
                Ok(Err(e)) => {
                    tracing::warn!(
                        plan_id,
                        operation = item.index + 1,
                        kind = item.operation.kind(),
                        error = %e,
                        "Operation failed"
                    );
                    errors.push(format!("{}: {}", item.label(), e));
                }
                Err(_) => {
                    tracing::warn!(
                        plan_id,
                        operation = item.index + 1,
                        kind = item.operation.kind(),
                        "Operation timed out"
                    );
                    errors.push(format!(
                        "{}: timed out after {} ms",
                        item.label(),
                        self.timeout.as_millis()
                    ));
                }
            }
        }

        ApplyResult {
            success: errors.is_empty(),
            operations_applied: applied,
            entities_modified: modified.len() as u32,
            errors,
        }
    }

    /// Run one operation; returns the IDs of the workouts written.
    async fn execute(
        &self,
        plan_id: &str,
        item: &PreparedOperation,
        snapshot: &ScheduleSnapshot,
    ) -> Result<Vec<String>> {
        match &item.operation {
            Operation::ChangeWorkoutDistance(ChangeWorkoutDistance { distance, .. }) => {
                let mut workout = self.load_target(plan_id, item).await?;
                workout.distance = round_meters(*distance);
                self.write_one(workout).await
            }
            Operation::ScaleWorkoutDistance(ScaleWorkoutDistance { factor, .. }) => {
                let mut workout = self.load_target(plan_id, item).await?;
                let scaled = round_meters(workout.distance * factor);
                if scaled == workout.distance {
                    return Ok(Vec::new());
                }
                workout.distance = scaled;
                self.write_one(workout).await
            }
            Operation::ChangeIntensity(ChangeIntensity { intensity, .. }) => {
                let mut workout = self.load_target(plan_id, item).await?;
                workout.intensity = Some(intensity.trim().to_ascii_lowercase());
                self.write_one(workout).await
            }
            Operation::ChangeWorkoutType(ChangeWorkoutType {
                category,
                description,
                ..
            }) => {
                let mut workout = self.load_target(plan_id, item).await?;
                // Distance edits ran first, so this reads the updated distance.
                let change = category_change(
                    &WorkoutCategory::from(category.as_str()),
                    description.as_deref(),
                    workout.distance,
                    self.unit,
                );
                apply_category_change(&mut workout, change);
                self.write_one(workout).await
            }
            Operation::RescheduleWorkout(op) => self.reschedule(plan_id, item, op, snapshot).await,
            Operation::SwapDays(op) => self.swap_days(plan_id, op, snapshot).await,
            Operation::MoveWorkoutType(op) => self.move_workout_type(plan_id, op, snapshot).await,
            Operation::RemoveWorkoutType(op) => {
                self.remove_workout_type(plan_id, op, snapshot).await
            }
            Operation::ScaleWeekVolume(ScaleWeekVolume {
                week_number,
                factor,
            }) => self.scale_weeks(plan_id, &[*week_number], *factor).await,
            Operation::ScalePhaseVolume(ScalePhaseVolume { phase, factor }) => {
                self.scale_weeks(plan_id, &snapshot.weeks_in_phase(phase), *factor)
                    .await
            }
        }
    }

    async fn load_target(&self, plan_id: &str, item: &PreparedOperation) -> Result<Workout> {
        let workout_id = item
            .workout_id
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("operation has no resolved target".to_string()))?;
        self.store
            .get_workout(plan_id, workout_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Workout {}", workout_id)))
    }

    async fn write_one(&self, workout: Workout) -> Result<Vec<String>> {
        let written = self.store.update_workout(&workout).await?;
        Ok(vec![written.workout_id])
    }

    async fn write_all(&self, workouts: Vec<Workout>) -> Result<Vec<String>> {
        if workouts.is_empty() {
            return Ok(Vec::new());
        }
        let written = self.store.update_workouts_atomic(&workouts).await?;
        Ok(written.into_iter().map(|w| w.workout_id).collect())
    }

    async fn reschedule(
        &self,
        plan_id: &str,
        item: &PreparedOperation,
        op: &RescheduleWorkout,
        snapshot: &ScheduleSnapshot,
    ) -> Result<Vec<String>> {
        let new_date = parse_iso_date(&op.new_date)
            .ok_or_else(|| AppError::BadRequest(format!("invalid date '{}'", op.new_date)))?;
        let dest_week = snapshot.week_containing(new_date).ok_or_else(|| {
            AppError::BadRequest(format!("date {} is outside the plan", op.new_date))
        })?;
        let dest_day = day_in_week(dest_week.start_date, new_date).ok_or_else(|| {
            AppError::BadRequest(format!("date {} is outside the plan", op.new_date))
        })?;

        let mut workout = self.load_target(plan_id, item).await?;
        if workout.week_number == dest_week.week_number && workout.day == dest_day {
            return Ok(Vec::new());
        }

        let occupant = self
            .store
            .find_workout_at(plan_id, dest_week.week_number, dest_day)
            .await?
            .filter(|o| o.workout_id != workout.workout_id);

        let (old_week, old_day, old_date) = (workout.week_number, workout.day, workout.date);
        workout.week_number = dest_week.week_number;
        workout.day = dest_day;
        workout.date = new_date;

        let mut updates = vec![workout];
        if let Some(mut occupant) = occupant {
            occupant.week_number = old_week;
            occupant.day = old_day;
            occupant.date = old_date;
            updates.push(occupant);
        }
        self.write_all(updates).await
    }

    async fn swap_days(
        &self,
        plan_id: &str,
        op: &SwapDays,
        snapshot: &ScheduleSnapshot,
    ) -> Result<Vec<String>> {
        let day_a = checked_day(op.day_a)?;
        let day_b = checked_day(op.day_b)?;
        if day_a == day_b {
            return Ok(Vec::new());
        }

        let mut updates = Vec::new();
        for week_number in op.weeks.resolve(&snapshot.week_numbers()) {
            let week_start = week_start(snapshot, week_number)?;
            let a = self.store.find_workout_at(plan_id, week_number, day_a).await?;
            let b = self.store.find_workout_at(plan_id, week_number, day_b).await?;

            if let Some(mut a) = a {
                relocate(&mut a, week_start, day_b)?;
                updates.push(a);
            }
            if let Some(mut b) = b {
                relocate(&mut b, week_start, day_a)?;
                updates.push(b);
            }
        }
        self.write_all(updates).await
    }

    async fn move_workout_type(
        &self,
        plan_id: &str,
        op: &MoveWorkoutType,
        snapshot: &ScheduleSnapshot,
    ) -> Result<Vec<String>> {
        let category = WorkoutCategory::from(op.category.as_str());
        let to_day = checked_day(op.to_day)?;
        let mut updates = Vec::new();

        for week_number in op.weeks.resolve(&snapshot.week_numbers()) {
            let week_start = week_start(snapshot, week_number)?;
            let workouts = self.store.list_week_workouts(plan_id, week_number).await?;

            let Some(source) = workouts
                .iter()
                .filter(|w| w.category == category)
                .min_by_key(|w| w.day)
                .cloned()
            else {
                continue;
            };
            if source.day == to_day {
                continue;
            }

            let vacated = source.day;
            let occupant = workouts.iter().find(|w| w.day == to_day).cloned();

            let mut moved = source;
            relocate(&mut moved, week_start, to_day)?;
            updates.push(moved);

            if let Some(mut occupant) = occupant {
                relocate(&mut occupant, week_start, vacated)?;
                updates.push(occupant);
            }
        }
        self.write_all(updates).await
    }

    async fn remove_workout_type(
        &self,
        plan_id: &str,
        op: &RemoveWorkoutType,
        snapshot: &ScheduleSnapshot,
    ) -> Result<Vec<String>> {
        let category = WorkoutCategory::from(op.category.as_str());
        let replacement = WorkoutCategory::from(op.replacement.as_str());
        let mut updates = Vec::new();

        for week_number in op.weeks.resolve(&snapshot.week_numbers()) {
            for mut workout in self
                .store
                .list_week_workouts(plan_id, week_number)
                .await?
                .into_iter()
                .filter(|w| w.category == category)
            {
                let change = category_change(&replacement, None, workout.distance, self.unit);
                apply_category_change(&mut workout, change);
                updates.push(workout);
            }
        }
        self.write_all(updates).await
    }

    async fn scale_weeks(
        &self,
        plan_id: &str,
        weeks: &[u32],
        factor: f64,
    ) -> Result<Vec<String>> {
        let mut updates = Vec::new();
        for &week_number in weeks {
            for mut workout in self
                .store
                .list_week_workouts(plan_id, week_number)
                .await?
                .into_iter()
                .filter(|w| !w.category.is_rest())
            {
                let scaled = round_meters(workout.distance * factor);
                if scaled != workout.distance {
                    workout.distance = scaled;
                    updates.push(workout);
                }
            }
        }
        self.write_all(updates).await
    }
}

fn week_start(snapshot: &ScheduleSnapshot, week_number: u32) -> Result<chrono::NaiveDate> {
    snapshot
        .week(week_number)
        .map(|w| w.start_date)
        .ok_or_else(|| AppError::NotFound(format!("Week {}", week_number)))
}

fn checked_day(day: i64) -> Result<u8> {
    slot_day(day).ok_or_else(|| AppError::BadRequest(format!("day {} is out of range", day)))
}

/// Move a workout to another day of its week; date and slot label change together.
fn relocate(workout: &mut Workout, week_start: chrono::NaiveDate, day: u8) -> Result<()> {
    workout.date = date_for_day(week_start, day)
        .ok_or_else(|| AppError::BadRequest(format!("day {} is out of range", day)))?;
    workout.day = day;
    Ok(())
}

fn apply_category_change(workout: &mut Workout, change: CategoryChange) {
    workout.category = change.category;
    workout.description = change.description;
    if let Some(intensity) = change.intensity {
        workout.intensity = Some(intensity);
    }
    if let Some(distance) = change.distance {
        workout.distance = distance;
    }
    if change.clear_duration {
        workout.duration_minutes = None;
    }
}
