// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Symbolic reference resolution.
//!
//! Maps `W<week>:D<day>` to a stable workout identity using the live store,
//! creating a rest-day placeholder when the slot is empty.

use crate::db::ScheduleStore;
use crate::error::Result;
use crate::models::{NewWorkout, ScheduleSnapshot, SlotRef, Workout, WorkoutTarget};
use crate::time_utils::date_for_day;

/// Outcome of resolving a reference.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// The slot already held a workout
    Existing(String),
    /// The slot was empty; a placeholder was created
    Created(Workout),
}

impl Resolution {
    pub fn workout_id(&self) -> &str {
        match self {
            Resolution::Existing(id) => id,
            Resolution::Created(workout) => &workout.workout_id,
        }
    }
}

pub struct ReferenceResolver<'a> {
    store: &'a dyn ScheduleStore,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(store: &'a dyn ScheduleStore) -> Self {
        Self { store }
    }

    /// Resolve an operation target. Direct identities pass through unchanged.
    ///
    /// Returns `Ok(None)` when the target cannot be resolved (malformed
    /// reference, unknown week, day out of range); `Err` only for store failures.
    pub async fn resolve_target(
        &self,
        plan_id: &str,
        target: &WorkoutTarget,
        snapshot: &ScheduleSnapshot,
    ) -> Result<Option<Resolution>> {
        match (&target.slot, &target.workout_id) {
            (Some(raw), _) => self.resolve(plan_id, raw, snapshot).await,
            (None, Some(id)) => Ok(Some(Resolution::Existing(id.clone()))),
            (None, None) => Ok(None),
        }
    }

    /// Resolve a `W<week>:D<day>` reference against the current store state.
    pub async fn resolve(
        &self,
        plan_id: &str,
        raw: &str,
        snapshot: &ScheduleSnapshot,
    ) -> Result<Option<Resolution>> {
        let Some(slot) = SlotRef::parse(raw) else {
            tracing::debug!(reference = raw, "Malformed slot reference");
            return Ok(None);
        };

        if let Some(existing) = self
            .store
            .find_workout_at(plan_id, slot.week, slot.day)
            .await?
        {
            return Ok(Some(Resolution::Existing(existing.workout_id)));
        }

        // Empty slot: the placeholder's date comes from the week's start date.
        let Some(date) = snapshot
            .week(slot.week)
            .and_then(|week| date_for_day(week.start_date, slot.day))
        else {
            tracing::debug!(reference = %slot, "Slot week not in snapshot or day out of range");
            return Ok(None);
        };

        let created = self
            .store
            .create_workout(&NewWorkout::placeholder(plan_id, slot.week, slot.day, date))
            .await?;

        tracing::info!(
            plan_id,
            reference = %slot,
            workout_id = %created.workout_id,
            "Created placeholder workout for empty slot"
        );

        Ok(Some(Resolution::Created(created)))
    }
}
