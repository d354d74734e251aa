// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory schedule store for local development and tests.

use crate::db::{plan_week_doc_id, ScheduleStore};
use crate::error::{AppError, Result};
use crate::models::{
    NewWorkout, PlanWeek, ScheduleSnapshot, SnapshotWeek, SnapshotWorkout, TrainingPlan, Workout,
};
use crate::time_utils::now_rfc3339;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::{Arc, Mutex};

/// `DashMap`-backed store. Cheap to clone; clones share data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    plans: Arc<DashMap<String, TrainingPlan>>,
    weeks: Arc<DashMap<String, PlanWeek>>,
    workouts: Arc<DashMap<String, Workout>>,
    /// Serializes multi-document writes so they are all-or-nothing.
    write_lock: Arc<Mutex<()>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_plan(&self, plan: TrainingPlan) {
        self.plans.insert(plan.plan_id.clone(), plan);
    }

    pub fn insert_week(&self, week: PlanWeek) {
        self.weeks
            .insert(plan_week_doc_id(&week.plan_id, week.week_number), week);
    }

    /// Seed a workout directly, bypassing version checks.
    pub fn insert_workout(&self, workout: Workout) {
        self.workouts.insert(workout.workout_id.clone(), workout);
    }

    /// Every workout of a plan, ordered by week then day.
    pub fn all_workouts(&self, plan_id: &str) -> Vec<Workout> {
        let mut workouts: Vec<Workout> = self
            .workouts
            .iter()
            .filter(|w| w.plan_id == plan_id)
            .map(|w| w.value().clone())
            .collect();
        workouts.sort_by_key(|w| (w.week_number, w.day));
        workouts
    }

    fn check_version(&self, workout: &Workout) -> Result<()> {
        let stored = self
            .workouts
            .get(&workout.workout_id)
            .filter(|w| w.plan_id == workout.plan_id)
            .ok_or_else(|| AppError::NotFound(format!("Workout {}", workout.workout_id)))?;
        if stored.version != workout.version {
            return Err(AppError::Conflict(format!(
                "Workout {} changed since it was read (version {} vs {})",
                workout.workout_id, stored.version, workout.version
            )));
        }
        Ok(())
    }

    fn write(&self, workout: &Workout, now: &str) -> Workout {
        let mut next = workout.clone();
        next.version += 1;
        next.updated_at = now.to_string();
        self.workouts.insert(next.workout_id.clone(), next.clone());
        next
    }
}

#[async_trait]
impl ScheduleStore for MemoryStore {
    async fn get_plan(&self, plan_id: &str) -> Result<Option<TrainingPlan>> {
        Ok(self.plans.get(plan_id).map(|p| p.value().clone()))
    }

    async fn load_snapshot(&self, plan_id: &str) -> Result<ScheduleSnapshot> {
        let mut weeks: Vec<PlanWeek> = self
            .weeks
            .iter()
            .filter(|w| w.plan_id == plan_id)
            .map(|w| w.value().clone())
            .collect();
        weeks.sort_by_key(|w| w.week_number);

        let workouts = self.all_workouts(plan_id);

        let weeks = weeks
            .into_iter()
            .map(|week| SnapshotWeek {
                week_number: week.week_number,
                start_date: week.start_date,
                phase: week.phase,
                workouts: workouts
                    .iter()
                    .filter(|w| w.week_number == week.week_number)
                    .map(SnapshotWorkout::from)
                    .collect(),
            })
            .collect();

        Ok(ScheduleSnapshot { weeks })
    }

    async fn find_workout_at(
        &self,
        plan_id: &str,
        week_number: u32,
        day: u8,
    ) -> Result<Option<Workout>> {
        Ok(self
            .workouts
            .iter()
            .find(|w| w.plan_id == plan_id && w.week_number == week_number && w.day == day)
            .map(|w| w.value().clone()))
    }

    async fn get_workout(&self, plan_id: &str, workout_id: &str) -> Result<Option<Workout>> {
        Ok(self
            .workouts
            .get(workout_id)
            .filter(|w| w.plan_id == plan_id)
            .map(|w| w.value().clone()))
    }

    async fn list_week_workouts(&self, plan_id: &str, week_number: u32) -> Result<Vec<Workout>> {
        let mut workouts: Vec<Workout> = self
            .workouts
            .iter()
            .filter(|w| w.plan_id == plan_id && w.week_number == week_number)
            .map(|w| w.value().clone())
            .collect();
        workouts.sort_by_key(|w| w.day);
        Ok(workouts)
    }

    async fn create_workout(&self, workout: &NewWorkout) -> Result<Workout> {
        let created = workout
            .clone()
            .into_workout(uuid::Uuid::new_v4().to_string(), now_rfc3339());
        self.workouts
            .insert(created.workout_id.clone(), created.clone());
        Ok(created)
    }

    async fn update_workout(&self, workout: &Workout) -> Result<Workout> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| AppError::Database(e.to_string()))?;
        self.check_version(workout)?;
        Ok(self.write(workout, &now_rfc3339()))
    }

    async fn update_workouts_atomic(&self, workouts: &[Workout]) -> Result<Vec<Workout>> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| AppError::Database(e.to_string()))?;
        for workout in workouts {
            self.check_version(workout)?;
        }
        let now = now_rfc3339();
        Ok(workouts.iter().map(|w| self.write(w, &now)).collect())
    }
}
