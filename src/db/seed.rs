// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Demo plan for the in-memory backend.

use crate::db::MemoryStore;
use crate::models::{NewWorkout, PlanWeek, TrainingPlan, WorkoutCategory};
use crate::time_utils::{date_for_day, now_rfc3339};
use chrono::NaiveDate;

pub const DEMO_PLAN_ID: &str = "demo";

const PHASES: [&str; 4] = ["base", "base", "build", "taper"];

/// Weekly template: (day, category, description, metres, intensity).
/// Day 7 is left empty so slot references exercise placeholder creation.
const TEMPLATE: [(u8, WorkoutCategory, &str, f64, &str); 6] = [
    (1, WorkoutCategory::EasyRun, "Easy run", 6000.0, "easy"),
    (2, WorkoutCategory::Interval, "6 x 800m", 8000.0, "hard"),
    (3, WorkoutCategory::Rest, "Rest day", 0.0, "rest"),
    (4, WorkoutCategory::EasyRun, "Easy run", 8000.0, "easy"),
    (5, WorkoutCategory::Tempo, "Tempo run", 10000.0, "moderate_hard"),
    (6, WorkoutCategory::LongRun, "Long run", 16000.0, "easy"),
];

/// Seed a four-week plan starting on `start`. Workout IDs are
/// `{plan_id}-w{week}-d{day}` so tests can address them directly.
pub fn seed_demo_plan(store: &MemoryStore, plan_id: &str, owner_id: &str, start: NaiveDate) {
    let now = now_rfc3339();

    store.insert_plan(TrainingPlan {
        plan_id: plan_id.to_string(),
        owner_id: owner_id.to_string(),
        name: "Demo 10K".to_string(),
        created_at: now.clone(),
    });

    for (index, phase) in PHASES.iter().enumerate() {
        let week_number = index as u32 + 1;
        let week_start = start + chrono::Duration::days(7 * index as i64);

        store.insert_week(PlanWeek {
            plan_id: plan_id.to_string(),
            week_number,
            start_date: week_start,
            phase: Some(phase.to_string()),
        });

        for (day, category, description, distance, intensity) in TEMPLATE {
            let Some(date) = date_for_day(week_start, day) else {
                continue;
            };
            // Long runs build by 2 km a week
            let distance = if category == WorkoutCategory::LongRun {
                distance + 2000.0 * index as f64
            } else {
                distance
            };
            let workout = NewWorkout {
                category,
                description: description.to_string(),
                distance,
                intensity: Some(intensity.to_string()),
                ..NewWorkout::placeholder(plan_id, week_number, day, date)
            }
            .into_workout(format!("{}-w{}-d{}", plan_id, week_number, day), now.clone());
            store.insert_workout(workout);
        }
    }

    tracing::info!(plan_id, owner_id, weeks = PHASES.len(), "Seeded demo plan");
}
