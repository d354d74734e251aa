// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Persisted schedule entities: plans, weeks and workouts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Workout category.
///
/// Unknown names are kept as `Custom` so that a growing vocabulary never
/// breaks deserialization; the validator only warns about them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WorkoutCategory {
    EasyRun,
    LongRun,
    Interval,
    Tempo,
    Rest,
    CrossTraining,
    Race,
    Recovery,
    Custom(String),
}

impl WorkoutCategory {
    /// Every category name the system knows about.
    pub const KNOWN: [&'static str; 8] = [
        "easy_run",
        "long_run",
        "interval",
        "tempo",
        "rest",
        "cross_training",
        "race",
        "recovery",
    ];

    pub fn as_str(&self) -> &str {
        match self {
            WorkoutCategory::EasyRun => "easy_run",
            WorkoutCategory::LongRun => "long_run",
            WorkoutCategory::Interval => "interval",
            WorkoutCategory::Tempo => "tempo",
            WorkoutCategory::Rest => "rest",
            WorkoutCategory::CrossTraining => "cross_training",
            WorkoutCategory::Race => "race",
            WorkoutCategory::Recovery => "recovery",
            WorkoutCategory::Custom(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, WorkoutCategory::Custom(_))
    }

    pub fn is_rest(&self) -> bool {
        matches!(self, WorkoutCategory::Rest)
    }
}

impl From<&str> for WorkoutCategory {
    fn from(raw: &str) -> Self {
        let normalized = raw.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "easy_run" | "easy" => WorkoutCategory::EasyRun,
            "long_run" | "long" => WorkoutCategory::LongRun,
            "interval" | "intervals" => WorkoutCategory::Interval,
            "tempo" => WorkoutCategory::Tempo,
            "rest" => WorkoutCategory::Rest,
            "cross_training" | "cross" => WorkoutCategory::CrossTraining,
            "race" => WorkoutCategory::Race,
            "recovery" => WorkoutCategory::Recovery,
            _ => WorkoutCategory::Custom(raw.trim().to_string()),
        }
    }
}

impl From<String> for WorkoutCategory {
    fn from(raw: String) -> Self {
        WorkoutCategory::from(raw.as_str())
    }
}

impl From<WorkoutCategory> for String {
    fn from(category: WorkoutCategory) -> Self {
        category.as_str().to_string()
    }
}

impl fmt::Display for WorkoutCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Intensity labels the system knows about.
pub const KNOWN_INTENSITIES: [&str; 7] = [
    "rest",
    "very_easy",
    "easy",
    "moderate",
    "moderate_hard",
    "hard",
    "race",
];

/// Training plan header stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingPlan {
    /// Plan ID (also used as document ID)
    pub plan_id: String,
    /// User who owns the plan
    pub owner_id: String,
    /// Plan name (e.g. "Spring Marathon")
    pub name: String,
    pub created_at: String,
}

/// One week of a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanWeek {
    pub plan_id: String,
    /// 1-based week number
    pub week_number: u32,
    /// Calendar date of day 1
    pub start_date: NaiveDate,
    /// Training phase (base, build, peak, taper...)
    pub phase: Option<String>,
}

/// A scheduled workout - the unit operations mutate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    /// Stable identity (also used as document ID)
    pub workout_id: String,
    pub plan_id: String,
    pub week_number: u32,
    /// Day within the week, 1-7
    pub day: u8,
    pub date: NaiveDate,
    pub category: WorkoutCategory,
    pub description: String,
    /// Distance in metres
    pub distance: f64,
    pub duration_minutes: Option<u32>,
    pub intensity: Option<String>,
    /// Optimistic concurrency counter, bumped on every write
    #[serde(default)]
    pub version: u64,
    pub updated_at: String,
}

impl Workout {
    /// Symbolic `W<week>:D<day>` label for the slot this workout occupies.
    pub fn slot_label(&self) -> String {
        format!("W{}:D{}", self.week_number, self.day)
    }
}

/// A workout that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewWorkout {
    pub plan_id: String,
    pub week_number: u32,
    pub day: u8,
    pub date: NaiveDate,
    pub category: WorkoutCategory,
    pub description: String,
    pub distance: f64,
    pub duration_minutes: Option<u32>,
    pub intensity: Option<String>,
}

impl NewWorkout {
    /// Default rest-day placeholder for an empty slot.
    pub fn placeholder(plan_id: &str, week_number: u32, day: u8, date: NaiveDate) -> Self {
        Self {
            plan_id: plan_id.to_string(),
            week_number,
            day,
            date,
            category: WorkoutCategory::Rest,
            description: "Rest day".to_string(),
            distance: 0.0,
            duration_minutes: None,
            intensity: Some("rest".to_string()),
        }
    }

    pub fn into_workout(self, workout_id: String, updated_at: String) -> Workout {
        Workout {
            workout_id,
            plan_id: self.plan_id,
            week_number: self.week_number,
            day: self.day,
            date: self.date,
            category: self.category,
            description: self.description,
            distance: self.distance,
            duration_minutes: self.duration_minutes,
            intensity: self.intensity,
            version: 0,
            updated_at,
        }
    }
}
