// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Read-only schedule snapshot used for validation and preview.

use crate::models::workout::{Workout, WorkoutCategory};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Point-in-time view of a plan's schedule. Never mutated by the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ScheduleSnapshot {
    pub weeks: Vec<SnapshotWeek>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SnapshotWeek {
    pub week_number: u32,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub start_date: NaiveDate,
    #[serde(default)]
    pub phase: Option<String>,
    pub workouts: Vec<SnapshotWorkout>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SnapshotWorkout {
    /// Store identity, when the supplier knows it
    #[serde(default)]
    pub id: Option<String>,
    pub day: u8,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub category: WorkoutCategory,
    pub description: String,
    /// Distance in metres
    pub distance: f64,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub date: NaiveDate,
    #[serde(default)]
    pub intensity: Option<String>,
}

impl From<&Workout> for SnapshotWorkout {
    fn from(workout: &Workout) -> Self {
        Self {
            id: Some(workout.workout_id.clone()),
            day: workout.day,
            category: workout.category.clone(),
            description: workout.description.clone(),
            distance: workout.distance,
            date: workout.date,
            intensity: workout.intensity.clone(),
        }
    }
}

impl ScheduleSnapshot {
    pub fn week(&self, week_number: u32) -> Option<&SnapshotWeek> {
        self.weeks.iter().find(|w| w.week_number == week_number)
    }

    pub fn has_week(&self, week_number: u32) -> bool {
        self.week(week_number).is_some()
    }

    /// The workout at `day` of `week_number`, if the slot is populated.
    pub fn workout_at(&self, week_number: u32, day: u8) -> Option<&SnapshotWorkout> {
        self.week(week_number)
            .and_then(|w| w.workouts.iter().find(|wo| wo.day == day))
    }

    /// Locate a workout by store identity, returning its week number too.
    pub fn find_by_id(&self, workout_id: &str) -> Option<(u32, &SnapshotWorkout)> {
        self.weeks.iter().find_map(|week| {
            week.workouts
                .iter()
                .find(|wo| wo.id.as_deref() == Some(workout_id))
                .map(|wo| (week.week_number, wo))
        })
    }

    /// The week whose 7-day span contains `date`.
    pub fn week_containing(&self, date: NaiveDate) -> Option<&SnapshotWeek> {
        self.weeks
            .iter()
            .find(|w| crate::time_utils::day_in_week(w.start_date, date).is_some())
    }

    /// Week numbers whose phase matches `phase` (case-insensitive).
    pub fn weeks_in_phase(&self, phase: &str) -> Vec<u32> {
        let wanted = phase.trim();
        self.weeks
            .iter()
            .filter(|w| {
                w.phase
                    .as_deref()
                    .is_some_and(|p| p.trim().eq_ignore_ascii_case(wanted))
            })
            .map(|w| w.week_number)
            .collect()
    }

    pub fn week_numbers(&self) -> Vec<u32> {
        self.weeks.iter().map(|w| w.week_number).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> ScheduleSnapshot {
        let start = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        ScheduleSnapshot {
            weeks: vec![SnapshotWeek {
                week_number: 1,
                start_date: start,
                phase: Some("Base".to_string()),
                workouts: vec![SnapshotWorkout {
                    id: Some("w-1".to_string()),
                    day: 2,
                    category: WorkoutCategory::EasyRun,
                    description: "Easy".to_string(),
                    distance: 5000.0,
                    date: NaiveDate::from_ymd_opt(2025, 3, 11).unwrap(),
                    intensity: None,
                }],
            }],
        }
    }

    #[test]
    fn test_lookup_helpers() {
        let snap = snapshot();
        assert!(snap.workout_at(1, 2).is_some());
        assert!(snap.workout_at(1, 3).is_none());
        assert_eq!(snap.find_by_id("w-1").map(|(w, _)| w), Some(1));
        assert_eq!(snap.weeks_in_phase("base"), vec![1]);
        assert!(snap.weeks_in_phase("taper").is_empty());
    }

    #[test]
    fn test_week_containing() {
        let snap = snapshot();
        let date = NaiveDate::from_ymd_opt(2025, 3, 16).unwrap();
        assert_eq!(snap.week_containing(date).map(|w| w.week_number), Some(1));
        let outside = NaiveDate::from_ymd_opt(2025, 3, 17).unwrap();
        assert!(snap.week_containing(outside).is_none());
    }
}
