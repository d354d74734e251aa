// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Batch validation against a schedule snapshot.
//!
//! Pure: never touches the store, so it can run on every keystroke of an
//! edit request. Errors block preview and apply; warnings are informational.

use crate::models::operation::{
    ChangeIntensity, ChangeWorkoutDistance, ChangeWorkoutType, MoveWorkoutType, RemoveWorkoutType,
    slot_day, RescheduleWorkout, ScalePhaseVolume, ScaleWeekVolume, ScaleWorkoutDistance,
    SwapDays,
};
use crate::models::workout::KNOWN_INTENSITIES;
use crate::models::{
    Operation, ScheduleSnapshot, SlotRef, ValidationResult, WeekSelector, WorkoutCategory,
    WorkoutTarget,
};
use crate::time_utils::parse_iso_date;

/// Distances above this (metres) get a warning.
pub const DISTANCE_WARNING_METERS: f64 = 100_000.0;
/// Scale factors outside this range get a warning.
pub const FACTOR_WARNING_RANGE: (f64, f64) = (0.5, 2.0);

/// Validate a batch of operations against a snapshot.
pub fn validate_operations(
    operations: &[Operation],
    snapshot: &ScheduleSnapshot,
) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if operations.is_empty() {
        warnings.push("No operations to apply".to_string());
    }

    for (index, operation) in operations.iter().enumerate() {
        let mut checker = Checker {
            prefix: format!("Operation {} ({})", index + 1, operation.kind()),
            snapshot,
            errors: &mut errors,
            warnings: &mut warnings,
        };
        checker.check(operation);
    }

    ValidationResult::from_messages(errors, warnings)
}

struct Checker<'a> {
    prefix: String,
    snapshot: &'a ScheduleSnapshot,
    errors: &'a mut Vec<String>,
    warnings: &'a mut Vec<String>,
}

impl Checker<'_> {
    fn error(&mut self, msg: impl AsRef<str>) {
        self.errors.push(format!("{}: {}", self.prefix, msg.as_ref()));
    }

    fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings
            .push(format!("{}: {}", self.prefix, msg.as_ref()));
    }

    fn check(&mut self, operation: &Operation) {
        match operation {
            Operation::SwapDays(SwapDays {
                weeks,
                day_a,
                day_b,
            }) => {
                self.weeks(weeks);
                self.day(*day_a);
                self.day(*day_b);
                if day_a == day_b {
                    self.warn(format!("swapping day {} with itself has no effect", day_a));
                }
            }
            Operation::MoveWorkoutType(MoveWorkoutType {
                weeks,
                category,
                to_day,
            }) => {
                self.weeks(weeks);
                self.category(category);
                self.day(*to_day);
            }
            Operation::RescheduleWorkout(RescheduleWorkout { target, new_date }) => {
                self.target(target);
                self.reschedule_date(new_date);
            }
            Operation::ChangeWorkoutType(ChangeWorkoutType {
                target, category, ..
            }) => {
                self.target(target);
                self.category(category);
            }
            Operation::ChangeWorkoutDistance(ChangeWorkoutDistance { target, distance }) => {
                self.target(target);
                self.distance(*distance);
            }
            Operation::ScaleWorkoutDistance(ScaleWorkoutDistance { target, factor }) => {
                self.target(target);
                self.factor(*factor);
            }
            Operation::ChangeIntensity(ChangeIntensity { target, intensity }) => {
                self.target(target);
                self.intensity(intensity);
            }
            Operation::RemoveWorkoutType(RemoveWorkoutType {
                weeks,
                category,
                replacement,
            }) => {
                self.weeks(weeks);
                self.category(category);
                self.category(replacement);
                if WorkoutCategory::from(category.as_str())
                    == WorkoutCategory::from(replacement.as_str())
                {
                    self.warn(format!("replacing '{}' with itself has no effect", category));
                }
            }
            Operation::ScaleWeekVolume(ScaleWeekVolume {
                week_number,
                factor,
            }) => {
                self.week_exists(*week_number);
                self.factor(*factor);
            }
            Operation::ScalePhaseVolume(ScalePhaseVolume { phase, factor }) => {
                if phase.trim().is_empty() {
                    self.error("phase must not be empty");
                } else if self.snapshot.weeks_in_phase(phase).is_empty() {
                    self.error(format!("no weeks belong to phase '{}'", phase));
                }
                self.factor(*factor);
            }
        }
    }

    fn day(&mut self, day: i64) {
        if slot_day(day).is_none() {
            self.error(format!("day {} is invalid; days must be between 1 and 7", day));
        }
    }

    fn week_exists(&mut self, week: u32) {
        if !self.snapshot.has_week(week) {
            self.error(format!("week {} does not exist in this plan", week));
        }
    }

    fn weeks(&mut self, weeks: &WeekSelector) {
        match weeks {
            WeekSelector::All => {}
            WeekSelector::Weeks(list) if list.is_empty() => {
                self.error("week list must not be empty");
            }
            WeekSelector::Weeks(list) => {
                for week in list {
                    self.week_exists(*week);
                }
            }
        }
    }

    fn target(&mut self, target: &WorkoutTarget) {
        match (&target.slot, &target.workout_id) {
            (Some(_), Some(_)) => self.error("give either 'ref' or 'workoutId', not both"),
            (None, None) => self.error("missing target; give 'ref' or 'workoutId'"),
            (None, Some(id)) => {
                if id.trim().is_empty() {
                    self.error("workoutId must not be empty");
                }
            }
            (Some(raw), None) => match SlotRef::parse(raw) {
                None => self.error(format!(
                    "invalid reference '{}'; expected W<week>:D<day>",
                    raw
                )),
                Some(slot) => {
                    if slot.week == 0 {
                        self.error(format!("invalid reference '{}'; week must be positive", raw));
                    } else {
                        self.week_exists(slot.week);
                    }
                    self.day(slot.day.into());
                }
            },
        }
    }

    fn category(&mut self, category: &str) {
        if category.trim().is_empty() {
            self.error("category must not be empty");
            return;
        }
        if !WorkoutCategory::from(category).is_known() {
            self.warn(format!(
                "unrecognized category '{}'; known categories are {}",
                category,
                WorkoutCategory::KNOWN.join(", ")
            ));
        }
    }

    fn intensity(&mut self, intensity: &str) {
        let normalized = intensity.trim().to_ascii_lowercase();
        if normalized.is_empty() {
            self.error("intensity must not be empty");
        } else if !KNOWN_INTENSITIES.contains(&normalized.as_str()) {
            self.warn(format!("unrecognized intensity '{}'", intensity));
        }
    }

    fn distance(&mut self, distance: f64) {
        if !distance.is_finite() {
            self.error("distance must be a finite number");
        } else if distance < 0.0 {
            self.error(format!("distance must be non-negative (got {})", distance));
        } else if distance > DISTANCE_WARNING_METERS {
            self.warn(format!(
                "distance of {:.1} km is unusually long",
                distance / 1000.0
            ));
        }
    }

    fn factor(&mut self, factor: f64) {
        let (low, high) = FACTOR_WARNING_RANGE;
        if !factor.is_finite() || factor <= 0.0 {
            self.error(format!("factor must be positive (got {})", factor));
        } else if factor > high || factor < low {
            self.warn(format!(
                "factor {} is outside {}-{}; this multiplier may be excessive",
                factor, low, high
            ));
        }
    }

    fn reschedule_date(&mut self, raw: &str) {
        match parse_iso_date(raw) {
            None => self.error(format!("date '{}' must be formatted YYYY-MM-DD", raw)),
            Some(date) => {
                if self.snapshot.week_containing(date).is_none() {
                    self.error(format!("date {} is outside every week of this plan", raw));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SnapshotWeek, SnapshotWorkout};
    use chrono::NaiveDate;
    use serde_json::json;

    fn snapshot() -> ScheduleSnapshot {
        let start = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        ScheduleSnapshot {
            weeks: (1..=3)
                .map(|n| SnapshotWeek {
                    week_number: n,
                    start_date: start + chrono::Days::new(u64::from(n - 1) * 7),
                    phase: Some(if n < 3 { "base" } else { "build" }.to_string()),
                    workouts: vec![SnapshotWorkout {
                        id: None,
                        day: 1,
                        category: WorkoutCategory::EasyRun,
                        description: "Easy".to_string(),
                        distance: 6000.0,
                        date: start + chrono::Days::new(u64::from(n - 1) * 7),
                        intensity: None,
                    }],
                })
                .collect(),
        }
    }

    fn ops(value: serde_json::Value) -> Vec<Operation> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_negative_factor_is_error() {
        let result = validate_operations(
            &ops(json!([{"op": "ScaleWorkoutDistance", "ref": "W1:D1", "factor": -1}])),
            &snapshot(),
        );
        assert!(!result.valid);
        assert!(result.errors[0].contains("factor must be positive"));
    }

    #[test]
    fn test_swap_day_nine_is_error() {
        let result = validate_operations(
            &ops(json!([{"op": "SwapDays", "dayA": 1, "dayB": 9}])),
            &snapshot(),
        );
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("day 9"));
    }

    #[test]
    fn test_out_of_byte_range_days_are_validation_errors() {
        let result = validate_operations(
            &ops(json!([
                {"op": "SwapDays", "dayA": -1, "dayB": 300},
                {"op": "MoveWorkoutType", "category": "tempo", "toDay": 0}
            ])),
            &snapshot(),
        );
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 3);
        assert!(result.errors[0].contains("day -1"));
        assert!(result.errors[1].contains("day 300"));
        assert!(result.errors[2].contains("day 0"));
    }

    #[test]
    fn test_unknown_category_is_warning_only() {
        let result = validate_operations(
            &ops(json!([{"op": "ChangeWorkoutType", "ref": "W1:D2", "category": "aqua_jogging"}])),
            &snapshot(),
        );
        assert!(result.valid);
        assert!(result.warnings[0].contains("aqua_jogging"));
    }

    #[test]
    fn test_long_distance_warns_negative_errors() {
        let result = validate_operations(
            &ops(json!([
                {"op": "ChangeWorkoutDistance", "ref": "W1:D1", "distance": 120000},
                {"op": "ChangeWorkoutDistance", "ref": "W1:D1", "distance": -5}
            ])),
            &snapshot(),
        );
        assert!(!result.valid);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("Operation 2 (ChangeWorkoutDistance)"));
    }

    #[test]
    fn test_excessive_factor_warns() {
        let result = validate_operations(
            &ops(json!([
                {"op": "ScaleWeekVolume", "weekNumber": 2, "factor": 2.5},
                {"op": "ScalePhaseVolume", "phase": "base", "factor": 0.4}
            ])),
            &snapshot(),
        );
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 2);
    }

    #[test]
    fn test_unknown_weeks_and_phase_are_errors() {
        let result = validate_operations(
            &ops(json!([
                {"op": "RemoveWorkoutType", "weeks": [2, 7], "category": "interval"},
                {"op": "ScaleWeekVolume", "weekNumber": 4, "factor": 1.1},
                {"op": "ScalePhaseVolume", "phase": "taper", "factor": 0.8}
            ])),
            &snapshot(),
        );
        assert_eq!(result.errors.len(), 3);
        assert!(result.errors[0].contains("week 7"));
    }

    #[test]
    fn test_malformed_reference_and_missing_target() {
        let result = validate_operations(
            &ops(json!([
                {"op": "ChangeIntensity", "ref": "week1", "intensity": "hard"},
                {"op": "ChangeIntensity", "intensity": "hard"},
                {"op": "ChangeIntensity", "ref": "W1:D1", "workoutId": "x", "intensity": "hard"}
            ])),
            &snapshot(),
        );
        assert_eq!(result.errors.len(), 3);
        assert!(result.errors[0].contains("invalid reference"));
    }

    #[test]
    fn test_reschedule_date_format_and_range() {
        let result = validate_operations(
            &ops(json!([
                {"op": "RescheduleWorkout", "ref": "W1:D1", "newDate": "03/05/2025"},
                {"op": "RescheduleWorkout", "ref": "W1:D1", "newDate": "2026-01-01"},
                {"op": "RescheduleWorkout", "ref": "W1:D1", "newDate": "2025-03-12"}
            ])),
            &snapshot(),
        );
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors[0].contains("YYYY-MM-DD"));
        assert!(result.errors[1].contains("outside"));
    }

    #[test]
    fn test_empty_batch_warns() {
        let result = validate_operations(&[], &snapshot());
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
    }
}
