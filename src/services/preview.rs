// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Preview generation and cross-operation diff merging.
//!
//! The batch is replayed against a working copy of the snapshot the same
//! way the executor applies it:
//! 1. Targets resolve once, up front. An empty referenced slot gets a
//!    synthetic rest-day placeholder that later swaps and moves can see.
//! 2. Operations run in priority order over the working copy, so derived
//!    fields (race descriptions) read the values earlier edits produced.
//! 3. Every touched entity yields one diff keyed by the slot it held
//!    before the batch: the pre-batch `before` and the final `after`.
//! 4. Each diff is listed under the first operation, in batch order, that
//!    touched it.

use crate::models::operation::{
    slot_day, ChangeIntensity, ChangeWorkoutDistance, ChangeWorkoutType, MoveWorkoutType,
    RemoveWorkoutType, RescheduleWorkout, ScalePhaseVolume, ScaleWeekVolume, ScaleWorkoutDistance,
    SwapDays,
};
use crate::models::{
    AffectedEntity, Operation, OperationPreview, ScheduleSnapshot, SlotRef, WeekSelector,
    WorkoutCategory, WorkoutTarget, WorkoutView,
};
use crate::services::defaults::{category_change, CategoryChange};
use crate::time_utils::{date_for_day, day_in_week, parse_iso_date};
use crate::units::{round_meters, DistanceUnit};

/// Build merged previews for a batch, in batch-input order.
pub fn preview_operations(
    operations: &[Operation],
    snapshot: &ScheduleSnapshot,
    unit: DistanceUnit,
) -> Vec<OperationPreview> {
    let mut simulation = Simulation::new(snapshot, unit);

    let mut prepared: Vec<(usize, &Operation, Option<usize>)> = operations
        .iter()
        .enumerate()
        .map(|(index, operation)| {
            let target = operation
                .target()
                .and_then(|t| simulation.resolve(t, index));
            (index, operation, target)
        })
        .collect();
    prepared.sort_by_key(|(_, operation, _)| operation.priority());

    for (index, operation, target) in prepared {
        simulation.run(index, operation, target);
    }

    let mut touched: Vec<&SimEntity> = simulation
        .entities
        .iter()
        .filter(|e| e.first_op.is_some())
        .collect();
    touched.sort_by_key(|e| e.origin);

    operations
        .iter()
        .enumerate()
        .map(|(index, operation)| OperationPreview {
            operation: operation.clone(),
            human_description: describe(operation, unit),
            affected_entities: touched
                .iter()
                .filter(|e| e.first_op == Some(index))
                .map(|e| e.diff())
                .collect(),
        })
        .collect()
}

/// One schedule entity as the batch moves and edits it.
#[derive(Debug, Clone)]
struct SimEntity {
    id: Option<String>,
    /// `(week, day)` held before the batch; diffs are keyed by it
    origin: (u32, u8),
    week_number: u32,
    day: u8,
    before: WorkoutView,
    current: WorkoutView,
    /// Lowest batch index of an operation that touched this entity
    first_op: Option<usize>,
}

impl SimEntity {
    fn diff(&self) -> AffectedEntity {
        AffectedEntity {
            week_number: self.origin.0,
            day: self.origin.1,
            before: self.before.clone(),
            after: self.current.clone(),
        }
    }
}

struct Simulation<'a> {
    snapshot: &'a ScheduleSnapshot,
    unit: DistanceUnit,
    entities: Vec<SimEntity>,
}

impl<'a> Simulation<'a> {
    fn new(snapshot: &'a ScheduleSnapshot, unit: DistanceUnit) -> Self {
        let entities = snapshot
            .weeks
            .iter()
            .flat_map(|week| {
                week.workouts.iter().map(move |workout| {
                    let view = WorkoutView::from(workout);
                    SimEntity {
                        id: workout.id.clone(),
                        origin: (week.week_number, workout.day),
                        week_number: week.week_number,
                        day: workout.day,
                        before: view.clone(),
                        current: view,
                        first_op: None,
                    }
                })
            })
            .collect();
        Self {
            snapshot,
            unit,
            entities,
        }
    }

    fn at(&self, week_number: u32, day: u8) -> Option<usize> {
        self.entities
            .iter()
            .position(|e| e.week_number == week_number && e.day == day)
    }

    fn in_week(&self, week_number: u32) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.entities.len())
            .filter(|&i| self.entities[i].week_number == week_number)
            .collect();
        indices.sort_by_key(|&i| self.entities[i].day);
        indices
    }

    fn touch(&mut self, entity: usize, op_index: usize) {
        let first = &mut self.entities[entity].first_op;
        *first = Some(first.map_or(op_index, |f| f.min(op_index)));
    }

    /// Resolve a single-entity target, adding a placeholder for an empty slot.
    ///
    /// A new placeholder counts as touched by `op_index`, since creating it
    /// is itself a write.
    fn resolve(&mut self, target: &WorkoutTarget, op_index: usize) -> Option<usize> {
        if let Some(raw) = &target.slot {
            let slot = SlotRef::parse(raw)?;
            if let Some(existing) = self.at(slot.week, slot.day) {
                return Some(existing);
            }
            let week = self.snapshot.week(slot.week)?;
            let view = WorkoutView::empty_slot(date_for_day(week.start_date, slot.day)?);
            self.entities.push(SimEntity {
                id: None,
                origin: (slot.week, slot.day),
                week_number: slot.week,
                day: slot.day,
                before: view.clone(),
                current: view,
                first_op: Some(op_index),
            });
            return Some(self.entities.len() - 1);
        }

        let id = target.workout_id.as_deref()?;
        self.entities
            .iter()
            .position(|e| e.id.as_deref() == Some(id))
    }

    fn selected_weeks(&self, selector: &WeekSelector) -> Vec<u32> {
        selector
            .resolve(&self.snapshot.week_numbers())
            .into_iter()
            .filter(|n| self.snapshot.has_week(*n))
            .collect()
    }

    /// Put an entity on another day of a week; date and slot move together.
    fn relocate(&mut self, entity: usize, week_number: u32, day: u8) {
        let Some(date) = self
            .snapshot
            .week(week_number)
            .and_then(|week| date_for_day(week.start_date, day))
        else {
            return;
        };
        let e = &mut self.entities[entity];
        e.week_number = week_number;
        e.day = day;
        e.current.date = date;
    }

    fn run(&mut self, op_index: usize, operation: &Operation, target: Option<usize>) {
        match operation {
            Operation::ChangeWorkoutDistance(ChangeWorkoutDistance { distance, .. }) => {
                self.edit(target, op_index, |view| view.distance = round_meters(*distance))
            }
            Operation::ScaleWorkoutDistance(ScaleWorkoutDistance { factor, .. }) => self
                .edit(target, op_index, |view| {
                    view.distance = round_meters(view.distance * factor)
                }),
            Operation::ChangeIntensity(ChangeIntensity { intensity, .. }) => {
                self.edit(target, op_index, |view| {
                    view.intensity = Some(intensity.trim().to_ascii_lowercase())
                })
            }
            Operation::ChangeWorkoutType(ChangeWorkoutType {
                category,
                description,
                ..
            }) => {
                let unit = self.unit;
                self.edit(target, op_index, |view| {
                    let change = category_change(
                        &WorkoutCategory::from(category.as_str()),
                        description.as_deref(),
                        view.distance,
                        unit,
                    );
                    apply_category_change(view, change);
                })
            }
            Operation::RescheduleWorkout(op) => self.reschedule(op, target, op_index),
            Operation::SwapDays(op) => self.swap_days(op, op_index),
            Operation::MoveWorkoutType(op) => self.move_workout_type(op, op_index),
            Operation::RemoveWorkoutType(op) => self.remove_workout_type(op, op_index),
            Operation::ScaleWeekVolume(ScaleWeekVolume {
                week_number,
                factor,
            }) => self.scale_weeks(&[*week_number], *factor, op_index),
            Operation::ScalePhaseVolume(ScalePhaseVolume { phase, factor }) => {
                let weeks = self.snapshot.weeks_in_phase(phase);
                self.scale_weeks(&weeks, *factor, op_index)
            }
        }
    }

    fn edit(
        &mut self,
        target: Option<usize>,
        op_index: usize,
        edit: impl FnOnce(&mut WorkoutView),
    ) {
        let Some(entity) = target else {
            return;
        };
        edit(&mut self.entities[entity].current);
        self.touch(entity, op_index);
    }

    fn reschedule(&mut self, op: &RescheduleWorkout, target: Option<usize>, op_index: usize) {
        let Some(entity) = target else {
            return;
        };
        let Some(new_date) = parse_iso_date(&op.new_date) else {
            return;
        };
        let Some(dest_week) = self.snapshot.week_containing(new_date) else {
            return;
        };
        let dest_week_number = dest_week.week_number;
        let Some(dest_day) = day_in_week(dest_week.start_date, new_date) else {
            return;
        };

        let (old_week, old_day) = (self.entities[entity].week_number, self.entities[entity].day);
        if (old_week, old_day) == (dest_week_number, dest_day) {
            return;
        }
        let old_date = self.entities[entity].current.date;

        // The occupant of the destination takes the vacated slot.
        if let Some(occupant) = self.at(dest_week_number, dest_day) {
            let o = &mut self.entities[occupant];
            o.week_number = old_week;
            o.day = old_day;
            o.current.date = old_date;
            self.touch(occupant, op_index);
        }

        let e = &mut self.entities[entity];
        e.week_number = dest_week_number;
        e.day = dest_day;
        e.current.date = new_date;
        self.touch(entity, op_index);
    }

    fn swap_days(&mut self, op: &SwapDays, op_index: usize) {
        let (Some(day_a), Some(day_b)) = (slot_day(op.day_a), slot_day(op.day_b)) else {
            return;
        };
        if day_a == day_b {
            return;
        }
        for week in self.selected_weeks(&op.weeks) {
            let a = self.at(week, day_a);
            let b = self.at(week, day_b);
            if let Some(a) = a {
                self.relocate(a, week, day_b);
                self.touch(a, op_index);
            }
            if let Some(b) = b {
                self.relocate(b, week, day_a);
                self.touch(b, op_index);
            }
        }
    }

    fn move_workout_type(&mut self, op: &MoveWorkoutType, op_index: usize) {
        let Some(to_day) = slot_day(op.to_day) else {
            return;
        };
        let category = WorkoutCategory::from(op.category.as_str());
        for week in self.selected_weeks(&op.weeks) {
            let Some(source) = self
                .in_week(week)
                .into_iter()
                .find(|&i| self.entities[i].current.category == category)
            else {
                continue;
            };
            let vacated = self.entities[source].day;
            if vacated == to_day {
                continue;
            }
            let occupant = self.at(week, to_day);

            self.relocate(source, week, to_day);
            self.touch(source, op_index);
            if let Some(occupant) = occupant {
                self.relocate(occupant, week, vacated);
                self.touch(occupant, op_index);
            }
        }
    }

    fn remove_workout_type(&mut self, op: &RemoveWorkoutType, op_index: usize) {
        let category = WorkoutCategory::from(op.category.as_str());
        let replacement = WorkoutCategory::from(op.replacement.as_str());
        for week in self.selected_weeks(&op.weeks) {
            for entity in self.in_week(week) {
                if self.entities[entity].current.category != category {
                    continue;
                }
                let view = &mut self.entities[entity].current;
                let change = category_change(&replacement, None, view.distance, self.unit);
                apply_category_change(view, change);
                self.touch(entity, op_index);
            }
        }
    }

    fn scale_weeks(&mut self, weeks: &[u32], factor: f64, op_index: usize) {
        for &week in weeks {
            for entity in self.in_week(week) {
                let view = &mut self.entities[entity].current;
                if view.category.is_rest() {
                    continue;
                }
                let scaled = round_meters(view.distance * factor);
                if scaled != view.distance {
                    view.distance = scaled;
                    self.touch(entity, op_index);
                }
            }
        }
    }
}

fn apply_category_change(view: &mut WorkoutView, change: CategoryChange) {
    view.category = change.category;
    view.description = change.description;
    if let Some(intensity) = change.intensity {
        view.intensity = Some(intensity);
    }
    if let Some(distance) = change.distance {
        view.distance = distance;
    }
}

/// One-line description of an operation for people.
pub fn describe(operation: &Operation, unit: DistanceUnit) -> String {
    match operation {
        Operation::SwapDays(op) => format!(
            "Swap day {} and day {} in {}",
            op.day_a,
            op.day_b,
            op.weeks.describe()
        ),
        Operation::MoveWorkoutType(op) => format!(
            "Move {} workouts to day {} in {}",
            op.category,
            op.to_day,
            op.weeks.describe()
        ),
        Operation::RescheduleWorkout(op) => {
            format!("Reschedule {} to {}", op.target.label(), op.new_date)
        }
        Operation::ChangeWorkoutType(op) => {
            format!("Change {} to {}", op.target.label(), op.category)
        }
        Operation::ChangeWorkoutDistance(op) => format!(
            "Set {} distance to {}",
            op.target.label(),
            unit.format(op.distance)
        ),
        Operation::ScaleWorkoutDistance(op) => {
            format!("Scale {} distance by {}x", op.target.label(), op.factor)
        }
        Operation::ChangeIntensity(op) => {
            format!("Set {} intensity to {}", op.target.label(), op.intensity)
        }
        Operation::RemoveWorkoutType(op) => format!(
            "Replace {} workouts with {} in {}",
            op.category,
            op.replacement,
            op.weeks.describe()
        ),
        Operation::ScaleWeekVolume(op) => {
            format!("Scale week {} volume by {}x", op.week_number, op.factor)
        }
        Operation::ScalePhaseVolume(op) => {
            format!("Scale {} phase volume by {}x", op.phase, op.factor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SnapshotWeek, SnapshotWorkout};
    use chrono::NaiveDate;
    use serde_json::json;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    fn workout(day: u8, category: WorkoutCategory, distance: f64, start: u32) -> SnapshotWorkout {
        SnapshotWorkout {
            id: Some(format!("w{}-{}", start, day)),
            day,
            description: category.to_string(),
            category,
            distance,
            date: date(start + u32::from(day) - 1),
            intensity: None,
        }
    }

    /// Week 1 starts 2025-03-03, week 2 starts 2025-03-10.
    fn snapshot() -> ScheduleSnapshot {
        ScheduleSnapshot {
            weeks: vec![
                SnapshotWeek {
                    week_number: 1,
                    start_date: date(3),
                    phase: Some("base".to_string()),
                    workouts: vec![
                        workout(1, WorkoutCategory::EasyRun, 6000.0, 3),
                        workout(3, WorkoutCategory::Interval, 8000.0, 3),
                        workout(7, WorkoutCategory::Rest, 0.0, 3),
                    ],
                },
                SnapshotWeek {
                    week_number: 2,
                    start_date: date(10),
                    phase: Some("build".to_string()),
                    workouts: vec![
                        workout(4, WorkoutCategory::EasyRun, 8000.0, 10),
                        workout(6, WorkoutCategory::LongRun, 18000.0, 10),
                    ],
                },
            ],
        }
    }

    fn ops(value: serde_json::Value) -> Vec<Operation> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_merged_preview_shows_original_before_and_final_after() {
        let previews = preview_operations(
            &ops(json!([
                {"op": "ChangeWorkoutDistance", "ref": "W2:D4", "distance": 15000},
                {"op": "ChangeWorkoutType", "ref": "W2:D4", "category": "race"}
            ])),
            &snapshot(),
            DistanceUnit::Km,
        );

        assert_eq!(previews.len(), 2);
        assert_eq!(previews[0].affected_entities.len(), 1);
        assert!(previews[1].affected_entities.is_empty());

        let slot = &previews[0].affected_entities[0];
        assert_eq!(slot.before.category, WorkoutCategory::EasyRun);
        assert_eq!(slot.before.distance, 8000.0);
        assert_eq!(slot.after.category, WorkoutCategory::Race);
        assert_eq!(slot.after.distance, 15000.0);
        // The race description reads the distance set earlier in the batch
        assert_eq!(slot.after.description, "15.0 km race");
    }

    #[test]
    fn test_type_change_listed_first_still_sees_new_distance() {
        let previews = preview_operations(
            &ops(json!([
                {"op": "ChangeWorkoutType", "ref": "W2:D4", "category": "race"},
                {"op": "ChangeWorkoutDistance", "ref": "W2:D4", "distance": 21097.5}
            ])),
            &snapshot(),
            DistanceUnit::Km,
        );

        assert_eq!(previews[0].affected_entities.len(), 1);
        assert!(previews[1].affected_entities.is_empty());
        let slot = &previews[0].affected_entities[0];
        assert_eq!(slot.after.distance, 21098.0);
        assert_eq!(slot.after.description, "21.1 km race");
    }

    #[test]
    fn test_swap_moves_placeholder_created_for_reference() {
        // W2:D7 is empty: the type change creates it, then the swap moves it.
        let previews = preview_operations(
            &ops(json!([
                {"op": "SwapDays", "weeks": [2], "dayA": 4, "dayB": 7},
                {"op": "ChangeWorkoutType", "ref": "W2:D7", "category": "tempo"}
            ])),
            &snapshot(),
            DistanceUnit::Km,
        );

        let affected = &previews[0].affected_entities;
        assert_eq!(affected.len(), 2);
        assert!(previews[1].affected_entities.is_empty());

        let easy = &affected[0];
        assert_eq!((easy.week_number, easy.day), (2, 4));
        assert_eq!(easy.after.category, WorkoutCategory::EasyRun);
        assert_eq!(easy.after.date, date(16));

        let placeholder = &affected[1];
        assert_eq!((placeholder.week_number, placeholder.day), (2, 7));
        assert_eq!(placeholder.before.category, WorkoutCategory::Rest);
        assert_eq!(placeholder.before.date, date(16));
        assert_eq!(placeholder.after.category, WorkoutCategory::Tempo);
        assert_eq!(placeholder.after.date, date(13));
    }

    #[test]
    fn test_references_resolve_before_reschedule_moves_entities() {
        // The distance edit targets whatever sat at W2:D6 before the batch.
        let previews = preview_operations(
            &ops(json!([
                {"op": "RescheduleWorkout", "ref": "W2:D4", "newDate": "2025-03-15"},
                {"op": "ChangeWorkoutDistance", "ref": "W2:D6", "distance": 20000}
            ])),
            &snapshot(),
            DistanceUnit::Km,
        );

        let long_run = previews
            .iter()
            .flat_map(|p| &p.affected_entities)
            .find(|e| e.day == 6)
            .unwrap();
        assert_eq!(long_run.before.category, WorkoutCategory::LongRun);
        assert_eq!(long_run.after.distance, 20000.0);
        assert_eq!(long_run.after.date, date(13));
    }

    #[test]
    fn test_merge_attributes_slot_to_first_toucher_only() {
        let previews = preview_operations(
            &ops(json!([
                {"op": "ChangeIntensity", "ref": "W1:D1", "intensity": "hard"},
                {"op": "ScaleWeekVolume", "weekNumber": 1, "factor": 1.5}
            ])),
            &snapshot(),
            DistanceUnit::Km,
        );

        // Scaling touches W1:D1 and W1:D3; D1 belongs to the intensity change.
        assert_eq!(previews[0].affected_entities.len(), 1);
        assert_eq!(previews[0].affected_entities[0].after.distance, 9000.0);
        assert_eq!(
            previews[0].affected_entities[0].after.intensity.as_deref(),
            Some("hard")
        );
        assert_eq!(previews[1].affected_entities.len(), 1);
        assert_eq!(previews[1].affected_entities[0].day, 3);
    }

    #[test]
    fn test_week_scale_skips_rest() {
        let previews = preview_operations(
            &ops(json!([{"op": "ScaleWeekVolume", "weekNumber": 1, "factor": 1.5}])),
            &snapshot(),
            DistanceUnit::Km,
        );
        let days: Vec<u8> = previews[0].affected_entities.iter().map(|e| e.day).collect();
        assert_eq!(days, vec![1, 3]);
    }

    #[test]
    fn test_empty_slot_uses_synthetic_rest_before() {
        let previews = preview_operations(
            &ops(json!([{"op": "ChangeWorkoutType", "ref": "W2:D2", "category": "tempo"}])),
            &snapshot(),
            DistanceUnit::Km,
        );
        let slot = &previews[0].affected_entities[0];
        assert_eq!(slot.before.category, WorkoutCategory::Rest);
        assert_eq!(slot.before.date, date(11));
        assert_eq!(slot.after.category, WorkoutCategory::Tempo);
    }

    #[test]
    fn test_swap_exchanges_dates() {
        let previews = preview_operations(
            &ops(json!([{"op": "SwapDays", "weeks": [1], "dayA": 1, "dayB": 3}])),
            &snapshot(),
            DistanceUnit::Km,
        );
        let affected = &previews[0].affected_entities;
        assert_eq!(affected.len(), 2);
        assert_eq!(affected[0].day, 1);
        assert_eq!(affected[0].after.date, date(5));
        assert_eq!(affected[1].day, 3);
        assert_eq!(affected[1].after.date, date(3));
    }

    #[test]
    fn test_swap_with_empty_day_moves_single_workout() {
        let previews = preview_operations(
            &ops(json!([{"op": "SwapDays", "weeks": [2], "dayA": 4, "dayB": 5}])),
            &snapshot(),
            DistanceUnit::Km,
        );
        let affected = &previews[0].affected_entities;
        assert_eq!(affected.len(), 1);
        assert_eq!(affected[0].after.date, date(14));
    }

    #[test]
    fn test_reschedule_moves_occupant_back() {
        let previews = preview_operations(
            &ops(json!([{"op": "RescheduleWorkout", "ref": "W2:D4", "newDate": "2025-03-15"}])),
            &snapshot(),
            DistanceUnit::Km,
        );
        let affected = &previews[0].affected_entities;
        assert_eq!(affected.len(), 2);
        assert_eq!(affected[0].after.date, date(15));
        assert_eq!(affected[1].day, 6);
        assert_eq!(affected[1].after.date, date(13));
    }

    #[test]
    fn test_remove_type_applies_replacement_defaults() {
        let previews = preview_operations(
            &ops(json!([{"op": "RemoveWorkoutType", "category": "interval"}])),
            &snapshot(),
            DistanceUnit::Km,
        );
        let slot = &previews[0].affected_entities[0];
        assert_eq!(slot.after.category, WorkoutCategory::Rest);
        assert_eq!(slot.after.distance, 0.0);
        assert_eq!(slot.after.description, "Rest day");
    }

    #[test]
    fn test_phase_scale_and_description() {
        let batch = ops(json!([{"op": "ScalePhaseVolume", "phase": "Build", "factor": 0.5}]));
        let previews = preview_operations(&batch, &snapshot(), DistanceUnit::Km);
        assert_eq!(previews[0].affected_entities.len(), 2);
        assert_eq!(previews[0].affected_entities[1].after.distance, 9000.0);
        assert_eq!(
            previews[0].human_description,
            "Scale Build phase volume by 0.5x"
        );
    }

    #[test]
    fn test_preview_does_not_mutate_snapshot() {
        let snap = snapshot();
        let before = serde_json::to_value(&snap).unwrap();
        let _ = preview_operations(
            &ops(json!([{"op": "SwapDays", "dayA": 1, "dayB": 3}])),
            &snap,
            DistanceUnit::Km,
        );
        assert_eq!(serde_json::to_value(&snap).unwrap(), before);
    }
}
