// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Plan operations: the closed set of edits that can be applied to a schedule.
//!
//! Each variant carries only the fields it needs and can be validated,
//! previewed and executed on its own. Operations arrive as JSON tagged by
//! `"op"`, e.g. `{"op": "ScaleWorkoutDistance", "ref": "W2:D4", "factor": 1.1}`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single schedule edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op")]
pub enum Operation {
    SwapDays(SwapDays),
    MoveWorkoutType(MoveWorkoutType),
    RescheduleWorkout(RescheduleWorkout),
    ChangeWorkoutType(ChangeWorkoutType),
    ChangeWorkoutDistance(ChangeWorkoutDistance),
    ScaleWorkoutDistance(ScaleWorkoutDistance),
    ChangeIntensity(ChangeIntensity),
    RemoveWorkoutType(RemoveWorkoutType),
    ScaleWeekVolume(ScaleWeekVolume),
    ScalePhaseVolume(ScalePhaseVolume),
}

impl Operation {
    /// Variant name as it appears on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::SwapDays(_) => "SwapDays",
            Operation::MoveWorkoutType(_) => "MoveWorkoutType",
            Operation::RescheduleWorkout(_) => "RescheduleWorkout",
            Operation::ChangeWorkoutType(_) => "ChangeWorkoutType",
            Operation::ChangeWorkoutDistance(_) => "ChangeWorkoutDistance",
            Operation::ScaleWorkoutDistance(_) => "ScaleWorkoutDistance",
            Operation::ChangeIntensity(_) => "ChangeIntensity",
            Operation::RemoveWorkoutType(_) => "RemoveWorkoutType",
            Operation::ScaleWeekVolume(_) => "ScaleWeekVolume",
            Operation::ScalePhaseVolume(_) => "ScalePhaseVolume",
        }
    }

    /// Execution priority; lower runs first.
    ///
    /// Distance edits must land before type changes because the race smart
    /// default derives its description from the current distance.
    pub fn priority(&self) -> u8 {
        match self {
            Operation::ChangeWorkoutDistance(_) | Operation::ScaleWorkoutDistance(_) => 1,
            Operation::ChangeIntensity(_) => 2,
            Operation::ChangeWorkoutType(_) => 3,
            Operation::RescheduleWorkout(_) => 4,
            Operation::SwapDays(_) | Operation::MoveWorkoutType(_) => 5,
            Operation::RemoveWorkoutType(_) => 6,
            Operation::ScaleWeekVolume(_) => 7,
            Operation::ScalePhaseVolume(_) => 8,
        }
    }

    /// The single-entity target, for variants that have one.
    pub fn target(&self) -> Option<&WorkoutTarget> {
        match self {
            Operation::RescheduleWorkout(op) => Some(&op.target),
            Operation::ChangeWorkoutType(op) => Some(&op.target),
            Operation::ChangeWorkoutDistance(op) => Some(&op.target),
            Operation::ScaleWorkoutDistance(op) => Some(&op.target),
            Operation::ChangeIntensity(op) => Some(&op.target),
            _ => None,
        }
    }
}

/// Which entity a single-entity operation addresses.
///
/// Exactly one of the two fields must be set; the validator enforces this.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutTarget {
    /// Symbolic `W<week>:D<day>` reference
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<String>,
    /// Direct store identity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workout_id: Option<String>,
}

impl WorkoutTarget {
    pub fn slot(raw: impl Into<String>) -> Self {
        Self {
            slot: Some(raw.into()),
            workout_id: None,
        }
    }

    /// Human-readable label for messages.
    pub fn label(&self) -> String {
        match (&self.slot, &self.workout_id) {
            (Some(slot), _) => slot.clone(),
            (None, Some(id)) => format!("workout {}", id),
            (None, None) => "<no target>".to_string(),
        }
    }
}

/// Parsed `W<week>:D<day>` reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotRef {
    pub week: u32,
    pub day: u8,
}

impl SlotRef {
    /// Parse `W<digits>:D<digits>` (letters case-insensitive).
    ///
    /// Only the shape is checked here; range checks belong to the validator.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (week_part, day_part) = raw.split_once(':')?;
        let week_digits = week_part
            .strip_prefix('W')
            .or_else(|| week_part.strip_prefix('w'))?;
        let day_digits = day_part
            .strip_prefix('D')
            .or_else(|| day_part.strip_prefix('d'))?;
        if !all_digits(week_digits) || !all_digits(day_digits) {
            return None;
        }
        Some(Self {
            week: week_digits.parse().ok()?,
            day: day_digits.parse().ok()?,
        })
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

impl fmt::Display for SlotRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "W{}:D{}", self.week, self.day)
    }
}

/// Set of weeks a bulk operation applies to: `"all"` or a list of numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WeekSelectorRepr", into = "WeekSelectorRepr")]
pub enum WeekSelector {
    #[default]
    All,
    Weeks(Vec<u32>),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum WeekSelectorRepr {
    Keyword(String),
    Single(u32),
    List(Vec<u32>),
}

impl TryFrom<WeekSelectorRepr> for WeekSelector {
    type Error = String;

    fn try_from(repr: WeekSelectorRepr) -> Result<Self, Self::Error> {
        match repr {
            WeekSelectorRepr::Keyword(k) if k.eq_ignore_ascii_case("all") => Ok(WeekSelector::All),
            WeekSelectorRepr::Keyword(k) => Err(format!(
                "invalid week selector '{}'; expected \"all\" or a list of week numbers",
                k
            )),
            WeekSelectorRepr::Single(week) => Ok(WeekSelector::Weeks(vec![week])),
            WeekSelectorRepr::List(weeks) => Ok(WeekSelector::Weeks(weeks)),
        }
    }
}

impl From<WeekSelector> for WeekSelectorRepr {
    fn from(selector: WeekSelector) -> Self {
        match selector {
            WeekSelector::All => WeekSelectorRepr::Keyword("all".to_string()),
            WeekSelector::Weeks(weeks) => WeekSelectorRepr::List(weeks),
        }
    }
}

impl WeekSelector {
    /// Concrete week numbers, given every week that exists.
    pub fn resolve(&self, existing: &[u32]) -> Vec<u32> {
        match self {
            WeekSelector::All => existing.to_vec(),
            WeekSelector::Weeks(weeks) => weeks.clone(),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            WeekSelector::All => "every week".to_string(),
            WeekSelector::Weeks(weeks) if weeks.len() == 1 => format!("week {}", weeks[0]),
            WeekSelector::Weeks(weeks) => {
                let list: Vec<String> = weeks.iter().map(|w| w.to_string()).collect();
                format!("weeks {}", list.join(", "))
            }
        }
    }
}

/// A wire day number as a slot day, if it lies in 1..=7.
///
/// Day fields are wide integers on the wire so an out-of-range value
/// reaches the validator instead of failing deserialization.
pub fn slot_day(day: i64) -> Option<u8> {
    u8::try_from(day).ok().filter(|d| (1..=7).contains(d))
}

fn default_rest() -> String {
    "rest".to_string()
}

/// Exchange two days within each selected week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapDays {
    #[serde(default)]
    pub weeks: WeekSelector,
    pub day_a: i64,
    pub day_b: i64,
}

/// Move the workout of a category to another day within each selected week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveWorkoutType {
    #[serde(default)]
    pub weeks: WeekSelector,
    pub category: String,
    pub to_day: i64,
}

/// Move one workout to a specific calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleWorkout {
    #[serde(flatten)]
    pub target: WorkoutTarget,
    /// `YYYY-MM-DD`
    pub new_date: String,
}

/// Change a workout's category, applying smart defaults unless a description is given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeWorkoutType {
    #[serde(flatten)]
    pub target: WorkoutTarget,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Set a workout's distance (metres).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeWorkoutDistance {
    #[serde(flatten)]
    pub target: WorkoutTarget,
    pub distance: f64,
}

/// Multiply a workout's distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleWorkoutDistance {
    #[serde(flatten)]
    pub target: WorkoutTarget,
    pub factor: f64,
}

/// Set a workout's intensity label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeIntensity {
    #[serde(flatten)]
    pub target: WorkoutTarget,
    pub intensity: String,
}

/// Replace every workout of a category with another category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveWorkoutType {
    #[serde(default)]
    pub weeks: WeekSelector,
    pub category: String,
    #[serde(default = "default_rest")]
    pub replacement: String,
}

/// Scale every non-rest workout in one week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleWeekVolume {
    pub week_number: u32,
    pub factor: f64,
}

/// Scale every non-rest workout in the weeks of a training phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalePhaseVolume {
    pub phase: String,
    pub factor: f64,
}
