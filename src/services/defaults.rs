// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Category smart defaults.
//!
//! Changing a workout's category without an explicit description fills in
//! a description, intensity label and (for some categories) a distance.

use crate::models::WorkoutCategory;
use crate::units::DistanceUnit;

/// Fields derived from a category change.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryChange {
    pub category: WorkoutCategory,
    pub description: String,
    /// `None` leaves the current intensity untouched
    pub intensity: Option<String>,
    /// `None` leaves the current distance untouched
    pub distance: Option<f64>,
    pub clear_duration: bool,
}

/// Derive the fields for switching to `category`.
///
/// `current_distance` must be the distance at execution time: the race
/// description is built from it.
pub fn category_change(
    category: &WorkoutCategory,
    explicit_description: Option<&str>,
    current_distance: f64,
    unit: DistanceUnit,
) -> CategoryChange {
    if let Some(description) = explicit_description.filter(|d| !d.trim().is_empty()) {
        return CategoryChange {
            category: category.clone(),
            description: description.trim().to_string(),
            intensity: None,
            distance: None,
            clear_duration: false,
        };
    }

    let (description, intensity, distance, clear_duration) = match category {
        WorkoutCategory::Rest => ("Rest day".to_string(), Some("rest"), Some(0.0), true),
        WorkoutCategory::EasyRun => (
            "Easy run at conversational pace".to_string(),
            Some("easy"),
            None,
            false,
        ),
        WorkoutCategory::LongRun => (
            "Long run at steady aerobic pace".to_string(),
            Some("moderate"),
            None,
            false,
        ),
        WorkoutCategory::Interval => (
            "Interval session with recovery jogs".to_string(),
            Some("hard"),
            None,
            false,
        ),
        WorkoutCategory::Tempo => (
            "Tempo run at comfortably hard pace".to_string(),
            Some("moderate_hard"),
            None,
            false,
        ),
        WorkoutCategory::CrossTraining => (
            "Cross-training (bike, swim or elliptical)".to_string(),
            Some("easy"),
            Some(0.0),
            false,
        ),
        WorkoutCategory::Recovery => (
            "Recovery jog, very relaxed".to_string(),
            Some("very_easy"),
            None,
            false,
        ),
        WorkoutCategory::Race => (
            race_description(current_distance, unit),
            Some("race"),
            None,
            false,
        ),
        WorkoutCategory::Custom(name) => (humanize(name), None, None, false),
    };

    CategoryChange {
        category: category.clone(),
        description,
        intensity: intensity.map(str::to_string),
        distance,
        clear_duration,
    }
}

/// e.g. `15.0 km race`.
pub fn race_description(distance: f64, unit: DistanceUnit) -> String {
    if distance > 0.0 {
        format!("{} race", unit.format(distance))
    } else {
        "Race day".to_string()
    }
}

fn humanize(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
