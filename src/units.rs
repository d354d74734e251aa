// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Distance units used when rendering distances for people.
//!
//! All stored distances are metres. Conversion only happens at the edges
//! (descriptions, preview text).

use serde::{Deserialize, Serialize};

const METERS_PER_KILOMETER: f64 = 1000.0;
const METERS_PER_MILE: f64 = 1609.344;

/// Display unit for distances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    #[default]
    #[serde(alias = "kilometers")]
    Km,
    #[serde(alias = "miles")]
    Mi,
}

impl DistanceUnit {
    /// Convert metres into this unit.
    pub fn from_meters(self, meters: f64) -> f64 {
        match self {
            DistanceUnit::Km => meters / METERS_PER_KILOMETER,
            DistanceUnit::Mi => meters / METERS_PER_MILE,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            DistanceUnit::Km => "km",
            DistanceUnit::Mi => "mi",
        }
    }

    /// Format metres as e.g. `15.0 km`.
    pub fn format(self, meters: f64) -> String {
        format!("{:.1} {}", self.from_meters(meters), self.suffix())
    }
}

impl std::str::FromStr for DistanceUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "km" | "kilometers" | "kilometres" => Ok(DistanceUnit::Km),
            "mi" | "miles" => Ok(DistanceUnit::Mi),
            other => Err(format!("Unknown distance unit: {}", other)),
        }
    }
}

/// Round a distance to whole metres. Negative and non-finite input clamps to zero.
pub fn round_meters(meters: f64) -> f64 {
    if !meters.is_finite() || meters <= 0.0 {
        return 0.0;
    }
    meters.round()
}
