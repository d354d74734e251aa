// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use crate::units::DistanceUnit;
use std::env;
use std::time::Duration;

/// Which `ScheduleStore` implementation backs the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    Memory,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    pub store_backend: StoreBackend,
    /// Unit used in generated descriptions and preview text
    pub distance_unit: DistanceUnit,
    /// Upper bound for a single operation's store round-trips
    pub operation_timeout: Duration,
    /// Apply requests allowed per user per window
    pub apply_rate_limit: u32,
    pub apply_rate_window: Duration,
    /// Owner of the seeded demo plan (memory backend only)
    pub demo_owner_id: String,

    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            store_backend: StoreBackend::Memory,
            distance_unit: DistanceUnit::Km,
            operation_timeout: Duration::from_millis(5000),
            apply_rate_limit: 30,
            apply_rate_window: Duration::from_secs(60),
            demo_owner_id: "demo-user".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let store_backend = match env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "firestore".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "firestore" => StoreBackend::Firestore,
            "memory" => StoreBackend::Memory,
            _ => return Err(ConfigError::Invalid("STORE_BACKEND")),
        };

        let distance_unit = match env::var("DISTANCE_UNIT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid("DISTANCE_UNIT"))?,
            Err(_) => DistanceUnit::Km,
        };

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            store_backend,
            distance_unit,
            operation_timeout: Duration::from_millis(parse_or("OPERATION_TIMEOUT_MS", 5000)),
            apply_rate_limit: parse_or("APPLY_RATE_LIMIT", 30),
            apply_rate_window: Duration::from_secs(parse_or("APPLY_RATE_WINDOW_SECS", 60)),
            demo_owner_id: env::var("DEMO_OWNER_ID").unwrap_or_else(|_| "demo-user".to_string()),
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
        })
    }
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
