// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper implementing the schedule store.
//!
//! Collections:
//! - `plans` (plan headers, keyed by plan_id)
//! - `plan_weeks` (week start dates and phases, keyed by `{plan_id}_{week}`)
//! - `workouts` (schedule entities, keyed by workout_id)

use crate::db::{collections, ScheduleStore};
use crate::error::{AppError, Result};
use crate::models::{
    NewWorkout, PlanWeek, ScheduleSnapshot, SnapshotWeek, SnapshotWorkout, TrainingPlan, Workout,
};
use crate::time_utils::now_rfc3339;
use async_trait::async_trait;
use futures_util::{stream, StreamExt};

const MAX_CONCURRENT_DB_OPS: usize = 50;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: firestore::FirestoreDb,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self { client })
    }

    // ─── Plan Setup ──────────────────────────────────────────────

    /// Create or update a plan header.
    pub async fn upsert_plan(&self, plan: &TrainingPlan) -> Result<()> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::PLANS)
            .document_id(&plan.plan_id)
            .object(plan)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Create or update a plan week.
    pub async fn upsert_week(&self, week: &PlanWeek) -> Result<()> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::PLAN_WEEKS)
            .document_id(crate::db::plan_week_doc_id(&week.plan_id, week.week_number))
            .object(week)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Write seeded workouts as-is (no version checks).
    pub async fn upsert_workouts(&self, workouts: &[Workout]) -> Result<()> {
        let client = &self.client;

        stream::iter(workouts)
            .map(|workout| async move {
                let _: () = client
                    .fluent()
                    .update()
                    .in_col(collections::WORKOUTS)
                    .document_id(&workout.workout_id)
                    .object(workout)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok::<_, AppError>(())
            })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<()>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<()>>>()?;

        Ok(())
    }

    async fn read_workout(&self, workout_id: &str) -> Result<Option<Workout>> {
        read_workout_in(&self.client, workout_id).await
    }
}

async fn read_workout_in(
    client: &firestore::FirestoreDb,
    workout_id: &str,
) -> Result<Option<Workout>> {
    client
        .fluent()
        .select()
        .by_id_in(collections::WORKOUTS)
        .obj()
        .one(workout_id)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}

/// Compare the stored version with the one about to be overwritten.
///
/// Pass a client bound to a transaction so the read is registered for
/// conflict detection at commit.
async fn check_version(client: &firestore::FirestoreDb, workout: &Workout) -> Result<()> {
    let stored = read_workout_in(client, &workout.workout_id)
        .await?
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

#[async_trait]
impl ScheduleStore for FirestoreDb {
    async fn get_plan(&self, plan_id: &str) -> Result<Option<TrainingPlan>> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::PLANS)
            .obj()
            .one(plan_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn load_snapshot(&self, plan_id: &str) -> Result<ScheduleSnapshot> {
        let plan_id_owned = plan_id.to_string();
        let weeks: Vec<PlanWeek> = self
            .client
            .fluent()
            .select()
            .from(collections::PLAN_WEEKS)
            .filter(move |q| q.for_all([q.field("plan_id").eq(plan_id_owned.clone())]))
            .order_by([("week_number", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let plan_id_owned = plan_id.to_string();
        let mut workouts: Vec<Workout> = self
            .client
            .fluent()
            .select()
            .from(collections::WORKOUTS)
            .filter(move |q| q.for_all([q.field("plan_id").eq(plan_id_owned.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        workouts.sort_by_key(|w| (w.week_number, w.day));

        tracing::debug!(
            plan_id,
            weeks = weeks.len(),
            workouts = workouts.len(),
            "Loaded schedule snapshot"
        );

        Ok(ScheduleSnapshot {
            weeks: weeks
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
                .collect(),
        })
    }

    async fn find_workout_at(
        &self,
        plan_id: &str,
        week_number: u32,
        day: u8,
    ) -> Result<Option<Workout>> {
        let plan_id = plan_id.to_string();
        let found: Vec<Workout> = self
            .client
            .fluent()
            .select()
            .from(collections::WORKOUTS)
            .filter(move |q| {
                q.for_all([
                    q.field("plan_id").eq(plan_id.clone()),
                    q.field("week_number").eq(week_number),
                    q.field("day").eq(day),
                ])
            })
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(found.into_iter().next())
    }

    async fn get_workout(&self, plan_id: &str, workout_id: &str) -> Result<Option<Workout>> {
        Ok(self
            .read_workout(workout_id)
            .await?
            .filter(|w| w.plan_id == plan_id))
    }

    async fn list_week_workouts(&self, plan_id: &str, week_number: u32) -> Result<Vec<Workout>> {
        let plan_id = plan_id.to_string();
        self.client
            .fluent()
            .select()
            .from(collections::WORKOUTS)
            .filter(move |q| {
                q.for_all([
                    q.field("plan_id").eq(plan_id.clone()),
                    q.field("week_number").eq(week_number),
                ])
            })
            .order_by([("day", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn create_workout(&self, workout: &NewWorkout) -> Result<Workout> {
        let created = workout
            .clone()
            .into_workout(uuid::Uuid::new_v4().to_string(), now_rfc3339());

        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::WORKOUTS)
            .document_id(&created.workout_id)
            .object(&created)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(
            workout_id = %created.workout_id,
            slot = %created.slot_label(),
            "Created workout"
        );
        Ok(created)
    }

    async fn update_workout(&self, workout: &Workout) -> Result<Workout> {
        let mut written = self.update_workouts_atomic(std::slice::from_ref(workout)).await?;
        written
            .pop()
            .ok_or_else(|| AppError::Database("Empty write result".to_string()))
    }

    /// Version-check and write all workouts in one Firestore transaction.
    async fn update_workouts_atomic(&self, workouts: &[Workout]) -> Result<Vec<Workout>> {
        let mut transaction = self
            .client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // Reads through this client run inside the transaction.
        let in_transaction = self.client.clone_with_consistency_selector(
            firestore::FirestoreConsistencySelector::Transaction(
                transaction.transaction_id().clone(),
            ),
        );
        for workout in workouts {
            if let Err(e) = check_version(&in_transaction, workout).await {
                let _ = transaction.rollback().await;
                return Err(e);
            }
        }

        let now = now_rfc3339();
        let mut written = Vec::with_capacity(workouts.len());

        for workout in workouts {
            let mut next = workout.clone();
            next.version += 1;
            next.updated_at = now.clone();

            self.client
                .fluent()
                .update()
                .in_col(collections::WORKOUTS)
                .document_id(&next.workout_id)
                .object(&next)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add workout to transaction: {}", e))
                })?;

            written.push(next);
        }

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        Ok(written)
    }
}
