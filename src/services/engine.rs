// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Entry point for the validate / preview / apply workflow.

use crate::db::ScheduleStore;
use crate::error::{AppError, Result};
use crate::models::{ApplyResult, Operation, OperationPreview, ScheduleSnapshot, ValidationResult};
use crate::services::executor::Executor;
use crate::services::preview::preview_operations;
use crate::services::validator::validate_operations;
use crate::units::DistanceUnit;
use std::sync::Arc;
use std::time::Duration;

/// Ties the validator, previewer and executor to one store.
#[derive(Clone)]
pub struct PlanOperationsEngine {
    store: Arc<dyn ScheduleStore>,
    unit: DistanceUnit,
    operation_timeout: Duration,
}

impl PlanOperationsEngine {
    pub fn new(
        store: Arc<dyn ScheduleStore>,
        unit: DistanceUnit,
        operation_timeout: Duration,
    ) -> Self {
        Self {
            store,
            unit,
            operation_timeout,
        }
    }

    pub fn store(&self) -> &dyn ScheduleStore {
        self.store.as_ref()
    }

    /// Load a fresh snapshot of the plan's schedule.
    pub async fn snapshot(&self, plan_id: &str) -> Result<ScheduleSnapshot> {
        self.store.load_snapshot(plan_id).await
    }

    pub fn validate(&self, operations: &[Operation], snapshot: &ScheduleSnapshot) -> ValidationResult {
        validate_operations(operations, snapshot)
    }

    /// Validate, then preview. Previews are only computed for valid batches.
    pub fn preview(
        &self,
        operations: &[Operation],
        snapshot: &ScheduleSnapshot,
    ) -> (ValidationResult, Vec<OperationPreview>) {
        let validation = self.validate(operations, snapshot);
        if !validation.valid {
            return (validation, Vec::new());
        }
        let previews = preview_operations(operations, snapshot, self.unit);
        (validation, previews)
    }

    /// Validate against a fresh snapshot, then apply.
    ///
    /// Fails with `AppError::InvalidOperations` before touching the store if
    /// validation reports errors; per-operation failures after that are
    /// reported in the returned `ApplyResult`.
    pub async fn apply(&self, plan_id: &str, operations: &[Operation]) -> Result<ApplyResult> {
        let snapshot = self.snapshot(plan_id).await?;

        let validation = self.validate(operations, &snapshot);
        if !validation.valid {
            return Err(AppError::InvalidOperations(validation.errors));
        }
        for warning in &validation.warnings {
            tracing::debug!(plan_id, warning = %warning, "Validation warning");
        }

        let executor = Executor::new(self.store.as_ref(), self.unit, self.operation_timeout);
        let result = executor.apply(plan_id, operations, &snapshot).await;

        tracing::info!(
            plan_id,
            submitted = operations.len(),
            applied = result.operations_applied,
            entities = result.entities_modified,
            failed = result.errors.len(),
            "Batch applied"
        );

        Ok(result)
    }
}
