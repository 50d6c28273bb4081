//! Violation operations - creation, review, bulk processing
//!
//! ViolationService gates every operation through the access policy, then
//! executes against the repositories. Status transitions are committed with
//! a guarded write conditioned on the previously-read status, so racing
//! processors observe InvalidTransition instead of overwriting each other.

use crate::error::BusinessResult;
use crate::services::ServiceContext;
use chrono::{DateTime, Utc};
use phatnguoi_core::{
    apply, authorize, authorize_read, generate_code, Action, CameraViolationInput, CoreError,
    Identity, ReportInput, Violation, ViolationPatch, ViolationStatus,
};
use phatnguoi_persistence::{CameraRepo, ViolationFilter, ViolationRepo};

type CodeGenerator = Box<dyn Fn(DateTime<Utc>) -> String + Send + Sync>;

/// Uniform action for bulk processing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    /// pending -> processed
    Approve,
    /// pending -> rejected
    Reject,
}

impl BulkAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BulkAction::Approve => "approve",
            BulkAction::Reject => "reject",
        }
    }

    pub fn target_status(&self) -> ViolationStatus {
        match self {
            BulkAction::Approve => ViolationStatus::Processed,
            BulkAction::Reject => ViolationStatus::Rejected,
        }
    }
}

/// One failed item in a bulk run
#[derive(Debug, Clone)]
pub struct BulkFailure {
    pub violation_id: i64,
    pub error: String,
}

/// Outcome of a bulk run: successes and failures reported separately,
/// the batch itself never fails as a whole.
#[derive(Debug, Clone)]
pub struct BulkOutcome {
    pub action: BulkAction,
    pub processed_violations: Vec<i64>,
    pub failed_violations: Vec<BulkFailure>,
}

impl BulkOutcome {
    fn new(action: BulkAction) -> Self {
        Self {
            action,
            processed_violations: Vec::new(),
            failed_violations: Vec::new(),
        }
    }

    fn fail(&mut self, violation_id: i64, error: impl ToString) {
        self.failed_violations.push(BulkFailure {
            violation_id,
            error: error.to_string(),
        });
    }
}

/// Violation Service - lifecycle operations on violation records
pub struct ViolationService<'a> {
    ctx: &'a ServiceContext,
    code_attempts: u32,
    code_generator: CodeGenerator,
}

impl<'a> ViolationService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self {
            ctx,
            code_attempts: 3,
            code_generator: Box::new(generate_code),
        }
    }

    pub fn with_code_attempts(mut self, attempts: u32) -> Self {
        self.code_attempts = attempts;
        self
    }

    pub fn with_code_generator(
        mut self,
        generator: impl Fn(DateTime<Utc>) -> String + Send + Sync + 'static,
    ) -> Self {
        self.code_generator = Box::new(generator);
        self
    }

    /// Insert with a fresh code per attempt; collisions on the unique
    /// constraint trigger regeneration, bounded by code_attempts.
    async fn insert_with_unique_code(&self, mut violation: Violation) -> BusinessResult<Violation> {
        let mut last_code = String::new();
        for attempt in 0..self.code_attempts {
            let code = (self.code_generator)(Utc::now());
            last_code = code.clone();
            violation.violation_code = code;

            match ViolationRepo::insert(self.ctx.pool(), &violation).await {
                Ok(id) => {
                    violation.id = id;
                    return Ok(violation);
                }
                Err(e) if e.is_unique_violation() => {
                    tracing::warn!(
                        attempt,
                        code = %violation.violation_code,
                        "violation code collision, regenerating"
                    );
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(CoreError::DuplicateCode(last_code).into())
    }

    /// Create a camera-sourced violation. Officer/authority only; the camera
    /// must exist.
    pub async fn create_from_camera(
        &self,
        identity: &Identity,
        input: CameraViolationInput,
    ) -> BusinessResult<Violation> {
        authorize(identity, Action::CreateCameraViolation)?;

        CameraRepo::get_by_id(self.ctx.pool(), input.camera_id)
            .await
            .map_err(|_| CoreError::not_found("Camera", input.camera_id))?;

        let now = Utc::now();
        let violation = Violation::new_camera(input, String::new(), now);
        violation.validate_provenance()?;

        let violation = self.insert_with_unique_code(violation).await?;
        tracing::info!(
            violation_id = violation.id,
            code = %violation.violation_code,
            camera_id = ?violation.camera_id,
            "camera violation created"
        );
        Ok(violation)
    }

    /// File a citizen report. The fine is forced to zero (the authority sets
    /// it later) and reported_by is stamped from the acting identity.
    pub async fn report(
        &self,
        identity: &Identity,
        input: ReportInput,
    ) -> BusinessResult<Violation> {
        authorize(identity, Action::ReportViolation)?;

        let now = Utc::now();
        let violation = Violation::new_report(input, identity.user_id, String::new(), now);
        violation.validate_provenance()?;

        let violation = self.insert_with_unique_code(violation).await?;
        tracing::info!(
            violation_id = violation.id,
            code = %violation.violation_code,
            reported_by = identity.user_id,
            "citizen report filed"
        );
        Ok(violation)
    }

    /// Read one violation. NotFound is checked before the permission so a
    /// denial never leaks record existence.
    pub async fn get(&self, identity: &Identity, violation_id: i64) -> BusinessResult<Violation> {
        let row = ViolationRepo::get_by_id(self.ctx.pool(), violation_id)
            .await
            .map_err(|_| CoreError::not_found("Violation", violation_id))?;
        let violation = Violation::try_from(row)?;

        authorize_read(identity, &violation)?;
        Ok(violation)
    }

    /// Filtered listing for reviewers, newest first
    pub async fn list(
        &self,
        identity: &Identity,
        filter: &ViolationFilter,
        skip: i64,
        limit: i64,
    ) -> BusinessResult<Vec<Violation>> {
        authorize(identity, Action::ReadAnyViolation)?;
        validate_date_range(filter)?;

        let rows = ViolationRepo::list(self.ctx.pool(), filter, skip, limit).await?;
        rows_to_violations(rows)
    }

    /// A citizen's own reports, newest first
    pub async fn my_violations(
        &self,
        identity: &Identity,
        status: Option<ViolationStatus>,
        skip: i64,
        limit: i64,
    ) -> BusinessResult<Vec<Violation>> {
        authorize(identity, Action::ReadOwnReports)?;

        let rows = ViolationRepo::list_by_reporter(
            self.ctx.pool(),
            identity.user_id,
            status,
            skip,
            limit,
        )
        .await?;
        rows_to_violations(rows)
    }

    /// Public lookup, no identity required. Code lookup is exact and returns
    /// at most one record; plate lookup is a case-insensitive substring match.
    pub async fn lookup(
        &self,
        license_plate: Option<&str>,
        violation_code: Option<&str>,
    ) -> BusinessResult<Vec<Violation>> {
        match (license_plate, violation_code) {
            (_, Some(code)) => match ViolationRepo::get_by_code(self.ctx.pool(), code).await? {
                Some(row) => Ok(vec![Violation::try_from(row)?]),
                None => Ok(Vec::new()),
            },
            (Some(plate), None) => {
                let rows = ViolationRepo::list_by_plate(self.ctx.pool(), plate).await?;
                rows_to_violations(rows)
            }
            (None, None) => Err(CoreError::ValidationError(
                "either license_plate or violation_code must be provided".to_string(),
            )
            .into()),
        }
    }

    /// Process a pending violation. A patch without an explicit status
    /// defaults to processed; the state machine rejects anything but a
    /// pending record.
    pub async fn process(
        &self,
        identity: &Identity,
        violation_id: i64,
        mut patch: ViolationPatch,
    ) -> BusinessResult<Violation> {
        if patch.status.is_none() {
            patch.status = Some(ViolationStatus::Processed);
        }
        self.commit_patch(identity, violation_id, patch).await
    }

    /// Apply a patch to a violation (status changes go through the state
    /// machine; absent fields stay untouched).
    pub async fn update(
        &self,
        identity: &Identity,
        violation_id: i64,
        patch: ViolationPatch,
    ) -> BusinessResult<Violation> {
        if patch.is_empty() {
            return Err(CoreError::ValidationError("empty update".to_string()).into());
        }
        self.commit_patch(identity, violation_id, patch).await
    }

    /// Record payment of a processed violation
    pub async fn mark_paid(
        &self,
        identity: &Identity,
        violation_id: i64,
    ) -> BusinessResult<Violation> {
        self.commit_patch(
            identity,
            violation_id,
            ViolationPatch::new().with_status(ViolationStatus::Paid),
        )
        .await
    }

    /// Record an appeal against a processed violation
    pub async fn appeal(
        &self,
        identity: &Identity,
        violation_id: i64,
    ) -> BusinessResult<Violation> {
        self.commit_patch(
            identity,
            violation_id,
            ViolationPatch::new().with_status(ViolationStatus::Appealed),
        )
        .await
    }

    async fn commit_patch(
        &self,
        identity: &Identity,
        violation_id: i64,
        patch: ViolationPatch,
    ) -> BusinessResult<Violation> {
        // NotFound trước, permission sau
        let row = ViolationRepo::get_by_id(self.ctx.pool(), violation_id)
            .await
            .map_err(|_| CoreError::not_found("Violation", violation_id))?;
        let current = Violation::try_from(row)?;

        authorize(identity, Action::ProcessViolation)?;

        let expected = current.status;
        let next = apply(&current, &patch, identity.user_id, Utc::now())?;

        let committed = ViolationRepo::save_processing(self.ctx.pool(), &next, expected).await?;
        if !committed {
            // Một caller khác đã chuyển trạng thái trước; transition đầu tiên thắng
            return Err(
                CoreError::invalid_transition(expected.as_str(), next.status.as_str()).into(),
            );
        }

        tracing::info!(
            violation_id,
            status = %next.status,
            actor = identity.user_id,
            "violation updated"
        );
        Ok(next)
    }

    /// Bulk-process violations with a uniform action. Per-id failures are
    /// collected, never propagated; there is no atomicity across the batch.
    pub async fn quick_process(
        &self,
        identity: &Identity,
        violation_ids: &[i64],
        action: BulkAction,
        notes: Option<&str>,
    ) -> BusinessResult<BulkOutcome> {
        authorize(identity, Action::ProcessViolation)?;

        let default_notes = format!("Bulk {} by officer {}", action.as_str(), identity.user_id);
        let mut outcome = BulkOutcome::new(action);

        for &violation_id in violation_ids {
            let row = match ViolationRepo::get_by_id(self.ctx.pool(), violation_id).await {
                Ok(row) => row,
                Err(e) if e.is_not_found() => {
                    outcome.fail(violation_id, "Violation not found");
                    continue;
                }
                Err(e) => {
                    outcome.fail(violation_id, e);
                    continue;
                }
            };
            let current = match Violation::try_from(row) {
                Ok(v) => v,
                Err(e) => {
                    outcome.fail(violation_id, e);
                    continue;
                }
            };

            if current.status != ViolationStatus::Pending {
                outcome.fail(violation_id, "Violation is not pending");
                continue;
            }

            let patch = ViolationPatch::new()
                .with_status(action.target_status())
                .with_notes(notes.unwrap_or(&default_notes));
            let next = match apply(&current, &patch, identity.user_id, Utc::now()) {
                Ok(next) => next,
                Err(e) => {
                    outcome.fail(violation_id, e);
                    continue;
                }
            };

            match ViolationRepo::save_processing(self.ctx.pool(), &next, ViolationStatus::Pending)
                .await
            {
                Ok(true) => outcome.processed_violations.push(violation_id),
                Ok(false) => outcome.fail(violation_id, "Violation is not pending"),
                Err(e) => outcome.fail(violation_id, e),
            }
        }

        tracing::info!(
            action = action.as_str(),
            processed = outcome.processed_violations.len(),
            failed = outcome.failed_violations.len(),
            "bulk processing finished"
        );
        Ok(outcome)
    }
}

fn validate_date_range(filter: &ViolationFilter) -> BusinessResult<()> {
    if let (Some(from), Some(to)) = (filter.date_from, filter.date_to) {
        if to < from {
            return Err(CoreError::ValidationError(format!(
                "date_to {} is before date_from {}",
                to, from
            ))
            .into());
        }
    }
    Ok(())
}

fn rows_to_violations(
    rows: Vec<phatnguoi_persistence::ViolationRow>,
) -> BusinessResult<Vec<Violation>> {
    rows.into_iter()
        .map(|row| Violation::try_from(row).map_err(Into::into))
        .collect()
}
