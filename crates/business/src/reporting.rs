//! Report assembly - statistics, performance, efficiency, trends
//!
//! ReportService runs the aggregate count queries and fills the report types
//! from phatnguoi-reports. Reads are snapshot-at-read; they may run
//! concurrently with writes.

use crate::error::BusinessResult;
use crate::services::ServiceContext;
use crate::violation::ViolationService;
use chrono::{Duration, NaiveTime, Utc};
use phatnguoi_core::{
    authorize, Action, CameraStatus, CoreError, Identity, Role, ViolationStatus,
};
use phatnguoi_persistence::{CameraRepo, UserRepo, ViolationFilter, ViolationRepo};
use phatnguoi_reports::{
    CameraEfficiencyReport, CameraEfficiencyRow, CameraStatistics, CitizenReportStatistics,
    DashboardReport, OfficerPerformanceReport, OfficerPerformanceRow, TrendReport,
    UserStatistics, ViolationListing, ViolationStatistics,
};

/// Report Service - aggregate views over the violation set
pub struct ReportService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReportService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Violation counts by status over the trailing window. days in [1, 365].
    pub async fn statistics(
        &self,
        identity: &Identity,
        days: i64,
    ) -> BusinessResult<ViolationStatistics> {
        authorize(identity, Action::ViewStatistics)?;
        validate_days(days, 1)?;

        let now = Utc::now();
        let since = now - Duration::days(days);
        let pool = self.ctx.pool();

        Ok(ViolationStatistics {
            period_days: days,
            total_violations: ViolationRepo::count_created_since(pool, None, since).await?,
            pending_violations: ViolationRepo::count_created_since(
                pool,
                Some(ViolationStatus::Pending),
                since,
            )
            .await?,
            processed_violations: ViolationRepo::count_created_since(
                pool,
                Some(ViolationStatus::Processed),
                since,
            )
            .await?,
            paid_violations: ViolationRepo::count_created_since(
                pool,
                Some(ViolationStatus::Paid),
                since,
            )
            .await?,
            generated_at: now,
        })
    }

    /// Camera counts by status
    pub async fn camera_statistics(&self, identity: &Identity) -> BusinessResult<CameraStatistics> {
        authorize(identity, Action::ViewStatistics)?;

        let pool = self.ctx.pool();
        Ok(CameraStatistics {
            total_cameras: CameraRepo::count(pool).await?,
            active_cameras: CameraRepo::count_by_status(pool, CameraStatus::Active).await?,
            inactive_cameras: CameraRepo::count_by_status(pool, CameraStatus::Inactive).await?,
            maintenance_cameras: CameraRepo::count_by_status(pool, CameraStatus::Maintenance)
                .await?,
        })
    }

    /// Combined dashboard. User role counts only for the authority.
    pub async fn dashboard(
        &self,
        identity: &Identity,
        days: i64,
    ) -> BusinessResult<DashboardReport> {
        let violations = self.statistics(identity, days).await?;
        let cameras = self.camera_statistics(identity).await?;

        let users = if identity.role == Role::Authority {
            let pool = self.ctx.pool();
            Some(UserStatistics {
                total_users: UserRepo::count(pool).await?,
                officers: UserRepo::count_by_role(pool, Role::Officer).await?,
                citizens: UserRepo::count_by_role(pool, Role::Citizen).await?,
                authorities: UserRepo::count_by_role(pool, Role::Authority).await?,
            })
        } else {
            None
        };

        Ok(DashboardReport {
            period_days: days,
            violations,
            cameras,
            users,
        })
    }

    /// Officer processing counts. The authority sees every active officer;
    /// an officer sees a single self row.
    pub async fn officer_performance(
        &self,
        identity: &Identity,
        days: i64,
    ) -> BusinessResult<OfficerPerformanceReport> {
        validate_days(days, 1)?;

        let now = Utc::now();
        let since = now - Duration::days(days);
        let pool = self.ctx.pool();
        let mut report = OfficerPerformanceReport::new(days, now);

        if authorize(identity, Action::ViewAllPerformance).is_ok() {
            for row in UserRepo::list_active_officers(pool).await? {
                let processed = ViolationRepo::count_processed_by(pool, row.id, since).await?;
                report.add_officer(OfficerPerformanceRow {
                    officer_id: row.id,
                    officer_name: row.full_name,
                    badge_number: row.badge_number,
                    department: row.department,
                    processed_violations: processed,
                });
            }
        } else {
            // Self-report only; citizens are denied here
            authorize(identity, Action::ViewOwnPerformance)?;

            let row = UserRepo::get_by_id(pool, identity.user_id)
                .await
                .map_err(|_| CoreError::not_found("User", identity.user_id))?;
            let processed =
                ViolationRepo::count_processed_by(pool, identity.user_id, since).await?;
            report.add_officer(OfficerPerformanceRow {
                officer_id: row.id,
                officer_name: row.full_name,
                badge_number: row.badge_number,
                department: row.department,
                processed_violations: processed,
            });
        }

        Ok(report)
    }

    /// Per-camera detection counts over the window, sorted by count
    /// descending with ties broken by camera id.
    pub async fn camera_efficiency(
        &self,
        identity: &Identity,
        days: i64,
    ) -> BusinessResult<CameraEfficiencyReport> {
        authorize(identity, Action::ViewStatistics)?;
        validate_days(days, 1)?;

        let now = Utc::now();
        let since = now - Duration::days(days);
        let pool = self.ctx.pool();
        let mut report = CameraEfficiencyReport::new(days, now);

        for row in CameraRepo::list_active(pool).await? {
            let detected = ViolationRepo::count_by_camera(pool, row.id, since).await?;
            report.add_camera(CameraEfficiencyRow {
                camera_id: row.id,
                camera_code: row.camera_code,
                camera_name: row.name,
                location: row.location,
                camera_type: row.camera_type,
                violations_detected: detected,
                efficiency_rate: detected as f64 / days as f64,
            });
        }
        report.sort();

        Ok(report)
    }

    /// Per-day violation counts. days in [7, 365].
    pub async fn trends(&self, identity: &Identity, days: i64) -> BusinessResult<TrendReport> {
        authorize(identity, Action::ViewStatistics)?;
        validate_days(days, 7)?;

        let now = Utc::now();
        let pool = self.ctx.pool();
        let mut report = TrendReport::new(days, now);

        let start_day = (now - Duration::days(days)).date_naive();
        for i in 0..days {
            let day = start_day + Duration::days(i);
            let day_start = day.and_time(NaiveTime::MIN).and_utc();
            let day_end = day_start + Duration::days(1);
            let count =
                ViolationRepo::count_violation_time_between(pool, day_start, day_end).await?;
            report.add_point(day.format("%Y-%m-%d").to_string(), count);
        }

        Ok(report)
    }

    /// A citizen's own report counts by status
    pub async fn citizen_report_statistics(
        &self,
        identity: &Identity,
    ) -> BusinessResult<CitizenReportStatistics> {
        authorize(identity, Action::ReadOwnReports)?;

        let pool = self.ctx.pool();
        let reporter = identity.user_id;
        Ok(CitizenReportStatistics {
            total_reports: ViolationRepo::count_by_reporter(pool, reporter, None).await?,
            pending_reports: ViolationRepo::count_by_reporter(
                pool,
                reporter,
                Some(ViolationStatus::Pending),
            )
            .await?,
            processed_reports: ViolationRepo::count_by_reporter(
                pool,
                reporter,
                Some(ViolationStatus::Processed),
            )
            .await?,
            rejected_reports: ViolationRepo::count_by_reporter(
                pool,
                reporter,
                Some(ViolationStatus::Rejected),
            )
            .await?,
        })
    }

    /// Filtered listing packaged for export through the report exporters
    pub async fn export_listing(
        &self,
        identity: &Identity,
        filter: &ViolationFilter,
        skip: i64,
        limit: i64,
        title: &str,
    ) -> BusinessResult<ViolationListing> {
        let violations = ViolationService::new(self.ctx)
            .list(identity, filter, skip, limit)
            .await?;
        Ok(ViolationListing::from_violations(
            title,
            &violations,
            Utc::now(),
        ))
    }
}

fn validate_days(days: i64, min: i64) -> BusinessResult<()> {
    if days < min || days > 365 {
        return Err(CoreError::ValidationError(format!(
            "days must be between {} and 365, got {}",
            min, days
        ))
        .into());
    }
    Ok(())
}
