//! Statistics report types
//!
//! Aggregate counts over the violation set, camera fleet, and user base.
//! These are plain data holders; the business layer fills them from count
//! queries and may run them through the exporters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Violation counts partitioned by status over a trailing window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViolationStatistics {
    pub period_days: i64,
    pub total_violations: i64,
    pub pending_violations: i64,
    pub processed_violations: i64,
    pub paid_violations: i64,
    pub generated_at: DateTime<Utc>,
}

impl ViolationStatistics {
    pub fn summary_text(&self) -> String {
        let mut summary = String::new();
        summary.push_str(&format!(
            "=== Violation Statistics (last {} days) ===\n\n",
            self.period_days
        ));
        summary.push_str(&format!("Total:     {}\n", self.total_violations));
        summary.push_str(&format!("Pending:   {}\n", self.pending_violations));
        summary.push_str(&format!("Processed: {}\n", self.processed_violations));
        summary.push_str(&format!("Paid:      {}\n", self.paid_violations));
        summary
    }
}

/// Camera counts by status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraStatistics {
    pub total_cameras: i64,
    pub active_cameras: i64,
    pub inactive_cameras: i64,
    pub maintenance_cameras: i64,
}

/// User counts by role (authority-only view)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStatistics {
    pub total_users: i64,
    pub officers: i64,
    pub citizens: i64,
    pub authorities: i64,
}

/// Combined dashboard view.
///
/// `users` is filled only when the acting identity is an authority.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReport {
    pub period_days: i64,
    pub violations: ViolationStatistics,
    pub cameras: CameraStatistics,
    pub users: Option<UserStatistics>,
}

/// Counts of one citizen's own reports by status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitizenReportStatistics {
    pub total_reports: i64,
    pub pending_reports: i64,
    pub processed_reports: i64,
    pub rejected_reports: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_summary_text_format() {
        let stats = ViolationStatistics {
            period_days: 30,
            total_violations: 12,
            pending_violations: 5,
            processed_violations: 4,
            paid_violations: 3,
            generated_at: Utc::now(),
        };

        let text = stats.summary_text();
        assert!(text.contains("last 30 days"));
        assert!(text.contains("Total:     12"));
        assert!(text.contains("Pending:   5"));
    }

    #[test]
    fn test_dashboard_serializes() {
        let report = DashboardReport {
            period_days: 7,
            violations: ViolationStatistics {
                period_days: 7,
                total_violations: 1,
                pending_violations: 1,
                processed_violations: 0,
                paid_violations: 0,
                generated_at: Utc::now(),
            },
            cameras: CameraStatistics {
                total_cameras: 2,
                active_cameras: 2,
                inactive_cameras: 0,
                maintenance_cameras: 0,
            },
            users: None,
        };

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"period_days\":7"));
        assert!(json.contains("\"users\":null"));
    }
}
