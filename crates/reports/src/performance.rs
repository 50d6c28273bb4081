//! Performance and efficiency reports
//!
//! Per-officer processing counts, per-camera detection rates, and per-day
//! violation trends. Sorting is deterministic: camera efficiency orders by
//! raw count descending with ties broken by camera id.

use crate::exporters::ReportData;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Officer Performance
// ============================================================================

/// One officer's processing count over the window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfficerPerformanceRow {
    pub officer_id: i64,
    pub officer_name: String,
    pub badge_number: Option<String>,
    pub department: Option<String>,
    pub processed_violations: i64,
}

/// Officer performance report.
///
/// For an authority this holds every active officer; for an officer it holds
/// a single self row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfficerPerformanceReport {
    pub period_days: i64,
    pub officers: Vec<OfficerPerformanceRow>,
    pub generated_at: DateTime<Utc>,
}

impl OfficerPerformanceReport {
    pub fn new(period_days: i64, generated_at: DateTime<Utc>) -> Self {
        Self {
            period_days,
            officers: Vec::new(),
            generated_at,
        }
    }

    pub fn add_officer(&mut self, row: OfficerPerformanceRow) {
        self.officers.push(row);
    }

    pub fn total_processed(&self) -> i64 {
        self.officers.iter().map(|o| o.processed_violations).sum()
    }
}

impl ReportData for OfficerPerformanceReport {
    fn title(&self) -> &str {
        "Officer Performance Report"
    }

    fn headers(&self) -> Vec<String> {
        vec![
            "Officer ID".to_string(),
            "Name".to_string(),
            "Badge".to_string(),
            "Department".to_string(),
            "Processed".to_string(),
        ]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.officers
            .iter()
            .map(|o| {
                vec![
                    o.officer_id.to_string(),
                    o.officer_name.clone(),
                    o.badge_number.clone().unwrap_or_default(),
                    o.department.clone().unwrap_or_default(),
                    o.processed_violations.to_string(),
                ]
            })
            .collect()
    }

    fn summary(&self) -> Vec<(String, String)> {
        vec![
            ("Period Days".to_string(), self.period_days.to_string()),
            ("Officers".to_string(), self.officers.len().to_string()),
            (
                "Total Processed".to_string(),
                self.total_processed().to_string(),
            ),
            ("Generated At".to_string(), self.generated_at.to_rfc3339()),
        ]
    }
}

// ============================================================================
// Camera Efficiency
// ============================================================================

/// One camera's detection count and daily rate over the window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraEfficiencyRow {
    pub camera_id: i64,
    pub camera_code: String,
    pub camera_name: String,
    pub location: String,
    pub camera_type: String,
    pub violations_detected: i64,
    /// violations per day over the window
    pub efficiency_rate: f64,
}

/// Camera efficiency report, sorted by detections descending
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraEfficiencyReport {
    pub period_days: i64,
    pub cameras: Vec<CameraEfficiencyRow>,
    pub generated_at: DateTime<Utc>,
}

impl CameraEfficiencyReport {
    pub fn new(period_days: i64, generated_at: DateTime<Utc>) -> Self {
        Self {
            period_days,
            cameras: Vec::new(),
            generated_at,
        }
    }

    pub fn add_camera(&mut self, row: CameraEfficiencyRow) {
        self.cameras.push(row);
    }

    /// Sort: raw count descending, ties by camera id ascending
    pub fn sort(&mut self) {
        self.cameras.sort_by(|a, b| {
            b.violations_detected
                .cmp(&a.violations_detected)
                .then(a.camera_id.cmp(&b.camera_id))
        });
    }
}

impl ReportData for CameraEfficiencyReport {
    fn title(&self) -> &str {
        "Camera Efficiency Report"
    }

    fn headers(&self) -> Vec<String> {
        vec![
            "Camera ID".to_string(),
            "Code".to_string(),
            "Name".to_string(),
            "Location".to_string(),
            "Type".to_string(),
            "Detected".to_string(),
            "Rate/Day".to_string(),
        ]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.cameras
            .iter()
            .map(|c| {
                vec![
                    c.camera_id.to_string(),
                    c.camera_code.clone(),
                    c.camera_name.clone(),
                    c.location.clone(),
                    c.camera_type.clone(),
                    c.violations_detected.to_string(),
                    format!("{:.2}", c.efficiency_rate),
                ]
            })
            .collect()
    }

    fn summary(&self) -> Vec<(String, String)> {
        let total: i64 = self.cameras.iter().map(|c| c.violations_detected).sum();
        vec![
            ("Period Days".to_string(), self.period_days.to_string()),
            ("Cameras".to_string(), self.cameras.len().to_string()),
            ("Total Detected".to_string(), total.to_string()),
            ("Generated At".to_string(), self.generated_at.to_rfc3339()),
        ]
    }
}

// ============================================================================
// Violation Trends
// ============================================================================

/// Per-day violation count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendPoint {
    /// YYYY-MM-DD
    pub date: String,
    pub count: i64,
}

/// Per-day violation counts over the window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendReport {
    pub period_days: i64,
    pub points: Vec<TrendPoint>,
    pub generated_at: DateTime<Utc>,
}

impl TrendReport {
    pub fn new(period_days: i64, generated_at: DateTime<Utc>) -> Self {
        Self {
            period_days,
            points: Vec::new(),
            generated_at,
        }
    }

    pub fn add_point(&mut self, date: String, count: i64) {
        self.points.push(TrendPoint { date, count });
    }

    pub fn total(&self) -> i64 {
        self.points.iter().map(|p| p.count).sum()
    }
}

impl ReportData for TrendReport {
    fn title(&self) -> &str {
        "Violation Trends"
    }

    fn headers(&self) -> Vec<String> {
        vec!["Date".to_string(), "Count".to_string()]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.points
            .iter()
            .map(|p| vec![p.date.clone(), p.count.to_string()])
            .collect()
    }

    fn summary(&self) -> Vec<(String, String)> {
        vec![
            ("Period Days".to_string(), self.period_days.to_string()),
            ("Total".to_string(), self.total().to_string()),
            ("Generated At".to_string(), self.generated_at.to_rfc3339()),
        ]
    }
}
