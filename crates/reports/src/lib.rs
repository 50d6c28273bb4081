//! # Phat Nguoi Reports
//!
//! Report generation - statistics, performance, camera efficiency, trends,
//! and CSV/JSON/Markdown export.
//!
//! This crate holds pure report types: the business layer fills them from
//! aggregate queries and feeds them through the exporters.
//!
//! ## Exporters
//!
//! - [`CsvExporter`] - CSV format with proper escaping
//! - [`JsonExporter`] - JSON format (pretty or compact)
//! - [`MarkdownExporter`] - Markdown tables for documentation
//!
//! ## Reports
//!
//! - [`ViolationStatistics`] / [`DashboardReport`] - status-partitioned counts
//! - [`OfficerPerformanceReport`] - per-officer processing counts
//! - [`CameraEfficiencyReport`] - per-camera detection rates
//! - [`TrendReport`] - per-day violation counts
//! - [`ViolationListing`] - filtered listing for export
//!
//! ## Example
//!
//! ```rust,ignore
//! use phatnguoi_reports::{CsvExporter, ReportExporter, ViolationListing};
//!
//! let listing = ViolationListing::from_violations("Export", &violations, now);
//! let csv = CsvExporter::new().export(&listing);
//! ```

pub mod exporters;
pub mod performance;
pub mod statistics;

// Re-export main types
pub use exporters::{
    CsvExporter, JsonExporter, MarkdownExporter, ReportData, ReportExporter, ViolationListing,
    ViolationListingRow,
};

pub use performance::{
    CameraEfficiencyReport, CameraEfficiencyRow, OfficerPerformanceReport, OfficerPerformanceRow,
    TrendPoint, TrendReport,
};

pub use statistics::{
    CameraStatistics, CitizenReportStatistics, DashboardReport, UserStatistics,
    ViolationStatistics,
};
