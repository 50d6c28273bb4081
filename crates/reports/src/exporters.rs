//! Report exporters - CSV, JSON, Markdown
//!
//! This module provides different export formats for reports.

use chrono::{DateTime, Utc};
use phatnguoi_core::Violation;

/// Trait for exporting reports to different formats
pub trait ReportExporter {
    /// Export to the target format
    fn export(&self, report: &dyn ReportData) -> String;

    /// Get the file extension for this format
    fn extension(&self) -> &'static str;

    /// Get the MIME type for this format
    fn mime_type(&self) -> &'static str;
}

/// Trait for data that can be exported
pub trait ReportData {
    /// Get the report title
    fn title(&self) -> &str;

    /// Get column headers
    fn headers(&self) -> Vec<String>;

    /// Get data rows
    fn rows(&self) -> Vec<Vec<String>>;

    /// Get summary statistics as key-value pairs
    fn summary(&self) -> Vec<(String, String)>;
}

// ============================================================================
// CSV Exporter
// ============================================================================

/// CSV format exporter
pub struct CsvExporter {
    delimiter: char,
    include_header: bool,
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self {
            delimiter: ',',
            include_header: true,
        }
    }
}

impl CsvExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn without_header(mut self) -> Self {
        self.include_header = false;
        self
    }

    fn escape_csv_field(&self, field: &str) -> String {
        if field.contains(self.delimiter) || field.contains('"') || field.contains('\n') {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }
}

impl ReportExporter for CsvExporter {
    fn export(&self, report: &dyn ReportData) -> String {
        let mut output = String::new();

        // Header
        if self.include_header {
            let headers: Vec<String> = report
                .headers()
                .iter()
                .map(|h| self.escape_csv_field(h))
                .collect();
            output.push_str(&headers.join(&self.delimiter.to_string()));
            output.push('\n');
        }

        // Data rows
        for row in report.rows() {
            let escaped: Vec<String> = row
                .iter()
                .map(|field| self.escape_csv_field(field))
                .collect();
            output.push_str(&escaped.join(&self.delimiter.to_string()));
            output.push('\n');
        }

        output
    }

    fn extension(&self) -> &'static str {
        "csv"
    }

    fn mime_type(&self) -> &'static str {
        "text/csv"
    }
}

// ============================================================================
// JSON Exporter
// ============================================================================

/// JSON format exporter
pub struct JsonExporter {
    pretty: bool,
}

impl Default for JsonExporter {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl JsonExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compact(mut self) -> Self {
        self.pretty = false;
        self
    }
}

impl ReportExporter for JsonExporter {
    fn export(&self, report: &dyn ReportData) -> String {
        let headers = report.headers();
        let rows = report.rows();
        let summary = report.summary();

        // Build JSON structure
        let json_rows: Vec<serde_json::Value> = rows
            .iter()
            .map(|row| {
                let mut obj = serde_json::Map::new();
                for (i, header) in headers.iter().enumerate() {
                    let value = row.get(i).cloned().unwrap_or_default();
                    obj.insert(header.clone(), serde_json::Value::String(value));
                }
                serde_json::Value::Object(obj)
            })
            .collect();

        let summary_obj: serde_json::Map<String, serde_json::Value> = summary
            .into_iter()
            .map(|(k, v)| (k, serde_json::Value::String(v)))
            .collect();

        let output = serde_json::json!({
            "title": report.title(),
            "summary": summary_obj,
            "data": json_rows,
        });

        if self.pretty {
            serde_json::to_string_pretty(&output).unwrap_or_default()
        } else {
            serde_json::to_string(&output).unwrap_or_default()
        }
    }

    fn extension(&self) -> &'static str {
        "json"
    }

    fn mime_type(&self) -> &'static str {
        "application/json"
    }
}

// ============================================================================
// Markdown Exporter
// ============================================================================

/// Markdown format exporter
pub struct MarkdownExporter {
    include_summary: bool,
    include_toc: bool,
}

impl Default for MarkdownExporter {
    fn default() -> Self {
        Self {
            include_summary: true,
            include_toc: false,
        }
    }
}

impl MarkdownExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_summary(mut self) -> Self {
        self.include_summary = false;
        self
    }

    pub fn with_toc(mut self) -> Self {
        self.include_toc = true;
        self
    }
}

impl ReportExporter for MarkdownExporter {
    fn export(&self, report: &dyn ReportData) -> String {
        let mut output = String::new();

        // Title
        output.push_str(&format!("# {}\n\n", report.title()));

        // Table of Contents
        if self.include_toc {
            output.push_str("## Table of Contents\n\n");
            if self.include_summary {
                output.push_str("- [Summary](#summary)\n");
            }
            output.push_str("- [Data](#data)\n\n");
        }

        // Summary section
        if self.include_summary {
            output.push_str("## Summary\n\n");
            for (key, value) in report.summary() {
                output.push_str(&format!("- **{}**: {}\n", key, value));
            }
            output.push('\n');
        }

        // Data table
        output.push_str("## Data\n\n");

        let headers = report.headers();
        if !headers.is_empty() {
            // Header row
            output.push_str("| ");
            output.push_str(&headers.join(" | "));
            output.push_str(" |\n");

            // Separator row
            output.push_str("| ");
            output.push_str(&headers.iter().map(|_| "---").collect::<Vec<_>>().join(" | "));
            output.push_str(" |\n");

            // Data rows
            for row in report.rows() {
                output.push_str("| ");
                output.push_str(&row.join(" | "));
                output.push_str(" |\n");
            }
        }

        output
    }

    fn extension(&self) -> &'static str {
        "md"
    }

    fn mime_type(&self) -> &'static str {
        "text/markdown"
    }
}

// ============================================================================
// Violation Listing Report
// ============================================================================

/// Filtered violation listing for export
#[derive(Debug, Clone)]
pub struct ViolationListing {
    pub title: String,
    pub entries: Vec<ViolationListingRow>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ViolationListingRow {
    pub violation_code: String,
    pub license_plate: String,
    pub violation_type: String,
    pub location: String,
    pub violation_time: String,
    pub fine_amount: String,
    pub status: String,
    pub source: String,
    pub processed_at: String,
}

impl ViolationListing {
    pub fn new(title: &str, generated_at: DateTime<Utc>) -> Self {
        Self {
            title: title.to_string(),
            entries: Vec::new(),
            generated_at,
        }
    }

    pub fn from_violations(
        title: &str,
        violations: &[Violation],
        generated_at: DateTime<Utc>,
    ) -> Self {
        let mut listing = Self::new(title, generated_at);
        for v in violations {
            listing.entries.push(ViolationListingRow {
                violation_code: v.violation_code.clone(),
                license_plate: v.license_plate.clone(),
                violation_type: v.violation_type.clone(),
                location: v.location.clone(),
                violation_time: v.violation_time.to_rfc3339(),
                fine_amount: v.fine_amount.to_string(),
                status: v.status.as_str().to_string(),
                source: v.source.as_str().to_string(),
                processed_at: v
                    .processed_at
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_default(),
            });
        }
        listing
    }
}

impl ReportData for ViolationListing {
    fn title(&self) -> &str {
        &self.title
    }

    fn headers(&self) -> Vec<String> {
        vec![
            "Code".to_string(),
            "License Plate".to_string(),
            "Type".to_string(),
            "Location".to_string(),
            "Violation Time".to_string(),
            "Fine".to_string(),
            "Status".to_string(),
            "Source".to_string(),
            "Processed At".to_string(),
        ]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.entries
            .iter()
            .map(|e| {
                vec![
                    e.violation_code.clone(),
                    e.license_plate.clone(),
                    e.violation_type.clone(),
                    e.location.clone(),
                    e.violation_time.clone(),
                    e.fine_amount.clone(),
                    e.status.clone(),
                    e.source.clone(),
                    e.processed_at.clone(),
                ]
            })
            .collect()
    }

    fn summary(&self) -> Vec<(String, String)> {
        let pending = self.entries.iter().filter(|e| e.status == "pending").count();
        vec![
            ("Total Records".to_string(), self.entries.len().to_string()),
            ("Pending".to_string(), pending.to_string()),
            ("Generated At".to_string(), self.generated_at.to_rfc3339()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use phatnguoi_core::{CameraViolationInput, Violation};
    use rust_decimal_macros::dec;

    fn sample_listing() -> ViolationListing {
        let now = Utc::now();
        let violations: Vec<Violation> = (0..2)
            .map(|i| {
                Violation::new_camera(
                    CameraViolationInput {
                        license_plate: format!("51A-123.4{}", i),
                        violation_type: "speeding".to_string(),
                        description: None,
                        location: "Nguyen Hue".to_string(),
                        violation_time: now,
                        fine_amount: dec!(800000),
                        camera_id: 1,
                        image_url: None,
                        video_url: None,
                    },
                    format!("VL20260801EXPRT00{}", i),
                    now,
                )
            })
            .collect();
        ViolationListing::from_violations("Violation Export", &violations, now)
    }

    #[test]
    fn test_csv_exporter() {
        let listing = sample_listing();
        let exporter = CsvExporter::new();
        let output = exporter.export(&listing);

        assert!(output.contains("Code,License Plate,Type"));
        assert!(output.contains("VL20260801EXPRT000"));
        assert!(output.contains("VL20260801EXPRT001"));
        assert!(output.contains("pending"));
        assert_eq!(exporter.extension(), "csv");
    }

    #[test]
    fn test_csv_with_special_chars() {
        let now = Utc::now();
        let mut listing = ViolationListing::new("Test", now);
        listing.entries.push(ViolationListingRow {
            violation_code: "VL20260801EXPRT002".to_string(),
            license_plate: "51A-123.45".to_string(),
            violation_type: "other".to_string(),
            location: "Nguyen Hue, \"District 1\"".to_string(),
            violation_time: now.to_rfc3339(),
            fine_amount: "0".to_string(),
            status: "pending".to_string(),
            source: "report".to_string(),
            processed_at: String::new(),
        });

        let exporter = CsvExporter::new();
        let output = exporter.export(&listing);

        // Should escape the location
        assert!(output.contains("\"Nguyen Hue, \"\"District 1\"\"\""));
    }

    #[test]
    fn test_json_exporter() {
        let listing = sample_listing();
        let exporter = JsonExporter::new();
        let output = exporter.export(&listing);

        assert!(output.contains("\"title\": \"Violation Export\""));
        assert!(output.contains("\"VL20260801EXPRT000\""));
        assert_eq!(exporter.extension(), "json");
    }

    #[test]
    fn test_json_compact() {
        let listing = sample_listing();
        let exporter = JsonExporter::new().compact();
        let output = exporter.export(&listing);

        // Compact JSON should not have indentation
        assert!(!output.contains("  "));
    }

    #[test]
    fn test_markdown_exporter() {
        let listing = sample_listing();
        let exporter = MarkdownExporter::new();
        let output = exporter.export(&listing);

        assert!(output.contains("# Violation Export"));
        assert!(output.contains("## Summary"));
        assert!(output.contains("## Data"));
        assert!(output.contains("| Code | License Plate | Type |"));
        assert!(output.contains("| --- | --- | --- |"));
        assert!(output.contains("| VL20260801EXPRT000 |"));
        assert_eq!(exporter.extension(), "md");
    }

    #[test]
    fn test_markdown_with_toc() {
        let listing = sample_listing();
        let exporter = MarkdownExporter::new().with_toc();
        let output = exporter.export(&listing);

        assert!(output.contains("## Table of Contents"));
        assert!(output.contains("- [Summary](#summary)"));
        assert!(output.contains("- [Data](#data)"));
    }
}
