//! Report commands

use anyhow::{Context, Result};
use phatnguoi_business::{AuthService, ReportService, ServiceContext};
use phatnguoi_reports::{
    CsvExporter, JsonExporter, MarkdownExporter, ReportData, ReportExporter,
};
use std::path::{Path, PathBuf};

use crate::{db, ReportFormat, ReportKind};

/// Handle report generation
pub async fn handle(
    db_path: &Path,
    token: Option<&str>,
    kind: ReportKind,
    days: i64,
    format: ReportFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let pool = db::connect(db_path).await?;
    let ctx = ServiceContext::from_pool(pool);
    let identity = AuthService::new(&ctx).resolve(token).await?;
    let reports = ReportService::new(&ctx);

    match kind {
        ReportKind::Statistics => {
            let stats = reports.statistics(&identity, days).await?;
            match format {
                ReportFormat::Json => {
                    write_output(serde_json::to_string_pretty(&stats)?, output)?
                }
                _ => write_output(stats.summary_text(), output)?,
            }
        }

        ReportKind::Dashboard => {
            let dashboard = reports.dashboard(&identity, days).await?;
            write_output(serde_json::to_string_pretty(&dashboard)?, output)?;
        }

        ReportKind::Performance => {
            let report = reports.officer_performance(&identity, days).await?;
            write_output(export(&report, format), output)?;
        }

        ReportKind::CameraEfficiency => {
            let report = reports.camera_efficiency(&identity, days).await?;
            write_output(export(&report, format), output)?;
        }

        ReportKind::Trends => {
            let report = reports.trends(&identity, days).await?;
            write_output(export(&report, format), output)?;
        }

        ReportKind::MyReports => {
            let stats = reports.citizen_report_statistics(&identity).await?;
            write_output(serde_json::to_string_pretty(&stats)?, output)?;
        }
    }

    Ok(())
}

fn export(report: &dyn ReportData, format: ReportFormat) -> String {
    match format {
        ReportFormat::Csv => CsvExporter::new().export(report),
        ReportFormat::Json => JsonExporter::new().export(report),
        ReportFormat::Markdown => MarkdownExporter::new().export(report),
    }
}

fn write_output(content: String, output: Option<PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(&path, content)
                .with_context(|| format!("Failed to write report to {:?}", path))?;
            println!("✅ Report written to {:?}", path);
        }
        None => println!("{}", content),
    }
    Ok(())
}
