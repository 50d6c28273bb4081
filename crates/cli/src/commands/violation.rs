//! Violation commands

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use phatnguoi_business::{AuthService, BulkAction, ServiceContext, ViolationService};
use phatnguoi_core::{CameraViolationInput, ReportInput, Violation, ViolationPatch};
use phatnguoi_persistence::ViolationFilter;
use std::path::Path;

use crate::{db, BulkActionArg, ViolationAction};

/// Handle violation subcommands
pub async fn handle(db_path: &Path, token: Option<&str>, action: ViolationAction) -> Result<()> {
    let pool = db::connect(db_path).await?;
    let ctx = ServiceContext::from_pool(pool);
    let identity = AuthService::new(&ctx).resolve(token).await?;
    let service = ViolationService::new(&ctx);

    match action {
        ViolationAction::List {
            status,
            plate,
            violation_type,
            from,
            to,
            skip,
            limit,
        } => {
            let mut filter = ViolationFilter::new();
            filter.status = status.map(|s| s.to_core());
            filter.license_plate = plate;
            filter.violation_type = violation_type;
            filter.date_from = from.as_deref().map(parse_datetime).transpose()?;
            filter.date_to = to.as_deref().map(parse_datetime).transpose()?;

            let violations = service.list(&identity, &filter, skip, limit).await?;
            print_violation_table(&violations);
        }

        ViolationAction::Show { violation_id } => {
            let v = service.get(&identity, violation_id).await?;
            print_violation_detail(&v);
        }

        ViolationAction::Create {
            plate,
            violation_type,
            location,
            camera_id,
            fine,
            time,
            description,
            image_url,
            video_url,
        } => {
            let input = CameraViolationInput {
                license_plate: plate,
                violation_type,
                description,
                location,
                violation_time: time.as_deref().map(parse_datetime).transpose()?.unwrap_or_else(Utc::now),
                fine_amount: fine,
                camera_id,
                image_url,
                video_url,
            };
            let v = service.create_from_camera(&identity, input).await?;
            println!("✅ Created violation {} (id {})", v.violation_code, v.id);
        }

        ViolationAction::Report {
            plate,
            violation_type,
            location,
            time,
            description,
            evidence,
        } => {
            let input = ReportInput {
                license_plate: plate,
                violation_type,
                description,
                location,
                violation_time: time.as_deref().map(parse_datetime).transpose()?.unwrap_or_else(Utc::now),
                evidence_urls: evidence.unwrap_or_default(),
            };
            let v = service.report(&identity, input).await?;
            println!("✅ Report filed: {} (id {})", v.violation_code, v.id);
            println!("   The fine will be set by the authority after review.");
        }

        ViolationAction::Process {
            violation_id,
            decision,
            notes,
            fine,
        } => {
            let mut patch = ViolationPatch::new();
            patch.status = decision.map(|d| d.to_core());
            patch.processing_notes = notes;
            patch.fine_amount = fine;

            let v = service.process(&identity, violation_id, patch).await?;
            println!("✅ Violation {} is now {}", v.violation_code, v.status);
        }

        ViolationAction::Pay { violation_id } => {
            let v = service.mark_paid(&identity, violation_id).await?;
            println!("✅ Violation {} marked as paid", v.violation_code);
        }

        ViolationAction::Appeal { violation_id } => {
            let v = service.appeal(&identity, violation_id).await?;
            println!("✅ Appeal recorded for {}", v.violation_code);
        }

        ViolationAction::QuickProcess {
            violation_ids,
            action,
            notes,
        } => {
            if violation_ids.is_empty() {
                bail!("no violation ids given");
            }
            let bulk_action = match action {
                BulkActionArg::Approve => BulkAction::Approve,
                BulkActionArg::Reject => BulkAction::Reject,
            };
            let outcome = service
                .quick_process(&identity, &violation_ids, bulk_action, notes.as_deref())
                .await?;

            println!(
                "Processed {} violations ({} failed)",
                outcome.processed_violations.len(),
                outcome.failed_violations.len()
            );
            for id in &outcome.processed_violations {
                println!("   ✅ {}", id);
            }
            for failure in &outcome.failed_violations {
                println!("   ❌ {}: {}", failure.violation_id, failure.error);
            }
        }

        ViolationAction::Mine { status, skip, limit } => {
            let violations = service
                .my_violations(&identity, status.map(|s| s.to_core()), skip, limit)
                .await?;
            print_violation_table(&violations);
        }
    }

    Ok(())
}

/// Public lookup - no identity required
pub async fn lookup(db_path: &Path, plate: Option<&str>, code: Option<&str>) -> Result<()> {
    let pool = db::connect(db_path).await?;
    let ctx = ServiceContext::from_pool(pool);
    let service = ViolationService::new(&ctx);

    let violations = service.lookup(plate, code).await?;
    if violations.is_empty() {
        println!("No violations found.");
        return Ok(());
    }
    print_violation_table(&violations);
    Ok(())
}

/// Parse RFC3339 or plain YYYY-MM-DD (midnight UTC)
fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("cannot parse '{}' as RFC3339 or YYYY-MM-DD", s))?;
    Ok(date.and_time(NaiveTime::MIN).and_utc())
}

fn print_violation_table(violations: &[Violation]) {
    if violations.is_empty() {
        println!("No violations found.");
        return;
    }

    println!(
        "{:<6} {:<20} {:<14} {:<14} {:<10} {:<10} {:>12}",
        "ID", "CODE", "PLATE", "TYPE", "STATUS", "SOURCE", "FINE"
    );
    println!("{}", "-".repeat(92));
    for v in violations {
        println!(
            "{:<6} {:<20} {:<14} {:<14} {:<10} {:<10} {:>12}",
            v.id,
            v.violation_code,
            v.license_plate,
            v.violation_type,
            v.status.as_str(),
            v.source.as_str(),
            v.fine_amount.to_string()
        );
    }
}

fn print_violation_detail(v: &Violation) {
    println!("📋 Violation {}", v.violation_code);
    println!("   ID:         {}", v.id);
    println!("   Plate:      {}", v.license_plate);
    println!("   Type:       {}", v.violation_type);
    println!("   Location:   {}", v.location);
    println!("   Time:       {}", v.violation_time.to_rfc3339());
    println!("   Fine:       {}", v.fine_amount);
    println!("   Status:     {}", v.status);
    println!("   Source:     {}", v.source);
    if let Some(camera_id) = v.camera_id {
        println!("   Camera:     {}", camera_id);
    }
    if let Some(reported_by) = v.reported_by {
        println!("   Reporter:   {}", reported_by);
    }
    if !v.evidence_urls.is_empty() {
        println!("   Evidence:");
        for url in &v.evidence_urls {
            println!("     - {}", url);
        }
    }
    if let Some(processed_by) = v.processed_by {
        println!("   Processed:  by {} at {}",
            processed_by,
            v.processed_at.map(|t| t.to_rfc3339()).unwrap_or_default()
        );
    }
    if let Some(ref notes) = v.processing_notes {
        println!("   Notes:      {}", notes);
    }
}
