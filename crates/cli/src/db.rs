//! Database initialization, seed data and status

use anyhow::{Context, Result};
use phatnguoi_core::{Camera, CameraStatus, Role, User};
use phatnguoi_persistence::{CameraRepo, UserRepo};
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize the database with schema
pub async fn init_database(db_path: &Path, force: bool) -> Result<()> {
    if force && db_path.exists() {
        std::fs::remove_file(db_path).context("Failed to remove existing database")?;
        println!("🗑️  Removed existing database");
    }

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create database directory")?;
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());
    let pool = phatnguoi_persistence::init_database(&db_url)
        .await
        .context("Failed to initialize database")?;

    println!("📦 Schema created at {:?}", db_path);
    pool.close().await;
    Ok(())
}

/// Seed demo users and cameras
pub async fn seed_demo_data(db_path: &Path) -> Result<()> {
    let pool = connect(db_path).await?;

    println!("🌱 Seeding demo data...");

    let users = vec![
        User::new("authority.hcm", "authority@gov.vn", "Sở GTVT TP.HCM", Role::Authority)
            .with_token("tok-authority"),
        User::new("officer.nguyen", "nguyen@csgt.gov.vn", "Nguyễn Văn Bình", Role::Officer)
            .with_token("tok-officer-1")
            .with_badge("CS-1001", "Đội CSGT số 1"),
        User::new("officer.tran", "tran@csgt.gov.vn", "Trần Thị Cúc", Role::Officer)
            .with_token("tok-officer-2")
            .with_badge("CS-1002", "Đội CSGT số 2"),
        User::new("citizen.le", "le@example.vn", "Lê Văn Dũng", Role::Citizen)
            .with_token("tok-citizen-1")
            .with_citizen_id("079012345678"),
        User::new("citizen.pham", "pham@example.vn", "Phạm Thị Em", Role::Citizen)
            .with_token("tok-citizen-2")
            .with_citizen_id("079087654321"),
    ];
    for user in &users {
        match UserRepo::insert(&pool, user).await {
            Ok(id) => println!("   ✅ User {} ({}) -> id {}", user.username, user.role, id),
            Err(e) if e.is_unique_violation() => {
                println!("   ⏭️  User {} already exists", user.username)
            }
            Err(e) => return Err(e.into()),
        }
    }

    let cameras = vec![
        Camera::new("CAM-NH-001", "Ngã tư Nguyễn Huệ", "Nguyễn Huệ x Lê Lợi", "red_light")
            .with_coordinates(10.7735, 106.7019),
        Camera::new("CAM-DBP-002", "Điện Biên Phủ", "Điện Biên Phủ x Đinh Tiên Hoàng", "speed")
            .with_coordinates(10.7905, 106.6996),
        Camera::new("CAM-THD-003", "Trần Hưng Đạo", "Trần Hưng Đạo x Nguyễn Văn Cừ", "general")
            .with_coordinates(10.7554, 106.6830)
            .with_status(CameraStatus::Maintenance),
    ];
    for camera in &cameras {
        match CameraRepo::insert(&pool, camera).await {
            Ok(id) => println!("   ✅ Camera {} -> id {}", camera.camera_code, id),
            Err(e) if e.is_unique_violation() => {
                println!("   ⏭️  Camera {} already exists", camera.camera_code)
            }
            Err(e) => return Err(e.into()),
        }
    }

    println!();
    println!("Tokens: tok-authority, tok-officer-1, tok-officer-2, tok-citizen-1, tok-citizen-2");

    pool.close().await;
    Ok(())
}

/// Show database status
pub async fn show_status(db_path: &Path) -> Result<()> {
    if !db_path.exists() {
        println!("❌ Database not found at {:?}", db_path);
        println!("   Run 'phatnguoi init' to create the database");
        return Ok(());
    }

    let pool = connect(db_path).await?;

    println!("📊 Database Status");
    println!("   Path: {:?}", db_path);
    println!();

    let user_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await
        .unwrap_or((0,));

    let camera_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cameras")
        .fetch_one(&pool)
        .await
        .unwrap_or((0,));

    let violation_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM violations")
        .fetch_one(&pool)
        .await
        .unwrap_or((0,));

    let pending_count: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM violations WHERE status = 'pending'")
            .fetch_one(&pool)
            .await
            .unwrap_or((0,));

    println!("   Users:      {}", user_count.0);
    println!("   Cameras:    {}", camera_count.0);
    println!("   Violations: {} ({} pending)", violation_count.0, pending_count.0);

    pool.close().await;
    Ok(())
}

/// Connect to database pool
pub async fn connect(db_path: &Path) -> Result<SqlitePool> {
    let db_url = format!("sqlite:{}", db_path.display());
    SqlitePool::connect(&db_url)
        .await
        .context("Failed to connect to database. Run 'phatnguoi init' first.")
}
