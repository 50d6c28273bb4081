//! User and camera management commands

use anyhow::Result;
use phatnguoi_business::{AdminService, AuthService, ServiceContext};
use phatnguoi_core::{Camera, CameraPatch, User, UserPatch};
use std::path::Path;

use crate::{db, CameraAction, UserAction};

/// Handle user subcommands
pub async fn handle_user(db_path: &Path, token: Option<&str>, action: UserAction) -> Result<()> {
    let pool = db::connect(db_path).await?;
    let ctx = ServiceContext::from_pool(pool);
    let identity = AuthService::new(&ctx).resolve(token).await?;
    let admin = AdminService::new(&ctx);

    match action {
        UserAction::List => {
            let users = admin.list_users(&identity, 0, 100).await?;
            print_user_table(&users);
        }

        UserAction::Officers => {
            let officers = admin.list_officers(&identity, 0, 100).await?;
            print_user_table(&officers);
        }

        UserAction::Create {
            username,
            email,
            name,
            role,
            phone,
            api_token,
            citizen_id,
            badge,
            department,
        } => {
            let mut user = User::new(&username, &email, &name, role.to_core());
            user.phone = phone;
            user.api_token = api_token;
            user.citizen_id = citizen_id;
            user.badge_number = badge;
            user.department = department;

            let created = admin.create_user(&identity, user).await?;
            println!("✅ Created {} user:", created.role);
            println!("   ID:       {}", created.id);
            println!("   Username: {}", created.username);
            println!("   Name:     {}", created.full_name);
        }

        UserAction::Update {
            user_id,
            name,
            phone,
            email,
            address,
            department,
        } => {
            let patch = UserPatch {
                full_name: name,
                phone,
                email,
                address,
                department,
            };
            let updated = admin.update_user(&identity, user_id, &patch).await?;
            println!("✅ Updated user {} ({})", updated.username, updated.id);
        }

        UserAction::Deactivate { user_id } => {
            admin.deactivate_user(&identity, user_id).await?;
            println!("✅ User {} deactivated", user_id);
        }
    }

    Ok(())
}

/// Handle camera subcommands
pub async fn handle_camera(db_path: &Path, token: Option<&str>, action: CameraAction) -> Result<()> {
    let pool = db::connect(db_path).await?;
    let ctx = ServiceContext::from_pool(pool);
    let identity = AuthService::new(&ctx).resolve(token).await?;
    let admin = AdminService::new(&ctx);

    match action {
        CameraAction::List {
            status,
            camera_type,
        } => {
            let cameras = admin
                .list_cameras(
                    &identity,
                    status.map(|s| s.to_core()),
                    camera_type.as_deref(),
                    0,
                    100,
                )
                .await?;
            print_camera_table(&cameras);
        }

        CameraAction::Show { camera_id } => {
            let camera = admin.get_camera(&identity, camera_id).await?;
            println!("📷 Camera {}", camera.camera_code);
            println!("   ID:       {}", camera.id);
            println!("   Name:     {}", camera.name);
            println!("   Location: {}", camera.location);
            println!("   Type:     {}", camera.camera_type);
            println!("   Status:   {}", camera.status);
            if let (Some(lat), Some(lon)) = (camera.latitude, camera.longitude) {
                println!("   Coords:   {}, {}", lat, lon);
            }
        }

        CameraAction::Create {
            code,
            name,
            location,
            camera_type,
            latitude,
            longitude,
            description,
        } => {
            let mut camera = Camera::new(&code, &name, &location, &camera_type);
            camera.latitude = latitude;
            camera.longitude = longitude;
            camera.description = description;

            let created = admin.create_camera(&identity, camera).await?;
            println!("✅ Created camera {} (id {})", created.camera_code, created.id);
        }

        CameraAction::SetStatus { camera_id, status } => {
            let patch = CameraPatch::new().with_status(status.to_core());
            let updated = admin.update_camera(&identity, camera_id, &patch).await?;
            println!("✅ Camera {} is now {}", updated.camera_code, updated.status);
        }

        CameraAction::Delete { camera_id } => {
            admin.delete_camera(&identity, camera_id).await?;
            println!("✅ Camera {} deleted (violations are kept)", camera_id);
        }
    }

    Ok(())
}

fn print_user_table(users: &[User]) {
    if users.is_empty() {
        println!("No users found.");
        return;
    }

    println!(
        "{:<6} {:<18} {:<24} {:<10} {:<8}",
        "ID", "USERNAME", "NAME", "ROLE", "ACTIVE"
    );
    println!("{}", "-".repeat(70));
    for user in users {
        println!(
            "{:<6} {:<18} {:<24} {:<10} {:<8}",
            user.id,
            user.username,
            user.full_name,
            user.role.as_str(),
            if user.is_active { "yes" } else { "no" }
        );
    }
}

fn print_camera_table(cameras: &[Camera]) {
    if cameras.is_empty() {
        println!("No cameras found.");
        return;
    }

    println!(
        "{:<6} {:<14} {:<24} {:<12} {:<12}",
        "ID", "CODE", "LOCATION", "TYPE", "STATUS"
    );
    println!("{}", "-".repeat(72));
    for camera in cameras {
        println!(
            "{:<6} {:<14} {:<24} {:<12} {:<12}",
            camera.id,
            camera.camera_code,
            camera.location,
            camera.camera_type,
            camera.status.as_str()
        );
    }
}
