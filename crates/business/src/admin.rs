//! Admin operations - user and camera management
//!
//! AdminService covers the authority-only management surface. Camera listing
//! is additionally available to officers (review surface).

use crate::error::{BusinessError, BusinessResult};
use crate::services::ServiceContext;
use phatnguoi_core::{
    authorize, Action, Camera, CameraPatch, CameraStatus, CoreError, Identity, Role, User,
    UserPatch,
};
use phatnguoi_persistence::{CameraRepo, UserRepo};

/// Admin Service - user/camera management for the authority role
pub struct AdminService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AdminService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    // === Users ===

    /// Create a user. Username and email must be unique.
    pub async fn create_user(&self, identity: &Identity, user: User) -> BusinessResult<User> {
        authorize(identity, Action::ManageUsers)?;

        if UserRepo::get_by_username(self.ctx.pool(), &user.username)
            .await?
            .is_some()
        {
            return Err(BusinessError::UsernameTaken(user.username).into());
        }
        if UserRepo::get_by_email(self.ctx.pool(), &user.email)
            .await?
            .is_some()
        {
            return Err(BusinessError::EmailTaken(user.email).into());
        }

        let id = UserRepo::insert(self.ctx.pool(), &user).await?;
        tracing::info!(user_id = id, role = %user.role, "user created");

        let mut created = user;
        created.id = id;
        Ok(created)
    }

    /// List users, newest first
    pub async fn list_users(
        &self,
        identity: &Identity,
        skip: i64,
        limit: i64,
    ) -> BusinessResult<Vec<User>> {
        authorize(identity, Action::ManageUsers)?;

        let rows = UserRepo::list(self.ctx.pool(), skip, limit).await?;
        rows.into_iter()
            .map(|row| User::try_from(row).map_err(Into::into))
            .collect()
    }

    /// List officers
    pub async fn list_officers(
        &self,
        identity: &Identity,
        skip: i64,
        limit: i64,
    ) -> BusinessResult<Vec<User>> {
        authorize(identity, Action::ManageUsers)?;

        let rows = UserRepo::list_by_role(self.ctx.pool(), Role::Officer, skip, limit).await?;
        rows.into_iter()
            .map(|row| User::try_from(row).map_err(Into::into))
            .collect()
    }

    /// Update a user profile. The patch carries no role field: roles are
    /// immutable after creation.
    pub async fn update_user(
        &self,
        identity: &Identity,
        user_id: i64,
        patch: &UserPatch,
    ) -> BusinessResult<User> {
        authorize(identity, Action::ManageUsers)?;

        if patch.is_empty() {
            return Err(CoreError::ValidationError("no fields to update".to_string()).into());
        }

        UserRepo::update_profile(self.ctx.pool(), user_id, patch)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    anyhow::Error::new(CoreError::not_found("User", user_id))
                } else {
                    anyhow::Error::new(e)
                }
            })?;

        let row = UserRepo::get_by_id(self.ctx.pool(), user_id).await?;
        Ok(User::try_from(row)?)
    }

    /// Deactivate a user (soft delete)
    pub async fn deactivate_user(&self, identity: &Identity, user_id: i64) -> BusinessResult<()> {
        authorize(identity, Action::ManageUsers)?;

        UserRepo::set_active(self.ctx.pool(), user_id, false)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    anyhow::Error::new(CoreError::not_found("User", user_id))
                } else {
                    anyhow::Error::new(e)
                }
            })?;
        tracing::info!(user_id, "user deactivated");
        Ok(())
    }

    // === Cameras ===

    /// Create a camera. camera_code must be unique.
    pub async fn create_camera(
        &self,
        identity: &Identity,
        camera: Camera,
    ) -> BusinessResult<Camera> {
        authorize(identity, Action::ManageCameras)?;

        if CameraRepo::get_by_code(self.ctx.pool(), &camera.camera_code)
            .await?
            .is_some()
        {
            return Err(BusinessError::CameraCodeTaken(camera.camera_code).into());
        }

        let id = CameraRepo::insert(self.ctx.pool(), &camera).await?;
        tracing::info!(camera_id = id, code = %camera.camera_code, "camera created");

        let mut created = camera;
        created.id = id;
        Ok(created)
    }

    /// List cameras with optional filters (review surface)
    pub async fn list_cameras(
        &self,
        identity: &Identity,
        status: Option<CameraStatus>,
        camera_type: Option<&str>,
        skip: i64,
        limit: i64,
    ) -> BusinessResult<Vec<Camera>> {
        authorize(identity, Action::ViewCameras)?;

        let rows = CameraRepo::list(self.ctx.pool(), status, camera_type, skip, limit).await?;
        rows.into_iter()
            .map(|row| Camera::try_from(row).map_err(Into::into))
            .collect()
    }

    /// Get one camera (review surface)
    pub async fn get_camera(&self, identity: &Identity, camera_id: i64) -> BusinessResult<Camera> {
        authorize(identity, Action::ViewCameras)?;

        let row = CameraRepo::get_by_id(self.ctx.pool(), camera_id)
            .await
            .map_err(|_| CoreError::not_found("Camera", camera_id))?;
        Ok(Camera::try_from(row)?)
    }

    /// Update a camera
    pub async fn update_camera(
        &self,
        identity: &Identity,
        camera_id: i64,
        patch: &CameraPatch,
    ) -> BusinessResult<Camera> {
        authorize(identity, Action::ManageCameras)?;

        if patch.is_empty() {
            return Err(CoreError::ValidationError("no fields to update".to_string()).into());
        }

        CameraRepo::update(self.ctx.pool(), camera_id, patch)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    anyhow::Error::new(CoreError::not_found("Camera", camera_id))
                } else {
                    anyhow::Error::new(e)
                }
            })?;

        let row = CameraRepo::get_by_id(self.ctx.pool(), camera_id).await?;
        Ok(Camera::try_from(row)?)
    }

    /// Delete a camera. Violations referencing it are kept (no cascade).
    pub async fn delete_camera(&self, identity: &Identity, camera_id: i64) -> BusinessResult<()> {
        authorize(identity, Action::ManageCameras)?;

        CameraRepo::delete(self.ctx.pool(), camera_id)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    anyhow::Error::new(CoreError::not_found("Camera", camera_id))
                } else {
                    anyhow::Error::new(e)
                }
            })?;
        tracing::info!(camera_id, "camera deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phatnguoi_persistence::run_migrations;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_ctx() -> (ServiceContext, Identity, Identity) {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool");
        run_migrations(&pool).await.expect("migrations");

        let authority = Identity::new(1, Role::Authority, true);
        let officer = Identity::new(2, Role::Officer, true);
        (ServiceContext::from_pool(pool), authority, officer)
    }

    #[tokio::test]
    async fn test_only_authority_manages_users() {
        let (ctx, authority, officer) = test_ctx().await;
        let admin = AdminService::new(&ctx);

        let user = User::new("citizen.x", "x@example.vn", "Citizen X", Role::Citizen);
        let err = admin.create_user(&officer, user.clone()).await.unwrap_err();
        assert!(err.downcast_ref::<CoreError>().unwrap().is_forbidden());

        let created = admin.create_user(&authority, user).await.unwrap();
        assert!(created.id > 0);
    }

    #[tokio::test]
    async fn test_duplicate_username_and_email() {
        let (ctx, authority, _) = test_ctx().await;
        let admin = AdminService::new(&ctx);

        let user = User::new("citizen.x", "x@example.vn", "Citizen X", Role::Citizen);
        admin.create_user(&authority, user).await.unwrap();

        let dup_username = User::new("citizen.x", "y@example.vn", "Other", Role::Citizen);
        let err = admin.create_user(&authority, dup_username).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BusinessError>().unwrap(),
            BusinessError::UsernameTaken(_)
        ));

        let dup_email = User::new("citizen.y", "x@example.vn", "Other", Role::Citizen);
        let err = admin.create_user(&authority, dup_email).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BusinessError>().unwrap(),
            BusinessError::EmailTaken(_)
        ));
    }

    #[tokio::test]
    async fn test_update_and_deactivate_user() {
        let (ctx, authority, _) = test_ctx().await;
        let admin = AdminService::new(&ctx);

        let created = admin
            .create_user(
                &authority,
                User::new("citizen.x", "x@example.vn", "Citizen X", Role::Citizen),
            )
            .await
            .unwrap();

        let patch = UserPatch {
            full_name: Some("Citizen X Renamed".to_string()),
            ..Default::default()
        };
        let updated = admin.update_user(&authority, created.id, &patch).await.unwrap();
        assert_eq!(updated.full_name, "Citizen X Renamed");
        assert_eq!(updated.role, Role::Citizen);

        admin.deactivate_user(&authority, created.id).await.unwrap();
        let users = admin.list_users(&authority, 0, 10).await.unwrap();
        assert!(!users[0].is_active);

        let err = admin.deactivate_user(&authority, 9999).await.unwrap_err();
        assert!(err.downcast_ref::<CoreError>().unwrap().is_not_found());
    }

    #[tokio::test]
    async fn test_camera_management() {
        let (ctx, authority, officer) = test_ctx().await;
        let admin = AdminService::new(&ctx);

        let camera = Camera::new("CAM-001", "Cam 1", "Nguyen Hue", "speed");
        let err = admin.create_camera(&officer, camera.clone()).await.unwrap_err();
        assert!(err.downcast_ref::<CoreError>().unwrap().is_forbidden());

        let created = admin.create_camera(&authority, camera).await.unwrap();

        // Duplicate code
        let dup = Camera::new("CAM-001", "Cam 1 bis", "Le Loi", "speed");
        let err = admin.create_camera(&authority, dup).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BusinessError>().unwrap(),
            BusinessError::CameraCodeTaken(_)
        ));

        // Officers can list but not mutate
        let listed = admin.list_cameras(&officer, None, None, 0, 10).await.unwrap();
        assert_eq!(listed.len(), 1);

        let patch = CameraPatch::new().with_status(CameraStatus::Maintenance);
        let err = admin
            .update_camera(&officer, created.id, &patch)
            .await
            .unwrap_err();
        assert!(err.downcast_ref::<CoreError>().unwrap().is_forbidden());

        let updated = admin
            .update_camera(&authority, created.id, &patch)
            .await
            .unwrap();
        assert_eq!(updated.status, CameraStatus::Maintenance);

        admin.delete_camera(&authority, created.id).await.unwrap();
        let listed = admin.list_cameras(&authority, None, None, 0, 10).await.unwrap();
        assert!(listed.is_empty());
    }
}
