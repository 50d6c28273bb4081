//! Identity resolution
//!
//! AuthService resolves an opaque credential into an authenticated Identity.
//! Token mechanics (issuing, expiry, hashing) are out of scope; the credential
//! is looked up as a unique field on the user row.

use crate::error::BusinessResult;
use crate::services::ServiceContext;
use phatnguoi_core::{CoreError, Identity};
use phatnguoi_persistence::UserRepo;

/// Auth Service - resolves credentials into identities
pub struct AuthService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuthService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Resolve a token into an Identity.
    ///
    /// Missing or unknown token fails with Unauthenticated; a resolved but
    /// deactivated account fails with InactiveAccount.
    pub async fn resolve(&self, token: Option<&str>) -> BusinessResult<Identity> {
        let token = match token {
            Some(t) if !t.is_empty() => t,
            _ => {
                return Err(CoreError::Unauthenticated("missing credential".to_string()).into());
            }
        };

        let row = UserRepo::get_by_token(self.ctx.pool(), token)
            .await?
            .ok_or_else(|| CoreError::Unauthenticated("invalid credential".to_string()))?;

        if !row.is_active {
            return Err(CoreError::InactiveAccount(row.id).into());
        }

        let role = phatnguoi_core::Role::from_str(&row.role)
            .ok_or_else(|| CoreError::ValidationError(format!("unknown role: {}", row.role)))?;

        Ok(Identity::new(row.id, role, row.is_active))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phatnguoi_core::{Role, User};
    use phatnguoi_persistence::run_migrations;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_ctx() -> ServiceContext {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool");
        run_migrations(&pool).await.expect("migrations");
        ServiceContext::from_pool(pool)
    }

    #[tokio::test]
    async fn test_resolve_missing_token() {
        let ctx = test_ctx().await;
        let auth = AuthService::new(&ctx);

        let err = auth.resolve(None).await.unwrap_err();
        let core = err.downcast_ref::<CoreError>().unwrap();
        assert!(matches!(core, CoreError::Unauthenticated(_)));

        let err = auth.resolve(Some("")).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>().unwrap(),
            CoreError::Unauthenticated(_)
        ));
    }

    #[tokio::test]
    async fn test_resolve_unknown_token() {
        let ctx = test_ctx().await;
        let auth = AuthService::new(&ctx);

        let err = auth.resolve(Some("no-such-token")).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>().unwrap(),
            CoreError::Unauthenticated(_)
        ));
    }

    #[tokio::test]
    async fn test_resolve_inactive_account() {
        let ctx = test_ctx().await;
        let user = User::new("inactive", "inactive@example.vn", "Inactive", Role::Citizen)
            .with_token("tok-inactive");
        let id = UserRepo::insert(ctx.pool(), &user).await.unwrap();
        UserRepo::set_active(ctx.pool(), id, false).await.unwrap();

        let auth = AuthService::new(&ctx);
        let err = auth.resolve(Some("tok-inactive")).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>().unwrap(),
            CoreError::InactiveAccount(_)
        ));
    }

    #[tokio::test]
    async fn test_resolve_active_officer() {
        let ctx = test_ctx().await;
        let user = User::new("officer", "officer@csgt.gov.vn", "Officer", Role::Officer)
            .with_token("tok-officer");
        let id = UserRepo::insert(ctx.pool(), &user).await.unwrap();

        let auth = AuthService::new(&ctx);
        let identity = auth.resolve(Some("tok-officer")).await.unwrap();

        assert_eq!(identity.user_id, id);
        assert_eq!(identity.role, Role::Officer);
        assert!(identity.can_review());
    }
}
