//! Business layer errors
//!
//! Uses anyhow for error aggregation with custom error types. The domain
//! taxonomy (Forbidden, NotFound, InvalidTransition, ...) lives in
//! `phatnguoi_core::CoreError` and is surfaced untranslated; this enum adds
//! the admin-surface conflicts and wraps infrastructure errors.

use thiserror::Error;

/// Business operation errors
#[derive(Debug, Error)]
pub enum BusinessError {
    // === Uniqueness conflicts (admin surface) ===
    #[error("Username already exists: {0}")]
    UsernameTaken(String),

    #[error("Email already exists: {0}")]
    EmailTaken(String),

    #[error("Camera code already exists: {0}")]
    CameraCodeTaken(String),

    // === Wrapped errors ===
    #[error("Persistence error: {0}")]
    Persistence(#[from] phatnguoi_persistence::PersistenceError),

    #[error("Core error: {0}")]
    Core(#[from] phatnguoi_core::CoreError),
}

/// Result type alias for business operations
pub type BusinessResult<T> = anyhow::Result<T>;

impl BusinessError {
    /// Kiểm tra có phải lỗi trùng lặp không
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            BusinessError::UsernameTaken(_)
                | BusinessError::EmailTaken(_)
                | BusinessError::CameraCodeTaken(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_errors() {
        let err = BusinessError::UsernameTaken("nguyen.van.a".to_string());
        assert!(err.is_conflict());
        assert!(err.to_string().contains("nguyen.van.a"));

        let err = BusinessError::Core(phatnguoi_core::CoreError::not_found("User", 1));
        assert!(!err.is_conflict());
    }
}
