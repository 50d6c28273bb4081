//! # Error Module
//!
//! Định nghĩa các domain errors cho Phat Nguoi sử dụng thiserror.

use thiserror::Error;

/// Core domain errors.
///
/// Các lỗi nghiệp vụ cốt lõi, không liên quan đến infrastructure.
#[derive(Debug, Error)]
pub enum CoreError {
    // === Identity errors ===
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Account is inactive: user {0}")]
    InactiveAccount(i64),

    // === Permission errors ===
    #[error("Forbidden: {role} may not {operation}")]
    Forbidden { role: String, operation: String },

    // === Not found errors ===
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    // === Violation lifecycle errors ===
    #[error("Invalid provenance: {0}")]
    InvalidProvenance(String),

    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Duplicate violation code: {0}")]
    DuplicateCode(String),

    // === Validation errors ===
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Result type alias với CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Tạo Forbidden error
    pub fn forbidden(role: &str, operation: &str) -> Self {
        Self::Forbidden {
            role: role.to_string(),
            operation: operation.to_string(),
        }
    }

    /// Tạo NotFound error
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    /// Tạo InvalidTransition error
    pub fn invalid_transition(from: &str, to: &str) -> Self {
        Self::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Kiểm tra có phải lỗi permission không
    pub fn is_forbidden(&self) -> bool {
        matches!(self, CoreError::Forbidden { .. })
    }

    /// Kiểm tra có phải lỗi not found không
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::NotFound { .. })
    }

    /// Kiểm tra có phải lỗi transition không
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, CoreError::InvalidTransition { .. })
    }
}
