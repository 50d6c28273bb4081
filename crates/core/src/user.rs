//! # User Module
//!
//! Thông tin người dùng và patch cập nhật hồ sơ.

use crate::role::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Người dùng trong hệ thống.
///
/// Role bất biến sau khi tạo: không có thao tác nào đổi role (kể cả patch).
/// Các trường citizen_id/badge_number/department là metadata tham khảo,
/// không tham gia vào policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Surrogate key (0 khi chưa persist)
    pub id: i64,
    /// Tên đăng nhập, duy nhất
    pub username: String,
    /// Email, duy nhất
    pub email: String,
    /// Họ tên đầy đủ
    pub full_name: String,
    /// Số điện thoại
    pub phone: Option<String>,
    /// Vai trò
    pub role: Role,
    /// Tài khoản còn hoạt động không
    pub is_active: bool,
    /// Credential tra cứu khi resolve identity
    pub api_token: Option<String>,
    /// Số CCCD/CMND (citizen)
    pub citizen_id: Option<String>,
    /// Địa chỉ (citizen)
    pub address: Option<String>,
    /// Số hiệu cán bộ (officer)
    pub badge_number: Option<String>,
    /// Đơn vị công tác (officer)
    pub department: Option<String>,
    /// Thời gian tạo
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Tạo user mới
    pub fn new(username: &str, email: &str, full_name: &str, role: Role) -> Self {
        Self {
            id: 0,
            username: username.to_string(),
            email: email.to_string(),
            full_name: full_name.to_string(),
            phone: None,
            role,
            is_active: true,
            api_token: None,
            citizen_id: None,
            address: None,
            badge_number: None,
            department: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_token(mut self, token: &str) -> Self {
        self.api_token = Some(token.to_string());
        self
    }

    pub fn with_phone(mut self, phone: &str) -> Self {
        self.phone = Some(phone.to_string());
        self
    }

    pub fn with_citizen_id(mut self, citizen_id: &str) -> Self {
        self.citizen_id = Some(citizen_id.to_string());
        self
    }

    pub fn with_badge(mut self, badge_number: &str, department: &str) -> Self {
        self.badge_number = Some(badge_number.to_string());
        self.department = Some(department.to_string());
        self
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} - {})", self.full_name, self.username, self.role)
    }
}

/// Partial update cho hồ sơ user. Không có trường role.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub department: Option<String>,
}

impl UserPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.phone.is_none()
            && self.email.is_none()
            && self.address.is_none()
            && self.department.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_creation() {
        let user = User::new("nguyen.van.a", "a@example.vn", "Nguyễn Văn A", Role::Citizen)
            .with_token("tok-citizen-a")
            .with_citizen_id("079012345678");

        assert_eq!(user.role, Role::Citizen);
        assert!(user.is_active);
        assert_eq!(user.api_token.as_deref(), Some("tok-citizen-a"));
        assert_eq!(user.citizen_id.as_deref(), Some("079012345678"));
    }

    #[test]
    fn test_officer_metadata() {
        let officer = User::new("tran.b", "b@csgt.gov.vn", "Trần B", Role::Officer)
            .with_badge("CS-1234", "Đội CSGT số 1");

        assert_eq!(officer.badge_number.as_deref(), Some("CS-1234"));
        assert_eq!(officer.department.as_deref(), Some("Đội CSGT số 1"));
    }

    #[test]
    fn test_user_display() {
        let user = User::new("nguyen.van.a", "a@example.vn", "Nguyễn Văn A", Role::Citizen);
        assert_eq!(format!("{}", user), "Nguyễn Văn A (nguyen.van.a - citizen)");
    }

    #[test]
    fn test_patch_empty() {
        assert!(UserPatch::new().is_empty());
        let patch = UserPatch {
            phone: Some("0900000000".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
