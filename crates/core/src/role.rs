//! # Role Module
//!
//! Định nghĩa Role và Identity cho các vai trò trong hệ thống.
//! - Citizen: Người dân gửi báo cáo vi phạm, xem báo cáo của mình
//! - Officer: Cán bộ xử lý các vi phạm đang chờ
//! - Authority: Cơ quan quản lý với toàn quyền

use crate::violation::Violation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Vai trò người dùng trong hệ thống.
///
/// Mỗi vai trò có quyền hạn khác nhau:
/// - Citizen: Gửi/xem báo cáo của chính mình, tra cứu công khai
/// - Officer: Xem và xử lý mọi vi phạm
/// - Authority: Toàn quyền, quản lý users và cameras
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Người dân - gửi báo cáo, xem báo cáo của mình
    Citizen,
    /// Cán bộ - xử lý vi phạm đang chờ
    Officer,
    /// Cơ quan quản lý - full access
    Authority,
}

impl Role {
    /// Trả về code string cho DB
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Citizen => "citizen",
            Role::Officer => "officer",
            Role::Authority => "authority",
        }
    }

    /// Parse từ string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "citizen" => Some(Role::Citizen),
            "officer" => Some(Role::Officer),
            "authority" => Some(Role::Authority),
            _ => None,
        }
    }

    /// Kiểm tra có quyền xem và xử lý mọi vi phạm không
    pub fn can_review(&self) -> bool {
        matches!(self, Role::Officer | Role::Authority)
    }

    /// Kiểm tra có quyền quản lý users/cameras không
    pub fn can_manage(&self) -> bool {
        matches!(self, Role::Authority)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Danh tính đã xác thực của người thực hiện thao tác.
///
/// Chỉ được tạo bởi identity collaborator sau khi resolve credential;
/// các phép kiểm tra quyền là pure functions trên Identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    /// ID của user trong hệ thống
    pub user_id: i64,
    /// Vai trò (bất biến sau khi tạo user)
    pub role: Role,
    /// Tài khoản còn hoạt động không
    pub active: bool,
}

impl Identity {
    pub fn new(user_id: i64, role: Role, active: bool) -> Self {
        Self {
            user_id,
            role,
            active,
        }
    }

    /// Kiểm tra identity có phải người gửi báo cáo của violation không
    pub fn is_owner(&self, violation: &Violation) -> bool {
        violation.reported_by == Some(self.user_id)
    }

    /// Kiểm tra có quyền review không
    pub fn can_review(&self) -> bool {
        self.role.can_review()
    }

    /// Kiểm tra có quyền quản lý không
    pub fn can_manage(&self) -> bool {
        self.role.can_manage()
    }
}
