//! # Policy Module
//!
//! Bảng phân quyền tường minh: (role, action) -> allow/deny.
//! Mặc định là deny; mọi action không được cấp rõ ràng đều bị từ chối.
//! Kiểm tra ownership so sánh với identity đã resolve, không bao giờ với
//! id do client gửi lên.

use crate::error::{CoreError, CoreResult};
use crate::role::{Identity, Role};
use crate::violation::Violation;
use std::fmt;

/// Các thao tác được bảo vệ bởi policy engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Liệt kê/xem báo cáo của chính mình
    ReadOwnReports,
    /// Xem bất kỳ violation nào
    ReadAnyViolation,
    /// Tạo violation từ camera
    CreateCameraViolation,
    /// Gửi báo cáo vi phạm (người dân)
    ReportViolation,
    /// Xử lý/từ chối violation đang chờ
    ProcessViolation,
    /// Quản lý users
    ManageUsers,
    /// Quản lý cameras
    ManageCameras,
    /// Xem danh sách cameras
    ViewCameras,
    /// Xem thống kê violations
    ViewStatistics,
    /// Xem báo cáo hiệu suất của mọi cán bộ
    ViewAllPerformance,
    /// Xem báo cáo hiệu suất của chính mình
    ViewOwnPerformance,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::ReadOwnReports => "read own reports",
            Action::ReadAnyViolation => "read any violation",
            Action::CreateCameraViolation => "create camera violation",
            Action::ReportViolation => "report violation",
            Action::ProcessViolation => "process violation",
            Action::ManageUsers => "manage users",
            Action::ManageCameras => "manage cameras",
            Action::ViewCameras => "view cameras",
            Action::ViewStatistics => "view statistics",
            Action::ViewAllPerformance => "view all performance reports",
            Action::ViewOwnPerformance => "view own performance report",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Bảng cấp quyền. Pure function, không side effect.
fn is_granted(role: Role, action: Action) -> bool {
    use Action::*;
    match action {
        ReadOwnReports => true,
        ReadAnyViolation => role.can_review(),
        CreateCameraViolation => role.can_review(),
        ReportViolation => role == Role::Citizen,
        ProcessViolation => role.can_review(),
        ManageUsers => role.can_manage(),
        ManageCameras => role.can_manage(),
        ViewCameras => role.can_review(),
        ViewStatistics => role.can_review(),
        ViewAllPerformance => role == Role::Authority,
        ViewOwnPerformance => role.can_review(),
    }
}

/// Cấp quyền cho action, trả về Forbidden khi bảng không cho phép.
pub fn authorize(identity: &Identity, action: Action) -> CoreResult<()> {
    if is_granted(identity.role, action) {
        Ok(())
    } else {
        Err(CoreError::forbidden(identity.role.as_str(), action.as_str()))
    }
}

/// Cấp quyền đọc một violation cụ thể.
///
/// Officer/authority đọc mọi record; citizen chỉ đọc báo cáo do chính mình
/// gửi. Caller phải fetch record trước khi gọi: record không tồn tại trả về
/// NotFound trước khi policy được đánh giá.
pub fn authorize_read(identity: &Identity, violation: &Violation) -> CoreResult<()> {
    if identity.can_review() || identity.is_owner(violation) {
        Ok(())
    } else {
        Err(CoreError::forbidden(
            identity.role.as_str(),
            Action::ReadAnyViolation.as_str(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::violation::{ReportInput, Violation};
    use chrono::Utc;

    fn identity(role: Role) -> Identity {
        Identity::new(10, role, true)
    }

    fn report_by(user_id: i64) -> Violation {
        Violation::new_report(
            ReportInput {
                license_plate: "51A-123.45".to_string(),
                violation_type: "red_light".to_string(),
                description: None,
                location: "Nguyen Hue".to_string(),
                violation_time: Utc::now(),
                evidence_urls: vec![],
            },
            user_id,
            "VL20260801POLICY01".to_string(),
            Utc::now(),
        )
    }

    #[test]
    fn test_citizen_grants() {
        let citizen = identity(Role::Citizen);

        assert!(authorize(&citizen, Action::ReadOwnReports).is_ok());
        assert!(authorize(&citizen, Action::ReportViolation).is_ok());

        assert!(authorize(&citizen, Action::ReadAnyViolation).is_err());
        assert!(authorize(&citizen, Action::CreateCameraViolation).is_err());
        assert!(authorize(&citizen, Action::ProcessViolation).is_err());
        assert!(authorize(&citizen, Action::ManageUsers).is_err());
        assert!(authorize(&citizen, Action::ManageCameras).is_err());
        assert!(authorize(&citizen, Action::ViewAllPerformance).is_err());
        assert!(authorize(&citizen, Action::ViewOwnPerformance).is_err());
        assert!(authorize(&citizen, Action::ViewCameras).is_err());
        assert!(authorize(&citizen, Action::ViewStatistics).is_err());
    }

    #[test]
    fn test_officer_grants() {
        let officer = identity(Role::Officer);

        assert!(authorize(&officer, Action::ReadAnyViolation).is_ok());
        assert!(authorize(&officer, Action::CreateCameraViolation).is_ok());
        assert!(authorize(&officer, Action::ProcessViolation).is_ok());
        assert!(authorize(&officer, Action::ViewOwnPerformance).is_ok());
        assert!(authorize(&officer, Action::ViewCameras).is_ok());
        assert!(authorize(&officer, Action::ViewStatistics).is_ok());

        // Officers create camera records, not citizen reports
        assert!(authorize(&officer, Action::ReportViolation).is_err());
        assert!(authorize(&officer, Action::ManageUsers).is_err());
        assert!(authorize(&officer, Action::ViewAllPerformance).is_err());
    }

    #[test]
    fn test_authority_grants() {
        let authority = identity(Role::Authority);

        assert!(authorize(&authority, Action::ReadAnyViolation).is_ok());
        assert!(authorize(&authority, Action::ProcessViolation).is_ok());
        assert!(authorize(&authority, Action::ManageUsers).is_ok());
        assert!(authorize(&authority, Action::ManageCameras).is_ok());
        assert!(authorize(&authority, Action::ViewAllPerformance).is_ok());

        assert!(authorize(&authority, Action::ReportViolation).is_err());
    }

    #[test]
    fn test_record_read_ownership() {
        let citizen = identity(Role::Citizen);
        let own = report_by(10);
        let other = report_by(11);

        assert!(authorize_read(&citizen, &own).is_ok());
        let err = authorize_read(&citizen, &other).unwrap_err();
        assert!(err.is_forbidden());

        let officer = identity(Role::Officer);
        assert!(authorize_read(&officer, &other).is_ok());
    }
}
