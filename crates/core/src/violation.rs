//! # Violation Module
//!
//! Định nghĩa Violation entity, trạng thái xử lý và state machine.
//! Vòng đời: pending -> {processed, rejected}; processed -> {paid, appealed}.
//! Các trạng thái paid, rejected, appealed là terminal.

use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Trạng thái xử lý của một violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViolationStatus {
    /// Mới tạo, chờ cán bộ xử lý
    Pending,
    /// Đã xác nhận vi phạm, chờ nộp phạt
    Processed,
    /// Đã nộp phạt
    Paid,
    /// Bị từ chối (báo cáo không hợp lệ)
    Rejected,
    /// Đang khiếu nại
    Appealed,
}

impl ViolationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationStatus::Pending => "pending",
            ViolationStatus::Processed => "processed",
            ViolationStatus::Paid => "paid",
            ViolationStatus::Rejected => "rejected",
            ViolationStatus::Appealed => "appealed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(ViolationStatus::Pending),
            "processed" => Some(ViolationStatus::Processed),
            "paid" => Some(ViolationStatus::Paid),
            "rejected" => Some(ViolationStatus::Rejected),
            "appealed" => Some(ViolationStatus::Appealed),
            _ => None,
        }
    }

    /// Trạng thái kết thúc, không chuyển tiếp được nữa.
    ///
    /// Appealed là terminal: quy trình phúc thẩm nằm ngoài hệ thống này.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ViolationStatus::Paid | ViolationStatus::Rejected | ViolationStatus::Appealed
        )
    }

    /// Kiểm tra chuyển trạng thái có hợp lệ không
    pub fn can_transition_to(&self, next: ViolationStatus) -> bool {
        matches!(
            (self, next),
            (
                ViolationStatus::Pending,
                ViolationStatus::Processed | ViolationStatus::Rejected
            ) | (
                ViolationStatus::Processed,
                ViolationStatus::Paid | ViolationStatus::Appealed
            )
        )
    }
}

impl fmt::Display for ViolationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Nguồn gốc của violation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViolationSource {
    /// Camera giám sát tự động phát hiện
    Camera,
    /// Người dân báo cáo
    Report,
}

impl ViolationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationSource::Camera => "camera",
            ViolationSource::Report => "report",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "camera" => Some(ViolationSource::Camera),
            "report" => Some(ViolationSource::Report),
            _ => None,
        }
    }
}

impl fmt::Display for ViolationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Hồ sơ vi phạm giao thông.
///
/// Các trường định danh (code, biển số, loại, nguồn gốc) bất biến sau khi
/// tạo; chỉ các trường xử lý thay đổi qua [`apply`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Surrogate key (0 khi chưa persist)
    pub id: i64,
    /// Mã vi phạm duy nhất (VL + ngày + suffix)
    pub violation_code: String,
    /// Biển số xe
    pub license_plate: String,
    /// Loại vi phạm (speeding, red_light, ...)
    pub violation_type: String,
    /// Mô tả chi tiết
    pub description: Option<String>,
    /// Địa điểm vi phạm
    pub location: String,
    /// Thời điểm vi phạm xảy ra
    pub violation_time: DateTime<Utc>,
    /// Mức phạt
    pub fine_amount: Decimal,
    /// Trạng thái xử lý
    pub status: ViolationStatus,
    /// Nguồn gốc record
    pub source: ViolationSource,
    /// Camera phát hiện (bắt buộc khi source=camera)
    pub camera_id: Option<i64>,
    /// Ảnh chụp từ camera
    pub image_url: Option<String>,
    /// Video từ camera
    pub video_url: Option<String>,
    /// Người dân báo cáo (bắt buộc khi source=report)
    pub reported_by: Option<i64>,
    /// Danh sách bằng chứng đính kèm
    pub evidence_urls: Vec<String>,
    /// Cán bộ đã xử lý
    pub processed_by: Option<i64>,
    /// Thời điểm xử lý
    pub processed_at: Option<DateTime<Utc>>,
    /// Ghi chú xử lý
    pub processing_notes: Option<String>,
    /// Thời điểm tạo record
    pub created_at: DateTime<Utc>,
}

/// Input tạo violation từ camera.
#[derive(Debug, Clone)]
pub struct CameraViolationInput {
    pub license_plate: String,
    pub violation_type: String,
    pub description: Option<String>,
    pub location: String,
    pub violation_time: DateTime<Utc>,
    pub fine_amount: Decimal,
    pub camera_id: i64,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
}

/// Input báo cáo vi phạm từ người dân.
///
/// Không có fine_amount: mức phạt do cơ quan quyết định sau.
#[derive(Debug, Clone)]
pub struct ReportInput {
    pub license_plate: String,
    pub violation_type: String,
    pub description: Option<String>,
    pub location: String,
    pub violation_time: DateTime<Utc>,
    pub evidence_urls: Vec<String>,
}

impl Violation {
    /// Tạo violation từ camera, trạng thái pending
    pub fn new_camera(
        input: CameraViolationInput,
        violation_code: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0,
            violation_code,
            license_plate: input.license_plate,
            violation_type: input.violation_type,
            description: input.description,
            location: input.location,
            violation_time: input.violation_time,
            fine_amount: input.fine_amount,
            status: ViolationStatus::Pending,
            source: ViolationSource::Camera,
            camera_id: Some(input.camera_id),
            image_url: input.image_url,
            video_url: input.video_url,
            reported_by: None,
            evidence_urls: Vec::new(),
            processed_by: None,
            processed_at: None,
            processing_notes: None,
            created_at: now,
        }
    }

    /// Tạo violation từ báo cáo người dân, fine_amount = 0
    pub fn new_report(
        input: ReportInput,
        reported_by: i64,
        violation_code: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0,
            violation_code,
            license_plate: input.license_plate,
            violation_type: input.violation_type,
            description: input.description,
            location: input.location,
            violation_time: input.violation_time,
            fine_amount: Decimal::ZERO,
            status: ViolationStatus::Pending,
            source: ViolationSource::Report,
            camera_id: None,
            image_url: None,
            video_url: None,
            reported_by: Some(reported_by),
            evidence_urls: input.evidence_urls,
            processed_by: None,
            processed_at: None,
            processing_notes: None,
            created_at: now,
        }
    }

    /// Kiểm tra invariant nguồn gốc: đúng một trong camera_id/reported_by,
    /// khớp với source.
    pub fn validate_provenance(&self) -> CoreResult<()> {
        match self.source {
            ViolationSource::Camera => {
                if self.camera_id.is_none() {
                    return Err(CoreError::InvalidProvenance(
                        "camera-sourced violation requires camera_id".to_string(),
                    ));
                }
                if self.reported_by.is_some() {
                    return Err(CoreError::InvalidProvenance(
                        "camera-sourced violation must not have reported_by".to_string(),
                    ));
                }
            }
            ViolationSource::Report => {
                if self.reported_by.is_none() {
                    return Err(CoreError::InvalidProvenance(
                        "reported violation requires reported_by".to_string(),
                    ));
                }
                if self.camera_id.is_some() {
                    return Err(CoreError::InvalidProvenance(
                        "reported violation must not have camera_id".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} - {})",
            self.violation_code, self.license_plate, self.status
        )
    }
}

/// Partial update cho violation: trường vắng mặt nghĩa là "không đổi".
#[derive(Debug, Clone, Default)]
pub struct ViolationPatch {
    pub status: Option<ViolationStatus>,
    pub fine_amount: Option<Decimal>,
    pub processing_notes: Option<String>,
}

impl ViolationPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: ViolationStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_fine_amount(mut self, amount: Decimal) -> Self {
        self.fine_amount = Some(amount);
        self
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.processing_notes = Some(notes.to_string());
        self
    }

    /// Patch rỗng không thay đổi gì
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.fine_amount.is_none() && self.processing_notes.is_none()
    }
}

/// Áp dụng patch lên violation theo state machine.
///
/// Chỉ pending chấp nhận processed/rejected (đồng thời ghi nhận
/// processed_by/processed_at); processed chấp nhận paid/appealed (giữ nguyên
/// thông tin người xử lý ban đầu). Mọi chuyển trạng thái khác trả về
/// `InvalidTransition`. Trường vắng trong patch giữ nguyên giá trị cũ.
pub fn apply(
    violation: &Violation,
    patch: &ViolationPatch,
    actor_id: i64,
    now: DateTime<Utc>,
) -> CoreResult<Violation> {
    let mut next = violation.clone();

    if let Some(target) = patch.status {
        if !violation.status.can_transition_to(target) {
            return Err(CoreError::invalid_transition(
                violation.status.as_str(),
                target.as_str(),
            ));
        }
        next.status = target;
        if violation.status == ViolationStatus::Pending {
            next.processed_by = Some(actor_id);
            next.processed_at = Some(now);
        }
    }

    if let Some(amount) = patch.fine_amount {
        next.fine_amount = amount;
    }
    if let Some(ref notes) = patch.processing_notes {
        next.processing_notes = Some(notes.clone());
    }

    Ok(next)
}

/// Sinh mã vi phạm: "VL" + ngày (8 chữ số) + 8 ký tự hex từ UUID v4.
///
/// Tính duy nhất cuối cùng do unique constraint của store đảm bảo; caller
/// phải retry khi đụng độ.
pub fn generate_code(now: DateTime<Utc>) -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(8)
        .collect::<String>()
        .to_uppercase();
    format!("VL{}{}", now.format("%Y%m%d"), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashSet;

    fn sample_camera_input() -> CameraViolationInput {
        CameraViolationInput {
            license_plate: "51A-123.45".to_string(),
            violation_type: "speeding".to_string(),
            description: Some("82 km/h in a 60 zone".to_string()),
            location: "Nguyen Hue".to_string(),
            violation_time: Utc::now(),
            fine_amount: dec!(800000),
            camera_id: 3,
            image_url: Some("/captures/c3/0001.jpg".to_string()),
            video_url: None,
        }
    }

    fn sample_report_input() -> ReportInput {
        ReportInput {
            license_plate: "59F1-678.90".to_string(),
            violation_type: "wrong_parking".to_string(),
            description: None,
            location: "Le Loi".to_string(),
            violation_time: Utc::now(),
            evidence_urls: vec!["/uploads/a.jpg".to_string(), "/uploads/b.jpg".to_string()],
        }
    }

    #[test]
    fn test_status_transitions() {
        use ViolationStatus::*;

        assert!(Pending.can_transition_to(Processed));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Processed.can_transition_to(Paid));
        assert!(Processed.can_transition_to(Appealed));

        assert!(!Pending.can_transition_to(Paid));
        assert!(!Pending.can_transition_to(Appealed));
        assert!(!Processed.can_transition_to(Pending));
        assert!(!Paid.can_transition_to(Appealed));
        assert!(!Rejected.can_transition_to(Processed));
        assert!(!Appealed.can_transition_to(Processed));
    }

    #[test]
    fn test_status_terminal() {
        assert!(!ViolationStatus::Pending.is_terminal());
        assert!(!ViolationStatus::Processed.is_terminal());
        assert!(ViolationStatus::Paid.is_terminal());
        assert!(ViolationStatus::Rejected.is_terminal());
        assert!(ViolationStatus::Appealed.is_terminal());
    }

    #[test]
    fn test_status_str_roundtrip() {
        for status in [
            ViolationStatus::Pending,
            ViolationStatus::Processed,
            ViolationStatus::Paid,
            ViolationStatus::Rejected,
            ViolationStatus::Appealed,
        ] {
            assert_eq!(ViolationStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(ViolationStatus::from_str("unknown"), None);
    }

    #[test]
    fn test_new_camera_violation() {
        let now = Utc::now();
        let v = Violation::new_camera(sample_camera_input(), "VL20260801AAAA0001".to_string(), now);

        assert_eq!(v.status, ViolationStatus::Pending);
        assert_eq!(v.source, ViolationSource::Camera);
        assert_eq!(v.camera_id, Some(3));
        assert_eq!(v.reported_by, None);
        assert_eq!(v.fine_amount, dec!(800000));
        assert!(v.validate_provenance().is_ok());
    }

    #[test]
    fn test_new_report_forces_zero_fine() {
        let now = Utc::now();
        let v = Violation::new_report(
            sample_report_input(),
            12,
            "VL20260801BBBB0002".to_string(),
            now,
        );

        assert_eq!(v.fine_amount, Decimal::ZERO);
        assert_eq!(v.source, ViolationSource::Report);
        assert_eq!(v.camera_id, None);
        assert_eq!(v.reported_by, Some(12));
        assert_eq!(v.evidence_urls.len(), 2);
        assert!(v.validate_provenance().is_ok());
    }

    #[test]
    fn test_provenance_invariant() {
        let now = Utc::now();
        let mut v =
            Violation::new_camera(sample_camera_input(), "VL20260801CCCC0003".to_string(), now);
        v.reported_by = Some(1);
        assert!(v.validate_provenance().is_err());

        let mut v = Violation::new_report(
            sample_report_input(),
            12,
            "VL20260801DDDD0004".to_string(),
            now,
        );
        v.camera_id = Some(9);
        assert!(v.validate_provenance().is_err());
        v.camera_id = None;
        v.reported_by = None;
        assert!(v.validate_provenance().is_err());
    }

    #[test]
    fn test_apply_process_stamps_actor() {
        let now = Utc::now();
        let v = Violation::new_camera(sample_camera_input(), "VL20260801EEEE0005".to_string(), now);

        let patch = ViolationPatch::new()
            .with_status(ViolationStatus::Processed)
            .with_notes("confirmed from footage");
        let processed = apply(&v, &patch, 42, now).unwrap();

        assert_eq!(processed.status, ViolationStatus::Processed);
        assert_eq!(processed.processed_by, Some(42));
        assert_eq!(processed.processed_at, Some(now));
        assert_eq!(
            processed.processing_notes.as_deref(),
            Some("confirmed from footage")
        );

        // Re-processing an already-processed record must fail
        let err = apply(&processed, &patch, 42, now).unwrap_err();
        assert!(err.is_invalid_transition());
    }

    #[test]
    fn test_apply_partial_patch_keeps_other_fields() {
        let now = Utc::now();
        let v = Violation::new_camera(sample_camera_input(), "VL20260801FFFF0006".to_string(), now);

        let patch = ViolationPatch::new().with_notes("needs a second look");
        let updated = apply(&v, &patch, 42, now).unwrap();

        assert_eq!(updated.status, ViolationStatus::Pending);
        assert_eq!(updated.processed_by, None);
        assert_eq!(updated.processed_at, None);
        assert_eq!(updated.fine_amount, v.fine_amount);
        assert_eq!(updated.processing_notes.as_deref(), Some("needs a second look"));
    }

    #[test]
    fn test_apply_paid_keeps_processor() {
        let now = Utc::now();
        let v = Violation::new_camera(sample_camera_input(), "VL20260801AB110007".to_string(), now);
        let processed = apply(
            &v,
            &ViolationPatch::new().with_status(ViolationStatus::Processed),
            42,
            now,
        )
        .unwrap();

        let paid = apply(
            &processed,
            &ViolationPatch::new().with_status(ViolationStatus::Paid),
            99,
            Utc::now(),
        )
        .unwrap();

        assert_eq!(paid.status, ViolationStatus::Paid);
        // Original decision record is preserved
        assert_eq!(paid.processed_by, Some(42));
        assert_eq!(paid.processed_at, Some(now));
    }

    #[test]
    fn test_apply_rejects_illegal_jump() {
        let now = Utc::now();
        let v = Violation::new_camera(sample_camera_input(), "VL20260801AB120008".to_string(), now);

        let err = apply(
            &v,
            &ViolationPatch::new().with_status(ViolationStatus::Paid),
            42,
            now,
        )
        .unwrap_err();
        assert!(err.is_invalid_transition());
    }

    #[test]
    fn test_generate_code_format() {
        let now = Utc::now();
        let code = generate_code(now);

        assert!(code.starts_with("VL"));
        assert_eq!(code.len(), 2 + 8 + 8);
        assert!(code.contains(&now.format("%Y%m%d").to_string()));
        let suffix = &code[10..];
        assert!(suffix.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_generate_code_uniqueness() {
        let now = Utc::now();
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            assert!(seen.insert(generate_code(now)));
        }
    }
}
