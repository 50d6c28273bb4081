//! # Camera Module
//!
//! Camera giám sát giao thông và trạng thái hoạt động.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trạng thái hoạt động của camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraStatus {
    /// Đang hoạt động
    Active,
    /// Ngừng hoạt động
    Inactive,
    /// Đang bảo trì
    Maintenance,
}

impl CameraStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CameraStatus::Active => "active",
            CameraStatus::Inactive => "inactive",
            CameraStatus::Maintenance => "maintenance",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(CameraStatus::Active),
            "inactive" => Some(CameraStatus::Inactive),
            "maintenance" => Some(CameraStatus::Maintenance),
            _ => None,
        }
    }
}

impl fmt::Display for CameraStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Camera giám sát.
///
/// camera_type là chuỗi tham khảo (speed, red_light, general, ...);
/// không tham gia vào policy hay state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    /// Surrogate key (0 khi chưa persist)
    pub id: i64,
    /// Mã camera, duy nhất
    pub camera_code: String,
    /// Tên camera
    pub name: String,
    /// Vị trí lắp đặt
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Loại camera (speed, red_light, general)
    pub camera_type: String,
    /// Trạng thái hoạt động
    pub status: CameraStatus,
    pub description: Option<String>,
    /// Thời gian tạo
    pub created_at: DateTime<Utc>,
}

impl Camera {
    pub fn new(camera_code: &str, name: &str, location: &str, camera_type: &str) -> Self {
        Self {
            id: 0,
            camera_code: camera_code.to_string(),
            name: name.to_string(),
            location: location.to_string(),
            latitude: None,
            longitude: None,
            camera_type: camera_type.to_string(),
            status: CameraStatus::Active,
            description: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    pub fn with_status(mut self, status: CameraStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

impl fmt::Display for Camera {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} - {})", self.name, self.camera_code, self.status)
    }
}

/// Partial update cho camera. camera_code bất biến sau khi tạo.
#[derive(Debug, Clone, Default)]
pub struct CameraPatch {
    pub name: Option<String>,
    pub location: Option<String>,
    pub camera_type: Option<String>,
    pub status: Option<CameraStatus>,
    pub description: Option<String>,
}

impl CameraPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: CameraStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.location.is_none()
            && self.camera_type.is_none()
            && self.status.is_none()
            && self.description.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_status_str() {
        assert_eq!(CameraStatus::Active.as_str(), "active");
        assert_eq!(CameraStatus::from_str("MAINTENANCE"), Some(CameraStatus::Maintenance));
        assert_eq!(CameraStatus::from_str("broken"), None);
    }

    #[test]
    fn test_camera_creation() {
        let cam = Camera::new("CAM-NH-001", "Ngã tư Nguyễn Huệ", "Nguyễn Huệ x Lê Lợi", "red_light")
            .with_coordinates(10.7735, 106.7019);

        assert_eq!(cam.status, CameraStatus::Active);
        assert_eq!(cam.camera_type, "red_light");
        assert_eq!(cam.latitude, Some(10.7735));
    }

    #[test]
    fn test_camera_display() {
        let cam = Camera::new("CAM-NH-001", "Ngã tư Nguyễn Huệ", "Q1", "speed")
            .with_status(CameraStatus::Maintenance);
        assert_eq!(
            format!("{}", cam),
            "Ngã tư Nguyễn Huệ (CAM-NH-001 - maintenance)"
        );
    }
}
