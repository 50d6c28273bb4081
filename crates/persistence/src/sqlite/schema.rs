//! Database schema definitions
//!
//! Row types cho sqlx mapping từ SQLite tables.
//! Schema được định nghĩa trong migrations/20260801000000_init.sql

use crate::error::PersistenceError;
use chrono::{DateTime, Utc};
use phatnguoi_core::{
    Camera, CameraStatus, Role, User, Violation, ViolationSource, ViolationStatus,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Row type cho bảng `users`
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub api_token: Option<String>,
    pub citizen_id: Option<String>,
    pub address: Option<String>,
    pub badge_number: Option<String>,
    pub department: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Row type cho bảng `cameras`
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct CameraRow {
    pub id: i64,
    pub camera_code: String,
    pub name: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub camera_type: String,
    pub status: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Row type cho bảng `violations`
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct ViolationRow {
    pub id: i64,
    pub violation_code: String,
    pub license_plate: String,
    pub violation_type: String,
    pub description: Option<String>,
    pub location: String,
    pub violation_time: DateTime<Utc>,
    pub fine_amount: String, // Decimal stored as TEXT
    pub status: String,
    pub source: String,
    pub camera_id: Option<i64>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub reported_by: Option<i64>,
    pub evidence_urls: Option<String>, // Comma-joined list
    pub processed_by: Option<i64>,
    pub processed_at: Option<DateTime<Utc>>,
    pub processing_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

// === Encoding helpers ===

/// Ghép danh sách evidence URLs thành cột TEXT.
///
/// Dạng comma-joined chỉ tồn tại ở tầng persistence; domain luôn thấy
/// Vec<String>.
pub fn encode_evidence_urls(urls: &[String]) -> Option<String> {
    if urls.is_empty() {
        None
    } else {
        Some(urls.join(","))
    }
}

/// Tách cột TEXT thành danh sách evidence URLs
pub fn decode_evidence_urls(raw: Option<&str>) -> Vec<String> {
    match raw {
        Some(s) if !s.is_empty() => s.split(',').map(|u| u.to_string()).collect(),
        _ => Vec::new(),
    }
}

// === Conversion implementations ===

impl TryFrom<UserRow> for User {
    type Error = PersistenceError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = Role::from_str(&row.role)
            .ok_or_else(|| PersistenceError::invalid_enum("role", &row.role))?;
        Ok(User {
            id: row.id,
            username: row.username,
            email: row.email,
            full_name: row.full_name,
            phone: row.phone,
            role,
            is_active: row.is_active,
            api_token: row.api_token,
            citizen_id: row.citizen_id,
            address: row.address,
            badge_number: row.badge_number,
            department: row.department,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<CameraRow> for Camera {
    type Error = PersistenceError;

    fn try_from(row: CameraRow) -> Result<Self, Self::Error> {
        let status = CameraStatus::from_str(&row.status)
            .ok_or_else(|| PersistenceError::invalid_enum("status", &row.status))?;
        Ok(Camera {
            id: row.id,
            camera_code: row.camera_code,
            name: row.name,
            location: row.location,
            latitude: row.latitude,
            longitude: row.longitude,
            camera_type: row.camera_type,
            status,
            description: row.description,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<ViolationRow> for Violation {
    type Error = PersistenceError;

    fn try_from(row: ViolationRow) -> Result<Self, Self::Error> {
        let status = ViolationStatus::from_str(&row.status)
            .ok_or_else(|| PersistenceError::invalid_enum("status", &row.status))?;
        let source = ViolationSource::from_str(&row.source)
            .ok_or_else(|| PersistenceError::invalid_enum("source", &row.source))?;
        let fine_amount = Decimal::from_str(&row.fine_amount)
            .map_err(|e| PersistenceError::InvalidDecimal(e.to_string()))?;
        let evidence_urls = decode_evidence_urls(row.evidence_urls.as_deref());

        Ok(Violation {
            id: row.id,
            violation_code: row.violation_code,
            license_plate: row.license_plate,
            violation_type: row.violation_type,
            description: row.description,
            location: row.location,
            violation_time: row.violation_time,
            fine_amount,
            status,
            source,
            camera_id: row.camera_id,
            image_url: row.image_url,
            video_url: row.video_url,
            reported_by: row.reported_by,
            evidence_urls,
            processed_by: row.processed_by,
            processed_at: row.processed_at,
            processing_notes: row.processing_notes,
            created_at: row.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evidence_urls_roundtrip() {
        let urls = vec!["/uploads/a.jpg".to_string(), "/uploads/b.mp4".to_string()];
        let encoded = encode_evidence_urls(&urls);
        assert_eq!(encoded.as_deref(), Some("/uploads/a.jpg,/uploads/b.mp4"));
        assert_eq!(decode_evidence_urls(encoded.as_deref()), urls);

        assert_eq!(encode_evidence_urls(&[]), None);
        assert!(decode_evidence_urls(None).is_empty());
        assert!(decode_evidence_urls(Some("")).is_empty());
    }
}
