//! Repository implementations cho SQLite
//!
//! CRUD operations cho users, cameras và violations. Các hàm count phục vụ
//! statistics/reports. Chuyển trạng thái violation dùng guarded UPDATE có
//! điều kiện trên status đã đọc trước đó.

use crate::error::{map_insert_error, PersistenceError, PersistenceResult};
use crate::sqlite::schema::*;
use chrono::{DateTime, Utc};
use phatnguoi_core::{
    Camera, CameraPatch, CameraStatus, Role, User, UserPatch, Violation, ViolationStatus,
};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

// ============================================================================
// User Repository
// ============================================================================

/// Repository cho users table
pub struct UserRepo;

impl UserRepo {
    /// Lấy user theo ID
    pub async fn get_by_id(pool: &SqlitePool, id: i64) -> PersistenceResult<UserRow> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| PersistenceError::not_found("User", id))
    }

    /// Lấy user theo username
    pub async fn get_by_username(
        pool: &SqlitePool,
        username: &str,
    ) -> PersistenceResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(pool)
            .await?;
        Ok(row)
    }

    /// Lấy user theo email
    pub async fn get_by_email(
        pool: &SqlitePool,
        email: &str,
    ) -> PersistenceResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(pool)
            .await?;
        Ok(row)
    }

    /// Lấy user theo api_token (identity resolve)
    pub async fn get_by_token(
        pool: &SqlitePool,
        token: &str,
    ) -> PersistenceResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE api_token = ?")
            .bind(token)
            .fetch_optional(pool)
            .await?;
        Ok(row)
    }

    /// Liệt kê users
    pub async fn list(
        pool: &SqlitePool,
        skip: i64,
        limit: i64,
    ) -> PersistenceResult<Vec<UserRow>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT * FROM users ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(skip)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    /// Liệt kê users theo role
    pub async fn list_by_role(
        pool: &SqlitePool,
        role: Role,
        skip: i64,
        limit: i64,
    ) -> PersistenceResult<Vec<UserRow>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT * FROM users WHERE role = ? ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(role.as_str())
        .bind(limit)
        .bind(skip)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    /// Liệt kê officers đang hoạt động
    pub async fn list_active_officers(pool: &SqlitePool) -> PersistenceResult<Vec<UserRow>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT * FROM users WHERE role = 'officer' AND is_active = 1 ORDER BY id",
        )
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    /// Thêm user mới, trả về id
    pub async fn insert(pool: &SqlitePool, user: &User) -> PersistenceResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, email, full_name, phone, role, is_active, api_token,
                               citizen_id, address, badge_number, department, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.phone)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .bind(&user.api_token)
        .bind(&user.citizen_id)
        .bind(&user.address)
        .bind(&user.badge_number)
        .bind(&user.department)
        .bind(user.created_at)
        .execute(pool)
        .await
        .map_err(map_insert_error)?;
        Ok(result.last_insert_rowid())
    }

    /// Cập nhật hồ sơ theo patch: chỉ trường có mặt mới thay đổi.
    /// Không có đường nào đổi role.
    pub async fn update_profile(
        pool: &SqlitePool,
        id: i64,
        patch: &UserPatch,
    ) -> PersistenceResult<()> {
        if patch.is_empty() {
            return Err(PersistenceError::Configuration(
                "empty user patch".to_string(),
            ));
        }

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE users SET ");
        let mut fields = qb.separated(", ");
        if let Some(ref v) = patch.full_name {
            fields.push("full_name = ").push_bind_unseparated(v.clone());
        }
        if let Some(ref v) = patch.phone {
            fields.push("phone = ").push_bind_unseparated(v.clone());
        }
        if let Some(ref v) = patch.email {
            fields.push("email = ").push_bind_unseparated(v.clone());
        }
        if let Some(ref v) = patch.address {
            fields.push("address = ").push_bind_unseparated(v.clone());
        }
        if let Some(ref v) = patch.department {
            fields.push("department = ").push_bind_unseparated(v.clone());
        }
        qb.push(" WHERE id = ").push_bind(id);

        let result = qb.build().execute(pool).await.map_err(map_insert_error)?;
        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("User", id));
        }
        Ok(())
    }

    /// Bật/tắt tài khoản
    pub async fn set_active(pool: &SqlitePool, id: i64, active: bool) -> PersistenceResult<()> {
        let result = sqlx::query("UPDATE users SET is_active = ? WHERE id = ?")
            .bind(active)
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("User", id));
        }
        Ok(())
    }

    /// Đếm users theo role
    pub async fn count_by_role(pool: &SqlitePool, role: Role) -> PersistenceResult<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE role = ?")
            .bind(role.as_str())
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// Đếm tất cả users
    pub async fn count(pool: &SqlitePool) -> PersistenceResult<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }
}

// ============================================================================
// Camera Repository
// ============================================================================

/// Repository cho cameras table
pub struct CameraRepo;

impl CameraRepo {
    /// Lấy camera theo ID
    pub async fn get_by_id(pool: &SqlitePool, id: i64) -> PersistenceResult<CameraRow> {
        sqlx::query_as::<_, CameraRow>("SELECT * FROM cameras WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| PersistenceError::not_found("Camera", id))
    }

    /// Lấy camera theo code
    pub async fn get_by_code(
        pool: &SqlitePool,
        camera_code: &str,
    ) -> PersistenceResult<Option<CameraRow>> {
        let row = sqlx::query_as::<_, CameraRow>("SELECT * FROM cameras WHERE camera_code = ?")
            .bind(camera_code)
            .fetch_optional(pool)
            .await?;
        Ok(row)
    }

    /// Liệt kê cameras với filter tùy chọn
    pub async fn list(
        pool: &SqlitePool,
        status: Option<CameraStatus>,
        camera_type: Option<&str>,
        skip: i64,
        limit: i64,
    ) -> PersistenceResult<Vec<CameraRow>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM cameras WHERE 1=1");
        if let Some(status) = status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(camera_type) = camera_type {
            qb.push(" AND camera_type = ")
                .push_bind(camera_type.to_string());
        }
        qb.push(" ORDER BY id LIMIT ").push_bind(limit);
        qb.push(" OFFSET ").push_bind(skip);

        let rows = qb.build_query_as::<CameraRow>().fetch_all(pool).await?;
        Ok(rows)
    }

    /// Liệt kê cameras đang hoạt động theo thứ tự id
    pub async fn list_active(pool: &SqlitePool) -> PersistenceResult<Vec<CameraRow>> {
        let rows = sqlx::query_as::<_, CameraRow>(
            "SELECT * FROM cameras WHERE status = 'active' ORDER BY id",
        )
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    /// Thêm camera mới, trả về id
    pub async fn insert(pool: &SqlitePool, camera: &Camera) -> PersistenceResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO cameras (camera_code, name, location, latitude, longitude,
                                 camera_type, status, description, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&camera.camera_code)
        .bind(&camera.name)
        .bind(&camera.location)
        .bind(camera.latitude)
        .bind(camera.longitude)
        .bind(&camera.camera_type)
        .bind(camera.status.as_str())
        .bind(&camera.description)
        .bind(camera.created_at)
        .execute(pool)
        .await
        .map_err(map_insert_error)?;
        Ok(result.last_insert_rowid())
    }

    /// Cập nhật camera theo patch
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        patch: &CameraPatch,
    ) -> PersistenceResult<()> {
        if patch.is_empty() {
            return Err(PersistenceError::Configuration(
                "empty camera patch".to_string(),
            ));
        }

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE cameras SET ");
        let mut fields = qb.separated(", ");
        if let Some(ref v) = patch.name {
            fields.push("name = ").push_bind_unseparated(v.clone());
        }
        if let Some(ref v) = patch.location {
            fields.push("location = ").push_bind_unseparated(v.clone());
        }
        if let Some(ref v) = patch.camera_type {
            fields
                .push("camera_type = ")
                .push_bind_unseparated(v.clone());
        }
        if let Some(status) = patch.status {
            fields
                .push("status = ")
                .push_bind_unseparated(status.as_str());
        }
        if let Some(ref v) = patch.description {
            fields
                .push("description = ")
                .push_bind_unseparated(v.clone());
        }
        qb.push(" WHERE id = ").push_bind(id);

        let result = qb.build().execute(pool).await?;
        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("Camera", id));
        }
        Ok(())
    }

    /// Xóa camera. Violations tham chiếu không bị xóa theo (dangling cho phép).
    pub async fn delete(pool: &SqlitePool, id: i64) -> PersistenceResult<()> {
        let result = sqlx::query("DELETE FROM cameras WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("Camera", id));
        }
        Ok(())
    }

    /// Đếm cameras theo status
    pub async fn count_by_status(
        pool: &SqlitePool,
        status: CameraStatus,
    ) -> PersistenceResult<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cameras WHERE status = ?")
            .bind(status.as_str())
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// Đếm tất cả cameras
    pub async fn count(pool: &SqlitePool) -> PersistenceResult<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cameras")
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }
}

// ============================================================================
// Violation Repository
// ============================================================================

/// Filter cho truy vấn violations. Trường vắng mặt = không ràng buộc.
#[derive(Debug, Clone, Default)]
pub struct ViolationFilter {
    pub status: Option<ViolationStatus>,
    /// Substring match, không phân biệt hoa thường
    pub license_plate: Option<String>,
    /// Substring match, không phân biệt hoa thường
    pub violation_type: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

impl ViolationFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: ViolationStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_license_plate(mut self, plate: &str) -> Self {
        self.license_plate = Some(plate.to_string());
        self
    }

    pub fn with_violation_type(mut self, violation_type: &str) -> Self {
        self.violation_type = Some(violation_type.to_string());
        self
    }

    pub fn with_date_range(
        mut self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Self {
        self.date_from = from;
        self.date_to = to;
        self
    }

    fn push_clauses(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        if let Some(status) = self.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        // SQLite LIKE không phân biệt hoa thường với ASCII
        if let Some(ref plate) = self.license_plate {
            qb.push(" AND license_plate LIKE ")
                .push_bind(format!("%{}%", plate));
        }
        if let Some(ref vtype) = self.violation_type {
            qb.push(" AND violation_type LIKE ")
                .push_bind(format!("%{}%", vtype));
        }
        if let Some(from) = self.date_from {
            qb.push(" AND violation_time >= ").push_bind(from);
        }
        if let Some(to) = self.date_to {
            qb.push(" AND violation_time <= ").push_bind(to);
        }
    }
}

/// Repository cho violations table
pub struct ViolationRepo;

impl ViolationRepo {
    /// Thêm violation mới, trả về id.
    ///
    /// Đụng độ unique trên violation_code trả về UniqueViolation để caller
    /// retry với code khác.
    pub async fn insert(pool: &SqlitePool, v: &Violation) -> PersistenceResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO violations (violation_code, license_plate, violation_type, description,
                                    location, violation_time, fine_amount, status, source,
                                    camera_id, image_url, video_url, reported_by, evidence_urls,
                                    processed_by, processed_at, processing_notes, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&v.violation_code)
        .bind(&v.license_plate)
        .bind(&v.violation_type)
        .bind(&v.description)
        .bind(&v.location)
        .bind(v.violation_time)
        .bind(v.fine_amount.to_string())
        .bind(v.status.as_str())
        .bind(v.source.as_str())
        .bind(v.camera_id)
        .bind(&v.image_url)
        .bind(&v.video_url)
        .bind(v.reported_by)
        .bind(encode_evidence_urls(&v.evidence_urls))
        .bind(v.processed_by)
        .bind(v.processed_at)
        .bind(&v.processing_notes)
        .bind(v.created_at)
        .execute(pool)
        .await
        .map_err(map_insert_error)?;
        Ok(result.last_insert_rowid())
    }

    /// Lấy violation theo ID
    pub async fn get_by_id(pool: &SqlitePool, id: i64) -> PersistenceResult<ViolationRow> {
        sqlx::query_as::<_, ViolationRow>("SELECT * FROM violations WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| PersistenceError::not_found("Violation", id))
    }

    /// Lấy violation theo code (exact match, tối đa một record)
    pub async fn get_by_code(
        pool: &SqlitePool,
        violation_code: &str,
    ) -> PersistenceResult<Option<ViolationRow>> {
        let row =
            sqlx::query_as::<_, ViolationRow>("SELECT * FROM violations WHERE violation_code = ?")
                .bind(violation_code)
                .fetch_optional(pool)
                .await?;
        Ok(row)
    }

    /// Liệt kê violations theo filter, mới tạo trước, skip/limit sau khi
    /// filter và sort.
    pub async fn list(
        pool: &SqlitePool,
        filter: &ViolationFilter,
        skip: i64,
        limit: i64,
    ) -> PersistenceResult<Vec<ViolationRow>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM violations WHERE 1=1");
        filter.push_clauses(&mut qb);
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(limit);
        qb.push(" OFFSET ").push_bind(skip);

        let rows = qb.build_query_as::<ViolationRow>().fetch_all(pool).await?;
        Ok(rows)
    }

    /// Tra cứu công khai theo biển số (substring), mới vi phạm trước
    pub async fn list_by_plate(
        pool: &SqlitePool,
        license_plate: &str,
    ) -> PersistenceResult<Vec<ViolationRow>> {
        let rows = sqlx::query_as::<_, ViolationRow>(
            "SELECT * FROM violations WHERE license_plate LIKE ? ORDER BY violation_time DESC, id DESC",
        )
        .bind(format!("%{}%", license_plate))
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    /// Liệt kê báo cáo của một người dân
    pub async fn list_by_reporter(
        pool: &SqlitePool,
        reported_by: i64,
        status: Option<ViolationStatus>,
        skip: i64,
        limit: i64,
    ) -> PersistenceResult<Vec<ViolationRow>> {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT * FROM violations WHERE reported_by = ");
        qb.push_bind(reported_by);
        if let Some(status) = status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(limit);
        qb.push(" OFFSET ").push_bind(skip);

        let rows = qb.build_query_as::<ViolationRow>().fetch_all(pool).await?;
        Ok(rows)
    }

    /// Ghi lại các trường xử lý, có điều kiện trên status đã đọc trước đó.
    ///
    /// Trả về false khi record đã bị chuyển trạng thái bởi caller khác
    /// (hoặc không tồn tại): transition hợp lệ đầu tiên thắng.
    pub async fn save_processing(
        pool: &SqlitePool,
        v: &Violation,
        expected: ViolationStatus,
    ) -> PersistenceResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE violations
            SET status = ?, fine_amount = ?, processing_notes = ?,
                processed_by = ?, processed_at = ?
            WHERE id = ? AND status = ?
            "#,
        )
        .bind(v.status.as_str())
        .bind(v.fine_amount.to_string())
        .bind(&v.processing_notes)
        .bind(v.processed_by)
        .bind(v.processed_at)
        .bind(v.id)
        .bind(expected.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Đếm violations tạo từ thời điểm `since`, theo status tùy chọn
    pub async fn count_created_since(
        pool: &SqlitePool,
        status: Option<ViolationStatus>,
        since: DateTime<Utc>,
    ) -> PersistenceResult<i64> {
        let row: (i64,) = match status {
            Some(status) => {
                sqlx::query_as(
                    "SELECT COUNT(*) FROM violations WHERE status = ? AND created_at >= ?",
                )
                .bind(status.as_str())
                .bind(since)
                .fetch_one(pool)
                .await?
            }
            None => {
                sqlx::query_as("SELECT COUNT(*) FROM violations WHERE created_at >= ?")
                    .bind(since)
                    .fetch_one(pool)
                    .await?
            }
        };
        Ok(row.0)
    }

    /// Đếm violations một cán bộ đã xử lý từ thời điểm `since`
    pub async fn count_processed_by(
        pool: &SqlitePool,
        officer_id: i64,
        since: DateTime<Utc>,
    ) -> PersistenceResult<i64> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM violations WHERE processed_by = ? AND processed_at >= ?",
        )
        .bind(officer_id)
        .bind(since)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Đếm violations một camera phát hiện từ thời điểm `since`
    pub async fn count_by_camera(
        pool: &SqlitePool,
        camera_id: i64,
        since: DateTime<Utc>,
    ) -> PersistenceResult<i64> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM violations WHERE camera_id = ? AND violation_time >= ?",
        )
        .bind(camera_id)
        .bind(since)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Đếm báo cáo của một người dân theo status tùy chọn
    pub async fn count_by_reporter(
        pool: &SqlitePool,
        reported_by: i64,
        status: Option<ViolationStatus>,
    ) -> PersistenceResult<i64> {
        let row: (i64,) = match status {
            Some(status) => {
                sqlx::query_as(
                    "SELECT COUNT(*) FROM violations WHERE reported_by = ? AND status = ?",
                )
                .bind(reported_by)
                .bind(status.as_str())
                .fetch_one(pool)
                .await?
            }
            None => {
                sqlx::query_as("SELECT COUNT(*) FROM violations WHERE reported_by = ?")
                    .bind(reported_by)
                    .fetch_one(pool)
                    .await?
            }
        };
        Ok(row.0)
    }

    /// Đếm violations có violation_time trong khoảng [from, to)
    pub async fn count_violation_time_between(
        pool: &SqlitePool,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> PersistenceResult<i64> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM violations WHERE violation_time >= ? AND violation_time < ?",
        )
        .bind(from)
        .bind(to)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }
}

// ============================================================================
// Database initialization
// ============================================================================

/// Khởi tạo database connection pool
pub async fn create_pool(database_url: &str) -> PersistenceResult<SqlitePool> {
    let pool = SqlitePool::connect(database_url).await?;
    Ok(pool)
}

/// Chạy migrations
pub async fn run_migrations(pool: &SqlitePool) -> PersistenceResult<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}

/// Tạo database mới với schema
pub async fn init_database(database_url: &str) -> PersistenceResult<SqlitePool> {
    // Tạo file nếu chưa có
    let pool = SqlitePool::connect_with(
        database_url
            .parse::<sqlx::sqlite::SqliteConnectOptions>()?
            .create_if_missing(true),
    )
    .await?;

    // Run migrations
    run_migrations(&pool).await?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use phatnguoi_core::{CameraViolationInput, ReportInput};
    use rust_decimal_macros::dec;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool");
        run_migrations(&pool).await.expect("migrations");
        pool
    }

    async fn seed_officer(pool: &SqlitePool) -> i64 {
        let officer = User::new("officer.test", "officer@csgt.gov.vn", "Officer Test", Role::Officer)
            .with_token("tok-officer")
            .with_badge("CS-0001", "Doi 1");
        UserRepo::insert(pool, &officer).await.expect("insert officer")
    }

    async fn seed_camera(pool: &SqlitePool) -> i64 {
        let camera = Camera::new("CAM-001", "Test Camera", "Nguyen Hue", "speed");
        CameraRepo::insert(pool, &camera).await.expect("insert camera")
    }

    fn camera_violation(camera_id: i64, code: &str, created_at: DateTime<Utc>) -> Violation {
        Violation::new_camera(
            CameraViolationInput {
                license_plate: "51A-123.45".to_string(),
                violation_type: "speeding".to_string(),
                description: None,
                location: "Nguyen Hue".to_string(),
                violation_time: created_at,
                fine_amount: dec!(800000),
                camera_id,
                image_url: None,
                video_url: None,
            },
            code.to_string(),
            created_at,
        )
    }

    #[tokio::test]
    async fn test_insert_and_get_roundtrip() {
        let pool = test_pool().await;
        let citizen = User::new("citizen.a", "a@example.vn", "Citizen A", Role::Citizen);
        let citizen_id = UserRepo::insert(&pool, &citizen).await.unwrap();

        let now = Utc::now();
        let v = Violation::new_report(
            ReportInput {
                license_plate: "59F1-678.90".to_string(),
                violation_type: "wrong_parking".to_string(),
                description: Some("Blocking the sidewalk".to_string()),
                location: "Le Loi".to_string(),
                violation_time: now,
                evidence_urls: vec!["/uploads/a.jpg".to_string(), "/uploads/b.jpg".to_string()],
            },
            citizen_id,
            "VL20260801TEST0001".to_string(),
            now,
        );

        let id = ViolationRepo::insert(&pool, &v).await.unwrap();
        let row = ViolationRepo::get_by_id(&pool, id).await.unwrap();
        let loaded = Violation::try_from(row).unwrap();

        assert_eq!(loaded.violation_code, "VL20260801TEST0001");
        assert_eq!(loaded.status, ViolationStatus::Pending);
        assert_eq!(loaded.fine_amount, dec!(0));
        assert_eq!(loaded.reported_by, Some(citizen_id));
        assert_eq!(loaded.evidence_urls.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let pool = test_pool().await;
        let camera_id = seed_camera(&pool).await;
        let now = Utc::now();

        let v = camera_violation(camera_id, "VL20260801DUP00001", now);
        ViolationRepo::insert(&pool, &v).await.unwrap();

        let err = ViolationRepo::insert(&pool, &v).await.unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_list_filter_order_and_limit() {
        let pool = test_pool().await;
        let camera_id = seed_camera(&pool).await;
        let officer_id = seed_officer(&pool).await;
        let now = Utc::now();

        // 5 pending, mỗi record cách nhau 1 phút
        for i in 0..5 {
            let v = camera_violation(
                camera_id,
                &format!("VL20260801PEND000{}", i),
                now - Duration::minutes(10 - i),
            );
            ViolationRepo::insert(&pool, &v).await.unwrap();
        }
        // 3 processed
        for i in 0..3 {
            let mut v = camera_violation(
                camera_id,
                &format!("VL20260801PROC000{}", i),
                now - Duration::minutes(20 + i),
            );
            v.status = ViolationStatus::Processed;
            v.processed_by = Some(officer_id);
            v.processed_at = Some(now);
            ViolationRepo::insert(&pool, &v).await.unwrap();
        }

        let filter = ViolationFilter::new().with_status(ViolationStatus::Pending);
        let rows = ViolationRepo::list(&pool, &filter, 0, 2).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.status == "pending"));
        // Mới tạo trước
        assert_eq!(rows[0].violation_code, "VL20260801PEND0004");
        assert_eq!(rows[1].violation_code, "VL20260801PEND0003");
    }

    #[tokio::test]
    async fn test_list_plate_substring_case_insensitive() {
        let pool = test_pool().await;
        let camera_id = seed_camera(&pool).await;
        let now = Utc::now();

        let mut v = camera_violation(camera_id, "VL20260801PLATE001", now);
        v.license_plate = "51A-123.45".to_string();
        ViolationRepo::insert(&pool, &v).await.unwrap();

        let filter = ViolationFilter::new().with_license_plate("51a-123");
        let rows = ViolationRepo::list(&pool, &filter, 0, 100).await.unwrap();
        assert_eq!(rows.len(), 1);

        let rows = ViolationRepo::list_by_plate(&pool, "51a").await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_guarded_transition_first_wins() {
        let pool = test_pool().await;
        let camera_id = seed_camera(&pool).await;
        let officer_id = seed_officer(&pool).await;
        let now = Utc::now();

        let v = camera_violation(camera_id, "VL20260801RACE0001", now);
        let id = ViolationRepo::insert(&pool, &v).await.unwrap();

        let row = ViolationRepo::get_by_id(&pool, id).await.unwrap();
        let mut loaded = Violation::try_from(row).unwrap();
        loaded.status = ViolationStatus::Processed;
        loaded.processed_by = Some(officer_id);
        loaded.processed_at = Some(now);

        // First commit conditioned on pending succeeds
        let first = ViolationRepo::save_processing(&pool, &loaded, ViolationStatus::Pending)
            .await
            .unwrap();
        assert!(first);

        // Second commit conditioned on the same previously-read status loses
        let second = ViolationRepo::save_processing(&pool, &loaded, ViolationStatus::Pending)
            .await
            .unwrap();
        assert!(!second);
    }

    #[tokio::test]
    async fn test_statistics_counts_window() {
        let pool = test_pool().await;
        let camera_id = seed_camera(&pool).await;
        let now = Utc::now();

        // day-0, day-29 nằm trong cửa sổ 30 ngày; day-31 nằm ngoài
        for (i, age_days) in [0i64, 29, 31].iter().enumerate() {
            let v = camera_violation(
                camera_id,
                &format!("VL20260801STAT000{}", i),
                now - Duration::days(*age_days),
            );
            ViolationRepo::insert(&pool, &v).await.unwrap();
        }

        let since = now - Duration::days(30);
        let total = ViolationRepo::count_created_since(&pool, None, since)
            .await
            .unwrap();
        assert_eq!(total, 2);

        let pending =
            ViolationRepo::count_created_since(&pool, Some(ViolationStatus::Pending), since)
                .await
                .unwrap();
        assert_eq!(pending, 2);
    }

    #[tokio::test]
    async fn test_count_processed_by_and_camera() {
        let pool = test_pool().await;
        let camera_id = seed_camera(&pool).await;
        let officer_id = seed_officer(&pool).await;
        let now = Utc::now();

        let mut v = camera_violation(camera_id, "VL20260801CNT00001", now);
        v.status = ViolationStatus::Processed;
        v.processed_by = Some(officer_id);
        v.processed_at = Some(now - Duration::days(2));
        ViolationRepo::insert(&pool, &v).await.unwrap();

        let since = now - Duration::days(30);
        assert_eq!(
            ViolationRepo::count_processed_by(&pool, officer_id, since)
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            ViolationRepo::count_by_camera(&pool, camera_id, since)
                .await
                .unwrap(),
            1
        );
        // Officer khác chưa xử lý gì
        assert_eq!(
            ViolationRepo::count_processed_by(&pool, officer_id + 100, since)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_user_patch_does_not_touch_role() {
        let pool = test_pool().await;
        let citizen = User::new("citizen.b", "b@example.vn", "Citizen B", Role::Citizen);
        let id = UserRepo::insert(&pool, &citizen).await.unwrap();

        let patch = UserPatch {
            full_name: Some("Citizen B Updated".to_string()),
            phone: Some("0900000001".to_string()),
            ..Default::default()
        };
        UserRepo::update_profile(&pool, id, &patch).await.unwrap();

        let row = UserRepo::get_by_id(&pool, id).await.unwrap();
        assert_eq!(row.full_name, "Citizen B Updated");
        assert_eq!(row.role, "citizen");
        assert_eq!(row.email, "b@example.vn");
    }

    #[tokio::test]
    async fn test_camera_delete_keeps_violations() {
        let pool = test_pool().await;
        let camera_id = seed_camera(&pool).await;
        let now = Utc::now();

        let v = camera_violation(camera_id, "VL20260801DANGL001", now);
        let vid = ViolationRepo::insert(&pool, &v).await.unwrap();

        CameraRepo::delete(&pool, camera_id).await.unwrap();

        let row = ViolationRepo::get_by_id(&pool, vid).await.unwrap();
        assert_eq!(row.camera_id, Some(camera_id));
    }

    #[tokio::test]
    async fn test_init_database_on_file() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("phatnguoi.db");
        let url = format!("sqlite:{}?mode=rwc", db_path.display());

        let db = crate::Database::init_with_migrations(&url).await.unwrap();
        assert_eq!(UserRepo::count(db.pool()).await.unwrap(), 0);
        db.pool().close().await;
    }
}
