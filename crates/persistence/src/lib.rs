//! # Phat Nguoi Persistence
//!
//! Persistence layer cho Phat Nguoi - SQLite qua sqlx.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Database                               │
//! │  ┌─────────────┐    ┌──────────────┐    ┌───────────────┐  │
//! │  │   SQLite    │    │  Migrations  │    │     Repos     │  │
//! │  │  (state)    │    │  (schema)    │    │   (queries)   │  │
//! │  └─────────────┘    └──────────────┘    └───────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use phatnguoi_persistence::{Database, ViolationRepo, ViolationFilter};
//!
//! // Initialize database
//! let db = Database::init_with_migrations("sqlite:phatnguoi.db?mode=rwc").await?;
//!
//! // Query via repos
//! let rows = ViolationRepo::list(db.pool(), &ViolationFilter::new(), 0, 100).await?;
//! ```

pub mod error;
pub mod sqlite;

pub use error::{PersistenceError, PersistenceResult};
pub use sqlite::schema::{CameraRow, UserRow, ViolationRow};
pub use sqlite::{
    create_pool, init_database, run_migrations, CameraRepo, UserRepo, ViolationFilter,
    ViolationRepo,
};

use sqlx::SqlitePool;

/// Database facade - unified access cho SQLite pool
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create new database connection
    ///
    /// # Arguments
    /// * `db_url` - SQLite database URL (e.g., "sqlite:phatnguoi.db?mode=rwc")
    pub async fn new(db_url: &str) -> PersistenceResult<Self> {
        let pool = create_pool(db_url).await?;
        Ok(Self { pool })
    }

    /// Initialize database with migrations
    pub async fn init_with_migrations(db_url: &str) -> PersistenceResult<Self> {
        let pool = init_database(db_url).await?;
        Ok(Self { pool })
    }

    /// Get SQLite connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
