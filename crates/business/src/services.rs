//! Service context shared by business operations
//!
//! Every operation is an independent unit of work against the shared pool;
//! no long-lived state beyond the connection pool itself.

use phatnguoi_persistence::Database;
use sqlx::SqlitePool;

/// Context for business operations - contains database access
pub struct ServiceContext {
    pool: SqlitePool,
}

impl ServiceContext {
    /// Create new service context from database
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    /// Create from pool directly
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get database pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
