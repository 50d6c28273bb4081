//! SQLite persistence - schema rows và repositories

pub mod repos;
pub mod schema;

pub use repos::{
    create_pool, init_database, run_migrations, CameraRepo, UserRepo, ViolationFilter,
    ViolationRepo,
};
pub use schema::{CameraRow, UserRow, ViolationRow};
