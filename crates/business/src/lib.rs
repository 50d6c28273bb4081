//! # Phat Nguoi Business
//!
//! Business logic layer - identity resolution, violation lifecycle,
//! bulk processing, admin and report operations.

pub mod admin;
pub mod auth;
pub mod error;
pub mod reporting;
pub mod services;
pub mod violation;

pub use admin::AdminService;
pub use auth::AuthService;
pub use error::{BusinessError, BusinessResult};
pub use reporting::ReportService;
pub use services::ServiceContext;
pub use violation::{BulkAction, BulkFailure, BulkOutcome, ViolationService};
