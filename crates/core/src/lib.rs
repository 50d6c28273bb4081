//! # Phat Nguoi Core
//!
//! Core domain types cho hệ thống xử lý vi phạm giao thông:
//! - Role/Identity và capability checks
//! - Violation entity, code generator và state machine
//! - Access policy table (default-deny)
//! - Camera, User entities
//! - Error taxonomy

pub mod camera;
pub mod error;
pub mod policy;
pub mod role;
pub mod user;
pub mod violation;

pub use camera::{Camera, CameraPatch, CameraStatus};
pub use error::{CoreError, CoreResult};
pub use policy::{authorize, authorize_read, Action};
pub use role::{Identity, Role};
pub use user::{User, UserPatch};
pub use violation::{
    apply, generate_code, CameraViolationInput, ReportInput, Violation, ViolationPatch,
    ViolationSource, ViolationStatus,
};
