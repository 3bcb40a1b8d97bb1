//! Application services orchestrating khatima projects and their units.

mod error;
mod tracker;
mod units;
mod views;

pub use error::{ErrorKind, KhatimaServiceError, KhatimaServiceResult};
pub use tracker::{CreateProjectRequest, KhatimaService, MAX_INVITATION_CODE_ATTEMPTS};
pub use units::UnitUpdate;
pub use views::{Dashboard, KhatimaDetail, ViewerRole};
