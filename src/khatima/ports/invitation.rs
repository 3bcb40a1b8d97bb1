//! Source of fresh invitation codes.

use crate::khatima::domain::InvitationCode;

/// Generates candidate invitation codes for new projects.
///
/// Uniqueness is enforced by the store; a generator only needs to make
/// collisions unlikely.
#[cfg_attr(test, mockall::automock)]
pub trait InvitationCodeGenerator: Send + Sync {
    /// Returns a new candidate code.
    fn generate(&self) -> InvitationCode;
}
