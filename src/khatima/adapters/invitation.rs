//! Default invitation code source.

use crate::khatima::{domain::InvitationCode, ports::InvitationCodeGenerator};
use uuid::Uuid;

/// Generates eight-character hex codes from random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidInvitationCodes;

impl InvitationCodeGenerator for UuidInvitationCodes {
    fn generate(&self) -> InvitationCode {
        InvitationCode::from_uuid(Uuid::new_v4())
    }
}
