//! Error types for khatima domain validation and state transitions.

use super::{UnitId, UnitTransition, UserId};
use thiserror::Error;

/// Errors returned while constructing khatima domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KhatimaDomainError {
    /// The project name is empty after trimming.
    #[error("khatima name must not be empty")]
    EmptyProjectName,

    /// The project name exceeds the 255-character storage limit.
    #[error("khatima name exceeds 255 character limit: {0}")]
    ProjectNameTooLong(String),

    /// The invitation code is empty, too long, or not alphanumeric.
    #[error("invalid invitation code '{0}'")]
    InvalidInvitationCode(String),

    /// The unit number lies outside `1..=30`.
    #[error("invalid juz' number {0}, expected 1 to 30")]
    InvalidUnitNumber(i64),
}

/// Error returned while parsing an admin override action.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown admin action '{0}', expected unclaim, mark_done, or reset")]
pub struct ParseAdminActionError(pub String);

/// Reason a unit state transition was refused.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum TransitionRejection {
    /// The unit is already claimed or already done.
    #[error("the juz' is already claimed or finished")]
    AlreadyTaken,

    /// The caller does not hold the claim on the unit.
    #[error("the caller has not claimed this juz'")]
    NotClaimant,

    /// The caller neither holds the claim nor administers the project.
    #[error("only the claimant or the khatima admin may mark this juz' done")]
    NotClaimantOrAdmin,

    /// The transition is reserved for the project admin.
    #[error("only the khatima admin may override this juz'")]
    AdminRequired,
}

impl TransitionRejection {
    /// Returns `true` when the rejection stems from unit state rather than
    /// caller permissions.
    #[must_use]
    pub const fn is_conflict(self) -> bool {
        matches!(self, Self::AlreadyTaken)
    }
}

/// A refused unit transition, with enough context to report it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("user {caller} cannot {transition} juz' {unit_id}: {rejection}")]
pub struct UnitTransitionError {
    /// Unit the transition targeted.
    pub unit_id: UnitId,
    /// Caller that requested the transition.
    pub caller: UserId,
    /// Requested transition.
    pub transition: UnitTransition,
    /// Why the transition was refused.
    pub rejection: TransitionRejection,
}
