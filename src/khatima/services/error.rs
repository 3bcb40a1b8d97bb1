//! Service-level error taxonomy.

use crate::khatima::{
    domain::{
        KhatimaDomainError, ParseAdminActionError, ProjectId, UnitId, UnitTransitionError, UserId,
    },
    ports::{AuthGateError, ProjectStoreError},
};
use thiserror::Error;

/// Coarse classification of a failure, used by callers to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A project, unit, or invitation code does not exist.
    NotFound,
    /// The caller lacks the required standing.
    Forbidden,
    /// The request collides with current state or a uniqueness rule.
    Conflict,
    /// The request carried malformed input.
    InvalidArgument,
    /// No identity was attached to the request.
    Unauthenticated,
    /// Storage failed; the request may be retried by the caller.
    StoreUnavailable,
}

/// Service-level errors for khatima operations.
#[derive(Debug, Error)]
pub enum KhatimaServiceError {
    /// No identity was attached to the request.
    #[error("request is not authenticated")]
    Unauthenticated,

    /// The project does not exist.
    #[error("khatima not found: {0}")]
    ProjectNotFound(ProjectId),

    /// The unit does not exist.
    #[error("juz' not found: {0}")]
    UnitNotFound(UnitId),

    /// No project matches the invitation code.
    #[error("invalid invitation code: {0}")]
    InvitationNotFound(String),

    /// The caller is not the project admin.
    #[error("user {caller} is not the admin of khatima {project_id}")]
    NotAdmin {
        /// Project the caller tried to administer.
        project_id: ProjectId,
        /// Rejected caller.
        caller: UserId,
    },

    /// No unique invitation code could be allocated.
    #[error("could not allocate a unique invitation code after {0} attempts")]
    InvitationCodesExhausted(usize),

    /// A unit transition was refused.
    #[error(transparent)]
    Transition(#[from] UnitTransitionError),

    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] KhatimaDomainError),

    /// The admin action is not recognised.
    #[error(transparent)]
    InvalidAction(#[from] ParseAdminActionError),

    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] ProjectStoreError),

    /// Auth gate lookup failed.
    #[error(transparent)]
    Gate(#[from] AuthGateError),
}

impl KhatimaServiceError {
    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthenticated => ErrorKind::Unauthenticated,
            Self::ProjectNotFound(_)
            | Self::UnitNotFound(_)
            | Self::InvitationNotFound(_)
            | Self::Store(
                ProjectStoreError::ProjectNotFound(_) | ProjectStoreError::UnitNotFound(_),
            ) => ErrorKind::NotFound,
            Self::NotAdmin { .. } => ErrorKind::Forbidden,
            Self::Transition(err) => {
                if err.rejection.is_conflict() {
                    ErrorKind::Conflict
                } else {
                    ErrorKind::Forbidden
                }
            }
            Self::InvitationCodesExhausted(_)
            | Self::Store(
                ProjectStoreError::DuplicateProjectName(_)
                | ProjectStoreError::DuplicateInvitationCode(_),
            ) => ErrorKind::Conflict,
            Self::Domain(_) | Self::InvalidAction(_) => ErrorKind::InvalidArgument,
            Self::Store(ProjectStoreError::Persistence(_)) | Self::Gate(_) => {
                ErrorKind::StoreUnavailable
            }
        }
    }
}

/// Result type for khatima service operations.
pub type KhatimaServiceResult<T> = Result<T, KhatimaServiceError>;
