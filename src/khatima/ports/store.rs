//! Persistence port for projects, units, and participants.

use crate::khatima::domain::{
    InvitationCode, Project, ProjectId, ProjectName, Unit, UnitId, UserId,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for project store operations.
pub type ProjectStoreResult<T> = Result<T, ProjectStoreError>;

/// Khatima persistence contract.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Finds a project by identifier.
    async fn find_project(&self, id: ProjectId) -> ProjectStoreResult<Option<Project>>;

    /// Finds a project by its unique name.
    async fn find_project_by_name(&self, name: &ProjectName)
    -> ProjectStoreResult<Option<Project>>;

    /// Finds the project an invitation code belongs to.
    async fn find_project_by_invitation_code(
        &self,
        code: &InvitationCode,
    ) -> ProjectStoreResult<Option<Project>>;

    /// Stores a new project with its units and registers the admin as a
    /// participant.
    ///
    /// Either every row becomes visible or none does.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectStoreError::DuplicateProjectName`] or
    /// [`ProjectStoreError::DuplicateInvitationCode`] when a uniqueness
    /// constraint is violated.
    async fn create_project(&self, project: &Project, units: &[Unit]) -> ProjectStoreResult<()>;

    /// Overwrites the completion flag of a project.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectStoreError::ProjectNotFound`] when the project does
    /// not exist.
    async fn update_project_completion(
        &self,
        id: ProjectId,
        is_complete: bool,
    ) -> ProjectStoreResult<()>;

    /// Recomputes and persists a project's completion flag from a single
    /// consistent read of all its units, returning the new value.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectStoreError::ProjectNotFound`] when the project does
    /// not exist.
    async fn recompute_completion(&self, id: ProjectId) -> ProjectStoreResult<bool>;

    /// Renames a project.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectStoreError::DuplicateProjectName`] when another
    /// project already uses the name, or
    /// [`ProjectStoreError::ProjectNotFound`] when the project does not exist.
    async fn rename_project(&self, id: ProjectId, name: &ProjectName) -> ProjectStoreResult<()>;

    /// Finds a unit by identifier.
    async fn find_unit(&self, id: UnitId) -> ProjectStoreResult<Option<Unit>>;

    /// Lists a project's units ordered by number ascending.
    async fn list_units(&self, project_id: ProjectId) -> ProjectStoreResult<Vec<Unit>>;

    /// Claims a unit for `user` only if it is unclaimed and not done.
    ///
    /// Returns `true` when the conditional update applied.
    async fn cas_claim(&self, unit_id: UnitId, user: UserId) -> ProjectStoreResult<bool>;

    /// Sets or clears the claimant of a unit.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectStoreError::UnitNotFound`] when the unit does not
    /// exist.
    async fn set_unit_claim(&self, unit_id: UnitId, user: Option<UserId>)
    -> ProjectStoreResult<()>;

    /// Sets the done flag of a unit, leaving the claimant unchanged, and
    /// recomputes the owning project's completion in the same write.
    ///
    /// Returns the project's completion flag after the write.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectStoreError::UnitNotFound`] when the unit does not
    /// exist. Nothing is written on error.
    async fn set_unit_done(&self, unit_id: UnitId, is_done: bool) -> ProjectStoreResult<bool>;

    /// Clears both the claimant and the done flag of a unit and recomputes
    /// the owning project's completion in the same write.
    ///
    /// Returns the project's completion flag after the write.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectStoreError::UnitNotFound`] when the unit does not
    /// exist. Nothing is written on error.
    async fn reset_unit(&self, unit_id: UnitId) -> ProjectStoreResult<bool>;

    /// Adds a participant; adding an existing participant is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectStoreError::ProjectNotFound`] when the project does
    /// not exist.
    async fn add_participant(&self, user: UserId, project_id: ProjectId)
    -> ProjectStoreResult<()>;

    /// Lists participants of a project in joining order.
    async fn list_participants(&self, project_id: ProjectId) -> ProjectStoreResult<Vec<UserId>>;

    /// Lists every project `user` participates in, oldest first.
    async fn list_projects_for_participant(&self, user: UserId)
    -> ProjectStoreResult<Vec<Project>>;
}

/// Errors returned by project store implementations.
#[derive(Debug, Clone, Error)]
pub enum ProjectStoreError {
    /// Another project already uses the name.
    #[error("duplicate khatima name: {0}")]
    DuplicateProjectName(ProjectName),

    /// Another project already uses the invitation code.
    #[error("duplicate invitation code: {0}")]
    DuplicateInvitationCode(InvitationCode),

    /// The project was not found.
    #[error("khatima not found: {0}")]
    ProjectNotFound(ProjectId),

    /// The unit was not found.
    #[error("juz' not found: {0}")]
    UnitNotFound(UnitId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ProjectStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
