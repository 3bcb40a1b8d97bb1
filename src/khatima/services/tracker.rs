//! Khatima service: project creation, joining, and renaming.
//!
//! Unit transitions live in `units.rs` and read-side views in `views.rs`;
//! all three extend [`KhatimaService`].

use crate::khatima::{
    domain::{Actor, InvitationCode, Project, ProjectId, ProjectName, Unit, UserId},
    ports::{
        AuthGate, InvitationCodeGenerator, ProjectStore, ProjectStoreError, RequestContext,
    },
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{KhatimaServiceError, KhatimaServiceResult};

/// Attempts made to find an unused invitation code before giving up.
pub const MAX_INVITATION_CODE_ATTEMPTS: usize = 5;

/// Request payload for creating a khatima.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProjectRequest {
    name: String,
}

impl CreateProjectRequest {
    /// Creates a request; a blank name yields an untitled khatima.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Khatima orchestration service.
///
/// Holds the injected store, identity gate, clock, and invitation code
/// source. There is no process-wide state.
#[derive(Clone)]
pub struct KhatimaService<S, G, C, K>
where
    S: ProjectStore,
    G: AuthGate,
    C: Clock + Send + Sync,
    K: InvitationCodeGenerator,
{
    pub(super) store: Arc<S>,
    pub(super) gate: Arc<G>,
    clock: Arc<C>,
    codes: Arc<K>,
}

impl<S, G, C, K> KhatimaService<S, G, C, K>
where
    S: ProjectStore,
    G: AuthGate,
    C: Clock + Send + Sync,
    K: InvitationCodeGenerator,
{
    /// Creates a new khatima service.
    #[must_use]
    pub const fn new(store: Arc<S>, gate: Arc<G>, clock: Arc<C>, codes: Arc<K>) -> Self {
        Self {
            store,
            gate,
            clock,
            codes,
        }
    }

    /// Resolves the caller of a request.
    ///
    /// # Errors
    ///
    /// Returns [`KhatimaServiceError::Unauthenticated`] when the session
    /// layer attached no user.
    pub fn authenticate(&self, context: &RequestContext) -> KhatimaServiceResult<UserId> {
        self.gate.current_user(context).ok_or_else(|| {
            debug!(request_id = %context.request_id(), "request without session user");
            KhatimaServiceError::Unauthenticated
        })
    }

    /// Creates a khatima administered by `caller` with thirty open units.
    ///
    /// The project, its units, and the admin's membership are stored
    /// atomically. A fresh invitation code is drawn again when the store
    /// reports a collision.
    ///
    /// # Errors
    ///
    /// Returns [`KhatimaServiceError::Store`] with
    /// [`ProjectStoreError::DuplicateProjectName`] when the name is taken,
    /// [`KhatimaServiceError::InvitationCodesExhausted`] when every code
    /// attempt collided, or [`KhatimaServiceError::Domain`] when the name is
    /// too long.
    pub async fn create_project(
        &self,
        caller: UserId,
        request: CreateProjectRequest,
    ) -> KhatimaServiceResult<Project> {
        let name = ProjectName::or_untitled(request.name)?;
        if self.store.find_project_by_name(&name).await?.is_some() {
            warn!(%caller, name = %name, "khatima name already taken");
            return Err(ProjectStoreError::DuplicateProjectName(name).into());
        }

        for attempt in 1..=MAX_INVITATION_CODE_ATTEMPTS {
            let project = Project::new(name.clone(), caller, self.codes.generate(), &*self.clock);
            let units = Unit::full_set(project.id());
            match self.store.create_project(&project, &units).await {
                Ok(()) => {
                    info!(
                        project_id = %project.id(),
                        admin = %caller,
                        name = %project.name(),
                        "khatima created"
                    );
                    return Ok(project);
                }
                Err(ProjectStoreError::DuplicateInvitationCode(code)) => {
                    debug!(attempt, %code, "invitation code collision, drawing another");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(KhatimaServiceError::InvitationCodesExhausted(
            MAX_INVITATION_CODE_ATTEMPTS,
        ))
    }

    /// Adds `caller` to the khatima owning `invitation_code`.
    ///
    /// Joining a project twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`KhatimaServiceError::InvitationNotFound`] when no project
    /// matches the code, including codes that are not well formed.
    pub async fn join_project(
        &self,
        caller: UserId,
        invitation_code: &str,
    ) -> KhatimaServiceResult<Project> {
        let Ok(code) = InvitationCode::new(invitation_code) else {
            return Err(KhatimaServiceError::InvitationNotFound(
                invitation_code.trim().to_owned(),
            ));
        };
        let project = self
            .store
            .find_project_by_invitation_code(&code)
            .await?
            .ok_or_else(|| KhatimaServiceError::InvitationNotFound(code.to_string()))?;

        self.store.add_participant(caller, project.id()).await?;
        info!(project_id = %project.id(), user = %caller, "participant joined khatima");
        Ok(project)
    }

    /// Renames a khatima.
    ///
    /// # Errors
    ///
    /// Returns [`KhatimaServiceError::NotAdmin`] when `caller` does not
    /// administer the project, [`KhatimaServiceError::Domain`] when the new
    /// name is blank or too long, and [`KhatimaServiceError::Store`] with
    /// [`ProjectStoreError::DuplicateProjectName`] when another project uses
    /// the name.
    pub async fn rename_project(
        &self,
        caller: UserId,
        project_id: ProjectId,
        new_name: &str,
    ) -> KhatimaServiceResult<Project> {
        let mut project = self.load_project(project_id).await?;
        self.require_admin(caller, &project).await?;

        let name = ProjectName::new(new_name)?;
        self.store.rename_project(project_id, &name).await?;
        info!(%project_id, from = %project.name(), to = %name, "khatima renamed");
        project.rename(name);
        Ok(project)
    }

    pub(super) async fn load_project(&self, id: ProjectId) -> KhatimaServiceResult<Project> {
        self.store
            .find_project(id)
            .await?
            .ok_or(KhatimaServiceError::ProjectNotFound(id))
    }

    pub(super) async fn actor_for(
        &self,
        caller: UserId,
        project: &Project,
    ) -> KhatimaServiceResult<Actor> {
        if self.gate.is_admin(caller, project.id()).await? {
            Ok(Actor::admin(caller))
        } else {
            Ok(Actor::participant(caller))
        }
    }

    pub(super) async fn require_admin(
        &self,
        caller: UserId,
        project: &Project,
    ) -> KhatimaServiceResult<Actor> {
        let actor = self.actor_for(caller, project).await?;
        if !actor.is_admin() {
            warn!(project_id = %project.id(), %caller, "admin action refused");
            return Err(KhatimaServiceError::NotAdmin {
                project_id: project.id(),
                caller,
            });
        }
        Ok(actor)
    }
}
