//! Read-side views: project detail and the per-user dashboard.

use crate::khatima::{
    domain::{KhatimaProgress, Project, ProjectId, Unit, UserId},
    ports::{AuthGate, InvitationCodeGenerator, ProjectStore},
};
use mockable::Clock;
use serde::Serialize;
use tracing::debug;

use super::{KhatimaService, KhatimaServiceResult};

/// Standing of the viewer within a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewerRole {
    /// Administers the project.
    Admin,
    /// Joined the project.
    Participant,
    /// Neither joined nor administers it.
    Visitor,
}

/// Everything needed to render a single khatima.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KhatimaDetail {
    /// The project.
    pub project: Project,
    /// Units ordered by number.
    pub units: Vec<Unit>,
    /// Unit tallies.
    pub progress: KhatimaProgress,
    /// Members of the project, admin included.
    pub participants: Vec<UserId>,
    /// How the viewer relates to the project.
    pub viewer_role: ViewerRole,
}

/// A user's projects, split the way the dashboard shows them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    /// Incomplete projects the user administers.
    pub owned: Vec<Project>,
    /// Incomplete projects the user joined but does not administer.
    pub joined: Vec<Project>,
    /// Completed projects the user belongs to.
    pub finished: Vec<Project>,
}

impl Dashboard {
    fn from_memberships(user: UserId, projects: Vec<Project>) -> Self {
        projects
            .into_iter()
            .fold(Self::default(), |mut dashboard, project| {
                if project.is_complete() {
                    dashboard.finished.push(project);
                } else if project.is_admin(user) {
                    dashboard.owned.push(project);
                } else {
                    dashboard.joined.push(project);
                }
                dashboard
            })
    }
}

impl<S, G, C, K> KhatimaService<S, G, C, K>
where
    S: ProjectStore,
    G: AuthGate,
    C: Clock + Send + Sync,
    K: InvitationCodeGenerator,
{
    /// Loads a project with its units and progress as seen by `viewer`.
    ///
    /// # Errors
    ///
    /// Returns [`super::KhatimaServiceError::ProjectNotFound`] when the
    /// project does not exist.
    pub async fn project_detail(
        &self,
        viewer: UserId,
        project_id: ProjectId,
    ) -> KhatimaServiceResult<KhatimaDetail> {
        let project = self.load_project(project_id).await?;
        let units = self.store.list_units(project_id).await?;
        let participants = self.store.list_participants(project_id).await?;

        let viewer_role = if self.gate.is_admin(viewer, project_id).await? {
            ViewerRole::Admin
        } else if self.gate.is_participant(viewer, project_id).await? {
            ViewerRole::Participant
        } else {
            ViewerRole::Visitor
        };

        Ok(KhatimaDetail {
            progress: KhatimaProgress::from_units(&units),
            project,
            units,
            participants,
            viewer_role,
        })
    }

    /// Builds the dashboard for `user`.
    ///
    /// # Errors
    ///
    /// Returns [`super::KhatimaServiceError::Store`] when the store fails.
    pub async fn dashboard(&self, user: UserId) -> KhatimaServiceResult<Dashboard> {
        let projects = self.store.list_projects_for_participant(user).await?;
        let dashboard = Dashboard::from_memberships(user, projects);
        debug!(
            %user,
            owned = dashboard.owned.len(),
            joined = dashboard.joined.len(),
            finished = dashboard.finished.len(),
            "dashboard built"
        );
        Ok(dashboard)
    }
}
