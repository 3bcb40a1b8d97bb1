//! In-memory project store for tests and single-process use.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::khatima::{
    domain::{
        InvitationCode, PersistedUnitData, Project, ProjectId, ProjectName, Unit, UnitId, UserId,
        all_units_done,
    },
    ports::{ProjectStore, ProjectStoreError, ProjectStoreResult},
};

/// Thread-safe in-memory project store.
///
/// Every multi-step write happens under a single write guard, which gives
/// the same atomicity the `PostgreSQL` adapter gets from transactions.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProjectStore {
    state: Arc<RwLock<InMemoryStoreState>>,
}

#[derive(Debug, Default)]
struct InMemoryStoreState {
    projects: HashMap<ProjectId, Project>,
    name_index: HashMap<ProjectName, ProjectId>,
    invitation_index: HashMap<InvitationCode, ProjectId>,
    units: HashMap<UnitId, PersistedUnitData>,
    participants: Vec<(UserId, ProjectId)>,
}

impl InMemoryProjectStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> ProjectStoreResult<RwLockReadGuard<'_, InMemoryStoreState>> {
        self.state.read().map_err(|err| {
            ProjectStoreError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> ProjectStoreResult<RwLockWriteGuard<'_, InMemoryStoreState>> {
        self.state.write().map_err(|err| {
            ProjectStoreError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

impl InMemoryStoreState {
    fn project_mut(&mut self, id: ProjectId) -> ProjectStoreResult<&mut Project> {
        self.projects
            .get_mut(&id)
            .ok_or(ProjectStoreError::ProjectNotFound(id))
    }

    fn unit_mut(&mut self, id: UnitId) -> ProjectStoreResult<&mut PersistedUnitData> {
        self.units
            .get_mut(&id)
            .ok_or(ProjectStoreError::UnitNotFound(id))
    }

    fn units_of(&self, project_id: ProjectId) -> Vec<Unit> {
        let mut units: Vec<Unit> = self
            .units
            .values()
            .filter(|data| data.project_id == project_id)
            .map(|&data| Unit::from_persisted(data))
            .collect();
        units.sort_by_key(Unit::number);
        units
    }

    fn recompute(&mut self, project_id: ProjectId) -> ProjectStoreResult<bool> {
        let is_complete = all_units_done(&self.units_of(project_id));
        self.project_mut(project_id)?.set_complete(is_complete);
        Ok(is_complete)
    }

    /// Applies `change` to a unit and recomputes its project's completion.
    fn change_done_flag(
        &mut self,
        unit_id: UnitId,
        change: impl FnOnce(&mut PersistedUnitData),
    ) -> ProjectStoreResult<bool> {
        let project_id = self.unit_mut(unit_id)?.project_id;
        if !self.projects.contains_key(&project_id) {
            return Err(ProjectStoreError::ProjectNotFound(project_id));
        }
        change(self.unit_mut(unit_id)?);
        self.recompute(project_id)
    }

    fn is_participant(&self, user: UserId, project_id: ProjectId) -> bool {
        self.participants
            .iter()
            .any(|&(member, project)| member == user && project == project_id)
    }
}

#[async_trait]
impl ProjectStore for InMemoryProjectStore {
    async fn find_project(&self, id: ProjectId) -> ProjectStoreResult<Option<Project>> {
        let state = self.read()?;
        Ok(state.projects.get(&id).cloned())
    }

    async fn find_project_by_name(
        &self,
        name: &ProjectName,
    ) -> ProjectStoreResult<Option<Project>> {
        let state = self.read()?;
        Ok(state
            .name_index
            .get(name)
            .and_then(|id| state.projects.get(id))
            .cloned())
    }

    async fn find_project_by_invitation_code(
        &self,
        code: &InvitationCode,
    ) -> ProjectStoreResult<Option<Project>> {
        let state = self.read()?;
        Ok(state
            .invitation_index
            .get(code)
            .and_then(|id| state.projects.get(id))
            .cloned())
    }

    async fn create_project(&self, project: &Project, units: &[Unit]) -> ProjectStoreResult<()> {
        let mut state = self.write()?;
        if state.name_index.contains_key(project.name()) {
            return Err(ProjectStoreError::DuplicateProjectName(
                project.name().clone(),
            ));
        }
        if state
            .invitation_index
            .contains_key(project.invitation_code())
        {
            return Err(ProjectStoreError::DuplicateInvitationCode(
                project.invitation_code().clone(),
            ));
        }

        state
            .name_index
            .insert(project.name().clone(), project.id());
        state
            .invitation_index
            .insert(project.invitation_code().clone(), project.id());
        for unit in units {
            let data = PersistedUnitData {
                id: unit.id(),
                project_id: project.id(),
                number: unit.number(),
                claimed_by: unit.claimed_by(),
                is_done: unit.is_done(),
            };
            state.units.insert(unit.id(), data);
        }
        if !state.is_participant(project.admin_id(), project.id()) {
            state.participants.push((project.admin_id(), project.id()));
        }
        state.projects.insert(project.id(), project.clone());
        Ok(())
    }

    async fn update_project_completion(
        &self,
        id: ProjectId,
        is_complete: bool,
    ) -> ProjectStoreResult<()> {
        let mut state = self.write()?;
        state.project_mut(id)?.set_complete(is_complete);
        Ok(())
    }

    async fn recompute_completion(&self, id: ProjectId) -> ProjectStoreResult<bool> {
        let mut state = self.write()?;
        state.recompute(id)
    }

    async fn rename_project(&self, id: ProjectId, name: &ProjectName) -> ProjectStoreResult<()> {
        let mut state = self.write()?;
        if state
            .name_index
            .get(name)
            .is_some_and(|&owner| owner != id)
        {
            return Err(ProjectStoreError::DuplicateProjectName(name.clone()));
        }

        let project = state.project_mut(id)?;
        let previous = project.name().clone();
        project.rename(name.clone());
        state.name_index.remove(&previous);
        state.name_index.insert(name.clone(), id);
        Ok(())
    }

    async fn find_unit(&self, id: UnitId) -> ProjectStoreResult<Option<Unit>> {
        let state = self.read()?;
        Ok(state.units.get(&id).map(|&data| Unit::from_persisted(data)))
    }

    async fn list_units(&self, project_id: ProjectId) -> ProjectStoreResult<Vec<Unit>> {
        let state = self.read()?;
        Ok(state.units_of(project_id))
    }

    async fn cas_claim(&self, unit_id: UnitId, user: UserId) -> ProjectStoreResult<bool> {
        let mut state = self.write()?;
        let Some(data) = state.units.get_mut(&unit_id) else {
            return Ok(false);
        };
        if data.claimed_by.is_some() || data.is_done {
            return Ok(false);
        }
        data.claimed_by = Some(user);
        Ok(true)
    }

    async fn set_unit_claim(
        &self,
        unit_id: UnitId,
        user: Option<UserId>,
    ) -> ProjectStoreResult<()> {
        let mut state = self.write()?;
        state.unit_mut(unit_id)?.claimed_by = user;
        Ok(())
    }

    async fn set_unit_done(&self, unit_id: UnitId, is_done: bool) -> ProjectStoreResult<bool> {
        let mut state = self.write()?;
        state.change_done_flag(unit_id, |data| data.is_done = is_done)
    }

    async fn reset_unit(&self, unit_id: UnitId) -> ProjectStoreResult<bool> {
        let mut state = self.write()?;
        state.change_done_flag(unit_id, |data| {
            data.claimed_by = None;
            data.is_done = false;
        })
    }

    async fn add_participant(
        &self,
        user: UserId,
        project_id: ProjectId,
    ) -> ProjectStoreResult<()> {
        let mut state = self.write()?;
        if !state.projects.contains_key(&project_id) {
            return Err(ProjectStoreError::ProjectNotFound(project_id));
        }
        if !state.is_participant(user, project_id) {
            state.participants.push((user, project_id));
        }
        Ok(())
    }

    async fn list_participants(&self, project_id: ProjectId) -> ProjectStoreResult<Vec<UserId>> {
        let state = self.read()?;
        Ok(state
            .participants
            .iter()
            .filter(|&&(_, project)| project == project_id)
            .map(|&(user, _)| user)
            .collect())
    }

    async fn list_projects_for_participant(
        &self,
        user: UserId,
    ) -> ProjectStoreResult<Vec<Project>> {
        let state = self.read()?;
        let mut projects: Vec<Project> = state
            .participants
            .iter()
            .filter(|&&(member, _)| member == user)
            .filter_map(|(_, project_id)| state.projects.get(project_id).cloned())
            .collect();
        projects.sort_by_key(Project::created_at);
        Ok(projects)
    }
}
