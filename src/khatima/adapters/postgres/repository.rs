//! `PostgreSQL` project store.

use super::{
    models::{NewParticipantRow, ProjectRow, UnitRow},
    schema::{khatima_participants, khatima_projects, khatima_units},
};
use crate::khatima::{
    domain::{
        InvitationCode, PersistedProjectData, PersistedUnitData, Project, ProjectId, ProjectName,
        Unit, UnitId, UnitNumber, UserId, all_units_done,
    },
    ports::{ProjectStore, ProjectStoreError, ProjectStoreResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by khatima adapters.
pub type KhatimaPgPool = Pool<ConnectionManager<PgConnection>>;

const PROJECT_NAME_UNIQUE: &str = "khatima_projects_name_key";
const INVITATION_CODE_UNIQUE: &str = "khatima_projects_invitation_code_key";

/// `PostgreSQL`-backed project store.
#[derive(Debug, Clone)]
pub struct PostgresProjectStore {
    pool: KhatimaPgPool,
}

impl PostgresProjectStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: KhatimaPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> ProjectStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> ProjectStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(ProjectStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(ProjectStoreError::persistence)?
    }
}

impl From<DieselError> for ProjectStoreError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl ProjectStore for PostgresProjectStore {
    async fn find_project(&self, id: ProjectId) -> ProjectStoreResult<Option<Project>> {
        self.run_blocking(move |connection| {
            let row = khatima_projects::table
                .find(id.into_inner())
                .select(ProjectRow::as_select())
                .first::<ProjectRow>(connection)
                .optional()?;
            row.map(row_to_project).transpose()
        })
        .await
    }

    async fn find_project_by_name(
        &self,
        name: &ProjectName,
    ) -> ProjectStoreResult<Option<Project>> {
        let lookup = name.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = khatima_projects::table
                .filter(khatima_projects::name.eq(lookup))
                .select(ProjectRow::as_select())
                .first::<ProjectRow>(connection)
                .optional()?;
            row.map(row_to_project).transpose()
        })
        .await
    }

    async fn find_project_by_invitation_code(
        &self,
        code: &InvitationCode,
    ) -> ProjectStoreResult<Option<Project>> {
        let lookup = code.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = khatima_projects::table
                .filter(khatima_projects::invitation_code.eq(lookup))
                .select(ProjectRow::as_select())
                .first::<ProjectRow>(connection)
                .optional()?;
            row.map(row_to_project).transpose()
        })
        .await
    }

    async fn create_project(&self, project: &Project, units: &[Unit]) -> ProjectStoreResult<()> {
        let project_row = to_project_row(project);
        let unit_rows: Vec<UnitRow> = units.iter().map(to_unit_row).collect();
        let admin_row = NewParticipantRow {
            user_id: project.admin_id().into_inner(),
            project_id: project.id().into_inner(),
        };
        let name = project.name().clone();
        let code = project.invitation_code().clone();

        self.run_blocking(move |connection| {
            connection.transaction::<_, ProjectStoreError, _>(|tx| {
                diesel::insert_into(khatima_projects::table)
                    .values(&project_row)
                    .execute(tx)
                    .map_err(|err| map_project_unique_violation(err, &name, Some(&code)))?;
                diesel::insert_into(khatima_units::table)
                    .values(&unit_rows)
                    .execute(tx)?;
                diesel::insert_into(khatima_participants::table)
                    .values(&admin_row)
                    .on_conflict_do_nothing()
                    .execute(tx)?;
                Ok(())
            })
        })
        .await
    }

    async fn update_project_completion(
        &self,
        id: ProjectId,
        is_complete: bool,
    ) -> ProjectStoreResult<()> {
        self.run_blocking(move |connection| {
            let updated = diesel::update(khatima_projects::table.find(id.into_inner()))
                .set(khatima_projects::is_complete.eq(is_complete))
                .execute(connection)?;
            require_row(updated, ProjectStoreError::ProjectNotFound(id))
        })
        .await
    }

    async fn recompute_completion(&self, id: ProjectId) -> ProjectStoreResult<bool> {
        self.run_blocking(move |connection| {
            connection.transaction::<_, ProjectStoreError, _>(|tx| recompute_locked(tx, id))
        })
        .await
    }

    async fn rename_project(&self, id: ProjectId, name: &ProjectName) -> ProjectStoreResult<()> {
        let new_name = name.clone();
        self.run_blocking(move |connection| {
            let updated = diesel::update(khatima_projects::table.find(id.into_inner()))
                .set(khatima_projects::name.eq(new_name.as_str()))
                .execute(connection)
                .map_err(|err| map_project_unique_violation(err, &new_name, None))?;
            require_row(updated, ProjectStoreError::ProjectNotFound(id))
        })
        .await
    }

    async fn find_unit(&self, id: UnitId) -> ProjectStoreResult<Option<Unit>> {
        self.run_blocking(move |connection| {
            let row = khatima_units::table
                .find(id.into_inner())
                .select(UnitRow::as_select())
                .first::<UnitRow>(connection)
                .optional()?;
            row.map(row_to_unit).transpose()
        })
        .await
    }

    async fn list_units(&self, project_id: ProjectId) -> ProjectStoreResult<Vec<Unit>> {
        self.run_blocking(move |connection| load_units(connection, project_id))
            .await
    }

    async fn cas_claim(&self, unit_id: UnitId, user: UserId) -> ProjectStoreResult<bool> {
        self.run_blocking(move |connection| {
            let updated = diesel::update(
                khatima_units::table
                    .filter(khatima_units::id.eq(unit_id.into_inner()))
                    .filter(khatima_units::claimed_by.is_null())
                    .filter(khatima_units::is_done.eq(false)),
            )
            .set(khatima_units::claimed_by.eq(Some(user.into_inner())))
            .execute(connection)?;
            Ok(updated == 1)
        })
        .await
    }

    async fn set_unit_claim(
        &self,
        unit_id: UnitId,
        user: Option<UserId>,
    ) -> ProjectStoreResult<()> {
        self.run_blocking(move |connection| {
            let updated = diesel::update(khatima_units::table.find(unit_id.into_inner()))
                .set(khatima_units::claimed_by.eq(user.map(UserId::into_inner)))
                .execute(connection)?;
            require_row(updated, ProjectStoreError::UnitNotFound(unit_id))
        })
        .await
    }

    async fn set_unit_done(&self, unit_id: UnitId, is_done: bool) -> ProjectStoreResult<bool> {
        self.run_blocking(move |connection| {
            connection.transaction::<_, ProjectStoreError, _>(|tx| {
                let project_id = diesel::update(khatima_units::table.find(unit_id.into_inner()))
                    .set(khatima_units::is_done.eq(is_done))
                    .returning(khatima_units::project_id)
                    .get_result::<uuid::Uuid>(tx)
                    .optional()?
                    .ok_or(ProjectStoreError::UnitNotFound(unit_id))?;
                recompute_locked(tx, ProjectId::from_uuid(project_id))
            })
        })
        .await
    }

    async fn reset_unit(&self, unit_id: UnitId) -> ProjectStoreResult<bool> {
        self.run_blocking(move |connection| {
            connection.transaction::<_, ProjectStoreError, _>(|tx| {
                let project_id = diesel::update(khatima_units::table.find(unit_id.into_inner()))
                    .set((
                        khatima_units::claimed_by.eq(None::<uuid::Uuid>),
                        khatima_units::is_done.eq(false),
                    ))
                    .returning(khatima_units::project_id)
                    .get_result::<uuid::Uuid>(tx)
                    .optional()?
                    .ok_or(ProjectStoreError::UnitNotFound(unit_id))?;
                recompute_locked(tx, ProjectId::from_uuid(project_id))
            })
        })
        .await
    }

    async fn add_participant(
        &self,
        user: UserId,
        project_id: ProjectId,
    ) -> ProjectStoreResult<()> {
        let row = NewParticipantRow {
            user_id: user.into_inner(),
            project_id: project_id.into_inner(),
        };
        self.run_blocking(move |connection| {
            diesel::insert_into(khatima_participants::table)
                .values(&row)
                .on_conflict_do_nothing()
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        ProjectStoreError::ProjectNotFound(project_id)
                    }
                    _ => ProjectStoreError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn list_participants(&self, project_id: ProjectId) -> ProjectStoreResult<Vec<UserId>> {
        self.run_blocking(move |connection| {
            let users = khatima_participants::table
                .filter(khatima_participants::project_id.eq(project_id.into_inner()))
                .order((
                    khatima_participants::joined_at.asc(),
                    khatima_participants::user_id.asc(),
                ))
                .select(khatima_participants::user_id)
                .load::<uuid::Uuid>(connection)?;
            Ok(users.into_iter().map(UserId::from_uuid).collect())
        })
        .await
    }

    async fn list_projects_for_participant(
        &self,
        user: UserId,
    ) -> ProjectStoreResult<Vec<Project>> {
        self.run_blocking(move |connection| {
            let rows = khatima_projects::table
                .inner_join(khatima_participants::table)
                .filter(khatima_participants::user_id.eq(user.into_inner()))
                .order(khatima_projects::created_at.asc())
                .select(ProjectRow::as_select())
                .load::<ProjectRow>(connection)?;
            rows.into_iter().map(row_to_project).collect()
        })
        .await
    }
}

fn load_units(
    connection: &mut PgConnection,
    project_id: ProjectId,
) -> ProjectStoreResult<Vec<Unit>> {
    let rows = khatima_units::table
        .filter(khatima_units::project_id.eq(project_id.into_inner()))
        .order(khatima_units::number.asc())
        .select(UnitRow::as_select())
        .load::<UnitRow>(connection)?;
    rows.into_iter().map(row_to_unit).collect()
}

/// Recomputes a project's completion flag; call inside a transaction.
fn recompute_locked(connection: &mut PgConnection, id: ProjectId) -> ProjectStoreResult<bool> {
    // Lock the project row so concurrent recomputations serialize.
    let locked = khatima_projects::table
        .find(id.into_inner())
        .select(khatima_projects::id)
        .for_update()
        .first::<uuid::Uuid>(connection)
        .optional()?;
    if locked.is_none() {
        return Err(ProjectStoreError::ProjectNotFound(id));
    }

    let units = load_units(connection, id)?;
    let is_complete = all_units_done(&units);
    diesel::update(khatima_projects::table.find(id.into_inner()))
        .set(khatima_projects::is_complete.eq(is_complete))
        .execute(connection)?;
    Ok(is_complete)
}

fn require_row(updated: usize, missing: ProjectStoreError) -> ProjectStoreResult<()> {
    if updated == 0 {
        return Err(missing);
    }
    Ok(())
}

fn to_project_row(project: &Project) -> ProjectRow {
    ProjectRow {
        id: project.id().into_inner(),
        name: project.name().as_str().to_owned(),
        invitation_code: project.invitation_code().as_str().to_owned(),
        admin_id: project.admin_id().into_inner(),
        is_complete: project.is_complete(),
        created_at: project.created_at(),
    }
}

fn to_unit_row(unit: &Unit) -> UnitRow {
    UnitRow {
        id: unit.id().into_inner(),
        project_id: unit.project_id().into_inner(),
        number: i16::from(unit.number().value()),
        claimed_by: unit.claimed_by().map(UserId::into_inner),
        is_done: unit.is_done(),
    }
}

fn row_to_project(row: ProjectRow) -> ProjectStoreResult<Project> {
    let ProjectRow {
        id,
        name,
        invitation_code,
        admin_id,
        is_complete,
        created_at,
    } = row;

    let data = PersistedProjectData {
        id: ProjectId::from_uuid(id),
        name: ProjectName::new(name).map_err(ProjectStoreError::persistence)?,
        invitation_code: InvitationCode::new(invitation_code)
            .map_err(ProjectStoreError::persistence)?,
        admin_id: UserId::from_uuid(admin_id),
        is_complete,
        created_at,
    };
    Ok(Project::from_persisted(data))
}

fn row_to_unit(row: UnitRow) -> ProjectStoreResult<Unit> {
    let number =
        UnitNumber::new(i64::from(row.number)).map_err(ProjectStoreError::persistence)?;
    Ok(Unit::from_persisted(PersistedUnitData {
        id: UnitId::from_uuid(row.id),
        project_id: ProjectId::from_uuid(row.project_id),
        number,
        claimed_by: row.claimed_by.map(UserId::from_uuid),
        is_done: row.is_done,
    }))
}

fn map_project_unique_violation(
    err: DieselError,
    name: &ProjectName,
    code: Option<&InvitationCode>,
) -> ProjectStoreError {
    let constraint = match &err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            info.constraint_name().map(str::to_owned)
        }
        _ => None,
    };
    match (constraint.as_deref(), code) {
        (Some(INVITATION_CODE_UNIQUE), Some(duplicate)) => {
            ProjectStoreError::DuplicateInvitationCode(duplicate.clone())
        }
        (Some(PROJECT_NAME_UNIQUE), _) => ProjectStoreError::DuplicateProjectName(name.clone()),
        _ => ProjectStoreError::persistence(err),
    }
}
