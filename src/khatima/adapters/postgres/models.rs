//! Diesel row models for khatima persistence.

use super::schema::{khatima_participants, khatima_projects, khatima_units};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Row of the `khatima_projects` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = khatima_projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProjectRow {
    /// Project identifier.
    pub id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Invitation code.
    pub invitation_code: String,
    /// Admin identifier.
    pub admin_id: uuid::Uuid,
    /// Completion flag.
    pub is_complete: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Row of the `khatima_units` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = khatima_units)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UnitRow {
    /// Unit identifier.
    pub id: uuid::Uuid,
    /// Owning project.
    pub project_id: uuid::Uuid,
    /// Position within the project.
    pub number: i16,
    /// Claimant, if any.
    pub claimed_by: Option<uuid::Uuid>,
    /// Done flag.
    pub is_done: bool,
}

/// Insert model for participant rows; `joined_at` defaults to `NOW()`.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = khatima_participants)]
pub struct NewParticipantRow {
    /// Participating user.
    pub user_id: uuid::Uuid,
    /// Joined project.
    pub project_id: uuid::Uuid,
}
