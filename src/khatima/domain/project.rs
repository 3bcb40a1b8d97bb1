//! Khatima project aggregate and its validated scalar types.

use super::{KhatimaDomainError, ProjectId, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Maximum length for a project name, matching the `VARCHAR(255)` column.
const MAX_NAME_LENGTH: usize = 255;

/// Maximum accepted length for an invitation code.
const MAX_INVITATION_CODE_LENGTH: usize = 32;

/// Length of generated invitation codes.
const GENERATED_INVITATION_CODE_LENGTH: usize = 8;

/// Unique, trimmed display name of a khatima.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectName(String);

impl ProjectName {
    /// Name given to projects created without one.
    pub const UNTITLED: &'static str = "Untitled Khatima";

    /// Creates a validated project name.
    ///
    /// # Errors
    ///
    /// Returns [`KhatimaDomainError::EmptyProjectName`] when the value is
    /// blank, or [`KhatimaDomainError::ProjectNameTooLong`] when it exceeds
    /// 255 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, KhatimaDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(KhatimaDomainError::EmptyProjectName);
        }
        if trimmed.chars().count() > MAX_NAME_LENGTH {
            return Err(KhatimaDomainError::ProjectNameTooLong(raw));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Creates a name, substituting [`Self::UNTITLED`] for blank input.
    ///
    /// # Errors
    ///
    /// Returns [`KhatimaDomainError::ProjectNameTooLong`] when the value
    /// exceeds 255 characters.
    pub fn or_untitled(value: impl Into<String>) -> Result<Self, KhatimaDomainError> {
        match Self::new(value) {
            Err(KhatimaDomainError::EmptyProjectName) => Self::new(Self::UNTITLED),
            other => other,
        }
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ProjectName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Short token granting join access to a project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvitationCode(String);

impl InvitationCode {
    /// Parses a code supplied by a caller.
    ///
    /// # Errors
    ///
    /// Returns [`KhatimaDomainError::InvalidInvitationCode`] when the trimmed
    /// value is empty, longer than 32 characters, or contains anything other
    /// than ASCII alphanumerics.
    pub fn new(value: impl Into<String>) -> Result<Self, KhatimaDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        let is_valid = !trimmed.is_empty()
            && trimmed.len() <= MAX_INVITATION_CODE_LENGTH
            && trimmed.chars().all(|c| c.is_ascii_alphanumeric());
        if !is_valid {
            return Err(KhatimaDomainError::InvalidInvitationCode(raw));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Derives a code from the leading characters of a UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        let simple = uuid.simple().to_string();
        Self(simple.chars().take(GENERATED_INVITATION_CODE_LENGTH).collect())
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for InvitationCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for InvitationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Khatima aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    id: ProjectId,
    name: ProjectName,
    invitation_code: InvitationCode,
    admin_id: UserId,
    is_complete: bool,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedProjectData {
    /// Persisted project identifier.
    pub id: ProjectId,
    /// Persisted display name.
    pub name: ProjectName,
    /// Persisted invitation code.
    pub invitation_code: InvitationCode,
    /// Creator and admin of the project.
    pub admin_id: UserId,
    /// Persisted completion flag.
    pub is_complete: bool,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// Creates a new, incomplete project administered by `admin_id`.
    #[must_use]
    pub fn new(
        name: ProjectName,
        admin_id: UserId,
        invitation_code: InvitationCode,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: ProjectId::new(),
            name,
            invitation_code,
            admin_id,
            is_complete: false,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a project from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedProjectData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            invitation_code: data.invitation_code,
            admin_id: data.admin_id,
            is_complete: data.is_complete,
            created_at: data.created_at,
        }
    }

    /// Returns the project identifier.
    #[must_use]
    pub const fn id(&self) -> ProjectId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub const fn name(&self) -> &ProjectName {
        &self.name
    }

    /// Returns the invitation code.
    #[must_use]
    pub const fn invitation_code(&self) -> &InvitationCode {
        &self.invitation_code
    }

    /// Returns the admin's identifier.
    #[must_use]
    pub const fn admin_id(&self) -> UserId {
        self.admin_id
    }

    /// Returns `true` when `user` administers this project.
    #[must_use]
    pub fn is_admin(&self, user: UserId) -> bool {
        self.admin_id == user
    }

    /// Returns `true` once every unit is done.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.is_complete
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Replaces the display name.
    pub fn rename(&mut self, name: ProjectName) {
        self.name = name;
    }

    /// Records the recomputed completion flag.
    pub const fn set_complete(&mut self, is_complete: bool) {
        self.is_complete = is_complete;
    }
}
