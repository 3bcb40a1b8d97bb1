//! Juz' unit entity and its numbering.

use super::{
    Actor, KhatimaDomainError, ProjectId, UnitId, UnitState, UnitTransition, UnitTransitionError,
    UserId,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of units every khatima is divided into.
pub const UNITS_PER_KHATIMA: u8 = 30;

/// Position of a unit within its project, in `1..=30`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct UnitNumber(u8);

impl UnitNumber {
    /// Creates a validated unit number.
    ///
    /// # Errors
    ///
    /// Returns [`KhatimaDomainError::InvalidUnitNumber`] when the value lies
    /// outside `1..=30`.
    pub fn new(value: i64) -> Result<Self, KhatimaDomainError> {
        u8::try_from(value)
            .ok()
            .filter(|number| (1..=UNITS_PER_KHATIMA).contains(number))
            .map(Self)
            .ok_or(KhatimaDomainError::InvalidUnitNumber(value))
    }

    /// Returns every unit number in ascending order.
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=UNITS_PER_KHATIMA).map(Self)
    }

    /// Returns the underlying number.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for UnitNumber {
    type Error = KhatimaDomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UnitNumber> for i64 {
    fn from(number: UnitNumber) -> Self {
        Self::from(number.0)
    }
}

impl fmt::Display for UnitNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the thirty sub-units of a khatima.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    id: UnitId,
    project_id: ProjectId,
    number: UnitNumber,
    state: UnitState,
}

/// Parameter object for reconstructing a persisted unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistedUnitData {
    /// Persisted unit identifier.
    pub id: UnitId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Position within the project.
    pub number: UnitNumber,
    /// Persisted claimant, if any.
    pub claimed_by: Option<UserId>,
    /// Persisted done flag.
    pub is_done: bool,
}

impl Unit {
    /// Creates the full, open unit set for a new project.
    #[must_use]
    pub fn full_set(project_id: ProjectId) -> Vec<Self> {
        UnitNumber::all()
            .map(|number| Self {
                id: UnitId::new(),
                project_id,
                number,
                state: UnitState::Open,
            })
            .collect()
    }

    /// Reconstructs a unit from persisted storage.
    #[must_use]
    pub const fn from_persisted(data: PersistedUnitData) -> Self {
        Self {
            id: data.id,
            project_id: data.project_id,
            number: data.number,
            state: UnitState::from_flags(data.claimed_by, data.is_done),
        }
    }

    /// Returns the unit identifier.
    #[must_use]
    pub const fn id(&self) -> UnitId {
        self.id
    }

    /// Returns the owning project identifier.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the unit number.
    #[must_use]
    pub const fn number(&self) -> UnitNumber {
        self.number
    }

    /// Returns the claim/completion state.
    #[must_use]
    pub const fn state(&self) -> UnitState {
        self.state
    }

    /// Returns the user holding the claim, if any.
    #[must_use]
    pub const fn claimed_by(&self) -> Option<UserId> {
        self.state.claimed_by()
    }

    /// Returns `true` once the unit is finished.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.state.is_done()
    }

    /// Applies a transition in place.
    ///
    /// The unit is left untouched when the transition is refused.
    ///
    /// # Errors
    ///
    /// Returns [`UnitTransitionError`] describing the refused transition.
    pub fn apply(
        &mut self,
        transition: UnitTransition,
        actor: Actor,
    ) -> Result<(), UnitTransitionError> {
        self.state = self
            .state
            .apply(transition, actor)
            .map_err(|rejection| UnitTransitionError {
                unit_id: self.id,
                caller: actor.user(),
                transition,
                rejection,
            })?;
        Ok(())
    }
}
