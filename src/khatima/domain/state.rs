//! Unit claim/completion state machine.
//!
//! A unit is persisted as two independent columns (`claimed_by`, `is_done`).
//! Inside the domain those flags are folded into [`UnitState`], and every
//! change goes through [`UnitState::apply`], which either yields the next
//! state or a [`TransitionRejection`].

use super::{ParseAdminActionError, TransitionRejection, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Claim and completion state of a single unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum UnitState {
    /// Unclaimed and not done.
    Open,
    /// Reserved by a participant, not yet done.
    Claimed {
        /// User holding the claim.
        by: UserId,
    },
    /// Finished. The claimant is retained unless it was cleared.
    Done {
        /// User that held the claim when the unit was finished, if any.
        by: Option<UserId>,
    },
}

impl UnitState {
    /// Folds persisted flags into a state.
    #[must_use]
    pub const fn from_flags(claimed_by: Option<UserId>, is_done: bool) -> Self {
        match (claimed_by, is_done) {
            (by, true) => Self::Done { by },
            (Some(by), false) => Self::Claimed { by },
            (None, false) => Self::Open,
        }
    }

    /// Returns the user holding the claim, if any.
    #[must_use]
    pub const fn claimed_by(self) -> Option<UserId> {
        match self {
            Self::Open => None,
            Self::Claimed { by } => Some(by),
            Self::Done { by } => by,
        }
    }

    /// Returns `true` once the unit has been finished.
    #[must_use]
    pub const fn is_done(self) -> bool {
        matches!(self, Self::Done { .. })
    }

    /// Returns `true` when the unit can be claimed.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }

    /// Applies a transition on behalf of `actor`.
    ///
    /// The function is total: every state/transition pair either produces
    /// the next state or a rejection.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionRejection::AlreadyTaken`] when claiming a unit that
    /// is not open, [`TransitionRejection::NotClaimant`] when someone other
    /// than the claimant unclaims, [`TransitionRejection::NotClaimantOrAdmin`]
    /// when marking done without holding the claim or administering the
    /// project, and [`TransitionRejection::AdminRequired`] for overrides by
    /// non-admins.
    pub fn apply(
        self,
        transition: UnitTransition,
        actor: Actor,
    ) -> Result<Self, TransitionRejection> {
        match transition {
            UnitTransition::Claim => match self {
                Self::Open => Ok(Self::Claimed { by: actor.user }),
                Self::Claimed { .. } | Self::Done { .. } => Err(TransitionRejection::AlreadyTaken),
            },
            UnitTransition::Unclaim => {
                if self.claimed_by() != Some(actor.user) {
                    return Err(TransitionRejection::NotClaimant);
                }
                // The done flag survives an unclaim.
                Ok(Self::from_flags(None, self.is_done()))
            }
            UnitTransition::MarkDone => {
                if self.claimed_by() != Some(actor.user) && !actor.is_admin {
                    return Err(TransitionRejection::NotClaimantOrAdmin);
                }
                Ok(Self::Done {
                    by: self.claimed_by(),
                })
            }
            UnitTransition::Override(action) => {
                if !actor.is_admin {
                    return Err(TransitionRejection::AdminRequired);
                }
                Ok(match action {
                    AdminAction::Unclaim => Self::from_flags(None, self.is_done()),
                    AdminAction::MarkDone => Self::Done {
                        by: self.claimed_by(),
                    },
                    AdminAction::Reset => Self::Open,
                })
            }
        }
    }
}

/// Caller of a transition together with its standing in the owning project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    user: UserId,
    is_admin: bool,
}

impl Actor {
    /// Creates an actor for a participant without admin rights.
    #[must_use]
    pub const fn participant(user: UserId) -> Self {
        Self {
            user,
            is_admin: false,
        }
    }

    /// Creates an actor for the project admin.
    #[must_use]
    pub const fn admin(user: UserId) -> Self {
        Self {
            user,
            is_admin: true,
        }
    }

    /// Returns the acting user.
    #[must_use]
    pub const fn user(self) -> UserId {
        self.user
    }

    /// Returns `true` when the actor administers the owning project.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        self.is_admin
    }
}

/// Transition requested on a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitTransition {
    /// Reserve an open unit for the caller.
    Claim,
    /// Release the caller's own claim.
    Unclaim,
    /// Finish the unit as claimant or admin.
    MarkDone,
    /// Admin override bypassing claim ownership.
    Override(AdminAction),
}

impl UnitTransition {
    /// Returns `true` when the transition may change the unit's done flag,
    /// and therefore the owning project's completion.
    #[must_use]
    pub const fn touches_done(self) -> bool {
        matches!(
            self,
            Self::MarkDone | Self::Override(AdminAction::MarkDone | AdminAction::Reset)
        )
    }
}

impl fmt::Display for UnitTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Claim => f.write_str("claim"),
            Self::Unclaim => f.write_str("unclaim"),
            Self::MarkDone => f.write_str("mark done"),
            Self::Override(action) => write!(f, "override ({})", action.as_str()),
        }
    }
}

/// Privileged actions available to the project admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminAction {
    /// Clear the claim, keeping the done flag.
    Unclaim,
    /// Finish the unit regardless of who holds it.
    MarkDone,
    /// Clear both claim and done flag.
    Reset,
}

impl AdminAction {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unclaim => "unclaim",
            Self::MarkDone => "mark_done",
            Self::Reset => "reset",
        }
    }
}

impl TryFrom<&str> for AdminAction {
    type Error = ParseAdminActionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "unclaim" => Ok(Self::Unclaim),
            "mark_done" => Ok(Self::MarkDone),
            "reset" => Ok(Self::Reset),
            _ => Err(ParseAdminActionError(value.to_owned())),
        }
    }
}
