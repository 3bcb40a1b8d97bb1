//! Domain model for khatima tracking.
//!
//! A khatima project is split into thirty juz' units. Participants claim
//! open units and mark them done; the project completes when every unit is
//! done. All infrastructure concerns stay outside this boundary.

mod completion;
mod error;
mod ids;
mod project;
mod state;
mod unit;

pub use completion::{KhatimaProgress, all_units_done};
pub use error::{
    KhatimaDomainError, ParseAdminActionError, TransitionRejection, UnitTransitionError,
};
pub use ids::{ProjectId, UnitId, UserId};
pub use project::{InvitationCode, PersistedProjectData, Project, ProjectName};
pub use state::{Actor, AdminAction, UnitState, UnitTransition};
pub use unit::{PersistedUnitData, UNITS_PER_KHATIMA, Unit, UnitNumber};
