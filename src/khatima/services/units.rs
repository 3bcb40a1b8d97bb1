//! Unit claim, release, completion, and admin override.

use crate::khatima::{
    domain::{
        Actor, AdminAction, Project, TransitionRejection, Unit, UnitId, UnitTransition,
        UnitTransitionError, UserId,
    },
    ports::{AuthGate, InvitationCodeGenerator, ProjectStore},
};
use mockable::Clock;
use tracing::{info, warn};

use super::{KhatimaService, KhatimaServiceError, KhatimaServiceResult};

/// A unit after a successful transition, with its owning project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitUpdate {
    /// Unit in its new state.
    pub unit: Unit,
    /// Owning project, with completion recomputed when the done flag moved.
    pub project: Project,
}

impl<S, G, C, K> KhatimaService<S, G, C, K>
where
    S: ProjectStore,
    G: AuthGate,
    C: Clock + Send + Sync,
    K: InvitationCodeGenerator,
{
    /// Claims an open unit for `caller`.
    ///
    /// Two racing claims resolve at the store: only one conditional update
    /// applies, the other caller sees a conflict.
    ///
    /// # Errors
    ///
    /// Returns [`KhatimaServiceError::Transition`] with
    /// [`TransitionRejection::AlreadyTaken`] when the unit is claimed or done.
    pub async fn claim_unit(
        &self,
        caller: UserId,
        unit_id: UnitId,
    ) -> KhatimaServiceResult<UnitUpdate> {
        self.transition(caller, unit_id, UnitTransition::Claim).await
    }

    /// Releases `caller`'s claim on a unit. The done flag is kept.
    ///
    /// # Errors
    ///
    /// Returns [`KhatimaServiceError::Transition`] with
    /// [`TransitionRejection::NotClaimant`] when `caller` does not hold the
    /// claim.
    pub async fn unclaim_unit(
        &self,
        caller: UserId,
        unit_id: UnitId,
    ) -> KhatimaServiceResult<UnitUpdate> {
        self.transition(caller, unit_id, UnitTransition::Unclaim).await
    }

    /// Marks a unit done as its claimant or as the project admin, then
    /// recomputes project completion.
    ///
    /// # Errors
    ///
    /// Returns [`KhatimaServiceError::Transition`] with
    /// [`TransitionRejection::NotClaimantOrAdmin`] for any other caller.
    pub async fn mark_unit_done(
        &self,
        caller: UserId,
        unit_id: UnitId,
    ) -> KhatimaServiceResult<UnitUpdate> {
        self.transition(caller, unit_id, UnitTransition::MarkDone).await
    }

    /// Applies an admin override named by `action` (`unclaim`, `mark_done`,
    /// or `reset`, case-insensitive).
    ///
    /// Authorization is checked before the action is parsed.
    ///
    /// # Errors
    ///
    /// Returns [`KhatimaServiceError::NotAdmin`] when `caller` does not
    /// administer the owning project and
    /// [`KhatimaServiceError::InvalidAction`] for an unknown action.
    pub async fn admin_override(
        &self,
        caller: UserId,
        unit_id: UnitId,
        action: &str,
    ) -> KhatimaServiceResult<UnitUpdate> {
        let (unit, project) = self.load_unit_with_project(unit_id).await?;
        let actor = self.require_admin(caller, &project).await?;
        let parsed = AdminAction::try_from(action)?;
        self.apply_transition(unit, project, actor, UnitTransition::Override(parsed))
            .await
    }

    async fn transition(
        &self,
        caller: UserId,
        unit_id: UnitId,
        transition: UnitTransition,
    ) -> KhatimaServiceResult<UnitUpdate> {
        let (unit, project) = self.load_unit_with_project(unit_id).await?;
        let actor = self.actor_for(caller, &project).await?;
        self.apply_transition(unit, project, actor, transition).await
    }

    async fn apply_transition(
        &self,
        mut unit: Unit,
        mut project: Project,
        actor: Actor,
        transition: UnitTransition,
    ) -> KhatimaServiceResult<UnitUpdate> {
        if let Err(err) = unit.apply(transition, actor) {
            warn!(
                unit_id = %unit.id(),
                caller = %actor.user(),
                %transition,
                rejection = %err.rejection,
                "juz' transition refused"
            );
            return Err(err.into());
        }

        if let Some(is_complete) = self.persist_transition(&unit, actor, transition).await? {
            if is_complete != project.is_complete() {
                info!(project_id = %project.id(), is_complete, "khatima completion changed");
            }
            project.set_complete(is_complete);
        }

        info!(
            project_id = %project.id(),
            unit = %unit.number(),
            caller = %actor.user(),
            %transition,
            "juz' updated"
        );
        Ok(UnitUpdate { unit, project })
    }

    /// Writes the transition, returning the recomputed completion flag when
    /// the done flag was written.
    async fn persist_transition(
        &self,
        unit: &Unit,
        actor: Actor,
        transition: UnitTransition,
    ) -> KhatimaServiceResult<Option<bool>> {
        let completion = match transition {
            UnitTransition::Claim => {
                if !self.store.cas_claim(unit.id(), actor.user()).await? {
                    warn!(unit_id = %unit.id(), caller = %actor.user(), "lost claim race");
                    return Err(UnitTransitionError {
                        unit_id: unit.id(),
                        caller: actor.user(),
                        transition,
                        rejection: TransitionRejection::AlreadyTaken,
                    }
                    .into());
                }
                None
            }
            UnitTransition::Unclaim | UnitTransition::Override(AdminAction::Unclaim) => {
                self.store.set_unit_claim(unit.id(), None).await?;
                None
            }
            UnitTransition::MarkDone | UnitTransition::Override(AdminAction::MarkDone) => {
                Some(self.store.set_unit_done(unit.id(), true).await?)
            }
            UnitTransition::Override(AdminAction::Reset) => {
                Some(self.store.reset_unit(unit.id()).await?)
            }
        };
        Ok(completion)
    }

    async fn load_unit_with_project(
        &self,
        unit_id: UnitId,
    ) -> KhatimaServiceResult<(Unit, Project)> {
        let unit = self
            .store
            .find_unit(unit_id)
            .await?
            .ok_or(KhatimaServiceError::UnitNotFound(unit_id))?;
        let project = self.load_project(unit.project_id()).await?;
        Ok((unit, project))
    }
}
