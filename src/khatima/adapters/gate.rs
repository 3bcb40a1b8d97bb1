//! Auth gate backed by the project store.

use async_trait::async_trait;
use std::sync::Arc;

use crate::khatima::{
    domain::{ProjectId, UserId},
    ports::{AuthGate, AuthGateError, AuthGateResult, ProjectStore, RequestContext},
};

/// [`AuthGate`] that trusts the session-resolved identity and answers
/// membership questions from a [`ProjectStore`].
#[derive(Debug, Clone)]
pub struct StoreAuthGate<S>
where
    S: ProjectStore,
{
    store: Arc<S>,
}

impl<S> StoreAuthGate<S>
where
    S: ProjectStore,
{
    /// Creates a gate reading membership from `store`.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S> AuthGate for StoreAuthGate<S>
where
    S: ProjectStore,
{
    fn current_user(&self, context: &RequestContext) -> Option<UserId> {
        context.session_user()
    }

    async fn is_participant(&self, user: UserId, project_id: ProjectId) -> AuthGateResult<bool> {
        let participants = self
            .store
            .list_participants(project_id)
            .await
            .map_err(AuthGateError::backend)?;
        Ok(participants.contains(&user))
    }

    async fn is_admin(&self, user: UserId, project_id: ProjectId) -> AuthGateResult<bool> {
        let project = self
            .store
            .find_project(project_id)
            .await
            .map_err(AuthGateError::backend)?;
        Ok(project.is_some_and(|found| found.is_admin(user)))
    }
}
