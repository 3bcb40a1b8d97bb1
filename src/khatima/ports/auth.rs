//! Identity and membership port consumed by the khatima services.
//!
//! Sessions and credentials live outside the core. The session layer
//! resolves a [`RequestContext`]; services only ask the gate who the caller
//! is and what standing they have in a project.

use crate::khatima::domain::{ProjectId, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Result type for auth gate operations.
pub type AuthGateResult<T> = Result<T, AuthGateError>;

/// Per-request identity handed over by the session layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    session_user: Option<UserId>,
    request_id: Uuid,
}

impl RequestContext {
    /// Creates a context for a request without a logged-in user.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            session_user: None,
            request_id: Uuid::new_v4(),
        }
    }

    /// Creates a context for a request made by `user`.
    #[must_use]
    pub fn authenticated(user: UserId) -> Self {
        Self {
            session_user: Some(user),
            request_id: Uuid::new_v4(),
        }
    }

    /// Returns the user the session layer resolved, if any.
    #[must_use]
    pub const fn session_user(&self) -> Option<UserId> {
        self.session_user
    }

    /// Returns the identifier used to correlate log events.
    #[must_use]
    pub const fn request_id(&self) -> Uuid {
        self.request_id
    }
}

/// Authorization decisions the core depends on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthGate: Send + Sync {
    /// Returns the caller of the request, if authenticated.
    fn current_user(&self, context: &RequestContext) -> Option<UserId>;

    /// Returns `true` when `user` has joined `project_id`.
    async fn is_participant(&self, user: UserId, project_id: ProjectId) -> AuthGateResult<bool>;

    /// Returns `true` when `user` administers `project_id`.
    async fn is_admin(&self, user: UserId, project_id: ProjectId) -> AuthGateResult<bool>;
}

/// Errors returned by auth gate implementations.
#[derive(Debug, Clone, Error)]
pub enum AuthGateError {
    /// The backend holding membership data failed.
    #[error("identity backend error: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl AuthGateError {
    /// Wraps a backend error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}
