//! Port contracts for khatima tracking.
//!
//! Ports define infrastructure-agnostic interfaces used by khatima services.

pub mod auth;
pub mod invitation;
pub mod store;

pub use auth::{AuthGate, AuthGateError, AuthGateResult, RequestContext};
pub use invitation::InvitationCodeGenerator;
pub use store::{ProjectStore, ProjectStoreError, ProjectStoreResult};
