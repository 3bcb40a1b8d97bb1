//! Adapter implementations for khatima ports.

pub mod gate;
pub mod invitation;
pub mod memory;
pub mod postgres;

pub use gate::StoreAuthGate;
pub use invitation::UuidInvitationCodes;
