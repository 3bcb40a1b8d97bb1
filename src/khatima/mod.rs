//! Khatima group recitation tracking.
//!
//! A khatima is one complete recitation of the Qur'an shared by a group.
//! Each project is split into thirty juz' units that participants claim,
//! release, and mark done; the project completes once every unit is done.
//! The module follows hexagonal architecture:
//!
//! - Domain types and the unit state machine in [`domain`]
//! - Store, identity, and invitation code contracts in [`ports`]
//! - In-memory and `PostgreSQL` implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
