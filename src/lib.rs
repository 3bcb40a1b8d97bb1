//! Khatma: group recitation tracking.
//!
//! A group shares one complete recitation of the Qur'an (a khatima). Each
//! khatima is divided into thirty juz' units that members claim, release,
//! and mark done; the khatima completes when every unit is done.
//!
//! # Architecture
//!
//! Khatma follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for storage and identity
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`)
//!
//! # Modules
//!
//! - [`khatima`]: Projects, units, and the services that orchestrate them
//! - [`config`]: Environment-driven runtime configuration
//! - [`telemetry`]: Tracing subscriber setup

pub mod config;
pub mod khatima;
pub mod telemetry;
