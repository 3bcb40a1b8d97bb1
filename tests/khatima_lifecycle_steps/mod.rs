//! Step definitions for khatima lifecycle scenarios.

pub mod given;
pub mod then;
pub mod when;
