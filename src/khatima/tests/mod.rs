//! Unit tests for the khatima module.
