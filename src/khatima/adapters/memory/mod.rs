//! In-memory adapters for khatima persistence.

mod store;

pub use store::InMemoryProjectStore;
