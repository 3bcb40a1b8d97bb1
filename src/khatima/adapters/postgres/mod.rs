//! `PostgreSQL` adapters for khatima persistence.

mod bootstrap;
mod models;
mod repository;
mod schema;

pub use bootstrap::{
    CREATE_KHATIMA_TABLES_SQL, DROP_KHATIMA_TABLES_SQL, apply_schema, build_pool,
};
pub use repository::{KhatimaPgPool, PostgresProjectStore};
