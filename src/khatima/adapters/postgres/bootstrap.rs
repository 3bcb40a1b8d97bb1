//! Pool construction and schema bootstrap for the khatima tables.

use super::KhatimaPgPool;
use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use diesel::result::QueryResult;

/// SQL creating the khatima tables, constraints, and indexes.
pub const CREATE_KHATIMA_TABLES_SQL: &str =
    include_str!("../../../../migrations/2026-10-01-000000_create_khatima_tables/up.sql");

/// SQL dropping the khatima tables.
pub const DROP_KHATIMA_TABLES_SQL: &str =
    include_str!("../../../../migrations/2026-10-01-000000_create_khatima_tables/down.sql");

/// Builds a connection pool for `database_url`.
///
/// # Errors
///
/// Returns [`PoolError`] when no initial connection can be established.
pub fn build_pool(database_url: &str, max_size: u32) -> Result<KhatimaPgPool, PoolError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder().max_size(max_size).build(manager)
}

/// Creates the khatima tables on `connection`.
///
/// This is a blocking operation that should be called from `spawn_blocking`
/// or a synchronous context.
///
/// # Errors
///
/// Returns the Diesel error raised by the failing statement, including when
/// the tables already exist.
pub fn apply_schema(connection: &mut PgConnection) -> QueryResult<()> {
    connection.batch_execute(CREATE_KHATIMA_TABLES_SQL)
}
