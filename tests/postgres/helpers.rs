//! Shared test helpers for `PostgreSQL` integration tests.

use std::io;
use std::sync::Arc;

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use khatma::khatima::{
    adapters::{
        StoreAuthGate, UuidInvitationCodes,
        postgres::{DROP_KHATIMA_TABLES_SQL, PostgresProjectStore, apply_schema, build_pool},
    },
    services::KhatimaService,
};
use mockable::DefaultClock;
use rstest::fixture;
use uuid::Uuid;

/// Boxed error type for test results.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Environment variable naming the test server.
pub const TEST_DATABASE_ENV: &str = "KHATMA_TEST_DATABASE_URL";

/// Service type wired to the `PostgreSQL` store.
pub type PgService = KhatimaService<
    PostgresProjectStore,
    StoreAuthGate<PostgresProjectStore>,
    DefaultClock,
    UuidInvitationCodes,
>;

/// A schema holding a fresh copy of the khatima tables.
///
/// The tables and the schema are dropped when the value goes out of scope.
pub struct TestSchema {
    base_url: String,
    scoped_url: String,
    name: String,
    /// Store whose connections resolve tables in this schema.
    pub store: Arc<PostgresProjectStore>,
    /// Service over [`Self::store`].
    pub service: PgService,
}

impl TestSchema {
    /// Creates a schema, applies the khatima tables, and opens a pool on it.
    ///
    /// # Errors
    ///
    /// Returns an error if the server is unreachable or the schema cannot be
    /// created.
    pub fn create(base_url: &str) -> Result<Self, BoxError> {
        let name = format!("khatma_test_{}", Uuid::new_v4().simple());
        let scoped_url = scoped_url(base_url, &name);

        let mut admin = PgConnection::establish(base_url)?;
        admin.batch_execute(&format!("CREATE SCHEMA {name}"))?;

        let mut scoped = PgConnection::establish(&scoped_url)?;
        apply_schema(&mut scoped)?;

        let store = Arc::new(PostgresProjectStore::new(build_pool(&scoped_url, 4)?));
        let service = KhatimaService::new(
            Arc::clone(&store),
            Arc::new(StoreAuthGate::new(Arc::clone(&store))),
            Arc::new(DefaultClock),
            Arc::new(UuidInvitationCodes),
        );
        Ok(Self {
            base_url: base_url.to_owned(),
            scoped_url,
            name,
            store,
            service,
        })
    }

    /// Opens a connection that resolves tables in this schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the server is unreachable.
    pub fn connection(&self) -> Result<PgConnection, BoxError> {
        Ok(PgConnection::establish(&self.scoped_url)?)
    }
}

impl Drop for TestSchema {
    fn drop(&mut self) {
        if let Ok(mut scoped) = PgConnection::establish(&self.scoped_url) {
            let _dropped_tables = scoped.batch_execute(DROP_KHATIMA_TABLES_SQL);
        }
        if let Ok(mut admin) = PgConnection::establish(&self.base_url) {
            // Cleanup is best effort; a leftover schema does not affect other tests.
            let _dropped =
                admin.batch_execute(&format!("DROP SCHEMA IF EXISTS {} CASCADE", self.name));
        }
    }
}

/// Appends a `search_path` option so every pooled connection uses `schema`.
fn scoped_url(base_url: &str, schema: &str) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!("{base_url}{separator}options=-csearch_path%3D{schema}")
}

/// Provides a fresh schema on the server named by [`TEST_DATABASE_ENV`].
///
/// # Errors
///
/// Returns an error if the variable is unset or blank, or if the schema
/// cannot be set up.
#[fixture]
pub fn test_schema() -> Result<TestSchema, BoxError> {
    let url = std::env::var(TEST_DATABASE_ENV).unwrap_or_default();
    if url.trim().is_empty() {
        return Err(Box::new(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{TEST_DATABASE_ENV} must name a PostgreSQL server for these tests"),
        )));
    }
    TestSchema::create(url.trim())
}
