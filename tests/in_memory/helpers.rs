//! Shared test helpers for in-memory integration tests.

use std::sync::Arc;

use khatma::khatima::{
    adapters::{StoreAuthGate, UuidInvitationCodes, memory::InMemoryProjectStore},
    domain::{Project, Unit, UnitId, UserId, all_units_done},
    ports::ProjectStore,
    services::{CreateProjectRequest, KhatimaService},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Service type wired to the in-memory store.
pub type TestService = KhatimaService<
    InMemoryProjectStore,
    StoreAuthGate<InMemoryProjectStore>,
    DefaultClock,
    UuidInvitationCodes,
>;

/// Service and the store behind it.
pub struct Harness {
    /// Store shared with the service.
    pub store: Arc<InMemoryProjectStore>,
    /// Service under test.
    pub service: TestService,
}

impl Harness {
    /// Creates a khatima named `name` administered by `admin`.
    ///
    /// # Errors
    ///
    /// Returns an error if creation fails.
    pub async fn khatima(&self, admin: UserId, name: &str) -> Result<Project, eyre::Report> {
        Ok(self
            .service
            .create_project(admin, CreateProjectRequest::new(name))
            .await?)
    }

    /// Loads the units of `project`, ordered by number.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn units(&self, project: &Project) -> Result<Vec<Unit>, eyre::Report> {
        Ok(self.store.list_units(project.id()).await?)
    }

    /// Returns the id of juz' `number` in `project`.
    ///
    /// # Errors
    ///
    /// Returns an error if the unit does not exist.
    pub async fn unit_id(&self, project: &Project, number: u8) -> Result<UnitId, eyre::Report> {
        self.units(project)
            .await?
            .into_iter()
            .find(|unit| unit.number().value() == number)
            .map(|unit| unit.id())
            .ok_or_else(|| eyre::eyre!("juz' {number} missing"))
    }

    /// Checks that the stored completion flag agrees with the unit states.
    ///
    /// # Errors
    ///
    /// Returns an error if the flag and the units disagree.
    pub async fn assert_completion_consistent(
        &self,
        project: &Project,
    ) -> Result<(), eyre::Report> {
        let stored = self
            .store
            .find_project(project.id())
            .await?
            .ok_or_else(|| eyre::eyre!("khatima missing"))?;
        let units = self.units(project).await?;
        eyre::ensure!(
            stored.is_complete() == all_units_done(&units),
            "completion flag {} disagrees with unit states",
            stored.is_complete()
        );
        Ok(())
    }
}

/// Provides a service over a fresh in-memory store.
#[fixture]
pub fn harness() -> Harness {
    let store = Arc::new(InMemoryProjectStore::new());
    let service = KhatimaService::new(
        Arc::clone(&store),
        Arc::new(StoreAuthGate::new(Arc::clone(&store))),
        Arc::new(DefaultClock),
        Arc::new(UuidInvitationCodes),
    );
    Harness { store, service }
}
