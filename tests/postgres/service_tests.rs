//! Service flows over the `PostgreSQL` store.

use khatma::khatima::{
    domain::{UnitState, UserId},
    ports::ProjectStore,
    services::{CreateProjectRequest, ErrorKind},
};
use rstest::rstest;

use crate::postgres::helpers::{BoxError, TestSchema, test_schema};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
#[ignore = "needs a PostgreSQL server at KHATMA_TEST_DATABASE_URL"]
async fn postgres_khatima_completes_and_reopens(
    test_schema: Result<TestSchema, BoxError>,
) -> Result<(), BoxError> {
    let schema = test_schema?;
    let admin = UserId::new();
    let reader = UserId::new();
    let project = schema
        .service
        .create_project(admin, CreateProjectRequest::new("Ramadan2024"))
        .await?;
    schema
        .service
        .join_project(reader, project.invitation_code().as_str())
        .await?;

    let units = schema.store.list_units(project.id()).await?;
    let fifth = units.get(4).map(|unit| unit.id()).ok_or("juz' 5 present")?;
    let claim = schema.service.claim_unit(reader, fifth).await?;
    assert_eq!(claim.unit.state(), UnitState::Claimed { by: reader });

    let mut last_update = None;
    for unit in &units {
        last_update = Some(schema.service.mark_unit_done(admin, unit.id()).await?);
    }
    let completed = last_update.ok_or("at least one update")?;
    assert!(completed.project.is_complete());

    let reset = schema.service.admin_override(admin, fifth, "reset").await?;
    assert!(!reset.project.is_complete());
    let stored = schema
        .store
        .find_project(project.id())
        .await?
        .ok_or("khatima stored")?;
    assert!(!stored.is_complete());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
#[ignore = "needs a PostgreSQL server at KHATMA_TEST_DATABASE_URL"]
async fn postgres_second_claim_conflicts(
    test_schema: Result<TestSchema, BoxError>,
) -> Result<(), BoxError> {
    let schema = test_schema?;
    let admin = UserId::new();
    let project = schema
        .service
        .create_project(admin, CreateProjectRequest::new("Conflicts"))
        .await?;
    let unit = schema
        .store
        .list_units(project.id())
        .await?
        .first()
        .map(|unit| unit.id())
        .ok_or("units present")?;

    schema.service.claim_unit(UserId::new(), unit).await?;
    let result = schema.service.claim_unit(UserId::new(), unit).await;

    assert_eq!(result.err().map(|err| err.kind()), Some(ErrorKind::Conflict));
    Ok(())
}
