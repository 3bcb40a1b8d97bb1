//! End-to-end walkthrough of a single khatima.

use super::helpers::{Harness, harness};
use eyre::ensure;
use khatma::khatima::domain::{UnitState, UserId};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn ramadan_khatima_completes_on_thirtieth_unit(harness: Harness) -> eyre::Result<()> {
    let admin = UserId::new();
    let reader = UserId::new();

    let project = harness.khatima(admin, "Ramadan2024").await?;
    let units = harness.units(&project).await?;
    ensure!(units.len() == 30, "thirty units");
    ensure!(units.iter().all(|unit| unit.state().is_open()), "all open");

    harness
        .service
        .join_project(reader, project.invitation_code().as_str())
        .await?;

    let fifth = harness.unit_id(&project, 5).await?;
    let claim = harness.service.claim_unit(reader, fifth).await?;
    ensure!(
        claim.unit.state() == UnitState::Claimed { by: reader },
        "juz' 5 claimed by the reader"
    );

    let done = harness.service.mark_unit_done(admin, fifth).await?;
    ensure!(done.unit.is_done(), "admin finished a claimed juz'");
    ensure!(!done.project.is_complete(), "29 juz' remain");
    let detail = harness.service.project_detail(admin, project.id()).await?;
    ensure!(detail.progress.remaining() == 29, "29 remaining");

    let others: Vec<_> = harness
        .units(&project)
        .await?
        .into_iter()
        .filter(|unit| unit.id() != fifth)
        .collect();
    let (last, rest) = others
        .split_last()
        .ok_or_else(|| eyre::eyre!("units present"))?;
    for unit in rest {
        let update = harness.service.mark_unit_done(admin, unit.id()).await?;
        ensure!(!update.project.is_complete(), "incomplete before the 30th");
    }
    let thirtieth = harness.service.mark_unit_done(admin, last.id()).await?;
    ensure!(thirtieth.project.is_complete(), "complete on the 30th");

    let repeat = harness.service.mark_unit_done(admin, last.id()).await?;
    ensure!(repeat.project.is_complete(), "stays complete on repeats");
    harness.assert_completion_consistent(&project).await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reset_on_complete_khatima_touches_only_one_unit(harness: Harness) -> eyre::Result<()> {
    let admin = UserId::new();
    let project = harness.khatima(admin, "Reset Check").await?;
    for unit in harness.units(&project).await? {
        harness
            .service
            .admin_override(admin, unit.id(), "mark_done")
            .await?;
    }

    let target = harness.unit_id(&project, 17).await?;
    let update = harness.service.admin_override(admin, target, "reset").await?;

    ensure!(!update.project.is_complete(), "reset reopens");
    let units = harness.units(&project).await?;
    for unit in &units {
        if unit.id() == target {
            ensure!(unit.state() == UnitState::Open, "target cleared");
        } else {
            ensure!(unit.is_done(), "juz' {} untouched", unit.number());
        }
    }
    harness.assert_completion_consistent(&project).await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn dashboard_moves_khatima_to_finished_once_complete(
    harness: Harness,
) -> eyre::Result<()> {
    let admin = UserId::new();
    let reader = UserId::new();
    let project = harness.khatima(admin, "Dashboard Flow").await?;
    harness
        .service
        .join_project(reader, project.invitation_code().as_str())
        .await?;

    let before = harness.service.dashboard(reader).await?;
    ensure!(before.joined.len() == 1 && before.finished.is_empty(), "joined");

    for unit in harness.units(&project).await? {
        harness.service.mark_unit_done(admin, unit.id()).await?;
    }

    let reader_view = harness.service.dashboard(reader).await?;
    let admin_view = harness.service.dashboard(admin).await?;
    ensure!(reader_view.joined.is_empty(), "no longer joined-incomplete");
    ensure!(reader_view.finished.len() == 1, "finished for reader");
    ensure!(admin_view.owned.is_empty(), "no longer owned-incomplete");
    ensure!(admin_view.finished.len() == 1, "finished for admin");
    Ok(())
}
