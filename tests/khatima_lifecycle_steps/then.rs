//! Then steps for khatima lifecycle BDD scenarios.

use super::world::{KhatimaWorld, run_async};
use khatma::khatima::{domain::UnitState, ports::ProjectStore, services::ErrorKind};
use rstest_bdd_macros::then;

fn expect_failure(world: &KhatimaWorld, expected: ErrorKind) -> Result<(), eyre::Report> {
    let result = world
        .last_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing request result"))?;
    match result {
        Err(err) if err.kind() == expected => Ok(()),
        other => Err(eyre::eyre!("expected {expected:?} failure, got {other:?}")),
    }
}

#[then("the request succeeds")]
fn request_succeeds(world: &KhatimaWorld) -> Result<(), eyre::Report> {
    match world.last_result {
        Some(Ok(())) => Ok(()),
        ref other => Err(eyre::eyre!("expected success, got {other:?}")),
    }
}

#[then("the request fails with a conflict")]
fn request_conflicts(world: &KhatimaWorld) -> Result<(), eyre::Report> {
    expect_failure(world, ErrorKind::Conflict)
}

#[then("the request is forbidden")]
fn request_forbidden(world: &KhatimaWorld) -> Result<(), eyre::Report> {
    expect_failure(world, ErrorKind::Forbidden)
}

#[then("the request fails as not found")]
fn request_not_found(world: &KhatimaWorld) -> Result<(), eyre::Report> {
    expect_failure(world, ErrorKind::NotFound)
}

#[then("the khatima has {count:u64} open juz'")]
fn khatima_has_open_units(world: &KhatimaWorld, count: u64) -> Result<(), eyre::Report> {
    let units = world.units()?;
    let open = units.iter().filter(|unit| unit.state().is_open()).count();
    if u64::try_from(open)? != count || units.len() != open {
        return Err(eyre::eyre!(
            "expected {count} open juz' out of {count}, found {open} of {}",
            units.len()
        ));
    }
    Ok(())
}

#[then("the khatima is complete")]
fn khatima_complete(world: &mut KhatimaWorld) -> Result<(), eyre::Report> {
    if !world.refresh_project()?.is_complete() {
        return Err(eyre::eyre!("expected the khatima to be complete"));
    }
    Ok(())
}

#[then("the khatima is not complete")]
fn khatima_not_complete(world: &mut KhatimaWorld) -> Result<(), eyre::Report> {
    if world.refresh_project()?.is_complete() {
        return Err(eyre::eyre!("expected the khatima to be incomplete"));
    }
    Ok(())
}

#[then(r#""{admin}" is the only participant"#)]
fn only_participant(world: &KhatimaWorld, admin: String) -> Result<(), eyre::Report> {
    let admin_id = world.known_user(&admin)?;
    let participants = run_async(world.store.list_participants(world.project()?.id()))?;
    if participants != vec![admin_id] {
        return Err(eyre::eyre!(
            "expected only {admin} to participate, found {participants:?}"
        ));
    }
    Ok(())
}

#[then(r#"juz' {number:u64} is claimed by "{reader}""#)]
fn unit_claimed_by(
    world: &KhatimaWorld,
    number: u64,
    reader: String,
) -> Result<(), eyre::Report> {
    let reader_id = world.known_user(&reader)?;
    let state = world.unit(number)?.state();
    if state != (UnitState::Claimed { by: reader_id }) {
        return Err(eyre::eyre!(
            "expected juz' {number} claimed by {reader}, found {state:?}"
        ));
    }
    Ok(())
}

#[then("juz' {number:u64} is open")]
fn unit_open(world: &KhatimaWorld, number: u64) -> Result<(), eyre::Report> {
    let state = world.unit(number)?.state();
    if !state.is_open() {
        return Err(eyre::eyre!("expected juz' {number} open, found {state:?}"));
    }
    Ok(())
}

#[then("juz' {number:u64} is done")]
fn unit_done(world: &KhatimaWorld, number: u64) -> Result<(), eyre::Report> {
    if !world.unit(number)?.is_done() {
        return Err(eyre::eyre!("expected juz' {number} to be done"));
    }
    Ok(())
}

#[then("juz' {number:u64} is not done")]
fn unit_not_done(world: &KhatimaWorld, number: u64) -> Result<(), eyre::Report> {
    if world.unit(number)?.is_done() {
        return Err(eyre::eyre!("expected juz' {number} to be unfinished"));
    }
    Ok(())
}

#[then(r#"the khatima is listed as finished for "{user}""#)]
fn listed_as_finished(world: &KhatimaWorld, user: String) -> Result<(), eyre::Report> {
    let user_id = world.known_user(&user)?;
    let project_id = world.project()?.id();
    let dashboard = run_async(world.service.dashboard(user_id))?;
    if !dashboard.finished.iter().any(|project| project.id() == project_id) {
        return Err(eyre::eyre!("khatima missing from {user}'s finished list"));
    }
    Ok(())
}
