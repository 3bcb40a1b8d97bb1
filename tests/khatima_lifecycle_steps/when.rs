//! When steps for khatima lifecycle BDD scenarios.

use super::world::{KhatimaWorld, run_async};
use rstest_bdd_macros::when;

#[when(r#""{reader}" claims juz' {number:u64}"#)]
fn reader_claims(
    world: &mut KhatimaWorld,
    reader: String,
    number: u64,
) -> Result<(), eyre::Report> {
    let reader_id = world.user(&reader);
    let unit_id = world.unit_id(number)?;
    let result = run_async(world.service.claim_unit(reader_id, unit_id));
    world.last_result = Some(result.map(|_| ()));
    Ok(())
}

#[when(r#""{reader}" unclaims juz' {number:u64}"#)]
fn reader_unclaims(
    world: &mut KhatimaWorld,
    reader: String,
    number: u64,
) -> Result<(), eyre::Report> {
    let reader_id = world.user(&reader);
    let unit_id = world.unit_id(number)?;
    let result = run_async(world.service.unclaim_unit(reader_id, unit_id));
    world.last_result = Some(result.map(|_| ()));
    Ok(())
}

#[when(r#""{reader}" marks juz' {number:u64} done"#)]
fn reader_marks_done(
    world: &mut KhatimaWorld,
    reader: String,
    number: u64,
) -> Result<(), eyre::Report> {
    let reader_id = world.user(&reader);
    let unit_id = world.unit_id(number)?;
    let result = run_async(world.service.mark_unit_done(reader_id, unit_id));
    if let Ok(ref update) = result {
        world.project = Some(update.project.clone());
    }
    world.last_result = Some(result.map(|_| ()));
    Ok(())
}

#[when(r#""{caller}" overrides juz' {number:u64} with "{action}""#)]
fn caller_overrides(
    world: &mut KhatimaWorld,
    caller: String,
    number: u64,
    action: String,
) -> Result<(), eyre::Report> {
    let caller_id = world.user(&caller);
    let unit_id = world.unit_id(number)?;
    let result = run_async(world.service.admin_override(caller_id, unit_id, &action));
    if let Ok(ref update) = result {
        world.project = Some(update.project.clone());
    }
    world.last_result = Some(result.map(|_| ()));
    Ok(())
}

#[when(r#""{reader}" joins with invitation code "{code}""#)]
fn reader_joins_with_code(world: &mut KhatimaWorld, reader: String, code: String) {
    let reader_id = world.user(&reader);
    let result = run_async(world.service.join_project(reader_id, &code));
    world.last_result = Some(result.map(|_| ()));
}
