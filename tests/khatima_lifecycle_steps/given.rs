//! Given steps for khatima lifecycle BDD scenarios.

use super::world::{KhatimaWorld, run_async};
use eyre::WrapErr;
use khatma::khatima::services::CreateProjectRequest;
use rstest_bdd_macros::given;

#[given(r#""{admin}" has created a khatima named "{name}""#)]
fn khatima_created(
    world: &mut KhatimaWorld,
    admin: String,
    name: String,
) -> Result<(), eyre::Report> {
    let admin_id = world.user(&admin);
    let project = run_async(
        world
            .service
            .create_project(admin_id, CreateProjectRequest::new(name)),
    )
    .wrap_err("create khatima for scenario")?;
    world.project = Some(project);
    Ok(())
}

#[given(r#""{reader}" has joined the khatima"#)]
fn reader_joined(world: &mut KhatimaWorld, reader: String) -> Result<(), eyre::Report> {
    let reader_id = world.user(&reader);
    let code = world.project()?.invitation_code().clone();
    run_async(world.service.join_project(reader_id, code.as_str()))
        .wrap_err("join khatima for scenario")?;
    Ok(())
}

#[given(r#""{reader}" has claimed juz' {number:u64}"#)]
fn reader_claimed(
    world: &mut KhatimaWorld,
    reader: String,
    number: u64,
) -> Result<(), eyre::Report> {
    let reader_id = world.user(&reader);
    let unit_id = world.unit_id(number)?;
    run_async(world.service.claim_unit(reader_id, unit_id))
        .wrap_err("claim juz' for scenario")?;
    Ok(())
}

#[given(r#""{reader}" has marked juz' {number:u64} done"#)]
fn reader_marked_done(
    world: &mut KhatimaWorld,
    reader: String,
    number: u64,
) -> Result<(), eyre::Report> {
    let reader_id = world.user(&reader);
    let unit_id = world.unit_id(number)?;
    run_async(world.service.mark_unit_done(reader_id, unit_id))
        .wrap_err("mark juz' done for scenario")?;
    Ok(())
}

#[given(r#""{reader}" has finished juz' {first:u64} through {last:u64}"#)]
fn reader_finished_range(
    world: &mut KhatimaWorld,
    reader: String,
    first: u64,
    last: u64,
) -> Result<(), eyre::Report> {
    let reader_id = world.user(&reader);
    for number in first..=last {
        let unit_id = world.unit_id(number)?;
        run_async(world.service.claim_unit(reader_id, unit_id))
            .wrap_err_with(|| format!("claim juz' {number}"))?;
        run_async(world.service.mark_unit_done(reader_id, unit_id))
            .wrap_err_with(|| format!("finish juz' {number}"))?;
    }
    Ok(())
}

#[given(r#""{admin}" has overridden every juz' with "{action}""#)]
fn admin_overrode_all(
    world: &mut KhatimaWorld,
    admin: String,
    action: String,
) -> Result<(), eyre::Report> {
    let admin_id = world.user(&admin);
    for unit in world.units()? {
        run_async(world.service.admin_override(admin_id, unit.id(), &action))
            .wrap_err_with(|| format!("override juz' {}", unit.number()))?;
    }
    world.refresh_project()?;
    Ok(())
}
