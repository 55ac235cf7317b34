//! Given steps for monitoring BDD scenarios.

use super::world::{MonitoringWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use serverwatch::{
    inventory::{domain::SettingsUpdate, ports::ConfigStore},
    probe::adapters::scripted::ProbeScript,
};

fn set_enabled(world: &MonitoringWorld, enabled: bool) -> Result<(), eyre::Report> {
    run_async(world.config.set_settings(&SettingsUpdate::new().with_enabled(enabled)))
        .wrap_err("store monitoring settings")?;
    Ok(())
}

#[given("monitoring is enabled")]
fn monitoring_enabled(world: &mut MonitoringWorld) -> Result<(), eyre::Report> {
    set_enabled(world, true)
}

#[given("monitoring is disabled")]
fn monitoring_disabled(world: &mut MonitoringWorld) -> Result<(), eyre::Report> {
    set_enabled(world, false)
}

#[given(r#"a monitored server "{label}""#)]
fn monitored_server(world: &mut MonitoringWorld, label: String) -> Result<(), eyre::Report> {
    world.add_server(&label, true)?;
    Ok(())
}

#[given(r#"a monitored server "{label}" whose command never answers"#)]
fn stuck_server(world: &mut MonitoringWorld, label: String) -> Result<(), eyre::Report> {
    let server = world.add_server(&label, true)?;
    world
        .transport
        .set_script(server.id(), ProbeScript::HangOnCommand);
    Ok(())
}

#[given(r#"a monitored server "{label}" without credentials"#)]
fn server_without_credentials(world: &mut MonitoringWorld, label: String) -> Result<(), eyre::Report> {
    world.add_server(&label, false)?;
    Ok(())
}
