//! When steps for monitoring BDD scenarios.

use super::world::{MonitoringWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;
use serverwatch::{probe::adapters::scripted::ProbeScript, scheduler::domain::BackgroundTaskId};

#[when("a monitoring pass runs")]
fn monitoring_pass_runs(world: &mut MonitoringWorld) -> Result<(), eyre::Report> {
    world.alerts_before_last_pass = world
        .dispatcher
        .alerts()
        .map_err(|err| eyre::eyre!("read alerts: {err}"))?
        .len();
    let summary = run_async(world.control.run_now())
        .wrap_err("run manual pass")?
        .ok_or_else(|| eyre::eyre!("a pass was already running"))?;
    world.last_summary = Some(summary);
    Ok(())
}

#[when(r#"server "{label}" stops accepting connections"#)]
fn server_stops_accepting(world: &mut MonitoringWorld, label: String) -> Result<(), eyre::Report> {
    let server_id = world.server(&label)?.id();
    world
        .transport
        .set_script(server_id, ProbeScript::RefuseConnection);
    Ok(())
}

#[when("monitoring is enabled")]
fn enable_monitoring(world: &mut MonitoringWorld) -> Result<(), eyre::Report> {
    let outcome = run_async(world.control.set_monitoring_enabled(true)).wrap_err("enable monitoring")?;
    if let Some(warning) = outcome.warning {
        return Err(eyre::eyre!("registration failed: {warning}"));
    }
    Ok(())
}

#[when("the background task wakes up")]
fn background_task_wakes(world: &mut MonitoringWorld) -> Result<(), eyre::Report> {
    let fired = run_async(world.facility.fire(&BackgroundTaskId::monitoring()))
        .map_err(|err| eyre::eyre!("fire wake-up: {err}"))?;
    if !fired {
        return Err(eyre::eyre!("no background task was registered"));
    }
    Ok(())
}
