//! Then steps for monitoring BDD scenarios.

use super::world::{MonitoringWorld, run_async};
use rstest_bdd_macros::then;
use serverwatch::{
    health::domain::{HealthStatus, ServerHealthState},
    monitoring::domain::PassSummary,
};

fn state_of(world: &MonitoringWorld, label: &str) -> Result<ServerHealthState, eyre::Report> {
    let server_id = world.server(label)?.id();
    run_async(world.tracker.current(server_id))
        .map_err(|err| eyre::eyre!("read health state: {err}"))?
        .ok_or_else(|| eyre::eyre!("no health state for '{label}'"))
}

fn last_summary(world: &MonitoringWorld) -> Result<&PassSummary, eyre::Report> {
    world
        .last_summary
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no pass has run in this scenario"))
}

#[then(r#"server "{label}" is "{status}" with {failures:u32} consecutive failures"#)]
fn server_status_is(
    world: &mut MonitoringWorld,
    label: String,
    status: String,
    failures: u32,
) -> Result<(), eyre::Report> {
    let expected = HealthStatus::try_from(status.as_str())?;
    let state = state_of(world, &label)?;
    if state.current_status() != expected {
        return Err(eyre::eyre!(
            "expected '{label}' to be {expected}, found {}",
            state.current_status()
        ));
    }
    if state.consecutive_failures() != failures {
        return Err(eyre::eyre!(
            "expected {failures} consecutive failures, found {}",
            state.consecutive_failures()
        ));
    }
    Ok(())
}

#[then(r#"server "{label}" was previously "{status}""#)]
fn server_previous_status(world: &mut MonitoringWorld, label: String, status: String) -> Result<(), eyre::Report> {
    let expected = HealthStatus::try_from(status.as_str())?;
    let state = state_of(world, &label)?;
    if state.previous_status() != expected {
        return Err(eyre::eyre!(
            "expected previous status {expected}, found {}",
            state.previous_status()
        ));
    }
    Ok(())
}

#[then(r#"the last pass requested {count:usize} "{severity}" alerts"#)]
fn last_pass_alerts(world: &mut MonitoringWorld, count: usize, severity: String) -> Result<(), eyre::Report> {
    let summary = last_summary(world)?;
    if summary.notifications_requested != count || summary.transitions.len() != count {
        return Err(eyre::eyre!(
            "expected {count} alerts and transitions, found {} and {}",
            summary.notifications_requested,
            summary.transitions.len()
        ));
    }
    let alerts = world
        .dispatcher
        .alerts()
        .map_err(|err| eyre::eyre!("read alerts: {err}"))?;
    let matching = alerts
        .iter()
        .skip(world.alerts_before_last_pass)
        .filter(|alert| alert.severity.as_str() == severity)
        .count();
    if matching != count {
        return Err(eyre::eyre!("expected {count} {severity} alerts, found {matching}"));
    }
    Ok(())
}

#[then("the last pass was skipped")]
fn last_pass_skipped(world: &mut MonitoringWorld) -> Result<(), eyre::Report> {
    let summary = last_summary(world)?;
    if !summary.skipped_disabled || summary.servers_checked() != 0 {
        return Err(eyre::eyre!("expected an empty skipped pass, got {summary:?}"));
    }
    Ok(())
}

#[then("no connection was attempted")]
fn no_connection_attempted(world: &mut MonitoringWorld) -> Result<(), eyre::Report> {
    let attempts = world.transport.connect_attempts();
    if attempts != 0 {
        return Err(eyre::eyre!("expected no connections, found {attempts}"));
    }
    Ok(())
}

#[then("no connection is left open")]
fn no_connection_open(world: &mut MonitoringWorld) -> Result<(), eyre::Report> {
    let active = world.transport.active_connections();
    if active != 0 {
        return Err(eyre::eyre!("expected every connection closed, {active} still open"));
    }
    Ok(())
}

#[then("no health state was written")]
fn no_health_state_written(world: &mut MonitoringWorld) -> Result<(), eyre::Report> {
    let writes = world
        .repository
        .write_count()
        .map_err(|err| eyre::eyre!("read write count: {err}"))?;
    if writes != 0 {
        return Err(eyre::eyre!("expected no writes, found {writes}"));
    }
    Ok(())
}

#[then("the background task was registered {count:usize} times")]
fn registered_times(world: &mut MonitoringWorld, count: usize) -> Result<(), eyre::Report> {
    let calls = world
        .facility
        .register_calls()
        .map_err(|err| eyre::eyre!("read register calls: {err}"))?;
    if calls != count {
        return Err(eyre::eyre!("expected {count} registrations, found {calls}"));
    }
    Ok(())
}
