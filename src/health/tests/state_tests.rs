//! State folding and transition rules.

use crate::health::domain::{HealthCheckResult, HealthStatus, ServerHealthState};
use crate::inventory::domain::ServerId;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rstest::{fixture, rstest};

#[fixture]
fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn result_for(status: HealthStatus, at: DateTime<Utc>) -> HealthCheckResult {
    if status.is_healthy() {
        HealthCheckResult::healthy(42, at)
    } else {
        HealthCheckResult::new(status, at)
    }
}

#[rstest]
fn first_healthy_result_is_a_recovery_from_unknown(epoch: DateTime<Utc>) {
    let server_id = ServerId::new();
    let mut state = ServerHealthState::initial(server_id);

    let event = state
        .apply(&HealthCheckResult::healthy(12, epoch))
        .expect("first healthy result should transition");

    assert_eq!(event.from, HealthStatus::Unknown);
    assert_eq!(event.to, HealthStatus::Healthy);
    assert_eq!(event.server_id, server_id);
    assert_eq!(event.timestamp, epoch);
    assert_eq!(state.consecutive_failures(), 0);
    assert_eq!(state.last_changed_at(), Some(epoch));
    assert_eq!(state.last_latency_ms(), Some(12));
}

#[rstest]
fn first_unknown_result_is_not_a_transition(epoch: DateTime<Utc>) {
    let mut state = ServerHealthState::initial(ServerId::new());

    let event = state.apply(&HealthCheckResult::unknown(epoch));

    assert!(event.is_none());
    assert_eq!(state.consecutive_failures(), 1);
    assert_eq!(state.last_changed_at(), None);
    assert_eq!(state.last_checked_at(), Some(epoch));
}

#[rstest]
#[case(HealthStatus::Unreachable)]
#[case(HealthStatus::AuthFailed)]
#[case(HealthStatus::Timeout)]
fn repeated_failures_extend_the_streak_without_events(
    epoch: DateTime<Utc>,
    #[case] status: HealthStatus,
) {
    let mut state = ServerHealthState::initial(ServerId::new());
    let first = state.apply(&result_for(status, epoch));
    assert!(first.is_some());

    for offset in 1..=3 {
        let event = state.apply(&result_for(status, epoch + Duration::minutes(offset)));
        assert!(event.is_none());
    }

    assert_eq!(state.consecutive_failures(), 4);
    assert_eq!(state.last_changed_at(), Some(epoch));
    assert_eq!(state.previous_status(), HealthStatus::Unknown);
}

#[rstest]
fn repeated_healthy_results_keep_failures_at_zero(epoch: DateTime<Utc>) {
    let mut state = ServerHealthState::initial(ServerId::new());
    state.apply(&HealthCheckResult::healthy(5, epoch));

    let event = state.apply(&HealthCheckResult::healthy(7, epoch + Duration::minutes(5)));

    assert!(event.is_none());
    assert_eq!(state.consecutive_failures(), 0);
    assert_eq!(state.last_latency_ms(), Some(7));
    assert_eq!(state.last_changed_at(), Some(epoch));
}

#[rstest]
fn change_records_previous_status_and_restarts_streak(epoch: DateTime<Utc>) {
    let mut state = ServerHealthState::initial(ServerId::new());
    state.apply(&HealthCheckResult::healthy(5, epoch));
    let later = epoch + Duration::minutes(15);

    let event = state
        .apply(&HealthCheckResult::unreachable(later))
        .expect("healthy to unreachable should transition");

    assert_eq!(event.from, HealthStatus::Healthy);
    assert_eq!(event.to, HealthStatus::Unreachable);
    assert_eq!(state.previous_status(), HealthStatus::Healthy);
    assert_eq!(state.current_status(), HealthStatus::Unreachable);
    assert_eq!(state.consecutive_failures(), 1);
    assert_eq!(state.last_changed_at(), Some(later));
    assert_eq!(state.last_latency_ms(), None);
}

#[rstest]
fn timeout_and_unknown_flapping_is_a_transition(epoch: DateTime<Utc>) {
    let mut state = ServerHealthState::initial(ServerId::new());
    state.apply(&HealthCheckResult::timed_out(epoch));

    let event = state
        .apply(&HealthCheckResult::unknown(epoch + Duration::minutes(5)))
        .expect("timeout to unknown should transition");

    assert_eq!(event.from, HealthStatus::Timeout);
    assert_eq!(event.to, HealthStatus::Unknown);
    assert_eq!(state.consecutive_failures(), 1);
}

#[rstest]
fn recovery_resets_failures(epoch: DateTime<Utc>) {
    let mut state = ServerHealthState::initial(ServerId::new());
    state.apply(&HealthCheckResult::auth_failed(epoch));
    state.apply(&HealthCheckResult::auth_failed(epoch + Duration::minutes(5)));

    let event = state
        .apply(&HealthCheckResult::healthy(9, epoch + Duration::minutes(10)))
        .expect("recovery should transition");

    assert!(event.is_recovery());
    assert_eq!(state.consecutive_failures(), 0);
}

#[rstest]
fn state_survives_json_round_trip(epoch: DateTime<Utc>) {
    let mut state = ServerHealthState::initial(ServerId::new());
    state.apply(&HealthCheckResult::healthy(11, epoch));

    let json = serde_json::to_string(&state).expect("state should serialize");
    let restored: ServerHealthState = serde_json::from_str(&json).expect("state should parse");

    assert_eq!(restored, state);
    assert!(json.contains("\"currentStatus\":\"healthy\""));
}
