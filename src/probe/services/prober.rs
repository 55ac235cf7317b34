//! One-server health probe with classification.

use crate::health::domain::{HealthCheckResult, HealthStatus};
use crate::inventory::domain::{Secret, ServerDefinition};
use crate::probe::{
    domain::HealthCommand,
    ports::{SshSession, SshTransport, SshTransportError},
};
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, timeout, timeout_at};
use tracing::{debug, warn};

/// Upper bound on a graceful close; the session is dropped after it.
const CLOSE_GRACE: Duration = Duration::from_secs(2);

/// Stateless prober that turns one connection attempt into a
/// [`HealthCheckResult`].
///
/// Connect, authentication and the health command share a single time
/// budget. Every exit path releases the session: it is closed when the
/// command finished and dropped otherwise.
#[derive(Clone)]
pub struct HealthProber<T, C>
where
    T: SshTransport,
    C: Clock + Send + Sync,
{
    transport: Arc<T>,
    clock: Arc<C>,
    command: HealthCommand,
}

impl<T, C> HealthProber<T, C>
where
    T: SshTransport,
    C: Clock + Send + Sync,
{
    /// Creates a prober running the default health command.
    #[must_use]
    pub fn new(transport: Arc<T>, clock: Arc<C>) -> Self {
        Self::with_command(transport, clock, HealthCommand::default())
    }

    /// Creates a prober running `command`.
    #[must_use]
    pub const fn with_command(transport: Arc<T>, clock: Arc<C>, command: HealthCommand) -> Self {
        Self {
            transport,
            clock,
            command,
        }
    }

    /// Probes one server within `budget`.
    ///
    /// Never fails: every outcome is classified. Connection refusal and
    /// unreachable hosts map to `Unreachable`, rejected credentials to
    /// `AuthFailed`, an exhausted budget to `Timeout`, a command that
    /// finished with status zero to `Healthy`, and anything else to
    /// `Unknown`.
    pub async fn probe(
        &self,
        server: &ServerDefinition,
        secret: &Secret,
        budget: Duration,
    ) -> HealthCheckResult {
        let deadline = Instant::now() + budget;
        let connected = timeout_at(deadline, self.transport.connect(server, secret)).await;
        let mut session = match connected {
            Ok(Ok(session)) => session,
            Ok(Err(err)) => {
                debug!(server_id = %server.id(), error = %err, "connection attempt failed");
                return self.classify_transport_error(&err);
            }
            Err(_) => {
                debug!(server_id = %server.id(), "connection attempt timed out");
                return HealthCheckResult::timed_out(self.clock.utc())
                    .with_detail("connect and authentication exceeded the time budget");
            }
        };

        let command_line = self.command.render();
        let started = Instant::now();
        let executed = timeout_at(deadline, session.exec(&command_line)).await;
        let elapsed = started.elapsed();

        let result = match executed {
            Ok(Ok(output)) if output.succeeded() => {
                HealthCheckResult::healthy(duration_millis(elapsed), self.clock.utc())
            }
            Ok(Ok(output)) => HealthCheckResult::unknown(self.clock.utc()).with_detail(format!(
                "health command exited with status {}",
                output.exit_code
            )),
            Ok(Err(err)) => self.classify_transport_error(&err),
            Err(_) => {
                // Wedged mid-command: drop without a graceful close.
                drop(session);
                return HealthCheckResult::timed_out(self.clock.utc())
                    .with_detail("health command exceeded the time budget");
            }
        };

        close_session(session, server).await;
        result
    }

    fn classify_transport_error(&self, err: &SshTransportError) -> HealthCheckResult {
        let status = match err {
            SshTransportError::Connect(_) => HealthStatus::Unreachable,
            SshTransportError::AuthRejected(_) => HealthStatus::AuthFailed,
            SshTransportError::TimedOut(_) => HealthStatus::Timeout,
            SshTransportError::Protocol(_) => HealthStatus::Unknown,
        };
        HealthCheckResult::new(status, self.clock.utc()).with_detail(err.to_string())
    }
}

async fn close_session(session: Box<dyn SshSession>, server: &ServerDefinition) {
    match timeout(CLOSE_GRACE, session.close()).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            warn!(server_id = %server.id(), error = %err, "session close failed");
        }
        Err(_) => {
            warn!(server_id = %server.id(), "session close timed out; connection dropped");
        }
    }
}

fn duration_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
