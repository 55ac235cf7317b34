//! Scripted transport for tests and dry runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::inventory::domain::{Secret, ServerDefinition, ServerId};
use crate::probe::{
    domain::CommandOutput,
    ports::{SshSession, SshTransport, SshTransportError, SshTransportResult},
};

/// Behaviour replayed for one server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeScript {
    /// Connect succeeds and the command exits zero after `latency`.
    Respond {
        /// Time the command takes to answer.
        latency: Duration,
    },
    /// Connect is refused.
    RefuseConnection,
    /// Authentication is rejected.
    RejectAuth,
    /// Connect never completes.
    HangOnConnect,
    /// The command never answers.
    HangOnCommand,
    /// The transport reports a protocol failure during the command.
    ProtocolError,
    /// The command exits with the given status.
    ExitWith(i32),
}

impl Default for ProbeScript {
    fn default() -> Self {
        Self::Respond {
            latency: Duration::ZERO,
        }
    }
}

/// Counters describing how the transport was used.
#[derive(Debug, Default)]
struct Usage {
    connect_attempts: AtomicUsize,
    active: AtomicUsize,
    peak_active: AtomicUsize,
    closed: AtomicUsize,
    secrets_seen: RwLock<Vec<&'static str>>,
}

/// Keeps the active-connection count raised while alive.
struct ActiveGuard {
    usage: Arc<Usage>,
}

impl ActiveGuard {
    fn acquire(usage: &Arc<Usage>) -> Self {
        let now_active = usage.active.fetch_add(1, Ordering::SeqCst) + 1;
        usage.peak_active.fetch_max(now_active, Ordering::SeqCst);
        Self {
            usage: Arc::clone(usage),
        }
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.usage.active.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Transport that replays a [`ProbeScript`] per server.
///
/// Servers without a script use the default one. The transport tracks
/// connection attempts, the number of connections currently held, and the
/// peak of that number, so callers can check that every connection was
/// released and that concurrency stayed bounded.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSshTransport {
    scripts: Arc<RwLock<HashMap<ServerId, ProbeScript>>>,
    default_script: Arc<RwLock<ProbeScript>>,
    usage: Arc<Usage>,
}

impl ScriptedSshTransport {
    /// Creates a transport where every server responds immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the script for one server.
    pub fn set_script(&self, server_id: ServerId, script: ProbeScript) {
        if let Ok(mut scripts) = self.scripts.write() {
            scripts.insert(server_id, script);
        }
    }

    /// Sets the script used for servers without their own.
    pub fn set_default_script(&self, script: ProbeScript) {
        if let Ok(mut default_script) = self.default_script.write() {
            *default_script = script;
        }
    }

    /// Returns the number of connect calls.
    #[must_use]
    pub fn connect_attempts(&self) -> usize {
        self.usage.connect_attempts.load(Ordering::SeqCst)
    }

    /// Returns the number of connections currently held open.
    #[must_use]
    pub fn active_connections(&self) -> usize {
        self.usage.active.load(Ordering::SeqCst)
    }

    /// Returns the highest number of connections held at once.
    #[must_use]
    pub fn peak_connections(&self) -> usize {
        self.usage.peak_active.load(Ordering::SeqCst)
    }

    /// Returns the number of graceful closes.
    #[must_use]
    pub fn graceful_closes(&self) -> usize {
        self.usage.closed.load(Ordering::SeqCst)
    }

    /// Returns the kinds of secrets offered, in connect order.
    #[must_use]
    pub fn secret_kinds(&self) -> Vec<&'static str> {
        self.usage
            .secrets_seen
            .read()
            .map(|kinds| kinds.clone())
            .unwrap_or_default()
    }

    fn script_for(&self, server_id: ServerId) -> ProbeScript {
        let scripted = self
            .scripts
            .read()
            .ok()
            .and_then(|scripts| scripts.get(&server_id).cloned());
        scripted.unwrap_or_else(|| {
            self.default_script
                .read()
                .map(|script| script.clone())
                .unwrap_or_default()
        })
    }
}

#[async_trait]
impl SshTransport for ScriptedSshTransport {
    async fn connect(
        &self,
        server: &ServerDefinition,
        secret: &Secret,
    ) -> SshTransportResult<Box<dyn SshSession>> {
        self.usage.connect_attempts.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut kinds) = self.usage.secrets_seen.write() {
            kinds.push(secret.kind());
        }
        let guard = ActiveGuard::acquire(&self.usage);
        let script = self.script_for(server.id());
        match script {
            ProbeScript::RefuseConnection => Err(SshTransportError::Connect(format!(
                "connect to {} refused",
                server.destination()
            ))),
            ProbeScript::RejectAuth => Err(SshTransportError::AuthRejected(format!(
                "{} rejected the credentials",
                server.destination()
            ))),
            ProbeScript::HangOnConnect => {
                std::future::pending::<()>().await;
                Err(SshTransportError::TimedOut("unreachable".to_owned()))
            }
            other => Ok(Box::new(ScriptedSession {
                script: other,
                usage: Arc::clone(&self.usage),
                _guard: guard,
            })),
        }
    }
}

struct ScriptedSession {
    script: ProbeScript,
    usage: Arc<Usage>,
    _guard: ActiveGuard,
}

#[async_trait]
impl SshSession for ScriptedSession {
    async fn exec(&mut self, _command: &str) -> SshTransportResult<CommandOutput> {
        match &self.script {
            ProbeScript::Respond { latency } => {
                tokio::time::sleep(*latency).await;
                Ok(CommandOutput {
                    exit_code: 0,
                    stdout: " 12:00:00 up 1 day,  load average: 0.00, 0.00, 0.00\n".to_owned(),
                })
            }
            ProbeScript::ExitWith(code) => Ok(CommandOutput {
                exit_code: *code,
                stdout: String::new(),
            }),
            ProbeScript::ProtocolError => Err(SshTransportError::Protocol(
                "channel closed unexpectedly".to_owned(),
            )),
            _ => {
                std::future::pending::<()>().await;
                Err(SshTransportError::TimedOut("unreachable".to_owned()))
            }
        }
    }

    async fn close(self: Box<Self>) -> SshTransportResult<()> {
        self.usage.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
