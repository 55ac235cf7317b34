//! Connection setup for the OpenSSH transport.

use super::args::{
    ASKPASS_SCRIPT, ASKPASS_SECRET_ENV, AuthMethod, ControlRequest, control_args,
    control_socket_name, master_args,
};
use super::classify::classify_failure;
use super::options::OpenSshOptions;
use super::session::OpenSshSession;
use crate::inventory::domain::{Secret, ServerDefinition};
use crate::probe::ports::{SshSession, SshTransport, SshTransportError, SshTransportResult};
use async_trait::async_trait;
use std::fs::{self, OpenOptions, Permissions};
use std::io::{self, Write};
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tracing::debug;

/// Interval between control socket readiness checks.
const READY_POLL: Duration = Duration::from_millis(100);

/// Transport that spawns one OpenSSH control master per connection.
#[derive(Debug, Clone, Default)]
pub struct OpenSshTransport {
    options: OpenSshOptions,
}

/// Files prepared for one connection attempt.
struct Workspace {
    dir: TempDir,
    control_path: PathBuf,
    askpass: PathBuf,
    identity: Option<PathBuf>,
}

fn setup_error(err: &io::Error) -> SshTransportError {
    SshTransportError::Protocol(format!("failed to prepare ssh client: {err}"))
}

fn write_private_file(path: &Path, contents: &str, mode: u32) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(mode)
        .open(path)?;
    file.write_all(contents.as_bytes())?;
    if !contents.ends_with('\n') {
        file.write_all(b"\n")?;
    }
    file.sync_all()
}

fn prepare_workspace(server: &ServerDefinition, secret: &Secret) -> io::Result<Workspace> {
    let dir = tempfile::Builder::new()
        .prefix("serverwatch-ssh-")
        .tempdir()?;
    fs::set_permissions(dir.path(), Permissions::from_mode(0o700))?;

    let askpass = dir.path().join("askpass");
    write_private_file(&askpass, ASKPASS_SCRIPT, 0o700)?;

    let identity = match secret {
        Secret::PrivateKey { key, .. } => {
            let path = dir.path().join("identity");
            write_private_file(&path, key, 0o600)?;
            Some(path)
        }
        Secret::Password(_) => None,
    };

    let control_path = dir.path().join(control_socket_name(server));
    Ok(Workspace {
        dir,
        control_path,
        askpass,
        identity,
    })
}

async fn master_failure(master: &mut Child) -> SshTransportError {
    let mut stderr = String::new();
    if let Some(mut stream) = master.stderr.take() {
        if let Err(err) = stream.read_to_string(&mut stderr).await {
            debug!(error = %err, "could not read ssh diagnostics");
        }
    }
    classify_failure(&stderr)
}

impl OpenSshTransport {
    /// Creates a transport with the given client options.
    #[must_use]
    pub const fn new(options: OpenSshOptions) -> Self {
        Self { options }
    }

    /// Returns the client options.
    #[must_use]
    pub const fn options(&self) -> &OpenSshOptions {
        &self.options
    }

    fn master_command(
        &self,
        server: &ServerDefinition,
        secret: &Secret,
        workspace: &Workspace,
    ) -> Command {
        let auth = workspace
            .identity
            .as_deref()
            .map_or(AuthMethod::Password, AuthMethod::Identity);
        let mut command = Command::new(self.options.ssh_binary.as_std_path());
        command
            .args(master_args(
                &self.options,
                server,
                &workspace.control_path,
                auth,
            ))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .env("SSH_ASKPASS", &workspace.askpass)
            .env("SSH_ASKPASS_REQUIRE", "force")
            .env_remove(ASKPASS_SECRET_ENV)
            .kill_on_drop(true);
        if let Some(answer) = secret.prompt_answer() {
            command.env(ASKPASS_SECRET_ENV, answer);
        }
        command
    }

    fn spawn_master(
        &self,
        server: &ServerDefinition,
        secret: &Secret,
        workspace: &Workspace,
    ) -> SshTransportResult<Child> {
        self.master_command(server, secret, workspace)
            .spawn()
            .map_err(|err| SshTransportError::Protocol(format!("failed to start ssh: {err}")))
    }

    async fn poll_ready(
        &self,
        server: &ServerDefinition,
        control_path: &Path,
        master: &mut Child,
    ) -> SshTransportResult<()> {
        loop {
            match master.try_wait() {
                Ok(Some(status)) => {
                    debug!(server_id = %server.id(), %status, "control master exited early");
                    return Err(master_failure(master).await);
                }
                Ok(None) => {}
                Err(err) => return Err(setup_error(&err)),
            }

            let check = Command::new(self.options.ssh_binary.as_std_path())
                .args(control_args(server, control_path, ControlRequest::Check))
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .kill_on_drop(true)
                .status()
                .await
                .map_err(|err| setup_error(&err))?;
            if check.success() {
                return Ok(());
            }
            tokio::time::sleep(READY_POLL).await;
        }
    }

    async fn wait_until_ready(
        &self,
        server: &ServerDefinition,
        control_path: &Path,
        master: &mut Child,
    ) -> SshTransportResult<()> {
        let budget = self.options.connect_timeout + Duration::from_secs(5);
        tokio::time::timeout(budget, self.poll_ready(server, control_path, master))
            .await
            .unwrap_or_else(|_| {
                Err(SshTransportError::TimedOut(format!(
                    "control master for {} did not become ready",
                    server.destination()
                )))
            })
    }
}

#[async_trait]
impl SshTransport for OpenSshTransport {
    async fn connect(
        &self,
        server: &ServerDefinition,
        secret: &Secret,
    ) -> SshTransportResult<Box<dyn SshSession>> {
        let owned_server = server.clone();
        let owned_secret = secret.clone();
        let workspace =
            tokio::task::spawn_blocking(move || prepare_workspace(&owned_server, &owned_secret))
                .await
                .map_err(|err| SshTransportError::Protocol(format!("setup worker failed: {err}")))?
                .map_err(|err| setup_error(&err))?;

        let mut master = self.spawn_master(server, secret, &workspace)?;
        self.wait_until_ready(server, &workspace.control_path, &mut master)
            .await?;
        debug!(server_id = %server.id(), "control master ready");

        let Workspace {
            dir, control_path, ..
        } = workspace;
        Ok(Box::new(OpenSshSession::new(
            self.options.ssh_binary.clone(),
            server.clone(),
            control_path,
            master,
            dir,
        )))
    }
}
