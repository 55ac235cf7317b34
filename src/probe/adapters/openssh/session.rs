//! A control-master connection.

use super::args::{ControlRequest, control_args};
use super::classify::classify_failure;
use crate::inventory::domain::ServerDefinition;
use crate::probe::{
    domain::CommandOutput,
    ports::{SshSession, SshTransportError, SshTransportResult},
};
use async_trait::async_trait;
use camino::Utf8PathBuf;
use std::path::PathBuf;
use std::process::Stdio;
use tempfile::TempDir;
use tokio::process::{Child, Command};
use tracing::debug;

/// Exit status `ssh` itself uses for client-side failures.
const SSH_CLIENT_FAILURE: i32 = 255;

/// Session backed by a running control master.
///
/// Dropping the session kills the master and removes its scratch directory.
#[derive(Debug)]
pub struct OpenSshSession {
    ssh_binary: Utf8PathBuf,
    server: ServerDefinition,
    control_path: PathBuf,
    master: Child,
    workspace: TempDir,
}

impl OpenSshSession {
    pub(super) const fn new(
        ssh_binary: Utf8PathBuf,
        server: ServerDefinition,
        control_path: PathBuf,
        master: Child,
        workspace: TempDir,
    ) -> Self {
        Self {
            ssh_binary,
            server,
            control_path,
            master,
            workspace,
        }
    }

    fn control_command(&self, request: ControlRequest<'_>) -> Command {
        let mut command = Command::new(self.ssh_binary.as_std_path());
        command
            .args(control_args(&self.server, &self.control_path, request))
            .stdin(Stdio::null())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl SshSession for OpenSshSession {
    async fn exec(&mut self, command: &str) -> SshTransportResult<CommandOutput> {
        let output = self
            .control_command(ControlRequest::Run(command))
            .output()
            .await
            .map_err(|err| SshTransportError::Protocol(format!("failed to run ssh: {err}")))?;

        let exit_code = output.status.code().unwrap_or(-1);
        if exit_code == SSH_CLIENT_FAILURE {
            return Err(classify_failure(&String::from_utf8_lossy(&output.stderr)));
        }
        Ok(CommandOutput {
            exit_code,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }

    async fn close(self: Box<Self>) -> SshTransportResult<()> {
        let mut session = *self;
        let exit = session.control_command(ControlRequest::Exit).output().await;
        if !exit.as_ref().is_ok_and(|output| output.status.success()) {
            debug!(server_id = %session.server.id(), "control master refused exit; killing it");
            session
                .master
                .start_kill()
                .map_err(|err| SshTransportError::Protocol(format!("failed to stop ssh: {err}")))?;
        }
        session
            .master
            .wait()
            .await
            .map_err(|err| SshTransportError::Protocol(format!("failed to reap ssh: {err}")))?;
        session.workspace.close().map_err(|err| {
            SshTransportError::Protocol(format!("failed to remove scratch dir: {err}"))
        })
    }
}
