//! Command-line construction for `ssh` invocations.

use super::options::OpenSshOptions;
use crate::inventory::domain::ServerDefinition;
use sha2::{Digest, Sha256};
use std::ffi::OsString;
use std::path::Path;

/// Environment variable the askpass helper answers from.
pub(super) const ASKPASS_SECRET_ENV: &str = "SERVERWATCH_ASKPASS_SECRET";

/// Askpass helper: prints the secret once, or declines any prompt.
pub(super) const ASKPASS_SCRIPT: &str = "#!/bin/sh
if [ -n \"$SERVERWATCH_ASKPASS_SECRET\" ]; then
  printf '%s\\n' \"$SERVERWATCH_ASKPASS_SECRET\"
  exit 0
fi
exit 1
";

/// How the master authenticates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum AuthMethod<'a> {
    /// Password or keyboard-interactive, answered by the askpass helper.
    Password,
    /// Public key from the given identity file.
    Identity(&'a Path),
}

/// Returns the control socket file name for a server.
///
/// The name is short and fixed-length so the full socket path stays within
/// the platform's limit.
pub(super) fn control_socket_name(server: &ServerDefinition) -> String {
    let digest = Sha256::digest(format!("{}|{}", server.id(), server.destination()));
    let short: String = format!("{digest:x}").chars().take(16).collect();
    format!("cm-{short}")
}

fn option(args: &mut Vec<OsString>, value: impl Into<OsString>) {
    args.push(OsString::from("-o"));
    args.push(value.into());
}

fn target(args: &mut Vec<OsString>, server: &ServerDefinition) {
    args.push(OsString::from("-p"));
    args.push(OsString::from(server.port().to_string()));
    args.push(OsString::from("-l"));
    args.push(OsString::from(server.username()));
    args.push(OsString::from(server.host()));
}

/// Arguments that start a control master for `server`.
pub(super) fn master_args(
    options: &OpenSshOptions,
    server: &ServerDefinition,
    control_path: &Path,
    auth: AuthMethod<'_>,
) -> Vec<OsString> {
    let mut args = vec![
        OsString::from("-M"),
        OsString::from("-N"),
        OsString::from("-S"),
        control_path.as_os_str().to_owned(),
    ];
    option(&mut args, "ControlPersist=no");
    option(
        &mut args,
        format!("ConnectTimeout={}", options.connect_timeout.as_secs().max(1)),
    );
    option(
        &mut args,
        format!(
            "StrictHostKeyChecking={}",
            options.host_key_policy.as_option_value()
        ),
    );
    if let Some(known_hosts) = &options.known_hosts_file {
        option(&mut args, format!("UserKnownHostsFile={known_hosts}"));
    }
    option(&mut args, "NumberOfPasswordPrompts=1");
    match auth {
        AuthMethod::Password => {
            option(&mut args, "PreferredAuthentications=password,keyboard-interactive");
            option(&mut args, "PubkeyAuthentication=no");
        }
        AuthMethod::Identity(identity) => {
            args.push(OsString::from("-i"));
            args.push(identity.as_os_str().to_owned());
            option(&mut args, "IdentitiesOnly=yes");
            option(&mut args, "PreferredAuthentications=publickey");
            option(&mut args, "PasswordAuthentication=no");
            option(&mut args, "KbdInteractiveAuthentication=no");
        }
    }
    target(&mut args, server);
    args
}

/// A request sent through an existing master.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ControlRequest<'a> {
    /// Ask whether the master is up.
    Check,
    /// Ask the master to exit.
    Exit,
    /// Run a command line on the remote host.
    Run(&'a str),
}

/// Arguments that send `request` through the master at `control_path`.
pub(super) fn control_args(
    server: &ServerDefinition,
    control_path: &Path,
    request: ControlRequest<'_>,
) -> Vec<OsString> {
    let mut args = vec![OsString::from("-S"), control_path.as_os_str().to_owned()];
    option(&mut args, "ControlMaster=no");
    option(&mut args, "BatchMode=yes");
    args.push(OsString::from("-T"));
    match request {
        ControlRequest::Check => args.extend([OsString::from("-O"), OsString::from("check")]),
        ControlRequest::Exit => args.extend([OsString::from("-O"), OsString::from("exit")]),
        ControlRequest::Run(_) => {}
    }
    target(&mut args, server);
    if let ControlRequest::Run(command) = request {
        args.push(OsString::from(command));
    }
    args
}
