//! The fixed health command and its output.

use crate::shell;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_PROGRAM: &str = "uptime";

/// Errors raised while building a health command.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HealthCommandError {
    /// The program name is empty after trimming.
    #[error("health command program must not be empty")]
    EmptyProgram,
}

/// The diagnostic command run on every probe.
///
/// It must be read-only on the remote host. Arguments are quoted when the
/// command line is rendered, so they cannot smuggle extra shell syntax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct HealthCommand {
    program: String,
    args: Vec<String>,
}

impl HealthCommand {
    /// Creates a command without arguments.
    ///
    /// # Errors
    ///
    /// Returns [`HealthCommandError::EmptyProgram`] for a blank program.
    pub fn new(program: impl Into<String>) -> Result<Self, HealthCommandError> {
        let trimmed = program.into().trim().to_owned();
        if trimmed.is_empty() {
            return Err(HealthCommandError::EmptyProgram);
        }
        Ok(Self {
            program: trimmed,
            args: Vec::new(),
        })
    }

    /// Appends one argument.
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Returns the program name.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Returns the command line sent to the remote shell.
    #[must_use]
    pub fn render(&self) -> String {
        shell::join(&self.program, self.args.iter().map(String::as_str))
    }
}

impl Default for HealthCommand {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_owned(),
            args: Vec::new(),
        }
    }
}

impl TryFrom<Vec<String>> for HealthCommand {
    type Error = HealthCommandError;

    fn try_from(mut parts: Vec<String>) -> Result<Self, Self::Error> {
        if parts.is_empty() {
            return Err(HealthCommandError::EmptyProgram);
        }
        let program = parts.remove(0);
        let mut command = Self::new(program)?;
        command.args = parts;
        Ok(command)
    }
}

impl From<HealthCommand> for Vec<String> {
    fn from(command: HealthCommand) -> Self {
        let mut parts = Vec::with_capacity(command.args.len() + 1);
        parts.push(command.program);
        parts.extend(command.args);
        parts
    }
}

/// What the remote command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code of the remote command.
    pub exit_code: i32,
    /// Captured standard output.
    pub stdout: String,
}

impl CommandOutput {
    /// Returns whether the command exited with status zero.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}
