//! External process execution.
//!
//! Every tool the packager drives (cmake, xcodebuild, libtool, lipo) is
//! described as a [`ToolCommand`] and executed through a [`CommandRunner`].
//! [`ProcessRunner`] is the real implementation; tests substitute a
//! recording runner.

use crate::bundler::error::{Error, Result};
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};

/// A fully described external command.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ToolCommand {
    program: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    envs: Vec<(String, String)>,
}

impl ToolCommand {
    /// Command running `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Appends a path argument.
    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.to_string_lossy())
    }

    /// Working directory of the child.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Sets an environment variable for the child only.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Program name.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments, without the program.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Working directory, if set.
    pub fn get_current_dir(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Value of an environment variable set on this command.
    pub fn get_env(&self, key: &str) -> Option<&str> {
        self.envs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.contains(' ') {
                write!(f, " '{}'", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Executes external commands.
pub trait CommandRunner: Send + Sync {
    /// Runs the command to completion with inherited stdio.
    ///
    /// A non-zero exit is an [`Error::ExternalProcess`].
    fn run(&self, command: &ToolCommand) -> impl Future<Output = Result<()>> + Send;

    /// Runs the command and returns its captured stdout.
    fn output(&self, command: &ToolCommand) -> impl Future<Output = Result<String>> + Send;
}

/// Runs commands as real child processes.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    fn prepare(command: &ToolCommand) -> Result<tokio::process::Command> {
        let program = which::which(command.program()).map_err(|e| Error::CommandFailed {
            command: command.program().to_string(),
            error: std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string()),
        })?;

        let mut cmd = tokio::process::Command::new(program);
        cmd.args(command.get_args());
        if let Some(dir) = command.get_current_dir() {
            cmd.current_dir(dir);
        }
        cmd.envs(command.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        Ok(cmd)
    }
}

impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &ToolCommand) -> Result<()> {
        log::info!("Executing: {}", command);
        if let Some(dir) = command.get_current_dir() {
            log::debug!("  in {}", dir.display());
        }

        let status = Self::prepare(command)?
            .status()
            .await
            .map_err(|error| Error::CommandFailed {
                command: command.program().to_string(),
                error,
            })?;

        if !status.success() {
            return Err(Error::ExternalProcess {
                command: command.to_string(),
                code: status.code(),
            });
        }
        Ok(())
    }

    async fn output(&self, command: &ToolCommand) -> Result<String> {
        log::debug!("Executing: {}", command);

        let output = Self::prepare(command)?
            .output()
            .await
            .map_err(|error| Error::CommandFailed {
                command: command.program().to_string(),
                error,
            })?;

        if !output.status.success() {
            log::warn!("{}", String::from_utf8_lossy(&output.stderr).trim());
            return Err(Error::ExternalProcess {
                command: command.to_string(),
                code: output.status.code(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Runner adding environment variables to every command it forwards.
///
/// Variables already set on a command are left alone.
#[derive(Debug)]
pub struct EnvRunner<'a, R> {
    inner: &'a R,
    envs: Vec<(String, String)>,
}

impl<'a, R: CommandRunner> EnvRunner<'a, R> {
    /// Wraps `inner` without any extra variables.
    pub fn new(inner: &'a R) -> Self {
        Self {
            inner,
            envs: Vec::new(),
        }
    }

    /// Adds a variable for every forwarded command.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    fn apply(&self, command: &ToolCommand) -> ToolCommand {
        let mut command = command.clone();
        for (key, value) in &self.envs {
            if command.get_env(key).is_none() {
                command = command.env(key.as_str(), value.as_str());
            }
        }
        command
    }
}

impl<R: CommandRunner> CommandRunner for EnvRunner<'_, R> {
    async fn run(&self, command: &ToolCommand) -> Result<()> {
        self.inner.run(&self.apply(command)).await
    }

    async fn output(&self, command: &ToolCommand) -> Result<String> {
        self.inner.output(&self.apply(command)).await
    }
}
