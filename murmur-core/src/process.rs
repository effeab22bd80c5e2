//! External process capability.
//!
//! Every external program murmur drives (`git`, `jsonnet`, commit scripts)
//! runs through a [`CommandRunner`]. A run is synchronous and yields a
//! [`CommandOutput`] carrying the exit status and captured stderr, so callers
//! express their control flow as plain sequential code and tests substitute a
//! fake runner.
//!
//! [`CommandSpec`]'s `Display` is the only rendering used in logs and errors;
//! values registered with [`CommandSpec::secret`] print as `***`.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

const REDACTED: &str = "***";

/// What happens to a child's stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StdoutMode {
    /// Discarded (git plumbing).
    #[default]
    Discard,
    /// Passed straight through to our stdout (renderers, commit scripts).
    Inherit,
}

/// A fully described external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub stdout: StdoutMode,
    secrets: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            stdout: StdoutMode::Discard,
            secrets: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn inherit_stdout(mut self) -> Self {
        self.stdout = StdoutMode::Inherit;
        self
    }

    /// Register a value that must never be printed. Empty values are ignored.
    pub fn secret(mut self, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.secrets.push(value);
        }
        self
    }

    /// Working directory, or `None` for the caller's own.
    pub fn dir(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    fn redact(&self, s: &str) -> String {
        self.secrets
            .iter()
            .fold(s.to_string(), |acc, secret| acc.replace(secret.as_str(), REDACTED))
    }

    /// Redact registered secrets from arbitrary text, e.g. captured stderr.
    pub fn redacted(&self, text: &str) -> String {
        self.redact(text)
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", self.redact(arg))?;
        }
        Ok(())
    }
}

/// Result of a finished external command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Exit code; `None` when the child was killed by a signal.
    pub status: Option<i32>,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    pub fn with_status(status: i32) -> Self {
        Self {
            status: Some(status),
            stderr: String::new(),
        }
    }
}

/// Runs external commands to completion.
pub trait CommandRunner {
    /// Run `cmd` and block until it exits.
    ///
    /// `Err` means the program could not be started at all; a program that
    /// ran and failed is an `Ok` with a non-zero status.
    fn run(&self, cmd: &CommandSpec) -> io::Result<CommandOutput>;
}

/// [`CommandRunner`] backed by `std::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, cmd: &CommandSpec) -> io::Result<CommandOutput> {
        let mut command = Command::new(&cmd.program);
        command.args(&cmd.args);
        if let Some(dir) = cmd.dir() {
            command.current_dir(dir);
        }
        command.stdin(Stdio::inherit()).stderr(Stdio::piped());
        command.stdout(match cmd.stdout {
            StdoutMode::Discard => Stdio::null(),
            StdoutMode::Inherit => Stdio::inherit(),
        });

        tracing::debug!("exec: {cmd}");
        let output = command.spawn()?.wait_with_output()?;
        Ok(CommandOutput {
            status: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, cmd: &CommandSpec) -> io::Result<CommandOutput> {
        (**self).run(cmd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_redacts_secrets() {
        let cmd = CommandSpec::new("git")
            .args(["clone", "https://s3cr3t@github.com/org/svc.git", "svc:main"])
            .secret("s3cr3t");
        let shown = cmd.to_string();
        assert_eq!(shown, "git clone https://***@github.com/org/svc.git svc:main");
        assert!(!shown.contains("s3cr3t"));
    }

    #[test]
    fn empty_secret_is_ignored() {
        let cmd = CommandSpec::new("git").arg("status").secret("");
        assert_eq!(cmd.to_string(), "git status");
    }

    #[test]
    fn redacted_scrubs_stderr_text() {
        let cmd = CommandSpec::new("git").secret("tok");
        assert_eq!(
            cmd.redacted("fatal: could not read from https://tok@host"),
            "fatal: could not read from https://***@host"
        );
    }

    #[test]
    fn output_success_only_for_zero() {
        assert!(CommandOutput::with_status(0).success());
        assert!(!CommandOutput::with_status(1).success());
        assert!(!CommandOutput::default().success());
    }

    #[test]
    #[cfg(unix)]
    fn system_runner_captures_status_and_stderr() {
        let cmd = CommandSpec::new("sh").args(["-c", "echo oops >&2; exit 3"]);
        let out = SystemRunner.run(&cmd).unwrap();
        assert_eq!(out.status, Some(3));
        assert_eq!(out.stderr.trim(), "oops");
    }

    #[test]
    fn system_runner_reports_missing_program() {
        let cmd = CommandSpec::new("murmur-definitely-not-a-real-program");
        assert!(SystemRunner.run(&cmd).is_err());
    }
}
