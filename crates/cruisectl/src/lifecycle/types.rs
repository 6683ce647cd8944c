//! Lifecycle verbs, outcomes, and output abstractions.
//!
//! Defines the payloads and IO wrappers shared across lifecycle commands so the
//! controller can remain agnostic of concrete writers.

use std::fmt;
use std::io::Write;

use super::LifecycleError;
use crate::ServiceAction;

/// LSB exit code for an unknown or missing verb.
pub(crate) const EXIT_USAGE: u8 = 3;
/// LSB exit code for a configuration that could not be loaded.
pub(crate) const EXIT_NOT_CONFIGURED: u8 = 6;

/// Supported lifecycle commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleCommand {
    Start,
    Stop,
    Status,
    Restart,
    Reload,
    ForceReload,
}

impl fmt::Display for LifecycleCommand {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => formatter.write_str("start"),
            Self::Stop => formatter.write_str("stop"),
            Self::Status => formatter.write_str("status"),
            Self::Restart => formatter.write_str("restart"),
            Self::Reload => formatter.write_str("reload"),
            Self::ForceReload => formatter.write_str("force-reload"),
        }
    }
}

impl From<ServiceAction> for LifecycleCommand {
    fn from(action: ServiceAction) -> Self {
        match action {
            ServiceAction::Start => Self::Start,
            ServiceAction::Stop => Self::Stop,
            ServiceAction::Status => Self::Status,
            ServiceAction::Restart => Self::Restart,
            ServiceAction::Reload => Self::Reload,
            ServiceAction::ForceReload => Self::ForceReload,
        }
    }
}

/// Result of a successful `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyRunning,
}

/// Result of a successful `stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    AlreadyStopped,
}

/// Result of a `restart` whose stop phase succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartOutcome {
    Restarted,
    /// The start phase found the old process still alive.
    OldProcessRunning,
}

/// Result of a best-effort `reload`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    Signalled,
    NotRunning,
    /// Delivery failed; the failure was logged and ignored.
    Undelivered,
}

/// LSB status report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutcome {
    Running,
    /// The PID file exists but names no live process.
    DeadWithPidFile,
    NotRunning,
}

impl StatusOutcome {
    /// LSB `status` exit code.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::Running => 0,
            Self::DeadWithPidFile => 1,
            Self::NotRunning => 3,
        }
    }
}

/// Output handle abstracting over stdout/stderr writers.
pub struct LifecycleOutput<W: Write, E: Write> {
    pub stdout: W,
    pub stderr: E,
}

impl<W: Write, E: Write> LifecycleOutput<W, E> {
    pub fn new(stdout: W, stderr: E) -> Self {
        Self { stdout, stderr }
    }

    /// Writes without a trailing newline, for messages completed later.
    pub fn stdout_fragment(&mut self, args: fmt::Arguments<'_>) -> Result<(), LifecycleError> {
        self.stdout.write_fmt(args).map_err(LifecycleError::Io)?;
        self.stdout.flush().map_err(LifecycleError::Io)
    }

    pub fn stdout_line(&mut self, args: fmt::Arguments<'_>) -> Result<(), LifecycleError> {
        self.stdout.write_fmt(args).map_err(LifecycleError::Io)?;
        self.stdout.write_all(b"\n").map_err(LifecycleError::Io)?;
        self.stdout.flush().map_err(LifecycleError::Io)
    }

    pub fn stderr_line(&mut self, args: fmt::Arguments<'_>) -> Result<(), LifecycleError> {
        self.stderr.write_fmt(args).map_err(LifecycleError::Io)?;
        self.stderr.write_all(b"\n").map_err(LifecycleError::Io)?;
        self.stderr.flush().map_err(LifecycleError::Io)
    }
}
