//! LSB-style progress lines.
//!
//! Mirrors `log_daemon_msg` / `log_end_msg`: the action is announced as
//! `Starting <description>: <name>` and completed with `.`, ` (warning).`, or
//! ` failed!`. When verbose reporting is off only the newline is written.

use std::io::Write;

use super::error::LifecycleError;
use super::types::{LifecycleCommand, LifecycleOutput};

/// How an announced action ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum EndStatus {
    Success,
    Warning,
    Failure,
}

impl EndStatus {
    const fn suffix(self) -> &'static str {
        match self {
            Self::Success => ".",
            Self::Warning => " (warning).",
            Self::Failure => " failed!",
        }
    }
}

pub(super) const fn verb(command: LifecycleCommand) -> &'static str {
    match command {
        LifecycleCommand::Start => "Starting",
        LifecycleCommand::Stop => "Stopping",
        LifecycleCommand::Status => "Checking",
        LifecycleCommand::Restart => "Restarting",
        LifecycleCommand::Reload | LifecycleCommand::ForceReload => "Reloading",
    }
}

/// An announced action awaiting its end status.
pub(super) struct Progress {
    verbose: bool,
}

impl Progress {
    pub(super) fn begin<W: Write, E: Write>(
        output: &mut LifecycleOutput<W, E>,
        command: LifecycleCommand,
        description: &str,
        name: &str,
        verbose: bool,
    ) -> Result<Self, LifecycleError> {
        output.stdout_fragment(format_args!("{} {description}: {name}", verb(command)))?;
        Ok(Self { verbose })
    }

    pub(super) fn end<W: Write, E: Write>(
        self,
        output: &mut LifecycleOutput<W, E>,
        status: EndStatus,
    ) -> Result<(), LifecycleError> {
        if self.verbose {
            output.stdout_line(format_args!("{}", status.suffix()))
        } else {
            output.stdout_line(format_args!(""))
        }
    }
}
