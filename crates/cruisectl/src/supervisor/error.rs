//! Error surface shared by the supervision backends.

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;

use cruisectl_config::SignalName;
use nix::errno::Errno;
use thiserror::Error;

/// Operational trouble reported by a supervisor.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// The supervisor program (or the daemon) could not be executed.
    #[error("failed to execute '{program:?}': {source}")]
    Spawn {
        program: OsString,
        #[source]
        source: io::Error,
    },
    /// Waiting for a spawned program failed.
    #[error("failed to wait for '{program:?}': {source}")]
    Wait {
        program: OsString,
        #[source]
        source: io::Error,
    },
    /// `start-stop-daemon` reported trouble (exit code 3 or above, or a signal).
    #[error("'{program:?}' failed during {action} (exit status: {code:?})")]
    Trouble {
        program: OsString,
        action: &'static str,
        code: Option<i32>,
    },
    /// The PID file exists but could not be read.
    #[error("failed to read pid file {path:?}: {source}")]
    ReadPidFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Probing or signalling a process failed.
    #[error("failed to deliver {signal} to pid {pid}: {source}")]
    Signal {
        pid: i32,
        signal: SignalName,
        #[source]
        source: Errno,
    },
    /// Liveness probing failed for a reason other than a missing process.
    #[error("failed to check process {pid}: {source}")]
    CheckProcess {
        pid: i32,
        #[source]
        source: Errno,
    },
    /// The configured account does not exist.
    #[error("unknown user '{user}'")]
    UnknownUser { user: String },
    /// Looking up the configured account failed.
    #[error("failed to look up user '{user}': {source}")]
    UserLookup {
        user: String,
        #[source]
        source: Errno,
    },
    /// Switching to the configured account requires root privileges.
    #[error("cannot launch as '{user}' without root privileges")]
    UserSwitchDenied { user: String },
    /// The daemon exited with a failure status while detaching.
    #[error("daemon '{executable:?}' exited during startup (exit status: {code:?})")]
    LaunchFailed {
        executable: PathBuf,
        code: Option<i32>,
    },
}
