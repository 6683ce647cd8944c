//! Process supervision backends.
//!
//! The lifecycle dispatcher never touches processes directly; it drives a
//! [`Supervisor`]. Two production backends exist:
//! - [`StartStopDaemon`] shells out to the Debian `start-stop-daemon` utility.
//! - [`NativeSupervisor`] reads PID files and signals processes itself.
//!
//! [`SystemSupervisor`] selects between them from configuration.

mod error;
mod native;
mod pid_file;
mod start_stop_daemon;

use std::path::Path;

use cruisectl_config::{Config, RetrySchedule, ServiceDescriptor, SignalName, SupervisorKind};

pub use error::SupervisorError;
pub use native::NativeSupervisor;
pub use start_stop_daemon::StartStopDaemon;

pub(crate) const SUPERVISOR_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::supervisor");

/// Result of asking a supervisor to launch the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartStatus {
    /// A new daemon process was launched.
    Started,
    /// The process recorded in the PID file is alive; nothing was launched.
    AlreadyRunning,
}

/// Result of asking a supervisor to stop or signal a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopStatus {
    /// The signal was delivered, and for schedules the process exited.
    Stopped,
    /// No live process matched the PID file.
    NotRunning,
    /// The schedule ran out while the process was still alive.
    StillRunning,
}

/// How a process should be stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopPolicy {
    /// Deliver one signal and return without waiting.
    Signal(SignalName),
    /// Walk a graceful-then-forceful schedule until the process exits.
    Retry(RetrySchedule),
}

/// Capability used by the lifecycle dispatcher to control processes.
#[cfg_attr(test, mockall::automock)]
pub trait Supervisor {
    /// Dry-run start: reports whether the daemon recorded in the PID file is
    /// alive, in which case a start would be refused.
    fn probe(&self, service: &ServiceDescriptor) -> Result<bool, SupervisorError>;

    /// Launches the daemon unless it is already running.
    fn start(&self, service: &ServiceDescriptor) -> Result<StartStatus, SupervisorError>;

    /// Stops or signals the process recorded in `pid_file`.
    fn stop(&self, pid_file: &Path, policy: &StopPolicy) -> Result<StopStatus, SupervisorError>;
}

/// Production supervisor selected from configuration.
#[derive(Debug, Clone)]
pub enum SystemSupervisor {
    /// `start-stop-daemon` backend.
    StartStopDaemon(StartStopDaemon),
    /// Native signalling backend.
    Native(NativeSupervisor),
}

impl SystemSupervisor {
    /// Builds the backend named by `config.supervisor`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        match config.supervisor() {
            SupervisorKind::StartStopDaemon => {
                Self::StartStopDaemon(StartStopDaemon::new(config.start_stop_daemon()))
            }
            SupervisorKind::Native => Self::Native(NativeSupervisor::new()),
        }
    }
}

impl Supervisor for SystemSupervisor {
    fn probe(&self, service: &ServiceDescriptor) -> Result<bool, SupervisorError> {
        match self {
            Self::StartStopDaemon(backend) => backend.probe(service),
            Self::Native(backend) => backend.probe(service),
        }
    }

    fn start(&self, service: &ServiceDescriptor) -> Result<StartStatus, SupervisorError> {
        match self {
            Self::StartStopDaemon(backend) => backend.start(service),
            Self::Native(backend) => backend.start(service),
        }
    }

    fn stop(&self, pid_file: &Path, policy: &StopPolicy) -> Result<StopStatus, SupervisorError> {
        match self {
            Self::StartStopDaemon(backend) => backend.stop(pid_file, policy),
            Self::Native(backend) => backend.stop(pid_file, policy),
        }
    }
}
