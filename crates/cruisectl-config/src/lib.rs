//! Shared configuration for the `cruisectl` service wrapper.
//!
//! The [`Config`] struct is loaded once at startup through `ortho_config`,
//! merging defaults, an optional TOML file, `CRUISECTL_*` environment
//! variables, and command-line flags. It is immutable afterwards; lifecycle
//! code derives a [`ServiceDescriptor`] from it rather than consulting
//! process-wide state.

use std::path::{Path, PathBuf};

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

mod defaults;
mod logging;
mod retry;
mod service;
mod supervisor;

pub use defaults::{
    DEFAULT_DAEMON_ARGS, DEFAULT_DATA_ROOT, DEFAULT_DESCRIPTION, DEFAULT_INSTALL_DIR,
    DEFAULT_LOG_FILTER, DEFAULT_NAME, DEFAULT_SEARCH_PATH, DEFAULT_START_STOP_DAEMON,
    DEFAULT_USER, default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use retry::{RetrySchedule, RetryScheduleError, RetryStep, SignalName, SignalNameParseError};
pub use service::{DATA_ROOT_ENV, ServiceDescriptor, ServiceDescriptorError};
pub use supervisor::{SupervisorKind, SupervisorKindParseError};

/// Configuration for the service wrapper.
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(prefix = "CRUISECTL")]
pub struct Config {
    /// Service name, used for the init script path and log messages.
    #[ortho_config(default = defaults::default_name())]
    pub name: String,
    /// Human-readable description printed in progress messages.
    #[ortho_config(default = defaults::default_description())]
    pub description: String,
    /// Installation directory; also the daemon's working directory.
    #[ortho_config(default = defaults::default_install_dir())]
    pub install_dir: PathBuf,
    /// Daemon executable. Defaults to `<install_dir>/cruise`.
    pub daemon: Option<PathBuf>,
    /// Arguments passed to the daemon, split on whitespace.
    #[ortho_config(default = defaults::default_daemon_args())]
    pub daemon_args: String,
    /// Additional supervisor arguments, split on whitespace.
    #[ortho_config(default = String::new())]
    pub extra_args: String,
    /// Account the daemon runs as.
    #[ortho_config(default = defaults::default_user())]
    pub user: String,
    /// Data root exported to the daemon as `CRUISE_DATA_ROOT`.
    #[ortho_config(default = defaults::default_data_root())]
    pub data_root: PathBuf,
    /// Primary PID file. Defaults to `<install_dir>/tmp/pids/mongrel.pid`.
    pub pid_file: Option<PathBuf>,
    /// Builder PID directory. Defaults to `<install_dir>/tmp/pids/builders`.
    pub builder_pid_dir: Option<PathBuf>,
    /// Graceful-then-forceful stop schedule, e.g. `TERM/30/KILL/5`.
    #[ortho_config(default = defaults::default_stop_retry())]
    pub stop_retry: RetrySchedule,
    /// `PATH` exported to the supervisor and daemon.
    #[ortho_config(default = defaults::default_search_path())]
    pub search_path: String,
    /// Supervision backend.
    #[ortho_config(default = SupervisorKind::default())]
    pub supervisor: SupervisorKind,
    /// Location of the `start-stop-daemon` utility.
    #[ortho_config(default = defaults::default_start_stop_daemon())]
    pub start_stop_daemon: PathBuf,
    /// Prints the LSB end-of-operation message when true.
    #[ortho_config(default = true)]
    pub verbose: bool,
    /// `tracing` filter expression.
    #[ortho_config(default = defaults::default_log_filter_string())]
    pub log_filter: String,
    /// Structured log format.
    #[ortho_config(default = defaults::default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: defaults::default_name(),
            description: defaults::default_description(),
            install_dir: defaults::default_install_dir(),
            daemon: None,
            daemon_args: defaults::default_daemon_args(),
            extra_args: String::new(),
            user: defaults::default_user(),
            data_root: defaults::default_data_root(),
            pid_file: None,
            builder_pid_dir: None,
            stop_retry: defaults::default_stop_retry(),
            search_path: defaults::default_search_path(),
            supervisor: SupervisorKind::default(),
            start_stop_daemon: defaults::default_start_stop_daemon(),
            verbose: true,
            log_filter: defaults::default_log_filter_string(),
            log_format: defaults::default_log_format(),
        }
    }
}

impl Config {
    /// Service name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Installation directory.
    #[must_use]
    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    /// Resolved daemon executable.
    #[must_use]
    pub fn daemon_path(&self) -> PathBuf {
        self.daemon
            .clone()
            .unwrap_or_else(|| self.install_dir.join("cruise"))
    }

    /// Resolved primary PID file.
    #[must_use]
    pub fn pid_file(&self) -> PathBuf {
        self.pid_file
            .clone()
            .unwrap_or_else(|| self.pids_dir().join("mongrel.pid"))
    }

    /// Resolved builder PID directory.
    #[must_use]
    pub fn builder_pid_dir(&self) -> PathBuf {
        self.builder_pid_dir
            .clone()
            .unwrap_or_else(|| self.pids_dir().join("builders"))
    }

    /// Stop schedule applied to the main daemon.
    #[must_use]
    pub fn stop_retry(&self) -> &RetrySchedule {
        &self.stop_retry
    }

    /// Selected supervision backend.
    #[must_use]
    pub const fn supervisor(&self) -> SupervisorKind {
        self.supervisor
    }

    /// Location of the `start-stop-daemon` utility.
    #[must_use]
    pub fn start_stop_daemon(&self) -> &Path {
        &self.start_stop_daemon
    }

    /// Whether end-of-operation messages are printed.
    #[must_use]
    pub const fn verbose(&self) -> bool {
        self.verbose
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    fn pids_dir(&self) -> PathBuf {
        self.install_dir.join("tmp").join("pids")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_paths_follow_install_dir() {
        let config = Config {
            install_dir: PathBuf::from("/srv/ccrb"),
            ..Config::default()
        };
        assert_eq!(config.daemon_path(), PathBuf::from("/srv/ccrb/cruise"));
        assert_eq!(
            config.pid_file(),
            PathBuf::from("/srv/ccrb/tmp/pids/mongrel.pid")
        );
        assert_eq!(
            config.builder_pid_dir(),
            PathBuf::from("/srv/ccrb/tmp/pids/builders")
        );
    }

    #[test]
    fn explicit_paths_win_over_derived_ones() {
        let config = Config {
            daemon: Some(PathBuf::from("/usr/local/bin/cruise")),
            pid_file: Some(PathBuf::from("/run/cruise.pid")),
            builder_pid_dir: Some(PathBuf::from("/run/builders")),
            ..Config::default()
        };
        assert_eq!(config.daemon_path(), PathBuf::from("/usr/local/bin/cruise"));
        assert_eq!(config.pid_file(), PathBuf::from("/run/cruise.pid"));
        assert_eq!(config.builder_pid_dir(), PathBuf::from("/run/builders"));
    }

    #[test]
    fn defaults_match_packaged_layout() {
        let config = Config::default();
        assert_eq!(config.name(), "cruisecontrolrb");
        assert_eq!(config.stop_retry().to_string(), "TERM/30/KILL/5");
        assert_eq!(config.supervisor(), SupervisorKind::StartStopDaemon);
        assert!(config.verbose());
    }
}
