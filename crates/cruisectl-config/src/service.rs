//! Immutable description of the supervised service.
//!
//! The descriptor is derived once from [`Config`] and carries everything the
//! lifecycle dispatcher and the supervisors need: what to launch, where, as
//! whom, and which PID files track the daemon and its builders.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::{Config, RetrySchedule};

/// Environment variable pointing the daemon at its data root.
pub const DATA_ROOT_ENV: &str = "CRUISE_DATA_ROOT";

/// Everything needed to launch, probe, and stop the daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    name: String,
    description: String,
    executable: PathBuf,
    working_dir: PathBuf,
    user: String,
    daemon_args: Vec<String>,
    extra_args: Vec<String>,
    data_root: PathBuf,
    search_path: String,
    pid_file: PathBuf,
    builder_pid_dir: PathBuf,
    stop_retry: RetrySchedule,
}

impl ServiceDescriptor {
    /// Builds and validates the descriptor from configuration.
    pub fn from_config(config: &Config) -> Result<Self, ServiceDescriptorError> {
        if config.name.trim().is_empty() {
            return Err(ServiceDescriptorError::EmptyName);
        }
        if config.user.trim().is_empty() {
            return Err(ServiceDescriptorError::EmptyUser);
        }
        let pid_file = config.pid_file();
        if pid_file.file_name().is_none() {
            return Err(ServiceDescriptorError::InvalidPidFile { path: pid_file });
        }
        Ok(Self {
            name: config.name.trim().to_owned(),
            description: config.description.clone(),
            executable: config.daemon_path(),
            working_dir: config.install_dir.clone(),
            user: config.user.trim().to_owned(),
            daemon_args: split_words(&config.daemon_args),
            extra_args: split_words(&config.extra_args),
            data_root: config.data_root.clone(),
            search_path: config.search_path.clone(),
            pid_file,
            builder_pid_dir: config.builder_pid_dir(),
            stop_retry: config.stop_retry.clone(),
        })
    }

    /// Service name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Daemon executable.
    #[must_use]
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Working directory for the daemon.
    #[must_use]
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Account the daemon runs as.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Arguments passed to the daemon.
    #[must_use]
    pub fn daemon_args(&self) -> &[String] {
        &self.daemon_args
    }

    /// Additional arguments passed to the supervisor.
    #[must_use]
    pub fn extra_args(&self) -> &[String] {
        &self.extra_args
    }

    /// Primary PID file.
    #[must_use]
    pub fn pid_file(&self) -> &Path {
        &self.pid_file
    }

    /// Directory holding one PID file per running builder.
    #[must_use]
    pub fn builder_pid_dir(&self) -> &Path {
        &self.builder_pid_dir
    }

    /// Stop schedule for the main daemon.
    #[must_use]
    pub fn stop_retry(&self) -> &RetrySchedule {
        &self.stop_retry
    }

    /// Init script path shown in usage messages.
    #[must_use]
    pub fn script_name(&self) -> String {
        format!("/etc/init.d/{}", self.name)
    }

    /// Environment exported to the supervisor and the daemon.
    #[must_use]
    pub fn environment(&self) -> Vec<(OsString, OsString)> {
        vec![
            (OsString::from("PATH"), OsString::from(&self.search_path)),
            (
                OsString::from(DATA_ROOT_ENV),
                self.data_root.clone().into_os_string(),
            ),
        ]
    }

    /// Reports whether the daemon executable is present and executable.
    #[must_use]
    pub fn is_installed(&self) -> bool {
        let Ok(metadata) = std::fs::metadata(&self.executable) else {
            return false;
        };
        if !metadata.is_file() {
            return false;
        }
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            metadata.permissions().mode() & 0o111 != 0
        }
        #[cfg(not(unix))]
        {
            true
        }
    }
}

fn split_words(input: &str) -> Vec<String> {
    input.split_whitespace().map(str::to_owned).collect()
}

/// Errors raised while validating the service descriptor.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceDescriptorError {
    /// The service name was blank.
    #[error("service name must not be empty")]
    EmptyName,
    /// The invocation user was blank.
    #[error("service user must not be empty")]
    EmptyUser,
    /// The PID file path did not name a file.
    #[error("pid file '{path}' does not name a file")]
    InvalidPidFile { path: PathBuf },
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn splits_arguments_on_whitespace() {
        let config = Config {
            daemon_args: String::from("  start --daemon\t--port 3131 "),
            extra_args: String::from("--nicelevel 5"),
            ..Config::default()
        };
        let descriptor = ServiceDescriptor::from_config(&config).expect("descriptor");
        assert_eq!(
            descriptor.daemon_args(),
            &["start", "--daemon", "--port", "3131"]
        );
        assert_eq!(descriptor.extra_args(), &["--nicelevel", "5"]);
    }

    #[test]
    fn rejects_blank_user() {
        let config = Config {
            user: String::from("  "),
            ..Config::default()
        };
        assert_eq!(
            ServiceDescriptor::from_config(&config),
            Err(ServiceDescriptorError::EmptyUser)
        );
    }

    #[test]
    fn rejects_blank_name() {
        let config = Config {
            name: String::new(),
            ..Config::default()
        };
        assert_eq!(
            ServiceDescriptor::from_config(&config),
            Err(ServiceDescriptorError::EmptyName)
        );
    }

    #[test]
    fn exports_data_root_and_search_path() {
        let descriptor = ServiceDescriptor::from_config(&Config::default()).expect("descriptor");
        let environment = descriptor.environment();
        assert!(environment.contains(&(
            OsString::from(DATA_ROOT_ENV),
            OsString::from("/var/lib/cruisecontrolrb")
        )));
        assert_eq!(descriptor.script_name(), "/etc/init.d/cruisecontrolrb");
    }

    #[cfg(unix)]
    #[test]
    fn installation_requires_executable_bit() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().expect("temp dir");
        let executable = temp_dir.path().join("cruise");
        fs::write(&executable, "#!/bin/sh\n").expect("write executable");
        let config = Config {
            daemon: Some(executable.clone()),
            ..Config::default()
        };
        let descriptor = ServiceDescriptor::from_config(&config).expect("descriptor");

        fs::set_permissions(&executable, fs::Permissions::from_mode(0o644)).expect("chmod");
        assert!(!descriptor.is_installed());

        fs::set_permissions(&executable, fs::Permissions::from_mode(0o755)).expect("chmod");
        assert!(descriptor.is_installed());
    }

    #[test]
    fn missing_executable_is_not_installed() {
        let temp_dir = TempDir::new().expect("temp dir");
        let config = Config {
            daemon: Some(temp_dir.path().join("absent")),
            ..Config::default()
        };
        let descriptor = ServiceDescriptor::from_config(&config).expect("descriptor");
        assert!(!descriptor.is_installed());
    }
}
