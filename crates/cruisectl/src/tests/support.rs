//! Shared fixtures for lifecycle and runner tests.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use cruisectl_config::{Config, ServiceDescriptor};
use tempfile::TempDir;

use crate::supervisor::{StartStatus, StopPolicy, StopStatus, Supervisor, SupervisorError};

/// Process table shared between a [`FakeSupervisor`] and its clones.
#[derive(Debug, Default)]
pub(crate) struct FakeState {
    /// PID files whose process is alive.
    pub(crate) alive: BTreeSet<PathBuf>,
    /// PID files whose process ignores every signal.
    pub(crate) stubborn: BTreeSet<PathBuf>,
    pub(crate) starts: usize,
    pub(crate) stops: Vec<(PathBuf, StopPolicy)>,
}

/// Supervisor that tracks processes in memory and writes real PID files.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeSupervisor {
    state: Rc<RefCell<FakeState>>,
}

impl FakeSupervisor {
    pub(crate) fn state(&self) -> std::cell::Ref<'_, FakeState> {
        self.state.borrow()
    }

    /// Records `pid_file` as a live process, writing the file.
    pub(crate) fn spawn(&self, pid_file: &Path) {
        write_pid_file(pid_file);
        self.state.borrow_mut().alive.insert(pid_file.to_path_buf());
    }

    /// Like [`Self::spawn`], but the process survives every stop attempt.
    pub(crate) fn spawn_stubborn(&self, pid_file: &Path) {
        self.spawn(pid_file);
        self.state
            .borrow_mut()
            .stubborn
            .insert(pid_file.to_path_buf());
    }
}

impl Supervisor for FakeSupervisor {
    fn probe(&self, service: &ServiceDescriptor) -> Result<bool, SupervisorError> {
        Ok(self.state.borrow().alive.contains(service.pid_file()))
    }

    fn start(&self, service: &ServiceDescriptor) -> Result<StartStatus, SupervisorError> {
        if self.state.borrow().alive.contains(service.pid_file()) {
            return Ok(StartStatus::AlreadyRunning);
        }
        self.spawn(service.pid_file());
        self.state.borrow_mut().starts += 1;
        Ok(StartStatus::Started)
    }

    fn stop(&self, pid_file: &Path, policy: &StopPolicy) -> Result<StopStatus, SupervisorError> {
        let mut state = self.state.borrow_mut();
        state.stops.push((pid_file.to_path_buf(), policy.clone()));
        if !state.alive.contains(pid_file) {
            return Ok(StopStatus::NotRunning);
        }
        if state.stubborn.contains(pid_file) {
            return Ok(StopStatus::StillRunning);
        }
        if let StopPolicy::Signal(signal) = policy
            && *signal == cruisectl_config::SignalName::Hup
        {
            return Ok(StopStatus::Stopped);
        }
        state.alive.remove(pid_file);
        Ok(StopStatus::Stopped)
    }
}

/// An installed service rooted in a temporary directory.
pub(crate) struct Installation {
    _dir: TempDir,
    pub(crate) config: Config,
    pub(crate) service: ServiceDescriptor,
}

impl Installation {
    /// Creates an install directory holding an executable daemon stub.
    pub(crate) fn new() -> Self {
        let dir = TempDir::new().expect("create install dir");
        let config = Config {
            install_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        let daemon = config.daemon_path();
        fs::write(&daemon, "#!/bin/sh\nexit 0\n").expect("write daemon stub");
        fs::set_permissions(&daemon, fs::Permissions::from_mode(0o755))
            .expect("mark daemon executable");
        let service = ServiceDescriptor::from_config(&config).expect("descriptor");
        Self {
            _dir: dir,
            config,
            service,
        }
    }

    /// Creates an install directory whose daemon executable is missing.
    pub(crate) fn uninstalled() -> Self {
        let installation = Self::new();
        fs::remove_file(installation.service.executable()).expect("remove daemon stub");
        installation
    }

    pub(crate) fn builder_pid(&self, name: &str) -> PathBuf {
        self.service.builder_pid_dir().join(name)
    }
}

pub(crate) fn write_pid_file(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create pid dir");
    }
    fs::write(path, "4242\n").expect("write pid file");
}
