//! Supervisor that reads PID files and signals processes directly.

use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use cruisectl_config::{RetrySchedule, ServiceDescriptor, SignalName};
use nix::errno::Errno;
use nix::sys::signal::{Signal, kill};
use nix::unistd::{Pid, User, geteuid, setsid};
use tracing::{debug, info, warn};

use super::pid_file::{is_alive, read_pid};
use super::{
    SUPERVISOR_TARGET, StartStatus, StopPolicy, StopStatus, Supervisor, SupervisorError,
};

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const LAUNCH_GRACE: Duration = Duration::from_secs(5);

/// Launches and signals the daemon without external tooling.
#[derive(Debug, Clone)]
pub struct NativeSupervisor {
    poll_interval: Duration,
    launch_grace: Duration,
}

impl Default for NativeSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeSupervisor {
    /// Builds a supervisor with the default polling cadence.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            poll_interval: POLL_INTERVAL,
            launch_grace: LAUNCH_GRACE,
        }
    }

    fn live_pid(pid_file: &Path) -> Result<Option<Pid>, SupervisorError> {
        match read_pid(pid_file)? {
            Some(pid) if is_alive(pid)? => Ok(Some(pid)),
            _ => Ok(None),
        }
    }

    fn run_schedule(&self, pid: Pid, schedule: &RetrySchedule) -> Result<StopStatus, SupervisorError> {
        for step in schedule.steps() {
            if !deliver(pid, step.signal)? {
                return Ok(StopStatus::Stopped);
            }
            debug!(
                target: SUPERVISOR_TARGET,
                pid = pid.as_raw(),
                signal = %step.signal,
                timeout_secs = step.timeout.as_secs(),
                "waiting for process to exit"
            );
            if self.wait_for_exit(pid, step.timeout)? {
                return Ok(StopStatus::Stopped);
            }
        }
        warn!(
            target: SUPERVISOR_TARGET,
            pid = pid.as_raw(),
            schedule = %schedule,
            "process survived the stop schedule"
        );
        Ok(StopStatus::StillRunning)
    }

    fn wait_for_exit(&self, pid: Pid, timeout: Duration) -> Result<bool, SupervisorError> {
        let deadline = Instant::now() + timeout;
        loop {
            if !is_alive(pid)? {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            thread::sleep(self.poll_interval);
        }
    }

    fn launch(&self, service: &ServiceDescriptor) -> Result<(), SupervisorError> {
        let mut command = Command::new(service.executable());
        command
            .args(service.daemon_args())
            .current_dir(service.working_dir())
            .envs(service.environment())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        apply_identity(&mut command, service.user())?;
        detach(&mut command);

        let mut child = command.spawn().map_err(|source| SupervisorError::Spawn {
            program: service.executable().as_os_str().to_os_string(),
            source,
        })?;
        info!(
            target: SUPERVISOR_TARGET,
            pid = child.id(),
            executable = %service.executable().display(),
            "daemon launched"
        );

        let deadline = Instant::now() + self.launch_grace;
        while Instant::now() < deadline {
            let exited = child.try_wait().map_err(|source| SupervisorError::Wait {
                program: service.executable().as_os_str().to_os_string(),
                source,
            })?;
            match exited {
                Some(status) if status.success() => return Ok(()),
                Some(status) => {
                    return Err(SupervisorError::LaunchFailed {
                        executable: service.executable().to_path_buf(),
                        code: status.code(),
                    });
                }
                None => thread::sleep(self.poll_interval),
            }
        }
        // Still running in the foreground of its own session.
        Ok(())
    }
}

impl Supervisor for NativeSupervisor {
    fn probe(&self, service: &ServiceDescriptor) -> Result<bool, SupervisorError> {
        Ok(Self::live_pid(service.pid_file())?.is_some())
    }

    fn start(&self, service: &ServiceDescriptor) -> Result<StartStatus, SupervisorError> {
        if let Some(pid) = Self::live_pid(service.pid_file())? {
            debug!(
                target: SUPERVISOR_TARGET,
                pid = pid.as_raw(),
                "daemon already running"
            );
            return Ok(StartStatus::AlreadyRunning);
        }
        self.launch(service)?;
        Ok(StartStatus::Started)
    }

    fn stop(&self, pid_file: &Path, policy: &StopPolicy) -> Result<StopStatus, SupervisorError> {
        let Some(pid) = Self::live_pid(pid_file)? else {
            return Ok(StopStatus::NotRunning);
        };
        match policy {
            StopPolicy::Signal(signal) => {
                if deliver(pid, *signal)? {
                    Ok(StopStatus::Stopped)
                } else {
                    Ok(StopStatus::NotRunning)
                }
            }
            StopPolicy::Retry(schedule) => self.run_schedule(pid, schedule),
        }
    }
}

/// Sends `signal`; returns false when the process had already gone.
fn deliver(pid: Pid, signal: SignalName) -> Result<bool, SupervisorError> {
    match kill(pid, to_nix(signal)) {
        Ok(()) => Ok(true),
        Err(Errno::ESRCH) => Ok(false),
        Err(source) => Err(SupervisorError::Signal {
            pid: pid.as_raw(),
            signal,
            source,
        }),
    }
}

const fn to_nix(signal: SignalName) -> Signal {
    match signal {
        SignalName::Hup => Signal::SIGHUP,
        SignalName::Int => Signal::SIGINT,
        SignalName::Quit => Signal::SIGQUIT,
        SignalName::Kill => Signal::SIGKILL,
        SignalName::Usr1 => Signal::SIGUSR1,
        SignalName::Usr2 => Signal::SIGUSR2,
        SignalName::Term => Signal::SIGTERM,
    }
}

fn apply_identity(command: &mut Command, user: &str) -> Result<(), SupervisorError> {
    use std::os::unix::process::CommandExt;

    let account = User::from_name(user)
        .map_err(|source| SupervisorError::UserLookup {
            user: user.to_owned(),
            source,
        })?
        .ok_or_else(|| SupervisorError::UnknownUser {
            user: user.to_owned(),
        })?;
    let euid = geteuid();
    if euid == account.uid {
        return Ok(());
    }
    if !euid.is_root() {
        return Err(SupervisorError::UserSwitchDenied {
            user: user.to_owned(),
        });
    }
    command
        .uid(account.uid.as_raw())
        .gid(account.gid.as_raw())
        .env("HOME", &account.dir)
        .env("USER", &account.name);
    Ok(())
}

fn detach(command: &mut Command) {
    use std::os::unix::process::CommandExt;

    // SAFETY: `setsid(2)` is async-signal-safe and touches no parent state.
    unsafe {
        command.pre_exec(|| setsid().map(drop).map_err(std::io::Error::from));
    }
}
