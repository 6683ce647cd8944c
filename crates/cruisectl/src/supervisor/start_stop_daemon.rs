//! Supervisor backed by the Debian `start-stop-daemon` utility.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use cruisectl_config::ServiceDescriptor;
use tracing::debug;

use super::{
    SUPERVISOR_TARGET, StartStatus, StopPolicy, StopStatus, Supervisor, SupervisorError,
};

/// Delegates process control to `start-stop-daemon`.
#[derive(Debug, Clone)]
pub struct StartStopDaemon {
    program: PathBuf,
}

impl StartStopDaemon {
    /// Builds a backend that invokes `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Program invoked for every supervisor call.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn run(
        &self,
        action: &'static str,
        args: &[OsString],
        service: Option<&ServiceDescriptor>,
        quiet: bool,
    ) -> Result<Option<i32>, SupervisorError> {
        debug!(
            target: SUPERVISOR_TARGET,
            program = %self.program.display(),
            action,
            ?args,
            "invoking start-stop-daemon"
        );
        let mut command = Command::new(&self.program);
        command.args(args).stdin(Stdio::null());
        if quiet {
            command.stdout(Stdio::null());
        }
        if let Some(service) = service {
            command.envs(service.environment());
        }
        let status = command.status().map_err(|source| SupervisorError::Spawn {
            program: self.program.clone().into_os_string(),
            source,
        })?;
        Ok(status.code())
    }

    fn trouble(&self, action: &'static str, code: Option<i32>) -> SupervisorError {
        SupervisorError::Trouble {
            program: self.program.clone().into_os_string(),
            action,
            code,
        }
    }
}

impl Supervisor for StartStopDaemon {
    fn probe(&self, service: &ServiceDescriptor) -> Result<bool, SupervisorError> {
        match self.run("probe", &probe_args(service), Some(service), true)? {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            code => Err(self.trouble("probe", code)),
        }
    }

    fn start(&self, service: &ServiceDescriptor) -> Result<StartStatus, SupervisorError> {
        match self.run("start", &start_args(service), Some(service), false)? {
            Some(0) => Ok(StartStatus::Started),
            Some(1) => Ok(StartStatus::AlreadyRunning),
            code => Err(self.trouble("start", code)),
        }
    }

    fn stop(&self, pid_file: &Path, policy: &StopPolicy) -> Result<StopStatus, SupervisorError> {
        match self.run("stop", &stop_args(pid_file, policy), None, false)? {
            Some(0) => Ok(StopStatus::Stopped),
            Some(1) => Ok(StopStatus::NotRunning),
            Some(2) => Ok(StopStatus::StillRunning),
            code => Err(self.trouble("stop", code)),
        }
    }
}

fn launch_options(service: &ServiceDescriptor) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "--chuid".into(),
        service.user().into(),
        "--chdir".into(),
        service.working_dir().into(),
        "--quiet".into(),
    ];
    args.extend(service.extra_args().iter().map(OsString::from));
    args
}

fn probe_args(service: &ServiceDescriptor) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "--start".into(),
        "--test".into(),
        "--pidfile".into(),
        service.pid_file().into(),
    ];
    args.extend(launch_options(service));
    args.push("--exec".into());
    args.push(service.executable().into());
    args
}

fn start_args(service: &ServiceDescriptor) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["--start".into(), "--pidfile".into(), service.pid_file().into()];
    args.extend(launch_options(service));
    args.push("--exec".into());
    args.push(service.executable().into());
    args.push("--".into());
    args.extend(service.daemon_args().iter().map(OsString::from));
    args
}

fn stop_args(pid_file: &Path, policy: &StopPolicy) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["--stop".into()];
    match policy {
        StopPolicy::Signal(signal) => {
            args.push("--signal".into());
            args.push(signal.to_string().into());
        }
        StopPolicy::Retry(schedule) => args.push(format!("--retry={schedule}").into()),
    }
    args.push("--pidfile".into());
    args.push(pid_file.into());
    args
}
