//! High-level orchestration for service lifecycle commands.
//!
//! This module wires the start/stop/restart/reload/status flows together on
//! top of an injected [`Supervisor`], and maps their outcomes onto LSB exit
//! codes and progress lines.

use std::io::Write;
use std::process::ExitCode;

use cruisectl_config::{ServiceDescriptor, SignalName};
use tracing::{info, warn};

use super::LIFECYCLE_TARGET;
use super::builders::{remove_pid_file, sweep_builders};
use super::error::LifecycleError;
use super::progress::{EndStatus, Progress};
use super::types::{
    LifecycleCommand, LifecycleOutput, ReloadOutcome, RestartOutcome, StartOutcome,
    StatusOutcome, StopOutcome,
};
use crate::supervisor::{StartStatus, StopPolicy, StopStatus, Supervisor};

/// Drives the daemon through its lifecycle.
pub struct ServiceController<'a, S> {
    service: &'a ServiceDescriptor,
    supervisor: S,
    verbose: bool,
}

impl<'a, S: Supervisor> ServiceController<'a, S> {
    pub fn new(service: &'a ServiceDescriptor, supervisor: S, verbose: bool) -> Self {
        Self {
            service,
            supervisor,
            verbose,
        }
    }

    /// Starts the daemon unless the PID file names a live process.
    pub fn start(&self) -> Result<StartOutcome, LifecycleError> {
        if self.supervisor.probe(self.service)? {
            info!(
                target: LIFECYCLE_TARGET,
                pid_file = %self.service.pid_file().display(),
                "daemon already running"
            );
            return Ok(StartOutcome::AlreadyRunning);
        }
        let outcome = match self.supervisor.start(self.service)? {
            StartStatus::Started => StartOutcome::Started,
            StartStatus::AlreadyRunning => StartOutcome::AlreadyRunning,
        };
        info!(
            target: LIFECYCLE_TARGET,
            executable = %self.service.executable().display(),
            user = self.service.user(),
            ?outcome,
            "start finished"
        );
        Ok(outcome)
    }

    /// Stops the daemon, kills every recorded builder, and removes the
    /// primary PID file.
    ///
    /// A daemon that survives the stop schedule fails the stop before any
    /// builder is touched. Builders that cannot be killed fail the stop after
    /// the remaining builders and the primary PID file have been handled.
    pub fn stop(&self) -> Result<StopOutcome, LifecycleError> {
        let schedule = self.service.stop_retry();
        let pid_file = self.service.pid_file();
        let status = self
            .supervisor
            .stop(pid_file, &StopPolicy::Retry(schedule.clone()))?;
        let outcome = match status {
            StopStatus::Stopped => StopOutcome::Stopped,
            StopStatus::NotRunning => StopOutcome::AlreadyStopped,
            StopStatus::StillRunning => {
                return Err(LifecycleError::StopTimeout {
                    pid_file: pid_file.to_path_buf(),
                    schedule: schedule.clone(),
                });
            }
        };

        let sweep = sweep_builders(&self.supervisor, self.service.builder_pid_dir())?;
        if remove_pid_file(pid_file)? {
            info!(
                target: LIFECYCLE_TARGET,
                file = %pid_file.display(),
                "removed leftover pid file"
            );
        }
        if let Some(first) = sweep.failures.first() {
            return Err(LifecycleError::BuildersSurvived {
                failed: sweep.failures.len(),
                first: first.clone(),
            });
        }
        info!(
            target: LIFECYCLE_TARGET,
            ?outcome,
            builders_killed = sweep.killed,
            builders_stale = sweep.stale,
            "stop finished"
        );
        Ok(outcome)
    }

    /// Stops then starts the daemon; a failed stop skips the start.
    pub fn restart(&self) -> Result<RestartOutcome, LifecycleError> {
        self.stop()?;
        match self.start()? {
            StartOutcome::Started => Ok(RestartOutcome::Restarted),
            StartOutcome::AlreadyRunning => Ok(RestartOutcome::OldProcessRunning),
        }
    }

    /// Asks the daemon to reload its configuration. Best-effort: delivery
    /// failures are logged, never returned.
    pub fn reload(&self) -> ReloadOutcome {
        let policy = StopPolicy::Signal(SignalName::Hup);
        match self.supervisor.stop(self.service.pid_file(), &policy) {
            Ok(StopStatus::Stopped) => ReloadOutcome::Signalled,
            Ok(StopStatus::NotRunning) => ReloadOutcome::NotRunning,
            Ok(StopStatus::StillRunning) => ReloadOutcome::Undelivered,
            Err(error) => {
                warn!(
                    target: LIFECYCLE_TARGET,
                    error = %error,
                    "reload signal not delivered"
                );
                ReloadOutcome::Undelivered
            }
        }
    }

    /// Reports whether the daemon is running.
    pub fn status(&self) -> Result<StatusOutcome, LifecycleError> {
        if self.supervisor.probe(self.service)? {
            return Ok(StatusOutcome::Running);
        }
        if self.service.pid_file().exists() {
            Ok(StatusOutcome::DeadWithPidFile)
        } else {
            Ok(StatusOutcome::NotRunning)
        }
    }

    /// Runs `command`, printing LSB progress lines and returning the exit code.
    pub fn handle<W: Write, E: Write>(
        &self,
        command: LifecycleCommand,
        output: &mut LifecycleOutput<W, E>,
    ) -> Result<ExitCode, LifecycleError> {
        if !self.service.is_installed() {
            return self.not_installed(command, output);
        }
        let operation: fn(&Self) -> Result<EndStatus, LifecycleError> = match command {
            LifecycleCommand::Status => return self.report_status(output),
            LifecycleCommand::Start => |this| {
                this.start().map(|outcome| match outcome {
                    StartOutcome::Started => EndStatus::Success,
                    StartOutcome::AlreadyRunning => EndStatus::Warning,
                })
            },
            LifecycleCommand::Stop => |this| {
                this.stop().map(|outcome| match outcome {
                    StopOutcome::Stopped => EndStatus::Success,
                    StopOutcome::AlreadyStopped => EndStatus::Warning,
                })
            },
            LifecycleCommand::Restart => |this| {
                this.restart().map(|outcome| match outcome {
                    RestartOutcome::Restarted => EndStatus::Success,
                    RestartOutcome::OldProcessRunning => EndStatus::Failure,
                })
            },
            LifecycleCommand::Reload | LifecycleCommand::ForceReload => |this| {
                Ok(match this.reload() {
                    ReloadOutcome::Signalled => EndStatus::Success,
                    ReloadOutcome::NotRunning | ReloadOutcome::Undelivered => EndStatus::Warning,
                })
            },
        };
        let progress = Progress::begin(
            output,
            command,
            self.service.description(),
            self.service.name(),
            self.verbose,
        )?;
        let result = operation(self);
        match result {
            Ok(status) => {
                progress.end(output, status)?;
                if status == EndStatus::Failure {
                    Ok(ExitCode::FAILURE)
                } else {
                    Ok(ExitCode::SUCCESS)
                }
            }
            Err(error) => {
                progress.end(output, EndStatus::Failure)?;
                Err(error)
            }
        }
    }

    fn report_status<W: Write, E: Write>(
        &self,
        output: &mut LifecycleOutput<W, E>,
    ) -> Result<ExitCode, LifecycleError> {
        let outcome = self.status()?;
        let name = self.service.name();
        match outcome {
            StatusOutcome::Running => output.stdout_line(format_args!("{name} is running."))?,
            StatusOutcome::DeadWithPidFile => output.stdout_line(format_args!(
                "{name} is not running but pid file {} exists.",
                self.service.pid_file().display()
            ))?,
            StatusOutcome::NotRunning => {
                output.stdout_line(format_args!("{name} is not running."))?;
            }
        }
        Ok(ExitCode::from(outcome.exit_code()))
    }

    fn not_installed<W: Write, E: Write>(
        &self,
        command: LifecycleCommand,
        output: &mut LifecycleOutput<W, E>,
    ) -> Result<ExitCode, LifecycleError> {
        info!(
            target: LIFECYCLE_TARGET,
            executable = %self.service.executable().display(),
            %command,
            "daemon not installed; nothing to do"
        );
        if command == LifecycleCommand::Status {
            output.stdout_line(format_args!("{} is not running.", self.service.name()))?;
            return Ok(ExitCode::from(StatusOutcome::NotRunning.exit_code()));
        }
        Ok(ExitCode::SUCCESS)
    }
}
