//! Init-script runtime for the CruiseControl.rb continuous integration daemon.
//!
//! The crate owns verb parsing, configuration bootstrapping, and the
//! start/stop/restart/reload/status flows. Process control is delegated to a
//! [`Supervisor`] so the flows can be exercised in tests without spawning the
//! real daemon. Exit codes follow the LSB init-script conventions.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use cruisectl_config::{Config, DEFAULT_NAME, ServiceDescriptor};

mod cli;
mod config;
mod errors;
mod lifecycle;
mod supervisor;
mod telemetry;
#[cfg(test)]
mod tests;

pub(crate) use cli::{Cli, ServiceAction};
use config::{ConfigLoader, OrthoConfigLoader, split_config_arguments};
pub(crate) use errors::AppError;
pub use lifecycle::{
    LifecycleCommand, LifecycleError, LifecycleOutput, ReloadOutcome, RestartOutcome,
    ServiceController, StartOutcome, StatusOutcome, StopOutcome,
};
pub use supervisor::{
    NativeSupervisor, StartStatus, StartStopDaemon, StopPolicy, StopStatus, Supervisor,
    SupervisorError, SystemSupervisor,
};
pub use telemetry::TelemetryError;

/// Bundles the IO streams provided to the CLI runtime.
pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

impl<'a, W: Write, E: Write> IoStreams<'a, W, E> {
    pub(crate) fn new(stdout: &'a mut W, stderr: &'a mut E) -> Self {
        Self { stdout, stderr }
    }
}

/// What the verb parser decided.
enum Parsed {
    Action(ServiceAction),
    /// Help or version output was requested and rendered.
    Displayed(String),
}

struct CliRunner<'a, W: Write, E: Write, L: ConfigLoader> {
    io: &'a mut IoStreams<'a, W, E>,
    loader: &'a L,
}

impl<'a, W, E, L> CliRunner<'a, W, E, L>
where
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    fn new(io: &'a mut IoStreams<'a, W, E>, loader: &'a L) -> Self {
        Self { io, loader }
    }

    fn run<I>(&mut self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
    {
        self.run_with_supervisor(args, SystemSupervisor::from_config)
    }

    fn run_with_supervisor<I, S, F>(&mut self, args: I, build_supervisor: F) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
        S: Supervisor,
        F: FnOnce(&Config) -> S,
    {
        match self.execute(args, build_supervisor) {
            Ok(exit_code) => exit_code,
            Err(error) => {
                let _ = match &error {
                    AppError::Usage { .. } => writeln!(self.io.stderr, "{error}"),
                    _ => writeln!(self.io.stderr, "{}: {error}", env!("CARGO_PKG_NAME")),
                };
                error.exit_code()
            }
        }
    }

    fn execute<I, S, F>(&mut self, args: I, build_supervisor: F) -> Result<ExitCode, AppError>
    where
        I: IntoIterator<Item = OsString>,
        S: Supervisor,
        F: FnOnce(&Config) -> S,
    {
        let args: Vec<OsString> = args.into_iter().collect();
        let split = split_config_arguments(&args);

        let action = match parse_action(&args, split.command_start) {
            Some(Parsed::Action(action)) => action,
            Some(Parsed::Displayed(text)) => {
                write!(self.io.stdout, "{text}").map_err(AppError::Output)?;
                return Ok(ExitCode::SUCCESS);
            }
            None => {
                return Err(AppError::Usage {
                    script: self.script_name(&split.config_arguments),
                });
            }
        };

        let config = self.loader.load(&split.config_arguments)?;
        telemetry::initialise(&config)?;
        let service = ServiceDescriptor::from_config(&config)?;
        let controller = ServiceController::new(&service, build_supervisor(&config), config.verbose());
        let mut output = LifecycleOutput::new(&mut *self.io.stdout, &mut *self.io.stderr);
        Ok(controller.handle(action.into(), &mut output)?)
    }

    /// Best-effort init-script path for the usage line; configuration
    /// problems fall back to the default service name.
    fn script_name(&self, config_arguments: &[OsString]) -> String {
        self.loader
            .load(config_arguments)
            .ok()
            .and_then(|config| ServiceDescriptor::from_config(&config).ok())
            .map_or_else(
                || format!("/etc/init.d/{DEFAULT_NAME}"),
                |service| service.script_name(),
            )
    }
}

/// Parses the verb following the configuration flags. `None` means the verb
/// was missing or unknown.
fn parse_action(args: &[OsString], command_start: usize) -> Option<Parsed> {
    let program = args
        .first()
        .cloned()
        .unwrap_or_else(|| OsString::from(env!("CARGO_PKG_NAME")));
    let remainder = args.get(command_start..).unwrap_or_default();
    let tokens = std::iter::once(program).chain(remainder.iter().cloned());
    match Cli::try_parse_from(tokens) {
        Ok(cli) => Some(Parsed::Action(cli.action)),
        Err(error) if matches!(error.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            Some(Parsed::Displayed(error.render().to_string()))
        }
        Err(_) => None,
    }
}

/// Runs the init-script CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let mut io = IoStreams::new(stdout, stderr);
    CliRunner::new(&mut io, &OrthoConfigLoader).run(args)
}
