//! Init-script entrypoint for the CruiseControl.rb daemon.
//!
//! Delegates to [`cruisectl::run`], which loads configuration, parses the
//! lifecycle verb, and drives the configured supervisor.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    cruisectl::run(std::env::args_os(), &mut stdout, &mut stderr)
}
