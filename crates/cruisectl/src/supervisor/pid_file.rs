//! PID file parsing and process liveness probes.

use std::fs;
use std::io;
use std::path::Path;

use nix::errno::Errno;
use nix::sys::signal::kill;
use nix::unistd::Pid;

use super::SupervisorError;

/// Reads the PID recorded in `path`.
///
/// Returns `None` when the file is missing or does not hold a positive
/// integer; such files are treated as stale.
pub(crate) fn read_pid(path: &Path) -> Result<Option<Pid>, SupervisorError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(SupervisorError::ReadPidFile {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    Ok(content
        .split_whitespace()
        .next()
        .and_then(|token| token.parse::<i32>().ok())
        .filter(|pid| *pid > 0)
        .map(Pid::from_raw))
}

/// Reports whether `pid` names a live process.
pub(super) fn is_alive(pid: Pid) -> Result<bool, SupervisorError> {
    match kill(pid, None) {
        Ok(()) | Err(Errno::EPERM) => Ok(true),
        Err(Errno::ESRCH) => Ok(false),
        Err(source) => Err(SupervisorError::CheckProcess {
            pid: pid.as_raw(),
            source,
        }),
    }
}
