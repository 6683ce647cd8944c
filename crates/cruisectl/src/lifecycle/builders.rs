//! Builder PID directory handling.
//!
//! Each running builder records itself as `<builder>.pid` in the builder
//! directory. On stop every recorded builder is killed outright and its file
//! removed. An empty or absent directory is a successful no-op.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use cruisectl_config::SignalName;
use tracing::{debug, warn};

use super::LIFECYCLE_TARGET;
use super::error::LifecycleError;
use crate::supervisor::{StopPolicy, StopStatus, Supervisor};

/// Summary of a builder sweep.
#[derive(Debug, Default, PartialEq, Eq)]
pub(super) struct BuilderSweep {
    pub(super) killed: usize,
    pub(super) stale: usize,
    pub(super) failures: Vec<PathBuf>,
}

/// Lists `*.pid` files in `dir`, sorted by path.
pub(super) fn builder_pid_files(dir: &Path) -> Result<Vec<PathBuf>, LifecycleError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(LifecycleError::ListBuilders {
                path: dir.to_path_buf(),
                source,
            });
        }
    };
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| LifecycleError::ListBuilders {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let is_pid = path.extension().is_some_and(|extension| extension == "pid");
        let is_file = entry.file_type().is_ok_and(|kind| kind.is_file());
        if is_pid && is_file {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Force-kills every builder recorded in `dir` and removes its PID file.
///
/// A builder whose kill fails keeps its PID file and is reported in
/// [`BuilderSweep::failures`], as is a killed builder whose PID file cannot be
/// removed. Either way the sweep continues with the remaining files.
pub(super) fn sweep_builders<S>(supervisor: &S, dir: &Path) -> Result<BuilderSweep, LifecycleError>
where
    S: Supervisor + ?Sized,
{
    let policy = StopPolicy::Signal(SignalName::Kill);
    let mut sweep = BuilderSweep::default();
    for pid_file in builder_pid_files(dir)? {
        match supervisor.stop(&pid_file, &policy) {
            Ok(StopStatus::Stopped) => sweep.killed += 1,
            Ok(StopStatus::NotRunning) => sweep.stale += 1,
            Ok(StopStatus::StillRunning) => {
                sweep.failures.push(pid_file);
                continue;
            }
            Err(error) => {
                warn!(
                    target: LIFECYCLE_TARGET,
                    file = %pid_file.display(),
                    error = %error,
                    "failed to kill builder"
                );
                sweep.failures.push(pid_file);
                continue;
            }
        }
        if let Err(error) = remove_pid_file(&pid_file) {
            warn!(
                target: LIFECYCLE_TARGET,
                error = %error,
                "failed to remove builder pid file"
            );
            sweep.failures.push(pid_file);
        }
    }
    debug!(
        target: LIFECYCLE_TARGET,
        dir = %dir.display(),
        killed = sweep.killed,
        stale = sweep.stale,
        failed = sweep.failures.len(),
        "builder sweep finished"
    );
    Ok(sweep)
}

/// Removes a PID file, tolerating one that has already vanished.
///
/// Returns true when a file was removed.
pub(super) fn remove_pid_file(path: &Path) -> Result<bool, LifecycleError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(LifecycleError::RemovePidFile {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::supervisor::MockSupervisor;

    #[test]
    fn missing_directory_lists_nothing() {
        let temp_dir = TempDir::new().expect("temp dir");
        let files = builder_pid_files(&temp_dir.path().join("builders")).expect("list");
        assert!(files.is_empty());
    }

    #[test]
    fn lists_only_pid_files() {
        let temp_dir = TempDir::new().expect("temp dir");
        fs::write(temp_dir.path().join("b.pid"), "2").expect("write");
        fs::write(temp_dir.path().join("a.pid"), "1").expect("write");
        fs::write(temp_dir.path().join("notes.txt"), "x").expect("write");
        fs::create_dir(temp_dir.path().join("nested.pid")).expect("mkdir");
        let files = builder_pid_files(temp_dir.path()).expect("list");
        assert_eq!(
            files,
            vec![temp_dir.path().join("a.pid"), temp_dir.path().join("b.pid")]
        );
    }

    #[test]
    fn empty_directory_sweeps_without_supervisor_calls() {
        let temp_dir = TempDir::new().expect("temp dir");
        let mut supervisor = MockSupervisor::new();
        supervisor.expect_stop().never();
        let sweep = sweep_builders(&supervisor, temp_dir.path()).expect("sweep");
        assert_eq!(sweep, BuilderSweep::default());
    }

    #[test]
    fn failed_kill_keeps_pid_file_and_continues() {
        let temp_dir = TempDir::new().expect("temp dir");
        let stuck = temp_dir.path().join("a.pid");
        let stale = temp_dir.path().join("b.pid");
        fs::write(&stuck, "1").expect("write");
        fs::write(&stale, "2").expect("write");

        let mut supervisor = MockSupervisor::new();
        let stuck_path = stuck.clone();
        supervisor
            .expect_stop()
            .times(2)
            .returning(move |pid_file, policy| {
                assert_eq!(policy, &StopPolicy::Signal(SignalName::Kill));
                if pid_file == stuck_path {
                    Ok(StopStatus::StillRunning)
                } else {
                    Ok(StopStatus::NotRunning)
                }
            });

        let sweep = sweep_builders(&supervisor, temp_dir.path()).expect("sweep");
        assert_eq!(sweep.stale, 1);
        assert_eq!(sweep.failures, vec![stuck.clone()]);
        assert!(stuck.exists());
        assert!(!stale.exists());
    }

    #[test]
    fn unremovable_pid_file_does_not_stop_the_sweep() {
        let temp_dir = TempDir::new().expect("temp dir");
        let blocked = temp_dir.path().join("a.pid");
        let next = temp_dir.path().join("b.pid");
        fs::write(&blocked, "1").expect("write");
        fs::write(&next, "2").expect("write");

        let mut supervisor = MockSupervisor::new();
        let blocked_path = blocked.clone();
        supervisor
            .expect_stop()
            .times(2)
            .returning(move |pid_file, _| {
                if pid_file == blocked_path {
                    // Replace the file with a directory so removal fails.
                    fs::remove_file(pid_file).expect("remove file");
                    fs::create_dir(pid_file).expect("create dir");
                }
                Ok(StopStatus::Stopped)
            });

        let sweep = sweep_builders(&supervisor, temp_dir.path()).expect("sweep");
        assert_eq!(sweep.killed, 2);
        assert_eq!(sweep.failures, vec![blocked.clone()]);
        assert!(blocked.is_dir());
        assert!(!next.exists());
    }

    #[test]
    fn removing_vanished_file_is_not_an_error() {
        let temp_dir = TempDir::new().expect("temp dir");
        let removed = remove_pid_file(&temp_dir.path().join("gone.pid")).expect("remove");
        assert!(!removed);
    }
}
