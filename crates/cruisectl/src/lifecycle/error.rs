//! Error types for daemon lifecycle operations.

use std::io;
use std::path::PathBuf;

use cruisectl_config::RetrySchedule;
use thiserror::Error;

use crate::supervisor::SupervisorError;

/// Errors raised while executing lifecycle commands.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("supervisor failed: {0}")]
    Supervisor(#[from] SupervisorError),
    #[error("daemon recorded in {pid_file:?} survived the stop schedule {schedule}")]
    StopTimeout {
        pid_file: PathBuf,
        schedule: RetrySchedule,
    },
    #[error("failed to list builder pid files in {path:?}: {source}")]
    ListBuilders {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{failed} builder(s) could not be stopped or cleaned up; first: {first:?}")]
    BuildersSurvived { failed: usize, first: PathBuf },
    #[error("failed to remove pid file {path:?}: {source}")]
    RemovePidFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write lifecycle output: {0}")]
    Io(#[source] io::Error),
}
