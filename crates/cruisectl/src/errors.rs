//! Error types for the CLI runtime.

use std::process::ExitCode;
use std::sync::Arc;

use cruisectl_config::ServiceDescriptorError;
use thiserror::Error;

use crate::lifecycle::{EXIT_NOT_CONFIGURED, EXIT_USAGE, LifecycleError};
use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("Usage: {script} {{start|stop|status|restart|reload|force-reload}}")]
    Usage { script: String },
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("failed to initialise logging: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("invalid service configuration: {0}")]
    Descriptor(#[from] ServiceDescriptorError),
    #[error("{0}")]
    Lifecycle(#[from] LifecycleError),
    #[error("failed to write output: {0}")]
    Output(#[source] std::io::Error),
}

impl AppError {
    /// LSB exit code reported for this error.
    pub(crate) fn exit_code(&self) -> ExitCode {
        match self {
            Self::Usage { .. } => ExitCode::from(EXIT_USAGE),
            Self::LoadConfiguration(_) | Self::Telemetry(_) | Self::Descriptor(_) => {
                ExitCode::from(EXIT_NOT_CONFIGURED)
            }
            Self::Lifecycle(_) | Self::Output(_) => ExitCode::FAILURE,
        }
    }
}
