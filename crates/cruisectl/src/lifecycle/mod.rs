//! Lifecycle management for the CI daemon.
//!
//! This module is split into focused submodules so each concern remains small and
//! testable:
//! - [`types`] defines the lifecycle verbs, outcomes, and IO helpers.
//! - [`error`] captures the error surface exposed to the CLI.
//! - [`builders`] enumerates and force-stops builder PID files.
//! - [`progress`] renders LSB-style progress lines.
//! - [`controller`] implements the start/stop/restart/reload/status flows.

mod builders;
mod controller;
mod error;
mod progress;
mod types;

pub use controller::ServiceController;
pub use error::LifecycleError;
pub use types::{
    LifecycleCommand, LifecycleOutput, ReloadOutcome, RestartOutcome, StartOutcome,
    StatusOutcome, StopOutcome,
};
pub(crate) use types::{EXIT_NOT_CONFIGURED, EXIT_USAGE};

pub(crate) const LIFECYCLE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::lifecycle");
