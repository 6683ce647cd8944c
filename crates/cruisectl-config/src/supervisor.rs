use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Backend used to supervise the daemon.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum SupervisorKind {
    /// Delegate to the Debian `start-stop-daemon` utility.
    #[default]
    StartStopDaemon,
    /// Signal and launch processes directly.
    Native,
}

/// Errors encountered while parsing a [`SupervisorKind`] from text.
pub type SupervisorKindParseError = strum::ParseError;
