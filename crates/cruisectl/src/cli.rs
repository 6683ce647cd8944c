//! CLI argument definitions for the service wrapper.

use clap::{Parser, Subcommand};

/// Init-script style control of the CI daemon.
#[derive(Parser, Debug)]
#[command(name = "cruisectl", version, disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// The lifecycle action to perform.
    #[command(subcommand)]
    pub(crate) action: ServiceAction,
}

/// Lifecycle actions accepted on the command line.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ServiceAction {
    /// Starts the daemon unless it is already running.
    Start,
    /// Stops the daemon and kills its builders.
    Stop,
    /// Reports whether the daemon is running.
    Status,
    /// Stops, then starts, the daemon.
    Restart,
    /// Signals the daemon to reload its configuration.
    Reload,
    /// Same as `reload`; never restarts the daemon.
    ForceReload,
}

#[cfg(test)]
mod tests {
    use clap::error::ErrorKind;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("start", ServiceAction::Start)]
    #[case("stop", ServiceAction::Stop)]
    #[case("status", ServiceAction::Status)]
    #[case("restart", ServiceAction::Restart)]
    #[case("reload", ServiceAction::Reload)]
    #[case("force-reload", ServiceAction::ForceReload)]
    fn parses_lsb_verbs(#[case] verb: &str, #[case] expected: ServiceAction) {
        let cli = Cli::try_parse_from(["cruisectl", verb]).expect("parse");
        assert_eq!(cli.action, expected);
    }

    #[test]
    fn rejects_unknown_verbs() {
        let error = Cli::try_parse_from(["cruisectl", "frobnicate"]).expect_err("should fail");
        assert_eq!(error.kind(), ErrorKind::InvalidSubcommand);
    }
}
