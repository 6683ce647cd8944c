//! Configuration loading helpers for the service wrapper.
//!
//! Configuration flags must precede the lifecycle verb. The logic here peels
//! them off so `ortho_config` only receives supported flags while clap parses
//! the remaining command tokens.

use std::ffi::{OsStr, OsString};

use cruisectl_config::Config;
use ortho_config::OrthoConfig;

use crate::AppError;

/// CLI flags recognised by the configuration loader. Each takes a value.
///
/// MAINTENANCE: keep in sync with the fields of `cruisectl_config::Config`.
pub(crate) const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--name",
    "--description",
    "--install-dir",
    "--daemon",
    "--daemon-args",
    "--extra-args",
    "--user",
    "--data-root",
    "--pid-file",
    "--builder-pid-dir",
    "--stop-retry",
    "--search-path",
    "--supervisor",
    "--start-stop-daemon",
    "--log-filter",
    "--log-format",
];

pub(crate) trait ConfigLoader {
    /// Loads configuration from the filtered configuration arguments.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

pub(crate) struct OrthoConfigLoader;

#[derive(Debug, Clone, Copy)]
enum FlagAction {
    Include { needs_value: bool },
    Skip,
}

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

impl OrthoConfigLoader {
    fn process_config_flag(argument: &OsStr) -> FlagAction {
        let argument_text = argument.to_string_lossy();
        if !argument_text.starts_with("--") {
            return FlagAction::Skip;
        }

        let (flag, has_inline_value) = match argument_text.split_once('=') {
            Some((flag, _)) => (flag, true),
            None => (argument_text.as_ref(), false),
        };

        if CONFIG_CLI_FLAGS.contains(&flag) {
            return FlagAction::Include {
                needs_value: !has_inline_value,
            };
        }

        FlagAction::Skip
    }
}

pub(crate) struct ConfigArgumentSplit {
    pub(crate) config_arguments: Vec<OsString>,
    pub(crate) command_start: usize,
}

pub(crate) fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let Some((program, rest)) = args.split_first() else {
        return ConfigArgumentSplit {
            config_arguments: Vec::new(),
            command_start: 0,
        };
    };

    let mut filtered: Vec<OsString> = vec![program.clone()];
    let mut command_start = 1usize;
    let mut pending_flag: Option<&OsString> = None;

    for argument in rest {
        if let Some(flag) = pending_flag.take() {
            filtered.push(join_flag_value(flag, argument));
            command_start += 1;
            continue;
        }

        match OrthoConfigLoader::process_config_flag(argument.as_os_str()) {
            FlagAction::Include { needs_value: true } => {
                pending_flag = Some(argument);
                command_start += 1;
            }
            FlagAction::Include { needs_value: false } => {
                filtered.push(argument.clone());
                command_start += 1;
            }
            FlagAction::Skip => break,
        }
    }
    // A trailing flag without a value is left for the loader to reject.
    if let Some(flag) = pending_flag {
        filtered.push(flag.clone());
    }

    ConfigArgumentSplit {
        config_arguments: filtered,
        command_start,
    }
}

/// Fuses a separated flag and value into `--flag=value`, so values that
/// themselves start with `--` are not mistaken for flags.
fn join_flag_value(flag: &OsStr, value: &OsStr) -> OsString {
    let mut joined = flag.to_os_string();
    joined.push("=");
    joined.push(value);
    joined
}
