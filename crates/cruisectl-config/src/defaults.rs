use std::path::PathBuf;

use crate::logging::LogFormat;
use crate::retry::RetrySchedule;

/// Default service name.
pub const DEFAULT_NAME: &str = "cruisecontrolrb";

/// Default service description.
pub const DEFAULT_DESCRIPTION: &str = "Continuous Integration";

/// Default installation directory of the CI daemon.
pub const DEFAULT_INSTALL_DIR: &str = "/opt/cruisecontrolrb";

/// Default daemon arguments.
pub const DEFAULT_DAEMON_ARGS: &str = "start --daemon --port 3131 --trace";

/// Default account the daemon runs as.
pub const DEFAULT_USER: &str = "ccrb";

/// Default data root exported to the daemon.
pub const DEFAULT_DATA_ROOT: &str = "/var/lib/cruisecontrolrb";

/// Default executable search path handed to the daemon.
pub const DEFAULT_SEARCH_PATH: &str =
    "/usr/sbin:/usr/bin:/sbin:/bin:/usr/local/bin:/var/lib/gems/1.8/bin/";

/// Default `start-stop-daemon` location, resolved through `PATH`.
pub const DEFAULT_START_STOP_DAEMON: &str = "start-stop-daemon";

/// Default log filter expression.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Owned log filter value used where allocation is required (e.g. serde).
pub(crate) fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format; the wrapper runs interactively, so compact.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

pub(crate) fn default_name() -> String {
    DEFAULT_NAME.to_owned()
}

pub(crate) fn default_description() -> String {
    DEFAULT_DESCRIPTION.to_owned()
}

pub(crate) fn default_install_dir() -> PathBuf {
    PathBuf::from(DEFAULT_INSTALL_DIR)
}

pub(crate) fn default_daemon_args() -> String {
    DEFAULT_DAEMON_ARGS.to_owned()
}

pub(crate) fn default_user() -> String {
    DEFAULT_USER.to_owned()
}

pub(crate) fn default_data_root() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_ROOT)
}

/// Renders as `TERM/30/KILL/5`.
pub(crate) fn default_stop_retry() -> RetrySchedule {
    RetrySchedule::graceful_then_forceful(30, 5)
}

pub(crate) fn default_search_path() -> String {
    DEFAULT_SEARCH_PATH.to_owned()
}

pub(crate) fn default_start_stop_daemon() -> PathBuf {
    PathBuf::from(DEFAULT_START_STOP_DAEMON)
}
