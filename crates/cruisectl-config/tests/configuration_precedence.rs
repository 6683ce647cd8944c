//! Checks the precedence of configuration layers: defaults, file,
//! environment, and command-line flags.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use once_cell::sync::Lazy;
use ortho_config::OrthoConfig;
use tempfile::TempDir;

use cruisectl_config::{Config, LogFormat, SupervisorKind};

static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

struct EnvOverride {
    key: &'static str,
    previous: Option<OsString>,
    _guard: MutexGuard<'static, ()>,
}

impl EnvOverride {
    fn set_var(key: &'static str, value: &OsStr) -> Self {
        let guard = ENV_MUTEX
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let previous = std::env::var_os(key);
        // Edition 2024 marks environment mutation as unsafe; the mutex keeps
        // tests in this binary from racing and `Drop` restores the value.
        unsafe { std::env::set_var(key, value) };
        Self {
            key,
            previous,
            _guard: guard,
        }
    }
}

impl Drop for EnvOverride {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(value) => unsafe { std::env::set_var(self.key, value) },
            None => unsafe { std::env::remove_var(self.key) },
        }
    }
}

fn write_config(temp_dir: &TempDir, contents: &str) -> PathBuf {
    let path = temp_dir.path().join("cruisectl.toml");
    fs::write(&path, contents).expect("write configuration");
    path
}

fn load(args: &[&OsStr]) -> Config {
    let mut argv = vec![OsString::from("cruisectl")];
    argv.extend(args.iter().map(|arg| arg.to_os_string()));
    Config::load_from_iter(argv).expect("configuration should load")
}

#[test]
fn defaults_apply_without_sources() {
    let _lock = ENV_MUTEX
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    let config = load(&[]);
    assert_eq!(config.user, "ccrb");
    assert_eq!(config.supervisor(), SupervisorKind::StartStopDaemon);
    assert_eq!(config.stop_retry().to_string(), "TERM/30/KILL/5");
}

#[test]
fn file_values_override_defaults() {
    let temp_dir = TempDir::new().expect("temp dir");
    let path = write_config(
        &temp_dir,
        concat!(
            "user = \"builder\"\n",
            "install_dir = \"/srv/ccrb\"\n",
            "stop_retry = \"TERM/10/KILL/2\"\n",
            "supervisor = \"native\"\n",
            "log_format = \"json\"\n",
        ),
    );
    let _lock = ENV_MUTEX
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    let config = load(&[OsStr::new("--config-path"), path.as_os_str()]);
    assert_eq!(config.user, "builder");
    assert_eq!(config.pid_file(), PathBuf::from("/srv/ccrb/tmp/pids/mongrel.pid"));
    assert_eq!(config.stop_retry().to_string(), "TERM/10/KILL/2");
    assert_eq!(config.supervisor(), SupervisorKind::Native);
    assert_eq!(config.log_format(), LogFormat::Json);
}

#[test]
fn environment_overrides_file() {
    let temp_dir = TempDir::new().expect("temp dir");
    let path = write_config(&temp_dir, "user = \"from-file\"\n");
    let _env = EnvOverride::set_var("CRUISECTL_USER", OsStr::new("from-env"));
    let config = load(&[OsStr::new("--config-path"), path.as_os_str()]);
    assert_eq!(config.user, "from-env");
}

#[test]
fn cli_overrides_environment() {
    let _env = EnvOverride::set_var("CRUISECTL_USER", OsStr::new("from-env"));
    let config = load(&[OsStr::new("--user"), OsStr::new("from-cli")]);
    assert_eq!(config.user, "from-cli");
}

#[test]
fn malformed_stop_schedule_fails_to_load() {
    let temp_dir = TempDir::new().expect("temp dir");
    let path = write_config(&temp_dir, "stop_retry = \"TERM/never\"\n");
    let _lock = ENV_MUTEX
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    let mut argv = vec![OsString::from("cruisectl"), OsString::from("--config-path")];
    argv.push(path.into_os_string());
    assert!(Config::load_from_iter(argv).is_err());
}
