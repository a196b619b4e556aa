//! Supervisor configuration.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::warn;

use crate::usecases::{DEFAULT_GRACE_PERIOD, SupervisorSettings};

const DEFAULT_WORKER_SCRIPT: &str = "recorder.py";
const DEFAULT_SOURCE_FILE: &str = "config/URL_config.ini";
const DEFAULT_DOWNLOAD_DIR: &str = "downloads";
const DEFAULT_PID_FILE: &str = "run/recorder.pid";
#[cfg(windows)]
const DEFAULT_INTERPRETER: &str = "python";
#[cfg(not(windows))]
const DEFAULT_INTERPRETER: &str = "python3";

#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    worker_script: PathBuf,
    interpreter: String,
    source_file: PathBuf,
    download_dir: PathBuf,
    pid_file: PathBuf,
    stop_grace: Duration,
    signature_scan: bool,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl SupervisorConfig {
    pub fn worker_script(&self) -> &Path {
        &self.worker_script
    }

    /// Directory the worker runs in; its path is also the process signature.
    pub fn worker_dir(&self) -> PathBuf {
        self.worker_script
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }

    pub fn source_file(&self) -> &Path {
        &self.source_file
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    pub fn pid_file(&self) -> &Path {
        &self.pid_file
    }

    pub fn stop_grace(&self) -> Duration {
        self.stop_grace
    }

    pub fn signature_scan(&self) -> bool {
        self.signature_scan
    }

    pub fn supervisor_settings(&self) -> SupervisorSettings {
        SupervisorSettings::default().with_grace_period(self.stop_grace)
    }

    pub fn from_env() -> Self {
        Self {
            worker_script: absolutize(parse_env_path(
                "STREAMGUARD_WORKER_SCRIPT",
                DEFAULT_WORKER_SCRIPT,
            )),
            interpreter: parse_env_string("STREAMGUARD_WORKER_INTERPRETER", DEFAULT_INTERPRETER),
            source_file: parse_env_path("STREAMGUARD_SOURCE_FILE", DEFAULT_SOURCE_FILE),
            download_dir: parse_env_path("STREAMGUARD_DOWNLOAD_DIR", DEFAULT_DOWNLOAD_DIR),
            pid_file: parse_env_path("STREAMGUARD_PID_FILE", DEFAULT_PID_FILE),
            stop_grace: Duration::from_secs(parse_env_u64(
                "STREAMGUARD_STOP_GRACE_SECS",
                DEFAULT_GRACE_PERIOD.as_secs(),
            )),
            signature_scan: parse_env_bool("STREAMGUARD_SIGNATURE_SCAN", cfg!(windows)),
        }
    }

    pub fn with_worker_script(mut self, script: impl Into<PathBuf>) -> Self {
        self.worker_script = absolutize(script.into());
        self
    }

    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    pub fn with_source_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_file = path.into();
        self
    }

    pub fn with_download_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.download_dir = path.into();
        self
    }

    pub fn with_pid_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.pid_file = path.into();
        self
    }

    pub fn with_stop_grace(mut self, grace: Duration) -> Self {
        self.stop_grace = grace;
        self
    }

    pub fn with_signature_scan(mut self, enabled: bool) -> Self {
        self.signature_scan = enabled;
        self
    }
}

fn absolutize(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(err) => {
            warn!(
                path = %path.display(),
                error = %err,
                "Cannot resolve working directory; keeping relative path"
            );
            path
        }
    }
}

fn parse_env_string(key: &str, default: &str) -> String {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value.trim().to_string(),
        _ => default.to_string(),
    }
}

fn parse_env_path(key: &str, default: &str) -> PathBuf {
    PathBuf::from(parse_env_string(key, default))
}

fn parse_env_u64(key: &str, default: u64) -> u64 {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return default,
    };
    if value.trim().is_empty() {
        return default;
    }
    match value.trim().parse::<u64>() {
        Ok(parsed) => parsed,
        Err(_) => {
            warn!(value = %value, key, "Invalid numeric config; using default");
            default
        }
    }
}

fn parse_env_bool(key: &str, default: bool) -> bool {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return default,
    };
    match value.trim().to_lowercase().as_str() {
        "" => default,
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => {
            warn!(value = %value, key, "Invalid boolean config; using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{EnvGuard, env_lock};

    #[test]
    fn test_default_config() {
        let _lock = env_lock();
        let _script = EnvGuard::remove("STREAMGUARD_WORKER_SCRIPT");
        let _grace = EnvGuard::remove("STREAMGUARD_STOP_GRACE_SECS");
        let _scan = EnvGuard::remove("STREAMGUARD_SIGNATURE_SCAN");
        let _sources = EnvGuard::remove("STREAMGUARD_SOURCE_FILE");

        let config = SupervisorConfig::from_env();

        assert!(config.worker_script().is_absolute());
        assert!(config.worker_script().ends_with(DEFAULT_WORKER_SCRIPT));
        assert_eq!(config.source_file(), Path::new(DEFAULT_SOURCE_FILE));
        assert_eq!(config.stop_grace(), DEFAULT_GRACE_PERIOD);
        assert_eq!(config.signature_scan(), cfg!(windows));
    }

    #[cfg(unix)]
    #[test]
    fn test_builder_pattern() {
        let _lock = env_lock();
        let config = SupervisorConfig::from_env()
            .with_worker_script("/opt/rec/recorder.py")
            .with_interpreter("python3.12")
            .with_pid_file("/tmp/rec.pid")
            .with_stop_grace(Duration::from_secs(9))
            .with_signature_scan(true);

        assert_eq!(config.worker_dir(), PathBuf::from("/opt/rec"));
        assert_eq!(config.interpreter(), "python3.12");
        assert_eq!(config.pid_file(), Path::new("/tmp/rec.pid"));
        assert_eq!(config.stop_grace(), Duration::from_secs(9));
        assert!(config.signature_scan());
    }

    #[test]
    fn test_env_overrides() {
        let _lock = env_lock();
        let _grace = EnvGuard::set("STREAMGUARD_STOP_GRACE_SECS", "12");
        let _scan = EnvGuard::set("STREAMGUARD_SIGNATURE_SCAN", "on");
        let _interp = EnvGuard::set("STREAMGUARD_WORKER_INTERPRETER", " /usr/bin/python3 ");

        let config = SupervisorConfig::from_env();

        assert_eq!(config.stop_grace(), Duration::from_secs(12));
        assert!(config.signature_scan());
        assert_eq!(config.interpreter(), "/usr/bin/python3");
    }

    #[test]
    fn test_invalid_env_uses_defaults() {
        let _lock = env_lock();
        let _grace = EnvGuard::set("STREAMGUARD_STOP_GRACE_SECS", "soon");
        let _scan = EnvGuard::set("STREAMGUARD_SIGNATURE_SCAN", "maybe");

        let config = SupervisorConfig::from_env();

        assert_eq!(config.stop_grace(), DEFAULT_GRACE_PERIOD);
        assert_eq!(config.signature_scan(), cfg!(windows));
    }
}
