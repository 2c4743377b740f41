use std::collections::HashMap;
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

pub(crate) const PYTHON_ENV: &str = "PYFIND_PYTHON";
pub(crate) const DEBUG_ENV: &str = "PYFIND_DEBUG_DISCOVERY";
pub(crate) const TIMEOUT_ENV: &str = "PYFIND_INSPECT_TIMEOUT";
const DEFAULT_INSPECT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalOptions {
    pub quiet: bool,
    pub verbose: u8,
    pub trace: bool,
    pub json: bool,
}

#[derive(Debug, Clone)]
pub struct EnvSnapshot {
    vars: HashMap<String, OsString>,
}

impl EnvSnapshot {
    #[must_use]
    pub fn capture() -> Self {
        Self {
            vars: env::vars_os()
                .filter_map(|(key, value)| key.into_string().ok().map(|key| (key, value)))
                .collect(),
        }
    }

    pub(crate) fn flag_is_enabled(&self, key: &str) -> bool {
        matches!(self.var(key), Some("1"))
    }

    pub(crate) fn var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).and_then(|value| value.to_str())
    }

    pub(crate) fn var_os(&self, key: &str) -> Option<&OsString> {
        self.vars.get(key)
    }

    #[must_use]
    pub fn testing(pairs: &[(&str, &str)]) -> Self {
        let vars = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), OsString::from(*v)))
            .collect();
        Self { vars }
    }
}

/// Everything discovery reads from the environment, captured once per call.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    pub(crate) path: Option<OsString>,
    pub(crate) current_python: Option<PathBuf>,
    pub(crate) virtual_env: Option<PathBuf>,
    pub(crate) debug_listing: bool,
    pub(crate) inspect_timeout: Duration,
}

impl DiscoveryConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_snapshot(&EnvSnapshot::capture())
    }

    #[must_use]
    pub fn from_snapshot(snapshot: &EnvSnapshot) -> Self {
        let non_empty_path = |key: &str| {
            snapshot
                .var_os(key)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
        };
        Self {
            path: snapshot.var_os("PATH").cloned(),
            current_python: non_empty_path(PYTHON_ENV),
            virtual_env: non_empty_path("VIRTUAL_ENV"),
            debug_listing: snapshot.flag_is_enabled(DEBUG_ENV),
            inspect_timeout: match snapshot.var(TIMEOUT_ENV) {
                Some(raw) => match raw.trim().parse::<f64>() {
                    Ok(secs) if secs.is_finite() && secs > 0.0 => Duration::from_secs_f64(secs),
                    _ => {
                        warn!(value = raw, "ignoring invalid {TIMEOUT_ENV}");
                        DEFAULT_INSPECT_TIMEOUT
                    }
                },
                None => DEFAULT_INSPECT_TIMEOUT,
            },
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<OsString>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_current_python(mut self, python: Option<PathBuf>) -> Self {
        self.current_python = python;
        self
    }

    #[must_use]
    pub fn with_debug_listing(mut self, enabled: bool) -> Self {
        self.debug_listing = enabled;
        self
    }

    #[must_use]
    pub fn path(&self) -> Option<&OsString> {
        self.path.as_ref()
    }

    #[must_use]
    pub fn debug_listing(&self) -> bool {
        self.debug_listing
    }

    #[must_use]
    pub fn inspect_timeout(&self) -> Duration {
        self.inspect_timeout
    }

    /// The interpreter treated as "already running": an explicit override,
    /// else the active virtual environment's interpreter.
    #[must_use]
    pub fn current_python(&self) -> Option<PathBuf> {
        if let Some(explicit) = &self.current_python {
            return Some(explicit.clone());
        }
        let venv = self.virtual_env.as_ref()?;
        let python = if cfg!(windows) {
            venv.join("Scripts").join("python.exe")
        } else {
            venv.join("bin").join("python")
        };
        python.is_file().then_some(python)
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self::from_snapshot(&EnvSnapshot::testing(&[]))
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    fn debug_listing_requires_exact_flag() {
        let on = DiscoveryConfig::from_snapshot(&EnvSnapshot::testing(&[(DEBUG_ENV, "1")]));
        assert!(on.debug_listing());
        let off = DiscoveryConfig::from_snapshot(&EnvSnapshot::testing(&[(DEBUG_ENV, "yes")]));
        assert!(!off.debug_listing());
    }

    #[test]
    fn invalid_timeout_falls_back_to_default() {
        let config = DiscoveryConfig::from_snapshot(&EnvSnapshot::testing(&[(TIMEOUT_ENV, "-3")]));
        assert_eq!(config.inspect_timeout(), DEFAULT_INSPECT_TIMEOUT);
        let config = DiscoveryConfig::from_snapshot(&EnvSnapshot::testing(&[(TIMEOUT_ENV, "2.5")]));
        assert_eq!(config.inspect_timeout(), Duration::from_millis(2500));
    }

    #[test]
    fn explicit_python_wins_over_virtual_env() {
        let venv = tempfile::tempdir().expect("tempdir");
        let config = DiscoveryConfig::from_snapshot(&EnvSnapshot::testing(&[
            (PYTHON_ENV, "/opt/python/bin/python3"),
            ("VIRTUAL_ENV", venv.path().to_str().expect("utf8")),
        ]));
        assert_eq!(
            config.current_python(),
            Some(PathBuf::from("/opt/python/bin/python3"))
        );
    }

    #[test]
    fn virtual_env_without_interpreter_is_ignored() {
        let venv = tempfile::tempdir().expect("tempdir");
        let config = DiscoveryConfig::from_snapshot(&EnvSnapshot::testing(&[(
            "VIRTUAL_ENV",
            venv.path().to_str().expect("utf8"),
        )]));
        assert_eq!(config.current_python(), None);
    }

    #[test]
    fn missing_path_stays_unset() {
        let config = DiscoveryConfig::from_snapshot(&EnvSnapshot::testing(&[]));
        assert!(config.path().is_none());
    }

    #[test]
    #[serial]
    fn from_env_reads_process_environment() {
        let previous_python = env::var_os(PYTHON_ENV);
        let previous_debug = env::var_os(DEBUG_ENV);
        env::set_var(PYTHON_ENV, "/custom/python3");
        env::set_var(DEBUG_ENV, "1");

        let config = DiscoveryConfig::from_env();

        match previous_python {
            Some(value) => env::set_var(PYTHON_ENV, value),
            None => env::remove_var(PYTHON_ENV),
        }
        match previous_debug {
            Some(value) => env::set_var(DEBUG_ENV, value),
            None => env::remove_var(DEBUG_ENV),
        }
        assert_eq!(
            config.current_python(),
            Some(PathBuf::from("/custom/python3"))
        );
        assert!(config.debug_listing());
    }
}
