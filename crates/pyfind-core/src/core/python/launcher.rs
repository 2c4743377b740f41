//! Interpreters registered with the Windows `py` launcher.

use std::path::{Path, PathBuf};

use pyfind_domain::{PythonInfo, PythonSpec};
use tracing::debug;

use crate::config::DiscoveryConfig;
use crate::effects::{ExtraCandidates, PythonRuntime};
use crate::process::run_command_with_timeout;

#[derive(Debug, Clone)]
pub struct PyLauncher {
    program: PathBuf,
}

impl Default for PyLauncher {
    fn default() -> Self {
        Self {
            program: PathBuf::from("py"),
        }
    }
}

impl PyLauncher {
    #[must_use]
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn registered_paths(&self, config: &DiscoveryConfig) -> Vec<PathBuf> {
        match run_command_with_timeout(&self.program, &["-0p"], config.inspect_timeout()) {
            Ok(output) if output.code == 0 => parse_launcher_listing(&output.stdout),
            Ok(output) => {
                debug!(code = output.code, "py launcher listing failed");
                Vec::new()
            }
            Err(err) => {
                debug!(%err, "py launcher unavailable");
                Vec::new()
            }
        }
    }
}

impl ExtraCandidates for PyLauncher {
    fn propose<'a>(
        &'a self,
        _spec: &'a PythonSpec,
        runtime: &'a dyn PythonRuntime,
        config: &'a DiscoveryConfig,
    ) -> Box<dyn Iterator<Item = PythonInfo> + 'a> {
        Box::new(
            std::iter::once_with(move || self.registered_paths(config))
                .flatten()
                .filter_map(move |path| runtime.inspect(&path, config)),
        )
    }
}

/// Extracts executable paths from `py -0p` output.
///
/// Lines look like ` -V:3.12 *        C:\Python312\python.exe` (or the older
/// ` -3.8-64 C:\...\python.exe`); the default marker is optional and paths may
/// contain spaces.
#[must_use]
pub fn parse_launcher_listing(stdout: &str) -> Vec<PathBuf> {
    stdout
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if !line.starts_with('-') {
                return None;
            }
            let (_tag, rest) = line.split_once(char::is_whitespace)?;
            let rest = rest.trim_start();
            let rest = rest.strip_prefix('*').unwrap_or(rest).trim();
            if rest.is_empty() || !(Path::new(rest).is_absolute() || looks_like_windows_path(rest)) {
                return None;
            }
            Some(PathBuf::from(rest))
        })
        .collect()
}

fn looks_like_windows_path(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() > 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
