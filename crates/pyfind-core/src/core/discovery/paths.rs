use std::env;
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::DiscoveryConfig;

#[cfg(windows)]
const DEFAULT_SEARCH_PATH: &str = ".;C:\\bin";
#[cfg(not(windows))]
const DEFAULT_SEARCH_PATH: &str = "/bin:/usr/bin";

/// Directories to scan, in PATH priority order.
///
/// Falls back to the system default search path when PATH is unset. Entries
/// that do not exist are dropped.
pub fn get_paths(config: &DiscoveryConfig) -> Vec<PathBuf> {
    let raw = config.path().cloned().unwrap_or_else(default_search_path);
    if raw.is_empty() {
        return Vec::new();
    }
    env::split_paths(&raw).filter(|dir| dir.exists()).collect()
}

fn default_search_path() -> OsString {
    if cfg!(unix) {
        if let Ok(output) = Command::new("getconf").arg("PATH").output() {
            let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if output.status.success() && !value.is_empty() {
                return value.into();
            }
        }
    }
    DEFAULT_SEARCH_PATH.into()
}

/// Renders `discover PATH[pos]=dir` for debug logs, optionally followed by the
/// executables in that directory. Only formatted when the log line is emitted.
pub(crate) struct PathDump<'a> {
    pos: usize,
    dir: &'a Path,
    list_contents: bool,
}

impl<'a> PathDump<'a> {
    pub(crate) fn new(pos: usize, dir: &'a Path, list_contents: bool) -> Self {
        Self {
            pos,
            dir,
            list_contents,
        }
    }
}

impl fmt::Display for PathDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "discover PATH[{}]={}", self.pos, self.dir.display())?;
        if !self.list_contents {
            return Ok(());
        }
        f.write_str(" with =>")?;
        let Ok(entries) = fs::read_dir(self.dir) else {
            return Ok(());
        };
        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|entry| is_executable(&entry.path()))
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        for name in names {
            write!(f, " {name}")?;
        }
        Ok(())
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path).is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("exe"))
}
