use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use pep440_rs::Version;

use crate::spec::PythonSpec;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VersionInfo {
    pub major: u64,
    pub minor: u64,
    pub micro: u64,
}

/// Metadata reported by one concrete interpreter executable.
///
/// Records compare equal when they point at the same executable.
#[derive(Clone, Debug)]
pub struct PythonInfo {
    pub executable: PathBuf,
    /// The path the interpreter was found under, before the interpreter
    /// reported its own `sys.executable`.
    pub original_executable: PathBuf,
    pub implementation: String,
    pub version_info: VersionInfo,
    pub version: Version,
    pub architecture: u8,
    pub platform: String,
}

impl PythonInfo {
    /// Checks whether this interpreter fulfils `spec`.
    ///
    /// `impl_must_match` is false for direct lookups, where the requested
    /// name already selected the implementation.
    pub fn satisfies(&self, spec: &PythonSpec, impl_must_match: bool) -> bool {
        if let Some(requested) = spec.path() {
            let absolute = std::path::absolute(requested).unwrap_or_else(|_| requested.into());
            if self.executable == absolute || self.original_executable == absolute {
                return true;
            }
            if spec.is_abs() {
                return false;
            }
            if !self.matches_executable_name(requested) {
                return false;
            }
        }

        if impl_must_match {
            if let Some(implementation) = spec.implementation() {
                if !implementation.eq_ignore_ascii_case(&self.implementation) {
                    return false;
                }
            }
        }

        if let Some(architecture) = spec.architecture() {
            if architecture != self.architecture {
                return false;
            }
        }

        let ours = [
            self.version_info.major,
            self.version_info.minor,
            self.version_info.micro,
        ];
        let requested = [spec.major(), spec.minor(), spec.micro()];
        ours.iter()
            .zip(requested)
            .all(|(our, req)| req.is_none_or(|req| req == *our))
    }

    fn matches_executable_name(&self, requested: &Path) -> bool {
        let Some(name) = self.original_executable.file_name() else {
            return false;
        };
        let name = name.to_string_lossy();
        let requested = requested.to_string_lossy();
        if cfg!(windows) {
            if let Some((stem, suffix)) = name.rsplit_once('.') {
                let requested = requested
                    .strip_suffix(&format!(".{suffix}"))
                    .unwrap_or(&requested);
                return stem == requested;
            }
        }
        name == requested
    }
}

impl PartialEq for PythonInfo {
    fn eq(&self, other: &Self) -> bool {
        self.executable == other.executable
    }
}

impl Eq for PythonInfo {}

impl Hash for PythonInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.executable.hash(state);
    }
}

impl fmt::Display for PythonInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}, {}-bit, {})",
            self.implementation,
            self.version,
            self.architecture,
            self.executable.display()
        )
    }
}
