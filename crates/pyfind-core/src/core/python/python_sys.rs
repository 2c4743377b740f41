use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use pep440_rs::Version;
use pyfind_domain::{PythonInfo, VersionInfo};
use serde::Deserialize;
use tracing::debug;

use crate::config::DiscoveryConfig;
use crate::effects::PythonRuntime;
use crate::process::{run_command_with_timeout, ProcessError};

const INSPECT_SCRIPT: &str = r#"import json, platform, sys
data = {
    "implementation": platform.python_implementation(),
    "version_info": list(sys.version_info[:3]),
    "version": platform.python_version(),
    "architecture": 64 if sys.maxsize > 2**32 else 32,
    "executable": sys.executable,
    "platform": sys.platform,
}
print(json.dumps(data))
"#;

#[derive(Debug, thiserror::Error)]
pub enum InspectError {
    #[error(transparent)]
    Process(#[from] ProcessError),
    #[error("python exited with {code} while probing: {stderr}")]
    Exit { code: i32, stderr: String },
    #[error("invalid inspection payload: {0}")]
    Payload(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct InspectPayload {
    implementation: String,
    version_info: (u64, u64, u64),
    version: String,
    architecture: u8,
    #[serde(default)]
    executable: String,
    #[serde(default)]
    platform: String,
}

/// Runs `exe` with the inspection script and builds its record.
///
/// # Errors
///
/// Returns an error when the executable cannot be run, exits unsuccessfully,
/// outlives `timeout`, or prints something other than the expected payload.
/// An unparsable version string is not an error.
pub fn inspect_python(exe: &Path, timeout: Duration) -> Result<PythonInfo, InspectError> {
    let output = run_command_with_timeout(exe, &["-c", INSPECT_SCRIPT], timeout)?;
    if output.code != 0 {
        return Err(InspectError::Exit {
            code: output.code,
            stderr: output.stderr.trim().to_string(),
        });
    }
    let payload: InspectPayload = serde_json::from_str(output.stdout.trim())?;
    let (major, minor, micro) = payload.version_info;
    let version = parse_reported_version(&payload.version, [major, minor, micro]);
    let original = absolute(exe);
    let executable = if payload.executable.is_empty() {
        original.clone()
    } else {
        PathBuf::from(payload.executable)
    };
    Ok(PythonInfo {
        executable,
        original_executable: original,
        implementation: payload.implementation,
        version_info: VersionInfo {
            major,
            minor,
            micro,
        },
        version,
        architecture: payload.architecture,
        platform: payload.platform,
    })
}

/// Source-checkout builds report versions like `3.14.0a1+`, which PEP 440
/// rejects. The bare `+` is dropped; anything still unparsable falls back to
/// the numeric `version_info`.
fn parse_reported_version(reported: &str, release: [u64; 3]) -> Version {
    let trimmed = reported.trim().trim_end_matches('+');
    Version::from_str(trimmed).unwrap_or_else(|_| {
        debug!(version = reported, "falling back to version_info");
        Version::new(release)
    })
}

pub(crate) fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemPythonRuntime;

impl PythonRuntime for SystemPythonRuntime {
    fn current(&self, config: &DiscoveryConfig) -> Option<PythonInfo> {
        let python = config.current_python()?;
        self.inspect(&python, config)
    }

    fn inspect(&self, exe: &Path, config: &DiscoveryConfig) -> Option<PythonInfo> {
        match inspect_python(exe, config.inspect_timeout()) {
            Ok(info) => Some(info),
            Err(err) => {
                debug!(exe = %exe.display(), %err, "skipping interpreter that failed inspection");
                None
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    use super::*;

    fn fake_python(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod");
        path
    }

    #[test]
    fn parses_inspection_payload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let exe = fake_python(
            dir.path(),
            "python3",
            r#"echo '{"implementation": "PyPy", "version_info": [3, 10, 14], "version": "3.10.14", "architecture": 64, "executable": "", "platform": "linux"}'"#,
        );
        let info = inspect_python(&exe, Duration::from_secs(10)).expect("inspect");
        assert_eq!(info.implementation, "PyPy");
        assert_eq!(info.version_info.minor, 10);
        assert_eq!(info.version.to_string(), "3.10.14");
        assert_eq!(info.executable, exe);
        assert_eq!(info.original_executable, exe);
    }

    #[test]
    fn reported_executable_replaces_probed_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let exe = fake_python(
            dir.path(),
            "python",
            r#"echo '{"implementation": "CPython", "version_info": [3, 12, 0], "version": "3.12.0", "architecture": 64, "executable": "/usr/bin/python3.12", "platform": "linux"}'"#,
        );
        let info = inspect_python(&exe, Duration::from_secs(10)).expect("inspect");
        assert_eq!(info.executable, PathBuf::from("/usr/bin/python3.12"));
        assert_eq!(info.original_executable, exe);
    }

    #[test]
    fn failing_interpreter_reports_exit() {
        let dir = tempfile::tempdir().expect("tempdir");
        let exe = fake_python(dir.path(), "python3", "echo boom >&2; exit 1");
        let err = inspect_python(&exe, Duration::from_secs(10)).unwrap_err();
        assert!(matches!(err, InspectError::Exit { code: 1, .. }), "{err}");
    }

    #[test]
    fn garbage_output_is_a_payload_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let exe = fake_python(dir.path(), "python3", "echo 'Python 3.12.0'");
        let err = inspect_python(&exe, Duration::from_secs(10)).unwrap_err();
        assert!(matches!(err, InspectError::Payload(_)), "{err}");
    }

    #[test]
    fn runtime_swallows_inspection_failures() {
        let dir = tempfile::tempdir().expect("tempdir");
        let exe = dir.path().join("python3");
        fs::write(&exe, "not a program").expect("write");
        let config = DiscoveryConfig::default();
        assert!(SystemPythonRuntime.inspect(&exe, &config).is_none());
    }

    #[test]
    fn source_build_version_is_accepted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let exe = fake_python(
            dir.path(),
            "python3",
            r#"echo '{"implementation": "CPython", "version_info": [3, 14, 0], "version": "3.14.0a1+", "architecture": 64, "executable": "", "platform": "linux"}'"#,
        );
        let info = inspect_python(&exe, Duration::from_secs(10)).expect("inspect");
        assert_eq!(info.version.to_string(), "3.14.0a1");
        assert_eq!(info.version_info.minor, 14);
    }

    #[test]
    fn garbled_version_falls_back_to_version_info() {
        let version = parse_reported_version("3.12.0 (custom build)", [3, 12, 0]);
        assert_eq!(version, Version::new([3, 12, 0]));
    }

    #[test]
    fn noisy_interpreter_is_still_inspected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let exe = fake_python(
            dir.path(),
            "python3",
            r#"i=0
while [ $i -lt 3000 ]; do echo 'DeprecationWarning: the imp module is deprecated in favour of importlib' >&2; i=$((i+1)); done
echo '{"implementation": "CPython", "version_info": [3, 11, 2], "version": "3.11.2", "architecture": 64, "executable": "", "platform": "linux"}'"#,
        );
        let info = inspect_python(&exe, Duration::from_secs(10)).expect("inspect");
        assert_eq!(info.version_info.minor, 11);
    }
}
