#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::assert::Assert;
use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use tempfile::TempDir;

/// Writes a shell script that answers the inspection probe with a canned
/// record. Only shell builtins are used since PATH is replaced in tests.
#[cfg(unix)]
pub fn fake_python(dir: &Path, name: &str, implementation: &str, version: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    fs::create_dir_all(dir).expect("create dir");
    let path = dir.join(name);
    let parts: Vec<&str> = version.split('.').collect();
    let script = format!(
        "#!/bin/sh\nprintf '%s\\n' '{{\"implementation\": \"{implementation}\", \"version_info\": [{}, {}, {}], \"version\": \"{version}\", \"architecture\": 64, \"executable\": \"{}\", \"platform\": \"linux\"}}'\n",
        parts[0],
        parts[1],
        parts[2],
        path.display()
    );
    fs::write(&path, script).expect("write fake python");
    let mut perms = fs::metadata(&path).expect("metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("chmod");
    path
}

/// A script that fails the probe.
#[cfg(unix)]
pub fn broken_python(dir: &Path, name: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    fs::create_dir_all(dir).expect("create dir");
    let path = dir.join(name);
    fs::write(&path, "#!/bin/sh\necho boom >&2\nexit 3\n").expect("write broken python");
    let mut perms = fs::metadata(&path).expect("metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("chmod");
    path
}

pub fn path_of(dirs: &[&Path]) -> std::ffi::OsString {
    std::env::join_paths(dirs).expect("join paths")
}

/// Runs `pyfind` with a PATH made only of `dirs` and no ambient interpreter.
pub fn pyfind(temp: &TempDir, dirs: &[&Path], args: &[&str]) -> Assert {
    cargo_bin_cmd!("pyfind")
        .current_dir(temp.path())
        .env("PATH", path_of(dirs))
        .env_remove("VIRTUAL_ENV")
        .env_remove("PYFIND_PYTHON")
        .env_remove("PYFIND_DEBUG_DISCOVERY")
        .env("NO_COLOR", "1")
        .args(args)
        .assert()
}

pub fn parse_json(assert: &Assert) -> Value {
    let output = assert.get_output();
    serde_json::from_slice(&output.stdout).expect("json stdout")
}
