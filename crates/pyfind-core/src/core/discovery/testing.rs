use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;

use pep440_rs::Version;
use pyfind_domain::{PythonInfo, PythonSpec, VersionInfo};
use tempfile::TempDir;

use crate::config::DiscoveryConfig;
use crate::effects::{Effects, ExtraCandidates, PythonRuntime};

pub(crate) fn interpreter(exe: impl AsRef<Path>, implementation: &str, version: &str) -> PythonInfo {
    let parts: Vec<u64> = version
        .split('.')
        .map(|part| part.parse().expect("numeric version"))
        .collect();
    PythonInfo {
        executable: exe.as_ref().to_path_buf(),
        original_executable: exe.as_ref().to_path_buf(),
        implementation: implementation.to_string(),
        version_info: VersionInfo {
            major: parts[0],
            minor: parts[1],
            micro: parts[2],
        },
        version: Version::from_str(version).expect("pep440 version"),
        architecture: 64,
        platform: env::consts::OS.to_string(),
    }
}

/// Serves canned records and remembers every path it was asked to inspect.
#[derive(Default)]
pub(crate) struct FakeRuntime {
    current: Option<PythonInfo>,
    known: HashMap<PathBuf, PythonInfo>,
    inspected: Mutex<Vec<PathBuf>>,
}

impl FakeRuntime {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, exe: &Path, implementation: &str, version: &str) -> Self {
        self.known
            .insert(exe.to_path_buf(), interpreter(exe, implementation, version));
        self
    }

    pub(crate) fn with_current(mut self, info: PythonInfo) -> Self {
        self.current = Some(info);
        self
    }

    pub(crate) fn with_current_at(self, exe: &Path, implementation: &str, version: &str) -> Self {
        self.with_current(interpreter(exe, implementation, version))
    }

    pub(crate) fn inspected(&self) -> Vec<PathBuf> {
        self.inspected.lock().expect("inspected lock").clone()
    }
}

impl PythonRuntime for FakeRuntime {
    fn current(&self, _config: &DiscoveryConfig) -> Option<PythonInfo> {
        self.current.clone()
    }

    fn inspect(&self, exe: &Path, _config: &DiscoveryConfig) -> Option<PythonInfo> {
        self.inspected
            .lock()
            .expect("inspected lock")
            .push(exe.to_path_buf());
        self.known.get(exe).cloned()
    }
}

pub(crate) struct FakeExtras(pub(crate) Vec<PythonInfo>);

impl ExtraCandidates for FakeExtras {
    fn propose<'a>(
        &'a self,
        _spec: &'a PythonSpec,
        _runtime: &'a dyn PythonRuntime,
        _config: &'a DiscoveryConfig,
    ) -> Box<dyn Iterator<Item = PythonInfo> + 'a> {
        Box::new(self.0.iter().cloned())
    }
}

pub(crate) struct FakeEffects {
    pub(crate) runtime: FakeRuntime,
    pub(crate) extras: FakeExtras,
}

impl Effects for FakeEffects {
    fn python(&self) -> &dyn PythonRuntime {
        &self.runtime
    }

    fn extras(&self) -> &dyn ExtraCandidates {
        &self.extras
    }
}

/// A scratch tree whose named subdirectories form the PATH.
pub(crate) struct PathFixture {
    root: TempDir,
    dirs: Vec<PathBuf>,
}

impl PathFixture {
    pub(crate) fn new(dirs: &[&str]) -> Self {
        let root = tempfile::tempdir().expect("tempdir");
        let dirs = dirs
            .iter()
            .map(|name| {
                let dir = root.path().join(name);
                fs::create_dir_all(&dir).expect("create path dir");
                dir
            })
            .collect();
        Self { root, dirs }
    }

    pub(crate) fn root(&self) -> &Path {
        self.root.path()
    }

    /// Creates an empty file named like an executable in `dir`.
    pub(crate) fn touch(&self, dir: &str, name: &str) -> PathBuf {
        let dir = self.root.path().join(dir);
        fs::create_dir_all(&dir).expect("create dir");
        let file_name = if cfg!(windows) {
            format!("{name}.exe")
        } else {
            name.to_string()
        };
        let path = dir.join(file_name);
        fs::write(&path, "").expect("touch");
        path
    }

    pub(crate) fn config(&self) -> DiscoveryConfig {
        self.config_with(&[])
    }

    /// PATH made of `extra` entries followed by the fixture directories.
    pub(crate) fn config_with(&self, extra: &[PathBuf]) -> DiscoveryConfig {
        let entries = extra.iter().chain(self.dirs.iter());
        let joined = env::join_paths(entries).expect("join paths");
        DiscoveryConfig::default().with_path(joined)
    }
}
