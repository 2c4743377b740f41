use std::path::Path;
use std::sync::Arc;

use pyfind_domain::{PythonInfo, PythonSpec};

use crate::config::DiscoveryConfig;
use crate::python_sys::SystemPythonRuntime;

/// Turns executables into interpreter records.
pub trait PythonRuntime: Send + Sync {
    /// The interpreter treated as already running, if any.
    fn current(&self, config: &DiscoveryConfig) -> Option<PythonInfo>;

    /// Inspects `exe`; any failure is reported as `None`.
    fn inspect(&self, exe: &Path, config: &DiscoveryConfig) -> Option<PythonInfo>;
}

/// A platform source of interpreters besides PATH (e.g. the Windows launcher).
///
/// Implementations must stay lazy: no work happens until the returned
/// iterator is pulled.
pub trait ExtraCandidates: Send + Sync {
    fn propose<'a>(
        &'a self,
        spec: &'a PythonSpec,
        runtime: &'a dyn PythonRuntime,
        config: &'a DiscoveryConfig,
    ) -> Box<dyn Iterator<Item = PythonInfo> + 'a>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoExtraCandidates;

impl ExtraCandidates for NoExtraCandidates {
    fn propose<'a>(
        &'a self,
        _spec: &'a PythonSpec,
        _runtime: &'a dyn PythonRuntime,
        _config: &'a DiscoveryConfig,
    ) -> Box<dyn Iterator<Item = PythonInfo> + 'a> {
        Box::new(std::iter::empty())
    }
}

pub trait Effects: Send + Sync {
    fn python(&self) -> &dyn PythonRuntime;
    fn extras(&self) -> &dyn ExtraCandidates;
}

pub type SharedEffects = Arc<dyn Effects>;

pub struct SystemEffects {
    python: Arc<SystemPythonRuntime>,
    extras: Arc<dyn ExtraCandidates>,
}

impl SystemEffects {
    #[must_use]
    pub fn new() -> Self {
        Self {
            python: Arc::new(SystemPythonRuntime),
            extras: platform_extras(),
        }
    }
}

impl Default for SystemEffects {
    fn default() -> Self {
        Self::new()
    }
}

impl Effects for SystemEffects {
    fn python(&self) -> &dyn PythonRuntime {
        self.python.as_ref()
    }

    fn extras(&self) -> &dyn ExtraCandidates {
        self.extras.as_ref()
    }
}

#[cfg(windows)]
fn platform_extras() -> Arc<dyn ExtraCandidates> {
    Arc::new(crate::launcher::PyLauncher::default())
}

#[cfg(not(windows))]
fn platform_extras() -> Arc<dyn ExtraCandidates> {
    Arc::new(NoExtraCandidates)
}
