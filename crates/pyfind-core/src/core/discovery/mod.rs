//! Interpreter discovery: turn a requested spec into one concrete executable.

mod paths;
mod probe;
mod propose;
#[cfg(test)]
pub(crate) mod testing;

use std::collections::HashSet;
use std::path::PathBuf;

use pyfind_domain::{PythonInfo, PythonSpec, SpecError};
use tracing::{debug, info};

use crate::config::DiscoveryConfig;
use crate::effects::{Effects, SharedEffects, SystemEffects};

pub use paths::get_paths;
pub use probe::check_path;
pub use propose::{propose_interpreters, Proposer};

/// Finds the first proposed interpreter satisfying `raw`.
///
/// `Ok(None)` means nothing on this machine matches; only a malformed
/// identifier is an error.
///
/// # Errors
/// Returns an error if `raw` cannot be parsed into a spec.
pub fn get_interpreter(
    raw: &str,
    effects: &dyn Effects,
    config: &DiscoveryConfig,
) -> Result<Option<PythonInfo>, SpecError> {
    let spec = PythonSpec::from_string_spec(raw)?;
    info!("find interpreter for spec {spec}");
    let proposals = propose_interpreters(&spec, effects.python(), effects.extras(), config);
    Ok(select_interpreter(&spec, proposals))
}

/// Accepts the first proposal that satisfies `spec`, skipping executables that
/// were already proposed and rejected.
pub fn select_interpreter(
    spec: &PythonSpec,
    proposals: impl IntoIterator<Item = (PythonInfo, bool)>,
) -> Option<PythonInfo> {
    let mut proposed: HashSet<PathBuf> = HashSet::new();
    for (interpreter, impl_must_match) in proposals {
        if proposed.contains(&interpreter.executable) {
            continue;
        }
        info!("proposed {interpreter}");
        if interpreter.satisfies(spec, impl_must_match) {
            debug!("accepted target interpreter {interpreter}");
            return Some(interpreter);
        }
        proposed.insert(interpreter.executable);
    }
    None
}

/// One entry of a full, non-stopping walk over the proposal stream.
#[derive(Clone, Debug)]
pub struct Proposal {
    pub interpreter: PythonInfo,
    pub impl_must_match: bool,
    pub satisfies: bool,
    pub duplicate: bool,
}

/// Discovery bound to a set of effects and an environment snapshot.
pub struct Discovery {
    effects: SharedEffects,
    config: DiscoveryConfig,
}

impl Discovery {
    #[must_use]
    pub fn new(effects: SharedEffects, config: DiscoveryConfig) -> Self {
        Self { effects, config }
    }

    #[must_use]
    pub fn from_env() -> Self {
        Self::new(
            std::sync::Arc::new(SystemEffects::new()),
            DiscoveryConfig::from_env(),
        )
    }

    #[must_use]
    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// # Errors
    /// Returns an error if `raw` cannot be parsed into a spec.
    pub fn find(&self, raw: &str) -> Result<Option<PythonInfo>, SpecError> {
        get_interpreter(raw, self.effects.as_ref(), &self.config)
    }

    /// Walks every proposal for `raw` without stopping at the first match.
    ///
    /// # Errors
    /// Returns an error if `raw` cannot be parsed into a spec.
    pub fn proposals(&self, raw: &str) -> Result<Vec<Proposal>, SpecError> {
        let spec = PythonSpec::from_string_spec(raw)?;
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let proposals = propose_interpreters(
            &spec,
            self.effects.python(),
            self.effects.extras(),
            &self.config,
        )
        .map(|(interpreter, impl_must_match)| {
            let duplicate = !seen.insert(interpreter.executable.clone());
            let satisfies = !duplicate && interpreter.satisfies(&spec, impl_must_match);
            Proposal {
                interpreter,
                impl_must_match,
                satisfies,
                duplicate,
            }
        })
        .collect();
        Ok(proposals)
    }

    /// Inspects one executable directly.
    #[must_use]
    pub fn inspect(&self, exe: &std::path::Path) -> Option<PythonInfo> {
        self.effects.python().inspect(exe, &self.config)
    }
}
