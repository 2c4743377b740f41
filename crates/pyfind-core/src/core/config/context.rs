use crate::config::{DiscoveryConfig, GlobalOptions};
use crate::discovery::Discovery;
use crate::effects::SharedEffects;

pub struct CommandContext<'a> {
    pub global: &'a GlobalOptions,
    discovery: Discovery,
}

impl<'a> CommandContext<'a> {
    /// Creates a context that reads its discovery settings from the process
    /// environment.
    #[must_use]
    pub fn new(global: &'a GlobalOptions, effects: SharedEffects) -> Self {
        Self::with_config(global, effects, DiscoveryConfig::from_env())
    }

    #[must_use]
    pub fn with_config(
        global: &'a GlobalOptions,
        effects: SharedEffects,
        config: DiscoveryConfig,
    ) -> Self {
        Self {
            global,
            discovery: Discovery::new(effects, config),
        }
    }

    #[must_use]
    pub fn discovery(&self) -> &Discovery {
        &self.discovery
    }
}
