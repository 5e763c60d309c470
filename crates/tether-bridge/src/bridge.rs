//! The bridge context shared by every translator entry point

use crate::config::{BridgeConfig, ConfigError};
use crate::handle::Handle;
use crate::lock::HostToken;
use crate::registry;

/// Bridge between the native RPC runtime and one host runtime.
///
/// Holds only the validated configuration; host state is reached through
/// the [`HostToken`] passed to each call, and nothing resolved from the
/// host is cached between calls.
#[derive(Debug, Clone, Default)]
pub struct Bridge {
    config: BridgeConfig,
}

impl Bridge {
    /// Create a bridge from a configuration, validating it first
    pub fn new(config: BridgeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active configuration
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Resolve a host type, bare names against the configured default module
    pub fn lookup_type<'h>(&self, py: HostToken<'h>, name: &str) -> Option<Handle<'h>> {
        registry::lookup_type(py, name, &self.config.lookup.default_module)
    }

    /// Resolve a host type the bridge cannot work without.
    ///
    /// # Panics
    ///
    /// Panics if the type is not registered. This is a deployment defect,
    /// not a recoverable condition.
    pub(crate) fn require_type<'h>(&self, py: HostToken<'h>, name: &str) -> Handle<'h> {
        match self.lookup_type(py, name) {
            Some(class) => class,
            None => panic!("required host type `{}` is not registered", name),
        }
    }
}
