//! Bridge configuration (tether.toml)
//!
//! Names the host types the translators fall back to and the policies of
//! the type registry and the process-exit adaptor. Every key is optional.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur loading a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Bridge configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Host type names
    #[serde(default)]
    pub types: TypeNames,

    /// Type registry settings
    #[serde(default)]
    pub lookup: LookupConfig,

    /// Process-exit adaptor settings
    #[serde(default)]
    pub exit: ExitConfig,
}

/// Dotted host names of the types the bridge needs by name
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TypeNames {
    /// Catch-all for native exceptions outside both hierarchies
    pub unknown: String,
    /// Fallback for native local exceptions without a host counterpart
    pub unknown_local: String,
    /// Fallback for native user exceptions without a host counterpart
    pub unknown_user: String,
    /// Root of host-side local exceptions
    pub local: String,
    /// Root of host-side user exceptions
    pub user: String,
    /// Two-field identity record
    pub identity: String,
}

impl Default for TypeNames {
    fn default() -> Self {
        Self {
            unknown: "Rpc.UnknownException".to_string(),
            unknown_local: "Rpc.UnknownLocalException".to_string(),
            unknown_user: "Rpc.UnknownUserException".to_string(),
            local: "Rpc.LocalException".to_string(),
            user: "Rpc.UserException".to_string(),
            identity: "Rpc.Identity".to_string(),
        }
    }
}

impl TypeNames {
    fn entries(&self) -> [(&'static str, &str); 6] {
        [
            ("unknown", self.unknown.as_str()),
            ("unknown_local", self.unknown_local.as_str()),
            ("unknown_user", self.unknown_user.as_str()),
            ("local", self.local.as_str()),
            ("user", self.user.as_str()),
            ("identity", self.identity.as_str()),
        ]
    }
}

/// Type registry settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LookupConfig {
    /// Module searched for bare (undotted) names
    pub default_module: String,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            default_module: "builtins".to_string(),
        }
    }
}

/// Process-exit adaptor settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExitConfig {
    /// Status used when the exit code is not an integer
    pub fallback_status: i32,
}

impl Default for ExitConfig {
    fn default() -> Self {
        Self { fallback_status: 1 }
    }
}

impl BridgeConfig {
    /// Load from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: BridgeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, name) in self.types.entries() {
            if !is_dotted_name(name) {
                return Err(ConfigError::Invalid(format!(
                    "types.{} must be a dotted `module.Name`, got '{}'",
                    key, name
                )));
            }
        }

        let module = &self.lookup.default_module;
        if module.is_empty() || module.split('.').any(|part| !is_identifier(part)) {
            return Err(ConfigError::Invalid(format!(
                "lookup.default_module is not a module name: '{}'",
                module
            )));
        }

        if self.exit.fallback_status == 0 {
            return Err(ConfigError::Invalid(
                "exit.fallback_status must be non-zero".to_string(),
            ));
        }

        Ok(())
    }
}

fn is_dotted_name(name: &str) -> bool {
    name.contains('.') && name.split('.').all(is_identifier)
}

fn is_identifier(part: &str) -> bool {
    let mut chars = part.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => chars.all(|c| c.is_alphanumeric() || c == '_'),
        _ => false,
    }
}
