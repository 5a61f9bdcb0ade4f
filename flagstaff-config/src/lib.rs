// Flag configuration for the Flagstaff feature flag store

pub mod builder;
pub mod env;
pub mod error;
pub mod loader;

pub use builder::FeatureFlagsBuilder;
pub use env::{DEFAULT_PREFIX, EnvLoader, EnvOverrides};
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};

use flagstaff_features::{FeatureFlagOptions, FlagDefaults, Schema};
use serde::{Deserialize, Serialize};

/// Declarative flag configuration: the schema, per-environment defaults and
/// optionally the environment to select.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlagConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,

    pub schema: Schema,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<FlagDefaults>,
}

impl FlagConfig {
    pub fn new(schema: Schema) -> Self {
        Self {
            environment: None,
            schema,
            defaults: None,
        }
    }

    /// Replace the configured environment
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn with_defaults(mut self, defaults: FlagDefaults) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// Store construction options for this configuration.
    pub fn into_options(self) -> FeatureFlagOptions {
        let mut options = FeatureFlagOptions::new(self.schema);
        if let Some(environment) = self.environment {
            options = options.with_environment(environment);
        }
        if let Some(defaults) = self.defaults {
            options = options.with_defaults(defaults);
        }
        options
    }
}

impl From<FlagConfig> for FeatureFlagOptions {
    fn from(config: FlagConfig) -> Self {
        config.into_options()
    }
}
