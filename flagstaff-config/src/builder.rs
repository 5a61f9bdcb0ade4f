// FeatureFlagsBuilder - assemble a store from files and the environment

use crate::{ConfigLoader, EnvLoader, EnvOverrides, FileFormat, FlagConfig, Result};
use flagstaff_features::{FeatureFlags, Overrides, Subscription};
use std::path::PathBuf;
use tracing::{debug, info};

/// Builder for a [`FeatureFlags`] store backed by configuration files.
///
/// Later files are merged over earlier ones: flags are redeclared, default
/// environments are replaced wholesale, and the last file naming an
/// environment wins. An explicit [`with_environment`](Self::with_environment)
/// beats both the files and `<PREFIX>_ENV`.
pub struct FeatureFlagsBuilder {
    loader: EnvLoader,
    load_dotenv: bool,
    dotenv_path: Option<PathBuf>,
    config_files: Vec<(PathBuf, Option<FileFormat>)>,
    base: FlagConfig,
    environment: Option<String>,
    env_environment: bool,
    env_overrides: bool,
    overrides: Option<Overrides>,
    subscription: Option<Subscription>,
}

impl FeatureFlagsBuilder {
    pub fn new() -> Self {
        Self {
            loader: EnvLoader::default(),
            load_dotenv: false,
            dotenv_path: None,
            config_files: Vec::new(),
            base: FlagConfig::default(),
            environment: None,
            env_environment: false,
            env_overrides: false,
            overrides: None,
            subscription: None,
        }
    }

    /// Set environment variable prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.loader = EnvLoader::new(prefix);
        self
    }

    /// Enable loading from .env file before reading variables
    pub fn load_dotenv(mut self, path: Option<PathBuf>) -> Self {
        self.load_dotenv = true;
        self.dotenv_path = path;
        self
    }

    /// Add configuration file to load, format detected from its extension
    pub fn add_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_files.push((path.into(), None));
        self
    }

    /// Add configuration file with an explicit format
    pub fn add_file_with_format(mut self, path: impl Into<PathBuf>, format: FileFormat) -> Self {
        self.config_files.push((path.into(), Some(format)));
        self
    }

    /// Start from an in-memory configuration; files merge over it
    pub fn with_config(mut self, config: FlagConfig) -> Self {
        self.base = config;
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    /// Read the environment name from `<PREFIX>_ENV`
    pub fn environment_from_env(mut self) -> Self {
        self.env_environment = true;
        self
    }

    /// Use `<PREFIX>_FLAG_<NAME>` variables as the override source
    pub fn overrides_from_env(mut self) -> Self {
        self.env_overrides = true;
        self
    }

    /// Use a custom override source. Takes precedence over
    /// [`overrides_from_env`](Self::overrides_from_env).
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = Some(overrides);
        self
    }

    pub fn with_subscription(mut self, subscription: Subscription) -> Self {
        self.subscription = Some(subscription);
        self
    }

    /// Load all sources and merge them into one configuration.
    pub fn load(&self) -> Result<FlagConfig> {
        if self.load_dotenv {
            match &self.dotenv_path {
                Some(path) => {
                    dotenvy::from_path(path)
                        .map_err(|e| crate::ConfigError::LoadError(e.to_string()))?;
                }
                None => {
                    dotenvy::dotenv().ok(); // Ignore if .env doesn't exist
                }
            }
        }

        let mut config = self.base.clone();
        for (path, format) in &self.config_files {
            let loader = match format {
                Some(format) => ConfigLoader::new(*format),
                None => ConfigLoader::auto(path)?,
            };
            merge(&mut config, loader.load_file(path)?);
        }

        let from_env = if self.env_environment {
            self.loader.environment()
        } else {
            None
        };
        if let Some(environment) = self.environment.clone().or(from_env) {
            config.environment = Some(environment);
        }

        debug!(
            flags = config.schema.len(),
            files = self.config_files.len(),
            environment = config.environment.as_deref().unwrap_or_default(),
            "Merged flag configuration"
        );

        Ok(config)
    }

    /// Build the flag store
    pub fn build(self) -> Result<FeatureFlags> {
        let config = self.load()?;
        config.schema.validate()?;

        let overrides = match (self.overrides, self.env_overrides) {
            (Some(overrides), _) => Some(overrides),
            (None, true) => {
                Some(EnvOverrides::new(self.loader.clone(), config.schema.clone()).into_overrides())
            }
            (None, false) => None,
        };

        let mut options = config.into_options();
        if let Some(overrides) = overrides {
            options = options.with_overrides(overrides);
        }
        if let Some(subscription) = self.subscription {
            options = options.with_subscription(subscription);
        }

        let flags = FeatureFlags::new(options)?;
        info!(
            flags = flags.schema().len(),
            environment = flags.environment().unwrap_or_default(),
            "Feature flags loaded"
        );
        Ok(flags)
    }
}

impl Default for FeatureFlagsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn merge(target: &mut FlagConfig, other: FlagConfig) {
    target.schema = std::mem::take(&mut target.schema).merge(other.schema);

    if let Some(other_defaults) = other.defaults {
        target.defaults = Some(match target.defaults.take() {
            Some(defaults) => defaults.merge(other_defaults),
            None => other_defaults,
        });
    }

    if other.environment.is_some() {
        target.environment = other.environment;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flagstaff_features::{FlagDefaults, FlagDefinition, FlagValue, Schema};

    #[test]
    fn test_build_from_in_memory_config() {
        let flags = FeatureFlagsBuilder::new()
            .with_config(
                FlagConfig::new(Schema::new().with_flag("max", FlagDefinition::new([2, 4])))
                    .with_defaults(FlagDefaults::new().with_environment("dev", [("max", 4)])),
            )
            .with_environment("dev")
            .build()
            .unwrap();

        assert_eq!(flags.get("max"), Some(FlagValue::from(4)));
        assert_eq!(flags.environment(), Some("dev"));
    }

    #[test]
    fn test_merge_replaces_flags_and_environments() {
        let mut base = FlagConfig::new(
            Schema::new()
                .with_flag("max", FlagDefinition::new([2, 4]))
                .with_flag("devTools", FlagDefinition::boolean()),
        )
        .with_defaults(
            FlagDefaults::new()
                .with_environment("dev", [("max", FlagValue::from(4)), ("devTools", true.into())])
                .with_environment("preview", [("devTools", true)]),
        );

        let overlay = FlagConfig::new(Schema::new().with_flag("max", FlagDefinition::new([8, 16])))
            .with_defaults(FlagDefaults::new().with_environment("dev", [("max", 16)]))
            .with_environment("dev");

        merge(&mut base, overlay);

        assert_eq!(base.schema.len(), 2);
        assert_eq!(
            base.schema.definition("max").unwrap().fallback(),
            Some(&FlagValue::from(8))
        );
        let defaults = base.defaults.unwrap();
        let dev = defaults.for_environment("dev").unwrap();
        assert_eq!(dev.len(), 1);
        assert_eq!(dev.get("max"), Some(&FlagValue::from(16)));
        assert!(defaults.for_environment("preview").is_some());
        assert_eq!(base.environment.as_deref(), Some("dev"));
    }

    #[test]
    fn test_custom_overrides_win_over_env() {
        let flags = FeatureFlagsBuilder::new()
            .with_prefix("FLAGSTAFF_BUILDER_UNSET")
            .with_config(FlagConfig::new(
                Schema::new().with_flag("devTools", FlagDefinition::boolean()),
            ))
            .overrides_from_env()
            .with_overrides(flagstaff_features::overrides(|_| Some(true.into())))
            .build()
            .unwrap();

        assert_eq!(flags.get("devTools"), Some(FlagValue::from(true)));
    }
}
