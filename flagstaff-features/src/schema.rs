//! Flag Schema
//!
//! Declares the universe of flags, the closed set of options each flag
//! accepts, and which flags are read-only. Also holds the per-environment
//! defaults that sit on top of the schema fallback.

use crate::error::{FeatureFlagError, Result};
use crate::value::FlagValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Declaration of a single flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagDefinition {
    /// Valid values, in order. The first entry is the fallback.
    pub options: Vec<FlagValue>,

    /// Read-only flags ignore manual writes and overrides.
    #[serde(default)]
    pub readonly: bool,
}

impl FlagDefinition {
    /// Create a writable flag from its options.
    ///
    /// # Examples
    ///
    /// ```
    /// use flagstaff_features::{FlagDefinition, FlagValue};
    ///
    /// let max = FlagDefinition::new([2, 4]);
    /// assert_eq!(max.fallback(), Some(&FlagValue::from(2)));
    /// assert!(!max.readonly);
    /// ```
    pub fn new<I, V>(options: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FlagValue>,
    {
        Self {
            options: options.into_iter().map(Into::into).collect(),
            readonly: false,
        }
    }

    /// Create the common `[false, true]` flag.
    pub fn boolean() -> Self {
        Self::new([false, true])
    }

    /// Mark the flag read-only
    pub fn with_readonly(mut self, readonly: bool) -> Self {
        self.readonly = readonly;
        self
    }

    /// Value used when no other source applies.
    pub fn fallback(&self) -> Option<&FlagValue> {
        self.options.first()
    }

    /// Membership test against the option list.
    pub fn accepts(&self, value: &FlagValue) -> bool {
        self.options.contains(value)
    }
}

/// The set of declared flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    flags: BTreeMap<String, FlagDefinition>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a flag, replacing any previous declaration with the same name.
    ///
    /// # Examples
    ///
    /// ```
    /// use flagstaff_features::{FlagDefinition, Schema};
    ///
    /// let schema = Schema::new()
    ///     .with_flag("devTools", FlagDefinition::boolean())
    ///     .with_flag("migrateDatabase", FlagDefinition::boolean().with_readonly(true))
    ///     .with_flag("max", FlagDefinition::new([2, 4]));
    ///
    /// assert_eq!(schema.len(), 3);
    /// assert!(schema.definition("migrateDatabase").unwrap().readonly);
    /// ```
    pub fn with_flag(mut self, name: impl Into<String>, definition: FlagDefinition) -> Self {
        self.flags.insert(name.into(), definition);
        self
    }

    pub fn definition(&self, flag: &str) -> Option<&FlagDefinition> {
        self.flags.get(flag)
    }

    pub fn contains(&self, flag: &str) -> bool {
        self.flags.contains_key(flag)
    }

    /// Declared flag names, sorted.
    pub fn flags(&self) -> impl Iterator<Item = &str> {
        self.flags.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FlagDefinition)> {
        self.flags.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Declarations from `other` replace same-named ones in `self`.
    pub fn merge(mut self, other: Schema) -> Self {
        self.flags.extend(other.flags);
        self
    }

    /// Check that every flag has at least one option.
    ///
    /// A schema built in code or deserialized from a file can violate this;
    /// the store refuses to build from such a schema.
    pub fn validate(&self) -> Result<()> {
        match self.iter().find(|(_, def)| def.options.is_empty()) {
            Some((name, _)) => Err(FeatureFlagError::EmptyOptions(name.to_string())),
            None => Ok(()),
        }
    }
}

/// Partial flag values for one environment.
pub type EnvironmentDefaults = BTreeMap<String, FlagValue>;

/// Per-environment defaults, keyed by environment name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlagDefaults {
    environments: BTreeMap<String, EnvironmentDefaults>,
}

impl FlagDefaults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add defaults for an environment.
    ///
    /// # Examples
    ///
    /// ```
    /// use flagstaff_features::{FlagDefaults, FlagValue};
    ///
    /// let defaults = FlagDefaults::new()
    ///     .with_environment("dev", [("devTools", FlagValue::from(true)), ("max", 4.into())])
    ///     .with_environment("preview", [("devTools", true)]);
    ///
    /// assert_eq!(
    ///     defaults.for_environment("dev").and_then(|d| d.get("max")),
    ///     Some(&FlagValue::from(4))
    /// );
    /// assert!(defaults.for_environment("prod").is_none());
    /// ```
    pub fn with_environment<I, K, V>(mut self, environment: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FlagValue>,
    {
        let entry = self.environments.entry(environment.into()).or_default();
        for (flag, value) in values {
            entry.insert(flag.into(), value.into());
        }
        self
    }

    /// Environments in `other` replace same-named environments in `self`
    /// wholesale; their flag values are not merged.
    pub fn merge(mut self, other: FlagDefaults) -> Self {
        self.environments.extend(other.environments);
        self
    }

    pub fn for_environment(&self, environment: &str) -> Option<&EnvironmentDefaults> {
        self.environments.get(environment)
    }

    pub fn environments(&self) -> impl Iterator<Item = &str> {
        self.environments.keys().map(String::as_str)
    }
}
