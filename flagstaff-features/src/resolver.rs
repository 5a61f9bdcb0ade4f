//! Value Resolution
//!
//! Computes the effective value of a flag from its competing sources.
//! Highest precedence first:
//!
//! 1. the proposed manual value (writable flags only)
//! 2. the live override source (writable flags only)
//! 3. the active environment default
//! 4. the flag's current value
//! 5. the schema fallback, `options[0]`
//!
//! Every candidate must be one of the flag's options; invalid candidates are
//! skipped rather than coerced, so resolution always lands on a valid value.

use crate::schema::{EnvironmentDefaults, FlagDefinition, Schema};
use crate::state::FlagState;
use crate::value::FlagValue;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Live override source.
///
/// Called once per resolution of a writable flag. Returning `None` means the
/// source has no opinion about that flag.
pub type Overrides = Arc<dyn Fn(&str) -> Option<FlagValue> + Send + Sync>;

/// Wrap a closure as an [`Overrides`] source.
pub fn overrides<F>(source: F) -> Overrides
where
    F: Fn(&str) -> Option<FlagValue> + Send + Sync + 'static,
{
    Arc::new(source)
}

/// Resolution context: a schema plus the environment defaults and override
/// source that apply to it.
///
/// The store builds one of these for construction and another, with the same
/// inputs, for every write it validates.
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    schema: &'a Schema,
    defaults: Option<&'a EnvironmentDefaults>,
    overrides: Option<&'a Overrides>,
}

impl<'a> Resolver<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
            defaults: None,
            overrides: None,
        }
    }

    /// Use the defaults of the active environment
    pub fn with_defaults(mut self, defaults: Option<&'a EnvironmentDefaults>) -> Self {
        self.defaults = defaults;
        self
    }

    /// Use a live override source
    pub fn with_overrides(mut self, overrides: Option<&'a Overrides>) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    /// Whether `value` is one of the options declared for `flag`.
    ///
    /// Always false for undeclared flags.
    pub fn is_valid(&self, flag: &str, value: &FlagValue) -> bool {
        self.schema
            .definition(flag)
            .is_some_and(|def| def.accepts(value))
    }

    /// Ask the override source about `flag`.
    ///
    /// Read-only flags never consult the source. A value outside the flag's
    /// options is discarded.
    pub fn resolve_override(&self, flag: &str) -> Option<FlagValue> {
        let definition = self.schema.definition(flag)?;
        self.override_for(flag, definition)
    }

    /// Resolve the effective value of `flag`.
    ///
    /// Returns `None` only when `flag` is not declared in the schema. The
    /// override source is invoked exactly once per call, even when the manual
    /// value wins.
    ///
    /// # Examples
    ///
    /// ```
    /// use flagstaff_features::{FlagDefinition, FlagValue, Resolver, Schema};
    ///
    /// let schema = Schema::new().with_flag("max", FlagDefinition::new([2, 4]));
    /// let resolver = Resolver::new(&schema);
    ///
    /// assert_eq!(resolver.resolve_value("max", None, None), Some(FlagValue::from(2)));
    /// assert_eq!(
    ///     resolver.resolve_value("max", None, Some(&FlagValue::from(4))),
    ///     Some(FlagValue::from(4))
    /// );
    /// // Not an option, so the manual value is skipped.
    /// assert_eq!(
    ///     resolver.resolve_value("max", None, Some(&FlagValue::from(3))),
    ///     Some(FlagValue::from(2))
    /// );
    /// ```
    pub fn resolve_value(
        &self,
        flag: &str,
        current: Option<&FlagValue>,
        manual: Option<&FlagValue>,
    ) -> Option<FlagValue> {
        let definition = self.schema.definition(flag)?;
        let valid = |v: &&FlagValue| definition.accepts(v);

        let manual = manual.filter(|_| !definition.readonly).filter(valid);
        let overridden = self.override_for(flag, definition);
        let default = self
            .defaults
            .and_then(|defaults| defaults.get(flag))
            .filter(valid);
        let current = current.filter(valid);

        manual
            .cloned()
            .or(overridden)
            .or_else(|| default.cloned())
            .or_else(|| current.cloned())
            .or_else(|| definition.fallback().cloned())
    }

    /// Resolve every declared flag with no current or manual value.
    pub fn compute_store(&self) -> FlagState {
        self.schema
            .flags()
            .filter_map(|flag| {
                self.resolve_value(flag, None, None)
                    .map(|value| (flag.to_string(), value))
            })
            .collect()
    }

    fn override_for(&self, flag: &str, definition: &FlagDefinition) -> Option<FlagValue> {
        if definition.readonly {
            return None;
        }

        let value = (self.overrides?)(flag)?;
        if definition.accepts(&value) {
            Some(value)
        } else {
            trace!(flag, value = %value, "Ignoring override outside the flag's options");
            None
        }
    }
}

impl fmt::Debug for Resolver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("schema", self.schema)
            .field("defaults", &self.defaults)
            .field("overrides", &self.overrides.is_some())
            .finish()
    }
}
