//! Observable flag store
//!
//! [`FeatureFlags`] owns the live flag values and the subscriber list. The
//! only way to change a value is [`FeatureFlags::set`], which re-runs
//! resolution with the proposed value and commits it only when resolution
//! agrees.

use crate::error::{FeatureFlagError, Result};
use crate::resolver::{Overrides, Resolver};
use crate::schema::{EnvironmentDefaults, FlagDefaults, Schema};
use crate::state::FlagState;
use crate::value::FlagValue;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Callback notified with `(flag, value)` after every committed write.
pub type Subscription = Arc<dyn Fn(&str, &FlagValue) + Send + Sync>;

/// Wrap a closure as a [`Subscription`].
///
/// Keep the returned handle around if you intend to unsubscribe it later;
/// unsubscription matches by identity.
pub fn subscription<F>(callback: F) -> Subscription
where
    F: Fn(&str, &FlagValue) + Send + Sync + 'static,
{
    Arc::new(callback)
}

/// Construction options for [`FeatureFlags`].
///
/// Options are cheap to clone, so a shared base (schema plus defaults) can be
/// specialised per environment.
///
/// # Examples
///
/// ```
/// use flagstaff_features::{FeatureFlagOptions, FeatureFlags, FlagDefaults, FlagDefinition, Schema};
///
/// let options = FeatureFlagOptions::new(
///     Schema::new().with_flag("devTools", FlagDefinition::boolean()),
/// )
/// .with_defaults(FlagDefaults::new().with_environment("dev", [("devTools", true)]));
///
/// let dev = FeatureFlags::new(options.clone().with_environment("dev")).unwrap();
/// let prod = FeatureFlags::new(options.with_environment("prod")).unwrap();
///
/// assert_eq!(dev.get("devTools"), Some(true.into()));
/// assert_eq!(prod.get("devTools"), Some(false.into()));
/// ```
#[derive(Clone)]
pub struct FeatureFlagOptions {
    pub schema: Schema,
    pub environment: Option<String>,
    pub defaults: Option<FlagDefaults>,
    pub overrides: Option<Overrides>,
    pub subscription: Option<Subscription>,
}

impl FeatureFlagOptions {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            environment: None,
            defaults: None,
            overrides: None,
            subscription: None,
        }
    }

    /// Select the environment whose defaults apply
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    /// Set per-environment defaults
    pub fn with_defaults(mut self, defaults: FlagDefaults) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// Set the live override source
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// Register a subscriber at construction
    pub fn with_subscription(mut self, subscription: Subscription) -> Self {
        self.subscription = Some(subscription);
        self
    }
}

impl fmt::Debug for FeatureFlagOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureFlagOptions")
            .field("schema", &self.schema)
            .field("environment", &self.environment)
            .field("defaults", &self.defaults)
            .field("overrides", &self.overrides.is_some())
            .field("subscription", &self.subscription.is_some())
            .finish()
    }
}

/// Immutable inputs shared by every clone of a store.
struct Inner {
    schema: Schema,
    environment: Option<String>,
    defaults: Option<EnvironmentDefaults>,
    overrides: Option<Overrides>,
    initial: FlagState,
    store: RwLock<FlagState>,
    subscriptions: RwLock<Vec<Subscription>>,
}

/// Validated, observable feature flag store.
///
/// Cloning yields another handle to the same store.
#[derive(Clone)]
pub struct FeatureFlags {
    inner: Arc<Inner>,
}

impl FeatureFlags {
    /// Build a store, resolving the initial value of every flag.
    ///
    /// Fails if `defaults` are given without an `environment`, or if a flag
    /// declares no options. An environment with no entry in `defaults` is
    /// fine; its flags fall through to overrides and the schema fallback.
    pub fn new(options: FeatureFlagOptions) -> Result<Self> {
        let FeatureFlagOptions {
            schema,
            environment,
            defaults,
            overrides,
            subscription,
        } = options;

        schema.validate()?;

        let defaults = match (&defaults, &environment) {
            (Some(_), None) => return Err(FeatureFlagError::MissingEnvironment),
            (Some(defaults), Some(env)) => defaults.for_environment(env).cloned(),
            (None, _) => None,
        };

        if let Some(defaults) = &defaults {
            for (flag, value) in defaults {
                if !Resolver::new(&schema).is_valid(flag, value) {
                    warn!(
                        flag = flag.as_str(),
                        value = %value,
                        environment = environment.as_deref().unwrap_or_default(),
                        "Ignoring environment default that is not a declared option"
                    );
                }
            }
        }

        let initial = Resolver::new(&schema)
            .with_defaults(defaults.as_ref())
            .with_overrides(overrides.as_ref())
            .compute_store();

        debug!(
            flags = initial.len(),
            environment = environment.as_deref().unwrap_or_default(),
            "Feature flag store initialized"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                store: RwLock::new(initial.clone()),
                subscriptions: RwLock::new(subscription.into_iter().collect()),
                schema,
                environment,
                defaults,
                overrides,
                initial,
            }),
        })
    }

    /// Shorthand for `FeatureFlags::new(FeatureFlagOptions::new(schema))`.
    pub fn from_schema(schema: Schema) -> Result<Self> {
        Self::new(FeatureFlagOptions::new(schema))
    }

    pub fn schema(&self) -> &Schema {
        &self.inner.schema
    }

    pub fn environment(&self) -> Option<&str> {
        self.inner.environment.as_deref()
    }

    /// Resolver configured with this store's defaults and overrides.
    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.inner.schema)
            .with_defaults(self.inner.defaults.as_ref())
            .with_overrides(self.inner.overrides.as_ref())
    }

    /// Whether `value` is a declared option of `flag`.
    pub fn is_valid(&self, flag: &str, value: &FlagValue) -> bool {
        self.resolver().is_valid(flag, value)
    }

    /// Current value of `flag`, or `None` if it is not declared.
    pub fn get(&self, flag: &str) -> Option<FlagValue> {
        self.inner.store.read().get(flag).cloned()
    }

    /// Propose a new value for `flag`.
    ///
    /// Returns `true` if the value was committed. Undeclared flags, read-only
    /// flags and values resolution does not agree with are rejected without
    /// touching the store or notifying anyone.
    ///
    /// Subscribers run synchronously, in subscription order, before this
    /// returns. No lock is held while they run, so a subscriber may call
    /// `set` again; that nested write notifies the whole list in turn.
    pub fn set(&self, flag: &str, value: impl Into<FlagValue>) -> bool {
        let value = value.into();

        let Some(definition) = self.inner.schema.definition(flag) else {
            debug!(flag, "Rejected write to undeclared flag");
            return false;
        };

        if definition.readonly {
            debug!(flag, value = %value, "Rejected write to read-only flag");
            return false;
        }

        // The override source runs without the store lock held.
        let current = self.get(flag);
        let resolved = self
            .resolver()
            .resolve_value(flag, current.as_ref(), Some(&value));

        if resolved.as_ref() != Some(&value) {
            debug!(
                flag,
                value = %value,
                resolved = ?resolved,
                "Rejected write that resolution does not agree with"
            );
            return false;
        }

        self.inner.store.write().insert(flag, value.clone());

        debug!(flag, value = %value, "Committed flag write");
        self.notify(flag, &value);
        true
    }

    /// Append a subscriber. The same callback may be subscribed more than
    /// once; each registration is notified separately.
    pub fn subscribe(&self, subscription: Subscription) {
        let mut subscriptions = self.inner.subscriptions.write();
        subscriptions.push(subscription);
        debug!(subscribers = subscriptions.len(), "Subscribed to flag changes");
    }

    /// Remove the first registration of `subscription`, matched by identity.
    /// Unknown callbacks are ignored.
    pub fn unsubscribe(&self, subscription: &Subscription) {
        let mut subscriptions = self.inner.subscriptions.write();
        if let Some(index) = subscriptions
            .iter()
            .position(|s| Arc::ptr_eq(s, subscription))
        {
            subscriptions.remove(index);
            debug!(subscribers = subscriptions.len(), "Unsubscribed from flag changes");
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscriptions.read().len()
    }

    /// Snapshot of the current values.
    pub fn store(&self) -> FlagState {
        self.inner.store.read().clone()
    }

    /// Values as resolved at construction. Never changes.
    pub fn initial_store(&self) -> &FlagState {
        &self.inner.initial
    }

    fn notify(&self, flag: &str, value: &FlagValue) {
        let subscriptions = self.inner.subscriptions.read().clone();
        for subscription in &subscriptions {
            subscription(flag, value);
        }
    }
}

impl fmt::Debug for FeatureFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureFlags")
            .field("environment", &self.inner.environment)
            .field("store", &*self.inner.store.read())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
