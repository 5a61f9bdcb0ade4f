// Feature flag provider

use crate::StoreSubscription;
use flagstaff_features::{
    FeatureFlagOptions, FeatureFlags, FlagState, FlagValue, ObservableFlags, Overrides, Result,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Shares one flag store with a component tree.
///
/// Exposes the external-store protocol (`subscribe`, `get_snapshot`,
/// `get_server_snapshot`) and hands out [`FeatureFlagsHandle`]s to
/// consumers. Server-provided values can be hydrated once on mount.
pub struct FeatureFlagProvider<F: ObservableFlags + ?Sized = FeatureFlags> {
    flags: Arc<F>,
    hydrated_overrides: Option<Overrides>,
    hydrated: AtomicBool,
}

impl FeatureFlagProvider<FeatureFlags> {
    /// Provide an existing store
    pub fn new(flags: FeatureFlags) -> Self {
        Self::from_shared(Arc::new(flags))
    }

    /// Build the store from options and provide it
    pub fn from_options(options: FeatureFlagOptions) -> Result<Self> {
        Ok(Self::new(FeatureFlags::new(options)?))
    }
}

impl<F: ObservableFlags + ?Sized> FeatureFlagProvider<F> {
    /// Provide any store implementing [`ObservableFlags`]
    pub fn from_shared(flags: Arc<F>) -> Self {
        Self {
            flags,
            hydrated_overrides: None,
            hydrated: AtomicBool::new(false),
        }
    }

    /// Values to apply once on [`mount`](Self::mount), typically shipped
    /// alongside server-rendered markup.
    pub fn with_hydrated_overrides(mut self, overrides: Overrides) -> Self {
        self.hydrated_overrides = Some(overrides);
        self
    }

    pub fn flags(&self) -> &Arc<F> {
        &self.flags
    }

    /// Register a change listener; dropping the returned guard removes it.
    pub fn subscribe<L>(&self, listener: L) -> StoreSubscription<F>
    where
        L: Fn() + Send + Sync + 'static,
    {
        StoreSubscription::new(self.flags.clone(), listener)
    }

    /// Current values
    pub fn get_snapshot(&self) -> FlagState {
        self.flags.snapshot()
    }

    /// Values resolved at construction, stable across the session
    pub fn get_server_snapshot(&self) -> FlagState {
        self.flags.initial_snapshot()
    }

    /// Apply hydrated overrides. Runs at most once per provider; later calls
    /// return 0.
    ///
    /// Every value goes through `is_valid` before `set`; invalid values and
    /// rejected writes (read-only flags, for instance) are skipped silently.
    /// Returns the number of committed writes.
    pub fn mount(&self) -> usize {
        let Some(overrides) = &self.hydrated_overrides else {
            return 0;
        };
        if self.hydrated.swap(true, Ordering::SeqCst) {
            return 0;
        }

        let mut committed = 0;
        for flag in self.flags.flags() {
            let Some(value) = overrides(flag.as_str()) else {
                continue;
            };
            if self.flags.is_valid(&flag, &value) && self.flags.set(&flag, value) {
                committed += 1;
            }
        }

        debug!(committed, "Hydrated feature flags");
        committed
    }

    pub fn is_hydrated(&self) -> bool {
        self.hydrated.load(Ordering::SeqCst)
    }

    /// Read the current state together with a setter.
    pub fn use_feature_flags(&self) -> (FlagState, FeatureFlagsHandle<F>) {
        (
            self.get_snapshot(),
            FeatureFlagsHandle {
                flags: self.flags.clone(),
            },
        )
    }
}

impl<F: ObservableFlags + ?Sized> Clone for FeatureFlagProvider<F> {
    /// Clones share the store and start with the same hydration state.
    fn clone(&self) -> Self {
        Self {
            flags: self.flags.clone(),
            hydrated_overrides: self.hydrated_overrides.clone(),
            hydrated: AtomicBool::new(self.is_hydrated()),
        }
    }
}

/// Setter half of [`FeatureFlagProvider::use_feature_flags`].
pub struct FeatureFlagsHandle<F: ObservableFlags + ?Sized = FeatureFlags> {
    flags: Arc<F>,
}

impl<F: ObservableFlags + ?Sized> FeatureFlagsHandle<F> {
    /// Apply a partial update. Values outside a flag's options, undeclared
    /// flags and rejected writes are dropped. Returns the number committed.
    pub fn set_state<I, K, V>(&self, updates: I) -> usize
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<FlagValue>,
    {
        let mut committed = 0;
        for (flag, value) in updates {
            let flag = flag.as_ref();
            let value = value.into();
            if self.flags.is_valid(flag, &value) && self.flags.set(flag, value) {
                committed += 1;
            }
        }
        committed
    }

    pub fn get(&self, flag: &str) -> Option<FlagValue> {
        self.flags.get(flag)
    }
}

impl<F: ObservableFlags + ?Sized> Clone for FeatureFlagsHandle<F> {
    fn clone(&self) -> Self {
        Self {
            flags: self.flags.clone(),
        }
    }
}
