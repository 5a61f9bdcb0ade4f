// Composable factory

use crate::ShallowRef;
use flagstaff_features::{
    FeatureFlags, FlagState, FlagValue, ObservableFlags, Subscription, subscription,
};
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

/// Produces a [`FlagsScope`] per component that uses the flags.
///
/// # Examples
///
/// ```
/// use flagstaff_features::{FeatureFlags, FlagDefinition, FlagValue, Schema};
/// use flagstaff_vue::FeatureFlagsHookFactory;
///
/// let flags = FeatureFlags::from_schema(
///     Schema::new().with_flag("max", FlagDefinition::new([2, 4])),
/// )
/// .unwrap();
/// let use_feature_flags = FeatureFlagsHookFactory::new(flags);
///
/// let scope = use_feature_flags.setup();
/// scope.set_state([("max", 4)]);
/// assert_eq!(scope.state().value()["max"], FlagValue::from(4));
///
/// scope.unmount();
/// ```
pub struct FeatureFlagsHookFactory<F: ObservableFlags + ?Sized = FeatureFlags> {
    flags: Arc<F>,
}

impl FeatureFlagsHookFactory<FeatureFlags> {
    pub fn new(flags: FeatureFlags) -> Self {
        Self::from_shared(Arc::new(flags))
    }
}

impl<F: ObservableFlags + ?Sized> FeatureFlagsHookFactory<F> {
    pub fn from_shared(flags: Arc<F>) -> Self {
        Self { flags }
    }

    pub fn flags(&self) -> &Arc<F> {
        &self.flags
    }

    /// Set up a component: snapshot the store into a ref and keep it fresh
    /// until the returned scope is unmounted.
    pub fn setup(&self) -> FlagsScope<F>
    where
        F: 'static,
    {
        let state = ShallowRef::new(self.flags.snapshot());

        let target = state.clone();
        let store: Weak<F> = Arc::downgrade(&self.flags);
        let listener = subscription(move |flag, _| {
            if let Some(store) = store.upgrade() {
                trace!(flag, "Refreshing flag ref");
                target.replace(store.snapshot());
            }
        });
        self.flags.subscribe(listener.clone());
        debug!("Flag scope mounted");

        FlagsScope {
            flags: self.flags.clone(),
            state,
            listener: Some(listener),
        }
    }
}

impl<F: ObservableFlags + ?Sized> Clone for FeatureFlagsHookFactory<F> {
    fn clone(&self) -> Self {
        Self {
            flags: self.flags.clone(),
        }
    }
}

/// One component's view of the flags.
///
/// The listener is removed when the scope is unmounted or dropped.
pub struct FlagsScope<F: ObservableFlags + ?Sized = FeatureFlags> {
    flags: Arc<F>,
    state: ShallowRef<FlagState>,
    listener: Option<Subscription>,
}

impl<F: ObservableFlags + ?Sized> FlagsScope<F> {
    pub fn state(&self) -> &ShallowRef<FlagState> {
        &self.state
    }

    /// Apply a partial update through the store's validity guard.
    /// Returns the number of committed writes.
    pub fn set_state<I, K, V>(&self, updates: I) -> usize
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<FlagValue>,
    {
        let mut committed = 0;
        for (flag, value) in updates {
            let flag = flag.as_ref();
            let value: FlagValue = value.into();
            if !self.flags.is_valid(flag, &value) {
                trace!(flag, value = %value, "Dropping update outside the flag's options");
                continue;
            }
            if self.flags.set(flag, value) {
                committed += 1;
            }
        }
        committed
    }

    pub fn is_mounted(&self) -> bool {
        self.listener.is_some()
    }

    /// Stop tracking the store.
    pub fn unmount(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(listener) = self.listener.take() {
            self.flags.unsubscribe(&listener);
            debug!("Flag scope unmounted");
        }
    }
}

impl<F: ObservableFlags + ?Sized> Drop for FlagsScope<F> {
    fn drop(&mut self) {
        self.release();
    }
}
