//! Capability interface for reactive bindings
//!
//! UI adapters are written against [`ObservableFlags`] rather than the
//! concrete store, so they can only read, propose writes, validate and
//! observe. Resolution stays inside the store.

use crate::state::FlagState;
use crate::store::{FeatureFlags, Subscription};
use crate::value::FlagValue;

/// What a reactive adapter may do with a flag store.
pub trait ObservableFlags: Send + Sync {
    /// Current value of a flag.
    fn get(&self, flag: &str) -> Option<FlagValue>;

    /// Propose a write; `true` if it was committed.
    fn set(&self, flag: &str, value: FlagValue) -> bool;

    /// Whether `value` is a declared option of `flag`.
    fn is_valid(&self, flag: &str, value: &FlagValue) -> bool;

    fn subscribe(&self, subscription: Subscription);

    fn unsubscribe(&self, subscription: &Subscription);

    /// Owned copy of the live values.
    fn snapshot(&self) -> FlagState;

    /// Values as resolved at construction.
    fn initial_snapshot(&self) -> FlagState;

    /// Declared flag names.
    fn flags(&self) -> Vec<String>;
}

impl ObservableFlags for FeatureFlags {
    fn get(&self, flag: &str) -> Option<FlagValue> {
        FeatureFlags::get(self, flag)
    }

    fn set(&self, flag: &str, value: FlagValue) -> bool {
        FeatureFlags::set(self, flag, value)
    }

    fn is_valid(&self, flag: &str, value: &FlagValue) -> bool {
        FeatureFlags::is_valid(self, flag, value)
    }

    fn subscribe(&self, subscription: Subscription) {
        FeatureFlags::subscribe(self, subscription)
    }

    fn unsubscribe(&self, subscription: &Subscription) {
        FeatureFlags::unsubscribe(self, subscription)
    }

    fn snapshot(&self) -> FlagState {
        self.store()
    }

    fn initial_snapshot(&self) -> FlagState {
        self.initial_store().clone()
    }

    fn flags(&self) -> Vec<String> {
        self.schema().flags().map(String::from).collect()
    }
}
