//! External-store bindings for Flagstaff feature flags.
//!
//! Mirrors the contract React's `useSyncExternalStore` expects from a store,
//! so a UI layer can re-render on flag changes without knowing how values
//! are resolved.
//!
//! ## Features
//!
//! - **Provider** - Share one store, built up front or from options
//! - **Scoped subscriptions** - Listeners are removed when their guard drops
//! - **Server snapshot** - The construction-time state, for hydration
//! - **Hydrated overrides** - Server-provided values applied once on mount
//! - **Guarded setter** - Partial updates filtered through `is_valid`
//!
//! ## Quick Start
//!
//! ```
//! use flagstaff_features::{FeatureFlagOptions, FlagDefinition, FlagValue, Schema, overrides};
//! use flagstaff_react::FeatureFlagProvider;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let schema = Schema::new()
//!     .with_flag("devTools", FlagDefinition::boolean())
//!     .with_flag("migrateDatabase", FlagDefinition::boolean().with_readonly(true));
//!
//! let provider = FeatureFlagProvider::from_options(FeatureFlagOptions::new(schema))
//!     .unwrap()
//!     .with_hydrated_overrides(overrides(|_| Some(FlagValue::from(true))));
//!
//! let renders = Arc::new(AtomicUsize::new(0));
//! let counter = renders.clone();
//! let guard = provider.subscribe(move || {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! // Only devTools is writable, so one write commits.
//! assert_eq!(provider.mount(), 1);
//! assert_eq!(renders.load(Ordering::SeqCst), 1);
//! assert_eq!(provider.get_snapshot()["devTools"], FlagValue::from(true));
//! assert_eq!(provider.get_server_snapshot()["devTools"], FlagValue::from(false));
//!
//! drop(guard);
//! let (_, handle) = provider.use_feature_flags();
//! handle.set_state([("devTools", false)]);
//! assert_eq!(renders.load(Ordering::SeqCst), 1);
//! ```

mod provider;
mod subscription;

pub use provider::{FeatureFlagProvider, FeatureFlagsHandle};
pub use subscription::StoreSubscription;
