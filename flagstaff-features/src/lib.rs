//! Feature Flags for Flagstaff
//!
//! Schema-driven feature flags whose effective values are resolved from
//! several competing sources, stored in a validated, observable store.
//!
//! # Features
//!
//! - **Closed schemas** - Every flag declares its valid options; anything else is rejected
//! - **Precedence chain** - Manual write, live override, environment default, current value, fallback
//! - **Read-only flags** - Only defaults and the fallback ever apply
//! - **Guarded writes** - A write commits only if resolution agrees with it
//! - **Subscriptions** - Synchronous notification of every committed write
//!
//! # Quick Start
//!
//! ```
//! use flagstaff_features::*;
//!
//! let schema = Schema::new()
//!     .with_flag("devTools", FlagDefinition::boolean())
//!     .with_flag("migrateDatabase", FlagDefinition::boolean().with_readonly(true))
//!     .with_flag("max", FlagDefinition::new([2, 4]));
//!
//! let flags = FeatureFlags::new(
//!     FeatureFlagOptions::new(schema)
//!         .with_environment("dev")
//!         .with_defaults(FlagDefaults::new().with_environment(
//!             "dev",
//!             [("migrateDatabase", FlagValue::from(true)), ("max", 4.into())],
//!         )),
//! )
//! .unwrap();
//!
//! assert_eq!(flags.get("max"), Some(FlagValue::from(4)));
//! assert_eq!(flags.get("migrateDatabase"), Some(FlagValue::from(true)));
//! ```
//!
//! # Guarded Writes
//!
//! ```
//! use flagstaff_features::*;
//!
//! let schema = Schema::new()
//!     .with_flag("devTools", FlagDefinition::boolean())
//!     .with_flag("migrateDatabase", FlagDefinition::boolean().with_readonly(true));
//! let flags = FeatureFlags::from_schema(schema).unwrap();
//!
//! assert!(flags.set("devTools", true));
//! assert!(!flags.set("devTools", "yes"));
//! assert!(!flags.set("migrateDatabase", true));
//! assert_eq!(flags.get("migrateDatabase"), Some(false.into()));
//! ```
//!
//! # Subscriptions
//!
//! ```
//! use flagstaff_features::*;
//! use std::sync::{Arc, Mutex};
//!
//! let flags = FeatureFlags::from_schema(
//!     Schema::new().with_flag("max", FlagDefinition::new([2, 4])),
//! )
//! .unwrap();
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = seen.clone();
//! let listener = subscription(move |flag, value| {
//!     sink.lock().unwrap().push(format!("{flag}={value}"));
//! });
//!
//! flags.subscribe(listener.clone());
//! flags.set("max", 4);
//! flags.unsubscribe(&listener);
//! flags.set("max", 2);
//!
//! assert_eq!(*seen.lock().unwrap(), vec!["max=4".to_string()]);
//! ```

pub mod error;
pub mod resolver;
pub mod schema;
pub mod state;
pub mod store;
pub mod traits;
pub mod value;

pub use error::{FeatureFlagError, Result};
pub use resolver::{Overrides, Resolver, overrides};
pub use schema::{EnvironmentDefaults, FlagDefaults, FlagDefinition, Schema};
pub use state::FlagState;
pub use store::{FeatureFlagOptions, FeatureFlags, Subscription, subscription};
pub use traits::ObservableFlags;
pub use value::FlagValue;
