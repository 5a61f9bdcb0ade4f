//! Composable-style bindings for Flagstaff feature flags.
//!
//! Each component calls [`FeatureFlagsHookFactory::setup`] and gets a
//! [`FlagsScope`]: a [`ShallowRef`] holding the current flag state, kept
//! fresh by a store listener, plus a setter for partial updates. Dropping
//! the scope removes the listener.
//!
//! ```
//! use flagstaff_features::{FeatureFlags, FlagDefinition, FlagValue, Schema};
//! use flagstaff_vue::FeatureFlagsHookFactory;
//!
//! let flags = FeatureFlags::from_schema(
//!     Schema::new().with_flag("devTools", FlagDefinition::boolean()),
//! )
//! .unwrap();
//! let factory = FeatureFlagsHookFactory::new(flags.clone());
//! let scope = factory.setup();
//!
//! flags.set("devTools", true);
//! assert_eq!(scope.state().version(), 1);
//! assert_eq!(scope.state().value()["devTools"], FlagValue::from(true));
//! ```

mod hook;
mod shallow_ref;

pub use hook::{FeatureFlagsHookFactory, FlagsScope};
pub use shallow_ref::ShallowRef;
