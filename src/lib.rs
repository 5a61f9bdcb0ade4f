// Flagstaff - Schema-validated feature flags for Rust
//
// Declares flags with their allowed values, resolves them per environment
// with runtime overrides, and notifies subscribers when a value changes.

// Re-export core functionality
pub use flagstaff_features::*;

// Re-export optional crates
#[cfg(feature = "config")]
pub use flagstaff_config;

#[cfg(feature = "react")]
pub use flagstaff_react;

#[cfg(feature = "vue")]
pub use flagstaff_vue;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        FeatureFlagError, FeatureFlagOptions, FeatureFlags, FlagDefaults, FlagDefinition,
        FlagState, FlagValue, ObservableFlags, Schema, overrides, subscription,
    };

    #[cfg(feature = "config")]
    pub use flagstaff_config::{ConfigLoader, EnvLoader, FeatureFlagsBuilder, FlagConfig};

    #[cfg(feature = "react")]
    pub use flagstaff_react::FeatureFlagProvider;

    #[cfg(feature = "vue")]
    pub use flagstaff_vue::FeatureFlagsHookFactory;
}
