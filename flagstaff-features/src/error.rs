// Error types for feature flag construction

use thiserror::Error;

/// Configuration errors raised while building a [`crate::FeatureFlags`] store.
///
/// Rejected writes are not errors; [`crate::FeatureFlags::set`] reports them
/// as `false`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeatureFlagError {
    #[error("Defaults were supplied without an environment to select them")]
    MissingEnvironment,

    #[error("Flag '{0}' declares no options")]
    EmptyOptions(String),
}

pub type Result<T> = std::result::Result<T, FeatureFlagError>;
