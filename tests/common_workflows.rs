//! Integration tests for common Flagstaff workflows.
//!
//! These tests verify that the most common use cases work correctly.

use flagstaff::prelude::*;
use std::sync::{Arc, Mutex};
use tokio_test::{assert_err, assert_ok};

fn options() -> FeatureFlagOptions {
    FeatureFlagOptions::new(
        Schema::new()
            .with_flag("devTools", FlagDefinition::boolean())
            .with_flag(
                "migrateDatabase",
                FlagDefinition::boolean().with_readonly(true),
            )
            .with_flag("max", FlagDefinition::new([2, 4])),
    )
    .with_defaults(
        FlagDefaults::new()
            .with_environment(
                "dev",
                [
                    ("devTools", FlagValue::from(true)),
                    ("migrateDatabase", FlagValue::from(true)),
                    ("max", FlagValue::from(4)),
                ],
            )
            .with_environment("preview", [("devTools", true)]),
    )
}

// =============================================================================
// Environment Tests
// =============================================================================

#[test]
fn test_one_options_bundle_many_environments() {
    let dev = assert_ok!(FeatureFlags::new(options().with_environment("dev")));
    let preview = assert_ok!(FeatureFlags::new(options().with_environment("preview")));
    let prod = assert_ok!(FeatureFlags::new(options().with_environment("prod")));

    assert_eq!(dev.get("max"), Some(FlagValue::from(4)));
    assert_eq!(dev.get("migrateDatabase"), Some(FlagValue::from(true)));
    assert_eq!(preview.get("devTools"), Some(FlagValue::from(true)));
    assert_eq!(preview.get("max"), Some(FlagValue::from(2)));
    assert_eq!(prod.store(), *prod.initial_store());
    assert_eq!(prod.get("devTools"), Some(FlagValue::from(false)));
}

#[test]
fn test_defaults_require_environment() {
    let err = assert_err!(FeatureFlags::new(options()));
    assert_eq!(err, FeatureFlagError::MissingEnvironment);
}

// =============================================================================
// Runtime Tests
// =============================================================================

#[test]
fn test_override_beats_defaults_until_manual_write() {
    let flags = assert_ok!(FeatureFlags::new(
        options()
            .with_environment("dev")
            .with_overrides(overrides(|flag| match flag {
                "max" => Some(2.into()),
                "devTools" => Some("on".into()),
                _ => None,
            })),
    ));

    assert_eq!(flags.get("max"), Some(FlagValue::from(2)));
    assert_eq!(flags.get("devTools"), Some(FlagValue::from(true)));

    assert!(flags.set("max", 4));
    assert_eq!(flags.get("max"), Some(FlagValue::from(4)));
    assert_eq!(flags.initial_store()["max"], FlagValue::from(2));
}

#[test]
fn test_subscribers_see_every_commit() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    let flags = assert_ok!(FeatureFlags::new(
        options()
            .with_environment("prod")
            .with_subscription(subscription(move |flag, value| {
                sink.lock().unwrap().push(format!("{flag}={value}"));
            })),
    ));

    assert!(flags.set("devTools", true));
    assert!(flags.set("devTools", true));
    assert!(!flags.set("migrateDatabase", true));
    assert!(!flags.set("max", 3));
    assert!(flags.set("max", 4));

    assert_eq!(
        *log.lock().unwrap(),
        vec!["devTools=true", "devTools=true", "max=4"]
    );
}

#[test]
fn test_trait_object_workflow() {
    let flags: Arc<dyn ObservableFlags> =
        Arc::new(assert_ok!(FeatureFlags::new(options().with_environment("prod"))));

    assert_eq!(flags.flags(), vec!["devTools", "max", "migrateDatabase"]);
    assert!(flags.is_valid("max", &FlagValue::from(4)));
    assert!(flags.set("max", FlagValue::from(4)));
    assert_eq!(flags.initial_snapshot()["max"], FlagValue::from(2));
}

// =============================================================================
// Adapter Tests
// =============================================================================

#[cfg(feature = "config")]
#[test]
fn test_builder_from_toml_file() {
    use std::io::Write;

    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(
        br#"
[schema.devTools]
options = [false, true]

[defaults.dev]
devTools = true
"#,
    )
    .unwrap();

    let flags = assert_ok!(
        FeatureFlagsBuilder::new()
            .add_file(file.path())
            .with_environment("dev")
            .build()
    );
    assert_eq!(flags.get("devTools"), Some(FlagValue::from(true)));
}

#[cfg(feature = "react")]
#[test]
fn test_provider_snapshots() {
    let provider = assert_ok!(FeatureFlagProvider::from_options(
        options().with_environment("prod")
    ));
    let (_, handle) = provider.use_feature_flags();
    assert_eq!(handle.set_state([("max", 4)]), 1);
    assert_eq!(provider.get_snapshot()["max"], FlagValue::from(4));
    assert_eq!(provider.get_server_snapshot()["max"], FlagValue::from(2));
}

#[cfg(feature = "vue")]
#[test]
fn test_scope_tracks_store() {
    let flags = assert_ok!(FeatureFlags::new(options().with_environment("prod")));
    let factory = FeatureFlagsHookFactory::new(flags.clone());
    let scope = factory.setup();

    flags.set("devTools", true);
    assert_eq!(scope.state().value()["devTools"], FlagValue::from(true));
}
