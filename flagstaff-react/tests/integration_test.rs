//! Integration tests for flagstaff-react

use flagstaff_features::*;
use flagstaff_react::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

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
    .with_environment("prod")
}

fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let inner = count.clone();
    (count, move || {
        inner.fetch_add(1, Ordering::SeqCst);
    })
}

#[test]
fn test_provider_from_existing_store() {
    let flags = FeatureFlags::new(options()).unwrap();
    let provider = FeatureFlagProvider::new(flags.clone());

    assert!(flags.set("max", 4));
    assert_eq!(provider.get_snapshot()["max"], FlagValue::from(4));
    assert_eq!(provider.get_server_snapshot()["max"], FlagValue::from(2));
}

#[test]
fn test_provider_from_options_error() {
    let result = FeatureFlagProvider::from_options(options().with_defaults(FlagDefaults::new()));
    assert!(result.is_ok());

    let mut no_env = options();
    no_env.environment = None;
    let result = FeatureFlagProvider::from_options(no_env.with_defaults(FlagDefaults::new()));
    assert!(matches!(result, Err(FeatureFlagError::MissingEnvironment)));
}

#[test]
fn test_subscription_released_on_drop() {
    let provider = FeatureFlagProvider::from_options(options()).unwrap();
    let (count, listener) = counter();

    {
        let _guard = provider.subscribe(listener);
        assert_eq!(provider.flags().subscriber_count(), 1);
        let (_, handle) = provider.use_feature_flags();
        handle.set_state([("max", 4)]);
    }

    assert_eq!(provider.flags().subscriber_count(), 0);
    let (_, handle) = provider.use_feature_flags();
    handle.set_state([("max", 2)]);
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_subscription_released_on_panic() {
    let provider = FeatureFlagProvider::from_options(options()).unwrap();
    let flags = provider.flags().clone();
    let (_, listener) = counter();

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _guard = provider.subscribe(listener);
        panic!("render failed");
    }));

    assert!(result.is_err());
    assert_eq!(flags.subscriber_count(), 0);
}

#[test]
fn test_explicit_unsubscribe() {
    let provider = FeatureFlagProvider::from_options(options()).unwrap();
    let (count, listener) = counter();

    let guard = provider.subscribe(listener);
    guard.unsubscribe();

    let (_, handle) = provider.use_feature_flags();
    handle.set_state([("devTools", true)]);
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[test]
fn test_hydration_runs_once_and_skips_rejections() {
    let provider = FeatureFlagProvider::from_options(options())
        .unwrap()
        .with_hydrated_overrides(overrides(|flag| match flag {
            "devTools" => Some(true.into()),
            "migrateDatabase" => Some(true.into()),
            "max" => Some(3.into()),
            _ => None,
        }));

    assert!(!provider.is_hydrated());
    assert_eq!(provider.mount(), 1);
    assert!(provider.is_hydrated());

    let state = provider.get_snapshot();
    assert_eq!(state["devTools"], FlagValue::from(true));
    assert_eq!(state["migrateDatabase"], FlagValue::from(false));
    assert_eq!(state["max"], FlagValue::from(2));

    let (_, handle) = provider.use_feature_flags();
    handle.set_state([("devTools", false)]);
    assert_eq!(provider.mount(), 0);
    assert_eq!(provider.get_snapshot()["devTools"], FlagValue::from(false));
}

#[test]
fn test_mount_without_overrides() {
    let provider = FeatureFlagProvider::from_options(options()).unwrap();
    assert_eq!(provider.mount(), 0);
    assert!(!provider.is_hydrated());
}

#[test]
fn test_set_state_filters_invalid_updates() {
    let provider = FeatureFlagProvider::from_options(options()).unwrap();
    let (state, handle) = provider.use_feature_flags();
    assert_eq!(state["max"], FlagValue::from(2));

    let committed = handle.set_state([
        ("max", FlagValue::from(4)),
        ("max", FlagValue::from("4")),
        ("devTools", FlagValue::from(true)),
        ("migrateDatabase", FlagValue::from(true)),
        ("unknown", FlagValue::from(true)),
    ]);

    assert_eq!(committed, 2);
    assert_eq!(handle.get("max"), Some(FlagValue::from(4)));
    assert_eq!(handle.get("migrateDatabase"), Some(FlagValue::from(false)));

    // The state returned earlier is a snapshot.
    assert_eq!(state["max"], FlagValue::from(2));
}

#[test]
fn test_generic_over_capability_trait() {
    let shared: Arc<dyn ObservableFlags> = Arc::new(FeatureFlags::new(options()).unwrap());
    let provider = FeatureFlagProvider::from_shared(shared);
    let (count, listener) = counter();
    let _guard = provider.subscribe(listener);

    let (_, handle) = provider.use_feature_flags();
    assert_eq!(handle.set_state([("devTools", true)]), 1);
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_listener_can_schedule_async_work() {
    let provider = FeatureFlagProvider::from_options(options()).unwrap();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let flags = provider.flags().clone();

    let _guard = provider.subscribe(move || {
        let _ = tx.send(flags.store());
    });

    let (_, handle) = provider.use_feature_flags();
    handle.set_state([("max", 4)]);

    let state = rx.recv().await.unwrap();
    assert_eq!(state["max"], FlagValue::from(4));
}
