//! Search order and listing.

use pretty_assertions::assert_eq;
use std::time::Duration;
use tests::files::TypedefDir;
use tests::fixtures;
use tests::{init_tracing, DescriptorLoadError, DescriptorLoader, LocatorConfig};
use typedef_core::load_descriptor;

#[tokio::test]
async fn directory_descriptor_is_loaded() {
    init_tracing();
    let dir = TypedefDir::new();
    let file = dir.write("Acme", &fixtures::custom_descriptor_json("Acme"));

    let config = LocatorConfig::default().with_search_dir(dir.path());
    let loader = DescriptorLoader::from_config(&config);
    let descriptor = loader.load("Acme").await.unwrap();

    assert_eq!(descriptor.name(), "Acme");
    assert_eq!(descriptor.origin(), file.display().to_string());
    assert_eq!(descriptor.description(), Some("Test domain type: Acme"));
}

#[tokio::test]
async fn first_directory_wins_over_builtin() {
    init_tracing();
    let custom = TypedefDir::new();
    let user = TypedefDir::new();
    custom.write("JRF", &fixtures::custom_descriptor_json("JRF"));
    user.write("JRF", &fixtures::legacy_descriptor_json("JRF"));

    let config = LocatorConfig::default()
        .with_search_dir(custom.path())
        .with_search_dir(user.path());
    let descriptor = DescriptorLoader::from_config(&config).load("JRF").await.unwrap();

    assert!(descriptor.origin().starts_with(&custom.path().display().to_string()));
    assert_eq!(descriptor.definitions().len(), 2);

    // Domain types the directories lack still come from the builtins
    let wls = DescriptorLoader::from_config(&config).load("WLS").await.unwrap();
    assert_eq!(wls.origin(), "builtin:WLS");
}

#[tokio::test]
async fn builtins_can_be_disabled() {
    let dir = TypedefDir::new();
    let config = LocatorConfig::default()
        .with_search_dir(dir.path())
        .with_builtin(false);

    match DescriptorLoader::from_config(&config).load("JRF").await {
        Err(DescriptorLoadError::NotFound { domain_type, searched }) => {
            assert_eq!(domain_type, "JRF");
            assert_eq!(searched, dir.path().display().to_string());
        }
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn missing_directory_is_skipped() {
    let dir = TypedefDir::new();
    let config = LocatorConfig::default().with_search_dir(dir.path().join("does-not-exist"));

    let descriptor = DescriptorLoader::from_config(&config).load("RestrictedJRF").await.unwrap();
    assert_eq!(descriptor.origin(), "builtin:RestrictedJRF");
}

#[tokio::test]
async fn path_like_names_are_not_found() {
    let dir = TypedefDir::new();
    let config = LocatorConfig::default().with_search_dir(dir.path());
    let loader = DescriptorLoader::from_config(&config);

    for name in ["../JRF", "a/b", ""] {
        assert!(
            matches!(loader.load(name).await, Err(DescriptorLoadError::NotFound { .. })),
            "{:?} should not be found",
            name
        );
    }
}

#[tokio::test]
async fn available_lists_every_layer() {
    let dir = TypedefDir::new();
    dir.write("Acme", &fixtures::custom_descriptor_json("Acme"));
    dir.write("JRF", &fixtures::custom_descriptor_json("JRF"));
    std::fs::write(dir.path().join("notes.txt"), "not a descriptor").unwrap();

    let config = LocatorConfig::default().with_search_dir(dir.path());
    let loader = DescriptorLoader::from_config(&config);
    assert_eq!(
        loader.available_domain_types().await.unwrap(),
        vec!["Acme", "JRF", "RestrictedJRF", "WLS"]
    );
}

#[tokio::test]
async fn default_policy_falls_back_to_builtins() {
    // Holds whether or not a user typedefs directory exists, as long as it
    // does not shadow WLS with a broken file.
    let descriptor = load_descriptor("WLS").await.unwrap();
    assert_eq!(descriptor.name(), "WLS");
}

#[tokio::test]
async fn generous_deadline_does_not_fail_loads() {
    let loader = DescriptorLoader::builtin().with_read_timeout(Duration::from_secs(5));
    assert!(loader.load("JRF").await.is_ok());
    assert!(loader
        .load_with_deadline("WLS", Duration::from_secs(5))
        .await
        .is_ok());
}
