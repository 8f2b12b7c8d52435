//! Concurrent access through a shared cache.

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tests::files::TypedefDir;
use tests::fixtures;
use tests::{init_tracing, DescriptorCache, DescriptorLoadError, DescriptorLoader, LocatorConfig};
use typedef_core::{BuiltinSource, DescriptorSource, DescriptorText, LoadResult};

/// Builtin descriptors behind a slow, counted read
#[derive(Default)]
struct SlowBuiltins {
    reads: AtomicUsize,
}

#[async_trait]
impl DescriptorSource for SlowBuiltins {
    async fn fetch(&self, domain_type: &str) -> LoadResult<Option<DescriptorText>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        BuiltinSource.fetch(domain_type).await
    }

    async fn available(&self) -> LoadResult<Vec<String>> {
        BuiltinSource.available().await
    }

    fn describe(&self) -> String {
        "slow builtin".to_string()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_load_each_name_once() {
    init_tracing();
    let source = Arc::new(SlowBuiltins::default());
    let cache = Arc::new(DescriptorCache::new(DescriptorLoader::new(source.clone())));

    let mut handles = Vec::new();
    for i in 0..24 {
        let cache = cache.clone();
        let name = ["JRF", "WLS", "RestrictedJRF"][i % 3];
        handles.push(tokio::spawn(async move {
            let resolver = cache.resolver(name).await.unwrap();
            let base = resolver
                .resolve("12.2.1.4")
                .map(|d| d.base_template().to_string());
            base
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), "Basic WebLogic Server Domain");
    }

    assert_eq!(source.reads.load(Ordering::SeqCst), 3);
    assert_eq!(cache.loaded(), vec!["JRF", "RestrictedJRF", "WLS"]);
}

#[tokio::test]
async fn cached_descriptor_is_shared() {
    let cache = DescriptorCache::new(DescriptorLoader::builtin());

    let first = cache.get_or_load("JRF").await.unwrap();
    let second = cache.get_or_load("JRF").await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn evicted_descriptor_reloads_from_disk() {
    init_tracing();
    let dir = TypedefDir::new();
    dir.write("Acme", &fixtures::legacy_descriptor_json("Acme"));
    let cache = DescriptorCache::new(DescriptorLoader::from_config(
        &LocatorConfig::default().with_search_dir(dir.path()),
    ));

    let before = cache.get_or_load("Acme").await.unwrap();
    assert_eq!(before.definitions().len(), 1);

    dir.write("Acme", &fixtures::custom_descriptor_json("Acme"));
    // Still the cached copy until evicted
    assert_eq!(cache.get_or_load("Acme").await.unwrap().definitions().len(), 1);

    assert!(cache.evict("Acme"));
    let after = cache.get_or_load("Acme").await.unwrap();
    assert_eq!(after.definitions().len(), 2);

    // Earlier holders keep what they loaded
    assert_eq!(before.definitions().len(), 1);
}

#[tokio::test]
async fn failed_load_is_not_cached() {
    let dir = TypedefDir::new();
    dir.write_raw("Late", "{");
    let cache = DescriptorCache::new(DescriptorLoader::from_config(
        &LocatorConfig::default().with_search_dir(dir.path()),
    ));

    assert!(matches!(
        cache.get_or_load("Late").await,
        Err(DescriptorLoadError::Parse { .. })
    ));
    assert!(cache.is_empty());

    dir.write("Late", &fixtures::custom_descriptor_json("Late"));
    assert!(cache.get_or_load("Late").await.is_ok());
    assert_eq!(cache.len(), 1);

    cache.clear();
    assert!(cache.is_empty());
}
