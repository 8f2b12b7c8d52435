//! Discovery filtering.

use pretty_assertions::assert_eq;
use tests::fixtures;
use tests::{init_tracing, DescriptorLoader, Resolver};

async fn jrf() -> Resolver {
    init_tracing();
    Resolver::new(DescriptorLoader::builtin().load("JRF").await.unwrap())
}

#[tokio::test]
async fn dms_application_is_excluded() {
    let jrf = jrf().await;

    assert!(jrf.is_excluded("/Application", "DMS Application Helper"));
    assert!(!jrf.is_excluded("/Application", "MyCustomApp"));
}

#[tokio::test]
async fn matching_filter_names_the_pattern() {
    let jrf = jrf().await;

    let pattern = jrf
        .matching_filter("/Application", "DMS Application#12.2.1.1.0")
        .expect("should be filtered");
    assert_eq!(pattern.as_str(), "^DMS Application.*");
    assert!(jrf.matching_filter("/Application", "MyCustomApp").is_none());
}

#[tokio::test]
async fn patterns_match_the_whole_name() {
    let jrf = jrf().await;

    assert!(jrf.is_excluded("/Application", "em"));
    assert!(!jrf.is_excluded("/Application", "em-custom"));
    assert!(!jrf.is_excluded("/Application", "my-em"));
}

#[tokio::test]
async fn unknown_path_excludes_nothing() {
    let jrf = jrf().await;

    assert!(!jrf.is_excluded("/Unknown", "em"));
    assert!(!jrf.excludes_folder("/Unknown"));
}

#[tokio::test]
async fn filters_are_path_scoped() {
    let jrf = jrf().await;

    assert!(jrf.is_excluded("/JDBCSystemResource", "opss-data-source"));
    assert!(!jrf.is_excluded("/Application", "opss-data-source"));
    assert!(jrf.is_excluded("/StartupClass", "JRF Startup Class"));
    assert!(jrf.is_excluded("/Library", "oracle.adf.view"));
}

#[tokio::test]
async fn filtering_is_idempotent() {
    let jrf = jrf().await;

    let name = "DMS Application Helper";
    let first = jrf.is_excluded("/Application", name);
    assert_eq!(first, jrf.is_excluded("/Application", name));
}

#[test]
fn empty_rule_set_filters_folder_but_no_names() {
    let resolver = Resolver::new(
        fixtures::parse("Custom", &fixtures::custom_descriptor_json("Custom")).unwrap(),
    );

    assert!(resolver.excludes_folder("/Library"));
    assert!(!resolver.is_excluded("/Library", "acme-lib"));
    assert!(resolver.is_excluded("/Application", "acme-internal-admin"));
}

#[test]
fn legacy_layout_filters_like_current_layout() {
    let legacy = Resolver::new(
        fixtures::parse("Legacy", &fixtures::legacy_descriptor_json("Legacy")).unwrap(),
    );

    let paths: Vec<&str> = legacy.descriptor().discover_filters().paths().collect();
    assert_eq!(paths, vec!["/Application", "/Library"]);
    assert!(legacy.is_excluded("/Application", "em"));
    assert!(legacy.is_excluded("/Application", "acme-internal-admin"));
    assert!(!legacy.is_excluded("/Application", "MyCustomApp"));
    assert!(legacy.excludes_folder("/Library"));
}
