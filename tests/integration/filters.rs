//! Integration tests for the filter registry lifecycle.

use crate::helpers::TestApp;

use arbor_plugin::chain::{FilterContext, filter_fn};
use arbor_plugin::tags::ExtensionPoint;

#[tokio::test]
async fn test_unknown_extension_point_name_fails_before_serving() {
    // Tag validation happens at the string boundary, long before any
    // request is handled.
    let err = "register_everything"
        .parse::<ExtensionPoint>()
        .unwrap_err();
    assert_eq!(err.kind, arbor_core::error::ErrorKind::Configuration);

    for name in [
        "register_app",
        "pre_register_routes",
        "post_register_routes",
        "register_resolvers",
        "register_typedefs",
        "register_schema",
        "register_loaders",
        "register_mutators",
    ] {
        assert!(name.parse::<ExtensionPoint>().is_ok(), "{name} must parse");
    }
}

#[tokio::test]
async fn test_booted_registry_is_sealed() {
    let app = TestApp::new().await;
    assert!(app.manager.filters().is_sealed());

    let err = app
        .manager
        .filters()
        .add_filter(
            ExtensionPoint::RegisterSchema,
            filter_fn(|schema: arbor_graph::schema::Schema, _cx| async move { Ok(schema) }),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, arbor_core::error::ErrorKind::Configuration);
}

#[tokio::test]
async fn test_unregistered_point_passes_value_through() {
    let app = TestApp::new().await;
    let cx = FilterContext::default();

    // Nothing registers against register_mutators in the test boot; the
    // input comes back unchanged.
    let factories: Vec<std::sync::Arc<dyn arbor_graph::namespace::NamespaceFactory>> = vec![];
    let out = app
        .manager
        .filters()
        .do_filter(ExtensionPoint::RegisterMutators, factories, &cx)
        .await
        .unwrap();
    assert!(out.is_empty());
}
