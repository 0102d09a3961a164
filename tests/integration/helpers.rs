//! Shared test helpers for integration tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use serde_json::Value;
use tower::ServiceExt;

use arbor_api::state::ApiState;
use arbor_core::config::AppConfig;
use arbor_core::result::AppResult;
use arbor_graph::context::{ContextFactory, create_context_factory};
use arbor_graph::schema::{Schema, create_schema};
use arbor_graph::store::ContentStore;
use arbor_plugin::chain::{FilterContext, filter_fn};
use arbor_plugin::manager::PluginManager;
use arbor_plugin::plugin::{Plugin, PluginInfo};
use arbor_plugin::registry::FilterRegistry;
use arbor_plugin::tags::ExtensionPoint;
use plugin_readtime::ReadtimePlugin;

/// A plugin that attaches an extra route through the route extension
/// points, like the commented-out example in the original test harness.
#[derive(Debug)]
pub struct PingPlugin;

#[async_trait::async_trait]
impl Plugin for PingPlugin {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            id: "ping".to_string(),
            name: "Ping".to_string(),
            version: "0.0.1".to_string(),
            description: "adds a ping route".to_string(),
        }
    }

    async fn setup(&self, registry: &FilterRegistry, _cx: &FilterContext) -> AppResult<()> {
        registry
            .add_filter(
                ExtensionPoint::PostRegisterRoutes,
                filter_fn(|router: Router<ApiState>, _cx| async move {
                    Ok(router.route("/ping", get(|| async { "pong" })))
                }),
            )
            .await
    }
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// The decorated schema
    pub schema: Arc<Schema>,
    /// The per-request context factory
    pub contexts: ContextFactory,
    /// The sealed plugin manager
    pub manager: Arc<PluginManager>,
}

impl TestApp {
    /// Boot the full pipeline with the readtime and ping plugins.
    pub async fn new() -> Self {
        let mut config = AppConfig::default();
        config.server.devel = true;
        let config = Arc::new(config);

        let manager = Arc::new(PluginManager::new(config.clone()));
        manager
            .install(Arc::new(ReadtimePlugin::new()))
            .await
            .expect("Failed to install readtime plugin");
        manager
            .install(Arc::new(PingPlugin))
            .await
            .expect("Failed to install ping plugin");
        manager.seal();

        let schema = Arc::new(
            create_schema(manager.filters(), manager.context())
                .await
                .expect("Failed to build schema"),
        );

        let store = Arc::new(ContentStore::seeded());
        let contexts = create_context_factory(manager.filters(), manager.context(), store)
            .await
            .expect("Failed to compose context factory");

        let state = ApiState {
            config,
            schema: schema.clone(),
            contexts: contexts.clone(),
            plugins: manager.clone(),
        };
        let router = arbor_api::build_router(state)
            .await
            .expect("Failed to build router");

        Self {
            router,
            schema,
            contexts,
            manager,
        }
    }

    /// Send a request and return the status and JSON body.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = match body {
            Some(json) => Request::builder()
                .method(method)
                .uri(path)
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => Request::builder()
                .method(method)
                .uri(path)
                .body(Body::empty())
                .unwrap(),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    /// Resolve a Query field through the graph endpoint.
    pub async fn query(&self, field: &str, args: Value) -> (StatusCode, Value) {
        self.request(
            "POST",
            "/api/v1/graph/ql",
            Some(serde_json::json!({"field": field, "args": args})),
        )
        .await
    }
}
