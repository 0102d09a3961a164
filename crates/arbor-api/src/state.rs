//! Application state shared across all handlers.

use std::sync::Arc;

use arbor_core::config::AppConfig;
use arbor_graph::context::ContextFactory;
use arbor_graph::schema::Schema;
use arbor_plugin::manager::PluginManager;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<ApiState>`. All fields are
/// cheaply cloneable; the schema and plugin manager are read-only after
/// boot.
#[derive(Clone)]
pub struct ApiState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// The decorated schema graph.
    pub schema: Arc<Schema>,
    /// Builds a fresh request context per request.
    pub contexts: ContextFactory,
    /// The sealed plugin manager.
    pub plugins: Arc<PluginManager>,
}

impl std::fmt::Debug for ApiState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiState")
            .field("schema", &self.schema)
            .finish()
    }
}
