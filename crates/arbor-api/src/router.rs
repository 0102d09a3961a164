//! Route assembly through the route extension points.
//!
//! Mirrors the boot order the rest of the pipeline relies on: the base
//! router flows through `pre_register_routes`, the core routes are
//! attached, the result flows through `post_register_routes`, and the
//! final application (layers applied, state bound) flows through
//! `register_app`.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use arbor_core::result::AppResult;
use arbor_plugin::tags::ExtensionPoint;

use crate::handlers;
use crate::state::ApiState;

/// Builds the complete Axum router.
///
/// Plugin route filters registered against the route extension points run
/// here, exactly once per process.
pub async fn build_router(state: ApiState) -> AppResult<Router> {
    let registry = state.plugins.filters().clone();
    let cx = state.plugins.context().clone();

    let base: Router<ApiState> = Router::new();
    let base = registry
        .do_filter(ExtensionPoint::PreRegisterRoutes, base, &cx)
        .await?;

    let router = base.merge(graph_routes(&state)).merge(system_routes());

    let router = registry
        .do_filter(ExtensionPoint::PostRegisterRoutes, router, &cx)
        .await?;

    let app = router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    registry
        .do_filter(ExtensionPoint::RegisterApp, app, &cx)
        .await
}

/// Graph endpoints; the explorer mounts in development mode only.
fn graph_routes(state: &ApiState) -> Router<ApiState> {
    let mut router = Router::new().route("/api/v1/graph/ql", post(handlers::graph::resolve));
    if state.config.server.devel {
        router = router.route("/api/v1/graph/iql", get(handlers::graph::explorer));
    }
    router
}

/// System endpoints: health and plugin listing.
fn system_routes() -> Router<ApiState> {
    Router::new()
        .route("/api/v1/system/health", get(handlers::system::health))
        .route("/api/v1/system/plugins", get(handlers::system::plugins))
}
