//! System endpoints: liveness and installed plugins.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use arbor_plugin::plugin::PluginInfo;

use crate::state::ApiState;

/// `GET /api/v1/system/health`
pub async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// `GET /api/v1/system/plugins`
pub async fn plugins(State(state): State<ApiState>) -> Json<Vec<PluginInfo>> {
    Json(state.plugins.list_plugins().await)
}
