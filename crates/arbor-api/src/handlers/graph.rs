//! The graph endpoint: resolves one query or mutation field per request
//! against the decorated schema.

use axum::Json;
use axum::extract::State;
use axum::response::Html;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use arbor_core::error::AppError;
use arbor_graph::namespace::RequestSeed;
use arbor_graph::source::FieldSource;

use crate::error::ApiError;
use crate::state::ApiState;

/// A graph resolution request: exactly one of `field` (a Query field) or
/// `mutation` (a Mutation field).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphRequest {
    /// Query field to resolve.
    pub field: Option<String>,
    /// Mutation field to resolve.
    pub mutation: Option<String>,
    /// Field arguments.
    #[serde(default)]
    pub args: Value,
    /// Interface type to variant-resolve the result against.
    pub variant_of: Option<String>,
}

/// A graph resolution response.
#[derive(Debug, Clone, Serialize)]
pub struct GraphResponse {
    /// The resolved value.
    pub data: Value,
    /// The concrete variant name, when `variantOf` was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

/// `POST /api/v1/graph/ql`
///
/// Builds the request context (loaders + mutators) for the lifespan of
/// this request, resolves the requested field, and optionally runs variant
/// resolution on the result.
pub async fn resolve(
    State(state): State<ApiState>,
    Json(request): Json<GraphRequest>,
) -> Result<Json<GraphResponse>, ApiError> {
    let ctx = state.contexts.context(RequestSeed::default());

    let (type_name, field_name) = match (&request.field, &request.mutation) {
        (Some(field), None) => ("Query", field.as_str()),
        (None, Some(field)) => ("Mutation", field.as_str()),
        _ => {
            return Err(AppError::validation(
                "provide exactly one of 'field' or 'mutation'",
            )
            .into());
        }
    };

    let data = state
        .schema
        .resolve_field(
            type_name,
            field_name,
            FieldSource::default(),
            request.args.clone(),
            ctx.clone(),
        )
        .await?;

    let variant = match &request.variant_of {
        None => None,
        Some(interface) => {
            state
                .schema
                .resolve_variant(interface, &FieldSource::Json(data.clone()), &ctx)
                .await?
        }
    };

    Ok(Json(GraphResponse { data, variant }))
}

/// `GET /api/v1/graph/iql` (development mode only)
///
/// A minimal interactive explorer for poking the graph endpoint.
pub async fn explorer() -> Html<&'static str> {
    Html(EXPLORER_PAGE)
}

const EXPLORER_PAGE: &str = r#"<!doctype html>
<html>
<head><title>Arbor Graph Explorer</title></head>
<body>
<h1>Arbor Graph Explorer</h1>
<textarea id="q" rows="6" cols="60">{"field": "posts"}</textarea><br>
<button onclick="run()">Run</button>
<pre id="out"></pre>
<script>
async function run() {
  const res = await fetch('/api/v1/graph/ql', {
    method: 'POST',
    headers: {'content-type': 'application/json'},
    body: document.getElementById('q').value,
  });
  document.getElementById('out').textContent =
    JSON.stringify(await res.json(), null, 2);
}
</script>
</body>
</html>
"#;
