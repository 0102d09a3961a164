//! The hook specification this plugin decorates the schema with.

use serde_json::Value;

use arbor_core::error::AppError;

use arbor_graph::hooks::{HookMap, effect_fn, rewrite_fn, variant_fn};

/// Builds the plugin's hook map.
///
/// - `Post.title` gets a result-replacing post hook marking decorated
///   titles.
/// - `Query.author` gets a pre hook rejecting non-positive author ids
///   before the base resolver runs.
/// - The `Content` interface gets a resolve-variant chain hook recognizing
///   titled values the core resolver could not classify.
pub fn hook_map() -> HookMap {
    HookMap::new()
        .replace(
            "Post",
            "title",
            rewrite_fn(|_params, result| async move {
                let title = result.as_str().unwrap_or_default().to_string();
                Ok(Value::String(format!("{title}!")))
            }),
        )
        .pre(
            "Query",
            "author",
            effect_fn(|params| {
                let id = params.args.get("id").and_then(Value::as_i64);
                async move {
                    match id {
                        Some(id) if id >= 1 => Ok(()),
                        _ => Err(AppError::validation(
                            "author id must be a positive integer",
                        )),
                    }
                }
            }),
        )
        .resolve_variant(
            "Content",
            vec![variant_fn(|value, _ctx, _info| {
                let titled = value
                    .as_json()
                    .map(|v| v.get("title").is_some())
                    .unwrap_or(false);
                async move { Ok(titled.then(|| "Post".to_string())) }
            })],
        )
}
