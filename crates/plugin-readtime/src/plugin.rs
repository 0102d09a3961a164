//! Plugin wiring: filters registered against the extension points.

use serde_json::{Value, json};
use tracing::debug;

use arbor_core::result::AppResult;

use arbor_plugin::chain::{FilterContext, filter_fn};
use arbor_plugin::plugin::{Plugin, PluginInfo};
use arbor_plugin::registry::FilterRegistry;
use arbor_plugin::tags::ExtensionPoint;

use arbor_graph::hooks::decorate;
use arbor_graph::namespace::{Namespace, NamespaceFactory, factory_fn, op_fn};
use arbor_graph::schema::{ResolverMap, Schema, TypeDecl, resolver_fn};

use crate::hooks::hook_map;

/// Assumed reading speed, words per minute.
const WORDS_PER_MINUTE: usize = 200;

/// The reading-time plugin.
#[derive(Debug, Default)]
pub struct ReadtimePlugin;

impl ReadtimePlugin {
    /// Creates the plugin.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl Plugin for ReadtimePlugin {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            id: "readtime".to_string(),
            name: "Reading Time".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "Estimates reading time for posts and decorates post resolution"
                .to_string(),
        }
    }

    async fn setup(&self, registry: &FilterRegistry, _cx: &FilterContext) -> AppResult<()> {
        // Declare the Post.readtime field.
        registry
            .add_filter(
                ExtensionPoint::RegisterTypedefs,
                filter_fn(|mut decls: Vec<TypeDecl>, _cx| async move {
                    decls.push(TypeDecl::object("Post", &["readtime"]));
                    Ok(decls)
                }),
            )
            .await?;

        // Resolve it through the plugin's loader namespace.
        registry
            .add_filter(
                ExtensionPoint::RegisterResolvers,
                filter_fn(|resolvers: ResolverMap, _cx| async move {
                    Ok(resolvers.merge(readtime_resolvers()))
                }),
            )
            .await?;

        // Provide the namespace itself, per request.
        registry
            .add_filter(
                ExtensionPoint::RegisterLoaders,
                filter_fn(
                    |mut factories: Vec<std::sync::Arc<dyn NamespaceFactory>>, _cx| async move {
                        factories.push(readtime_loaders());
                        Ok(factories)
                    },
                ),
            )
            .await?;

        // Decorate the built schema with this plugin's hooks.
        registry
            .add_filter(
                ExtensionPoint::RegisterSchema,
                filter_fn(|schema: Schema, _cx| async move { decorate(&schema, &hook_map()) }),
            )
            .await?;

        debug!("readtime plugin filters registered");

        Ok(())
    }
}

/// Resolvers the plugin merges into the core table.
fn readtime_resolvers() -> ResolverMap {
    ResolverMap::new().field(
        "Post",
        "readtime",
        resolver_fn(|params| async move {
            let title = params
                .parent
                .as_json()
                .and_then(|v| v.get("title"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            params
                .ctx
                .loader("Readtime", "forTitle", json!({"title": title}))
                .await
        }),
    )
}

/// The per-request loader namespace the plugin contributes.
fn readtime_loaders() -> std::sync::Arc<dyn NamespaceFactory> {
    factory_fn(|_seed| {
        Namespace::new().with(
            "Readtime",
            "forTitle",
            op_fn(|args| async move {
                let words = args
                    .get("title")
                    .and_then(Value::as_str)
                    .map(|t| t.split_whitespace().count())
                    .unwrap_or(0);
                let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
                Ok(json!({"words": words, "minutes": minutes}))
            }),
        )
    })
}
