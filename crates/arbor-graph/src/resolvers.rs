//! Core field resolvers for the demo publishing domain.
//!
//! Resolvers never touch the store directly: everything goes through the
//! request context's loader and mutator namespaces, so plugin-supplied
//! operations are interchangeable with core ones.

use chrono::Utc;
use serde_json::{Value, json};

use crate::schema::{ResolverMap, resolver_fn, variant_resolver_fn};
use crate::util::arg_i64;

/// Builds the core resolver map.
///
/// Plugins merge their own resolvers in via the `register_resolvers`
/// extension point; later entries overwrite these.
pub fn core_resolvers() -> ResolverMap {
    ResolverMap::new()
        .field(
            "Query",
            "date",
            resolver_fn(|_params| async { Ok(json!(Utc::now().to_rfc3339())) }),
        )
        .field(
            "Query",
            "posts",
            resolver_fn(|params| async move { params.ctx.loader("Posts", "list", Value::Null).await }),
        )
        .field(
            "Query",
            "author",
            resolver_fn(|params| async move {
                params.ctx.loader("Authors", "get", params.args.clone()).await
            }),
        )
        .field(
            "Query",
            "content",
            resolver_fn(|params| async move {
                // The most recent piece of content; typed as the Content
                // interface, so callers variant-resolve the result.
                let posts = params.ctx.loader("Posts", "list", Value::Null).await?;
                let latest = posts
                    .as_array()
                    .and_then(|list| list.last())
                    .cloned()
                    .unwrap_or(Value::Null);
                Ok(latest)
            }),
        )
        .field(
            "Post",
            "author",
            resolver_fn(|params| async move {
                let author_id = parent_i64(&params, "authorId")?;
                params
                    .ctx
                    .loader("Authors", "get", json!({"id": author_id}))
                    .await
            }),
        )
        .field(
            "Author",
            "posts",
            resolver_fn(|params| async move {
                let author_id = parent_i64(&params, "id")?;
                params
                    .ctx
                    .loader("Posts", "getByAuthor", json!({"authorId": author_id}))
                    .await
            }),
        )
        .field(
            "Mutation",
            "upvotePost",
            resolver_fn(|params| async move {
                params.ctx.mutator("Posts", "upvote", params.args.clone()).await
            }),
        )
        .variant(
            "Content",
            variant_resolver_fn(|value, _ctx, _info| {
                // Posts are the only core content; anything else is left
                // for plugins or the default variant.
                let is_post = value
                    .as_json()
                    .map(|v| v.get("votes").is_some())
                    .unwrap_or(false);
                async move { Ok(is_post.then(|| "Post".to_string())) }
            }),
        )
}

fn parent_i64(params: &crate::schema::ResolveParams, key: &str) -> arbor_core::AppResult<i64> {
    let parent = params
        .parent
        .as_json()
        .cloned()
        .unwrap_or(Value::Null);
    arg_i64(&parent, key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::create_context_factory;
    use crate::namespace::RequestSeed;
    use crate::schema::Schema;
    use crate::source::FieldSource;
    use crate::store::ContentStore;
    use crate::typedefs::core_typedefs;
    use arbor_plugin::chain::FilterContext;
    use arbor_plugin::registry::FilterRegistry;
    use std::sync::Arc;

    async fn core_setup() -> (Schema, crate::context::RequestContext) {
        let schema = Schema::builder()
            .decls(core_typedefs())
            .resolvers(core_resolvers())
            .build()
            .unwrap();

        let registry = FilterRegistry::new();
        let cx = FilterContext::default();
        let factory = create_context_factory(&registry, &cx, Arc::new(ContentStore::seeded()))
            .await
            .unwrap();
        (schema, factory.context(RequestSeed::default()))
    }

    #[tokio::test]
    async fn test_query_posts_and_post_author() {
        let (schema, ctx) = core_setup().await;

        let posts = schema
            .resolve_field(
                "Query",
                "posts",
                FieldSource::default(),
                Value::Null,
                ctx.clone(),
            )
            .await
            .unwrap();
        assert_eq!(posts.as_array().unwrap().len(), 4);

        let first = FieldSource::Json(posts.as_array().unwrap()[0].clone());
        let author = schema
            .resolve_field("Post", "author", first, Value::Null, ctx)
            .await
            .unwrap();
        assert_eq!(author["firstName"], json!("Tom"));
    }

    #[tokio::test]
    async fn test_mutation_upvote() {
        let (schema, ctx) = core_setup().await;
        let post = schema
            .resolve_field(
                "Mutation",
                "upvotePost",
                FieldSource::default(),
                json!({"postId": 4}),
                ctx,
            )
            .await
            .unwrap();
        assert_eq!(post["votes"], json!(8));
    }

    #[tokio::test]
    async fn test_content_variant_recognizes_posts() {
        let (schema, ctx) = core_setup().await;
        let variant = schema
            .resolve_variant(
                "Content",
                &FieldSource::json(json!({"id": 1, "votes": 2})),
                &ctx,
            )
            .await
            .unwrap();
        assert_eq!(variant, Some("Post".to_string()));

        let unknown = schema
            .resolve_variant("Content", &FieldSource::json(json!({"id": 1})), &ctx)
            .await
            .unwrap();
        assert_eq!(unknown, None);
    }

    #[tokio::test]
    async fn test_default_resolution_covers_plain_fields() {
        let (schema, ctx) = core_setup().await;
        // Post.votes has no resolver: default resolution reads the parent.
        let votes = schema
            .resolve_field(
                "Post",
                "votes",
                FieldSource::json(json!({"id": 1, "votes": 2})),
                Value::Null,
                ctx,
            )
            .await
            .unwrap();
        assert_eq!(votes, json!(2));
    }
}
