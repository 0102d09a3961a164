//! Core loader namespace factory.
//!
//! Loaders are the read side of the per-request namespace: grouped lookup
//! operations resolvers call through the request context. Plugins append
//! their own factories via the `register_loaders` extension point.

use std::sync::Arc;

use serde_json::{Value, json};

use crate::namespace::{CachedOp, Namespace, NamespaceFactory, factory_fn, op_fn};
use crate::store::ContentStore;
use crate::util::arg_i64;

/// Builds the core loader factory over the content store.
///
/// Lookup misses resolve to null; strictness belongs to mutators.
pub fn core_loaders(store: Arc<ContentStore>) -> Arc<dyn NamespaceFactory> {
    factory_fn(move |_seed| {
        let mut namespace = Namespace::new();

        // The full listing is memoized for the lifespan of the request.
        let posts = store.clone();
        namespace.insert(
            "Posts",
            "list",
            CachedOp::new(op_fn(move |_args| {
                let store = posts.clone();
                async move { Ok(json!(store.list_posts())) }
            })),
        );

        let posts = store.clone();
        namespace.insert(
            "Posts",
            "get",
            op_fn(move |args| {
                let store = posts.clone();
                async move {
                    let id = arg_i64(&args, "id")?;
                    Ok(optional(store.get_post(id).map(|p| json!(p))))
                }
            }),
        );

        let posts = store.clone();
        namespace.insert(
            "Posts",
            "getByAuthor",
            op_fn(move |args| {
                let store = posts.clone();
                async move {
                    let author_id = arg_i64(&args, "authorId")?;
                    Ok(json!(store.posts_by_author(author_id)))
                }
            }),
        );

        let authors = store.clone();
        namespace.insert(
            "Authors",
            "get",
            op_fn(move |args| {
                let store = authors.clone();
                async move {
                    let id = arg_i64(&args, "id")?;
                    Ok(optional(store.get_author(id).map(|a| json!(a))))
                }
            }),
        );

        namespace
    })
}

fn optional(value: Option<Value>) -> Value {
    value.unwrap_or(Value::Null)
}
