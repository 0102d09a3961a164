//! Core mutator namespace factory.
//!
//! Mutators are the write side of the per-request namespace. Plugins append
//! their own factories via the `register_mutators` extension point.

use std::sync::Arc;

use serde_json::json;

use arbor_core::error::AppError;

use crate::namespace::{Namespace, NamespaceFactory, factory_fn, op_fn};
use crate::store::ContentStore;
use crate::util::arg_i64;

/// Builds the core mutator factory over the content store.
pub fn core_mutators(store: Arc<ContentStore>) -> Arc<dyn NamespaceFactory> {
    factory_fn(move |_seed| {
        let mut namespace = Namespace::new();

        let posts = store.clone();
        namespace.insert(
            "Posts",
            "upvote",
            op_fn(move |args| {
                let store = posts.clone();
                async move {
                    let id = arg_i64(&args, "postId")?;
                    let post = store.upvote_post(id).ok_or_else(|| {
                        AppError::not_found(format!("couldn't find post with id {id}"))
                    })?;
                    Ok(json!(post))
                }
            }),
        );

        namespace
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::RequestSeed;
    use serde_json::Value;

    #[tokio::test]
    async fn test_upvote_returns_updated_post() {
        let store = Arc::new(ContentStore::seeded());
        let factory = core_mutators(store.clone());
        let namespace = factory.create(&RequestSeed::default());

        let op = namespace.get("Posts", "upvote").unwrap();
        let post = op.call(json!({"postId": 1})).await.unwrap();
        assert_eq!(post["votes"], json!(3));
        assert_eq!(store.get_post(1).unwrap().votes, 3);
    }

    #[tokio::test]
    async fn test_upvote_missing_post_fails() {
        let factory = core_mutators(Arc::new(ContentStore::seeded()));
        let namespace = factory.create(&RequestSeed::default());

        let op = namespace.get("Posts", "upvote").unwrap();
        let err = op.call(json!({"postId": 42})).await.unwrap_err();
        assert_eq!(err.kind, arbor_core::error::ErrorKind::NotFound);

        let err = op.call(Value::Null).await.unwrap_err();
        assert_eq!(err.kind, arbor_core::error::ErrorKind::Validation);
    }
}
