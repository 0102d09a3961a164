//! Request context: the per-request view of the composed loader and
//! mutator namespaces.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use arbor_core::error::AppError;
use arbor_core::result::AppResult;

use arbor_plugin::chain::FilterContext;
use arbor_plugin::registry::FilterRegistry;
use arbor_plugin::tags::ExtensionPoint;

use crate::loaders;
use crate::mutators;
use crate::namespace::{ComposedFactory, Namespace, NamespaceFactory, RequestSeed};
use crate::store::ContentStore;

struct ContextInner {
    user: Option<Value>,
    loaders: Namespace,
    mutators: Namespace,
}

/// Request-scoped context handed to every resolver and hook.
///
/// Created fresh for each incoming request and discarded with it; never
/// retained across requests. Cloning is cheap (shared innards).
#[derive(Clone)]
pub struct RequestContext {
    inner: Arc<ContextInner>,
}

impl RequestContext {
    /// Creates a context with empty namespaces. Useful for tests and for
    /// resolution outside a request.
    pub fn empty() -> Self {
        Self {
            inner: Arc::new(ContextInner {
                user: None,
                loaders: Namespace::new(),
                mutators: Namespace::new(),
            }),
        }
    }

    /// The authenticated user, if any.
    pub fn user(&self) -> Option<&Value> {
        self.inner.user.as_ref()
    }

    /// The request's loader namespace.
    pub fn loaders(&self) -> &Namespace {
        &self.inner.loaders
    }

    /// The request's mutator namespace.
    pub fn mutators(&self) -> &Namespace {
        &self.inner.mutators
    }

    /// Calls a loader operation, failing if it is not present.
    pub async fn loader(&self, group: &str, name: &str, args: Value) -> AppResult<Value> {
        let op = self.inner.loaders.get(group, name).ok_or_else(|| {
            AppError::not_found(format!("no loader registered at {group}.{name}"))
        })?;
        op.call(args).await
    }

    /// Calls a mutator operation, failing if it is not present.
    pub async fn mutator(&self, group: &str, name: &str, args: Value) -> AppResult<Value> {
        let op = self.inner.mutators.get(group, name).ok_or_else(|| {
            AppError::not_found(format!("no mutator registered at {group}.{name}"))
        })?;
        op.call(args).await
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("user", &self.inner.user.is_some())
            .finish()
    }
}

/// Builds a [`RequestContext`] per request from the boot-composed loader and
/// mutator factory lists.
#[derive(Clone, Debug)]
pub struct ContextFactory {
    loaders: ComposedFactory,
    mutators: ComposedFactory,
}

impl ContextFactory {
    /// Composes the factory lists directly. Most callers want
    /// [`create_context_factory`], which runs the core lists through the
    /// loader/mutator extension points first.
    pub fn new(loaders: ComposedFactory, mutators: ComposedFactory) -> Self {
        Self { loaders, mutators }
    }

    /// Creates the context for one request.
    pub fn context(&self, seed: RequestSeed) -> RequestContext {
        let loaders = self.loaders.create(&seed);
        let mutators = self.mutators.create(&seed);
        RequestContext {
            inner: Arc::new(ContextInner {
                user: seed.user,
                loaders,
                mutators,
            }),
        }
    }
}

/// Builds the per-request context factory.
///
/// The core loader and mutator factory lists pass through their extension
/// points exactly once, here, so plugins can append their own factories;
/// the composed lists are then fixed for the process lifetime.
pub async fn create_context_factory(
    registry: &FilterRegistry,
    cx: &FilterContext,
    store: Arc<ContentStore>,
) -> AppResult<ContextFactory> {
    let core_loaders: Vec<Arc<dyn NamespaceFactory>> = vec![loaders::core_loaders(store.clone())];
    let core_mutators: Vec<Arc<dyn NamespaceFactory>> = vec![mutators::core_mutators(store)];

    let loaders = registry
        .do_filter(ExtensionPoint::RegisterLoaders, core_loaders, cx)
        .await?;
    let mutators = registry
        .do_filter(ExtensionPoint::RegisterMutators, core_mutators, cx)
        .await?;

    debug!(
        loader_factories = loaders.len(),
        mutator_factories = mutators.len(),
        "Context factory composed"
    );

    Ok(ContextFactory::new(
        ComposedFactory::new(loaders),
        ComposedFactory::new(mutators),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::{factory_fn, op_fn};
    use serde_json::json;

    #[tokio::test]
    async fn test_missing_loader_is_not_found() {
        let ctx = RequestContext::empty();
        let err = ctx.loader("Posts", "list", Value::Null).await.unwrap_err();
        assert_eq!(err.kind, arbor_core::error::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_context_factory_builds_fresh_namespaces() {
        let factory = ContextFactory::new(
            ComposedFactory::new(vec![factory_fn(|_| {
                Namespace::new().with("Posts", "list", op_fn(|_| async { Ok(json!([1, 2])) }))
            })]),
            ComposedFactory::new(vec![]),
        );

        let ctx = factory.context(RequestSeed::default());
        assert_eq!(
            ctx.loader("Posts", "list", Value::Null).await.unwrap(),
            json!([1, 2])
        );
        assert!(ctx.mutators().is_empty());
    }

    #[tokio::test]
    async fn test_plugin_factory_appends_through_extension_point() {
        let registry = FilterRegistry::new();
        let cx = FilterContext::default();
        registry
            .add_filter(
                ExtensionPoint::RegisterLoaders,
                arbor_plugin::chain::filter_fn(
                    |mut factories: Vec<Arc<dyn NamespaceFactory>>, _cx| async move {
                        factories.push(factory_fn(|_| {
                            Namespace::new().with(
                                "Extra",
                                "ping",
                                op_fn(|_| async { Ok(json!("pong")) }),
                            )
                        }));
                        Ok(factories)
                    },
                ),
            )
            .await
            .unwrap();

        let store = Arc::new(ContentStore::seeded());
        let factory = create_context_factory(&registry, &cx, store).await.unwrap();
        let ctx = factory.context(RequestSeed::default());

        // Core loaders and the plugin's addition are both present.
        assert!(ctx.loaders().get("Posts", "list").is_some());
        assert_eq!(
            ctx.loader("Extra", "ping", Value::Null).await.unwrap(),
            json!("pong")
        );
    }
}
