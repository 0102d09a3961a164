//! Per-request namespaces and their composition from factory lists.
//!
//! A namespace is a two-level map of grouped operations (loaders or
//! mutators) exposed to field resolution logic. One factory per plugin plus
//! one for the core each produce a namespace from the request seed; the
//! results are shallow-merged in list order, later factories overwriting
//! overlapping `(group, operation)` entries.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;
use tokio::sync::OnceCell;

use arbor_core::result::AppResult;

/// One callable operation inside a namespace.
#[async_trait]
pub trait NamespaceOp: Send + Sync {
    /// Runs the operation with JSON arguments.
    async fn call(&self, args: Value) -> AppResult<Value>;
}

/// A closure-based operation for quick namespace construction.
struct ClosureOp {
    f: Box<dyn Fn(Value) -> BoxFuture<'static, AppResult<Value>> + Send + Sync>,
}

#[async_trait]
impl NamespaceOp for ClosureOp {
    async fn call(&self, args: Value) -> AppResult<Value> {
        (self.f)(args).await
    }
}

/// Wraps an async closure into an `Arc<dyn NamespaceOp>`.
pub fn op_fn<F, Fut>(f: F) -> Arc<dyn NamespaceOp>
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = AppResult<Value>> + Send + 'static,
{
    Arc::new(ClosureOp {
        f: Box::new(move |args| Box::pin(f(args))),
    })
}

/// An operation whose first result is computed once and shared for the rest
/// of the request.
///
/// Arguments are ignored after the first call, so this only makes sense for
/// zero-argument operations.
pub struct CachedOp {
    inner: Arc<dyn NamespaceOp>,
    cell: OnceCell<Value>,
}

impl CachedOp {
    /// Wraps an operation with per-request memoization.
    pub fn new(inner: Arc<dyn NamespaceOp>) -> Arc<dyn NamespaceOp> {
        Arc::new(Self {
            inner,
            cell: OnceCell::new(),
        })
    }
}

#[async_trait]
impl NamespaceOp for CachedOp {
    async fn call(&self, args: Value) -> AppResult<Value> {
        self.cell
            .get_or_try_init(|| self.inner.call(args))
            .await
            .cloned()
    }
}

/// Two-level mapping of grouped operations, built fresh per request.
#[derive(Clone, Default)]
pub struct Namespace {
    groups: HashMap<String, HashMap<String, Arc<dyn NamespaceOp>>>,
}

impl Namespace {
    /// Creates an empty namespace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an operation, overwriting any previous entry at
    /// `(group, name)`.
    pub fn insert(&mut self, group: &str, name: &str, op: Arc<dyn NamespaceOp>) {
        self.groups
            .entry(group.to_string())
            .or_default()
            .insert(name.to_string(), op);
    }

    /// Builder-style [`Namespace::insert`].
    pub fn with(mut self, group: &str, name: &str, op: Arc<dyn NamespaceOp>) -> Self {
        self.insert(group, name, op);
        self
    }

    /// Looks up an operation.
    pub fn get(&self, group: &str, name: &str) -> Option<Arc<dyn NamespaceOp>> {
        self.groups.get(group).and_then(|ops| ops.get(name)).cloned()
    }

    /// Shallow-merges `other` into this namespace; entries from `other`
    /// overwrite overlapping `(group, operation)` keys.
    pub fn merge(&mut self, other: Namespace) {
        for (group, ops) in other.groups {
            let target = self.groups.entry(group).or_default();
            for (name, op) in ops {
                target.insert(name, op);
            }
        }
    }

    /// Returns whether the namespace holds no operations.
    pub fn is_empty(&self) -> bool {
        self.groups.values().all(|ops| ops.is_empty())
    }
}

impl std::fmt::Debug for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut groups: Vec<(&String, usize)> =
            self.groups.iter().map(|(g, ops)| (g, ops.len())).collect();
        groups.sort();
        f.debug_struct("Namespace").field("groups", &groups).finish()
    }
}

/// Per-request identity handed to every namespace factory.
#[derive(Debug, Clone, Default)]
pub struct RequestSeed {
    /// The authenticated user, if any.
    pub user: Option<Value>,
}

/// Produces a namespace for one request.
///
/// Factories run synchronously: any I/O belongs inside the operations they
/// produce, not in the factory itself.
pub trait NamespaceFactory: Send + Sync {
    /// Builds this factory's namespace for the request.
    fn create(&self, seed: &RequestSeed) -> Namespace;
}

/// A closure-based namespace factory.
struct ClosureFactory {
    f: Box<dyn Fn(&RequestSeed) -> Namespace + Send + Sync>,
}

impl NamespaceFactory for ClosureFactory {
    fn create(&self, seed: &RequestSeed) -> Namespace {
        (self.f)(seed)
    }
}

/// Wraps a closure into an `Arc<dyn NamespaceFactory>`.
pub fn factory_fn<F>(f: F) -> Arc<dyn NamespaceFactory>
where
    F: Fn(&RequestSeed) -> Namespace + Send + Sync + 'static,
{
    Arc::new(ClosureFactory { f: Box::new(f) })
}

/// An ordered factory list, composed once at boot and invoked per request.
#[derive(Clone)]
pub struct ComposedFactory {
    factories: Vec<Arc<dyn NamespaceFactory>>,
}

impl ComposedFactory {
    /// Composes a factory list. List order is merge order: later factories
    /// overwrite overlapping entries from earlier ones.
    pub fn new(factories: Vec<Arc<dyn NamespaceFactory>>) -> Self {
        Self { factories }
    }

    /// Invokes every factory with the same seed and merges the results.
    pub fn create(&self, seed: &RequestSeed) -> Namespace {
        let mut namespace = Namespace::new();
        for factory in &self.factories {
            namespace.merge(factory.create(seed));
        }
        namespace
    }

    /// Returns the number of composed factories.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl std::fmt::Debug for ComposedFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComposedFactory")
            .field("factories", &self.factories.len())
            .finish()
    }
}
