//! Ordered filter chains.
//!
//! A chain holds the filters registered against one extension point and
//! applies them as a strictly sequential left fold: filter *i+1* never
//! starts before filter *i*'s future settles, and receives its output.
//! The first failure aborts the fold and propagates to the caller.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use arbor_core::config::AppConfig;
use arbor_core::result::AppResult;

use crate::tags::ExtensionPoint;

/// Read-only boot context handed to every filter invocation.
///
/// Carries process-wide state a filter may consult while transforming a
/// value. The same context is passed unchanged to every filter in a chain.
#[derive(Clone)]
pub struct FilterContext {
    /// Application configuration.
    config: Arc<AppConfig>,
}

impl FilterContext {
    /// Creates a new filter context.
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self { config }
    }

    /// Returns the application configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl std::fmt::Debug for FilterContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterContext").finish()
    }
}

impl Default for FilterContext {
    fn default() -> Self {
        Self::new(Arc::new(AppConfig::default()))
    }
}

/// A transform registered against an extension point.
///
/// Filters consume the value produced by the previous filter in the chain
/// and return the value handed to the next one.
#[async_trait]
pub trait Filter<T>: Send + Sync
where
    T: Send + 'static,
{
    /// Transforms `value`, or fails and aborts the rest of the chain.
    async fn apply(&self, value: T, cx: &FilterContext) -> AppResult<T>;
}

/// A closure-based filter for quick registration.
struct ClosureFilter<T> {
    f: Box<dyn Fn(T, &FilterContext) -> BoxFuture<'static, AppResult<T>> + Send + Sync>,
}

#[async_trait]
impl<T> Filter<T> for ClosureFilter<T>
where
    T: Send + 'static,
{
    async fn apply(&self, value: T, cx: &FilterContext) -> AppResult<T> {
        (self.f)(value, cx).await
    }
}

/// Wraps an async closure into an `Arc<dyn Filter<T>>`.
///
/// The returned future must be `'static`: the closure receives the context
/// by reference and clones whatever it needs before going async.
pub fn filter_fn<T, F, Fut>(f: F) -> Arc<dyn Filter<T>>
where
    T: Send + 'static,
    F: Fn(T, &FilterContext) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = AppResult<T>> + Send + 'static,
{
    Arc::new(ClosureFilter {
        f: Box::new(move |value, cx| Box::pin(f(value, cx))),
    })
}

/// Ordered list of filters for one extension point.
pub struct FilterChain<T> {
    /// The extension point this chain belongs to.
    point: ExtensionPoint,
    /// Filters in registration order.
    filters: Vec<Arc<dyn Filter<T>>>,
}

impl<T> Clone for FilterChain<T> {
    fn clone(&self) -> Self {
        Self {
            point: self.point,
            filters: self.filters.clone(),
        }
    }
}

impl<T> FilterChain<T>
where
    T: Send + 'static,
{
    /// Creates an empty chain for an extension point.
    pub fn new(point: ExtensionPoint) -> Self {
        Self {
            point,
            filters: Vec::new(),
        }
    }

    /// Returns the extension point this chain belongs to.
    pub fn point(&self) -> ExtensionPoint {
        self.point
    }

    /// Appends a filter. Registration order is execution order.
    pub fn add_filter(&mut self, filter: Arc<dyn Filter<T>>) {
        self.filters.push(filter);
    }

    /// Returns the number of registered filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Returns whether the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Folds `value` through every filter in registration order.
    ///
    /// An empty chain is the identity. Each filter is awaited before the
    /// next one starts; the first failure aborts the fold.
    pub async fn apply_filters(&self, mut value: T, cx: &FilterContext) -> AppResult<T> {
        for filter in &self.filters {
            value = filter.apply(value, cx).await?;
        }
        Ok(value)
    }
}
