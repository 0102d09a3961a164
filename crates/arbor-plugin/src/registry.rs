//! Filter registry — one chain per extension point, with an explicit
//! registration → serving lifecycle.
//!
//! Chains are heterogeneously typed: each extension point transforms its own
//! value type (a router, a schema, a factory list). The registry stores each
//! chain type-erased and recovers the concrete type at the call site; asking
//! for a chain under the wrong type is a configuration error.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;
use tracing::debug;

use arbor_core::error::AppError;
use arbor_core::result::AppResult;

use crate::chain::{Filter, FilterChain, FilterContext};
use crate::tags::ExtensionPoint;

/// One registered chain, with its length mirrored outside the erased box so
/// counting does not require the chain's value type.
struct ChainSlot {
    /// The type-erased `FilterChain<T>`.
    chain: Box<dyn Any + Send + Sync>,
    /// Number of filters in the chain.
    len: usize,
}

/// Registry of filter chains keyed by extension point.
///
/// Two-phase lifecycle: mutable while the process boots and plugins
/// register, frozen once [`FilterRegistry::seal`] is called. Registration
/// against a sealed registry is a configuration error.
pub struct FilterRegistry {
    /// Extension point → registered chain.
    chains: RwLock<HashMap<ExtensionPoint, ChainSlot>>,
    /// Whether the registry has entered the read-only serving phase.
    sealed: AtomicBool,
}

impl FilterRegistry {
    /// Creates a new empty registry in the registration phase.
    pub fn new() -> Self {
        Self {
            chains: RwLock::new(HashMap::new()),
            sealed: AtomicBool::new(false),
        }
    }

    /// Appends a filter to the chain for `point`, creating the chain on
    /// first use.
    ///
    /// Fails if the registry is sealed, or if the chain for `point` was
    /// created with a different value type.
    pub async fn add_filter<T>(
        &self,
        point: ExtensionPoint,
        filter: Arc<dyn Filter<T>>,
    ) -> AppResult<()>
    where
        T: Send + 'static,
    {
        if self.is_sealed() {
            return Err(AppError::configuration(format!(
                "cannot register a filter for '{point}': the registry is sealed"
            )));
        }

        let mut chains = self.chains.write().await;
        let slot = chains.entry(point).or_insert_with(|| ChainSlot {
            chain: Box::new(FilterChain::<T>::new(point)),
            len: 0,
        });

        let chain = slot
            .chain
            .downcast_mut::<FilterChain<T>>()
            .ok_or_else(|| chain_type_mismatch(point))?;
        chain.add_filter(filter);
        slot.len = chain.len();

        debug!(point = %point, filters = slot.len, "Filter registered");

        Ok(())
    }

    /// Folds `value` through the chain registered for `point`.
    ///
    /// No chain means no filter was ever registered for the point: the
    /// input is returned unchanged. This is normal, not an error. A chain
    /// registered under a different value type is a configuration error.
    pub async fn do_filter<T>(
        &self,
        point: ExtensionPoint,
        value: T,
        cx: &FilterContext,
    ) -> AppResult<T>
    where
        T: Send + 'static,
    {
        // Clone the chain out so the lock is not held across filter awaits.
        let chain = {
            let chains = self.chains.read().await;
            match chains.get(&point) {
                None => return Ok(value),
                Some(slot) => slot
                    .chain
                    .downcast_ref::<FilterChain<T>>()
                    .ok_or_else(|| chain_type_mismatch(point))?
                    .clone(),
            }
        };

        chain.apply_filters(value, cx).await
    }

    /// Returns the number of filters registered for `point`.
    pub async fn filter_count(&self, point: ExtensionPoint) -> usize {
        let chains = self.chains.read().await;
        chains.get(&point).map(|slot| slot.len).unwrap_or(0)
    }

    /// Returns whether any filter is registered for `point`.
    pub async fn has_filters(&self, point: ExtensionPoint) -> bool {
        self.filter_count(point).await > 0
    }

    /// Transitions the registry into the read-only serving phase.
    pub fn seal(&self) {
        self.sealed.store(true, Ordering::SeqCst);
    }

    /// Returns whether the registry has been sealed.
    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::SeqCst)
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("sealed", &self.is_sealed())
            .finish()
    }
}

fn chain_type_mismatch(point: ExtensionPoint) -> AppError {
    AppError::configuration(format!(
        "extension point '{point}' holds a chain of a different value type"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::filter_fn;

    #[tokio::test]
    async fn test_do_filter_without_chain_passes_through() {
        let registry = FilterRegistry::new();
        let cx = FilterContext::default();
        assert!(!registry.has_filters(ExtensionPoint::RegisterSchema).await);
        let out = registry
            .do_filter(ExtensionPoint::RegisterSchema, 7i32, &cx)
            .await
            .unwrap();
        assert_eq!(out, 7);
    }

    #[tokio::test]
    async fn test_filters_fold_in_registration_order() {
        let registry = FilterRegistry::new();
        let cx = FilterContext::default();
        registry
            .add_filter(
                ExtensionPoint::RegisterTypedefs,
                filter_fn(|v: String, _cx| async move { Ok(v + "x") }),
            )
            .await
            .unwrap();
        registry
            .add_filter(
                ExtensionPoint::RegisterTypedefs,
                filter_fn(|v: String, _cx| async move { Ok(v + "y") }),
            )
            .await
            .unwrap();

        assert_eq!(
            registry.filter_count(ExtensionPoint::RegisterTypedefs).await,
            2
        );

        let out = registry
            .do_filter(ExtensionPoint::RegisterTypedefs, String::new(), &cx)
            .await
            .unwrap();
        assert_eq!(out, "xy");
    }

    #[tokio::test]
    async fn test_sealed_registry_rejects_registration() {
        let registry = FilterRegistry::new();
        registry.seal();
        let err = registry
            .add_filter(
                ExtensionPoint::RegisterApp,
                filter_fn(|v: i32, _cx| async move { Ok(v) }),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, arbor_core::error::ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_type_mismatch_is_a_configuration_error() {
        let registry = FilterRegistry::new();
        let cx = FilterContext::default();
        registry
            .add_filter(
                ExtensionPoint::RegisterApp,
                filter_fn(|v: i32, _cx| async move { Ok(v) }),
            )
            .await
            .unwrap();

        let err = registry
            .do_filter(ExtensionPoint::RegisterApp, String::from("oops"), &cx)
            .await
            .unwrap_err();
        assert_eq!(err.kind, arbor_core::error::ErrorKind::Configuration);
    }
}
