//! Plugin manager — boot-time installation and the phase transition into
//! serving.

use std::sync::Arc;

use tracing::info;

use arbor_core::config::AppConfig;
use arbor_core::error::AppError;
use arbor_core::result::AppResult;

use crate::chain::FilterContext;
use crate::plugin::{Plugin, PluginInfo, PluginRegistry};
use crate::registry::FilterRegistry;

/// Owns the filter registry and the set of installed plugins.
///
/// Boot installs the core registrations and every plugin, then calls
/// [`PluginManager::seal`]; from that moment the filter chains are shared,
/// read-only, across all requests.
pub struct PluginManager {
    /// Filter registry.
    filters: Arc<FilterRegistry>,
    /// Plugin registry.
    plugins: PluginRegistry,
    /// Boot context handed to plugin setup and every filter invocation.
    cx: FilterContext,
}

impl PluginManager {
    /// Creates a new plugin manager.
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            filters: Arc::new(FilterRegistry::new()),
            plugins: PluginRegistry::new(),
            cx: FilterContext::new(config),
        }
    }

    /// Installs a plugin: runs its setup, then records it.
    ///
    /// Installation order is filter registration order. Installing after
    /// the manager is sealed is a configuration error.
    pub async fn install(&self, plugin: Arc<dyn Plugin>) -> AppResult<()> {
        let info = plugin.info();

        if self.filters.is_sealed() {
            return Err(AppError::configuration(format!(
                "cannot install plugin '{}': the registry is sealed",
                info.id
            )));
        }

        plugin.setup(&self.filters, &self.cx).await.map_err(|e| {
            AppError::plugin(format!("plugin '{}' setup failed: {e}", info.id))
        })?;

        self.plugins.register(plugin).await?;

        info!(
            plugin_id = %info.id,
            name = %info.name,
            version = %info.version,
            "Plugin installed"
        );

        Ok(())
    }

    /// Seals the filter registry: no filter or plugin may be added after
    /// this point.
    pub fn seal(&self) {
        self.filters.seal();
        info!("Filter registry sealed; serving phase begins");
    }

    /// Returns the filter registry.
    pub fn filters(&self) -> &Arc<FilterRegistry> {
        &self.filters
    }

    /// Returns the boot filter context.
    pub fn context(&self) -> &FilterContext {
        &self.cx
    }

    /// Lists installed plugin metadata.
    pub async fn list_plugins(&self) -> Vec<PluginInfo> {
        self.plugins.list().await
    }
}

impl std::fmt::Debug for PluginManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginManager")
            .field("sealed", &self.filters.is_sealed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::filter_fn;
    use crate::tags::ExtensionPoint;

    #[derive(Debug)]
    struct SuffixPlugin;

    #[async_trait::async_trait]
    impl Plugin for SuffixPlugin {
        fn info(&self) -> PluginInfo {
            PluginInfo {
                id: "suffix".to_string(),
                name: "Suffix".to_string(),
                version: "0.1.0".to_string(),
                description: "appends a suffix".to_string(),
            }
        }

        async fn setup(&self, registry: &FilterRegistry, _cx: &FilterContext) -> AppResult<()> {
            registry
                .add_filter(
                    ExtensionPoint::RegisterTypedefs,
                    filter_fn(|v: String, _cx| async move { Ok(v + "+plugin") }),
                )
                .await
        }
    }

    #[tokio::test]
    async fn test_install_registers_filters_then_seal_freezes() {
        let manager = PluginManager::new(Arc::new(AppConfig::default()));
        manager.install(Arc::new(SuffixPlugin)).await.unwrap();

        let out = manager
            .filters()
            .do_filter(
                ExtensionPoint::RegisterTypedefs,
                String::from("core"),
                manager.context(),
            )
            .await
            .unwrap();
        assert_eq!(out, "core+plugin");

        manager.seal();
        let err = manager.install(Arc::new(SuffixPlugin)).await.unwrap_err();
        assert_eq!(err.kind, arbor_core::error::ErrorKind::Configuration);
    }
}
