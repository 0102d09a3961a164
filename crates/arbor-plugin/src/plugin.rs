//! Plugin trait and registry.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use arbor_core::error::AppError;
use arbor_core::result::AppResult;

use crate::chain::FilterContext;
use crate::registry::FilterRegistry;

/// Metadata about an installed plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginInfo {
    /// Unique plugin identifier.
    pub id: String,
    /// Human-readable plugin name.
    pub name: String,
    /// Plugin version string.
    pub version: String,
    /// Plugin description.
    pub description: String,
}

/// Trait that all plugins must implement.
///
/// A plugin's only entry point is `setup`, where it registers filters
/// against the extension points it cares about. Setup runs exactly once,
/// during boot, before the registry is sealed.
#[async_trait::async_trait]
pub trait Plugin: Send + Sync {
    /// Returns plugin metadata.
    fn info(&self) -> PluginInfo;

    /// Registers the plugin's filters. Called once during boot.
    async fn setup(&self, registry: &FilterRegistry, cx: &FilterContext) -> AppResult<()>;
}

/// Registry of installed plugins, in installation order.
///
/// Installation order matters: it is the registration order of every filter
/// the plugins add, and therefore the execution order of each chain.
pub struct PluginRegistry {
    /// Installed plugins with their metadata, in order.
    plugins: RwLock<Vec<(PluginInfo, Arc<dyn Plugin>)>>,
}

impl PluginRegistry {
    /// Creates a new empty plugin registry.
    pub fn new() -> Self {
        Self {
            plugins: RwLock::new(Vec::new()),
        }
    }

    /// Records an installed plugin. Duplicate ids are a configuration error.
    pub async fn register(&self, plugin: Arc<dyn Plugin>) -> AppResult<()> {
        let info = plugin.info();

        let mut plugins = self.plugins.write().await;
        if plugins.iter().any(|(existing, _)| existing.id == info.id) {
            return Err(AppError::configuration(format!(
                "plugin '{}' is already installed",
                info.id
            )));
        }

        info!(plugin_id = %info.id, name = %info.name, version = %info.version, "Registering plugin");

        plugins.push((info, plugin));

        Ok(())
    }

    /// Lists installed plugin metadata in installation order.
    pub async fn list(&self) -> Vec<PluginInfo> {
        let plugins = self.plugins.read().await;
        plugins.iter().map(|(info, _)| info.clone()).collect()
    }

    /// Returns the number of installed plugins.
    pub async fn count(&self) -> usize {
        let plugins = self.plugins.read().await;
        plugins.len()
    }

    /// Checks whether a plugin is installed.
    pub async fn contains(&self, plugin_id: &str) -> bool {
        let plugins = self.plugins.read().await;
        plugins.iter().any(|(info, _)| info.id == plugin_id)
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry").finish()
    }
}
