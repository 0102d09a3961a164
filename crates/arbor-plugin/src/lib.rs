//! # arbor-plugin
//!
//! Plugin framework for Arbor. Provides:
//!
//! - The closed set of extension points plugins may attach to
//! - Ordered filter chains that transform a value at an extension point
//! - A filter registry with an explicit registration → serving lifecycle
//! - Plugin trait, registry, and manager

pub mod chain;
pub mod manager;
pub mod plugin;
pub mod registry;
pub mod tags;

pub use chain::{Filter, FilterChain, FilterContext, filter_fn};
pub use manager::PluginManager;
pub use plugin::{Plugin, PluginInfo, PluginRegistry};
pub use registry::FilterRegistry;
pub use tags::ExtensionPoint;
