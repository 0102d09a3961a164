//! Reading-time plugin for Arbor.
//!
//! Demonstrates every extension mechanism the pipeline offers: it extends
//! the type declarations and resolver table, appends a loader namespace,
//! and decorates the built schema with pre/post hooks and a resolve-variant
//! chain hook.

pub mod hooks;
pub mod plugin;

pub use plugin::ReadtimePlugin;
