//! # arbor-graph
//!
//! The schema layer of Arbor. Provides:
//!
//! - An immutable field-resolution table (the schema graph)
//! - Field-hook decoration: pre/post hooks wrapped around field resolvers,
//!   with a fallback chain for resolve-variant ambiguity
//! - Per-request namespaces (loaders and mutators) composed from core and
//!   plugin factories
//! - The core publishing-domain content the demo server exposes

pub mod context;
pub mod hooks;
pub mod loaders;
pub mod mutators;
pub mod namespace;
pub mod resolvers;
pub mod schema;
pub mod source;
pub mod store;
pub mod typedefs;
mod util;

pub use context::{ContextFactory, RequestContext, create_context_factory};
pub use hooks::{FieldName, FieldRef, HookMap, PostHook, decorate};
pub use namespace::{Namespace, NamespaceOp, RequestSeed};
pub use schema::{ResolveInfo, ResolveParams, Schema, create_schema};
pub use source::FieldSource;
pub use store::ContentStore;
