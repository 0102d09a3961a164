//! Field hooks and schema decoration.
//!
//! A hook map pairs `(type, field)` descriptors with optional pre and post
//! hooks. Decoration walks the schema's type map and, where an entry
//! matches, replaces the field's resolver with a wrapper running
//! pre → base resolution → post. Interface types carry a reserved
//! pseudo-field whose post hooks form a fallback chain for variant
//! resolution; pre hooks are not supported there and their presence is a
//! hard configuration error.
//!
//! Decoration never mutates the input schema: it produces a new table, so
//! applying it again wraps whatever resolver the previous application
//! installed. Decorator applications compose in filter-chain order.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;
use tracing::debug;

use arbor_core::error::AppError;
use arbor_core::result::AppResult;

use crate::context::RequestContext;
use crate::schema::{
    FieldDef, FieldResolver, ResolveInfo, ResolveParams, Schema, TypeDef, VariantResolver,
};
use crate::source::{FieldSource, default_resolve};

/// Display name of the reserved resolve-variant pseudo-field.
pub const RESOLVE_VARIANT_FIELD: &str = "__resolve_variant";

/// A hook run for its side effects only; its success or failure is what
/// matters. Used for pre hooks and observe-only post hooks.
#[async_trait]
pub trait EffectHook: Send + Sync {
    /// Runs the hook.
    async fn run(&self, params: &ResolveParams) -> AppResult<()>;
}

/// A post hook that replaces the field result with its return value.
#[async_trait]
pub trait RewriteHook: Send + Sync {
    /// Transforms the resolved value.
    async fn run(&self, params: &ResolveParams, result: Value) -> AppResult<Value>;
}

/// A resolve-variant chain hook. `None` means "no answer"; the chain moves
/// on to the next hook.
#[async_trait]
pub trait VariantHook: Send + Sync {
    /// Names the concrete variant of `value`, if this hook can tell.
    async fn run(
        &self,
        value: &FieldSource,
        ctx: &RequestContext,
        info: &ResolveInfo,
    ) -> AppResult<Option<String>>;
}

struct ClosureEffect {
    f: Box<dyn Fn(&ResolveParams) -> BoxFuture<'static, AppResult<()>> + Send + Sync>,
}

#[async_trait]
impl EffectHook for ClosureEffect {
    async fn run(&self, params: &ResolveParams) -> AppResult<()> {
        (self.f)(params).await
    }
}

/// Wraps an async closure into an `Arc<dyn EffectHook>`.
pub fn effect_fn<F, Fut>(f: F) -> Arc<dyn EffectHook>
where
    F: Fn(&ResolveParams) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = AppResult<()>> + Send + 'static,
{
    Arc::new(ClosureEffect {
        f: Box::new(move |params| Box::pin(f(params))),
    })
}

struct ClosureRewrite {
    f: Box<dyn Fn(&ResolveParams, Value) -> BoxFuture<'static, AppResult<Value>> + Send + Sync>,
}

#[async_trait]
impl RewriteHook for ClosureRewrite {
    async fn run(&self, params: &ResolveParams, result: Value) -> AppResult<Value> {
        (self.f)(params, result).await
    }
}

/// Wraps an async closure into an `Arc<dyn RewriteHook>`.
pub fn rewrite_fn<F, Fut>(f: F) -> Arc<dyn RewriteHook>
where
    F: Fn(&ResolveParams, Value) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = AppResult<Value>> + Send + 'static,
{
    Arc::new(ClosureRewrite {
        f: Box::new(move |params, result| Box::pin(f(params, result))),
    })
}

struct ClosureVariant {
    f: Box<
        dyn Fn(&FieldSource, &RequestContext, &ResolveInfo) -> BoxFuture<'static, AppResult<Option<String>>>
            + Send
            + Sync,
    >,
}

#[async_trait]
impl VariantHook for ClosureVariant {
    async fn run(
        &self,
        value: &FieldSource,
        ctx: &RequestContext,
        info: &ResolveInfo,
    ) -> AppResult<Option<String>> {
        (self.f)(value, ctx, info).await
    }
}

/// Wraps an async closure into an `Arc<dyn VariantHook>`.
pub fn variant_fn<F, Fut>(f: F) -> Arc<dyn VariantHook>
where
    F: Fn(&FieldSource, &RequestContext, &ResolveInfo) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = AppResult<Option<String>>> + Send + 'static,
{
    Arc::new(ClosureVariant {
        f: Box::new(move |value, ctx, info| Box::pin(f(value, ctx, info))),
    })
}

/// A field name in a hook descriptor: a named field, or the reserved
/// resolve-variant pseudo-field of an interface type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldName {
    /// An ordinary named field.
    Named(String),
    /// The reserved resolve-variant pseudo-field.
    ResolveVariant,
}

impl std::fmt::Display for FieldName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{name}"),
            Self::ResolveVariant => write!(f, "{RESOLVE_VARIANT_FIELD}"),
        }
    }
}

/// Identifies one resolvable field in the schema graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    /// The type the field belongs to.
    pub type_name: String,
    /// The field, or the reserved pseudo-field.
    pub field: FieldName,
}

impl FieldRef {
    /// References a named field.
    pub fn named(type_name: &str, field_name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            field: FieldName::Named(field_name.to_string()),
        }
    }

    /// References a type's resolve-variant pseudo-field.
    pub fn resolve_variant(type_name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            field: FieldName::ResolveVariant,
        }
    }
}

impl std::fmt::Display for FieldRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.type_name, self.field)
    }
}

/// The post hook installed after base resolution, chosen by the plugin
/// author at registration time.
#[derive(Clone)]
pub enum PostHook {
    /// Runs for side effects; the field result is kept unchanged.
    Observe(Arc<dyn EffectHook>),
    /// Its return value becomes the new field result.
    Replace(Arc<dyn RewriteHook>),
    /// Resolve-variant chain hooks; only valid on the pseudo-field. Zero,
    /// one, or many.
    Variant(Vec<Arc<dyn VariantHook>>),
}

/// The hooks registered for one field descriptor.
#[derive(Clone, Default)]
pub struct FieldHooks {
    /// Runs before base resolution; failure aborts the field.
    pub pre: Option<Arc<dyn EffectHook>>,
    /// Runs after base resolution.
    pub post: Option<PostHook>,
}

/// A hook specification: field descriptors mapped to pre/post hooks.
#[derive(Clone, Default)]
pub struct HookMap {
    entries: HashMap<FieldRef, FieldHooks>,
}

impl HookMap {
    /// Creates an empty hook map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a raw entry, overwriting any existing one.
    pub fn entry(mut self, field_ref: FieldRef, hooks: FieldHooks) -> Self {
        self.entries.insert(field_ref, hooks);
        self
    }

    /// Registers a pre hook on a named field.
    pub fn pre(mut self, type_name: &str, field_name: &str, hook: Arc<dyn EffectHook>) -> Self {
        self.entries
            .entry(FieldRef::named(type_name, field_name))
            .or_default()
            .pre = Some(hook);
        self
    }

    /// Registers an observe-only post hook on a named field.
    pub fn observe(mut self, type_name: &str, field_name: &str, hook: Arc<dyn EffectHook>) -> Self {
        self.entries
            .entry(FieldRef::named(type_name, field_name))
            .or_default()
            .post = Some(PostHook::Observe(hook));
        self
    }

    /// Registers a result-replacing post hook on a named field.
    pub fn replace(mut self, type_name: &str, field_name: &str, hook: Arc<dyn RewriteHook>) -> Self {
        self.entries
            .entry(FieldRef::named(type_name, field_name))
            .or_default()
            .post = Some(PostHook::Replace(hook));
        self
    }

    /// Registers resolve-variant chain hooks on a type's pseudo-field.
    pub fn resolve_variant(mut self, type_name: &str, hooks: Vec<Arc<dyn VariantHook>>) -> Self {
        self.entries
            .entry(FieldRef::resolve_variant(type_name))
            .or_default()
            .post = Some(PostHook::Variant(hooks));
        self
    }

    /// Returns whether the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for HookMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut refs: Vec<String> = self.entries.keys().map(|r| r.to_string()).collect();
        refs.sort();
        f.debug_struct("HookMap").field("entries", &refs).finish()
    }
}

/// The wrapper installed on an ordinary field: pre → base → post.
struct DecoratedResolver {
    /// The captured resolver; `None` falls back to default resolution.
    base: Option<Arc<dyn FieldResolver>>,
    pre: Option<Arc<dyn EffectHook>>,
    post: Option<PostHook>,
}

#[async_trait]
impl FieldResolver for DecoratedResolver {
    async fn resolve(&self, params: ResolveParams) -> AppResult<Value> {
        // A failing pre hook must prevent base resolution from starting.
        if let Some(pre) = &self.pre {
            pre.run(&params).await?;
        }

        let mut result = match &self.base {
            Some(base) => base.resolve(params.clone()).await?,
            None => default_resolve(&params).await?,
        };

        match &self.post {
            Some(PostHook::Observe(hook)) => hook.run(&params).await?,
            Some(PostHook::Replace(hook)) => result = hook.run(&params, result).await?,
            // Variant posts never reach ordinary fields (validated in
            // decorate); nothing to do without a post hook.
            Some(PostHook::Variant(_)) | None => {}
        }

        Ok(result)
    }
}

/// The wrapper installed on an interface's variant resolution.
struct DecoratedVariantResolver {
    /// The captured resolver; absent means "never definite".
    base: Option<Arc<dyn VariantResolver>>,
    /// The conventional fallback variant, `Default{TypeName}`.
    default_name: String,
    hooks: Vec<Arc<dyn VariantHook>>,
}

#[async_trait]
impl VariantResolver for DecoratedVariantResolver {
    async fn resolve_variant(
        &self,
        value: &FieldSource,
        ctx: &RequestContext,
        info: &ResolveInfo,
    ) -> AppResult<Option<String>> {
        let original = match &self.base {
            Some(base) => base.resolve_variant(value, ctx, info).await?,
            None => None,
        };

        // The fallback name is treated as "no answer" so that chains
        // installed by later decorations stay reachable.
        if let Some(name) = original {
            if name != self.default_name {
                return Ok(Some(name));
            }
        }

        for hook in &self.hooks {
            if let Some(name) = hook.run(value, ctx, info).await? {
                return Ok(Some(name));
            }
        }

        Ok(Some(self.default_name.clone()))
    }
}

/// Decorates a schema with a hook specification, producing a new schema.
///
/// Fields without a matching entry are carried over untouched. Invalid hook
/// placement fails fast with a configuration error naming the offending
/// type/field.
pub fn decorate(schema: &Schema, hooks: &HookMap) -> AppResult<Schema> {
    validate(schema, hooks)?;

    let mut types = BTreeMap::new();
    for (type_name, type_def) in schema.types() {
        let decorated = match type_def {
            TypeDef::Object { fields } => TypeDef::Object {
                fields: decorate_fields(type_name, fields, hooks),
            },
            TypeDef::Interface {
                fields,
                resolve_variant,
            } => TypeDef::Interface {
                fields: decorate_fields(type_name, fields, hooks),
                resolve_variant: decorate_variant(type_name, resolve_variant.clone(), hooks),
            },
        };
        types.insert(type_name.clone(), decorated);
    }

    Ok(Schema::with_types(types))
}

fn decorate_fields(
    type_name: &str,
    fields: &BTreeMap<String, FieldDef>,
    hooks: &HookMap,
) -> BTreeMap<String, FieldDef> {
    let mut decorated = BTreeMap::new();
    for (field_name, field) in fields {
        let entry = hooks.entries.get(&FieldRef::named(type_name, field_name));
        let field = match entry {
            None => field.clone(),
            Some(field_hooks) if field_hooks.pre.is_none() && field_hooks.post.is_none() => {
                field.clone()
            }
            Some(field_hooks) => {
                debug!(
                    type_name = %type_name,
                    field_name = %field_name,
                    "Decorating field resolver"
                );
                FieldDef {
                    resolver: Some(Arc::new(DecoratedResolver {
                        base: field.resolver.clone(),
                        pre: field_hooks.pre.clone(),
                        post: field_hooks.post.clone(),
                    })),
                }
            }
        };
        decorated.insert(field_name.clone(), field);
    }
    decorated
}

fn decorate_variant(
    type_name: &str,
    base: Option<Arc<dyn VariantResolver>>,
    hooks: &HookMap,
) -> Option<Arc<dyn VariantResolver>> {
    let entry = hooks.entries.get(&FieldRef::resolve_variant(type_name));
    let Some(field_hooks) = entry else {
        return base;
    };

    // Observe/Replace posts were rejected by validation; an entry with no
    // post installs only the default-variant fallback.
    let chain = match &field_hooks.post {
        Some(PostHook::Variant(chain)) => chain.clone(),
        _ => Vec::new(),
    };

    debug!(
        type_name = %type_name,
        hooks = chain.len(),
        "Decorating variant resolution"
    );

    Some(Arc::new(DecoratedVariantResolver {
        base,
        default_name: format!("Default{type_name}"),
        hooks: chain,
    }))
}

fn validate(schema: &Schema, hooks: &HookMap) -> AppResult<()> {
    for (field_ref, field_hooks) in &hooks.entries {
        let type_def = schema.type_def(&field_ref.type_name).ok_or_else(|| {
            AppError::configuration(format!("hooks were found for unknown type '{field_ref}'"))
        })?;

        match &field_ref.field {
            FieldName::Named(field_name) => {
                if !type_def.fields().contains_key(field_name) {
                    return Err(AppError::configuration(format!(
                        "hooks were found for unknown field '{field_ref}'"
                    )));
                }
                if matches!(field_hooks.post, Some(PostHook::Variant(_))) {
                    return Err(AppError::configuration(format!(
                        "invalid post hooks were found for '{field_ref}': resolve-variant \
                         hooks are only supported on the {RESOLVE_VARIANT_FIELD} pseudo-field"
                    )));
                }
            }
            FieldName::ResolveVariant => {
                if !type_def.is_interface() {
                    return Err(AppError::configuration(format!(
                        "hooks were found for '{field_ref}', but '{}' is not an interface",
                        field_ref.type_name
                    )));
                }
                if field_hooks.pre.is_some() {
                    return Err(AppError::configuration(format!(
                        "invalid pre hooks were found for '{field_ref}': only post hooks are \
                         supported on the {RESOLVE_VARIANT_FIELD} pseudo-field"
                    )));
                }
                if matches!(
                    field_hooks.post,
                    Some(PostHook::Observe(_)) | Some(PostHook::Replace(_))
                ) {
                    return Err(AppError::configuration(format!(
                        "invalid post hooks were found for '{field_ref}': only resolve-variant \
                         hooks are supported on the {RESOLVE_VARIANT_FIELD} pseudo-field"
                    )));
                }
            }
        }
    }
    Ok(())
}
