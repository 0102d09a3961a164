//! The schema graph: an immutable field-resolution table.
//!
//! The table maps `(type name, field name)` to a resolution strategy. It is
//! built once per process lifetime, passed through the schema extension
//! points (where plugins decorate it), and shared read-only across all
//! requests. Decoration never mutates a table in place; it produces a new
//! one.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use arbor_core::error::AppError;
use arbor_core::result::AppResult;

use arbor_plugin::chain::FilterContext;
use arbor_plugin::registry::FilterRegistry;
use arbor_plugin::tags::ExtensionPoint;

use crate::context::RequestContext;
use crate::source::{FieldSource, default_resolve};
use crate::{resolvers, typedefs};

/// Identifies the field being resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveInfo {
    /// The type the field belongs to.
    pub type_name: String,
    /// The field name.
    pub field_name: String,
}

impl ResolveInfo {
    /// Creates resolve info for a field.
    pub fn new(type_name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            field_name: field_name.into(),
        }
    }
}

/// The four standard resolution inputs, bundled.
#[derive(Clone)]
pub struct ResolveParams {
    /// The parent value the field is resolved against.
    pub parent: FieldSource,
    /// Field arguments.
    pub args: Value,
    /// The request context.
    pub ctx: RequestContext,
    /// Which field is being resolved.
    pub info: ResolveInfo,
}

impl std::fmt::Debug for ResolveParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolveParams")
            .field("info", &self.info)
            .finish()
    }
}

/// Resolves one field.
#[async_trait]
pub trait FieldResolver: Send + Sync {
    /// Produces the field's value.
    async fn resolve(&self, params: ResolveParams) -> AppResult<Value>;
}

/// Picks the concrete variant for an interface-typed value.
///
/// `None` means "no definite answer": downstream resolution (hook chains,
/// the conventional default variant) takes over.
#[async_trait]
pub trait VariantResolver: Send + Sync {
    /// Names the concrete variant of `value`, if this resolver can tell.
    async fn resolve_variant(
        &self,
        value: &FieldSource,
        ctx: &RequestContext,
        info: &ResolveInfo,
    ) -> AppResult<Option<String>>;
}

/// A closure-based field resolver.
struct ClosureResolver {
    f: Box<dyn Fn(ResolveParams) -> BoxFuture<'static, AppResult<Value>> + Send + Sync>,
}

#[async_trait]
impl FieldResolver for ClosureResolver {
    async fn resolve(&self, params: ResolveParams) -> AppResult<Value> {
        (self.f)(params).await
    }
}

/// Wraps an async closure into an `Arc<dyn FieldResolver>`.
pub fn resolver_fn<F, Fut>(f: F) -> Arc<dyn FieldResolver>
where
    F: Fn(ResolveParams) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = AppResult<Value>> + Send + 'static,
{
    Arc::new(ClosureResolver {
        f: Box::new(move |params| Box::pin(f(params))),
    })
}

/// A closure-based variant resolver.
struct ClosureVariantResolver {
    f: Box<
        dyn Fn(&FieldSource, &RequestContext, &ResolveInfo) -> BoxFuture<'static, AppResult<Option<String>>>
            + Send
            + Sync,
    >,
}

#[async_trait]
impl VariantResolver for ClosureVariantResolver {
    async fn resolve_variant(
        &self,
        value: &FieldSource,
        ctx: &RequestContext,
        info: &ResolveInfo,
    ) -> AppResult<Option<String>> {
        (self.f)(value, ctx, info).await
    }
}

/// Wraps an async closure into an `Arc<dyn VariantResolver>`.
pub fn variant_resolver_fn<F, Fut>(f: F) -> Arc<dyn VariantResolver>
where
    F: Fn(&FieldSource, &RequestContext, &ResolveInfo) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = AppResult<Option<String>>> + Send + 'static,
{
    Arc::new(ClosureVariantResolver {
        f: Box::new(move |value, ctx, info| Box::pin(f(value, ctx, info))),
    })
}

/// One resolvable field in the table.
#[derive(Clone, Default)]
pub struct FieldDef {
    /// The field's resolver; `None` means default resolution applies.
    pub(crate) resolver: Option<Arc<dyn FieldResolver>>,
}

impl FieldDef {
    /// Returns whether the field has a custom resolver.
    pub fn has_resolver(&self) -> bool {
        self.resolver.is_some()
    }
}

/// A type in the schema graph.
#[derive(Clone)]
pub enum TypeDef {
    /// A concrete object type.
    Object {
        /// Fields by name.
        fields: BTreeMap<String, FieldDef>,
    },
    /// An interface type with variant resolution.
    Interface {
        /// Fields by name.
        fields: BTreeMap<String, FieldDef>,
        /// The type's variant resolution logic, if any.
        resolve_variant: Option<Arc<dyn VariantResolver>>,
    },
}

impl TypeDef {
    /// The type's fields.
    pub fn fields(&self) -> &BTreeMap<String, FieldDef> {
        match self {
            Self::Object { fields } | Self::Interface { fields, .. } => fields,
        }
    }

    /// Returns whether this is an interface type.
    pub fn is_interface(&self) -> bool {
        matches!(self, Self::Interface { .. })
    }
}

/// The kind of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    /// A concrete object type.
    Object,
    /// An interface type.
    Interface,
}

/// A declarative type definition, as flowed through `register_typedefs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDecl {
    /// Type name.
    pub name: String,
    /// Object or interface.
    pub kind: TypeKind,
    /// Field names.
    pub fields: Vec<String>,
}

impl TypeDecl {
    /// Declares an object type.
    pub fn object(name: &str, fields: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            kind: TypeKind::Object,
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// Declares an interface type.
    pub fn interface(name: &str, fields: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            kind: TypeKind::Interface,
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// Resolvers keyed by type and field, as flowed through
/// `register_resolvers`.
#[derive(Clone, Default)]
pub struct ResolverMap {
    fields: BTreeMap<String, BTreeMap<String, Arc<dyn FieldResolver>>>,
    variants: BTreeMap<String, Arc<dyn VariantResolver>>,
}

impl ResolverMap {
    /// Creates an empty resolver map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field resolver.
    pub fn field(mut self, type_name: &str, field_name: &str, r: Arc<dyn FieldResolver>) -> Self {
        self.fields
            .entry(type_name.to_string())
            .or_default()
            .insert(field_name.to_string(), r);
        self
    }

    /// Adds an interface's variant resolver.
    pub fn variant(mut self, type_name: &str, r: Arc<dyn VariantResolver>) -> Self {
        self.variants.insert(type_name.to_string(), r);
        self
    }

    /// Merges `other` in; its entries overwrite overlapping ones.
    pub fn merge(mut self, other: ResolverMap) -> Self {
        for (type_name, fields) in other.fields {
            let target = self.fields.entry(type_name).or_default();
            for (field_name, r) in fields {
                target.insert(field_name, r);
            }
        }
        for (type_name, r) in other.variants {
            self.variants.insert(type_name, r);
        }
        self
    }
}

impl std::fmt::Debug for ResolverMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverMap")
            .field("types", &self.fields.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// The immutable field-resolution table.
#[derive(Clone, Default)]
pub struct Schema {
    types: BTreeMap<String, TypeDef>,
}

impl Schema {
    /// Starts building a schema.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// The type map.
    pub fn types(&self) -> &BTreeMap<String, TypeDef> {
        &self.types
    }

    /// Looks up a type.
    pub fn type_def(&self, type_name: &str) -> Option<&TypeDef> {
        self.types.get(type_name)
    }

    /// Returns whether `type_name.field_name` exists.
    pub fn has_field(&self, type_name: &str, field_name: &str) -> bool {
        self.types
            .get(type_name)
            .map(|t| t.fields().contains_key(field_name))
            .unwrap_or(false)
    }

    /// Rebuilds the schema with a different type map. Used by decoration to
    /// produce a new table rather than mutating this one.
    pub(crate) fn with_types(types: BTreeMap<String, TypeDef>) -> Self {
        Self { types }
    }

    /// Resolves one field against a parent value.
    ///
    /// Runs the field's resolver, or default resolution when it has none.
    pub async fn resolve_field(
        &self,
        type_name: &str,
        field_name: &str,
        parent: FieldSource,
        args: Value,
        ctx: RequestContext,
    ) -> AppResult<Value> {
        let type_def = self
            .types
            .get(type_name)
            .ok_or_else(|| AppError::not_found(format!("unknown type '{type_name}'")))?;
        let field = type_def.fields().get(field_name).ok_or_else(|| {
            AppError::not_found(format!("unknown field '{type_name}.{field_name}'"))
        })?;

        let params = ResolveParams {
            parent,
            args,
            ctx,
            info: ResolveInfo::new(type_name, field_name),
        };

        match &field.resolver {
            Some(resolver) => resolver.resolve(params).await,
            None => default_resolve(&params).await,
        }
    }

    /// Runs an interface's variant resolution for a value.
    ///
    /// Undecorated interfaces may yield no definite answer; decorated ones
    /// always name a variant (falling back to `Default{TypeName}`).
    pub async fn resolve_variant(
        &self,
        type_name: &str,
        value: &FieldSource,
        ctx: &RequestContext,
    ) -> AppResult<Option<String>> {
        let type_def = self
            .types
            .get(type_name)
            .ok_or_else(|| AppError::not_found(format!("unknown type '{type_name}'")))?;

        let TypeDef::Interface { resolve_variant, .. } = type_def else {
            return Err(AppError::validation(format!(
                "type '{type_name}' is not an interface"
            )));
        };

        match resolve_variant {
            None => Ok(None),
            Some(resolver) => {
                let info = ResolveInfo::new(type_name, crate::hooks::RESOLVE_VARIANT_FIELD);
                resolver.resolve_variant(value, ctx, &info).await
            }
        }
    }
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Assembles a [`Schema`] from type declarations and a resolver map.
#[derive(Default)]
pub struct SchemaBuilder {
    decls: Vec<TypeDecl>,
    resolvers: ResolverMap,
}

impl SchemaBuilder {
    /// Adds type declarations. Declarations repeating a type name extend its
    /// field list; their kinds must agree.
    pub fn decls(mut self, decls: Vec<TypeDecl>) -> Self {
        self.decls.extend(decls);
        self
    }

    /// Sets the resolver map.
    pub fn resolvers(mut self, resolvers: ResolverMap) -> Self {
        self.resolvers = resolvers;
        self
    }

    /// Builds the schema, failing on conflicting declarations or resolvers
    /// targeting unknown types/fields.
    pub fn build(self) -> AppResult<Schema> {
        let mut kinds: BTreeMap<String, TypeKind> = BTreeMap::new();
        let mut fields: BTreeMap<String, BTreeMap<String, FieldDef>> = BTreeMap::new();

        for decl in self.decls {
            match kinds.get(&decl.name) {
                None => {
                    kinds.insert(decl.name.clone(), decl.kind);
                }
                Some(kind) if *kind == decl.kind => {}
                Some(kind) => {
                    return Err(AppError::configuration(format!(
                        "type '{}' declared as both {kind:?} and {:?}",
                        decl.name, decl.kind
                    )));
                }
            }
            let entry = fields.entry(decl.name).or_default();
            for field in decl.fields {
                entry.entry(field).or_default();
            }
        }

        for (type_name, type_resolvers) in self.resolvers.fields {
            let entry = fields.get_mut(&type_name).ok_or_else(|| {
                AppError::configuration(format!("resolver targets unknown type '{type_name}'"))
            })?;
            for (field_name, resolver) in type_resolvers {
                let field = entry.get_mut(&field_name).ok_or_else(|| {
                    AppError::configuration(format!(
                        "resolver targets unknown field '{type_name}.{field_name}'"
                    ))
                })?;
                field.resolver = Some(resolver);
            }
        }

        let mut variants = self.resolvers.variants;
        let mut types = BTreeMap::new();
        for (name, type_fields) in fields {
            let kind = kinds[&name];
            let type_def = match kind {
                TypeKind::Object => {
                    if variants.contains_key(&name) {
                        return Err(AppError::configuration(format!(
                            "variant resolver targets non-interface type '{name}'"
                        )));
                    }
                    TypeDef::Object { fields: type_fields }
                }
                TypeKind::Interface => TypeDef::Interface {
                    fields: type_fields,
                    resolve_variant: variants.remove(&name),
                },
            };
            types.insert(name, type_def);
        }

        if let Some(name) = variants.keys().next() {
            return Err(AppError::configuration(format!(
                "variant resolver targets unknown type '{name}'"
            )));
        }

        Ok(Schema { types })
    }
}

/// Builds the schema for the process: core declarations and resolvers flow
/// through their extension points, the table is assembled, and the result
/// passes through `register_schema` where plugin decorators attach.
pub async fn create_schema(registry: &FilterRegistry, cx: &FilterContext) -> AppResult<Schema> {
    let decls = registry
        .do_filter(ExtensionPoint::RegisterTypedefs, typedefs::core_typedefs(), cx)
        .await?;
    let resolver_map = registry
        .do_filter(
            ExtensionPoint::RegisterResolvers,
            resolvers::core_resolvers(),
            cx,
        )
        .await?;

    let schema = Schema::builder()
        .decls(decls)
        .resolvers(resolver_map)
        .build()?;

    registry
        .do_filter(ExtensionPoint::RegisterSchema, schema, cx)
        .await
}
