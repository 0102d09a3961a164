//! Parent values flowing through field resolution, and the default
//! resolution behavior used when a field has no custom resolver.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use arbor_core::result::AppResult;

use crate::context::RequestContext;

/// A callable property on a live source object.
///
/// Invoked with the field arguments and the request context; its outcome is
/// the resolved field value.
#[async_trait]
pub trait SourceMethod: Send + Sync {
    /// Invokes the method.
    async fn invoke(&self, args: Value, ctx: &RequestContext) -> AppResult<Value>;
}

/// A property looked up on a live source object.
pub enum SourceProperty {
    /// A plain value, returned as-is.
    Value(Value),
    /// An invocable member, called with `(args, context)`.
    Method(Arc<dyn SourceMethod>),
}

/// A live object exposing named properties to default resolution.
pub trait SourceObject: Send + Sync {
    /// Looks up a property by name.
    fn property(&self, name: &str) -> Option<SourceProperty>;
}

/// The parent value a field is resolved against.
#[derive(Clone)]
pub enum FieldSource {
    /// Plain data; property access is key lookup.
    Json(Value),
    /// A live object whose properties may be values or callable methods.
    Object(Arc<dyn SourceObject>),
}

impl FieldSource {
    /// Wraps plain JSON data.
    pub fn json(value: impl Into<Value>) -> Self {
        Self::Json(value.into())
    }

    /// Returns the underlying JSON data, if this is a `Json` source.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Object(_) => None,
        }
    }
}

impl std::fmt::Debug for FieldSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(value) => f.debug_tuple("Json").field(value).finish(),
            Self::Object(_) => f.debug_tuple("Object").finish(),
        }
    }
}

impl Default for FieldSource {
    fn default() -> Self {
        Self::Json(Value::Null)
    }
}

/// Default resolution: property access on the parent value.
///
/// A `Json` parent resolves by key lookup (missing keys and non-object
/// parents resolve to null). An `Object` parent looks the property up: a
/// value is returned as-is, a method is invoked with `(args, context)`.
pub async fn default_resolve(params: &crate::schema::ResolveParams) -> AppResult<Value> {
    let field_name = params.info.field_name.as_str();
    match &params.parent {
        FieldSource::Json(value) => Ok(value.get(field_name).cloned().unwrap_or(Value::Null)),
        FieldSource::Object(object) => match object.property(field_name) {
            None => Ok(Value::Null),
            Some(SourceProperty::Value(value)) => Ok(value),
            Some(SourceProperty::Method(method)) => {
                method.invoke(params.args.clone(), &params.ctx).await
            }
        },
    }
}
