//! The closed set of extension points in the request pipeline.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use arbor_core::error::AppError;

/// Enumeration of all extension points plugins may register filters against.
///
/// The set is closed: a filter registered against any name outside it is a
/// configuration error surfaced at boot, not a runtime no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionPoint {
    /// Transforms the application-level router before the server starts
    /// listening.
    RegisterApp,
    /// Transforms the base router before the core routes are attached.
    PreRegisterRoutes,
    /// Transforms the router after the core routes are attached.
    PostRegisterRoutes,
    /// Transforms the resolver table before the schema is built.
    RegisterResolvers,
    /// Transforms the type declarations before the schema is built.
    RegisterTypedefs,
    /// Transforms the freshly built schema; field-hook decorators attach
    /// here.
    RegisterSchema,
    /// Transforms the list of per-request loader namespace factories.
    RegisterLoaders,
    /// Transforms the list of per-request mutator namespace factories.
    RegisterMutators,
}

impl ExtensionPoint {
    /// Returns the wire name of this extension point.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RegisterApp => "register_app",
            Self::PreRegisterRoutes => "pre_register_routes",
            Self::PostRegisterRoutes => "post_register_routes",
            Self::RegisterResolvers => "register_resolvers",
            Self::RegisterTypedefs => "register_typedefs",
            Self::RegisterSchema => "register_schema",
            Self::RegisterLoaders => "register_loaders",
            Self::RegisterMutators => "register_mutators",
        }
    }

    /// All members of the closed set.
    pub fn all() -> &'static [ExtensionPoint] {
        &[
            Self::RegisterApp,
            Self::PreRegisterRoutes,
            Self::PostRegisterRoutes,
            Self::RegisterResolvers,
            Self::RegisterTypedefs,
            Self::RegisterSchema,
            Self::RegisterLoaders,
            Self::RegisterMutators,
        ]
    }
}

impl std::fmt::Display for ExtensionPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ExtensionPoint {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .find(|point| point.as_str() == s)
            .copied()
            .ok_or_else(|| {
                AppError::configuration(format!(
                    "'{s}' is not a supported extension point name"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_round_trip() {
        for point in ExtensionPoint::all() {
            assert_eq!(point.as_str().parse::<ExtensionPoint>().unwrap(), *point);
        }
    }

    #[test]
    fn test_unknown_name_is_rejected() {
        let err = "register_everything".parse::<ExtensionPoint>().unwrap_err();
        assert_eq!(err.kind, arbor_core::error::ErrorKind::Configuration);
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&ExtensionPoint::PreRegisterRoutes).unwrap();
        assert_eq!(json, "\"pre_register_routes\"");
    }
}
