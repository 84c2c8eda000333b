//! A reference [`PropertyRegistry`] implementation.
//!
//! Built-in property definitions are out of the core's scope — a registry
//! is supplied by the surrounding system. This module supplies one concrete
//! registry — a small set of common properties (`sources`, `headers`,
//! `srcdir`, `deps`, `libs`, `includedirs`, `defines`) — so the CLI driver
//! and the integration tests have something real to run against without
//! inventing a whole build-system property schema.

use std::collections::HashMap;

use crate::expr::Expr;
use crate::handle::{ScopeHandle, ScopeKind};
use crate::model::{Property, PropertyRegistry};

/// A registry backed by a fixed table of properties, each with a constant
/// default (computed defaults that depend on `scope`, like `@srcdir`
/// anchors, are left to a richer registry — `default_expr` is only
/// required to be able to consult `scope`, not that every registry does).
#[derive(Debug, Default)]
pub struct StaticPropertyRegistry {
    properties: HashMap<(ScopeKind, String), Property>,
    defaults: HashMap<(ScopeKind, String), Expr>,
}

impl StaticPropertyRegistry {
    /// An empty registry with no properties at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The registry pre-seeded with a common set of properties: list-typed
    /// `sources`/`headers`/`deps`/`libs`/`includedirs`/`defines` at module
    /// and target scope, defaulting to an empty list.
    pub fn standard() -> Self {
        let mut reg = Self::empty();
        for scope in [ScopeKind::Module, ScopeKind::Target] {
            reg.register(Property::new("sources", "list", scope, false), Expr::list(vec![]));
            reg.register(Property::new("headers", "list", scope, false), Expr::list(vec![]));
            reg.register(Property::new("deps", "list", scope, false), Expr::list(vec![]));
            reg.register(Property::new("libs", "list", scope, false), Expr::list(vec![]));
            reg.register(Property::new("includedirs", "list", scope, false), Expr::list(vec![]));
            reg.register(Property::new("defines", "list", scope, false), Expr::list(vec![]));
        }
        reg.register(Property::new("id", "string", ScopeKind::Target, true), Expr::null());
        reg
    }

    /// Registers `property` with a constant default value.
    pub fn register(&mut self, property: Property, default: Expr) {
        let key = (property.scope(), property.name().to_string());
        self.defaults.insert(key.clone(), default);
        self.properties.insert(key, property);
    }
}

impl PropertyRegistry for StaticPropertyRegistry {
    fn get_prop(&self, scope_kind: ScopeKind, name: &str) -> Option<&Property> {
        self.properties.get(&(scope_kind, name.to_string()))
    }

    fn default_expr(&self, prop: &Property, _scope: ScopeHandle) -> Expr {
        self.defaults
            .get(&(prop.scope(), prop.name().to_string()))
            .cloned()
            .unwrap_or_else(Expr::null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_registry_knows_sources_at_module_scope() {
        let reg = StaticPropertyRegistry::standard();
        let prop = reg.get_prop(ScopeKind::Module, "sources").unwrap();
        assert_eq!(prop.var_type(), "list");
        assert!(!prop.readonly());
    }

    #[test]
    fn standard_registry_defaults_to_empty_list() {
        let reg = StaticPropertyRegistry::standard();
        let prop = reg.get_prop(ScopeKind::Target, "libs").unwrap();
        let default = reg.default_expr(prop, ScopeHandle::Project);
        assert_eq!(default.to_string(), "[]");
    }

    #[test]
    fn unregistered_property_is_absent() {
        let reg = StaticPropertyRegistry::standard();
        assert!(reg.get_prop(ScopeKind::Project, "sources").is_none());
    }

    #[test]
    fn readonly_property_is_flagged() {
        let reg = StaticPropertyRegistry::standard();
        let prop = reg.get_prop(ScopeKind::Target, "id").unwrap();
        assert!(prop.readonly());
    }
}
