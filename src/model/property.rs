//! Registered property descriptors.
//!
//! The set of built-in properties (what a target type or module accepts,
//! and its default value) is treated as an external registry — the core
//! only defines the descriptor shape and the trait the builder queries it
//! through.

use crate::expr::Expr;
use crate::handle::{ScopeHandle, ScopeKind};

/// A registered property: what scope it applies to, its declared type,
/// and how to compute its default value.
#[derive(Debug, Clone)]
pub struct Property {
    name: String,
    var_type: String,
    scope: ScopeKind,
    readonly: bool,
}

impl Property {
    /// Creates a new property descriptor.
    pub fn new(name: impl Into<String>, var_type: impl Into<String>, scope: ScopeKind, readonly: bool) -> Self {
        Self {
            name: name.into(),
            var_type: var_type.into(),
            scope,
            readonly,
        }
    }

    /// The property's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The property's declared type name (e.g. `"bool"`, `"path"`).
    pub fn var_type(&self) -> &str {
        &self.var_type
    }

    /// The scope kind this property is registered for.
    pub fn scope(&self) -> ScopeKind {
        self.scope
    }

    /// `true` if the builder must reject assignment to this property.
    pub fn readonly(&self) -> bool {
        self.readonly
    }
}

/// Read-only collaborator supplying property descriptors and default
/// values to the builder.
///
/// Read-only: the builder calls `get_prop(name)` and `default_expr(scope)`;
/// the registry is provided by the surrounding system. This crate supplies
/// only the trait; concrete target-type property sets live outside the
/// interpreter core.
pub trait PropertyRegistry {
    /// Looks up the property named `name` registered for `scope`'s kind,
    /// if any.
    fn get_prop(&self, scope_kind: ScopeKind, name: &str) -> Option<&Property>;

    /// Computes the default expression for `prop` in the context of
    /// `scope` (a default may depend on where it's evaluated, e.g.
    /// `"@srcdir"`-relative defaults).
    fn default_expr(&self, prop: &Property, scope: ScopeHandle) -> Expr;
}
