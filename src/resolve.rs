//! The seam between the expression algebra and the model.
//!
//! Every `Reference`'s scope is a live model node at evaluation time; the
//! expression algebra itself (`crate::expr`) must not depend on the
//! concrete model types to stay a leaf component below the model.
//! [`VariableResolver`] is the narrow interface the model implements so
//! `simplify`/`split`/
//! `all_values`/`as_native` can dereference a `Reference` without knowing
//! what a `Project`, `Module`, or `Target` actually is.

use crate::expr::Expr;
use crate::handle::ScopeHandle;

/// Resolves a `Reference`'s `(scope, name)` pair to the variable's current
/// value.
///
/// Implemented by [`crate::model::Project`]. Returns `None` if no such
/// variable exists in that scope — callers treat that as a logic error
/// (every `Reference` the builder constructs points at a variable it has
/// already created or is in the process of creating) rather than a
/// recoverable condition.
pub trait VariableResolver {
    /// Looks up the current value of `name` in `scope`.
    fn resolve_value(&self, scope: ScopeHandle, name: &str) -> Option<Expr>;
}
