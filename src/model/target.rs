//! Build targets.

use crate::expr::Expr;
use crate::handle::ModuleId;

use super::variable::Variable;

/// A target declared inside a [`super::Module`].
///
/// Has a unique id (unique across the whole `Project`, not just its
/// module), a target-type tag, a variable environment, and an optional
/// `_condition` expression.
#[derive(Debug, Clone)]
pub struct Target {
    name: String,
    type_name: String,
    module: ModuleId,
    variables: Vec<Variable>,
    condition: Option<Expr>,
}

impl Target {
    /// Creates a new, empty target.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, module: ModuleId) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            module,
            variables: Vec::new(),
            condition: None,
        }
    }

    /// The target's project-wide-unique name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The registered target-type tag (e.g. `"exe"`, `"library"`).
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The module this target was declared in.
    pub fn module(&self) -> ModuleId {
        self.module
    }

    /// This target's `_condition`, if it was declared inside an `if` block.
    pub fn condition(&self) -> Option<&Expr> {
        self.condition.as_ref()
    }

    /// Sets the `_condition` property, applying the active condition at the
    /// point of declaration.
    pub fn set_condition(&mut self, condition: Option<Expr>) {
        self.condition = condition;
    }

    /// Looks up a variable by name, scope-local only.
    pub fn get_variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name() == name)
    }

    /// Mutable lookup of a scope-local variable.
    pub fn get_variable_mut(&mut self, name: &str) -> Option<&mut Variable> {
        self.variables.iter_mut().find(|v| v.name() == name)
    }

    /// Inserts a new variable. Callers must have already checked that no
    /// variable of this name exists locally.
    pub fn add_variable(&mut self, variable: Variable) {
        self.variables.push(variable);
    }

    /// All variables declared directly on this target, in declaration
    /// order.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }
}
