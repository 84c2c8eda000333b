//! The builder's driver state and shared scope-lookup helpers.

use crate::ast::{ModuleAst, Node, ValueAst};
use crate::condition::ConditionStack;
use crate::error::{Error, Result, Warning};
use crate::expr::{BoolOp, Expr};
use crate::handle::ScopeHandle;
use crate::model::{Module, Project, PropertyRegistry, VarType, Variable};
use crate::pos::Position;

/// External collaborator that resolves a `submodule "path.bkl"` statement
/// into its parsed AST.
///
/// The concrete grammar is out of scope here; the builder only needs
/// *something* that turns a resolved path into a [`ModuleAst`].
pub trait SubmoduleLoader {
    /// Parses the submodule at `resolved_path` (already joined with the
    /// including file's directory).
    fn load_submodule(&mut self, resolved_path: &str) -> Result<ModuleAst>;
}

/// A loader that always fails; useful for tests and for builds that never
/// declare a `submodule` statement.
#[derive(Debug, Default)]
pub struct NoSubmodules;

impl SubmoduleLoader for NoSubmodules {
    fn load_submodule(&mut self, resolved_path: &str) -> Result<ModuleAst> {
        Err(Error::ParserError {
            message: format!("no submodule loader configured for \"{resolved_path}\""),
            pos: None,
        })
    }
}

/// Drives AST-to-model lowering: owns the [`Project`] being built, the
/// active-condition stack, and accumulated non-fatal diagnostics.
///
/// The builder maintains a *context* — the current innermost scope. This
/// implementation threads that scope as an explicit parameter through
/// `build_*` calls rather than storing it as mutable field state, since the
/// scope changes with the call stack (target bodies, if-blocks,
/// configuration bodies) rather than needing to be mutated in place.
pub struct Builder<'r> {
    pub(super) project: Project,
    pub(super) condition: ConditionStack,
    pub(super) diagnostics: Vec<Warning>,
    pub(super) registry: &'r dyn PropertyRegistry,
    pub(super) submodules: &'r mut dyn SubmoduleLoader,
}

impl<'r> Builder<'r> {
    /// Creates a new builder over an empty project.
    pub fn new(registry: &'r dyn PropertyRegistry, submodules: &'r mut dyn SubmoduleLoader) -> Self {
        Self {
            project: Project::new(),
            condition: ConditionStack::new(),
            diagnostics: Vec::new(),
            registry,
            submodules,
        }
    }

    /// Builds a module from `ast`, rooted at `srcdir`, and inserts it into
    /// the project.
    pub fn build_module(&mut self, ast: &ModuleAst, srcdir: &str) -> Result<crate::handle::ModuleId> {
        let module = Module::new(ast.source_file.clone(), srcdir.to_string());
        let module_id = self.project.add_module(module);
        let scope = ScopeHandle::Module(module_id);
        for stmt in &ast.children {
            super::stmt::build_statement(self, scope, stmt)?;
        }
        Ok(module_id)
    }

    /// Drains and returns all warnings accumulated so far.
    pub fn take_diagnostics(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Consumes the builder, returning the finished project. Callers
    /// should only do this once no more modules will be built — the model
    /// is frozen from this point on.
    pub fn into_project(self) -> Project {
        self.project
    }

    /// Read-only access to the project under construction.
    pub fn project(&self) -> &Project {
        &self.project
    }
}

/// The enclosing scope of `scope`, or `None` for `Project` (the root).
pub(super) fn enclosing_scope(scope: ScopeHandle) -> Option<ScopeHandle> {
    match scope {
        ScopeHandle::Target(module_id, _) => Some(ScopeHandle::Module(module_id)),
        ScopeHandle::Module(_) => Some(ScopeHandle::Project),
        ScopeHandle::Project => None,
    }
}

/// Looks up a variable in `scope` only (no walk toward the root).
pub(super) fn local_lookup(project: &Project, scope: ScopeHandle, name: &str) -> Option<(Expr, VarType)> {
    match scope {
        ScopeHandle::Target(module_id, target_id) => project
            .module(module_id)?
            .target(target_id)?
            .get_variable(name)
            .map(|v| (v.value().clone(), v.var_type().clone())),
        ScopeHandle::Module(module_id) => project
            .module(module_id)?
            .get_variable(name)
            .map(|v| (v.value().clone(), v.var_type().clone())),
        ScopeHandle::Project => None,
    }
}

/// Walks from `scope` toward the root, returning the first variable found
/// strictly in an *enclosing* scope (never `scope` itself).
pub(super) fn enclosing_lookup(project: &Project, scope: ScopeHandle, name: &str) -> Option<(Expr, VarType)> {
    let mut cursor = enclosing_scope(scope);
    while let Some(s) = cursor {
        if let Some(found) = local_lookup(project, s, name) {
            return Some(found);
        }
        cursor = enclosing_scope(s);
    }
    None
}

/// Inserts a new variable into `scope`'s local environment.
pub(super) fn add_local_variable(project: &mut Project, scope: ScopeHandle, variable: Variable) {
    match scope {
        ScopeHandle::Target(module_id, target_id) => {
            if let Some(target) = project.module_mut(module_id).and_then(|m| m.target_mut(target_id)) {
                target.add_variable(variable);
            }
        }
        ScopeHandle::Module(module_id) => {
            if let Some(module) = project.module_mut(module_id) {
                module.add_variable(variable);
            }
        }
        ScopeHandle::Project => {}
    }
}

/// Mutable access to a variable already known to exist locally in `scope`.
pub(super) fn local_variable_mut<'p>(
    project: &'p mut Project,
    scope: ScopeHandle,
    name: &str,
) -> Option<&'p mut Variable> {
    match scope {
        ScopeHandle::Target(module_id, target_id) => project
            .module_mut(module_id)?
            .target_mut(target_id)?
            .get_variable_mut(name),
        ScopeHandle::Module(module_id) => project.module_mut(module_id)?.get_variable_mut(name),
        ScopeHandle::Project => None,
    }
}

/// Builds an [`Expr`] from a value AST node, resolving `VarReference`
/// against `scope`.
pub(super) fn build_value(node: &Node<ValueAst>, scope: ScopeHandle) -> Result<Expr> {
    let expr = match &node.kind {
        ValueAst::Literal(s) => Expr::literal(s.clone()),
        ValueAst::Bool(b) => Expr::bool_value(*b),
        ValueAst::VarReference(name) => Expr::reference(name.clone(), scope),
        ValueAst::List(items) => {
            let built = items
                .iter()
                .map(|i| build_value(i, scope))
                .collect::<Result<Vec<_>>>()?;
            Expr::list(built)
        }
        ValueAst::Concat(items) => {
            if items.is_empty() {
                return Err(Error::ParserError {
                    message: "concatenation must have at least one operand".to_string(),
                    pos: node.pos.clone(),
                });
            }
            let built = items
                .iter()
                .map(|i| build_value(i, scope))
                .collect::<Result<Vec<_>>>()?;
            Expr::concat(built)
        }
        ValueAst::Not(inner) => Expr::not(build_value(inner, scope)?),
        ValueAst::And(l, r) => Expr::bool_op(BoolOp::And, build_value(l, scope)?, build_value(r, scope)?),
        ValueAst::Or(l, r) => Expr::bool_op(BoolOp::Or, build_value(l, scope)?, build_value(r, scope)?),
        ValueAst::Equal(l, r) => Expr::bool_op(BoolOp::Equal, build_value(l, scope)?, build_value(r, scope)?),
        ValueAst::NotEqual(l, r) => {
            Expr::bool_op(BoolOp::NotEqual, build_value(l, scope)?, build_value(r, scope)?)
        }
    };
    Ok(match &node.pos {
        Some(pos) => expr.with_pos_if_missing(pos.clone()),
        None => expr,
    })
}

/// Builds the `config == name` condition synthesized when entering a
/// configuration's definition body.
pub(super) fn configuration_condition(name: &str, pos: Option<Position>) -> Expr {
    let cond = Expr::bool_op(
        BoolOp::Equal,
        Expr::reference("config", ScopeHandle::Project),
        Expr::literal(name.to_string()),
    );
    match pos {
        Some(p) => cond.with_pos_if_missing(p),
        None => cond,
    }
}
