//! Shared `=` / `+=` assignment semantics.

use crate::ast::{Node, ValueAst};
use crate::error::{Error, Result, Warning};
use crate::expr::{Expr, ExprKind};
use crate::handle::ScopeHandle;
use crate::model::{VarType, Variable};
use crate::pos::Position;

use super::context::{add_local_variable, build_value, enclosing_lookup, local_lookup, local_variable_mut, Builder};

/// The assignment contract shared by `name = value` and `name += value`.
pub(super) fn on_assignment(
    builder: &mut Builder<'_>,
    scope: ScopeHandle,
    name: &str,
    value_ast: &Node<ValueAst>,
    append: bool,
    pos: Option<Position>,
) -> Result<()> {
    // Step 1: build the value expression.
    let value = build_value(value_ast, scope)?;

    // Step 2: warn on reserved (underscore-prefixed) names.
    if name.starts_with('_') {
        builder.diagnostics.push(Warning::new(
            format!("variable name \"{name}\" begins with an underscore and is reserved"),
            pos.clone(),
        ));
    }

    // Step 3: local lookup, falling back to an enclosing scope.
    let local = local_lookup(&builder.project, scope, name);
    let mut previous = local.clone().or_else(|| enclosing_lookup(&builder.project, scope, name));
    let mut local_exists = local.is_some();

    // Step 4: seed from a registered property if nothing local exists yet.
    if !local_exists {
        if let Some(prop) = builder.registry.get_prop(scope.kind(), name) {
            let active = builder.condition.active();
            let seed = if append || active.is_some() {
                builder.registry.default_expr(prop, scope)
            } else {
                Expr::null()
            };
            let var_type = VarType::Named(prop.var_type().to_string());
            add_local_variable(&mut builder.project, scope, Variable::new(name, seed.clone(), var_type.clone()));
            local_exists = true;
            if previous.is_none() {
                previous = Some((seed, var_type));
            }
        }
    }

    // Step 5: wrap the value under the active condition, if any.
    let active = builder.condition.active();
    let value = match active {
        None => value,
        Some(cond) => {
            if append {
                match value.kind() {
                    ExprKind::List(items) => Expr::list(
                        items
                            .iter()
                            .map(|item| Expr::if_(cond.clone(), item.clone(), Expr::null()))
                            .collect(),
                    ),
                    _ => Expr::if_(cond, value, Expr::null()),
                }
            } else {
                let else_branch = previous.as_ref().map(|(e, _)| e.clone()).unwrap_or_else(Expr::null);
                Expr::if_(cond, value, else_branch)
            }
        }
    };

    // Step 6: create the variable if it still doesn't exist locally.
    if !local_exists {
        if append && previous.is_none() {
            return Err(Error::ParserError {
                message: format!("unknown variable \"{name}\""),
                pos,
            });
        }
        let (seed_value, seed_type) = previous
            .clone()
            .unwrap_or_else(|| (Expr::null(), VarType::Any));
        add_local_variable(&mut builder.project, scope, Variable::new(name, seed_value, seed_type));
    }

    // Step 7: apply the update.
    let var = local_variable_mut(&mut builder.project, scope, name)
        .expect("variable was just ensured to exist locally");
    if append {
        if !var.accepts_append() {
            let type_name = match var.var_type() {
                VarType::Named(type_name) => type_name.clone(),
                VarType::Any | VarType::List => unreachable!("accepts_append() covers Any and List"),
            };
            return Err(Error::ParserError {
                message: format!("cannot append to variable \"{name}\" of type \"{type_name}\""),
                pos,
            });
        }
        let mut items: Vec<Expr> = match var.value().kind() {
            ExprKind::List(existing) => existing.clone(),
            _ => vec![var.value().clone()],
        };
        match value.kind() {
            ExprKind::List(new_items) => items.extend(new_items.iter().cloned()),
            _ => items.push(value),
        }
        var.set_value(Expr::list(items));
        var.promote_to_list();
    } else {
        var.set_value(value);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::context::NoSubmodules;
    use crate::handle::ModuleId;
    use crate::model::{Module, Property, PropertyRegistry};

    struct EmptyRegistry;
    impl PropertyRegistry for EmptyRegistry {
        fn get_prop(&self, _scope_kind: crate::handle::ScopeKind, _name: &str) -> Option<&Property> {
            None
        }
        fn default_expr(&self, _prop: &Property, _scope: ScopeHandle) -> Expr {
            Expr::null()
        }
    }

    fn module_value(s: &str) -> Node<ValueAst> {
        Node::new(ValueAst::Literal(s.to_string()))
    }

    fn new_builder(registry: &EmptyRegistry, loader: &mut NoSubmodules) -> Builder<'_> {
        let mut b = Builder::new(registry, loader);
        let m = Module::new("a.bkl", "src");
        b.project.add_module(m);
        b
    }

    #[test]
    fn plain_assignment_then_append_promotes_to_list() {
        let registry = EmptyRegistry;
        let mut loader = NoSubmodules;
        let mut b = new_builder(&registry, &mut loader);
        let scope = ScopeHandle::Module(ModuleId(0));

        on_assignment(&mut b, scope, "a", &module_value("x"), false, None).unwrap();
        on_assignment(&mut b, scope, "a", &module_value("y"), true, None).unwrap();

        let var = local_lookup(&b.project, scope, "a").unwrap();
        assert_eq!(var.1, VarType::List);
        assert_eq!(var.0.to_string(), "[x, y]");
    }

    #[test]
    fn append_to_unknown_variable_errors() {
        let registry = EmptyRegistry;
        let mut loader = NoSubmodules;
        let mut b = new_builder(&registry, &mut loader);
        let scope = ScopeHandle::Module(ModuleId(0));

        let err = on_assignment(&mut b, scope, "missing", &module_value("y"), true, None).unwrap_err();
        assert!(matches!(err, Error::ParserError { .. }));
    }

    #[test]
    fn conditional_set_wraps_with_previous_as_else() {
        let registry = EmptyRegistry;
        let mut loader = NoSubmodules;
        let mut b = new_builder(&registry, &mut loader);
        let scope = ScopeHandle::Module(ModuleId(0));

        on_assignment(&mut b, scope, "a", &module_value("x"), false, None).unwrap();
        b.condition.push(Expr::reference("cond", ScopeHandle::Project));
        on_assignment(&mut b, scope, "a", &module_value("y"), false, None).unwrap();
        b.condition.pop();

        let var = local_lookup(&b.project, scope, "a").unwrap();
        assert_eq!(var.0.to_string(), "if ($(cond)) then y else x");
    }

    #[test]
    fn conditional_append_wraps_each_list_item() {
        let registry = EmptyRegistry;
        let mut loader = NoSubmodules;
        let mut b = new_builder(&registry, &mut loader);
        let scope = ScopeHandle::Module(ModuleId(0));

        let list_ast = Node::new(ValueAst::List(vec![module_value("a"), module_value("b")]));
        on_assignment(&mut b, scope, "xs", &list_ast, false, None).unwrap();

        b.condition.push(Expr::reference("c", ScopeHandle::Project));
        on_assignment(&mut b, scope, "xs", &module_value("z"), true, None).unwrap();
        b.condition.pop();

        let var = local_lookup(&b.project, scope, "xs").unwrap();
        assert_eq!(var.0.to_string(), "[a, b, if ($(c)) then z else null]");
    }

    #[test]
    fn reserved_name_emits_warning() {
        let registry = EmptyRegistry;
        let mut loader = NoSubmodules;
        let mut b = new_builder(&registry, &mut loader);
        let scope = ScopeHandle::Module(ModuleId(0));

        on_assignment(&mut b, scope, "_internal", &module_value("x"), false, None).unwrap();
        let diags = b.take_diagnostics();
        assert_eq!(diags.len(), 1);
    }
}
