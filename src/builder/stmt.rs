//! Statement dispatch: files lists, targets, if-blocks, configurations,
//! submodules, and `srcdir`.

use crate::ast::{FilesListKind, Node, StatementAst};
use crate::error::{Error, Result};
use crate::expr::all_elements;
use crate::handle::ScopeHandle;
use crate::model::{SourceFile, Target};
use crate::pos::Position;

use super::assign::on_assignment;
use super::context::{build_value, configuration_condition, Builder};

/// Dispatches a single statement under `scope`.
pub(super) fn build_statement(builder: &mut Builder<'_>, scope: ScopeHandle, stmt: &Node<StatementAst>) -> Result<()> {
    let pos = stmt.pos.clone();
    let result = match &stmt.kind {
        StatementAst::Assignment { var, value, append } => {
            on_assignment(builder, scope, var, value, *append, pos.clone())
        }
        StatementAst::FilesList { kind, files } => on_files_list(builder, scope, *kind, files, pos.clone()),
        StatementAst::Target { name, type_name, content } => {
            on_target(builder, scope, name, type_name, content, pos.clone())
        }
        StatementAst::If { cond, content } => on_if(builder, scope, cond, content),
        StatementAst::Configuration { name, base, content } => {
            on_configuration(builder, scope, name, base.as_deref(), content, pos.clone())
        }
        StatementAst::Submodule { file } => on_submodule(builder, scope, file, pos.clone()),
        StatementAst::Srcdir { path } => on_srcdir(builder, scope, path, pos.clone()),
        StatementAst::NoOp => Ok(()),
    };
    result.map_err(|e| e.with_pos_if_missing(pos.unwrap_or_default()))
}

fn build_statements(builder: &mut Builder<'_>, scope: ScopeHandle, stmts: &[Node<StatementAst>]) -> Result<()> {
    for stmt in stmts {
        build_statement(builder, scope, stmt)?;
    }
    Ok(())
}

/// `sources { ... }` / `headers { ... }`.
fn on_files_list(
    builder: &mut Builder<'_>,
    scope: ScopeHandle,
    kind: FilesListKind,
    files: &Node<crate::ast::ValueAst>,
    pos: Option<Position>,
) -> Result<()> {
    let list_expr = build_value(files, scope)?;
    let outer_condition = builder.condition.active();
    let elements = all_elements(&list_expr, &builder.project)?;

    let module_id = match scope {
        ScopeHandle::Module(id) => id,
        _ => {
            return Err(Error::ParserError {
                message: "sources/headers statements are only valid at module scope".to_string(),
                pos,
            })
        }
    };

    for element in elements {
        let entry = SourceFile::new(element, outer_condition.clone());
        let module = builder
            .project
            .module_mut(module_id)
            .expect("module scope must refer to an existing module");
        match kind {
            FilesListKind::Sources => module.add_source(entry),
            FilesListKind::Headers => module.add_header(entry),
        }
    }
    Ok(())
}

/// `<type> <name> { ... }`.
fn on_target(
    builder: &mut Builder<'_>,
    scope: ScopeHandle,
    name: &str,
    type_name: &str,
    content: &[Node<StatementAst>],
    pos: Option<Position>,
) -> Result<()> {
    let module_id = match scope {
        ScopeHandle::Module(id) => id,
        _ => {
            return Err(Error::ParserError {
                message: "targets may only be declared at module scope".to_string(),
                pos,
            })
        }
    };

    if builder.project.has_target(name) {
        return Err(Error::ParserError {
            message: format!(
                "duplicate target \"{name}\"{}",
                builder
                    .project
                    .existing_target_pos(name)
                    .map(|p| format!(", first declared at {p}"))
                    .unwrap_or_default()
            ),
            pos,
        });
    }

    let active_condition = builder.condition.active();
    let mut target = Target::new(name, type_name, module_id);
    target.set_condition(active_condition);

    let module = builder.project.module_mut(module_id).expect("module scope must exist");
    let target_id = module.add_target(target);
    builder.project.register_target(name, module_id, target_id, pos);

    let token = builder.condition.reset();
    let target_scope = ScopeHandle::Target(module_id, target_id);
    let result = build_statements(builder, target_scope, content);
    builder.condition.restore(token);
    result
}

/// `if (cond) { ... }`.
fn on_if(
    builder: &mut Builder<'_>,
    scope: ScopeHandle,
    cond: &Node<crate::ast::ValueAst>,
    content: &[Node<StatementAst>],
) -> Result<()> {
    let cond_expr = build_value(cond, scope)?;
    builder.condition.push(cond_expr);
    let result = build_statements(builder, scope, content);
    builder.condition.pop();
    result
}

/// `configuration <name> [: <base>] { ... }`.
fn on_configuration(
    builder: &mut Builder<'_>,
    scope: ScopeHandle,
    name: &str,
    base: Option<&str>,
    content: &[Node<StatementAst>],
    pos: Option<Position>,
) -> Result<()> {
    if name == "Debug" || name == "Release" {
        return Err(Error::ParserError {
            message: format!("configuration \"{name}\" is predefined and cannot be redeclared"),
            pos,
        });
    }
    let base = base.ok_or_else(|| Error::ParserError {
        message: format!("configuration \"{name}\" must declare a base"),
        pos: pos.clone(),
    })?;

    builder
        .project
        .declare_configuration(name, base, content.to_vec(), pos.clone())?;

    let full_definition = builder
        .project
        .get_configuration(name)
        .expect("just declared")
        .definition()
        .to_vec();

    let cond = configuration_condition(name, pos);
    builder.condition.push(cond);
    let result = build_statements(builder, scope, &full_definition);
    builder.condition.pop();
    result
}

/// `submodule "file.bkl"`.
fn on_submodule(builder: &mut Builder<'_>, scope: ScopeHandle, file: &str, pos: Option<Position>) -> Result<()> {
    if builder.condition.active().is_some() {
        return Err(Error::ParserError {
            message: "conditional submodules are not supported".to_string(),
            pos,
        });
    }
    let module_id = match scope {
        ScopeHandle::Module(id) => id,
        _ => {
            return Err(Error::ParserError {
                message: "submodule statements are only valid at module scope".to_string(),
                pos,
            })
        }
    };
    let including_dir = {
        let module = builder.project.module(module_id).expect("module scope must exist");
        parent_dir(module.source_file())
    };
    let resolved = join_relative(&including_dir, file);
    let ast = builder.submodules.load_submodule(&resolved)?;
    let srcdir = {
        let module = builder.project.module(module_id).expect("module scope must exist");
        join_relative(module.srcdir(), &parent_dir(file))
    };
    builder.build_module(&ast, &srcdir)?;
    Ok(())
}

/// `srcdir "path"`.
fn on_srcdir(builder: &mut Builder<'_>, scope: ScopeHandle, path: &str, pos: Option<Position>) -> Result<()> {
    if !builder.condition.is_empty() {
        return Err(Error::ParserError {
            message: "srcdir may not appear inside a conditional block".to_string(),
            pos,
        });
    }
    let module_id = match scope {
        ScopeHandle::Module(id) => id,
        _ => {
            return Err(Error::ParserError {
                message: "srcdir is only valid at module scope".to_string(),
                pos,
            })
        }
    };
    let module = builder.project.module_mut(module_id).expect("module scope must exist");
    let joined = join_relative(module.srcdir(), path);
    module.set_srcdir(joined);
    Ok(())
}

fn parent_dir(path: &str) -> String {
    match path.rsplit_once('/') {
        Some((dir, _)) => dir.to_string(),
        None => String::new(),
    }
}

fn join_relative(base: &str, rel: &str) -> String {
    if base.is_empty() {
        rel.to_string()
    } else if rel.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{rel}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ModuleAst, ValueAst};
    use crate::builder::context::{Builder, NoSubmodules};
    use crate::expr::Expr;
    use crate::handle::ScopeKind;
    use crate::model::{Property, PropertyRegistry};

    struct EmptyRegistry;
    impl PropertyRegistry for EmptyRegistry {
        fn get_prop(&self, _scope_kind: ScopeKind, _name: &str) -> Option<&Property> {
            None
        }
        fn default_expr(&self, _prop: &Property, _scope: ScopeHandle) -> Expr {
            Expr::null()
        }
    }

    fn lit(s: &str) -> Node<ValueAst> {
        Node::new(ValueAst::Literal(s.to_string()))
    }

    #[test]
    fn sources_statement_appends_unconditional_entries() {
        let registry = EmptyRegistry;
        let mut loader = NoSubmodules;
        let mut builder = Builder::new(&registry, &mut loader);
        let ast = ModuleAst {
            source_file: "a.bkl".to_string(),
            children: vec![Node::new(StatementAst::FilesList {
                kind: FilesListKind::Sources,
                files: Node::new(ValueAst::List(vec![lit("a.c"), lit("b.c")])),
            })],
        };
        let module_id = builder.build_module(&ast, "src").unwrap();
        let project = builder.into_project();
        let sources = project.module(module_id).unwrap().sources();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].path().to_string(), "a.c");
        assert!(sources[0].condition().is_none());
    }

    #[test]
    fn conditional_sources_carry_the_active_condition() {
        let registry = EmptyRegistry;
        let mut loader = NoSubmodules;
        let mut builder = Builder::new(&registry, &mut loader);
        let ast = ModuleAst {
            source_file: "a.bkl".to_string(),
            children: vec![Node::new(StatementAst::If {
                cond: Node::new(ValueAst::Equal(
                    Box::new(Node::new(ValueAst::VarReference("platform".to_string()))),
                    Box::new(lit("win")),
                )),
                content: vec![Node::new(StatementAst::FilesList {
                    kind: FilesListKind::Sources,
                    files: Node::new(ValueAst::List(vec![lit("w.c")])),
                })],
            })],
        };
        let module_id = builder.build_module(&ast, "src").unwrap();
        let project = builder.into_project();
        let sources = project.module(module_id).unwrap().sources();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].path().to_string(), "w.c");
        assert_eq!(
            sources[0].condition().unwrap().to_string(),
            "($(platform) == win)"
        );
    }

    #[test]
    fn duplicate_target_name_errors() {
        let registry = EmptyRegistry;
        let mut loader = NoSubmodules;
        let mut builder = Builder::new(&registry, &mut loader);
        let ast = ModuleAst {
            source_file: "a.bkl".to_string(),
            children: vec![
                Node::new(StatementAst::Target {
                    name: "app".to_string(),
                    type_name: "exe".to_string(),
                    content: vec![],
                }),
                Node::new(StatementAst::Target {
                    name: "app".to_string(),
                    type_name: "exe".to_string(),
                    content: vec![],
                }),
            ],
        };
        let err = builder.build_module(&ast, "src").unwrap_err();
        assert!(matches!(err, Error::ParserError { .. }));
    }

    #[test]
    fn target_body_resets_condition_stack() {
        let registry = EmptyRegistry;
        let mut loader = NoSubmodules;
        let mut builder = Builder::new(&registry, &mut loader);
        let ast = ModuleAst {
            source_file: "a.bkl".to_string(),
            children: vec![Node::new(StatementAst::If {
                cond: lit("outer"),
                content: vec![Node::new(StatementAst::Target {
                    name: "app".to_string(),
                    type_name: "exe".to_string(),
                    content: vec![Node::new(StatementAst::Assignment {
                        var: "flags".to_string(),
                        value: lit("-O2"),
                        append: false,
                    })],
                })],
            })],
        };
        let module_id = builder.build_module(&ast, "src").unwrap();
        let project = builder.into_project();
        let module = project.module(module_id).unwrap();
        let target = &module.targets()[0];
        assert_eq!(target.condition().unwrap().to_string(), "outer");
        // The unconditional assignment inside the target body is not
        // wrapped by the outer if-condition, proving the stack was reset.
        assert_eq!(target.get_variable("flags").unwrap().value().to_string(), "-O2");
    }

    #[test]
    fn conditional_submodule_is_rejected() {
        let registry = EmptyRegistry;
        let mut loader = NoSubmodules;
        let mut builder = Builder::new(&registry, &mut loader);
        let ast = ModuleAst {
            source_file: "a.bkl".to_string(),
            children: vec![Node::new(StatementAst::If {
                cond: lit("c"),
                content: vec![Node::new(StatementAst::Submodule {
                    file: "m.bkl".to_string(),
                })],
            })],
        };
        let err = builder.build_module(&ast, "src").unwrap_err();
        assert!(matches!(err, Error::ParserError { .. }));
    }

    #[test]
    fn configuration_inherits_base_and_wraps_with_config_condition() {
        let registry = EmptyRegistry;
        let mut loader = NoSubmodules;
        let mut builder = Builder::new(&registry, &mut loader);
        let ast = ModuleAst {
            source_file: "a.bkl".to_string(),
            children: vec![Node::new(StatementAst::Configuration {
                name: "Fast".to_string(),
                base: Some("Debug".to_string()),
                content: vec![Node::new(StatementAst::Assignment {
                    var: "flags".to_string(),
                    value: lit("-O3"),
                    append: false,
                })],
            })],
        };
        builder.build_module(&ast, "src").unwrap();
        let project = builder.into_project();
        assert!(project.has_configuration("Fast"));
        assert_eq!(project.get_configuration("Fast").unwrap().base(), Some("Debug"));
    }
}
