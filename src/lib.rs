//! # bakefile-core
//!
//! The interpreter pipeline for Bakefile: an expression algebra over
//! late-bound variable references, an AST-to-model builder implementing
//! assignment, condition, and configuration-inheritance semantics, and a
//! dependency ledger deciding which build outputs are stale.
//!
//! ## Overview
//!
//! A `.bkl` file is parsed (by an external front end — the concrete
//! grammar is out of scope here) into a [`ast::ModuleAst`]. The
//! [`builder`] lowers that AST into a [`model::Project`]: a tree of
//! [`model::Module`]s and [`model::Target`]s, each carrying a flat
//! variable environment of [`expr::Expr`] values. Values stay symbolic —
//! referencing other variables, wrapped in conditions — until a back-end
//! asks for their concrete form via [`expr::all_values`]/
//! [`expr::all_elements`]/[`expr::as_native`].
//!
//! Once a project is built, the [`ledger`] module tracks which inputs
//! produced which outputs across runs, and the [`writer`] module commits
//! generated files idempotently.
//!
//! ## Pipeline stages
//!
//! - [`ast`]: the AST shape the builder consumes (grammar is external)
//! - [`expr`]: the immutable expression algebra (`simplify`, `split`,
//!   `as_native`, `all_values`/`all_elements`)
//! - [`condition`]: the active-condition stack threaded through the builder
//! - [`model`]: the resolved project tree (`Project`/`Module`/`Target`/...)
//! - [`builder`]: AST-to-model lowering (assignment, targets, if-blocks,
//!   configurations, submodules, srcdir)
//! - [`ledger`]: dependency tracking across builds
//! - [`writer`]: idempotent, atomic output-file commits
//! - [`registry`]: a reference [`model::PropertyRegistry`] implementation
//!
//! ## Example
//!
//! ```rust
//! use bakefile_core::ast::{ModuleAst, Node, StatementAst, ValueAst};
//! use bakefile_core::builder::{Builder, NoSubmodules};
//! use bakefile_core::registry::StaticPropertyRegistry;
//!
//! let ast = ModuleAst {
//!     source_file: "app.bkl".to_string(),
//!     children: vec![Node::new(StatementAst::Assignment {
//!         var: "greeting".to_string(),
//!         value: Node::new(ValueAst::Literal("hello".to_string())),
//!         append: false,
//!     })],
//! };
//!
//! let registry = StaticPropertyRegistry::standard();
//! let mut loader = NoSubmodules;
//! let mut builder = Builder::new(&registry, &mut loader);
//! let module_id = builder.build_module(&ast, "src").unwrap();
//! let project = builder.into_project();
//! assert!(project.module(module_id).unwrap().get_variable("greeting").is_some());
//! ```

#![warn(missing_docs)]

pub mod ast;
pub mod builder;
pub mod condition;
pub mod error;
pub mod expr;
pub mod handle;
pub mod ledger;
pub mod model;
pub mod pos;
pub mod registry;
pub mod resolve;
pub mod writer;

pub use error::{Error, Result, Warning};
pub use handle::{ModuleId, ScopeHandle, ScopeKind, TargetId};
pub use model::Project;
