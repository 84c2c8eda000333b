//! The semantically resolved project model.
//!
//! A tree of scopes: `Project` at the root, owning `Module`s, which own
//! `Target`s. Every scope is built once by the
//! builder and never mutated afterward; [`crate::resolve::VariableResolver`]
//! is implemented on [`Project`] so the expression algebra can resolve
//! `Reference` nodes against live model state without depending on this
//! module directly.

mod config;
mod module;
mod project;
mod property;
mod sourcefile;
mod target;
mod variable;

pub use config::Configuration;
pub use module::Module;
pub use project::Project;
pub use property::{Property, PropertyRegistry};
pub use sourcefile::SourceFile;
pub use target::Target;
pub use variable::{VarType, Variable};
