//! Modules: one per `.bkl` file.

use crate::handle::TargetId;

use super::sourcefile::SourceFile;
use super::target::Target;
use super::variable::Variable;

/// A module: one per parsed `.bkl` file.
///
/// A child of `Project`. Owns a variable environment, a `srcdir` path, a
/// source-file list, a header list, and an ordered list of targets.
#[derive(Debug, Clone)]
pub struct Module {
    source_file: String,
    srcdir: String,
    variables: Vec<Variable>,
    sources: Vec<SourceFile>,
    headers: Vec<SourceFile>,
    targets: Vec<Target>,
}

impl Module {
    /// Creates a new module rooted at `srcdir`, for the given source file.
    pub fn new(source_file: impl Into<String>, srcdir: impl Into<String>) -> Self {
        Self {
            source_file: source_file.into(),
            srcdir: srcdir.into(),
            variables: Vec::new(),
            sources: Vec::new(),
            headers: Vec::new(),
            targets: Vec::new(),
        }
    }

    /// The `.bkl` file this module was parsed from.
    pub fn source_file(&self) -> &str {
        &self.source_file
    }

    /// The module's current source directory.
    pub fn srcdir(&self) -> &str {
        &self.srcdir
    }

    /// Sets the module's source directory (`srcdir` statement: a
    /// normalized join of the current module's directory and the supplied
    /// relative path — computing that join is the builder's job; this
    /// setter just stores the result).
    pub fn set_srcdir(&mut self, srcdir: impl Into<String>) {
        self.srcdir = srcdir.into();
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

    /// All variables declared directly on this module, in declaration
    /// order.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Appends a source-file entry.
    pub fn add_source(&mut self, file: SourceFile) {
        self.sources.push(file);
    }

    /// Appends a header-file entry.
    pub fn add_header(&mut self, file: SourceFile) {
        self.headers.push(file);
    }

    /// This module's `sources { ... }` entries, in declaration order.
    pub fn sources(&self) -> &[SourceFile] {
        &self.sources
    }

    /// This module's `headers { ... }` entries, in declaration order.
    pub fn headers(&self) -> &[SourceFile] {
        &self.headers
    }

    /// Appends a target, returning its index within this module.
    pub fn add_target(&mut self, target: Target) -> TargetId {
        let id = TargetId(self.targets.len());
        self.targets.push(target);
        id
    }

    /// Looks up a target by its within-module index.
    pub fn target(&self, id: TargetId) -> Option<&Target> {
        self.targets.get(id.0)
    }

    /// Mutable lookup of a target by its within-module index.
    pub fn target_mut(&mut self, id: TargetId) -> Option<&mut Target> {
        self.targets.get_mut(id.0)
    }

    /// All targets declared in this module, in declaration order.
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Expr;
    use crate::handle::ModuleId;
    use crate::model::variable::VarType;

    #[test]
    fn targets_are_appended_in_declaration_order() {
        let mut m = Module::new("a.bkl", "src");
        let t1 = Target::new("app", "exe", ModuleId(0));
        let t2 = Target::new("lib", "library", ModuleId(0));
        let id1 = m.add_target(t1);
        let id2 = m.add_target(t2);
        assert_eq!(m.targets()[0].name(), "app");
        assert_eq!(m.targets()[1].name(), "lib");
        assert_eq!(m.target(id1).unwrap().name(), "app");
        assert_eq!(m.target(id2).unwrap().name(), "lib");
    }

    #[test]
    fn sources_preserve_declaration_order() {
        let mut m = Module::new("a.bkl", "src");
        m.add_source(SourceFile::new(Expr::literal("a.c"), None));
        m.add_source(SourceFile::new(Expr::literal("b.c"), None));
        assert_eq!(m.sources()[0].path().to_string(), "a.c");
        assert_eq!(m.sources()[1].path().to_string(), "b.c");
    }

    #[test]
    fn variable_lookup_is_scope_local() {
        let mut m = Module::new("a.bkl", "src");
        m.add_variable(Variable::new("x", Expr::literal("1"), VarType::Any));
        assert!(m.get_variable("x").is_some());
        assert!(m.get_variable("y").is_none());
    }
}
