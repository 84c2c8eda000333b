//! Entries of a module's source/header file lists.

use crate::expr::Expr;

/// A single entry produced by a `sources`/`headers` statement.
///
/// One `SourceFile` per possible element of the file-list expression (via
/// `all_elements`), each carrying its own per-element condition — `None`
/// if the entry is unconditional.
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: Expr,
    condition: Option<Expr>,
}

impl SourceFile {
    /// Creates a new source-file entry.
    pub fn new(path: Expr, condition: Option<Expr>) -> Self {
        Self { path, condition }
    }

    /// The file's path expression.
    pub fn path(&self) -> &Expr {
        &self.path
    }

    /// This entry's condition, if it is conditionally present.
    pub fn condition(&self) -> Option<&Expr> {
        self.condition.as_ref()
    }
}
