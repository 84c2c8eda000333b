//! The expression algebra.
//!
//! An [`Expr`] is an immutable tagged tree representing every value and
//! condition in a Bakefile project — a string literal, a variable
//! reference, a conditional, a file path. Expressions are evaluated,
//! simplified, split, and enumerated; they are never mutated in place —
//! every operation that would change a value instead produces a new one.
//!
//! `Expr` is a cheap-to-clone handle (`Rc` internally) around an
//! [`ExprKind`] plus an optional [`Position`]; cloning an `Expr` never
//! deep-copies the tree.

mod enumerate;
mod native;
mod simplify;
mod split;

pub use enumerate::{all_elements, all_values};
pub use native::{as_native, EvalContext, NativeValue};
pub use simplify::simplify;
pub use split::split;

use std::fmt;
use std::rc::Rc;

use crate::handle::ScopeHandle;
use crate::pos::Position;

/// The two anchors a [`ExprKind::Path`] can be rooted at: the literal
/// tokens `@srcdir` and `@top_srcdir`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// Relative to the owning module's source directory.
    Srcdir,
    /// Relative to the top-level project's source directory.
    TopSrcdir,
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anchor::Srcdir => write!(f, "@srcdir"),
            Anchor::TopSrcdir => write!(f, "@top_srcdir"),
        }
    }
}

/// Boolean operators. `Not` is unary; the rest are binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoolOp {
    /// `left && right`
    And,
    /// `left || right`
    Or,
    /// `!left` (unary — `right` is absent)
    Not,
    /// `left == right`
    Equal,
    /// `left != right`
    NotEqual,
}

/// The tagged variants of the expression tree.
///
/// `List` is never nested directly inside another `List` (the builder
/// flattens before constructing one); `Concat` always has at least one
/// child. Both invariants are enforced by the smart constructors on
/// [`Expr`], not by the enum itself, so that a resolver walking an existing
/// tree can still pattern-match exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// A terminal string constant.
    Literal(String),
    /// A terminal boolean constant.
    BoolValue(bool),
    /// A homogeneous, flattened collection.
    List(Vec<Expr>),
    /// String-level concatenation of one or more children.
    Concat(Vec<Expr>),
    /// The unset value.
    Null,
    /// A late-bound lookup of `name` against `scope`.
    Reference {
        /// The referenced variable's name.
        name: String,
        /// The scope to resolve `name` against.
        scope: ScopeHandle,
    },
    /// A file path composed of component expressions.
    Path {
        /// Path components, joined with the evaluation context's
        /// directory separator.
        components: Vec<Expr>,
        /// The anchor this path is rooted at.
        anchor: Anchor,
    },
    /// A boolean operator applied to one (`Not`) or two operands.
    Bool {
        /// The operator.
        op: BoolOp,
        /// Left (or, for `Not`, only) operand.
        left: Expr,
        /// Right operand; `None` iff `op == BoolOp::Not`.
        right: Option<Expr>,
    },
    /// `if cond then yes else no`.
    If {
        /// The condition.
        cond: Expr,
        /// Value when `cond` holds.
        yes: Expr,
        /// Value when `cond` does not hold.
        no: Expr,
    },
}

#[derive(Debug, PartialEq)]
struct ExprNode {
    kind: ExprKind,
    pos: Option<Position>,
}

/// An immutable, cheaply-cloned expression tree node.
///
/// `Expr` is a handle (`Rc<ExprNode>`), so `Expr::clone()` is O(1) and
/// shares the underlying tree — this is what lets `simplify`'s `Reference`
/// rule avoid duplicating large values by choosing *not* to inline a
/// list-valued reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr(Rc<ExprNode>);

impl Expr {
    /// Wraps `kind` with no known position.
    pub fn new(kind: ExprKind) -> Self {
        Expr(Rc::new(ExprNode { kind, pos: None }))
    }

    /// Wraps `kind` with the given position.
    pub fn at(kind: ExprKind, pos: Position) -> Self {
        Expr(Rc::new(ExprNode {
            kind,
            pos: Some(pos),
        }))
    }

    /// This node's variant.
    pub fn kind(&self) -> &ExprKind {
        &self.0.kind
    }

    /// This node's source position, if known.
    pub fn pos(&self) -> Option<&Position> {
        self.0.pos.as_ref()
    }

    /// Returns a clone of this expression carrying `pos` instead, unless it
    /// already carries one.
    pub fn with_pos_if_missing(self, pos: Position) -> Self {
        if self.0.pos.is_some() {
            return self;
        }
        Expr(Rc::new(ExprNode {
            kind: self.0.kind.clone(),
            pos: Some(pos),
        }))
    }

    /// Shorthand for `Expr::new(ExprKind::Literal(value.into()))`.
    pub fn literal(value: impl Into<String>) -> Self {
        Expr::new(ExprKind::Literal(value.into()))
    }

    /// Shorthand for `Expr::new(ExprKind::BoolValue(value))`.
    pub fn bool_value(value: bool) -> Self {
        Expr::new(ExprKind::BoolValue(value))
    }

    /// Shorthand for `Expr::new(ExprKind::Null)`.
    pub fn null() -> Self {
        Expr::new(ExprKind::Null)
    }

    /// Builds a `List`, flattening any directly-nested lists so the
    /// "`List` is never a child of `List`" invariant holds by construction.
    pub fn list(items: Vec<Expr>) -> Self {
        let mut flat = Vec::with_capacity(items.len());
        for item in items {
            match item.kind() {
                ExprKind::List(inner) => flat.extend(inner.iter().cloned()),
                _ => flat.push(item),
            }
        }
        Expr::new(ExprKind::List(flat))
    }

    /// Builds a `Concat`. Panics if `items` is empty — callers must never
    /// construct a zero-child concatenation; `Concat` always has at least
    /// one child.
    pub fn concat(items: Vec<Expr>) -> Self {
        assert!(!items.is_empty(), "Concat must have at least one child");
        Expr::new(ExprKind::Concat(items))
    }

    /// Builds a `Reference`.
    pub fn reference(name: impl Into<String>, scope: ScopeHandle) -> Self {
        Expr::new(ExprKind::Reference {
            name: name.into(),
            scope,
        })
    }

    /// Builds a `Path`.
    pub fn path(components: Vec<Expr>, anchor: Anchor) -> Self {
        Expr::new(ExprKind::Path { components, anchor })
    }

    /// Builds an `If`.
    pub fn if_(cond: Expr, yes: Expr, no: Expr) -> Self {
        Expr::new(ExprKind::If { cond, yes, no })
    }

    /// Builds a `Bool` with a unary `Not`.
    pub fn not(operand: Expr) -> Self {
        Expr::new(ExprKind::Bool {
            op: BoolOp::Not,
            left: operand,
            right: None,
        })
    }

    /// Builds a binary `Bool` expression.
    pub fn bool_op(op: BoolOp, left: Expr, right: Expr) -> Self {
        assert_ne!(op, BoolOp::Not, "BoolOp::Not is unary; use Expr::not");
        Expr::new(ExprKind::Bool {
            op,
            left,
            right: Some(right),
        })
    }

    /// `true` iff this node is `List`.
    pub fn is_list(&self) -> bool {
        matches!(self.kind(), ExprKind::List(_))
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ExprKind::Literal(s) => write!(f, "{s}"),
            ExprKind::BoolValue(b) => write!(f, "{b}"),
            ExprKind::Null => write!(f, "null"),
            ExprKind::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            ExprKind::Concat(items) => {
                for item in items {
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            ExprKind::Reference { name, .. } => write!(f, "$({name})"),
            ExprKind::Path { components, anchor } => {
                write!(f, "{anchor}/")?;
                for (i, c) in components.iter().enumerate() {
                    if i > 0 {
                        write!(f, "/")?;
                    }
                    write!(f, "{c}")?;
                }
                Ok(())
            }
            ExprKind::Bool { op, left, right } => match (op, right) {
                (BoolOp::Not, _) => write!(f, "!{left}"),
                (BoolOp::And, Some(r)) => write!(f, "({left} && {r})"),
                (BoolOp::Or, Some(r)) => write!(f, "({left} || {r})"),
                (BoolOp::Equal, Some(r)) => write!(f, "({left} == {r})"),
                (BoolOp::NotEqual, Some(r)) => write!(f, "({left} != {r})"),
                (_, None) => unreachable!("non-Not BoolOp must carry a right operand"),
            },
            ExprKind::If { cond, yes, no } => write!(f, "if ({cond}) then {yes} else {no}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_flattens_nested_lists() {
        let inner = Expr::list(vec![Expr::literal("a"), Expr::literal("b")]);
        let outer = Expr::list(vec![inner, Expr::literal("c")]);
        match outer.kind() {
            ExprKind::List(items) => assert_eq!(items.len(), 3),
            _ => panic!("expected List"),
        }
    }

    #[test]
    #[should_panic(expected = "at least one child")]
    fn concat_rejects_empty() {
        Expr::concat(vec![]);
    }

    #[test]
    fn display_matches_original_formatting() {
        let e = Expr::concat(vec![Expr::literal("a"), Expr::literal("b")]);
        assert_eq!(e.to_string(), "ab");

        let l = Expr::list(vec![Expr::literal("a"), Expr::literal("b")]);
        assert_eq!(l.to_string(), "[a, b]");

        let r = Expr::reference("foo", ScopeHandle::Project);
        assert_eq!(r.to_string(), "$(foo)");
    }

    #[test]
    fn clone_is_cheap_handle_not_deep_copy() {
        let big = Expr::list((0..1000).map(|i| Expr::literal(i.to_string())).collect());
        let a = big.clone();
        let b = big.clone();
        assert_eq!(a, b);
    }
}
