//! Evaluation of expressions to native values.

use crate::error::{Error, Result};
use crate::resolve::VariableResolver;

use super::{Expr, ExprKind};

/// A materialized expression value, the result of [`as_native`].
#[derive(Debug, Clone, PartialEq)]
pub enum NativeValue {
    /// A string (also used for materialized paths).
    Str(String),
    /// A terminal boolean, distinct from a stringly-typed `Str`.
    Bool(bool),
    /// A sequence of native values.
    List(Vec<NativeValue>),
    /// The unset value.
    Null,
}

/// Information needed to materialize an expression that depends on where
/// in the output tree it's being evaluated.
///
/// The directory separator, current output directory (relative,
/// forward-slash), and top source directory. All back-end specific; the
/// core only carries these values through.
#[derive(Debug, Clone)]
pub struct EvalContext {
    /// Path component separator for the target toolset (`/` or `\`).
    pub dirsep: char,
    /// Current output directory, relative, forward-slash-separated.
    pub outdir: String,
    /// Top source directory, in native path syntax.
    pub topdir: String,
}

impl EvalContext {
    /// A context using Unix conventions, with an empty `outdir`/`topdir`.
    pub fn unix() -> Self {
        Self {
            dirsep: '/',
            outdir: String::new(),
            topdir: String::new(),
        }
    }
}

/// Reduces `expr` to a [`NativeValue`] if it is constant at configure time.
///
/// `Reference`, `Bool`, and `If` can never be materialized this way — they
/// require further resolution — and always fail with
/// [`Error::NonConstant`]. `BoolValue` is a terminal, same as `Literal`: a
/// known-at-configure-time boolean, not a condition awaiting resolution, so
/// it succeeds with [`NativeValue::Bool`].
///
/// `Path`'s anchor is *not* consulted here: components are joined with
/// `ctx.dirsep` regardless of whether the path is rooted at `@srcdir` or
/// `@top_srcdir`. Anchor-aware joining is left to a richer back end; this
/// is a deliberate, documented simplification rather than an oversight.
pub fn as_native(expr: &Expr, resolver: &dyn VariableResolver, ctx: &EvalContext) -> Result<NativeValue> {
    match expr.kind() {
        ExprKind::Literal(s) => Ok(NativeValue::Str(s.clone())),
        ExprKind::List(items) => {
            let values = items
                .iter()
                .map(|i| as_native(i, resolver, ctx))
                .collect::<Result<Vec<_>>>()?;
            Ok(NativeValue::List(values))
        }
        ExprKind::Concat(items) => {
            let mut out = String::new();
            for item in items {
                match as_native(item, resolver, ctx)? {
                    NativeValue::Str(s) => out.push_str(&s),
                    NativeValue::Bool(b) => out.push_str(if b { "true" } else { "false" }),
                    NativeValue::Null => {}
                    NativeValue::List(_) => {
                        return Err(Error::NonConstant {
                            pos: expr.pos().cloned(),
                        })
                    }
                }
            }
            Ok(NativeValue::Str(out))
        }
        ExprKind::Null => Ok(NativeValue::Null),
        ExprKind::Path { components, .. } => {
            let mut parts = Vec::with_capacity(components.len());
            for c in components {
                match as_native(c, resolver, ctx)? {
                    NativeValue::Str(s) => parts.push(s),
                    NativeValue::Bool(b) => parts.push(if b { "true".to_string() } else { "false".to_string() }),
                    NativeValue::Null => parts.push(String::new()),
                    NativeValue::List(_) => {
                        return Err(Error::NonConstant {
                            pos: expr.pos().cloned(),
                        })
                    }
                }
            }
            Ok(NativeValue::Str(parts.join(&ctx.dirsep.to_string())))
        }
        ExprKind::BoolValue(b) => Ok(NativeValue::Bool(*b)),
        ExprKind::Reference { .. } | ExprKind::Bool { .. } | ExprKind::If { .. } => Err(Error::NonConstant {
            pos: expr.pos().cloned(),
        }),
    }
}
