//! Splitting path-like expressions along a delimiter.

use crate::error::{Error, Result};
use crate::resolve::VariableResolver;

use super::{Expr, ExprKind};

/// Splits `expr` into a sequence of expressions along the delimiter `sep`.
///
/// Used to explode path-like literals into components. `Literal` and
/// `Reference` split directly (a reference splits whatever it resolves
/// to); `Concat` splits each child and re-splices across the boundary so
/// the last segment of one child and the first segment of the next merge
/// into a single `Concat` — splitting `"foo/bar" ++ "x/y"` by `/` yields
/// `["foo", "bar"++"x", "y"]`. Any other variant fails with
/// [`Error::CannotSplit`].
pub fn split(expr: &Expr, resolver: &dyn VariableResolver, sep: char) -> Result<Vec<Expr>> {
    match expr.kind() {
        ExprKind::Literal(s) => Ok(s.split(sep).map(Expr::literal).collect()),
        ExprKind::Reference { name, scope } => match resolver.resolve_value(*scope, name) {
            Some(resolved) => split(&resolved, resolver, sep),
            None => Err(Error::CannotSplit {
                pos: expr.pos().cloned(),
            }),
        },
        ExprKind::Concat(items) => {
            let mut out: Vec<Expr> = Vec::new();
            for item in items {
                let mut item_out = split(item, resolver, sep)?;
                if out.is_empty() {
                    out = item_out;
                } else {
                    let last = out.pop().expect("checked non-empty above");
                    let first = item_out.remove(0);
                    out.push(Expr::concat(vec![last, first]));
                    out.extend(item_out);
                }
            }
            Ok(out)
        }
        _ => Err(Error::CannotSplit {
            pos: expr.pos().cloned(),
        }),
    }
}
