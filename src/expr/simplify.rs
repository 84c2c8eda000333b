//! Structural simplification.

use crate::resolve::VariableResolver;

use super::{Expr, ExprKind};

/// Simplifies `expr`: fuses adjacent literals inside `Concat`, recurses
/// into `List`/`Path` children, and inlines a `Reference` that points at a
/// literal or another reference. Pure, structural, and idempotent
/// (`simplify(simplify(e)) == simplify(e)` for all `e`).
///
/// The `Reference` rule makes its inlining decision against the
/// *resolved* value, not against the reference node itself, so a reference
/// to a `List` (or anything else non-trivial) is left intact.
pub fn simplify(expr: &Expr, resolver: &dyn VariableResolver) -> Expr {
    match expr.kind() {
        ExprKind::List(items) => {
            let simplified: Vec<Expr> = items.iter().map(|i| simplify(i, resolver)).collect();
            Expr::list(simplified)
        }
        ExprKind::Path { components, anchor } => {
            let simplified: Vec<Expr> = components.iter().map(|c| simplify(c, resolver)).collect();
            Expr::path(simplified, *anchor)
        }
        ExprKind::Concat(items) => {
            let simplified: Vec<Expr> = items.iter().map(|i| simplify(i, resolver)).collect();
            let mut fused: Vec<Expr> = Vec::with_capacity(simplified.len());
            for item in simplified {
                let merged = match (fused.last(), item.kind()) {
                    (Some(last), ExprKind::Literal(rhs)) => match last.kind() {
                        ExprKind::Literal(lhs) => Some(format!("{lhs}{rhs}")),
                        _ => None,
                    },
                    _ => None,
                };
                match merged {
                    Some(fused_str) => {
                        *fused.last_mut().unwrap() = Expr::literal(fused_str);
                    }
                    None => fused.push(item),
                }
            }
            Expr::concat(fused)
        }
        ExprKind::Reference { name, scope } => {
            match resolver.resolve_value(*scope, name) {
                Some(resolved) => match resolved.kind() {
                    ExprKind::Literal(_) | ExprKind::Reference { .. } => resolved,
                    _ => expr.clone(),
                },
                None => expr.clone(),
            }
        }
        _ => expr.clone(),
    }
}
