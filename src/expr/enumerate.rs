//! Enumeration of all possible constant values of a non-constant expression.

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::resolve::VariableResolver;

use super::{Expr, ExprKind};

/// Expands `expr` into every constant form it might take.
///
/// A bare top-level `List` is rejected — callers must use [`all_elements`]
/// for lists, since the cartesian product of "all possible lists" is
/// almost never what's wanted. A `Reference` that resolves to a `List`,
/// though, is exactly the multi-valued case this function exists for: each
/// element is itself expanded and the results concatenated, so a
/// list-valued variable used inside a `Concat`/`Path` contributes one
/// alternative per element to the surrounding cartesian product.
///
/// This eagerly materializes the sequence (a `Vec`) rather than returning a
/// true lazy iterator: expanding a `Concat`/`Path` is already a cartesian
/// product computed up front, so there is no meaningful laziness to
/// preserve once the parent has been visited, and a `Vec` keeps the
/// borrow-checking straightforward for recursive call sites.
pub fn all_values(expr: &Expr, resolver: &dyn VariableResolver) -> Result<Vec<Expr>> {
    match expr.kind() {
        ExprKind::Literal(_) => Ok(vec![expr.clone()]),
        ExprKind::Reference { name, scope } => match resolver.resolve_value(*scope, name) {
            Some(resolved) => match resolved.kind() {
                ExprKind::List(items) => {
                    let mut out = Vec::with_capacity(items.len());
                    for item in items {
                        out.extend(all_values(item, resolver)?);
                    }
                    Ok(out)
                }
                _ => all_values(&resolved, resolver),
            },
            None => Err(Error::parser_at(
                format!("unresolved reference \"{name}\""),
                expr.pos().cloned().unwrap_or_default(),
            )),
        },
        ExprKind::Concat(items) => {
            let per_item: Vec<Vec<Expr>> = items
                .iter()
                .map(|i| all_values(i, resolver))
                .collect::<Result<_>>()?;
            Ok(cartesian_product(&per_item)
                .into_iter()
                .map(Expr::concat)
                .collect())
        }
        ExprKind::Path { components, anchor } => {
            let per_item: Vec<Vec<Expr>> = components
                .iter()
                .map(|c| all_values(c, resolver))
                .collect::<Result<_>>()?;
            Ok(cartesian_product(&per_item)
                .into_iter()
                .map(|combo| Expr::path(combo, *anchor))
                .collect())
        }
        ExprKind::List(_) => Err(Error::parser_at(
            "use all_elements() with lists, not all_values()",
            expr.pos().cloned().unwrap_or_default(),
        )),
        _ => Err(Error::parser_at(
            "cannot determine all possible values of this expression",
            expr.pos().cloned().unwrap_or_default(),
        )),
    }
}

fn cartesian_product(groups: &[Vec<Expr>]) -> Vec<Vec<Expr>> {
    groups.iter().fold(vec![vec![]], |acc, group| {
        acc.into_iter()
            .flat_map(|prefix| {
                group.iter().map(move |item| {
                    let mut combo = prefix.clone();
                    combo.push(item.clone());
                    combo
                })
            })
            .collect()
    })
}

/// Yields the deduplicated (by textual representation) elements of a
/// `List` expression, dereferencing a `Reference` encountered directly in
/// the list and asserting no nested `List` remains (the builder flattens
/// lists before constructing them).
pub fn all_elements(list_expr: &Expr, resolver: &dyn VariableResolver) -> Result<Vec<Expr>> {
    let items = match list_expr.kind() {
        ExprKind::List(items) => items,
        _ => {
            return Err(Error::parser_at(
                "all_elements() requires a List expression",
                list_expr.pos().cloned().unwrap_or_default(),
            ))
        }
    };

    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    for item in items {
        let resolved = match item.kind() {
            ExprKind::Reference { name, scope } => {
                resolver.resolve_value(*scope, name).unwrap_or_else(|| item.clone())
            }
            _ => item.clone(),
        };
        assert!(
            !matches!(resolved.kind(), ExprKind::List(_)),
            "nested lists are supposed to be flattened by now"
        );

        for value in all_values(&resolved, resolver)? {
            let key = value.to_string();
            if seen.insert(key) {
                out.push(value);
            }
        }
    }

    Ok(out)
}
