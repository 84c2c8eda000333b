//! The builder's active-condition stack.
//!
//! Tracks the conjunction of all enclosing `if`-block conditions so that
//! assignments and file-list entries can be wrapped in the right condition
//! expression. `reset`/`restore` let a target body start with a clean
//! stack without losing the enclosing conditions once the target is done
//! being built.

use crate::expr::{BoolOp, Expr};

/// An opaque save-point produced by [`ConditionStack::reset`].
///
/// Carries the entries removed by `reset`, so `restore` can re-push them
/// verbatim. This only works correctly if `reset`/`restore` pairs nest with
/// respect to `push`/`pop`, which callers must guarantee.
#[derive(Debug)]
pub struct ResetToken(Vec<Expr>);

/// Tracks nested `if`-block conditions during AST-to-model lowering.
#[derive(Debug, Default)]
pub struct ConditionStack {
    entries: Vec<Expr>,
}

impl ConditionStack {
    /// An empty stack.
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Descends into a new `if`-block, recording `cond`.
    pub fn push(&mut self, cond: Expr) {
        self.entries.push(cond);
    }

    /// Leaves the innermost `if`-block.
    ///
    /// Panics if the stack is empty — callers must balance every `push`
    /// with a `pop`; an unbalanced pop is a builder bug, not a user-input
    /// error.
    pub fn pop(&mut self) {
        self.entries.pop().expect("pop() without matching push()");
    }

    /// The single composite condition of all active `if`-blocks, or `None`
    /// if the stack is empty.
    ///
    /// More than one entry is conjoined left-to-right with `BoolOp::And`.
    pub fn active(&self) -> Option<Expr> {
        let mut iter = self.entries.iter().cloned();
        let first = iter.next()?;
        Some(iter.fold(first, |acc, cond| Expr::bool_op(BoolOp::And, acc, cond)))
    }

    /// Saves the current stack and clears it, returning a token that
    /// restores it later. Used when entering a target body, so conditions
    /// accumulated inside the target don't leak back out once it's built.
    pub fn reset(&mut self) -> ResetToken {
        ResetToken(std::mem::take(&mut self.entries))
    }

    /// Restores a stack previously cleared by `reset`.
    ///
    /// Only valid immediately after the matching `reset` (the stack must
    /// still be empty and unmodified in between). `token` is consumed by
    /// value so it cannot be reused.
    pub fn restore(&mut self, token: ResetToken) {
        debug_assert!(
            self.entries.is_empty(),
            "restore() called with entries pushed since the matching reset()"
        );
        self.entries = token.0;
    }

    /// `true` iff no `if`-block is currently active.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
