//! Error types for the Bakefile interpreter pipeline.
//!
//! This module defines the error kinds raised by the expression algebra,
//! the AST-to-model builder, and the dependency ledger, each carrying a
//! source [`Position`] where one is known.
//!
//! # Example
//!
//! ```rust
//! use bakefile_core::error::Error;
//! use bakefile_core::pos::Position;
//!
//! let err = Error::ParserError {
//!     message: "unknown variable \"x\"".to_string(),
//!     pos: Some(Position::new("proj.bkl", 3, 1)),
//! };
//!
//! assert!(err.to_string().contains("unknown variable"));
//! ```

use thiserror::Error;

use crate::pos::Position;

/// Errors raised anywhere in the interpreter pipeline.
///
/// This is not a type hierarchy of exception classes, just a flat enum
/// dispatched on by callers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Semantic error in user input: unknown variable, duplicate target,
    /// invalid configuration base, type mismatch on append, conditional
    /// submodule, unknown target type. Fatal to the current build.
    #[error("{message}{}", pos.as_ref().map(|p| format!(" ({p})")).unwrap_or_default())]
    ParserError {
        /// Human-readable description of the violated rule.
        message: String,
        /// Location of the offending AST node, when known.
        pos: Option<Position>,
    },

    /// Raised by [`crate::expr::as_native`] when an expression cannot be
    /// reduced to a native value at configure time. Callers that tolerate
    /// late binding (back-ends, the builder's own property defaults) catch
    /// this and fall back to leaving the expression symbolic.
    #[error("expression is not constant and cannot be evaluated yet")]
    NonConstant {
        /// Location of the non-constant expression, when known.
        pos: Option<Position>,
    },

    /// Raised by [`crate::expr::split`] for operands that cannot be split
    /// along a delimiter (anything other than `Literal`, `Reference`, or
    /// `Concat`).
    #[error("don't know how to split this expression")]
    CannotSplit {
        /// Location of the unsplittable expression, when known.
        pos: Option<Position>,
    },

    /// The dependency ledger file is unreadable or was written under a
    /// different format version. Non-fatal: callers treat this as "no
    /// prior knowledge" and proceed as if no ledger existed.
    #[error("could not load dependency ledger: {reason}")]
    LoadError {
        /// Description of why the load failed.
        reason: String,
    },

    /// The output writer failed to persist a generated file. Fatal.
    #[error("I/O error writing {path}: {reason}")]
    IOError {
        /// Path of the file that failed to write.
        path: String,
        /// Description of the underlying I/O failure.
        reason: String,
    },
}

impl Error {
    /// Returns the source position carried by this error, if any.
    ///
    /// `LoadError` and `IOError` never carry a source position: the former
    /// concerns a ledger file, the latter a generated output file, neither
    /// of which is a `.bkl` source location.
    pub fn pos(&self) -> Option<&Position> {
        match self {
            Error::ParserError { pos, .. } => pos.as_ref(),
            Error::NonConstant { pos } => pos.as_ref(),
            Error::CannotSplit { pos } => pos.as_ref(),
            Error::LoadError { .. } | Error::IOError { .. } => None,
        }
    }

    /// Attaches a position to this error if it doesn't already carry one.
    ///
    /// Used by the builder to implement its position-propagation policy:
    /// attach a position when crossing an AST node boundary, then
    /// re-raise, without overwriting a more specific position set closer
    /// to the actual fault.
    pub fn with_pos_if_missing(mut self, pos: Position) -> Self {
        let slot = match &mut self {
            Error::ParserError { pos, .. } => Some(pos),
            Error::NonConstant { pos } => Some(pos),
            Error::CannotSplit { pos } => Some(pos),
            Error::LoadError { .. } | Error::IOError { .. } => None,
        };
        if let Some(slot) = slot {
            if slot.is_none() {
                *slot = Some(pos);
            }
        }
        self
    }

    /// Convenience constructor for a `ParserError` without a position.
    pub fn parser(message: impl Into<String>) -> Self {
        Error::ParserError {
            message: message.into(),
            pos: None,
        }
    }

    /// Convenience constructor for a `ParserError` with a position.
    pub fn parser_at(message: impl Into<String>, pos: Position) -> Self {
        Error::ParserError {
            message: message.into(),
            pos: Some(pos),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// A non-fatal diagnostic: reported, but does not abort the build.
///
/// Today the only producer is the underscore-prefixed-variable-name check
/// in the assignment handler, but the shape allows additional warning
/// producers to slot in without changing the collection protocol.
#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    /// Human-readable message.
    pub message: String,
    /// Location the warning pertains to, when known.
    pub pos: Option<Position>,
}

impl Warning {
    /// Creates a new warning.
    pub fn new(message: impl Into<String>, pos: Option<Position>) -> Self {
        Self {
            message: message.into(),
            pos,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parser_error_formats_with_position() {
        let err = Error::parser_at("unknown variable \"x\"", Position::new("a.bkl", 1, 2));
        assert_eq!(err.to_string(), "unknown variable \"x\" (a.bkl:1:2)");
    }

    #[test]
    fn parser_error_formats_without_position() {
        let err = Error::parser("unknown variable \"x\"");
        assert_eq!(err.to_string(), "unknown variable \"x\"");
    }

    #[test]
    fn with_pos_if_missing_only_fills_empty_slot() {
        let err = Error::NonConstant { pos: None };
        let err = err.with_pos_if_missing(Position::in_file("a.bkl"));
        assert_eq!(err.pos().unwrap().filename.as_deref(), Some("a.bkl"));

        let err = err.with_pos_if_missing(Position::in_file("b.bkl"));
        assert_eq!(err.pos().unwrap().filename.as_deref(), Some("a.bkl"));
    }

    #[test]
    fn load_error_has_no_position() {
        let err = Error::LoadError {
            reason: "version mismatch".to_string(),
        };
        assert!(err.pos().is_none());
    }
}
