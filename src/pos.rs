//! Source position tracking.
//!
//! Every AST node and every [`crate::expr::Expr`] carries an optional
//! [`Position`]. Components are individually optional because some
//! producers (synthetic expressions built by the builder itself, such as
//! the `config == "Name"` condition) don't have a meaningful source location.

use std::fmt;

#[cfg(feature = "serde_json")]
use serde::{Deserialize, Serialize};

/// Location of a node in the original `.bkl` source.
///
/// All three components are independently optional: a position built by the
/// builder for a synthesized expression may carry only a filename, or
/// nothing at all.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde_json", derive(Serialize, Deserialize))]
pub struct Position {
    /// Source file name, if known.
    pub filename: Option<String>,
    /// 1-indexed line number, if known.
    pub line: Option<u32>,
    /// 1-indexed column number, if known.
    pub column: Option<u32>,
}

impl Position {
    /// Creates a fully specified position.
    pub fn new(filename: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            filename: Some(filename.into()),
            line: Some(line),
            column: Some(column),
        }
    }

    /// Creates a position carrying only a filename.
    pub fn in_file(filename: impl Into<String>) -> Self {
        Self {
            filename: Some(filename.into()),
            line: None,
            column: None,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.filename, self.line, self.column) {
            (Some(file), Some(line), Some(col)) => write!(f, "{file}:{line}:{col}"),
            (Some(file), Some(line), None) => write!(f, "{file}:{line}"),
            (Some(file), None, None) => write!(f, "{file}"),
            _ => write!(f, "<unknown position>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_full_position() {
        let pos = Position::new("proj.bkl", 3, 5);
        assert_eq!(pos.to_string(), "proj.bkl:3:5");
    }

    #[test]
    fn display_unknown_position() {
        let pos = Position::default();
        assert_eq!(pos.to_string(), "<unknown position>");
    }
}
