//! Project-level build configurations (e.g. Debug, Release, Fast).

use crate::ast::{Node, StatementAst};

/// A build configuration registered on a [`super::Project`].
///
/// Configurations are indexed by insertion order; a non-base configuration
/// is cloned from its base — inheriting the base's definition AST — with
/// its own definition appended.
#[derive(Debug, Clone)]
pub struct Configuration {
    name: String,
    base: Option<String>,
    definition: Vec<Node<StatementAst>>,
}

impl Configuration {
    /// Creates one of the two predefined configurations, "Debug" or
    /// "Release", which may not declare a base.
    pub fn predefined(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: None,
            definition: Vec::new(),
        }
    }

    /// Creates a configuration inheriting `base`'s definition, with
    /// `own_definition` appended after it.
    pub fn derived(
        name: impl Into<String>,
        base: impl Into<String>,
        base_definition: &[Node<StatementAst>],
        own_definition: Vec<Node<StatementAst>>,
    ) -> Self {
        let mut definition = base_definition.to_vec();
        definition.extend(own_definition);
        Self {
            name: name.into(),
            base: Some(base.into()),
            definition,
        }
    }

    /// The configuration's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The base configuration's name, if any.
    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    /// The full definition — inherited statements followed by this
    /// configuration's own, for a derived configuration.
    pub fn definition(&self) -> &[Node<StatementAst>] {
        &self.definition
    }
}
