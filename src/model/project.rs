//! The project root: owns every module and the configuration registry.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::expr::Expr;
use crate::handle::{ModuleId, ScopeHandle, TargetId};
use crate::pos::Position;
use crate::resolve::VariableResolver;

use super::config::Configuration;
use super::module::Module;

/// The root of the model tree.
///
/// Owns a mapping of configurations by name (insertion order significant;
/// "Debug" and "Release" always exist) and the arena of modules. Target
/// ids are unique project-wide, so the uniqueness registry lives here
/// rather than per-module.
#[derive(Debug)]
pub struct Project {
    modules: Vec<Module>,
    configurations: Vec<Configuration>,
    configuration_index: HashMap<String, usize>,
    target_names: HashMap<String, (ModuleId, TargetId, Option<Position>)>,
}

impl Project {
    /// Creates an empty project, seeded with the predefined "Debug" and
    /// "Release" configurations.
    pub fn new() -> Self {
        let mut project = Self {
            modules: Vec::new(),
            configurations: Vec::new(),
            configuration_index: HashMap::new(),
            target_names: HashMap::new(),
        };
        project.register_configuration(Configuration::predefined("Debug"));
        project.register_configuration(Configuration::predefined("Release"));
        project
    }

    fn register_configuration(&mut self, config: Configuration) {
        self.configuration_index
            .insert(config.name().to_string(), self.configurations.len());
        self.configurations.push(config);
    }

    /// Appends a new module, returning its id.
    pub fn add_module(&mut self, module: Module) -> ModuleId {
        let id = ModuleId(self.modules.len());
        self.modules.push(module);
        id
    }

    /// Looks up a module by id.
    pub fn module(&self, id: ModuleId) -> Option<&Module> {
        self.modules.get(id.0)
    }

    /// Mutable lookup of a module by id.
    pub fn module_mut(&mut self, id: ModuleId) -> Option<&mut Module> {
        self.modules.get_mut(id.0)
    }

    /// All modules in the project, in the order they were added.
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// `true` iff a configuration named `name` already exists.
    pub fn has_configuration(&self, name: &str) -> bool {
        self.configuration_index.contains_key(name)
    }

    /// Looks up a configuration by name.
    pub fn get_configuration(&self, name: &str) -> Option<&Configuration> {
        let &idx = self.configuration_index.get(name)?;
        self.configurations.get(idx)
    }

    /// All configurations, in insertion order ("Debug", "Release", then
    /// every user-declared configuration in declaration order).
    pub fn configurations(&self) -> &[Configuration] {
        &self.configurations
    }

    /// Registers a new, non-predefined configuration with base `base_name`.
    ///
    /// Errors if the base is unknown or the name already exists. The
    /// caller is responsible for building the cloned
    /// definition (base's definition followed by its own) before calling
    /// this, since that requires reading `base_name`'s definition first.
    pub fn declare_configuration(
        &mut self,
        name: &str,
        base_name: &str,
        own_definition: Vec<crate::ast::Node<crate::ast::StatementAst>>,
        pos: Option<Position>,
    ) -> Result<()> {
        if self.has_configuration(name) {
            return Err(Error::ParserError {
                message: format!("configuration \"{name}\" already exists"),
                pos,
            });
        }
        let base_definition = self
            .get_configuration(base_name)
            .ok_or_else(|| Error::ParserError {
                message: format!("unknown base configuration \"{base_name}\""),
                pos: pos.clone(),
            })?
            .definition()
            .to_vec();
        let config = Configuration::derived(name, base_name, &base_definition, own_definition);
        self.register_configuration(config);
        Ok(())
    }

    /// `true` iff a target named `name` has already been registered
    /// anywhere in the project.
    pub fn has_target(&self, name: &str) -> bool {
        self.target_names.contains_key(name)
    }

    /// The position of the existing registration of `name`, if any —
    /// used to build the "duplicate target" error message.
    pub fn existing_target_pos(&self, name: &str) -> Option<&Position> {
        self.target_names.get(name).and_then(|(_, _, pos)| pos.as_ref())
    }

    /// Registers a newly created target's name as taken project-wide.
    ///
    /// Callers must check [`Project::has_target`] first; this does not
    /// re-check uniqueness itself, since the caller needs the existing
    /// position to build the error *before* deciding whether to register.
    pub fn register_target(&mut self, name: &str, module: ModuleId, target: TargetId, pos: Option<Position>) {
        self.target_names.insert(name.to_string(), (module, target, pos));
    }

    /// Looks up a registered target by its project-wide-unique name.
    pub fn find_target(&self, name: &str) -> Option<(ModuleId, TargetId)> {
        self.target_names.get(name).map(|(m, t, _)| (*m, *t))
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

impl VariableResolver for Project {
    /// Walks from `scope` toward the root, returning the first matching
    /// variable's value. A `Target` falls back to its owning `Module`; a
    /// `Module` falls back to `Project`, which has no variable environment
    /// of its own, so the walk ends there.
    fn resolve_value(&self, scope: ScopeHandle, name: &str) -> Option<Expr> {
        match scope {
            ScopeHandle::Target(module_id, target_id) => {
                let module = self.module(module_id)?;
                if let Some(target) = module.target(target_id) {
                    if let Some(var) = target.get_variable(name) {
                        return Some(var.value().clone());
                    }
                }
                module.get_variable(name).map(|v| v.value().clone())
            }
            ScopeHandle::Module(module_id) => self
                .module(module_id)
                .and_then(|m| m.get_variable(name))
                .map(|v| v.value().clone()),
            ScopeHandle::Project => None,
        }
    }
}
