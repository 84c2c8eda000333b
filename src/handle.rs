//! Stable handles into the model arenas.
//!
//! `Reference` nodes hold back-references to model scopes. Since the model
//! is only ever appended to (the builder never deletes, only appends),
//! these are modeled as arena-allocated scopes with stable indices rather
//! than owning pointers. [`ModuleId`] and [`TargetId`] are plain indices
//! into the `Vec`s owned by [`crate::model::Project`]; they stay valid for
//! the project's whole lifetime.

/// Index of a [`crate::model::Module`] within its owning
/// [`crate::model::Project`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub usize);

/// Index of a [`crate::model::Target`] within its owning
/// [`crate::model::Module`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub usize);

/// A live scope a [`crate::expr::Expr::Reference`] can be resolved against.
///
/// The three scope kinds: Project / Module / Target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeHandle {
    /// The project root.
    Project,
    /// A module, identified by its index in the project.
    Module(ModuleId),
    /// A target, identified by its owning module and its index within it.
    Target(ModuleId, TargetId),
}

impl ScopeHandle {
    /// The scope *kind* this handle refers to, used to look up registered
    /// properties by their (Project/Module/Target) scope.
    pub fn kind(self) -> ScopeKind {
        match self {
            ScopeHandle::Project => ScopeKind::Project,
            ScopeHandle::Module(_) => ScopeKind::Module,
            ScopeHandle::Target(..) => ScopeKind::Target,
        }
    }
}

/// The three scope kinds a [`crate::model::Property`] can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// Project-scoped property.
    Project,
    /// Module-scoped property.
    Module,
    /// Target-scoped property.
    Target,
}
