//! Scope tree and binding records.
//!
//! Scopes form a tree but live in a flat arena addressed by `ScopeId`, so
//! parent/child links are plain integers rather than owning references.

use crate::intern::Symbol;
use crate::syntax::span::Span;
use indexmap::IndexMap;

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct ScopeId(pub u32);

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct BindingId(pub u32);

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ScopeKind {
    Module,
    Function,
    Block,
    ClassBody,
    Catch,
    With,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BindingKind {
    Var,
    Let,
    Const,
    Function,
    Class,
    Import,
    Param,
    CatchParam,
    Builtin,
}

impl BindingKind {
    pub fn is_block_scoped(&self) -> bool {
        matches!(self, BindingKind::Let | BindingKind::Const | BindingKind::Class)
    }

    /// Kinds that merge on re-declaration instead of conflicting.
    pub fn merges_with(&self, other: BindingKind) -> bool {
        let mergeable = |k: BindingKind| {
            matches!(
                k,
                BindingKind::Var | BindingKind::Function | BindingKind::Param
            )
        };
        mergeable(*self) && mergeable(other)
    }
}

#[derive(Debug)]
pub struct Binding {
    pub name: Symbol,
    pub kind: BindingKind,
    pub declared_at: Span,
    pub scope: ScopeId,
    pub references: Vec<Span>,
    pub assignments: u32,
    pub captured: bool,
    pub hoisted: bool,
}

#[derive(Debug)]
pub struct Scope {
    pub id: ScopeId,
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    pub bindings: IndexMap<Symbol, BindingId>,
    /// Index of the enclosing function scope (or self, for function and
    /// module scopes). Used to decide whether a reference is a capture.
    pub function: ScopeId,
}

#[derive(Debug, Default)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
    bindings: Vec<Binding>,
}

impl ScopeArena {
    pub fn new() -> ScopeArena {
        ScopeArena::default()
    }

    pub fn push_scope(&mut self, kind: ScopeKind, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        let function = match kind {
            ScopeKind::Module | ScopeKind::Function => id,
            _ => parent.map(|p| self.scope(p).function).unwrap_or(id),
        };
        self.scopes.push(Scope {
            id,
            kind,
            parent,
            children: Vec::new(),
            bindings: IndexMap::new(),
            function,
        });
        if let Some(parent) = parent {
            self.scopes[parent.0 as usize].children.push(id);
        }
        id
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    pub fn binding(&self, id: BindingId) -> &Binding {
        &self.bindings[id.0 as usize]
    }

    pub fn binding_mut(&mut self, id: BindingId) -> &mut Binding {
        &mut self.bindings[id.0 as usize]
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// Declare `name` in `scope`. Returns the (possibly pre-existing, when
    /// kinds merge) binding together with a conflict marker for duplicate
    /// block-scoped declarations.
    pub fn declare(
        &mut self,
        scope: ScopeId,
        name: Symbol,
        kind: BindingKind,
        declared_at: Span,
        hoisted: bool,
    ) -> (BindingId, bool) {
        if let Some(&existing) = self.scope(scope).bindings.get(&name) {
            let existing_kind = self.binding(existing).kind;
            if existing_kind.merges_with(kind) {
                return (existing, false);
            }
            return (existing, true);
        }

        let id = BindingId(self.bindings.len() as u32);
        self.bindings.push(Binding {
            name,
            kind,
            declared_at,
            scope,
            references: Vec::new(),
            assignments: 0,
            captured: false,
            hoisted,
        });
        self.scopes[scope.0 as usize].bindings.insert(name, id);
        (id, false)
    }

    /// Resolve `name` starting at `scope`, walking parents.
    pub fn lookup(&self, scope: ScopeId, name: Symbol) -> Option<BindingId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = self.scope(id);
            if let Some(&binding) = scope.bindings.get(&name) {
                return Some(binding);
            }
            current = scope.parent;
        }
        None
    }

    /// The nearest enclosing scope `var` declarations hoist into.
    pub fn var_scope_of(&self, scope: ScopeId) -> ScopeId {
        self.scope(scope).function
    }

    /// Record a reference from `from_scope`, updating capture information.
    pub fn reference(&mut self, binding: BindingId, site: Span, from_scope: ScopeId) {
        let from_function = self.scope(from_scope).function;
        let binding_function = {
            let b = self.binding(binding);
            self.scope(b.scope).function
        };
        let b = self.binding_mut(binding);
        b.references.push(site);
        if from_function != binding_function {
            b.captured = true;
        }
    }

    /// True when `name` is bound as `let`/`const` in any scope strictly
    /// between `from` (inclusive) and `until` (exclusive ancestor).
    pub fn block_scoped_between(&self, from: ScopeId, until: ScopeId, name: Symbol) -> bool {
        let mut current = Some(from);
        while let Some(id) = current {
            if id == until {
                break;
            }
            let scope = self.scope(id);
            if let Some(&binding) = scope.bindings.get(&name) {
                if self.binding(binding).kind.is_block_scoped() {
                    return true;
                }
            }
            current = scope.parent;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::intern;
    use crate::syntax::span::Span;

    #[test]
    fn var_redeclarations_merge_and_let_conflicts() {
        let mut arena = ScopeArena::new();
        let root = arena.push_scope(ScopeKind::Module, None);
        let name = intern("x");

        let (first, conflict) =
            arena.declare(root, name, BindingKind::Var, Span::initial(), true);
        assert!(!conflict);
        let (second, conflict) =
            arena.declare(root, name, BindingKind::Var, Span::initial(), true);
        assert!(!conflict);
        assert_eq!(first, second);

        let other = intern("y");
        arena.declare(root, other, BindingKind::Let, Span::initial(), false);
        let (_, conflict) = arena.declare(root, other, BindingKind::Let, Span::initial(), false);
        assert!(conflict);
    }

    #[test]
    fn references_across_functions_mark_capture() {
        let mut arena = ScopeArena::new();
        let root = arena.push_scope(ScopeKind::Module, None);
        let inner = arena.push_scope(ScopeKind::Function, Some(root));
        let name = intern("x");
        let (binding, _) = arena.declare(root, name, BindingKind::Var, Span::initial(), true);

        arena.reference(binding, Span::initial(), root);
        assert!(!arena.binding(binding).captured);
        arena.reference(binding, Span::initial(), inner);
        assert!(arena.binding(binding).captured);
    }
}
