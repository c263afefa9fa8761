//! Scope and binding analysis.
//!
//! A single source-order pass builds the scope tree, resolves every
//! identifier reference to a binding (or marks it unresolved-global),
//! classifies `this` per function, and flags the dynamic patterns the
//! transformer must treat conservatively.

mod binder;
pub mod scope;

pub use binder::bound_names;
pub use scope::{Binding, BindingId, BindingKind, Scope, ScopeArena, ScopeId, ScopeKind};

use crate::diagnostics::Diagnostic;
use crate::syntax::ast::Program;
use crate::syntax::span::Span;
use crate::syntax::Mode;
use fnv::{FnvHashMap, FnvHashSet};

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum RiskKind {
    Eval,
    With,
    Arguments,
    PrototypeMutation,
    DynamicWrite,
    DeleteComputed,
    ComplexDestructuring,
    TopLevelThis,
    SparseArray,
    AmbiguousRef,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ModuleShape {
    Script,
    Esm,
    CommonJs,
    Mixed,
}

impl ModuleShape {
    /// Whether the export footer follows ES-module semantics.
    pub fn esm_exports(&self) -> bool {
        matches!(self, ModuleShape::Esm | ModuleShape::Mixed)
    }
}

#[derive(Debug)]
pub struct AnalysisResult {
    pub scopes: ScopeArena,
    /// Identifier site (declaration or reference) to its binding.
    pub bindings: FnvHashMap<Span, BindingId>,
    pub risks: FnvHashSet<(Span, RiskKind)>,
    /// Spans of plain functions observed used as constructors.
    pub constructor_fns: FnvHashSet<Span>,
    pub has_prototype_mutation: bool,
    pub module_shape: ModuleShape,
    pub diagnostics: Vec<Diagnostic>,
}

impl AnalysisResult {
    pub fn resolve(&self, site: Span) -> Option<&Binding> {
        self.bindings.get(&site).map(|&id| self.scopes.binding(id))
    }

    pub fn has_risk(&self, span: Span, kind: RiskKind) -> bool {
        self.risks.contains(&(span, kind))
    }
}

pub fn analyze(program: &Program, mode: Mode, file: &str) -> AnalysisResult {
    binder::Binder::new(file).analyze(program, mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{self, Mode};

    fn analyzed(source: &str) -> AnalysisResult {
        let out = syntax::parse(source, "t.js", Mode::Script, false).unwrap();
        analyze(&out.program, Mode::Script, "t.js")
    }

    fn analyzed_module(source: &str) -> AnalysisResult {
        let out = syntax::parse(source, "t.js", Mode::Module, false).unwrap();
        analyze(&out.program, Mode::Module, "t.js")
    }

    #[test]
    fn resolves_local_references() {
        let analysis = analyzed("var x = 1; x + x;");
        // One declaration site and two reference sites map to one binding.
        assert_eq!(analysis.scopes.binding_count(), 1);
        let binding = analysis.scopes.binding(BindingId(0));
        assert_eq!(binding.references.len(), 2);
        assert_eq!(binding.kind, BindingKind::Var);
        assert!(binding.hoisted);
    }

    #[test]
    fn duplicate_let_is_an_error() {
        let analysis = analyzed("let a = 1; let a = 2;");
        assert!(analysis
            .diagnostics
            .iter()
            .any(|d| d.code == crate::diagnostics::codes::DUP_BINDING));
    }

    #[test]
    fn var_merges_with_var() {
        let analysis = analyzed("var a = 1; var a = 2;");
        assert!(!analysis
            .diagnostics
            .iter()
            .any(|d| d.code == crate::diagnostics::codes::DUP_BINDING));
    }

    #[test]
    fn inner_var_shadowing_let_warns() {
        let analysis = analyzed("function f() { let x = 1; { if (x) { var y; } } { var x2; } }");
        // Not a shadow; control case.
        assert!(!analysis
            .diagnostics
            .iter()
            .any(|d| d.code == crate::diagnostics::codes::VAR_SHADOW));

        let analysis = analyzed("function f() { { let x = 1; { var x; } } }");
        assert!(analysis
            .diagnostics
            .iter()
            .any(|d| d.code == crate::diagnostics::codes::VAR_SHADOW));
    }

    #[test]
    fn unresolved_global_is_info_unless_builtin() {
        let analysis = analyzed("console.log(somethingUnknown);");
        let unresolved: Vec<_> = analysis
            .diagnostics
            .iter()
            .filter(|d| d.code == crate::diagnostics::codes::UNRESOLVED)
            .collect();
        assert_eq!(unresolved.len(), 1);
        assert!(unresolved[0].message.contains("somethingUnknown"));
    }

    #[test]
    fn captured_bindings_are_marked() {
        let analysis = analyzed("function f() { var n = 0; return function () { return n; }; }");
        let captured = (0..analysis.scopes.binding_count())
            .map(|i| analysis.scopes.binding(BindingId(i as u32)))
            .find(|b| b.name.as_str() == "n")
            .unwrap();
        assert!(captured.captured);
    }

    #[test]
    fn new_callee_classifies_constructor() {
        let analysis = analyzed("function Dog(name) { this.name = name; } var d = new Dog('rex');");
        assert_eq!(analysis.constructor_fns.len(), 1);
        // Constructor `this` must not produce the ordinary-this warning.
        assert!(!analysis
            .diagnostics
            .iter()
            .any(|d| d.code == crate::diagnostics::codes::THIS));
    }

    #[test]
    fn with_flags_scope_and_warns() {
        let analysis = analyzed("with (o) { a = 1; }");
        assert!(analysis
            .diagnostics
            .iter()
            .any(|d| d.code == crate::diagnostics::codes::WITH));
        assert!(analysis
            .risks
            .iter()
            .any(|&(_, kind)| kind == RiskKind::AmbiguousRef));
    }

    #[test]
    fn module_shape_detection() {
        assert_eq!(analyzed("var x = 1;").module_shape, ModuleShape::Script);
        assert_eq!(
            analyzed("var fs = require('fs');").module_shape,
            ModuleShape::CommonJs
        );
        assert_eq!(
            analyzed_module("import x from 'm'; export { x };").module_shape,
            ModuleShape::Esm
        );
        assert_eq!(
            analyzed_module("import x from 'm'; var y = require('z');").module_shape,
            ModuleShape::Mixed
        );
    }

    #[test]
    fn prototype_write_sets_module_flag() {
        let analysis = analyzed("function A() {} A.prototype.go = function () { return 1; };");
        assert!(analysis.has_prototype_mutation);
        assert!(analysis
            .risks
            .iter()
            .any(|&(_, kind)| kind == RiskKind::PrototypeMutation));
    }
}
