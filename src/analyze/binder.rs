use crate::analyze::scope::{BindingId, BindingKind, ScopeArena, ScopeId, ScopeKind};
use crate::analyze::{AnalysisResult, ModuleShape, RiskKind};
use crate::diagnostics::{codes, Diagnostic, Level};
use crate::intern::{self, Symbol};
use crate::syntax::ast::*;
use crate::syntax::span::Span;
use crate::syntax::Mode;
use fnv::{FnvHashMap, FnvHashSet};
use lazy_static::lazy_static;

lazy_static! {
    /// Host and language globals a script may reference without declaring.
    static ref BUILTINS: FnvHashSet<&'static str> = [
        "arguments",
        "Array", "Boolean", "Date", "Error", "EvalError", "Function", "Infinity", "JSON",
        "Map", "Math", "NaN", "Number", "Object", "Promise", "RangeError", "ReferenceError",
        "RegExp", "Set", "String", "Symbol", "SyntaxError", "TypeError", "URIError",
        "clearInterval", "clearTimeout", "console", "decodeURIComponent", "encodeURIComponent",
        "eval", "exports", "globalThis", "isFinite", "isNaN", "module", "parseFloat",
        "parseInt", "process", "require", "setInterval", "setTimeout", "super", "undefined",
    ]
    .iter()
    .copied()
    .collect();
}

#[derive(Debug, Clone, Copy)]
enum ThisCtx {
    Method,
    Function(Span),
}

pub struct Binder<'a> {
    file: &'a str,
    arena: ScopeArena,
    scope_stack: Vec<ScopeId>,
    diagnostics: Vec<Diagnostic>,
    bindings: FnvHashMap<Span, BindingId>,
    risks: FnvHashSet<(Span, RiskKind)>,
    fn_of_binding: FnvHashMap<BindingId, Span>,
    new_callees: FnvHashSet<BindingId>,
    proto_fns: FnvHashSet<Span>,
    ordinary_this_uses: Vec<(Span, Span)>,
    this_ctx: Vec<ThisCtx>,
    with_depth: u32,
    saw_esm: bool,
    saw_cjs: bool,
    has_prototype_mutation: bool,
}

impl<'a> Binder<'a> {
    pub fn new(file: &'a str) -> Binder<'a> {
        Binder {
            file,
            arena: ScopeArena::new(),
            scope_stack: Vec::new(),
            diagnostics: Vec::new(),
            bindings: FnvHashMap::default(),
            risks: FnvHashSet::default(),
            fn_of_binding: FnvHashMap::default(),
            new_callees: FnvHashSet::default(),
            proto_fns: FnvHashSet::default(),
            ordinary_this_uses: Vec::new(),
            this_ctx: Vec::new(),
            with_depth: 0,
            saw_esm: false,
            saw_cjs: false,
            has_prototype_mutation: false,
        }
    }

    pub fn analyze(mut self, program: &Program, mode: Mode) -> AnalysisResult {
        let root = self.arena.push_scope(ScopeKind::Module, None);
        self.scope_stack.push(root);

        self.hoist_vars(&program.body);
        self.declare_lexical(&program.body);
        for statement in &program.body {
            self.visit_statement(statement);
        }
        self.scope_stack.pop();

        // Constructor classification needs the whole-file view, so ordinary
        // `this` warnings are settled last.
        let mut constructor_fns = self.proto_fns.clone();
        for binding in &self.new_callees {
            if let Some(&span) = self.fn_of_binding.get(binding) {
                constructor_fns.insert(span);
            }
        }
        for &(site, fn_span) in &self.ordinary_this_uses {
            if !constructor_fns.contains(&fn_span) {
                self.diagnostics.push(Diagnostic::new(
                    self.file,
                    site,
                    Level::Warn,
                    codes::THIS,
                    "'this' in an ordinary function has no stable binding after translation",
                ));
            }
        }

        let module_shape = match (self.saw_esm || mode == Mode::Module, self.saw_cjs) {
            (true, true) => {
                self.diagnostics.push(Diagnostic::new(
                    self.file,
                    program.span,
                    Level::Warn,
                    codes::MIXED_MODULES,
                    "mixed ES-module and CommonJS forms; ES-module exports win",
                ));
                ModuleShape::Mixed
            }
            (true, false) => ModuleShape::Esm,
            (false, true) => ModuleShape::CommonJs,
            (false, false) => ModuleShape::Script,
        };

        AnalysisResult {
            scopes: self.arena,
            bindings: self.bindings,
            risks: self.risks,
            constructor_fns,
            has_prototype_mutation: self.has_prototype_mutation,
            module_shape,
            diagnostics: self.diagnostics,
        }
    }

    // ------------------------------------------------------------- plumbing

    fn scope(&self) -> ScopeId {
        *self.scope_stack.last().expect("scope stack is never empty")
    }

    fn diag(&mut self, span: Span, level: Level, code: &'static str, message: impl Into<String>) {
        self.diagnostics
            .push(Diagnostic::new(self.file, span, level, code, message));
    }

    fn risk(&mut self, span: Span, kind: RiskKind) {
        self.risks.insert((span, kind));
    }

    fn declare(&mut self, id: &Id, kind: BindingKind, hoisted: bool) -> BindingId {
        let scope = if kind == BindingKind::Var {
            self.arena.var_scope_of(self.scope())
        } else {
            self.scope()
        };
        let (binding, conflict) = self.arena.declare(scope, id.1, kind, id.0, hoisted);
        if conflict {
            self.diag(
                id.0,
                Level::Error,
                codes::DUP_BINDING,
                format!("'{}' is already declared in this scope", id.1),
            );
        }
        self.bindings.insert(id.0, binding);
        binding
    }

    fn declare_names_only(&mut self, pattern: &Pattern, kind: BindingKind) {
        let mut ids = Vec::new();
        bound_names(pattern, &mut ids);
        for id in ids {
            self.declare(&id, kind, false);
        }
    }

    fn declare_pattern(&mut self, pattern: &Pattern, kind: BindingKind, hoisted: bool) {
        let mut ids = Vec::new();
        bound_names(pattern, &mut ids);
        for id in ids {
            self.declare(&id, kind, hoisted);
        }
        if pattern.is_complex() {
            self.risk(pattern.span(), RiskKind::ComplexDestructuring);
            self.diag(
                pattern.span(),
                Level::Info,
                codes::DESTRUCTURE,
                "destructuring pattern is flattened through a temporary",
            );
        }
        // Defaults are expressions and resolve in the enclosing scope.
        self.visit_pattern_defaults(pattern);
    }

    fn visit_pattern_defaults(&mut self, pattern: &Pattern) {
        match *pattern {
            Pattern::Identifier(_) => {}
            Pattern::Assignment {
                ref target,
                ref default,
                ..
            } => {
                self.visit_pattern_defaults(target);
                self.visit_expression(default);
            }
            Pattern::Array { ref elements, .. } => {
                for element in elements.iter().flatten() {
                    self.visit_pattern_defaults(element);
                }
            }
            Pattern::Object { ref properties, .. } => {
                for property in properties {
                    if let PropKey::Computed(_, ref key) = property.key {
                        self.visit_expression(key);
                    }
                    self.visit_pattern_defaults(&property.value);
                }
            }
            Pattern::Rest(_, ref inner) => self.visit_pattern_defaults(inner),
        }
    }

    fn resolve_identifier(&mut self, id: &Id) {
        if self.with_depth > 0 {
            self.risk(id.0, RiskKind::AmbiguousRef);
            return;
        }
        if let Some(binding) = self.arena.lookup(self.scope(), id.1) {
            self.arena.reference(binding, id.0, self.scope());
            self.bindings.insert(id.0, binding);
            return;
        }
        if BUILTINS.contains(id.1.as_str()) {
            // Lazily materialize a root binding so later references share it.
            let root = ScopeId(0);
            let (binding, _) = self
                .arena
                .declare(root, id.1, BindingKind::Builtin, id.0, false);
            self.arena.reference(binding, id.0, self.scope());
            self.bindings.insert(id.0, binding);
            return;
        }
        self.diag(
            id.0,
            Level::Info,
            codes::UNRESOLVED,
            format!("'{}' is not declared in this file and is not a known global", id.1),
        );
    }

    fn record_assignment(&mut self, target: &AssignTarget) {
        if let AssignTarget::Identifier(ref id) = *target {
            if let Some(&binding) = self.bindings.get(&id.0) {
                self.arena.binding_mut(binding).assignments += 1;
            }
        }
    }

    // ------------------------------------------------------------- hoisting

    /// Deep scan for `var` declarations, stopping at nested function bodies.
    fn hoist_vars(&mut self, statements: &[Statement]) {
        for statement in statements {
            self.hoist_vars_in_statement(statement);
        }
    }

    fn hoist_vars_in_statement(&mut self, statement: &Statement) {
        match *statement {
            Statement::VariableDeclaration(ref decl)
                if decl.kind == VariableDeclarationKind::Var =>
            {
                for declarator in &decl.declarations {
                    let mut ids = Vec::new();
                    bound_names(&declarator.id, &mut ids);
                    for id in ids {
                        self.declare(&id, BindingKind::Var, true);
                    }
                }
            }
            Statement::Block(ref block) => self.hoist_vars(&block.1),
            Statement::If(_, _, ref consequent, ref alternate) => {
                self.hoist_vars_in_statement(consequent);
                if let Some(ref alternate) = *alternate {
                    self.hoist_vars_in_statement(alternate);
                }
            }
            Statement::For(_, ref stmt) => {
                if let Some(ForInit::VarDecl(ref decl)) = stmt.init {
                    if decl.kind == VariableDeclarationKind::Var {
                        for declarator in &decl.declarations {
                            let mut ids = Vec::new();
                            bound_names(&declarator.id, &mut ids);
                            for id in ids {
                                self.declare(&id, BindingKind::Var, true);
                            }
                        }
                    }
                }
                self.hoist_vars_in_statement(&stmt.body);
            }
            Statement::ForIn(_, ref stmt) | Statement::ForOf(_, ref stmt) => {
                if let ForTarget::VarDecl(ref decl) = stmt.left {
                    if decl.kind == VariableDeclarationKind::Var {
                        for declarator in &decl.declarations {
                            let mut ids = Vec::new();
                            bound_names(&declarator.id, &mut ids);
                            for id in ids {
                                self.declare(&id, BindingKind::Var, true);
                            }
                        }
                    }
                }
                self.hoist_vars_in_statement(&stmt.body);
            }
            Statement::While(_, _, ref body)
            | Statement::DoWhile(_, ref body, _)
            | Statement::Labeled(_, _, ref body)
            | Statement::With(_, _, ref body) => self.hoist_vars_in_statement(body),
            Statement::Try(_, ref block, ref handler, ref finalizer) => {
                self.hoist_vars(&block.1);
                if let Some(ref handler) = *handler {
                    self.hoist_vars(&handler.body.1);
                }
                if let Some(ref finalizer) = *finalizer {
                    self.hoist_vars(&finalizer.1);
                }
            }
            Statement::Switch(_, _, ref cases) => {
                for case in cases {
                    self.hoist_vars(&case.consequent);
                }
            }
            Statement::Export(ExportDeclaration::Decl(_, ref inner)) => {
                self.hoist_vars_in_statement(inner);
            }
            _ => {}
        }
    }

    /// Shallow scan declaring the lexical names of one statement list.
    fn declare_lexical(&mut self, statements: &[Statement]) {
        for statement in statements {
            self.declare_lexical_in_statement(statement);
        }
    }

    fn declare_lexical_in_statement(&mut self, statement: &Statement) {
        match *statement {
            Statement::VariableDeclaration(ref decl)
                if decl.kind != VariableDeclarationKind::Var =>
            {
                let kind = if decl.kind == VariableDeclarationKind::Const {
                    BindingKind::Const
                } else {
                    BindingKind::Let
                };
                for declarator in &decl.declarations {
                    let mut ids = Vec::new();
                    bound_names(&declarator.id, &mut ids);
                    for id in ids {
                        self.declare(&id, kind, false);
                    }
                }
            }
            Statement::FunctionDeclaration(ref function) => {
                if let Some(ref id) = function.id {
                    let binding = self.declare(id, BindingKind::Function, true);
                    self.fn_of_binding.insert(binding, function.span);
                }
            }
            Statement::ClassDeclaration(_, ref decl) => {
                if let Some(ref id) = decl.id {
                    self.declare(id, BindingKind::Class, false);
                }
            }
            Statement::Import(ref import) => {
                for specifier in &import.specifiers {
                    let local = match *specifier {
                        ImportSpecifier::Default(ref id) => id,
                        ImportSpecifier::Named { ref local, .. } => local,
                        ImportSpecifier::Namespace(_, ref id) => id,
                    };
                    self.declare(local, BindingKind::Import, true);
                }
            }
            Statement::Export(ExportDeclaration::Decl(_, ref inner)) => {
                self.declare_lexical_in_statement(inner);
            }
            _ => {}
        }
    }

    fn check_var_shadow(&mut self, decl: &VariableDeclaration) {
        if decl.kind != VariableDeclarationKind::Var {
            return;
        }
        let var_scope = self.arena.var_scope_of(self.scope());
        for declarator in &decl.declarations {
            let mut ids = Vec::new();
            bound_names(&declarator.id, &mut ids);
            for id in ids {
                if self.arena.block_scoped_between(self.scope(), var_scope, id.1) {
                    self.diag(
                        id.0,
                        Level::Warn,
                        codes::VAR_SHADOW,
                        format!("'var {}' shadows a block-scoped binding of the same name", id.1),
                    );
                }
            }
        }
    }

    // ----------------------------------------------------------- statements

    fn visit_statement(&mut self, statement: &Statement) {
        match *statement {
            Statement::Expression(_, ref expr) | Statement::Directive(_, ref expr, _) => {
                self.visit_expression(expr)
            }
            Statement::Block(ref block) => self.visit_block_scope(block),
            Statement::Empty(_) | Statement::Debugger(_) => {}
            Statement::VariableDeclaration(ref decl) => self.visit_variable_declaration(decl),
            Statement::FunctionDeclaration(ref function) => {
                self.visit_function(function, false);
            }
            Statement::ClassDeclaration(_, ref decl) => self.visit_class(decl),
            Statement::If(_, ref test, ref consequent, ref alternate) => {
                self.visit_expression(test);
                self.visit_statement(consequent);
                if let Some(ref alternate) = *alternate {
                    self.visit_statement(alternate);
                }
            }
            Statement::For(_, ref stmt) => self.visit_for(stmt),
            Statement::ForIn(_, ref stmt) | Statement::ForOf(_, ref stmt) => {
                self.visit_for_each(stmt)
            }
            Statement::While(_, ref test, ref body) => {
                self.visit_expression(test);
                self.visit_statement(body);
            }
            Statement::DoWhile(_, ref body, ref test) => {
                self.visit_statement(body);
                self.visit_expression(test);
            }
            Statement::Switch(_, ref discriminant, ref cases) => {
                self.visit_expression(discriminant);
                let scope = self.arena.push_scope(ScopeKind::Block, Some(self.scope()));
                self.scope_stack.push(scope);
                for case in cases {
                    self.declare_lexical(&case.consequent);
                }
                for case in cases {
                    if let Some(ref test) = case.test {
                        self.visit_expression(test);
                    }
                    for statement in &case.consequent {
                        self.visit_statement(statement);
                    }
                }
                self.scope_stack.pop();
            }
            Statement::Try(_, ref block, ref handler, ref finalizer) => {
                self.visit_block_scope(block);
                if let Some(ref handler) = *handler {
                    let scope = self.arena.push_scope(ScopeKind::Catch, Some(self.scope()));
                    self.scope_stack.push(scope);
                    if let Some(ref param) = handler.param {
                        self.declare_pattern(param, BindingKind::CatchParam, false);
                    }
                    self.visit_block_scope(&handler.body);
                    self.scope_stack.pop();
                }
                if let Some(ref finalizer) = *finalizer {
                    self.visit_block_scope(finalizer);
                }
            }
            Statement::Throw(_, ref argument) => self.visit_expression(argument),
            Statement::Return(_, ref argument) => {
                if let Some(ref argument) = *argument {
                    self.visit_expression(argument);
                }
            }
            Statement::Break(..) | Statement::Continue(..) => {}
            Statement::Labeled(_, _, ref body) => self.visit_statement(body),
            Statement::With(span, ref object, ref body) => {
                self.diag(
                    span,
                    Level::Warn,
                    codes::WITH,
                    "'with' defeats static scoping; identifiers inside are ambiguous",
                );
                self.risk(span, RiskKind::With);
                self.visit_expression(object);
                let scope = self.arena.push_scope(ScopeKind::With, Some(self.scope()));
                self.scope_stack.push(scope);
                self.with_depth += 1;
                self.visit_statement(body);
                self.with_depth -= 1;
                self.scope_stack.pop();
            }
            Statement::Import(_) => {
                self.saw_esm = true;
            }
            Statement::Export(ref export) => {
                self.saw_esm = true;
                match *export {
                    ExportDeclaration::Default(_, ref expr) => self.visit_expression(expr),
                    ExportDeclaration::Named {
                        ref specifiers,
                        ref source,
                        ..
                    } => {
                        if source.is_none() {
                            for specifier in specifiers {
                                self.resolve_identifier(&specifier.local);
                            }
                        }
                    }
                    ExportDeclaration::Decl(_, ref inner) => self.visit_statement(inner),
                }
            }
        }
    }

    fn visit_block_scope(&mut self, block: &Block) {
        let scope = self.arena.push_scope(ScopeKind::Block, Some(self.scope()));
        self.scope_stack.push(scope);
        self.declare_lexical(&block.1);
        for statement in &block.1 {
            self.visit_statement(statement);
        }
        self.scope_stack.pop();
    }

    fn visit_variable_declaration(&mut self, decl: &VariableDeclaration) {
        self.check_var_shadow(decl);
        for declarator in &decl.declarations {
            // Names were put in scope during hoisting/lexical scans; record
            // the declaration-site spans and walk defaults and initializers.
            let mut ids = Vec::new();
            bound_names(&declarator.id, &mut ids);
            for id in &ids {
                if let Some(binding) = self.arena.lookup(self.scope(), id.1) {
                    self.bindings.insert(id.0, binding);
                }
            }
            if declarator.id.is_complex() {
                self.risk(declarator.id.span(), RiskKind::ComplexDestructuring);
                self.diag(
                    declarator.id.span(),
                    Level::Info,
                    codes::DESTRUCTURE,
                    "destructuring pattern is flattened through a temporary",
                );
            }
            self.visit_pattern_defaults(&declarator.id);
            if let Some(ref init) = declarator.init {
                self.visit_expression(init);
                if let Some(&binding) = ids.first().and_then(|id| self.bindings.get(&id.0)) {
                    self.arena.binding_mut(binding).assignments += 1;
                    if let Expression::Function(ref function) = *init {
                        self.fn_of_binding.insert(binding, function.span);
                    }
                }
                if ids.len() == 1 {
                    self.check_require(declarator, init);
                }
            }
        }
    }

    fn check_require(&mut self, _declarator: &VariableDeclarator, init: &Expression) {
        if let Expression::Call(_, ref callee, ref args) = *init {
            if let Expression::Identifier(ref id) = **callee {
                if id.1 == intern::KW_REQUIRE && args.len() == 1 {
                    self.saw_cjs = true;
                }
            }
        }
    }

    fn visit_for(&mut self, stmt: &ForStatement) {
        let scoped = matches!(
            stmt.init,
            Some(ForInit::VarDecl(ref decl)) if decl.kind != VariableDeclarationKind::Var
        );
        if scoped {
            let scope = self.arena.push_scope(ScopeKind::Block, Some(self.scope()));
            self.scope_stack.push(scope);
        }
        match stmt.init {
            Some(ForInit::VarDecl(ref decl)) => {
                if decl.kind != VariableDeclarationKind::Var {
                    let kind = if decl.kind == VariableDeclarationKind::Const {
                        BindingKind::Const
                    } else {
                        BindingKind::Let
                    };
                    for declarator in &decl.declarations {
                        self.declare_names_only(&declarator.id, kind);
                    }
                }
                self.visit_variable_declaration(decl);
            }
            Some(ForInit::Expression(ref expr)) => self.visit_expression(expr),
            None => {}
        }
        if let Some(ref test) = stmt.test {
            self.visit_expression(test);
        }
        if let Some(ref update) = stmt.update {
            self.visit_expression(update);
        }
        self.visit_statement(&stmt.body);
        if scoped {
            self.scope_stack.pop();
        }
    }

    fn visit_for_each(&mut self, stmt: &ForEachStatement) {
        let scoped = matches!(
            stmt.left,
            ForTarget::VarDecl(ref decl) if decl.kind != VariableDeclarationKind::Var
        );
        if scoped {
            let scope = self.arena.push_scope(ScopeKind::Block, Some(self.scope()));
            self.scope_stack.push(scope);
        }
        match stmt.left {
            ForTarget::VarDecl(ref decl) => {
                if decl.kind != VariableDeclarationKind::Var {
                    let kind = if decl.kind == VariableDeclarationKind::Const {
                        BindingKind::Const
                    } else {
                        BindingKind::Let
                    };
                    for declarator in &decl.declarations {
                        self.declare_names_only(&declarator.id, kind);
                    }
                }
                self.visit_variable_declaration(decl);
            }
            ForTarget::Target(ref target) => {
                self.visit_assign_target(target);
                self.record_assignment(target);
            }
        }
        self.visit_expression(&stmt.right);
        self.visit_statement(&stmt.body);
        if scoped {
            self.scope_stack.pop();
        }
    }

    // ------------------------------------------------------------ functions

    fn visit_function(&mut self, function: &Function, is_method: bool) {
        if !is_method {
            self.this_ctx.push(ThisCtx::Function(function.span));
        }
        let scope = self.arena.push_scope(ScopeKind::Function, Some(self.scope()));
        self.scope_stack.push(scope);

        if let Some(ref id) = function.id {
            // A named function expression can call itself through its name.
            self.declare(id, BindingKind::Function, true);
        }
        for parameter in &function.parameters {
            self.declare_pattern(parameter, BindingKind::Param, false);
        }
        self.hoist_vars(&function.body.1);
        self.declare_lexical(&function.body.1);
        for statement in &function.body.1 {
            self.visit_statement(statement);
        }

        self.scope_stack.pop();
        if !is_method {
            self.this_ctx.pop();
        }
    }

    fn visit_arrow(&mut self, arrow: &ArrowFunction) {
        // Arrows keep the enclosing `this`, so no ThisCtx frame is pushed.
        let scope = self.arena.push_scope(ScopeKind::Function, Some(self.scope()));
        self.scope_stack.push(scope);
        for parameter in &arrow.parameters {
            self.declare_pattern(parameter, BindingKind::Param, false);
        }
        match arrow.body {
            ArrowBody::Expression(ref expr) => self.visit_expression(expr),
            ArrowBody::Block(ref block) => {
                self.hoist_vars(&block.1);
                self.declare_lexical(&block.1);
                for statement in &block.1 {
                    self.visit_statement(statement);
                }
            }
        }
        self.scope_stack.pop();
    }

    fn visit_class(&mut self, decl: &ClassDecl) {
        if let Some(ref super_class) = decl.super_class {
            self.visit_expression(super_class);
        }
        let scope = self.arena.push_scope(ScopeKind::ClassBody, Some(self.scope()));
        self.scope_stack.push(scope);
        for method in &decl.body {
            if let Some(name) = method.key.static_name() {
                let id = Id(method.key.span(), name);
                self.declare(&id, BindingKind::Function, false);
            }
        }
        for method in &decl.body {
            if let PropKey::Computed(_, ref key) = method.key {
                self.visit_expression(key);
            }
            self.this_ctx.push(ThisCtx::Method);
            self.visit_function(&method.value, true);
            self.this_ctx.pop();
        }
        self.scope_stack.pop();
    }

    // ----------------------------------------------------------- expressions

    fn visit_expression(&mut self, expr: &Expression) {
        match *expr {
            Expression::Literal(..) => {}
            Expression::Identifier(ref id) => self.resolve_identifier(id),
            Expression::This(span) => match self.this_ctx.last().copied() {
                Some(ThisCtx::Method) => {}
                Some(ThisCtx::Function(fn_span)) => {
                    self.ordinary_this_uses.push((span, fn_span));
                }
                None => {
                    self.risk(span, RiskKind::TopLevelThis);
                    self.diag(
                        span,
                        Level::Warn,
                        codes::THIS,
                        "top-level 'this' translates to the undefined sentinel",
                    );
                }
            },
            Expression::Array(span, ref elements) => {
                for element in elements {
                    match *element {
                        ArrayElement::Hole(_) => {
                            self.risk(span, RiskKind::SparseArray);
                        }
                        ArrayElement::Expression(ref expr)
                        | ArrayElement::Spread(_, ref expr) => self.visit_expression(expr),
                    }
                }
            }
            Expression::Object(_, ref props) => {
                for prop in props {
                    match *prop {
                        Prop::Init {
                            ref key, ref value, ..
                        } => {
                            if let PropKey::Computed(_, ref key) = *key {
                                self.visit_expression(key);
                            }
                            self.visit_expression(value);
                        }
                        Prop::Method(_, ref key, ref function)
                        | Prop::Get(_, ref key, ref function)
                        | Prop::Set(_, ref key, ref function) => {
                            if let PropKey::Computed(_, ref key) = *key {
                                self.visit_expression(key);
                            }
                            self.this_ctx.push(ThisCtx::Method);
                            self.visit_function(function, true);
                            self.this_ctx.pop();
                        }
                        Prop::Spread(_, ref expr) => self.visit_expression(expr),
                    }
                }
            }
            Expression::Function(ref function) => self.visit_function(function, false),
            Expression::ArrowFunction(ref arrow) => self.visit_arrow(arrow),
            Expression::Class(_, ref decl) => self.visit_class(decl),
            Expression::TemplateLiteral(_, ref template) => {
                for expr in &template.expressions {
                    self.visit_expression(expr);
                }
            }
            Expression::Unary(span, op, ref argument) => {
                if op == UnOp::Delete {
                    if let Expression::ComputedMember(..) = **argument {
                        self.risk(span, RiskKind::DeleteComputed);
                        self.diag(
                            span,
                            Level::Info,
                            codes::DELETE,
                            "'delete' on a computed member relies on the runtime facade",
                        );
                    }
                }
                self.visit_expression(argument);
            }
            Expression::Update(_, _, ref target, _) => {
                self.visit_assign_target(target);
                self.record_assignment(target);
            }
            Expression::Binary(_, _, ref left, ref right)
            | Expression::Logical(_, _, ref left, ref right) => {
                self.visit_expression(left);
                self.visit_expression(right);
            }
            Expression::Conditional(_, ref test, ref consequent, ref alternate) => {
                self.visit_expression(test);
                self.visit_expression(consequent);
                self.visit_expression(alternate);
            }
            Expression::Assignment(_, _, ref target, ref value) => {
                self.visit_assignment(target, value);
            }
            Expression::Sequence(_, ref expressions) => {
                for expr in expressions {
                    self.visit_expression(expr);
                }
            }
            Expression::Call(span, ref callee, ref args) => {
                self.check_call_risks(span, callee, args);
                self.visit_expression(callee);
                for arg in args {
                    match *arg {
                        Argument::Expression(ref expr) | Argument::Spread(_, ref expr) => {
                            self.visit_expression(expr)
                        }
                    }
                }
            }
            Expression::New(span, ref callee, ref args) => {
                if let Expression::Identifier(ref id) = **callee {
                    if id.1 == intern::KW_FUNCTION {
                        self.diag(
                            span,
                            Level::Warn,
                            codes::NEW_FUNCTION,
                            "the Function constructor is not translated",
                        );
                        self.risk(span, RiskKind::Eval);
                    }
                }
                self.visit_expression(callee);
                if let Expression::Identifier(ref id) = **callee {
                    if let Some(&binding) = self.bindings.get(&id.0) {
                        self.new_callees.insert(binding);
                    }
                }
                for arg in args {
                    match *arg {
                        Argument::Expression(ref expr) | Argument::Spread(_, ref expr) => {
                            self.visit_expression(expr)
                        }
                    }
                }
            }
            Expression::StaticMember(_, ref object, _) => {
                self.visit_expression(object);
            }
            Expression::ComputedMember(_, ref object, ref property) => {
                self.visit_expression(object);
                self.visit_expression(property);
            }
        }

        // `arguments` and `eval` reads are risks wherever they appear.
        if let Expression::Identifier(ref id) = *expr {
            if id.1 == intern::KW_ARGUMENTS && !self.this_ctx.is_empty() {
                self.risk(id.0, RiskKind::Arguments);
                self.diag(
                    id.0,
                    Level::Warn,
                    codes::ARGUMENTS,
                    "'arguments' has no direct equivalent in the target",
                );
            }
        }
    }

    fn check_call_risks(&mut self, span: Span, callee: &Expression, _args: &[Argument]) {
        match *callee {
            Expression::Identifier(ref id) if id.1 == intern::KW_EVAL => {
                self.risk(span, RiskKind::Eval);
                self.diag(
                    span,
                    Level::Warn,
                    codes::EVAL,
                    "'eval' cannot be translated statically",
                );
            }
            Expression::Identifier(ref id) if id.1 == intern::KW_REQUIRE => {
                self.saw_cjs = true;
            }
            Expression::StaticMember(_, ref object, property) => {
                if let Expression::Identifier(ref id) = **object {
                    if id.1 == intern::KW_OBJECT
                        && (property == intern::KW_CREATE || property == intern::KW_DEFINE_PROP)
                    {
                        self.risk(span, RiskKind::PrototypeMutation);
                        self.has_prototype_mutation = true;
                        self.diag(
                            span,
                            Level::Info,
                            codes::PROTO,
                            format!("'Object.{}' bypasses the class translation", property),
                        );
                    }
                }
            }
            _ => {}
        }
    }

    fn visit_assignment(&mut self, target: &AssignTarget, value: &Expression) {
        match *target {
            AssignTarget::Identifier(ref id) => {
                self.resolve_identifier(id);
            }
            AssignTarget::StaticMember(span, ref object, property) => {
                // `X.prototype.Y = ...` and `X.prototype = ...`
                let is_proto_write = property == intern::KW_PROTOTYPE
                    || matches!(
                        **object,
                        Expression::StaticMember(_, _, inner) if inner == intern::KW_PROTOTYPE
                    );
                if is_proto_write {
                    self.risk(span, RiskKind::PrototypeMutation);
                    self.has_prototype_mutation = true;
                    self.diag(
                        span,
                        Level::Info,
                        codes::PROTO,
                        "prototype mutation is only approximated by the translation",
                    );
                    if let Expression::Function(ref function) = *value {
                        self.proto_fns.insert(function.span);
                    }
                }
                // `module.exports = ...` / `exports.x = ...`
                if let Expression::Identifier(ref id) = **object {
                    if (id.1 == intern::KW_MODULE && property == intern::KW_EXPORTS)
                        || id.1 == intern::KW_EXPORTS
                    {
                        self.saw_cjs = true;
                    }
                }
                self.visit_expression(object);
            }
            AssignTarget::ComputedMember(span, ref object, ref property) => {
                if !matches!(**property, Expression::Literal(..)) {
                    self.risk(span, RiskKind::DynamicWrite);
                    self.diag(
                        span,
                        Level::Info,
                        codes::DYN_WRITE,
                        "computed property write with a dynamic key",
                    );
                }
                self.visit_expression(object);
                self.visit_expression(property);
            }
        }
        self.record_assignment(target);
        self.visit_expression(value);
    }

    fn visit_assign_target(&mut self, target: &AssignTarget) {
        match *target {
            AssignTarget::Identifier(ref id) => self.resolve_identifier(id),
            AssignTarget::StaticMember(_, ref object, _) => self.visit_expression(object),
            AssignTarget::ComputedMember(_, ref object, ref property) => {
                self.visit_expression(object);
                self.visit_expression(property);
            }
        }
    }
}

/// Collect the identifiers a pattern binds, in source order.
pub fn bound_names(pattern: &Pattern, out: &mut Vec<Id>) {
    match *pattern {
        Pattern::Identifier(ref id) => out.push(*id),
        Pattern::Assignment { ref target, .. } => bound_names(target, out),
        Pattern::Array { ref elements, .. } => {
            for element in elements.iter().flatten() {
                bound_names(element, out);
            }
        }
        Pattern::Object {
            ref properties,
            ref rest,
            ..
        } => {
            for property in properties {
                bound_names(&property.value, out);
            }
            if let Some(ref rest) = *rest {
                out.push(*rest);
            }
        }
        Pattern::Rest(_, ref inner) => bound_names(inner, out),
    }
}

pub type SymbolSet = FnvHashSet<Symbol>;
