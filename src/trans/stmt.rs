//! Statement lowering rules, one per source node kind, plus the function,
//! class, loop-label, and module-shape machinery.

use crate::diagnostics::{codes, Level};
use crate::py::ast as py;
use crate::syntax::ast::*;
use crate::trans::expr::{assign_bin_op, TargetRef};
use crate::trans::{Breakable, Ctx, DeferredDefault, LabelFrame, Transformer};

impl<'a> Transformer<'a> {
    /// Lower a statement list with function declarations first: they hoist
    /// with both name and value, so their defs must precede any statement
    /// that could call them.
    pub(crate) fn lower_stmt_list(
        &mut self,
        statements: &'a [Statement],
        ctx: &mut Ctx,
        out: &mut Vec<py::Stmt>,
    ) {
        for statement in statements {
            if let Statement::FunctionDeclaration(ref function) = *statement {
                let name = match function.id {
                    Some(ref id) => self.rename(id.1, ctx),
                    None => self.fresh("fn"),
                };
                let def = self.lower_function_decl(function, name);
                out.push(def);
            }
        }
        for statement in statements {
            if matches!(*statement, Statement::FunctionDeclaration(_)) {
                continue;
            }
            self.lower_stmt(statement, ctx, out);
        }
    }

    pub(crate) fn lower_stmt(
        &mut self,
        statement: &'a Statement,
        ctx: &mut Ctx,
        out: &mut Vec<py::Stmt>,
    ) {
        match *statement {
            Statement::Expression(_, ref expr) => self.lower_expression_stmt(expr, ctx, out),
            // Directive prologue entries ("use strict") have no target form.
            Statement::Directive(..) => {}
            Statement::Block(ref block) => self.lower_stmt_list(&block.1, ctx, out),
            Statement::Empty(_) => {}
            Statement::Debugger(_) => {}
            Statement::VariableDeclaration(ref decl) => self.lower_var_decl(decl, ctx, out),
            Statement::FunctionDeclaration(ref function) => {
                let name = match function.id {
                    Some(ref id) => self.rename(id.1, ctx),
                    None => self.fresh("fn"),
                };
                let def = self.lower_function_decl(function, name);
                out.push(def);
            }
            Statement::ClassDeclaration(_, ref decl) => {
                let name = match decl.id {
                    Some(ref id) => self.rename(id.1, ctx),
                    None => self.fresh("cls"),
                };
                self.lower_class(decl, name, ctx, out);
            }
            Statement::If(_, ref test, ref consequent, ref alternate) => {
                let test = self.lower_expr(test, ctx, out);
                let body = self.lower_branch(consequent, ctx);
                let orelse = match *alternate {
                    Some(ref alternate) => self.lower_branch(alternate, ctx),
                    None => Vec::new(),
                };
                out.push(py::Stmt::new(py::StmtKind::If { test, body, orelse }));
            }
            Statement::For(_, ref stmt) => self.lower_for(stmt, ctx, out),
            Statement::ForIn(_, ref stmt) => {
                let right = self.lower_expr(&stmt.right, ctx, out);
                let iter = self.helper_call("js_keys", vec![right]);
                self.lower_for_each(stmt, iter, ctx, out);
            }
            Statement::ForOf(_, ref stmt) => {
                let right = self.lower_expr(&stmt.right, ctx, out);
                let iter = self.helper_call("js_iter", vec![right]);
                self.lower_for_each(stmt, iter, ctx, out);
            }
            Statement::While(_, ref test, ref body) => {
                let loop_body = self.lower_loop_body(body, ctx);
                self.push_while(Some(test), loop_body, ctx, out);
                self.append_label_checks(body, ctx, out);
            }
            Statement::DoWhile(span, ref body, ref test) => {
                self.diag(
                    span,
                    Level::Info,
                    codes::DO_WHILE,
                    "do-while lowered to an unconditional loop with a breaking test",
                );
                let mut loop_body = self.lower_loop_body(body, ctx);
                let mut test_sink = Vec::new();
                let test = self.lower_expr(test, ctx, &mut test_sink);
                loop_body.extend(test_sink);
                loop_body.push(py::Stmt::new(py::StmtKind::If {
                    test: py::Expr::Unary(py::UnaryOp::Not, Box::new(test)),
                    body: vec![py::Stmt::new(py::StmtKind::Break)],
                    orelse: Vec::new(),
                }));
                out.push(py::Stmt::new(py::StmtKind::While {
                    test: py::Expr::Bool(true),
                    body: loop_body,
                }));
                self.append_label_checks(body, ctx, out);
            }
            Statement::Switch(_, ref discriminant, ref cases) => {
                self.lower_switch(discriminant, cases, ctx, out)
            }
            Statement::Try(_, ref block, ref handler, ref finalizer) => {
                self.lower_try(block, handler, finalizer, ctx, out)
            }
            Statement::Throw(_, ref argument) => {
                let value = self.lower_expr(argument, ctx, out);
                let wrapped = self.helper_call("JsError", vec![value]);
                out.push(py::Stmt::new(py::StmtKind::Raise(Some(wrapped))));
            }
            Statement::Return(_, ref argument) => {
                if ctx.in_constructor {
                    // Constructors keep the instance; returned values drop.
                    match *argument {
                        Some(Expression::This(_)) | None => {}
                        Some(ref argument) => {
                            let value = self.lower_expr(argument, ctx, out);
                            out.push(py::Stmt::expr(value));
                        }
                    }
                    out.push(py::Stmt::new(py::StmtKind::Return(None)));
                    return;
                }
                let value = argument
                    .as_ref()
                    .map(|argument| self.lower_expr(argument, ctx, out));
                out.push(py::Stmt::new(py::StmtKind::Return(value)));
            }
            Statement::Break(span, ref label) => self.lower_break(span, label, ctx, out),
            Statement::Continue(span, ref label) => self.lower_continue(span, label, ctx, out),
            Statement::Labeled(span, ref label, ref body) => {
                self.lower_labeled(span, label, body, ctx, out)
            }
            Statement::With(span, ref object, ref body) => {
                let object = self.lower_expr(object, ctx, out);
                out.push(py::Stmt::commented(
                    "TODO(js2py): 'with' scoping is not reproduced; names below bind lexically",
                    py::StmtKind::Expr(object),
                ));
                self.lower_stmt(body, ctx, out);
                let _ = span;
            }
            Statement::Import(ref import) => self.lower_import(import, out),
            Statement::Export(ref export) => self.lower_export(export, ctx, out),
        }
    }

    fn lower_branch(&mut self, statement: &'a Statement, ctx: &mut Ctx) -> Vec<py::Stmt> {
        let mut body = Vec::new();
        self.lower_stmt(statement, ctx, &mut body);
        body
    }

    // -------------------------------------------------------- expressions

    fn lower_expression_stmt(
        &mut self,
        expr: &'a Expression,
        ctx: &mut Ctx,
        out: &mut Vec<py::Stmt>,
    ) {
        match *expr {
            Expression::Assignment(_, op, ref target, ref value) => {
                if op == AssignOp::Eq
                    && ctx.at_module
                    && self.try_lower_cjs_export(target, value, ctx, out)
                {
                    return;
                }
                self.lower_assignment_stmt(op, target, value, ctx, out);
            }
            Expression::Update(_, op, ref target, _) => {
                self.lower_update_stmt(op, target, ctx, out)
            }
            Expression::Sequence(_, ref expressions) => {
                for expr in expressions {
                    self.lower_expression_stmt(expr, ctx, out);
                }
            }
            _ => {
                let lowered = self.lower_expr(expr, ctx, out);
                out.push(py::Stmt::expr(lowered));
            }
        }
    }

    fn lower_assignment_stmt(
        &mut self,
        op: AssignOp,
        target: &'a AssignTarget,
        value: &'a Expression,
        ctx: &mut Ctx,
        out: &mut Vec<py::Stmt>,
    ) {
        let target = self.target_parts(target, ctx, out);
        let value = match assign_bin_op(op) {
            None => self.lower_expr(value, ctx, out),
            Some(bin) => {
                let current = self.read_target(&target);
                let rhs = self.lower_expr(value, ctx, out);
                self.lowered_binary(bin, current, rhs)
            }
        };
        self.write_target(&target, value, out);
    }

    fn lower_update_stmt(
        &mut self,
        op: UpdateOp,
        target: &'a AssignTarget,
        ctx: &mut Ctx,
        out: &mut Vec<py::Stmt>,
    ) {
        let step = match op {
            UpdateOp::PlusPlus => py::BinOp::Add,
            UpdateOp::MinusMinus => py::BinOp::Sub,
        };
        let target = self.target_parts(target, ctx, out);
        match target {
            TargetRef::Name(ref name) => out.push(py::Stmt::new(py::StmtKind::AugAssign {
                target: py::Expr::name(name.clone()),
                op: step,
                value: py::Expr::Num(1.0),
            })),
            _ => {
                let updated = py::Expr::Bin(
                    Box::new(self.read_target(&target)),
                    step,
                    Box::new(py::Expr::Num(1.0)),
                );
                self.write_target(&target, updated, out);
            }
        }
    }

    // -------------------------------------------------------- declarations

    fn lower_var_decl(
        &mut self,
        decl: &'a VariableDeclaration,
        ctx: &mut Ctx,
        out: &mut Vec<py::Stmt>,
    ) {
        for declarator in &decl.declarations {
            // `const fs = require('fs')` imports under the declared name.
            if let (Pattern::Identifier(ref id), Some(ref init)) =
                (&declarator.id, &declarator.init)
            {
                if let Expression::Call(_, ref callee, ref args) = *init {
                    if let Some(module) = self.match_require(callee, args) {
                        let alias = self.rename(id.1, ctx);
                        self.require_import_as(&module, alias);
                        continue;
                    }
                }
            }
            // Destructured require flattens to a from-import.
            if let (
                Pattern::Object {
                    ref properties,
                    rest: None,
                    ..
                },
                Some(ref init),
            ) = (&declarator.id, &declarator.init)
            {
                if let Expression::Call(_, ref callee, ref args) = *init {
                    if let Some(module) = self.match_require(callee, args) {
                        if let Some(names) = flat_import_names(properties) {
                            self.hoisted_imports.push(py::Stmt::new(py::StmtKind::ImportFrom {
                                module: Self::module_name(&module),
                                names,
                            }));
                            continue;
                        }
                    }
                }
            }

            if decl.kind == VariableDeclarationKind::Var {
                let mut ids = Vec::new();
                crate::analyze::bound_names(&declarator.id, &mut ids);
                for id in ids {
                    let name = self.rename(id.1, ctx);
                    ctx.hoist_name(name);
                }
            }

            match declarator.init {
                Some(ref init) => {
                    let value = self.lower_expr(init, ctx, out);
                    self.lower_pattern_assign(&declarator.id, value, ctx, out);
                }
                None => {
                    if decl.kind != VariableDeclarationKind::Var {
                        if let Pattern::Identifier(ref id) = declarator.id {
                            self.uses.add("undefined");
                            let name = self.rename(id.1, ctx);
                            out.push(py::Stmt::assign(
                                py::Expr::name(name),
                                py::Expr::name("undefined"),
                            ));
                        }
                    }
                }
            }
        }
    }

    pub(crate) fn lower_pattern_assign(
        &mut self,
        pattern: &'a Pattern,
        value: py::Expr,
        ctx: &mut Ctx,
        out: &mut Vec<py::Stmt>,
    ) {
        match *pattern {
            Pattern::Identifier(ref id) => {
                let name = self.rename(id.1, ctx);
                out.push(py::Stmt::assign(py::Expr::name(name), value));
            }
            Pattern::Assignment {
                ref target,
                ref default,
                ..
            } => {
                self.uses.add("undefined");
                let tmp = self.fresh("tmp");
                out.push(py::Stmt::assign(py::Expr::name(tmp.clone()), value));
                let mut default_body = Vec::new();
                let default_value = self.lower_expr(default, ctx, &mut default_body);
                default_body.push(py::Stmt::assign(py::Expr::name(tmp.clone()), default_value));
                out.push(py::Stmt::new(py::StmtKind::If {
                    test: py::Expr::Compare(
                        Box::new(py::Expr::name(tmp.clone())),
                        py::CmpOp::Is,
                        Box::new(py::Expr::name("undefined")),
                    ),
                    body: default_body,
                    orelse: Vec::new(),
                }));
                self.lower_pattern_assign(target, py::Expr::name(tmp), ctx, out);
            }
            Pattern::Array { ref elements, .. } => {
                let base = self.pin_value(value, out);
                for (index, element) in elements.iter().enumerate() {
                    match *element {
                        None => {}
                        Some(Pattern::Rest(_, ref inner)) => {
                            let rest = py::Expr::call_name(
                                "list",
                                vec![py::Expr::subscript(
                                    base.clone(),
                                    py::Expr::Slice {
                                        lower: Some(Box::new(py::Expr::Num(index as f64))),
                                        upper: None,
                                    },
                                )],
                            );
                            self.lower_pattern_assign(inner, rest, ctx, out);
                        }
                        Some(ref element) => {
                            let item = self.helper_call(
                                "js_getindex",
                                vec![base.clone(), py::Expr::Num(index as f64)],
                            );
                            self.lower_pattern_assign(element, item, ctx, out);
                        }
                    }
                }
            }
            Pattern::Object {
                ref properties,
                ref rest,
                span,
            } => {
                let base = self.pin_value(value, out);
                for property in properties {
                    let key = match property.key.static_name() {
                        Some(name) => py::Expr::string(name.as_str()),
                        None => match property.key {
                            PropKey::Computed(_, ref key) => self.lower_expr(key, ctx, out),
                            _ => unreachable!(),
                        },
                    };
                    let item = self.helper_call("js_getindex", vec![base.clone(), key]);
                    self.lower_pattern_assign(&property.value, item, ctx, out);
                }
                if let Some(ref rest) = *rest {
                    self.diag(
                        span,
                        Level::Warn,
                        codes::UNSUPPORTED,
                        "object rest pattern binds the whole object, not the remainder",
                    );
                    let name = self.rename(rest.1, ctx);
                    out.push(py::Stmt::commented(
                        "TODO(js2py): rest pattern keeps every key of the source object",
                        py::StmtKind::Assign {
                            target: py::Expr::name(name),
                            value: base,
                        },
                    ));
                }
            }
            Pattern::Rest(_, ref inner) => {
                // Rest outside arrays/params has no meaning; bind directly.
                self.lower_pattern_assign(inner, value, ctx, out);
            }
        }
    }

    /// Pin a value to a name so destructuring reads it once.
    fn pin_value(&mut self, value: py::Expr, out: &mut Vec<py::Stmt>) -> py::Expr {
        match value {
            py::Expr::Name(_) => value,
            other => {
                let tmp = self.fresh("tmp");
                out.push(py::Stmt::assign(py::Expr::name(tmp.clone()), other));
                py::Expr::name(tmp)
            }
        }
    }

    // ----------------------------------------------------------- functions

    pub(crate) fn lower_function_decl(
        &mut self,
        function: &'a Function,
        name: String,
    ) -> py::Stmt {
        let is_constructor_like = self.analysis.constructor_fns.contains(&function.span);
        let this_name = if is_constructor_like {
            Some("this_js".to_string())
        } else {
            None
        };
        let mut fctx = Ctx::function(this_name, false);
        let (mut params, vararg, body) =
            self.lower_params_and_body(&function.parameters, &function.body.1, &mut fctx);
        if is_constructor_like {
            params.insert(0, py::Param::plain("this_js"));
        }

        let mut def = py::Stmt::new(py::StmtKind::FuncDef {
            name,
            params,
            vararg,
            decorators: Vec::new(),
            body,
        });
        if function.generator {
            self.diag(
                function.span,
                Level::Warn,
                codes::UNSUPPORTED,
                "generator functions are outside the supported subset",
            );
            def.comments
                .push("TODO(js2py): generator semantics are not preserved".to_string());
        }
        def
    }

    pub(crate) fn lower_arrow_def(
        &mut self,
        arrow: &'a ArrowFunction,
        name: String,
        ctx: &Ctx,
    ) -> py::Stmt {
        let mut fctx = Ctx::function(ctx.this_name.clone(), false);
        let (params, vararg, body) = match arrow.body {
            ArrowBody::Block(ref block) => {
                self.lower_params_and_body(&arrow.parameters, &block.1, &mut fctx)
            }
            ArrowBody::Expression(ref expr) => {
                let (params, vararg, mut body) =
                    self.lower_params_and_body(&arrow.parameters, &[], &mut fctx);
                let value = self.lower_expr(expr, &mut fctx, &mut body);
                body.push(py::Stmt::new(py::StmtKind::Return(Some(value))));
                (params, vararg, body)
            }
        };
        py::Stmt::new(py::StmtKind::FuncDef {
            name,
            params,
            vararg,
            decorators: Vec::new(),
            body,
        })
    }

    pub(crate) fn lower_params_and_body(
        &mut self,
        parameters: &'a [Pattern],
        statements: &'a [Statement],
        fctx: &mut Ctx,
    ) -> (Vec<py::Param>, Option<String>, Vec<py::Stmt>) {
        let mut params = Vec::new();
        let mut vararg = None;
        let mut prologue = Vec::new();

        for pattern in parameters {
            match *pattern {
                Pattern::Identifier(ref id) => {
                    params.push(py::Param::plain(self.rename(id.1, fctx)));
                }
                Pattern::Assignment {
                    ref target,
                    ref default,
                    ..
                } => match **target {
                    Pattern::Identifier(ref id) => {
                        self.uses.add("undefined");
                        let name = self.rename(id.1, fctx);
                        params.push(py::Param {
                            name: name.clone(),
                            default: Some(py::Expr::name("undefined")),
                        });
                        let mut default_body = Vec::new();
                        let value = self.lower_expr(default, fctx, &mut default_body);
                        default_body
                            .push(py::Stmt::assign(py::Expr::name(name.clone()), value));
                        prologue.push(py::Stmt::new(py::StmtKind::If {
                            test: py::Expr::Compare(
                                Box::new(py::Expr::name(name)),
                                py::CmpOp::Is,
                                Box::new(py::Expr::name("undefined")),
                            ),
                            body: default_body,
                            orelse: Vec::new(),
                        }));
                    }
                    _ => {
                        self.uses.add("undefined");
                        let tmp = self.fresh("p");
                        params.push(py::Param {
                            name: tmp.clone(),
                            default: Some(py::Expr::name("undefined")),
                        });
                        self.lower_pattern_assign(
                            pattern,
                            py::Expr::name(tmp),
                            fctx,
                            &mut prologue,
                        );
                    }
                },
                Pattern::Rest(_, ref inner) => match **inner {
                    Pattern::Identifier(ref id) => {
                        let name = self.rename(id.1, fctx);
                        vararg = Some(name.clone());
                        prologue.push(py::Stmt::assign(
                            py::Expr::name(name.clone()),
                            py::Expr::call_name("list", vec![py::Expr::name(name)]),
                        ));
                    }
                    _ => {
                        let tmp = self.fresh("p");
                        vararg = Some(tmp.clone());
                        let listed = py::Expr::call_name("list", vec![py::Expr::name(tmp)]);
                        self.lower_pattern_assign(inner, listed, fctx, &mut prologue);
                    }
                },
                Pattern::Array { .. } | Pattern::Object { .. } => {
                    let tmp = self.fresh("p");
                    params.push(py::Param::plain(tmp.clone()));
                    self.lower_pattern_assign(pattern, py::Expr::name(tmp), fctx, &mut prologue);
                }
            }
        }

        let mut body = Vec::new();
        self.lower_stmt_list(statements, fctx, &mut body);

        let mut assembled = Vec::new();
        for name in &fctx.hoist {
            self.uses.add("undefined");
            assembled.push(py::Stmt::assign(
                py::Expr::name(name.clone()),
                py::Expr::name("undefined"),
            ));
        }
        assembled.extend(prologue);
        assembled.extend(body);
        (params, vararg, assembled)
    }

    pub(crate) fn lower_class(
        &mut self,
        decl: &'a ClassDecl,
        name: String,
        ctx: &mut Ctx,
        out: &mut Vec<py::Stmt>,
    ) {
        let bases = match decl.super_class {
            Some(ref super_class) => vec![self.lower_expr(super_class, ctx, out)],
            None => Vec::new(),
        };

        let mut body = Vec::new();
        for method in &decl.body {
            if let PropKey::Computed(span, _) = method.key {
                self.diag(
                    span,
                    Level::Warn,
                    codes::UNSUPPORTED,
                    "computed method names are outside the supported subset",
                );
                body.push(py::Stmt::commented(
                    "TODO(js2py): computed method name was dropped",
                    py::StmtKind::Pass,
                ));
                continue;
            }
            let method_name = if method.kind == MethodKind::Constructor {
                "__init__".to_string()
            } else {
                method
                    .key
                    .static_name()
                    .map(|s| s.as_str().to_string())
                    .unwrap_or_else(|| self.fresh("m"))
            };
            if matches!(method.kind, MethodKind::Get | MethodKind::Set) {
                let what = if method.kind == MethodKind::Get {
                    "getter"
                } else {
                    "setter"
                };
                self.diag(
                    method.span,
                    Level::Warn,
                    codes::GETTER_SETTER,
                    format!("{} lowered to a plain method", what),
                );
            }

            let this_name = if method.is_static {
                None
            } else {
                Some("self".to_string())
            };
            let mut mctx = Ctx::function(this_name, method.kind == MethodKind::Constructor);
            let (mut params, vararg, method_body) = self.lower_params_and_body(
                &method.value.parameters,
                &method.value.body.1,
                &mut mctx,
            );
            let decorators = if method.is_static {
                vec!["staticmethod".to_string()]
            } else {
                params.insert(0, py::Param::plain("self"));
                Vec::new()
            };
            body.push(py::Stmt::new(py::StmtKind::FuncDef {
                name: method_name,
                params,
                vararg,
                decorators,
                body: method_body,
            }));
        }

        out.push(py::Stmt::new(py::StmtKind::ClassDef { name, bases, body }));
    }

    // ---------------------------------------------------------------- loops

    fn lower_loop_body(&mut self, body: &'a Statement, ctx: &mut Ctx) -> Vec<py::Stmt> {
        ctx.loop_depth += 1;
        ctx.breakables.push(Breakable::Loop);
        let mut lowered = Vec::new();
        self.lower_stmt(body, ctx, &mut lowered);
        ctx.breakables.pop();
        ctx.loop_depth -= 1;
        lowered
    }

    /// Emit a while loop; a test whose lowering lifts statements becomes a
    /// `while True` with the test re-evaluated inside the loop.
    fn push_while(
        &mut self,
        test: Option<&'a Expression>,
        body: Vec<py::Stmt>,
        ctx: &mut Ctx,
        out: &mut Vec<py::Stmt>,
    ) {
        let mut test_sink = Vec::new();
        let test_expr = match test {
            Some(test) => self.lower_expr(test, ctx, &mut test_sink),
            None => py::Expr::Bool(true),
        };
        if test_sink.is_empty() {
            out.push(py::Stmt::new(py::StmtKind::While {
                test: test_expr,
                body,
            }));
        } else {
            let mut full = test_sink;
            full.push(py::Stmt::new(py::StmtKind::If {
                test: py::Expr::Unary(py::UnaryOp::Not, Box::new(test_expr)),
                body: vec![py::Stmt::new(py::StmtKind::Break)],
                orelse: Vec::new(),
            }));
            full.extend(body);
            out.push(py::Stmt::new(py::StmtKind::While {
                test: py::Expr::Bool(true),
                body: full,
            }));
        }
    }

    fn lower_for(&mut self, stmt: &'a ForStatement, ctx: &mut Ctx, out: &mut Vec<py::Stmt>) {
        match stmt.init {
            Some(ForInit::VarDecl(ref decl)) => self.lower_var_decl(decl, ctx, out),
            Some(ForInit::Expression(ref expr)) => self.lower_expression_stmt(expr, ctx, out),
            None => {}
        }

        let mut body = self.lower_loop_body(&stmt.body, ctx);
        if let Some(ref update) = stmt.update {
            self.lower_expression_stmt(update, ctx, &mut body);
        }
        self.push_while(stmt.test.as_ref(), body, ctx, out);
        self.append_label_checks(&stmt.body, ctx, out);
    }

    fn lower_for_each(
        &mut self,
        stmt: &'a ForEachStatement,
        iter: py::Expr,
        ctx: &mut Ctx,
        out: &mut Vec<py::Stmt>,
    ) {
        let (target, prologue) = match stmt.left {
            ForTarget::VarDecl(ref decl) => {
                let declarator = &decl.declarations[0];
                match declarator.id {
                    Pattern::Identifier(ref id) => {
                        let name = self.rename(id.1, ctx);
                        if decl.kind == VariableDeclarationKind::Var {
                            ctx.hoist_name(name.clone());
                        }
                        (py::Expr::name(name), Vec::new())
                    }
                    ref pattern => {
                        let tmp = self.fresh("it");
                        let mut prologue = Vec::new();
                        self.lower_pattern_assign(
                            pattern,
                            py::Expr::name(tmp.clone()),
                            ctx,
                            &mut prologue,
                        );
                        (py::Expr::name(tmp), prologue)
                    }
                }
            }
            ForTarget::Target(ref target) => match *target {
                AssignTarget::Identifier(ref id) => {
                    (py::Expr::Name(self.rename(id.1, ctx)), Vec::new())
                }
                _ => {
                    let tmp = self.fresh("it");
                    let parts = self.target_parts(target, ctx, out);
                    let mut prologue = Vec::new();
                    self.write_target(&parts, py::Expr::name(tmp.clone()), &mut prologue);
                    (py::Expr::name(tmp), prologue)
                }
            },
        };

        let mut body = prologue;
        body.extend(self.lower_loop_body(&stmt.body, ctx));
        out.push(py::Stmt::new(py::StmtKind::For { target, iter, body }));
        self.append_label_checks(&stmt.body, ctx, out);
    }

    // --------------------------------------------------------------- labels

    fn lower_labeled(
        &mut self,
        span: crate::syntax::span::Span,
        label: &Id,
        body: &'a Statement,
        ctx: &mut Ctx,
        out: &mut Vec<py::Stmt>,
    ) {
        let is_loop = matches!(
            *body,
            Statement::For(..)
                | Statement::ForIn(..)
                | Statement::ForOf(..)
                | Statement::While(..)
                | Statement::DoWhile(..)
        );
        let used = stmt_uses_label(body, label.1, None);

        if !used {
            // An unused label simply disappears.
            self.lower_stmt(body, ctx, out);
            return;
        }
        if !is_loop {
            self.diag(
                span,
                Level::Warn,
                codes::UNSUPPORTED,
                "labeled non-loop statements cannot be jumped out of",
            );
            out.push(py::Stmt::commented(
                "TODO(js2py): labeled block; the label was dropped",
                py::StmtKind::Pass,
            ));
            self.lower_stmt(body, ctx, out);
            return;
        }

        self.diag(
            span,
            Level::Info,
            codes::LABEL,
            "labeled jump rewritten with a flag variable",
        );
        ctx.frames.push(LabelFrame {
            label: label.1,
            body_depth: ctx.loop_depth + 1,
            break_flag: None,
            continue_flag: None,
        });
        let mut loop_out = Vec::new();
        self.lower_stmt(body, ctx, &mut loop_out);
        let frame = ctx.frames.pop().expect("label frame pushed above");
        for flag in [&frame.break_flag, &frame.continue_flag].into_iter().flatten() {
            out.push(py::Stmt::assign(
                py::Expr::name(flag.clone()),
                py::Expr::Bool(false),
            ));
        }
        out.extend(loop_out);
    }

    fn lower_break(
        &mut self,
        span: crate::syntax::span::Span,
        label: &Option<Id>,
        ctx: &mut Ctx,
        out: &mut Vec<py::Stmt>,
    ) {
        match *label {
            None => match ctx.innermost_breakable() {
                Some(Breakable::Loop) => out.push(py::Stmt::new(py::StmtKind::Break)),
                _ => {
                    // Unconditional trailing breaks were stripped by the
                    // switch lowering; a conditional one has no target.
                    self.diag(
                        span,
                        Level::Warn,
                        codes::UNSUPPORTED,
                        "conditional 'break' inside switch has no direct translation",
                    );
                    out.push(py::Stmt::commented(
                        "TODO(js2py): conditional break out of a switch arm",
                        py::StmtKind::Pass,
                    ));
                }
            },
            Some(ref label) => match ctx.frame_of(label.1) {
                Some(index) => {
                    if ctx.loop_depth == ctx.frames[index].body_depth {
                        out.push(py::Stmt::new(py::StmtKind::Break));
                    } else {
                        let flag = match ctx.frames[index].break_flag {
                            Some(ref flag) => flag.clone(),
                            None => {
                                let flag = self.fresh("brk");
                                ctx.frames[index].break_flag = Some(flag.clone());
                                flag
                            }
                        };
                        out.push(py::Stmt::assign(py::Expr::name(flag), py::Expr::Bool(true)));
                        out.push(py::Stmt::new(py::StmtKind::Break));
                    }
                }
                None => {
                    self.diag(
                        span,
                        Level::Warn,
                        codes::UNSUPPORTED,
                        format!("label '{}' does not name an enclosing loop", label.1),
                    );
                    out.push(py::Stmt::new(py::StmtKind::Break));
                }
            },
        }
    }

    fn lower_continue(
        &mut self,
        span: crate::syntax::span::Span,
        label: &Option<Id>,
        ctx: &mut Ctx,
        out: &mut Vec<py::Stmt>,
    ) {
        match *label {
            None => out.push(py::Stmt::new(py::StmtKind::Continue)),
            Some(ref label) => match ctx.frame_of(label.1) {
                Some(index) => {
                    if ctx.loop_depth == ctx.frames[index].body_depth {
                        out.push(py::Stmt::new(py::StmtKind::Continue));
                    } else {
                        let flag = match ctx.frames[index].continue_flag {
                            Some(ref flag) => flag.clone(),
                            None => {
                                let flag = self.fresh("cnt");
                                ctx.frames[index].continue_flag = Some(flag.clone());
                                flag
                            }
                        };
                        out.push(py::Stmt::assign(py::Expr::name(flag), py::Expr::Bool(true)));
                        out.push(py::Stmt::new(py::StmtKind::Break));
                    }
                }
                None => {
                    self.diag(
                        span,
                        Level::Warn,
                        codes::UNSUPPORTED,
                        format!("label '{}' does not name an enclosing loop", label.1),
                    );
                    out.push(py::Stmt::new(py::StmtKind::Continue));
                }
            },
        }
    }

    /// After a nested loop, re-check any outer-label flags set inside it.
    fn append_label_checks(
        &mut self,
        loop_body: &Statement,
        ctx: &mut Ctx,
        out: &mut Vec<py::Stmt>,
    ) {
        if ctx.frames.is_empty() {
            return;
        }
        for index in (0..ctx.frames.len()).rev() {
            // Only frames strictly enclosing the current body re-check; the
            // labeled loop itself exits by the break that set its flag.
            if ctx.frames[index].body_depth > ctx.loop_depth {
                continue;
            }
            let direct = ctx.loop_depth == ctx.frames[index].body_depth;
            let label = ctx.frames[index].label;

            if stmt_uses_label(loop_body, label, Some(JumpKind::Break)) {
                if let Some(flag) = ctx.frames[index].break_flag.clone() {
                    out.push(py::Stmt::new(py::StmtKind::If {
                        test: py::Expr::name(flag),
                        body: vec![py::Stmt::new(py::StmtKind::Break)],
                        orelse: Vec::new(),
                    }));
                }
            }
            if stmt_uses_label(loop_body, label, Some(JumpKind::Continue)) {
                if let Some(flag) = ctx.frames[index].continue_flag.clone() {
                    let body = if direct {
                        vec![
                            py::Stmt::assign(py::Expr::name(flag.clone()), py::Expr::Bool(false)),
                            py::Stmt::new(py::StmtKind::Continue),
                        ]
                    } else {
                        vec![py::Stmt::new(py::StmtKind::Break)]
                    };
                    out.push(py::Stmt::new(py::StmtKind::If {
                        test: py::Expr::name(flag),
                        body,
                        orelse: Vec::new(),
                    }));
                }
            }
        }
    }

    // --------------------------------------------------------------- switch

    fn lower_switch(
        &mut self,
        discriminant: &'a Expression,
        cases: &'a [SwitchCase],
        ctx: &mut Ctx,
        out: &mut Vec<py::Stmt>,
    ) {
        // `switch(true)` compares each case expression directly.
        let true_idiom = matches!(*discriminant, Expression::Literal(_, Literal::True));
        let scrutinee = if true_idiom {
            None
        } else {
            let value = self.lower_expr(discriminant, ctx, out);
            Some(self.pin_value(value, out))
        };

        ctx.breakables.push(Breakable::Switch);
        let mut arms: Vec<(py::Expr, Vec<py::Stmt>)> = Vec::new();
        let mut default_body: Option<Vec<py::Stmt>> = None;

        for (index, case) in cases.iter().enumerate() {
            let effective = effective_case_body(cases, index);
            let mut lowered = Vec::new();
            for statement in effective {
                self.lower_stmt(statement, ctx, &mut lowered);
            }
            match case.test {
                Some(ref test) => {
                    let test = self.lower_expr(test, ctx, out);
                    let condition = match scrutinee {
                        Some(ref scrutinee) => py::Expr::Compare(
                            Box::new(scrutinee.clone()),
                            py::CmpOp::Eq,
                            Box::new(test),
                        ),
                        None => test,
                    };
                    arms.push((condition, lowered));
                }
                None => default_body = Some(lowered),
            }
        }
        ctx.breakables.pop();

        let mut chain = default_body.unwrap_or_default();
        for (condition, body) in arms.into_iter().rev() {
            chain = vec![py::Stmt::new(py::StmtKind::If {
                test: condition,
                body,
                orelse: chain,
            })];
        }
        out.extend(chain);
    }

    // ------------------------------------------------------------ try/catch

    fn lower_try(
        &mut self,
        block: &'a Block,
        handler: &'a Option<CatchClause>,
        finalizer: &'a Option<Block>,
        ctx: &mut Ctx,
        out: &mut Vec<py::Stmt>,
    ) {
        let mut body = Vec::new();
        self.lower_stmt_list(&block.1, ctx, &mut body);

        let handler = handler.as_ref().map(|clause| {
            self.uses.add("JsError");
            let mut handler_body = Vec::new();
            let bound = match clause.param {
                Some(ref param) => {
                    let tmp = self.fresh("err");
                    let unwrapped =
                        py::Expr::attribute(py::Expr::name(tmp.clone()), "value");
                    self.lower_pattern_assign(param, unwrapped, ctx, &mut handler_body);
                    Some(tmp)
                }
                None => None,
            };
            self.lower_stmt_list(&clause.body.1, ctx, &mut handler_body);
            py::ExceptHandler {
                class: "JsError".to_string(),
                name: bound,
                body: handler_body,
            }
        });

        let finalbody = match *finalizer {
            Some(ref finalizer) => {
                let mut lowered = Vec::new();
                self.lower_stmt_list(&finalizer.1, ctx, &mut lowered);
                lowered
            }
            None => Vec::new(),
        };

        out.push(py::Stmt::new(py::StmtKind::Try {
            body,
            handler,
            finalbody,
        }));
    }

    // -------------------------------------------------------- module shape

    fn try_lower_cjs_export(
        &mut self,
        target: &'a AssignTarget,
        value: &'a Expression,
        ctx: &mut Ctx,
        out: &mut Vec<py::Stmt>,
    ) -> bool {
        let record = self.analysis.module_shape == crate::analyze::ModuleShape::CommonJs;
        if let AssignTarget::StaticMember(_, ref object, property) = *target {
            if let Expression::Identifier(ref id) = **object {
                if id.1 == crate::intern::KW_MODULE && property == crate::intern::KW_EXPORTS {
                    if record {
                        match *value {
                            Expression::Object(_, ref props) => {
                                let mut names = Vec::new();
                                for prop in props {
                                    if let Prop::Init { ref key, .. } = *prop {
                                        if let Some(name) = key.static_name() {
                                            names.push(name.as_str().to_string());
                                            continue;
                                        }
                                    }
                                    names.clear();
                                    break;
                                }
                                if names.is_empty() {
                                    self.exports.add("module_exports");
                                } else {
                                    for name in names {
                                        self.exports.add(name);
                                    }
                                }
                            }
                            _ => self.exports.add("module_exports"),
                        }
                    }
                    let value = self.lower_expr(value, ctx, out);
                    out.push(py::Stmt::assign(py::Expr::name("module_exports"), value));
                    return true;
                }
                if id.1 == crate::intern::KW_EXPORTS {
                    let name = property.as_str().to_string();
                    if record {
                        self.exports.add(name.clone());
                    }
                    let value = self.lower_expr(value, ctx, out);
                    out.push(py::Stmt::assign(py::Expr::name(name), value));
                    return true;
                }
            }
        }
        false
    }

    fn lower_import(&mut self, import: &'a ImportDeclaration, out: &mut Vec<py::Stmt>) {
        let module = Self::module_name(import.source.1.as_str());

        if import.specifiers.is_empty() {
            out.push(py::Stmt::new(py::StmtKind::Import {
                module,
                alias: None,
            }));
            return;
        }

        let mut named = Vec::new();
        for specifier in &import.specifiers {
            match *specifier {
                ImportSpecifier::Default(ref local) => {
                    out.push(py::Stmt::new(py::StmtKind::Import {
                        module: module.clone(),
                        alias: Some(local.1.as_str().to_string()),
                    }));
                }
                ImportSpecifier::Namespace(_, ref local) => {
                    out.push(py::Stmt::new(py::StmtKind::Import {
                        module: module.clone(),
                        alias: Some(local.1.as_str().to_string()),
                    }));
                }
                ImportSpecifier::Named {
                    ref imported,
                    ref local,
                    ..
                } => {
                    let alias = if imported.1 == local.1 {
                        None
                    } else {
                        Some(local.1.as_str().to_string())
                    };
                    named.push((imported.1.as_str().to_string(), alias));
                }
            }
        }
        if !named.is_empty() {
            out.push(py::Stmt::new(py::StmtKind::ImportFrom {
                module,
                names: named,
            }));
        }
    }

    fn lower_export(
        &mut self,
        export: &'a ExportDeclaration,
        ctx: &mut Ctx,
        out: &mut Vec<py::Stmt>,
    ) {
        match *export {
            ExportDeclaration::Default(_, ref expr) => match **expr {
                // Named functions and classes define at their site so
                // later statements can call them; the default assignment
                // still lands at module bottom.
                Expression::Function(ref function) if function.id.is_some() => {
                    let id = function.id.as_ref().expect("checked above");
                    let name = self.rename(id.1, ctx);
                    let def = self.lower_function_decl(function, name.clone());
                    out.push(def);
                    self.deferred_defaults.push(DeferredDefault::Name(name));
                }
                Expression::Class(_, ref decl) if decl.id.is_some() => {
                    let id = decl.id.as_ref().expect("checked above");
                    let name = self.rename(id.1, ctx);
                    self.lower_class(decl, name.clone(), ctx, out);
                    self.deferred_defaults.push(DeferredDefault::Name(name));
                }
                _ => self.deferred_defaults.push(DeferredDefault::Expr(&**expr)),
            },
            ExportDeclaration::Named {
                ref specifiers,
                ref source,
                ..
            } => match *source {
                Some((_, module)) => {
                    let mut names = Vec::new();
                    for specifier in specifiers {
                        let alias = if specifier.local.1 == specifier.exported.1 {
                            None
                        } else {
                            Some(specifier.exported.1.as_str().to_string())
                        };
                        names.push((specifier.local.1.as_str().to_string(), alias));
                        self.exports.add(specifier.exported.1.as_str());
                    }
                    out.push(py::Stmt::new(py::StmtKind::ImportFrom {
                        module: Self::module_name(module.as_str()),
                        names,
                    }));
                }
                None => {
                    for specifier in specifiers {
                        self.exports.add(specifier.exported.1.as_str());
                        if specifier.local.1 != specifier.exported.1 {
                            let local = self.rename(specifier.local.1, ctx);
                            out.push(py::Stmt::assign(
                                py::Expr::name(specifier.exported.1.as_str()),
                                py::Expr::Name(local),
                            ));
                        }
                    }
                }
            },
            ExportDeclaration::Decl(_, ref inner) => {
                match **inner {
                    Statement::FunctionDeclaration(ref function) => {
                        if let Some(ref id) = function.id {
                            self.exports.add(id.1.as_str());
                        }
                    }
                    Statement::ClassDeclaration(_, ref decl) => {
                        if let Some(ref id) = decl.id {
                            self.exports.add(id.1.as_str());
                        }
                    }
                    Statement::VariableDeclaration(ref decl) => {
                        for declarator in &decl.declarations {
                            let mut ids = Vec::new();
                            crate::analyze::bound_names(&declarator.id, &mut ids);
                            for id in ids {
                                self.exports.add(id.1.as_str());
                            }
                        }
                    }
                    _ => {}
                }
                self.lower_stmt(inner, ctx, out);
            }
        }
    }
}

/// Source-order fall-through: the body of case `index` plus every
/// following case body until one terminates, with a trailing bare `break`
/// stripped.
fn effective_case_body<'a>(cases: &'a [SwitchCase], index: usize) -> Vec<&'a Statement> {
    let mut acc: Vec<&Statement> = Vec::new();
    for case in &cases[index..] {
        acc.extend(case.consequent.iter());
        if case
            .consequent
            .last()
            .map_or(false, is_case_terminator)
        {
            break;
        }
    }
    while matches!(acc.last(), Some(Statement::Break(_, None))) {
        acc.pop();
    }
    acc
}

fn is_case_terminator(statement: &Statement) -> bool {
    matches!(
        *statement,
        Statement::Break(..) | Statement::Return(..) | Statement::Throw(..) | Statement::Continue(..)
    )
}

#[derive(PartialEq, Eq, Clone, Copy)]
enum JumpKind {
    Break,
    Continue,
}

/// Whether a statement subtree jumps to `label`. Function bodies are
/// opaque: labels do not cross them.
fn stmt_uses_label(statement: &Statement, label: crate::intern::Symbol, kind: Option<JumpKind>) -> bool {
    let want_break = kind.map_or(true, |k| k == JumpKind::Break);
    let want_continue = kind.map_or(true, |k| k == JumpKind::Continue);
    match *statement {
        Statement::Break(_, Some(ref id)) => want_break && id.1 == label,
        Statement::Continue(_, Some(ref id)) => want_continue && id.1 == label,
        Statement::Block(ref block) => block
            .1
            .iter()
            .any(|statement| stmt_uses_label(statement, label, kind)),
        Statement::If(_, _, ref consequent, ref alternate) => {
            stmt_uses_label(consequent, label, kind)
                || alternate
                    .as_ref()
                    .map_or(false, |alternate| stmt_uses_label(alternate, label, kind))
        }
        Statement::For(_, ref stmt) => stmt_uses_label(&stmt.body, label, kind),
        Statement::ForIn(_, ref stmt) | Statement::ForOf(_, ref stmt) => {
            stmt_uses_label(&stmt.body, label, kind)
        }
        Statement::While(_, _, ref body) | Statement::DoWhile(_, ref body, _) => {
            stmt_uses_label(body, label, kind)
        }
        Statement::Labeled(_, _, ref body) => stmt_uses_label(body, label, kind),
        Statement::Switch(_, _, ref cases) => cases.iter().any(|case| {
            case.consequent
                .iter()
                .any(|statement| stmt_uses_label(statement, label, kind))
        }),
        Statement::Try(_, ref block, ref handler, ref finalizer) => {
            block
                .1
                .iter()
                .any(|statement| stmt_uses_label(statement, label, kind))
                || handler.as_ref().map_or(false, |handler| {
                    handler
                        .body
                        .1
                        .iter()
                        .any(|statement| stmt_uses_label(statement, label, kind))
                })
                || finalizer.as_ref().map_or(false, |finalizer| {
                    finalizer
                        .1
                        .iter()
                        .any(|statement| stmt_uses_label(statement, label, kind))
                })
        }
        Statement::With(_, _, ref body) => stmt_uses_label(body, label, kind),
        _ => false,
    }
}

/// Object-pattern properties that flatten to `from m import a, b as c`.
fn flat_import_names(properties: &[PropPattern]) -> Option<Vec<(String, Option<String>)>> {
    let mut names = Vec::new();
    for property in properties {
        let key = property.key.static_name()?;
        match property.value {
            Pattern::Identifier(ref local) => {
                let alias = if local.1 == key {
                    None
                } else {
                    Some(local.1.as_str().to_string())
                };
                names.push((key.as_str().to_string(), alias));
            }
            _ => return None,
        }
    }
    Some(names)
}
