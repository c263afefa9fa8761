//! Expression lowering rules, one per source node kind.
//!
//! Every rule takes the active context plus a statement sink; expressions
//! whose lowering needs statements (assignments, lifted function defs,
//! computed object keys) push into the sink and return the resulting name.

use crate::analyze::BindingKind;
use crate::diagnostics::{codes, Level};
use crate::intern;
use crate::py::ast as py;
use crate::syntax;
use crate::syntax::ast::*;
use crate::trans::{Ctx, Transformer, FACADE_GLOBALS};

/// Reference to an assignable location with its subexpressions evaluated
/// exactly once.
pub(crate) enum TargetRef {
    Name(String),
    Attr(py::Expr, String),
    Index(py::Expr, py::Expr),
}

impl<'a> Transformer<'a> {
    pub(crate) fn lower_expr(
        &mut self,
        expr: &'a Expression,
        ctx: &mut Ctx,
        sink: &mut Vec<py::Stmt>,
    ) -> py::Expr {
        match *expr {
            Expression::Literal(_, ref literal) => self.lower_literal(literal),
            Expression::Identifier(ref id) => self.lower_identifier(id, ctx),
            Expression::This(_) => match ctx.this_name.clone() {
                Some(name) => py::Expr::Name(name),
                None => {
                    self.uses.add("undefined");
                    py::Expr::name("undefined")
                }
            },
            Expression::TemplateLiteral(_, ref template) => {
                self.lower_template(template, ctx, sink)
            }
            Expression::Array(_, ref elements) => self.lower_array(elements, ctx, sink),
            Expression::Object(_, ref props) => self.lower_object(props, ctx, sink),
            Expression::Function(ref function) => {
                let name = match function.id {
                    Some(ref id) => self.rename(id.1, ctx),
                    None => self.fresh("fn"),
                };
                let def = self.lower_function_decl(function, name.clone());
                sink.push(def);
                py::Expr::Name(name)
            }
            Expression::ArrowFunction(ref arrow) => self.lower_arrow(arrow, ctx, sink),
            Expression::Class(_, ref decl) => {
                let name = match decl.id {
                    Some(ref id) => self.rename(id.1, ctx),
                    None => self.fresh("cls"),
                };
                self.lower_class(decl, name.clone(), ctx, sink);
                py::Expr::Name(name)
            }
            Expression::Unary(span, op, ref argument) => {
                self.lower_unary(span, op, argument, ctx, sink)
            }
            Expression::Update(_, op, ref target, prefix) => {
                let target = self.target_parts(target, ctx, sink);
                let step = match op {
                    UpdateOp::PlusPlus => py::BinOp::Add,
                    UpdateOp::MinusMinus => py::BinOp::Sub,
                };
                if prefix {
                    let updated = py::Expr::Bin(
                        Box::new(self.read_target(&target)),
                        step,
                        Box::new(py::Expr::Num(1.0)),
                    );
                    self.write_target(&target, updated, sink);
                    self.read_target(&target)
                } else {
                    let old = self.fresh("tmp");
                    let read = self.read_target(&target);
                    sink.push(py::Stmt::assign(py::Expr::name(old.clone()), read));
                    let updated = py::Expr::Bin(
                        Box::new(py::Expr::name(old.clone())),
                        step,
                        Box::new(py::Expr::Num(1.0)),
                    );
                    self.write_target(&target, updated, sink);
                    py::Expr::name(old)
                }
            }
            Expression::Binary(_, op, ref left, ref right) => {
                let left = self.lower_expr(left, ctx, sink);
                let right = self.lower_expr(right, ctx, sink);
                self.lowered_binary(op, left, right)
            }
            Expression::Logical(_, op, ref left, ref right) => {
                let left = self.lower_expr(left, ctx, sink);
                let right = self.lower_expr(right, ctx, sink);
                let helper = match op {
                    LogOp::AndAnd => "js_and",
                    LogOp::OrOr => "js_or",
                    LogOp::Nullish => "js_nullish",
                };
                self.helper_call(helper, vec![left, right])
            }
            Expression::Conditional(_, ref test, ref consequent, ref alternate) => {
                let test = self.lower_expr(test, ctx, sink);
                let body = self.lower_expr(consequent, ctx, sink);
                let orelse = self.lower_expr(alternate, ctx, sink);
                py::Expr::IfExp {
                    test: Box::new(test),
                    body: Box::new(body),
                    orelse: Box::new(orelse),
                }
            }
            Expression::Assignment(_, op, ref target, ref value) => {
                self.lower_assignment_expr(op, target, value, ctx, sink)
            }
            Expression::Sequence(_, ref expressions) => {
                let (last, rest) = expressions.split_last().expect("sequence is non-empty");
                for expr in rest {
                    let lowered = self.lower_expr(expr, ctx, sink);
                    sink.push(py::Stmt::expr(lowered));
                }
                self.lower_expr(last, ctx, sink)
            }
            Expression::Call(span, ref callee, ref args) => {
                self.lower_call(span, callee, args, ctx, sink)
            }
            Expression::New(_, ref callee, ref args) => {
                let func = self.lower_expr(callee, ctx, sink);
                let mut call_args = vec![func];
                call_args.extend(self.lower_arguments(args, ctx, sink));
                self.helper_call("js_new", call_args)
            }
            Expression::StaticMember(_, ref object, property) => {
                let object = self.lower_expr(object, ctx, sink);
                self.member_read(object, property.as_str())
            }
            Expression::ComputedMember(_, ref object, ref property) => {
                let object = self.lower_expr(object, ctx, sink);
                let property = self.lower_expr(property, ctx, sink);
                self.helper_call("js_getindex", vec![object, property])
            }
        }
    }

    fn lower_literal(&mut self, literal: &Literal) -> py::Expr {
        match *literal {
            Literal::Number(n) => py::Expr::Num(n),
            Literal::String(_, cooked) => py::Expr::string(cooked.as_str()),
            Literal::Null => py::Expr::None_,
            Literal::True => py::Expr::Bool(true),
            Literal::False => py::Expr::Bool(false),
            Literal::Regex(pattern, flags) => {
                let args = vec![
                    py::Expr::string(pattern.as_str()),
                    py::Expr::string(flags.as_str()),
                ];
                self.helper_call("js_regex", args)
            }
        }
    }

    fn lower_identifier(&mut self, id: &Id, ctx: &mut Ctx) -> py::Expr {
        let text = id.1.as_str();
        match text {
            "undefined" => {
                self.uses.add("undefined");
                py::Expr::name("undefined")
            }
            "NaN" => py::Expr::call_name("float", vec![py::Expr::string("nan")]),
            "Infinity" => py::Expr::call_name("float", vec![py::Expr::string("inf")]),
            _ => {
                if let Some(&facade) = FACADE_GLOBALS.iter().find(|&&g| g == text) {
                    let is_global = self
                        .analysis
                        .resolve(id.0)
                        .map_or(true, |binding| binding.kind == BindingKind::Builtin);
                    if is_global {
                        self.uses.add(facade);
                    }
                }
                py::Expr::Name(self.rename(id.1, ctx))
            }
        }
    }

    /// `a.b` reads become attribute access; a module with observed
    /// prototype mutation downgrades reads on non-facade objects to the
    /// runtime getter so patched properties stay reachable.
    pub(crate) fn member_read(&mut self, object: py::Expr, property: &str) -> py::Expr {
        if property == "length" {
            return py::Expr::call_name("len", vec![object]);
        }
        let on_facade = matches!(object, py::Expr::Name(ref n) if FACADE_GLOBALS.contains(&n.as_str()));
        if self.analysis.has_prototype_mutation && !on_facade {
            return self.helper_call("js_getindex", vec![object, py::Expr::string(property)]);
        }
        py::Expr::attribute(object, property)
    }

    fn lower_unary(
        &mut self,
        span: crate::syntax::span::Span,
        op: UnOp,
        argument: &'a Expression,
        ctx: &mut Ctx,
        sink: &mut Vec<py::Stmt>,
    ) -> py::Expr {
        match op {
            UnOp::Not => {
                let operand = self.lower_expr(argument, ctx, sink);
                py::Expr::Unary(py::UnaryOp::Not, Box::new(operand))
            }
            UnOp::Minus => match *argument {
                Expression::Literal(_, Literal::Number(n)) => py::Expr::Num(-n),
                _ => {
                    let operand = self.lower_expr(argument, ctx, sink);
                    py::Expr::Unary(py::UnaryOp::USub, Box::new(operand))
                }
            },
            UnOp::Plus => {
                let operand = self.lower_expr(argument, ctx, sink);
                py::Expr::Unary(py::UnaryOp::UAdd, Box::new(operand))
            }
            UnOp::Tilde => {
                let operand = self.lower_expr(argument, ctx, sink);
                self.helper_call("js_bitnot", vec![operand])
            }
            UnOp::Typeof => {
                let operand = self.lower_expr(argument, ctx, sink);
                self.helper_call("js_typeof", vec![operand])
            }
            UnOp::Void => {
                let operand = self.lower_expr(argument, ctx, sink);
                if !matches!(operand, py::Expr::Name(_) | py::Expr::Num(_) | py::Expr::Str(_)) {
                    sink.push(py::Stmt::expr(operand));
                }
                self.uses.add("undefined");
                py::Expr::name("undefined")
            }
            UnOp::Delete => match *argument {
                Expression::ComputedMember(_, ref object, ref property) => {
                    let object = self.lower_expr(object, ctx, sink);
                    let property = self.lower_expr(property, ctx, sink);
                    self.helper_call("js_delete", vec![object, property])
                }
                Expression::StaticMember(_, ref object, property) => {
                    let object = self.lower_expr(object, ctx, sink);
                    let key = py::Expr::string(property.as_str());
                    self.helper_call("js_delete", vec![object, key])
                }
                _ => {
                    self.diag(
                        span,
                        Level::Warn,
                        codes::UNSUPPORTED,
                        "'delete' on a non-member expression has no translation",
                    );
                    sink.push(py::Stmt::commented(
                        "TODO(js2py): delete on a non-member expression",
                        py::StmtKind::Pass,
                    ));
                    py::Expr::Bool(true)
                }
            },
        }
    }

    /// Shared by binary expressions and compound assignment.
    pub(crate) fn lowered_binary(
        &mut self,
        op: BinOp,
        left: py::Expr,
        right: py::Expr,
    ) -> py::Expr {
        let numeric = matches!(left, py::Expr::Num(_)) && matches!(right, py::Expr::Num(_));
        let strings = matches!(left, py::Expr::Str(_)) && matches!(right, py::Expr::Str(_));
        let direct = |op| py::Expr::Bin(Box::new(left.clone()), op, Box::new(right.clone()));
        let compare = |op| py::Expr::Compare(Box::new(left.clone()), op, Box::new(right.clone()));

        match op {
            BinOp::Plus if numeric || strings => direct(py::BinOp::Add),
            BinOp::Plus => self.helper_call("js_plus", vec![left, right]),
            BinOp::Minus if numeric => direct(py::BinOp::Sub),
            BinOp::Minus => self.helper_call("js_sub", vec![left, right]),
            BinOp::Times if numeric => direct(py::BinOp::Mult),
            BinOp::Times => self.helper_call("js_mul", vec![left, right]),
            // Always float division, never integer truncation.
            BinOp::Div => direct(py::BinOp::Div),
            BinOp::Mod if numeric => direct(py::BinOp::Mod),
            BinOp::Mod => self.helper_call("js_mod", vec![left, right]),
            BinOp::EqEqEq => compare(py::CmpOp::Eq),
            BinOp::NotEqEq => compare(py::CmpOp::NotEq),
            BinOp::EqEq => self.helper_call("loose_eq", vec![left, right]),
            BinOp::NotEq => {
                let eq = self.helper_call("loose_eq", vec![left, right]);
                py::Expr::Unary(py::UnaryOp::Not, Box::new(eq))
            }
            BinOp::Lt => compare(py::CmpOp::Lt),
            BinOp::Lte => compare(py::CmpOp::LtE),
            BinOp::Gt => compare(py::CmpOp::Gt),
            BinOp::Gte => compare(py::CmpOp::GtE),
            BinOp::In => self.helper_call("js_in", vec![left, right]),
            BinOp::Instanceof => self.helper_call("js_instanceof", vec![left, right]),
            BinOp::BitAnd => direct(py::BinOp::BitAnd),
            BinOp::BitOr => direct(py::BinOp::BitOr),
            BinOp::BitXor => direct(py::BinOp::BitXor),
            BinOp::LShift => direct(py::BinOp::LShift),
            BinOp::RShift => direct(py::BinOp::RShift),
            BinOp::URShift => self.helper_call("js_urshift", vec![left, right]),
        }
    }

    fn lower_assignment_expr(
        &mut self,
        op: AssignOp,
        target: &'a AssignTarget,
        value: &'a Expression,
        ctx: &mut Ctx,
        sink: &mut Vec<py::Stmt>,
    ) -> py::Expr {
        let target = self.target_parts(target, ctx, sink);
        let value = match assign_bin_op(op) {
            None => self.lower_expr(value, ctx, sink),
            Some(bin) => {
                let current = self.read_target(&target);
                let rhs = self.lower_expr(value, ctx, sink);
                self.lowered_binary(bin, current, rhs)
            }
        };

        match target {
            TargetRef::Name(ref name) => {
                sink.push(py::Stmt::assign(py::Expr::name(name.clone()), value));
                py::Expr::name(name.clone())
            }
            _ => {
                let tmp = self.fresh("tmp");
                sink.push(py::Stmt::assign(py::Expr::name(tmp.clone()), value));
                self.write_target(&target, py::Expr::name(tmp.clone()), sink);
                py::Expr::name(tmp)
            }
        }
    }

    fn lower_call(
        &mut self,
        span: crate::syntax::span::Span,
        callee: &'a Expression,
        args: &'a [Argument],
        ctx: &mut Ctx,
        sink: &mut Vec<py::Stmt>,
    ) -> py::Expr {
        // CommonJS `require("m")` becomes a hoisted import.
        if let Some(module) = self.match_require(callee, args) {
            return self.require_import(&module);
        }

        // `super(...)` and `super.m(...)` inside class methods.
        if let Expression::Identifier(ref id) = *callee {
            if id.1.as_str() == "super" {
                let init = py::Expr::attribute(py::Expr::call_name("super", vec![]), "__init__");
                let call_args = self.lower_arguments(args, ctx, sink);
                return py::Expr::call(init, call_args);
            }
            if id.1 == intern::KW_EVAL {
                sink.push(py::Stmt::commented(
                    "TODO(js2py): eval is not translated; review by hand",
                    py::StmtKind::Pass,
                ));
            }
        }
        if let Expression::StaticMember(_, ref object, property) = *callee {
            if matches!(**object, Expression::Identifier(ref id) if id.1.as_str() == "super") {
                let method =
                    py::Expr::attribute(py::Expr::call_name("super", vec![]), property.as_str());
                let call_args = self.lower_arguments(args, ctx, sink);
                return py::Expr::call(method, call_args);
            }
        }

        let _ = span;
        let func = self.lower_expr(callee, ctx, sink);
        let call_args = self.lower_arguments(args, ctx, sink);
        py::Expr::call(func, call_args)
    }

    pub(crate) fn match_require(
        &self,
        callee: &Expression,
        args: &[Argument],
    ) -> Option<String> {
        if let Expression::Identifier(ref id) = *callee {
            if id.1 == intern::KW_REQUIRE && args.len() == 1 {
                // Only the global `require`, not a local shadowing it.
                let is_global = self
                    .analysis
                    .resolve(id.0)
                    .map_or(true, |binding| binding.kind == BindingKind::Builtin);
                if !is_global {
                    return None;
                }
                if let Some(Argument::Expression(Expression::Literal(
                    _,
                    Literal::String(_, cooked),
                ))) = args.first()
                {
                    return Some(cooked.as_str().to_string());
                }
            }
        }
        None
    }

    pub(crate) fn require_import(&mut self, module: &str) -> py::Expr {
        let py_module = Self::module_name(module);
        if let Some((_, alias)) = self
            .require_aliases
            .iter()
            .find(|(existing, _)| *existing == py_module)
        {
            return py::Expr::name(alias.clone());
        }
        let alias = format!("_m_{}", self.require_aliases.len() + 1);
        self.require_aliases.push((py_module.clone(), alias.clone()));
        self.hoisted_imports.push(py::Stmt::new(py::StmtKind::Import {
            module: py_module,
            alias: Some(alias.clone()),
        }));
        py::Expr::name(alias)
    }

    /// Register a hoisted import under a caller-chosen alias, for
    /// `const fs = require('fs')` declarations.
    pub(crate) fn require_import_as(&mut self, module: &str, alias: String) {
        let py_module = Self::module_name(module);
        self.require_aliases.push((py_module.clone(), alias.clone()));
        self.hoisted_imports.push(py::Stmt::new(py::StmtKind::Import {
            module: py_module,
            alias: Some(alias),
        }));
    }

    pub(crate) fn lower_arguments(
        &mut self,
        args: &'a [Argument],
        ctx: &mut Ctx,
        sink: &mut Vec<py::Stmt>,
    ) -> Vec<py::Expr> {
        let has_spread = args.iter().any(|a| matches!(a, Argument::Spread(..)));
        if !has_spread {
            return args
                .iter()
                .map(|arg| match *arg {
                    Argument::Expression(ref expr) | Argument::Spread(_, ref expr) => {
                        self.lower_expr(expr, ctx, sink)
                    }
                })
                .collect();
        }

        let mut segments = Vec::new();
        let mut run = Vec::new();
        for arg in args {
            match *arg {
                Argument::Expression(ref expr) => run.push(self.lower_expr(expr, ctx, sink)),
                Argument::Spread(_, ref expr) => {
                    if !run.is_empty() {
                        segments.push(py::Expr::List(std::mem::take(&mut run)));
                    }
                    segments.push(self.lower_expr(expr, ctx, sink));
                }
            }
        }
        if !run.is_empty() {
            segments.push(py::Expr::List(run));
        }
        let flattened = self.helper_call("spread", segments);
        vec![py::Expr::Starred(Box::new(flattened))]
    }

    fn lower_template(
        &mut self,
        template: &'a Template,
        ctx: &mut Ctx,
        sink: &mut Vec<py::Stmt>,
    ) -> py::Expr {
        if template.expressions.is_empty() {
            let text = template
                .quasis
                .first()
                .map(|q| q.cooked.as_str())
                .unwrap_or("");
            return py::Expr::string(text);
        }

        let mut result: Option<py::Expr> = None;
        let mut append = |acc: &mut Option<py::Expr>, piece: py::Expr| {
            *acc = Some(match acc.take() {
                Some(existing) => py::Expr::Bin(Box::new(existing), py::BinOp::Add, Box::new(piece)),
                None => piece,
            });
        };

        for (index, expr) in template.expressions.iter().enumerate() {
            let quasi = template.quasis[index].cooked.as_str();
            if !quasi.is_empty() {
                append(&mut result, py::Expr::string(quasi));
            }
            let value = self.lower_expr(expr, ctx, sink);
            let coerced = self.helper_call("js_tostring", vec![value]);
            append(&mut result, coerced);
        }
        let tail = template
            .quasis
            .last()
            .map(|q| q.cooked.as_str())
            .unwrap_or("");
        if !tail.is_empty() {
            append(&mut result, py::Expr::string(tail));
        }

        result.unwrap_or_else(|| py::Expr::string(""))
    }

    fn lower_array(
        &mut self,
        elements: &'a [ArrayElement],
        ctx: &mut Ctx,
        sink: &mut Vec<py::Stmt>,
    ) -> py::Expr {
        let has_spread = elements.iter().any(|e| matches!(e, ArrayElement::Spread(..)));
        if has_spread {
            let mut segments = Vec::new();
            let mut run = Vec::new();
            for element in elements {
                match *element {
                    ArrayElement::Expression(ref expr) => {
                        run.push(self.lower_expr(expr, ctx, sink))
                    }
                    ArrayElement::Hole(span) => {
                        self.sparse_hole(span);
                        run.push(py::Expr::name("undefined"));
                    }
                    ArrayElement::Spread(_, ref expr) => {
                        if !run.is_empty() {
                            segments.push(py::Expr::List(std::mem::take(&mut run)));
                        }
                        segments.push(self.lower_expr(expr, ctx, sink));
                    }
                }
            }
            if !run.is_empty() {
                segments.push(py::Expr::List(run));
            }
            return self.helper_call("spread", segments);
        }

        let lowered = elements
            .iter()
            .map(|element| match *element {
                ArrayElement::Expression(ref expr) => self.lower_expr(expr, ctx, sink),
                ArrayElement::Hole(span) => {
                    self.sparse_hole(span);
                    py::Expr::name("undefined")
                }
                ArrayElement::Spread(..) => unreachable!(),
            })
            .collect();
        py::Expr::List(lowered)
    }

    fn sparse_hole(&mut self, span: crate::syntax::span::Span) {
        self.uses.add("undefined");
        self.diag(
            span,
            Level::Info,
            codes::SPARSE_ARRAY,
            "array hole becomes the undefined sentinel",
        );
    }

    fn lower_object(
        &mut self,
        props: &'a [Prop],
        ctx: &mut Ctx,
        sink: &mut Vec<py::Stmt>,
    ) -> py::Expr {
        let needs_building = props.iter().any(|prop| match *prop {
            Prop::Spread(..) => true,
            Prop::Init { ref key, .. }
            | Prop::Method(_, ref key, _)
            | Prop::Get(_, ref key, _)
            | Prop::Set(_, ref key, _) => matches!(key, PropKey::Computed(..)),
        });

        if !needs_building {
            let mut pairs = Vec::new();
            for prop in props {
                let (key, value) = self.lower_prop(prop, ctx, sink);
                pairs.push((key, value));
            }
            return py::Expr::Dict(pairs);
        }

        let tmp = self.fresh("obj");
        sink.push(py::Stmt::assign(
            py::Expr::name(tmp.clone()),
            py::Expr::Dict(Vec::new()),
        ));
        for prop in props {
            if let Prop::Spread(_, ref expr) = *prop {
                let value = self.lower_expr(expr, ctx, sink);
                let merged = self.helper_call("js_merge", vec![py::Expr::name(tmp.clone()), value]);
                sink.push(py::Stmt::assign(py::Expr::name(tmp.clone()), merged));
                continue;
            }
            let (key, value) = self.lower_prop(prop, ctx, sink);
            let set = self.helper_call("obj_set", vec![py::Expr::name(tmp.clone()), key, value]);
            sink.push(py::Stmt::expr(set));
        }
        py::Expr::name(tmp)
    }

    fn lower_prop(
        &mut self,
        prop: &'a Prop,
        ctx: &mut Ctx,
        sink: &mut Vec<py::Stmt>,
    ) -> (py::Expr, py::Expr) {
        match *prop {
            Prop::Init {
                ref key, ref value, ..
            } => {
                let key = self.lower_prop_key(key, ctx, sink);
                let value = self.lower_expr(value, ctx, sink);
                (key, value)
            }
            Prop::Method(_, ref key, ref function) => {
                let lowered_key = self.lower_prop_key(key, ctx, sink);
                let name = self.fresh("fn");
                let def = self.lower_function_decl(function, name.clone());
                sink.push(def);
                (lowered_key, py::Expr::name(name))
            }
            Prop::Get(span, ref key, ref function) | Prop::Set(span, ref key, ref function) => {
                let what = if matches!(prop, Prop::Get(..)) { "getter" } else { "setter" };
                self.diag(
                    span,
                    Level::Warn,
                    codes::GETTER_SETTER,
                    format!("{} lowered to a plain property holding a function", what),
                );
                let lowered_key = self.lower_prop_key(key, ctx, sink);
                let name = self.fresh("fn");
                let def = self.lower_function_decl(function, name.clone());
                sink.push(def);
                (lowered_key, py::Expr::name(name))
            }
            Prop::Spread(..) => unreachable!("spread props are handled by the builder path"),
        }
    }

    fn lower_prop_key(
        &mut self,
        key: &'a PropKey,
        ctx: &mut Ctx,
        sink: &mut Vec<py::Stmt>,
    ) -> py::Expr {
        match *key {
            PropKey::Identifier(ref id) => py::Expr::string(id.1.as_str()),
            PropKey::String(_, cooked) => py::Expr::string(cooked.as_str()),
            PropKey::Number(_, n) => py::Expr::string(syntax::number_to_key(n)),
            PropKey::Computed(_, ref expr) => self.lower_expr(expr, ctx, sink),
        }
    }

    fn lower_arrow(
        &mut self,
        arrow: &'a ArrowFunction,
        ctx: &mut Ctx,
        sink: &mut Vec<py::Stmt>,
    ) -> py::Expr {
        if let ArrowBody::Expression(ref body) = arrow.body {
            let simple_params = arrow
                .parameters
                .iter()
                .all(|p| matches!(p, Pattern::Identifier(_)));
            if simple_params
                && !expression_needs_statements(body)
                && !self.arrow_mutates_captures(arrow)
            {
                let mut arrow_ctx = Ctx::function(ctx.this_name.clone(), false);
                let mut trial = Vec::new();
                let lowered = self.lower_expr(body, &mut arrow_ctx, &mut trial);
                // The guard above keeps the trial sink empty; the check is
                // a backstop for rules that start lifting in the future.
                if trial.is_empty() {
                    let params = arrow
                        .parameters
                        .iter()
                        .map(|p| match *p {
                            Pattern::Identifier(ref id) => {
                                py::Param::plain(self.rename(id.1, &mut arrow_ctx))
                            }
                            _ => unreachable!(),
                        })
                        .collect();
                    return py::Expr::Lambda {
                        params,
                        body: Box::new(lowered),
                    };
                }
            }
        }

        let name = self.fresh("fn");
        let def = self.lower_arrow_def(arrow, name.clone(), ctx);
        sink.push(def);
        py::Expr::name(name)
    }

    /// True when the arrow body writes any binding it captures; those
    /// arrows lower to a def so the write is visible.
    fn arrow_mutates_captures(&self, arrow: &ArrowFunction) -> bool {
        let mut mutated = false;
        let body = match arrow.body {
            ArrowBody::Expression(ref expr) => expr,
            ArrowBody::Block(_) => return true,
        };
        walk_identifiers(body, &mut |id: &Id| {
            if let Some(binding) = self.analysis.resolve(id.0) {
                if binding.assignments > 0 {
                    mutated = true;
                }
            }
        });
        mutated
    }

    pub(crate) fn target_parts(
        &mut self,
        target: &'a AssignTarget,
        ctx: &mut Ctx,
        sink: &mut Vec<py::Stmt>,
    ) -> TargetRef {
        match *target {
            AssignTarget::Identifier(ref id) => TargetRef::Name(self.rename(id.1, ctx)),
            AssignTarget::StaticMember(_, ref object, property) => {
                let object = self.lower_once(object, ctx, sink);
                TargetRef::Attr(object, property.as_str().to_string())
            }
            AssignTarget::ComputedMember(_, ref object, ref property) => {
                let object = self.lower_once(object, ctx, sink);
                let property = self.lower_once(property, ctx, sink);
                TargetRef::Index(object, property)
            }
        }
    }

    /// Lower an expression and pin it to a temporary unless it is already
    /// re-readable without side effects.
    fn lower_once(
        &mut self,
        expr: &'a Expression,
        ctx: &mut Ctx,
        sink: &mut Vec<py::Stmt>,
    ) -> py::Expr {
        let lowered = self.lower_expr(expr, ctx, sink);
        match lowered {
            py::Expr::Name(_) | py::Expr::Num(_) | py::Expr::Str(_) => lowered,
            other => {
                let tmp = self.fresh("tmp");
                sink.push(py::Stmt::assign(py::Expr::name(tmp.clone()), other));
                py::Expr::name(tmp)
            }
        }
    }

    pub(crate) fn read_target(&mut self, target: &TargetRef) -> py::Expr {
        match *target {
            TargetRef::Name(ref name) => py::Expr::name(name.clone()),
            TargetRef::Attr(ref object, ref property) => {
                self.member_read(object.clone(), property)
            }
            TargetRef::Index(ref object, ref property) => {
                self.helper_call("js_getindex", vec![object.clone(), property.clone()])
            }
        }
    }

    pub(crate) fn write_target(
        &mut self,
        target: &TargetRef,
        value: py::Expr,
        sink: &mut Vec<py::Stmt>,
    ) {
        match *target {
            TargetRef::Name(ref name) => {
                sink.push(py::Stmt::assign(py::Expr::name(name.clone()), value));
            }
            TargetRef::Attr(ref object, ref property) => {
                sink.push(py::Stmt::assign(
                    py::Expr::attribute(object.clone(), property.clone()),
                    value,
                ));
            }
            TargetRef::Index(ref object, ref property) => {
                let set = self.helper_call(
                    "js_setindex",
                    vec![object.clone(), property.clone(), value],
                );
                sink.push(py::Stmt::expr(set));
            }
        }
    }
}

pub(crate) fn assign_bin_op(op: AssignOp) -> Option<BinOp> {
    match op {
        AssignOp::Eq => None,
        AssignOp::PlusEq => Some(BinOp::Plus),
        AssignOp::MinusEq => Some(BinOp::Minus),
        AssignOp::TimesEq => Some(BinOp::Times),
        AssignOp::DivEq => Some(BinOp::Div),
        AssignOp::ModEq => Some(BinOp::Mod),
        AssignOp::LShiftEq => Some(BinOp::LShift),
        AssignOp::RShiftEq => Some(BinOp::RShift),
        AssignOp::URShiftEq => Some(BinOp::URShift),
        AssignOp::BitAndEq => Some(BinOp::BitAnd),
        AssignOp::BitXorEq => Some(BinOp::BitXor),
        AssignOp::BitOrEq => Some(BinOp::BitOr),
    }
}

/// Whether lowering this expression must lift statements into a sink.
/// Conservative: used only to decide lambda eligibility for arrows.
pub(crate) fn expression_needs_statements(expr: &Expression) -> bool {
    match *expr {
        Expression::Assignment(..)
        | Expression::Update(..)
        | Expression::Sequence(..)
        | Expression::Function(..)
        | Expression::Class(..) => true,
        Expression::ArrowFunction(ref arrow) => match arrow.body {
            ArrowBody::Block(_) => true,
            ArrowBody::Expression(ref body) => {
                arrow
                    .parameters
                    .iter()
                    .any(|p| !matches!(p, Pattern::Identifier(_)))
                    || expression_needs_statements(body)
            }
        },
        Expression::Object(_, ref props) => props.iter().any(|prop| match *prop {
            Prop::Spread(..) | Prop::Method(..) | Prop::Get(..) | Prop::Set(..) => true,
            Prop::Init { ref key, ref value, .. } => {
                matches!(key, PropKey::Computed(..)) || expression_needs_statements(value)
            }
        }),
        Expression::Array(_, ref elements) => elements.iter().any(|element| match *element {
            ArrayElement::Expression(ref expr) => expression_needs_statements(expr),
            ArrayElement::Spread(_, ref expr) => expression_needs_statements(expr),
            ArrayElement::Hole(_) => false,
        }),
        Expression::Unary(_, UnOp::Void, _) | Expression::Unary(_, UnOp::Delete, _) => true,
        Expression::Unary(_, _, ref operand) => expression_needs_statements(operand),
        Expression::Binary(_, _, ref left, ref right)
        | Expression::Logical(_, _, ref left, ref right) => {
            expression_needs_statements(left) || expression_needs_statements(right)
        }
        Expression::Conditional(_, ref test, ref consequent, ref alternate) => {
            expression_needs_statements(test)
                || expression_needs_statements(consequent)
                || expression_needs_statements(alternate)
        }
        Expression::Call(_, ref callee, ref args) | Expression::New(_, ref callee, ref args) => {
            expression_needs_statements(callee)
                || args.iter().any(|arg| match *arg {
                    Argument::Expression(ref expr) | Argument::Spread(_, ref expr) => {
                        expression_needs_statements(expr)
                    }
                })
        }
        Expression::StaticMember(_, ref object, _) => expression_needs_statements(object),
        Expression::ComputedMember(_, ref object, ref property) => {
            expression_needs_statements(object) || expression_needs_statements(property)
        }
        Expression::TemplateLiteral(_, ref template) => template
            .expressions
            .iter()
            .any(expression_needs_statements),
        Expression::Literal(..) | Expression::Identifier(_) | Expression::This(_) => false,
    }
}

/// Walk identifier reads in an expression tree, skipping nothing: used for
/// the read-only-captures check, where over-approximation is safe.
pub(crate) fn walk_identifiers(expr: &Expression, visit: &mut dyn FnMut(&Id)) {
    match *expr {
        Expression::Identifier(ref id) => visit(id),
        Expression::Literal(..) | Expression::This(_) => {}
        Expression::TemplateLiteral(_, ref template) => {
            for expr in &template.expressions {
                walk_identifiers(expr, visit);
            }
        }
        Expression::Array(_, ref elements) => {
            for element in elements {
                match *element {
                    ArrayElement::Expression(ref expr) | ArrayElement::Spread(_, ref expr) => {
                        walk_identifiers(expr, visit)
                    }
                    ArrayElement::Hole(_) => {}
                }
            }
        }
        Expression::Object(_, ref props) => {
            for prop in props {
                match *prop {
                    Prop::Init { ref key, ref value, .. } => {
                        if let PropKey::Computed(_, ref key) = *key {
                            walk_identifiers(key, visit);
                        }
                        walk_identifiers(value, visit);
                    }
                    Prop::Method(..) | Prop::Get(..) | Prop::Set(..) => {}
                    Prop::Spread(_, ref expr) => walk_identifiers(expr, visit),
                }
            }
        }
        Expression::Function(..) | Expression::Class(..) => {}
        Expression::ArrowFunction(ref arrow) => {
            if let ArrowBody::Expression(ref body) = arrow.body {
                walk_identifiers(body, visit);
            }
        }
        Expression::Unary(_, _, ref operand) => walk_identifiers(operand, visit),
        Expression::Update(_, _, ref target, _) => {
            if let AssignTarget::Identifier(ref id) = **target {
                visit(id);
            }
        }
        Expression::Binary(_, _, ref left, ref right)
        | Expression::Logical(_, _, ref left, ref right) => {
            walk_identifiers(left, visit);
            walk_identifiers(right, visit);
        }
        Expression::Conditional(_, ref test, ref consequent, ref alternate) => {
            walk_identifiers(test, visit);
            walk_identifiers(consequent, visit);
            walk_identifiers(alternate, visit);
        }
        Expression::Assignment(_, _, ref target, ref value) => {
            if let AssignTarget::Identifier(ref id) = **target {
                visit(id);
            }
            walk_identifiers(value, visit);
        }
        Expression::Sequence(_, ref expressions) => {
            for expr in expressions {
                walk_identifiers(expr, visit);
            }
        }
        Expression::Call(_, ref callee, ref args) | Expression::New(_, ref callee, ref args) => {
            walk_identifiers(callee, visit);
            for arg in args {
                match *arg {
                    Argument::Expression(ref expr) | Argument::Spread(_, ref expr) => {
                        walk_identifiers(expr, visit)
                    }
                }
            }
        }
        Expression::StaticMember(_, ref object, _) => walk_identifiers(object, visit),
        Expression::ComputedMember(_, ref object, ref property) => {
            walk_identifiers(object, visit);
            walk_identifiers(property, visit);
        }
    }
}
