//! Deterministic printer for the target AST.
//!
//! A straight walk over the tree: four-space indent, leading `#` comment
//! lines, precedence-aware parenthesization. The same tree always prints
//! to byte-identical text; no semantic decisions are made here.

use crate::py::ast::*;
use crate::py::{ExportsRecord, RuntimeUses};

pub const RUNTIME_MODULE: &str = "js_runtime";

pub fn emit(
    module: &Module,
    uses: &RuntimeUses,
    exports: &ExportsRecord,
    include_runtime: bool,
) -> String {
    let mut writer = Writer::new();

    if include_runtime && !uses.is_empty() {
        let names: Vec<&str> = uses.names().collect();
        writer.line(&format!(
            "from {} import {}",
            RUNTIME_MODULE,
            names.join(", ")
        ));
        writer.blank();
    }

    for stmt in &module.body {
        writer.stmt(stmt);
    }

    if !exports.is_empty() {
        writer.blank();
        let quoted: Vec<String> = exports
            .names()
            .iter()
            .map(|name| format!("\"{}\"", name))
            .collect();
        writer.line(&format!("__all__ = [{}]", quoted.join(", ")));
    }

    writer.finish()
}

struct Writer {
    out: String,
    indent: usize,
}

impl Writer {
    fn new() -> Writer {
        Writer {
            out: String::new(),
            indent: 0,
        }
    }

    fn finish(mut self) -> String {
        while self.out.ends_with("\n\n") {
            self.out.pop();
        }
        if !self.out.ends_with('\n') {
            self.out.push('\n');
        }
        self.out
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn blank(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }

    fn body(&mut self, statements: &[Stmt]) {
        self.indent += 1;
        if statements.is_empty() {
            self.line("pass");
        } else {
            for stmt in statements {
                self.stmt(stmt);
            }
        }
        self.indent -= 1;
    }

    fn stmt(&mut self, stmt: &Stmt) {
        for comment in &stmt.comments {
            self.line(&format!("# {}", comment));
        }
        match stmt.kind {
            StmtKind::Expr(ref expr) => {
                let text = expr_text(expr, 0);
                self.line(&text);
            }
            StmtKind::Assign {
                ref target,
                ref value,
            } => {
                let text = format!("{} = {}", expr_text(target, 0), expr_text(value, 0));
                self.line(&text);
            }
            StmtKind::AugAssign {
                ref target,
                op,
                ref value,
            } => {
                let text = format!(
                    "{} {}= {}",
                    expr_text(target, 0),
                    bin_op_text(op),
                    expr_text(value, 0)
                );
                self.line(&text);
            }
            StmtKind::Return(ref value) => match *value {
                Some(ref value) => {
                    let text = format!("return {}", expr_text(value, 0));
                    self.line(&text);
                }
                None => self.line("return"),
            },
            StmtKind::Pass => self.line("pass"),
            StmtKind::Break => self.line("break"),
            StmtKind::Continue => self.line("continue"),
            StmtKind::If { .. } => self.if_chain(stmt, "if"),
            StmtKind::While { ref test, ref body } => {
                let text = format!("while {}:", expr_text(test, 0));
                self.line(&text);
                self.body(body);
            }
            StmtKind::For {
                ref target,
                ref iter,
                ref body,
            } => {
                let text = format!("for {} in {}:", expr_text(target, 0), expr_text(iter, 0));
                self.line(&text);
                self.body(body);
            }
            StmtKind::FuncDef {
                ref name,
                ref params,
                ref vararg,
                ref decorators,
                ref body,
            } => {
                for decorator in decorators {
                    self.line(&format!("@{}", decorator));
                }
                let mut rendered: Vec<String> = params.iter().map(param_text).collect();
                if let Some(ref vararg) = *vararg {
                    rendered.push(format!("*{}", vararg));
                }
                let text = format!("def {}({}):", name, rendered.join(", "));
                self.line(&text);
                self.body(body);
            }
            StmtKind::ClassDef {
                ref name,
                ref bases,
                ref body,
            } => {
                let text = if bases.is_empty() {
                    format!("class {}:", name)
                } else {
                    let rendered: Vec<String> =
                        bases.iter().map(|base| expr_text(base, 0)).collect();
                    format!("class {}({}):", name, rendered.join(", "))
                };
                self.line(&text);
                self.body(body);
            }
            StmtKind::Try {
                ref body,
                ref handler,
                ref finalbody,
            } => {
                self.line("try:");
                self.body(body);
                if let Some(ref handler) = *handler {
                    let text = match handler.name {
                        Some(ref name) => format!("except {} as {}:", handler.class, name),
                        None => format!("except {}:", handler.class),
                    };
                    self.line(&text);
                    self.body(&handler.body);
                }
                if !finalbody.is_empty() {
                    self.line("finally:");
                    self.body(finalbody);
                }
            }
            StmtKind::Raise(ref value) => match *value {
                Some(ref value) => {
                    let text = format!("raise {}", expr_text(value, 0));
                    self.line(&text);
                }
                None => self.line("raise"),
            },
            StmtKind::Import {
                ref module,
                ref alias,
            } => match *alias {
                Some(ref alias) if alias != module => {
                    self.line(&format!("import {} as {}", module, alias))
                }
                _ => self.line(&format!("import {}", module)),
            },
            StmtKind::ImportFrom {
                ref module,
                ref names,
            } => {
                let rendered: Vec<String> = names
                    .iter()
                    .map(|(name, alias)| match *alias {
                        Some(ref alias) if alias != name => format!("{} as {}", name, alias),
                        _ => name.clone(),
                    })
                    .collect();
                self.line(&format!("from {} import {}", module, rendered.join(", ")));
            }
        }
    }

    /// `if`/`elif` collapsing: a lone `If` in the else branch prints as
    /// `elif` instead of a nested block.
    fn if_chain(&mut self, stmt: &Stmt, keyword: &str) {
        if let StmtKind::If {
            ref test,
            ref body,
            ref orelse,
        } = stmt.kind
        {
            let text = format!("{} {}:", keyword, expr_text(test, 0));
            self.line(&text);
            self.body(body);
            if orelse.is_empty() {
                return;
            }
            if orelse.len() == 1 {
                if let StmtKind::If { .. } = orelse[0].kind {
                    if orelse[0].comments.is_empty() {
                        self.if_chain(&orelse[0], "elif");
                        return;
                    }
                }
            }
            self.line("else:");
            self.body(orelse);
        }
    }
}

fn param_text(param: &Param) -> String {
    match param.default {
        Some(ref default) => format!("{}={}", param.name, expr_text(default, 0)),
        None => param.name.clone(),
    }
}

fn bin_op_text(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mult => "*",
        BinOp::Div => "/",
        BinOp::Mod => "%",
        BinOp::BitAnd => "&",
        BinOp::BitOr => "|",
        BinOp::BitXor => "^",
        BinOp::LShift => "<<",
        BinOp::RShift => ">>",
    }
}

fn cmp_op_text(op: CmpOp) -> &'static str {
    match op {
        CmpOp::Eq => "==",
        CmpOp::NotEq => "!=",
        CmpOp::Lt => "<",
        CmpOp::LtE => "<=",
        CmpOp::Gt => ">",
        CmpOp::GtE => ">=",
        CmpOp::Is => "is",
        CmpOp::IsNot => "is not",
        CmpOp::In => "in",
        CmpOp::NotIn => "not in",
    }
}

fn bin_prec(op: BinOp) -> u8 {
    match op {
        BinOp::BitOr => 7,
        BinOp::BitXor => 8,
        BinOp::BitAnd => 9,
        BinOp::LShift | BinOp::RShift => 10,
        BinOp::Add | BinOp::Sub => 11,
        BinOp::Mult | BinOp::Div | BinOp::Mod => 12,
    }
}

fn prec(expr: &Expr) -> u8 {
    match *expr {
        Expr::Lambda { .. } => 1,
        Expr::IfExp { .. } => 2,
        Expr::Bool_(BoolOp::Or, _) => 3,
        Expr::Bool_(BoolOp::And, _) => 4,
        Expr::Unary(UnaryOp::Not, _) => 5,
        Expr::Compare(..) => 6,
        Expr::Bin(_, op, _) => bin_prec(op),
        Expr::Unary(..) => 13,
        _ => 15,
    }
}

fn expr_text(expr: &Expr, min_prec: u8) -> String {
    let own = prec(expr);
    let text = match *expr {
        Expr::Name(ref name) => name.clone(),
        Expr::Num(n) => num_text(n),
        Expr::Str(ref text) => str_text(text),
        Expr::Bool(true) => "True".to_string(),
        Expr::Bool(false) => "False".to_string(),
        Expr::None_ => "None".to_string(),
        Expr::List(ref elements) => {
            let rendered: Vec<String> = elements.iter().map(|e| expr_text(e, 0)).collect();
            format!("[{}]", rendered.join(", "))
        }
        Expr::Tuple(ref elements) => {
            let rendered: Vec<String> = elements.iter().map(|e| expr_text(e, 0)).collect();
            if rendered.len() == 1 {
                format!("({},)", rendered[0])
            } else {
                format!("({})", rendered.join(", "))
            }
        }
        Expr::Dict(ref pairs) => {
            let rendered: Vec<String> = pairs
                .iter()
                .map(|(key, value)| format!("{}: {}", expr_text(key, 0), expr_text(value, 0)))
                .collect();
            format!("{{{}}}", rendered.join(", "))
        }
        Expr::Attribute(ref object, ref name) => {
            let object_text = match **object {
                Expr::Num(_) => format!("({})", expr_text(object, 0)),
                _ => expr_text(object, 15),
            };
            format!("{}.{}", object_text, name)
        }
        Expr::Subscript(ref object, ref index) => {
            format!("{}[{}]", expr_text(object, 15), expr_text(index, 0))
        }
        Expr::Slice {
            ref lower,
            ref upper,
        } => {
            let lower_text = lower.as_ref().map_or(String::new(), |e| expr_text(e, 0));
            let upper_text = upper.as_ref().map_or(String::new(), |e| expr_text(e, 0));
            format!("{}:{}", lower_text, upper_text)
        }
        Expr::Call { ref func, ref args } => {
            let rendered: Vec<String> = args.iter().map(|arg| expr_text(arg, 0)).collect();
            format!("{}({})", expr_text(func, 15), rendered.join(", "))
        }
        Expr::Starred(ref inner) => format!("*{}", expr_text(inner, 15)),
        Expr::Unary(op, ref operand) => match op {
            UnaryOp::Not => format!("not {}", expr_text(operand, 5)),
            UnaryOp::USub => format!("-{}", expr_text(operand, 13)),
            UnaryOp::UAdd => format!("+{}", expr_text(operand, 13)),
            UnaryOp::Invert => format!("~{}", expr_text(operand, 13)),
        },
        Expr::Bin(ref left, op, ref right) => {
            let p = bin_prec(op);
            format!(
                "{} {} {}",
                expr_text(left, p),
                bin_op_text(op),
                expr_text(right, p + 1)
            )
        }
        Expr::Compare(ref left, op, ref right) => {
            format!(
                "{} {} {}",
                expr_text(left, 7),
                cmp_op_text(op),
                expr_text(right, 7)
            )
        }
        Expr::Bool_(op, ref values) => {
            let own_prec = prec(expr);
            let keyword = match op {
                BoolOp::And => " and ",
                BoolOp::Or => " or ",
            };
            let rendered: Vec<String> = values
                .iter()
                .map(|value| expr_text(value, own_prec + 1))
                .collect();
            rendered.join(keyword)
        }
        Expr::IfExp {
            ref test,
            ref body,
            ref orelse,
        } => {
            format!(
                "{} if {} else {}",
                expr_text(body, 3),
                expr_text(test, 3),
                expr_text(orelse, 2)
            )
        }
        Expr::Lambda {
            ref params,
            ref body,
        } => {
            let rendered: Vec<String> = params.iter().map(param_text).collect();
            if rendered.is_empty() {
                format!("lambda: {}", expr_text(body, 1))
            } else {
                format!("lambda {}: {}", rendered.join(", "), expr_text(body, 1))
            }
        }
    };

    if own < min_prec {
        format!("({})", text)
    } else {
        text
    }
}

fn num_text(n: f64) -> String {
    if n.is_nan() {
        return "float('nan')".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 {
            "float('inf')".to_string()
        } else {
            "-float('inf')".to_string()
        };
    }
    if n.fract() == 0.0 && n.abs() < 1e16 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

fn str_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(stmt: Stmt) -> String {
        let module = Module { body: vec![stmt] };
        emit(&module, &RuntimeUses::new(), &ExportsRecord::new(), true)
    }

    #[test]
    fn renders_elif_chains() {
        let chain = Stmt::new(StmtKind::If {
            test: Expr::name("a"),
            body: vec![Stmt::expr(Expr::Num(1.0))],
            orelse: vec![Stmt::new(StmtKind::If {
                test: Expr::name("b"),
                body: vec![Stmt::expr(Expr::Num(2.0))],
                orelse: vec![Stmt::expr(Expr::Num(3.0))],
            })],
        });
        assert_eq!(render(chain), "if a:\n    1\nelif b:\n    2\nelse:\n    3\n");
    }

    #[test]
    fn parenthesizes_by_precedence() {
        let expr = Expr::Bin(
            Box::new(Expr::Bin(
                Box::new(Expr::name("a")),
                BinOp::Add,
                Box::new(Expr::name("b")),
            )),
            BinOp::Mult,
            Box::new(Expr::name("c")),
        );
        assert_eq!(render(Stmt::expr(expr)), "(a + b) * c\n");
    }

    #[test]
    fn empty_bodies_get_pass() {
        let class = Stmt::new(StmtKind::ClassDef {
            name: "Empty".to_string(),
            bases: vec![],
            body: vec![],
        });
        assert_eq!(render(class), "class Empty:\n    pass\n");
    }

    #[test]
    fn comments_precede_statements() {
        let stmt = Stmt::commented("TODO(js2py): review", StmtKind::Pass);
        assert_eq!(render(stmt), "# TODO(js2py): review\npass\n");
    }

    #[test]
    fn runtime_preamble_lists_sorted_helpers() {
        let mut uses = RuntimeUses::new();
        uses.add("js_plus");
        uses.add("JsError");
        let module = Module {
            body: vec![Stmt::expr(Expr::name("x"))],
        };
        let text = emit(&module, &uses, &ExportsRecord::new(), true);
        assert_eq!(text, "from js_runtime import JsError, js_plus\n\nx\n");
        let skipped = emit(&module, &uses, &ExportsRecord::new(), false);
        assert_eq!(skipped, "x\n");
    }

    #[test]
    fn exports_footer_lists_names() {
        let mut exports = ExportsRecord::new();
        exports.add("a");
        exports.add("b");
        exports.add("a");
        let module = Module {
            body: vec![Stmt::expr(Expr::name("x"))],
        };
        let text = emit(&module, &RuntimeUses::new(), &exports, true);
        assert_eq!(text, "x\n\n__all__ = [\"a\", \"b\"]\n");
    }
}
