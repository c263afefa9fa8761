//! Tree-to-tree lowering from the source AST onto the target AST.
//!
//! Dispatch is one rule per node kind: `stmt.rs` holds the statement
//! rules, `expr.rs` the expression rules, keyed by the closed unions in
//! `syntax::ast`. Rules receive a context (scope info, `this` name, hoist
//! sink) and a statement sink for expressions that must be lifted.

mod context;
mod expr;
mod stmt;

pub use context::{Breakable, Ctx, LabelFrame};

use crate::analyze::AnalysisResult;
use crate::diagnostics::{Diagnostic, Level};
use crate::intern::Symbol;
use crate::py::ast as py;
use crate::py::{ExportsRecord, RuntimeUses};
use crate::syntax::ast::{Expression, Program};
use crate::syntax::span::Span;
use fnv::FnvHashSet;
use lazy_static::lazy_static;

lazy_static! {
    /// Python keywords and commonly-shadowed builtins; colliding source
    /// names get the stable `_js` suffix.
    static ref PY_RESERVED: FnvHashSet<&'static str> = [
        "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
        "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
        "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise",
        "return", "try", "while", "with", "yield",
        "abs", "bool", "dict", "filter", "float", "id", "input", "int", "len", "list", "map",
        "max", "min", "object", "open", "print", "range", "repr", "self", "set", "str", "sum",
        "tuple", "type", "zip", "Exception",
    ]
    .iter()
    .copied()
    .collect();
}

/// Facade globals the emitted program can reference by name.
pub(crate) const FACADE_GLOBALS: &[&str] = &["console", "Array", "Object", "Date", "JSON"];

/// `export default` payloads held until the module bottom.
pub(crate) enum DeferredDefault<'a> {
    Expr(&'a Expression),
    Name(String),
}

#[derive(Debug)]
pub struct TransformOutput {
    pub module: py::Module,
    pub uses: RuntimeUses,
    pub exports: ExportsRecord,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct Transformer<'a> {
    pub(crate) analysis: &'a AnalysisResult,
    pub(crate) file: &'a str,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) uses: RuntimeUses,
    pub(crate) exports: ExportsRecord,
    pub(crate) temp_counter: u32,
    /// CommonJS requires hoisted to module top: (module, alias) pairs.
    pub(crate) require_aliases: Vec<(String, String)>,
    pub(crate) hoisted_imports: Vec<py::Stmt>,
    /// `export default` payloads, assigned at module bottom.
    pub(crate) deferred_defaults: Vec<DeferredDefault<'a>>,
}

pub fn transform(program: &Program, analysis: &AnalysisResult, file: &str) -> TransformOutput {
    let mut transformer = Transformer {
        analysis,
        file,
        diagnostics: Vec::new(),
        uses: RuntimeUses::new(),
        exports: ExportsRecord::new(),
        temp_counter: 0,
        require_aliases: Vec::new(),
        hoisted_imports: Vec::new(),
        deferred_defaults: Vec::new(),
    };

    let mut ctx = Ctx::module();
    let mut body = Vec::new();
    transformer.lower_stmt_list(&program.body, &mut ctx, &mut body);

    let deferred = std::mem::take(&mut transformer.deferred_defaults);
    for default in deferred {
        let value = match default {
            DeferredDefault::Expr(expr) => transformer.lower_expr(expr, &mut ctx, &mut body),
            DeferredDefault::Name(name) => py::Expr::Name(name),
        };
        body.push(py::Stmt::assign(py::Expr::name("_default"), value));
        transformer.exports.add("_default");
    }

    let mut module_body = std::mem::take(&mut transformer.hoisted_imports);
    for name in &ctx.hoist {
        transformer.uses.add("undefined");
        module_body.push(py::Stmt::assign(
            py::Expr::name(name.clone()),
            py::Expr::name("undefined"),
        ));
    }
    module_body.extend(body);

    TransformOutput {
        module: py::Module { body: module_body },
        uses: transformer.uses,
        exports: transformer.exports,
        diagnostics: transformer.diagnostics,
    }
}

impl<'a> Transformer<'a> {
    pub(crate) fn diag(
        &mut self,
        span: Span,
        level: Level,
        code: &'static str,
        message: impl Into<String>,
    ) {
        self.diagnostics
            .push(Diagnostic::new(self.file, span, level, code, message));
    }

    pub(crate) fn fresh(&mut self, prefix: &str) -> String {
        self.temp_counter += 1;
        format!("_{}{}", prefix, self.temp_counter)
    }

    /// Reference a runtime helper, recording it for the import preamble.
    pub(crate) fn helper(&mut self, name: &'static str) -> py::Expr {
        self.uses.add(name);
        py::Expr::name(name)
    }

    pub(crate) fn helper_call(&mut self, name: &'static str, args: Vec<py::Expr>) -> py::Expr {
        let func = self.helper(name);
        py::Expr::call(func, args)
    }

    /// Target-side name for a source identifier. Collisions with Python
    /// reserved words and builtins get the stable `_js` suffix; the rewrite
    /// is recorded in the context's rename map. Double-underscore names
    /// pass through untouched.
    pub(crate) fn rename(&mut self, name: Symbol, ctx: &mut Ctx) -> String {
        let text = name.as_str();
        if text == "super" || text.starts_with("__") {
            return text.to_string();
        }
        if PY_RESERVED.contains(text) {
            let renamed = format!("{}_js", text);
            ctx.renames.insert(name, renamed.clone());
            return renamed;
        }
        text.to_string()
    }

    /// Sanitized Python module name for a JS module source string.
    pub(crate) fn module_name(source: &str) -> String {
        let mut text = source;
        while let Some(stripped) = text
            .strip_prefix("./")
            .or_else(|| text.strip_prefix("../"))
        {
            text = stripped;
        }
        let text = text
            .strip_suffix(".js")
            .or_else(|| text.strip_suffix(".mjs"))
            .or_else(|| text.strip_suffix(".cjs"))
            .unwrap_or(text);
        let mut out = String::with_capacity(text.len());
        for ch in text.chars() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                out.push(ch);
            } else {
                out.push('_');
            }
        }
        if out.is_empty() || out.as_bytes()[0].is_ascii_digit() {
            out.insert(0, '_');
        }
        out
    }
}
