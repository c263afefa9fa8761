//! The diagnostic bus threaded through every pipeline stage.
//!
//! Records are append-only during a run and sorted by (file, line, column,
//! code) for output. Codes are stable short strings so downstream tooling
//! can filter on them across versions.

use crate::syntax::span::Span;
use serde::Serialize;
use std::fmt;

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Level::Info => write!(f, "info"),
            Level::Warn => write!(f, "warning"),
            Level::Error => write!(f, "error"),
        }
    }
}

/// Stable diagnostic codes. Every code emitted anywhere in the pipeline is
/// declared here.
pub mod codes {
    pub const PARSE: &str = "JSR-PARSE";
    pub const UNSUPPORTED: &str = "JSR-UNSUPPORTED";
    pub const DUP_BINDING: &str = "JSR-DUP-BINDING";
    pub const VAR_SHADOW: &str = "JSR-VAR-SHADOW";
    pub const UNRESOLVED: &str = "JSR-UNRESOLVED";
    pub const THIS: &str = "JSR-THIS";
    pub const WITH: &str = "JSR-WITH";
    pub const EVAL: &str = "JSR-EVAL";
    pub const NEW_FUNCTION: &str = "JSR-NEW-FUNCTION";
    pub const ARGUMENTS: &str = "JSR-ARGUMENTS";
    pub const PROTO: &str = "JSR-PROTO";
    pub const DYN_WRITE: &str = "JSR-DYN-WRITE";
    pub const DELETE: &str = "JSR-DELETE";
    pub const DESTRUCTURE: &str = "JSR-DESTRUCTURE";
    pub const MIXED_MODULES: &str = "JSR-MIXED-MODULES";
    pub const DO_WHILE: &str = "JSR-DO-WHILE";
    pub const SPARSE_ARRAY: &str = "JSR-SPARSE-ARRAY";
    pub const GETTER_SETTER: &str = "JSR-GETTER-SETTER";
    pub const LABEL: &str = "JSR-LABEL";
    pub const CACHE: &str = "JSR-CACHE";
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct Diagnostic {
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub level: Level,
    pub code: &'static str,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        file: &str,
        span: Span,
        level: Level,
        code: &'static str,
        message: impl Into<String>,
    ) -> Diagnostic {
        let start = span.start.one_indexed();
        Diagnostic {
            file: file.to_string(),
            line: start.line,
            column: start.column,
            level,
            code,
            message: message.into(),
        }
    }

    fn sort_key(&self) -> (&str, u32, u32, &'static str) {
        (&self.file, self.line, self.column, self.code)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}: {}:{}:{}: {} [{}]",
            self.level, self.file, self.line, self.column, self.message, self.code
        )
    }
}

/// Append-only accumulator shared by all stages of a run.
#[derive(Debug, Default)]
pub struct DiagnosticBus {
    records: Vec<Diagnostic>,
}

impl DiagnosticBus {
    pub fn new() -> DiagnosticBus {
        DiagnosticBus::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.records.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.records.extend(diagnostics);
    }

    pub fn has_errors(&self) -> bool {
        self.records.iter().any(|d| d.level == Level::Error)
    }

    pub fn has_warnings(&self) -> bool {
        self.records.iter().any(|d| d.level == Level::Warn)
    }

    /// Strict-mode promotion, applied at stage boundaries only.
    pub fn promote_warnings(&mut self) {
        for record in &mut self.records {
            if record.level == Level::Warn {
                record.level = Level::Error;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in (file, line, column, code) order.
    pub fn into_sorted(mut self) -> Vec<Diagnostic> {
        self.records.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        self.records
    }

    pub fn records(&self) -> &[Diagnostic] {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::span::{Position, Span};

    fn at(line: u32, column: u32) -> Span {
        let pos = Position { line, column };
        Span { start: pos, end: pos }
    }

    #[test]
    fn sorts_by_file_then_location_then_code() {
        let mut bus = DiagnosticBus::new();
        bus.push(Diagnostic::new("a.js", at(2, 0), Level::Info, codes::WITH, "x"));
        bus.push(Diagnostic::new("a.js", at(1, 4), Level::Info, codes::EVAL, "x"));
        bus.push(Diagnostic::new("a.js", at(1, 4), Level::Info, codes::ARGUMENTS, "x"));
        let sorted = bus.into_sorted();
        assert_eq!(sorted[0].code, codes::ARGUMENTS);
        assert_eq!(sorted[1].code, codes::EVAL);
        assert_eq!(sorted[2].code, codes::WITH);
    }

    #[test]
    fn promotes_warnings_to_errors() {
        let mut bus = DiagnosticBus::new();
        bus.push(Diagnostic::new("a.js", at(1, 0), Level::Warn, codes::WITH, "x"));
        assert!(!bus.has_errors());
        bus.promote_warnings();
        assert!(bus.has_errors());
    }
}
