pub mod ast;
pub mod char;
pub mod ops;
pub mod parser;
pub mod scanner;
pub mod span;
pub mod token;

use crate::diagnostics::Diagnostic;
use crate::errors::Result;
pub use parser::Parser;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fmt::Write as _;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Script,
    Module,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Mode::Script => write!(f, "script"),
            Mode::Module => write!(f, "module"),
        }
    }
}

#[derive(Debug)]
pub struct ParseOutput {
    pub program: ast::Program,
    pub hash: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse one source file. In tolerant mode syntax errors are returned as
/// diagnostics alongside a best-effort tree; otherwise the first error
/// aborts.
pub fn parse(source: &str, file: &str, mode: Mode, tolerant: bool) -> Result<ParseOutput> {
    let mut parser = Parser::new(source, file, mode, tolerant)?;
    let program = parser.parse()?;
    Ok(ParseOutput {
        program,
        hash: content_hash(source, mode),
        diagnostics: parser.into_diagnostics(),
    })
}

/// Cache key: SHA-256 over the (BOM-stripped) source bytes followed by the
/// parse mode tag, rendered as lowercase hex.
pub fn content_hash(source: &str, mode: Mode) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update([0u8]);
    hasher.update(mode.to_string().as_bytes());
    let digest = hasher.finalize();

    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(hex, "{:02x}", byte);
    }
    hex
}

/// Format a numeric property key the way JS coerces it to a string.
pub fn number_to_key(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_stable_and_mode_sensitive() {
        let a = content_hash("var x = 1", Mode::Script);
        let b = content_hash("var x = 1", Mode::Script);
        let c = content_hash("var x = 1", Mode::Module);
        let d = content_hash("var x = 1 ", Mode::Script);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn parses_simple_program() {
        let out = parse("var x = 1;", "t.js", Mode::Script, false).unwrap();
        assert_eq!(out.program.body.len(), 1);
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn tolerant_mode_records_and_recovers() {
        let out = parse("var = ;\nvar y = 2;", "t.js", Mode::Script, true).unwrap();
        assert!(!out.diagnostics.is_empty());
        assert!(!out.program.body.is_empty());
    }

    #[test]
    fn strict_parse_mode_aborts() {
        assert!(parse("var = ;", "t.js", Mode::Script, false).is_err());
    }
}
