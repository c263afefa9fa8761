use crate::syntax::Mode;
use std::path::PathBuf;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RuntimeMode {
    /// Emit the `from js_runtime import …` preamble (the default).
    Include,
    /// Suppress the preamble; the caller provides the facade names.
    Skip,
}

/// Fully resolved configuration for one pipeline run. The CLI (or any
/// other driver) resolves flags and paths into this record; the core never
/// consults the environment itself.
#[derive(Debug, Clone)]
pub struct Config {
    /// Source path as shown in diagnostics and the output header.
    pub file: String,
    pub mode: Mode,
    /// Strict runs parse without recovery and promote warnings to errors
    /// at stage boundaries.
    pub strict: bool,
    pub runtime: RuntimeMode,
    /// AST cache directory; `None` disables caching.
    pub cache_dir: Option<PathBuf>,
}

impl Config {
    pub fn new(file: impl Into<String>) -> Config {
        Config {
            file: file.into(),
            mode: Mode::Script,
            strict: false,
            runtime: RuntimeMode::Include,
            cache_dir: None,
        }
    }
}
