//! The five-stage pipeline: parse, analyze, transform, emit, assemble.
//!
//! Stages run strictly in sequence; the diagnostic bus is the only value
//! touched by more than one stage, and ownership is handed from stage to
//! stage. In strict mode, warnings promote to errors at stage boundaries
//! only, so each stage completes (or aborts) as a unit.

use crate::analyze;
use crate::cache::AstCache;
use crate::config::{Config, RuntimeMode};
use crate::diagnostics::{codes, Diagnostic, DiagnosticBus, Level};
use crate::errors::Error;
use crate::py;
use crate::py::ExportsRecord;
use crate::syntax;
use crate::syntax::span::Span;
use crate::trans;
use std::path::Path;
use tracing::{debug, info_span};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    /// Whether a real parse happened this run.
    pub parsed: bool,
    pub cache_hit: bool,
}

#[derive(Debug)]
pub struct RunOutcome {
    pub output: String,
    /// Sorted by (file, line, column, code).
    pub diagnostics: Vec<Diagnostic>,
    pub exports: ExportsRecord,
    pub stats: RunStats,
}

impl RunOutcome {
    pub fn success(&self) -> bool {
        !self.diagnostics.iter().any(|d| d.level == Level::Error)
    }
}

pub fn run(source: &str, config: &Config) -> Result<RunOutcome, Error> {
    let span = info_span!("pipeline", file = %config.file);
    let _entered = span.enter();

    let source = strip_bom(source);
    let mut bus = DiagnosticBus::new();
    let mut stats = RunStats::default();

    // Stage 1: parser front-end, keyed by content hash.
    let hash = syntax::content_hash(source, config.mode);
    let cache = config.cache_dir.as_ref().map(AstCache::new);
    let program = match cache.as_ref().and_then(|cache| cache.load(&hash)) {
        Some(program) => {
            debug!(%hash, "ast cache hit");
            stats.cache_hit = true;
            program
        }
        None => {
            debug!(%hash, "parsing");
            stats.parsed = true;
            let parsed = syntax::parse(source, &config.file, config.mode, !config.strict)?;
            let clean = parsed.diagnostics.is_empty();
            bus.extend(parsed.diagnostics);
            if let Some(ref cache) = cache {
                // Trees recovered from bad input are not cached; replaying
                // them would drop their parse diagnostics.
                if clean {
                    if let Err(err) = cache.store(&hash, config.mode, &parsed.program) {
                        bus.push(Diagnostic::new(
                            &config.file,
                            Span::initial(),
                            Level::Info,
                            codes::CACHE,
                            format!("ast cache write failed: {}", err),
                        ));
                    }
                }
            }
            parsed.program
        }
    };
    if config.strict {
        bus.promote_warnings();
    }

    // Stage 2: binder/analyzer.
    let analysis = {
        let span = info_span!("analyze");
        let _entered = span.enter();
        analyze::analyze(&program, config.mode, &config.file)
    };
    bus.extend(analysis.diagnostics.iter().cloned());
    if config.strict {
        bus.promote_warnings();
    }

    // Stage 3: transformer.
    let lowered = {
        let span = info_span!("transform");
        let _entered = span.enter();
        trans::transform(&program, &analysis, &config.file)
    };
    bus.extend(lowered.diagnostics);
    if config.strict {
        bus.promote_warnings();
    }

    // Stage 4: emitter.
    let text = py::emit::emit(
        &lowered.module,
        &lowered.uses,
        &lowered.exports,
        config.runtime == RuntimeMode::Include,
    );

    // Stage 5: assembler.
    let output = assemble(&text, &config.file);

    Ok(RunOutcome {
        output,
        diagnostics: bus.into_sorted(),
        exports: lowered.exports,
        stats,
    })
}

/// Prepend the generated-file header; the emitter already guarantees LF
/// endings and a trailing newline.
fn assemble(text: &str, file: &str) -> String {
    let basename = Path::new(file)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.to_string());
    let mut output = format!("# Generated by js2py from {}\n", basename);
    output.push_str(text);
    output
}

pub fn strip_bom(source: &str) -> &str {
    source.strip_prefix('\u{feff}').unwrap_or(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bom_is_stripped() {
        assert_eq!(strip_bom("\u{feff}var x"), "var x");
        assert_eq!(strip_bom("var x"), "var x");
    }

    #[test]
    fn header_names_the_source_basename() {
        let config = Config::new("some/dir/app.js");
        let outcome = run("var x = 1;", &config).unwrap();
        assert!(outcome
            .output
            .starts_with("# Generated by js2py from app.js\n"));
    }
}
