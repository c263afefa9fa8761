//! js2py translates a single JavaScript source file (ES5 plus a fixed ES6
//! subset) into a semantically equivalent Python program.
//!
//! The core is a linear five-stage pipeline (parse, bind/analyze,
//! transform, emit, assemble) threaded by an append-only diagnostic bus.
//! The emitted program calls into an external `js_runtime` facade for the
//! semantics Python does not share with JavaScript.

pub mod analyze;
pub mod cache;
pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod intern;
pub mod pipeline;
pub mod py;
pub mod syntax;
pub mod trans;

pub use config::{Config, RuntimeMode};
pub use diagnostics::{Diagnostic, Level};
pub use errors::Error;
pub use pipeline::{run, RunOutcome, RunStats};
pub use py::ExportsRecord;
pub use syntax::Mode;

/// Run the whole pipeline for one source string.
pub fn convert(source: &str, config: &Config) -> Result<RunOutcome, Error> {
    pipeline::run(source, config)
}

/// Convenience wrapper for callers that only want the output text.
pub fn transform(source: &str) -> Result<String, Error> {
    let config = Config::new("<input>");
    pipeline::run(source, &config).map(|outcome| outcome.output)
}
