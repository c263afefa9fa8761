use js2py::{Config, Mode};

fn convert_module(source: &str) -> js2py::RunOutcome {
    let mut config = Config::new("test.js");
    config.mode = Mode::Module;
    js2py::convert(source, &config).unwrap()
}

fn convert_script(source: &str) -> js2py::RunOutcome {
    js2py::convert(source, &Config::new("test.js")).unwrap()
}

#[test]
fn commonjs_require_and_exports_object() {
    let source = "\
const fs = require('fs');

function a() {
  return fs;
}

var b = 1;

module.exports = { a, b };
";
    let outcome = convert_script(source);
    assert_eq!(
        outcome.output,
        "# Generated by js2py from test.js\n\
         from js_runtime import undefined\n\
         \n\
         import fs\n\
         b = undefined\n\
         def a():\n\
         \x20   return fs\n\
         b = 1\n\
         module_exports = {'a': a, 'b': b}\n\
         \n\
         __all__ = [\"a\", \"b\"]\n"
    );
    assert_eq!(outcome.exports.names(), ["a", "b"]);
}

#[test]
fn bare_require_calls_hoist_numbered_imports() {
    let result = convert_script("var x = compute(require('./lib/helper.js'));").output;
    assert!(result.contains("import lib_helper as _m_1"));
    assert!(result.contains("x = compute(_m_1)"));
}

#[test]
fn destructured_require_flattens_to_from_import() {
    let result = convert_script("const { readFile, join: j } = require('tools');").output;
    assert!(result.contains("from tools import readFile, join as j"));
}

#[test]
fn exports_dot_name_binds_and_records() {
    let outcome = convert_script("exports.answer = 42;");
    assert!(outcome.output.contains("answer = 42"));
    assert_eq!(outcome.exports.names(), ["answer"]);
}

#[test]
fn esm_import_forms_map_to_python_imports() {
    let source = "\
import Thing from './thing.js';
import { a, b as c } from 'pkg';
import * as ns from 'util';
import 'side-effect';
";
    let result = convert_module(source).output;
    assert!(result.contains("import thing as Thing"));
    assert!(result.contains("from pkg import a, b as c"));
    assert!(result.contains("import util as ns"));
    assert!(result.contains("import side_effect"));
}

#[test]
fn esm_named_exports_record_without_code() {
    let outcome = convert_module("export const x = 1;\nlet y = 2;\nexport { y };");
    assert!(outcome.output.contains("x = 1"));
    assert!(outcome.output.contains("__all__ = [\"x\", \"y\"]"));
    assert_eq!(outcome.exports.names(), ["x", "y"]);
}

#[test]
fn export_default_lands_at_module_bottom() {
    let outcome = convert_module("export default function main() { return 1; }\nmain();");
    let result = &outcome.output;
    let default_at = result.find("_default = main").unwrap();
    let call_at = result.find("main()").unwrap();
    assert!(default_at > call_at);
    assert!(outcome.exports.names().contains(&"_default".to_string()));
}

#[test]
fn export_default_expression_assigns_the_sentinel_name() {
    let result = convert_module("const answer = 42;\nexport default answer;").output;
    assert!(result.ends_with("_default = answer\n\n__all__ = [\"_default\"]\n"));
}

#[test]
fn reexports_import_then_record() {
    let outcome = convert_module("export { helper as aid } from './util.js';");
    assert!(outcome.output.contains("from util import helper as aid"));
    assert_eq!(outcome.exports.names(), ["aid"]);
}

#[test]
fn mixed_shapes_warn_and_esm_wins_the_footer() {
    let outcome = convert_module("import x from 'm';\nvar t = require('n');\nexport { x };");
    assert!(outcome
        .diagnostics
        .iter()
        .any(|d| d.code == "JSR-MIXED-MODULES" && d.level == js2py::Level::Warn));
    // The CommonJS side contributes no export names in mixed shape.
    assert_eq!(outcome.exports.names(), ["x"]);
}

#[test]
fn import_outside_module_mode_is_a_parse_diagnostic() {
    let outcome = convert_script("import x from 'm';\nvar y = 1;");
    assert!(outcome
        .diagnostics
        .iter()
        .any(|d| d.code == "JSR-PARSE"));
}
