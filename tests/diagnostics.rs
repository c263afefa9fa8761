use js2py::{Config, Level};

fn convert(source: &str) -> js2py::RunOutcome {
    js2py::convert(source, &Config::new("test.js")).unwrap()
}

fn convert_strict(source: &str) -> Result<js2py::RunOutcome, js2py::Error> {
    let mut config = Config::new("test.js");
    config.strict = true;
    js2py::convert(source, &config)
}

#[test]
fn diagnostics_sort_by_location_then_code() {
    let source = "with (o) { }\nvar a = [1, , 2];\neval('x');";
    let outcome = convert(source);
    assert!(outcome.diagnostics.len() >= 3);
    let keys: Vec<_> = outcome
        .diagnostics
        .iter()
        .map(|d| (d.file.clone(), d.line, d.column, d.code))
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}

#[test]
fn eval_warns_with_its_stable_code() {
    let outcome = convert("eval('1 + 1');");
    let eval = outcome
        .diagnostics
        .iter()
        .find(|d| d.code == "JSR-EVAL")
        .expect("eval reports its stable code");
    assert_eq!(eval.level, Level::Warn);
    assert!(outcome.output.contains("# TODO(js2py): eval is not translated"));
}

#[test]
fn with_warns_and_keeps_translating() {
    let outcome = convert("with (o) { a = 1; }\nafter();");
    assert!(outcome
        .diagnostics
        .iter()
        .any(|d| d.code == "JSR-WITH" && d.level == Level::Warn));
    assert!(outcome.output.contains("after()"));
}

#[test]
fn arguments_use_warns() {
    let outcome = convert("function f() { return arguments.length; }");
    assert!(outcome
        .diagnostics
        .iter()
        .any(|d| d.code == "JSR-ARGUMENTS" && d.level == Level::Warn));
}

#[test]
fn prototype_writes_downgrade_member_reads() {
    let source = "function A() {}\nA.prototype.go = function () { return this.x; };\nvar v = inst.field;";
    let outcome = convert(source);
    assert!(outcome.diagnostics.iter().any(|d| d.code == "JSR-PROTO"));
    assert!(outcome.output.contains("v = js_getindex(inst, 'field')"));
}

#[test]
fn unresolved_globals_are_info_only() {
    let outcome = convert("mystery();");
    let unresolved = outcome
        .diagnostics
        .iter()
        .find(|d| d.code == "JSR-UNRESOLVED")
        .expect("unknown names report their stable code");
    assert_eq!(unresolved.level, Level::Info);
    assert!(outcome.success());
}

#[test]
fn duplicate_let_is_an_error() {
    let outcome = convert("let a = 1; let a = 2;");
    assert!(outcome
        .diagnostics
        .iter()
        .any(|d| d.code == "JSR-DUP-BINDING" && d.level == Level::Error));
    assert!(!outcome.success());
}

#[test]
fn strict_mode_promotes_warnings_to_errors() {
    let source = "with (o) { a = 1; }";
    let relaxed = convert(source);
    assert!(relaxed.success());
    assert!(relaxed.diagnostics.iter().any(|d| d.level == Level::Warn));

    let strict = convert_strict(source).unwrap();
    assert!(!strict.success());
    assert!(strict
        .diagnostics
        .iter()
        .any(|d| d.code == "JSR-WITH" && d.level == Level::Error));
}

#[test]
fn strict_mode_passes_info_only_runs() {
    let source = "var a = [1, , 2];";
    let relaxed = convert(source);
    assert!(relaxed.diagnostics.iter().all(|d| d.level == Level::Info));
    let strict = convert_strict(source).unwrap();
    assert!(strict.success());
}

#[test]
fn strict_mode_aborts_on_parse_errors() {
    assert!(convert_strict("var = ;").is_err());
}

#[test]
fn tolerant_mode_recovers_and_reports() {
    let outcome = convert("var = ;\nvar ok = 1;");
    assert!(outcome
        .diagnostics
        .iter()
        .any(|d| d.code == "JSR-PARSE" && d.level == Level::Error));
    assert!(outcome.output.contains("ok = 1"));
    assert!(!outcome.success());
}

#[test]
fn report_records_carry_the_documented_fields() {
    let outcome = convert("do { f(); } while (g());");
    let value = serde_json::to_value(&outcome.diagnostics).unwrap();
    let record = value
        .as_array()
        .and_then(|records| records.first())
        .expect("at least the do-while record");
    for field in ["file", "line", "column", "level", "code", "message"] {
        assert!(record.get(field).is_some(), "missing field {}", field);
    }
    assert_eq!(record["level"], "info");
    assert_eq!(record["code"], "JSR-DO-WHILE");
}
