use js2py::Config;

fn convert(source: &str) -> js2py::RunOutcome {
    js2py::convert(source, &Config::new("test.js")).unwrap()
}

fn output(source: &str) -> String {
    convert(source).output
}

#[test]
fn object_literals_become_dicts() {
    let result = output("var o = { a: 1, 'b c': 2, 3: four };");
    assert!(result.contains("o = {'a': 1, 'b c': 2, '3': four}"));
}

#[test]
fn shorthand_properties_expand() {
    let result = output("var o = { a, b };");
    assert!(result.contains("o = {'a': a, 'b': b}"));
}

#[test]
fn computed_keys_build_through_obj_set() {
    let result = output("var o = { a: 1, [key()]: 2 };");
    assert!(result.contains("_obj1 = {}"));
    assert!(result.contains("obj_set(_obj1, 'a', 1)"));
    assert!(result.contains("obj_set(_obj1, key(), 2)"));
    assert!(result.contains("o = _obj1"));
}

#[test]
fn object_spread_merges() {
    let result = output("var o = { a: 1, ...rest };");
    assert!(result.contains("_obj1 = js_merge(_obj1, rest)"));
}

#[test]
fn object_methods_lift_to_defs() {
    let result = output("var o = { go(n) { return n; } };");
    assert!(result.contains("def _fn1(n):"));
    assert!(result.contains("o = {'go': _fn1}"));
}

#[test]
fn accessors_warn_and_become_plain_keys() {
    let outcome = convert("var o = { get x() { return 1; } };");
    assert!(outcome
        .diagnostics
        .iter()
        .any(|d| d.code == "JSR-GETTER-SETTER" && d.level == js2py::Level::Warn));
    assert!(outcome.output.contains("o = {'x': _fn1}"));
}

#[test]
fn array_literals_become_lists() {
    assert!(output("var a = [1, 'two', true];").contains("a = [1, 'two', True]"));
}

#[test]
fn array_holes_become_the_sentinel_with_a_diagnostic() {
    let outcome = convert("var a = [1, , 3];");
    assert!(outcome.output.contains("a = [1, undefined, 3]"));
    let hole = outcome
        .diagnostics
        .iter()
        .find(|d| d.code == "JSR-SPARSE-ARRAY")
        .expect("array holes report their stable code");
    assert_eq!(hole.level, js2py::Level::Info);
}

#[test]
fn spread_in_arrays_flattens() {
    let result = output("var a = [1, ...rest, 2];");
    assert!(result.contains("a = spread([1], rest, [2])"));
}

#[test]
fn spread_in_calls_unpacks() {
    let result = output("f(1, ...rest);");
    assert!(result.contains("f(*spread([1], rest))"));
}

#[test]
fn spread_in_new_goes_through_js_new() {
    let result = output("var d = new Thing(...parts);");
    assert!(result.contains("d = js_new(Thing, *spread(parts))"));
}
