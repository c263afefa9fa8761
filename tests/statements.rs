use js2py::Config;

fn output(source: &str) -> String {
    js2py::convert(source, &Config::new("test.js")).unwrap().output
}

#[test]
fn transforms_two_statements() {
    let result = output("one.method();\nsecond.method();");
    assert!(result.contains("one.method()\nsecond.method()\n"));
}

#[test]
fn var_declarations_seed_and_assign() {
    let result = output("var x = 1;");
    assert_eq!(
        result,
        "# Generated by js2py from test.js\n\
         from js_runtime import undefined\n\
         \n\
         x = undefined\nx = 1\n"
    );
}

#[test]
fn let_declarations_assign_at_the_site_only() {
    let result = output("let y = 2;");
    assert_eq!(result, "# Generated by js2py from test.js\ny = 2\n");
}

#[test]
fn uninitialized_let_reads_as_the_sentinel() {
    let result = output("let y;");
    assert!(result.contains("y = undefined"));
}

#[test]
fn if_else_chains_collapse_to_elif() {
    let result = output(
        "if (a) { f(); } else if (b) { g(); } else { h(); }",
    );
    assert!(result.contains("if a:\n    f()\nelif b:\n    g()\nelse:\n    h()\n"));
}

#[test]
fn blocks_flatten_into_their_statements() {
    let result = output("{ f(); g(); }");
    assert!(result.contains("f()\ng()\n"));
}

#[test]
fn reserved_python_names_gain_the_js_suffix() {
    let result = output("var print = 1;\nconsole.log(print);");
    assert!(result.contains("print_js = 1"));
    assert!(result.contains("console.log(print_js)"));
}

#[test]
fn property_names_are_never_renamed() {
    let result = output("obj.print = 2;");
    assert!(result.contains("obj.print = 2"));
}

#[test]
fn destructured_object_declarations_flatten() {
    let result = output("const { a, b: c } = source;");
    assert!(result.contains("a = js_getindex(source, 'a')"));
    assert!(result.contains("c = js_getindex(source, 'b')"));
}

#[test]
fn destructured_array_declarations_index() {
    let result = output("const [x, y] = pair;");
    assert!(result.contains("x = js_getindex(pair, 0)"));
    assert!(result.contains("y = js_getindex(pair, 1)"));
}

#[test]
fn destructuring_defaults_check_the_sentinel() {
    let result = output("const { a = 5 } = source;");
    assert!(result.contains("_tmp1 = js_getindex(source, 'a')"));
    assert!(result.contains("if _tmp1 is undefined:"));
    assert!(result.contains("    _tmp1 = 5"));
    assert!(result.contains("a = _tmp1"));
}

#[test]
fn sequence_expressions_become_separate_statements() {
    let result = output("a(), b();");
    assert!(result.contains("a()\nb()\n"));
}

#[test]
fn throw_wraps_the_value() {
    let result = output("throw 'boom';");
    assert!(result.contains("raise JsError('boom')"));
}
