use js2py::Config;

fn output(source: &str) -> String {
    js2py::convert(source, &Config::new("test.js")).unwrap().output
}

#[test]
fn transforms_function_declaration() {
    let result = output("function add(a, b) { return a + b; }");
    assert_eq!(
        result,
        "# Generated by js2py from test.js\n\
         from js_runtime import js_plus\n\
         \n\
         def add(a, b):\n    return js_plus(a, b)\n"
    );
}

#[test]
fn hoists_function_declarations_above_other_statements() {
    let result = output("var r = twice(2);\nfunction twice(n) { return n * 2; }");
    let def_at = result.find("def twice").unwrap();
    let call_at = result.find("r = twice(2)").unwrap();
    assert!(def_at < call_at);
}

#[test]
fn default_parameters_check_the_undefined_sentinel() {
    let result = output("function greet(name = 'world') { return name; }");
    assert!(result.contains("def greet(name=undefined):"));
    assert!(result.contains("    if name is undefined:"));
    assert!(result.contains("        name = 'world'"));
}

#[test]
fn rest_parameters_become_a_vararg_list() {
    let result = output("function gather(first, ...rest) { return rest; }");
    assert!(result.contains("def gather(first, *rest):"));
    assert!(result.contains("    rest = list(rest)"));
}

#[test]
fn function_expressions_lift_to_named_defs() {
    let result = output("var f = function (x) { return x; };");
    assert!(result.contains("def _fn1(x):"));
    assert!(result.contains("f = _fn1"));
}

#[test]
fn named_function_expressions_keep_their_name() {
    let result = output("var f = function helper(x) { return x; };");
    assert!(result.contains("def helper(x):"));
    assert!(result.contains("f = helper"));
}

#[test]
fn simple_arrows_become_lambdas() {
    let result = output("var pick = (a, b) => a;");
    assert!(result.contains("pick = lambda a, b: a"));
}

#[test]
fn block_bodied_arrows_lift_to_defs() {
    let result = output("var twice = (n) => { return n + n; };");
    assert!(result.contains("def _fn1(n):"));
    assert!(result.contains("    return js_plus(n, n)"));
    assert!(result.contains("twice = _fn1"));
}

#[test]
fn arrows_writing_captures_lift_to_defs() {
    let result = output("var n = 0;\nvar bump = () => n = n + 1;");
    assert!(!result.contains("lambda"));
    assert!(result.contains("def _fn1():"));
}

#[test]
fn constructor_like_functions_take_the_instance_parameter() {
    let result = output("function Dog(name) { this.name = name; }\nvar d = new Dog('rex');");
    assert!(result.contains("def Dog(this_js, name):"));
    assert!(result.contains("    this_js.name = name"));
    assert!(result.contains("d = js_new(Dog, 'rex')"));
}

#[test]
fn uninitialized_vars_read_as_the_sentinel() {
    let result = output("function f() { var x; return x; }");
    assert!(result.contains("def f():\n    x = undefined\n    return x\n"));
}
