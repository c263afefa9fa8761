use js2py::Config;

fn output(source: &str) -> String {
    js2py::convert(source, &Config::new("test.js")).unwrap().output
}

#[test]
fn plus_goes_through_the_coercion_helper() {
    assert!(output("var s = a + b;").contains("s = js_plus(a, b)"));
}

#[test]
fn literal_arithmetic_stays_direct() {
    assert!(output("var n = 1 + 2;").contains("n = 1 + 2"));
    assert!(output("var n = 6 * 7;").contains("n = 6 * 7"));
}

#[test]
fn division_is_always_direct_and_float() {
    assert!(output("var q = a / b;").contains("q = a / b"));
}

#[test]
fn strict_equality_is_direct() {
    assert!(output("var t = a === b;").contains("t = a == b"));
    assert!(output("var t = a !== b;").contains("t = a != b"));
}

#[test]
fn loose_equality_uses_the_runtime() {
    assert!(output("var t = a == b;").contains("t = loose_eq(a, b)"));
    assert!(output("var t = a != b;").contains("t = not loose_eq(a, b)"));
}

#[test]
fn logical_operators_select_operands() {
    assert!(output("var t = a && b;").contains("t = js_and(a, b)"));
    assert!(output("var t = a || b;").contains("t = js_or(a, b)"));
    assert!(output("var t = a ?? b;").contains("t = js_nullish(a, b)"));
}

#[test]
fn typeof_uses_the_runtime() {
    assert!(output("var t = typeof x;").contains("t = js_typeof(x)"));
}

#[test]
fn computed_member_access_uses_the_runtime() {
    assert!(output("var v = table[key];").contains("v = js_getindex(table, key)"));
    assert!(output("table[key] = v;").contains("js_setindex(table, key, v)"));
}

#[test]
fn length_reads_become_len_calls() {
    assert!(output("var n = items.length;").contains("n = len(items)"));
}

#[test]
fn compound_assignment_reuses_the_binary_helper() {
    assert!(output("x += y;").contains("x = js_plus(x, y)"));
    assert!(output("x -= 2;").contains("x = js_sub(x, 2)"));
}

#[test]
fn update_statements_become_augmented_assignment() {
    assert!(output("i++;").contains("i += 1"));
    assert!(output("i--;").contains("i -= 1"));
}

#[test]
fn postfix_update_as_expression_yields_the_old_value() {
    let result = output("var old = i++;");
    assert!(result.contains("_tmp1 = i"));
    assert!(result.contains("i = _tmp1 + 1"));
    assert!(result.contains("old = _tmp1"));
}

#[test]
fn conditional_expressions_map_to_ifexp() {
    assert!(output("var v = ok ? 1 : 2;").contains("v = 1 if ok else 2"));
}

#[test]
fn assignment_as_expression_lifts_to_a_statement() {
    let result = output("use(x = compute());");
    assert!(result.contains("x = compute()\nuse(x)"));
}

#[test]
fn template_literals_concatenate_with_coercion() {
    let result = output("var s = `a${x}b`;");
    assert!(result.contains("s = 'a' + js_tostring(x) + 'b'"));
}

#[test]
fn regex_literals_call_the_runtime() {
    let result = output("var re = /ab+c/gi;");
    assert!(result.contains("re = js_regex('ab+c', 'gi')"));
}

#[test]
fn unsigned_right_shift_uses_the_runtime() {
    assert!(output("var v = a >>> b;").contains("v = js_urshift(a, b)"));
    assert!(output("var v = a >> b;").contains("v = a >> b"));
}

#[test]
fn delete_on_members_uses_the_runtime() {
    assert!(output("delete obj[k];").contains("js_delete(obj, k)"));
    assert!(output("delete obj.k;").contains("js_delete(obj, 'k')"));
}

#[test]
fn in_and_instanceof_use_the_runtime() {
    assert!(output("var t = k in obj;").contains("t = js_in(k, obj)"));
    assert!(output("var t = v instanceof C;").contains("t = js_instanceof(v, C)"));
}
