use js2py::Config;

fn convert(source: &str) -> js2py::RunOutcome {
    js2py::convert(source, &Config::new("test.js")).unwrap()
}

fn output(source: &str) -> String {
    convert(source).output
}

#[test]
fn transforms_while_loops() {
    let result = output("while (n > 0) { n = n - 1; }");
    assert!(result.contains("while n > 0:\n    n = js_sub(n, 1)\n"));
}

#[test]
fn c_style_for_appends_the_update() {
    let result = output("for (var i = 0; i < 5; i++) { use(i); }");
    assert!(result.contains("i = undefined"));
    assert!(result.contains("i = 0\nwhile i < 5:\n    use(i)\n    i += 1\n"));
}

#[test]
fn for_without_test_loops_forever() {
    let result = output("for (;;) { step(); }");
    assert!(result.contains("while True:\n    step()\n"));
}

#[test]
fn for_of_iterates_the_runtime_iterable() {
    let result = output("var arr = [1, 2, 3];\nfor (const x of arr) { console.log(x); }");
    assert!(result.contains("for x in js_iter(arr):\n    console.log(x)\n"));
}

#[test]
fn for_in_iterates_the_runtime_keys() {
    let result = output("for (var k in obj) { touch(k); }");
    assert!(result.contains("k = undefined"));
    assert!(result.contains("for k in js_keys(obj):\n    touch(k)\n"));
}

#[test]
fn do_while_degrades_with_a_diagnostic() {
    let outcome = convert("var i = 0;\ndo {\n  i = i + 1;\n} while (i < 3);");
    assert_eq!(
        outcome.output,
        "# Generated by js2py from test.js\n\
         from js_runtime import js_plus, undefined\n\
         \n\
         i = undefined\n\
         i = 0\n\
         while True:\n\
         \x20   i = js_plus(i, 1)\n\
         \x20   if not i < 3:\n\
         \x20       break\n"
    );
    let degraded = outcome
        .diagnostics
        .iter()
        .find(|d| d.code == "JSR-DO-WHILE")
        .expect("do-while emits its stable code");
    assert_eq!(degraded.line, 2);
    assert_eq!(degraded.level, js2py::Level::Info);
}

#[test]
fn labeled_break_rewrites_with_a_flag() {
    let source = "\
outer: for (var i = 0; i < 3; i++) {
  for (var j = 0; j < 3; j++) {
    if (i + j > 3) {
      break outer;
    }
  }
}
";
    let outcome = convert(source);
    let result = &outcome.output;
    assert!(result.contains("_brk1 = False"));
    assert!(result.contains("            _brk1 = True\n            break\n"));
    assert!(result.contains("    if _brk1:\n        break\n"));
    assert!(outcome.diagnostics.iter().any(|d| d.code == "JSR-LABEL"));
}

#[test]
fn labeled_continue_resets_its_flag_at_the_target() {
    let source = "\
outer: for (var i = 0; i < 3; i++) {
  for (var j = 0; j < 3; j++) {
    if (j > i) {
      continue outer;
    }
  }
}
";
    let result = output(source);
    assert!(result.contains("_cnt1 = False"));
    assert!(result.contains("            _cnt1 = True\n            break\n"));
    assert!(result.contains("    if _cnt1:\n        _cnt1 = False\n        continue\n"));
}

#[test]
fn break_to_the_labeled_loop_itself_stays_plain() {
    let result = output("outer: while (go()) { if (done()) { break outer; } }");
    assert!(!result.contains("_brk"));
    assert!(result.contains("        break\n"));
}

#[test]
fn unused_labels_disappear() {
    let outcome = convert("quiet: while (x) { tick(); }");
    assert!(!outcome.output.contains("quiet"));
    assert!(!outcome.diagnostics.iter().any(|d| d.code == "JSR-LABEL"));
}
