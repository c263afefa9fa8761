use js2py::Config;

fn output(source: &str) -> String {
    js2py::convert(source, &Config::new("test.js")).unwrap().output
}

#[test]
fn switch_true_becomes_a_predicate_chain() {
    let source = "\
switch (true) {
  case score >= 90: grade = 'A'; break;
  case score >= 80: grade = 'B'; break;
  default: grade = 'C';
}
";
    let result = output(source);
    assert!(result.contains(
        "if score >= 90:\n    grade = 'A'\nelif score >= 80:\n    grade = 'B'\nelse:\n    grade = 'C'\n"
    ));
    // The scrutinee is literally `true`; no temporary is introduced.
    assert!(!result.contains("_sw"));
}

#[test]
fn switch_compares_against_the_scrutinee_once() {
    let source = "\
switch (kind()) {
  case 'a': one(); break;
  case 'b': two(); break;
}
";
    let result = output(source);
    assert!(result.contains("_sw1 = kind()"));
    assert!(result.contains("if _sw1 == 'a':\n    one()\nelif _sw1 == 'b':\n    two()\n"));
}

#[test]
fn fall_through_concatenates_case_bodies() {
    let source = "\
switch (x) {
  case 1:
  case 2: shared(); break;
  default: fallback();
}
";
    let result = output(source);
    assert!(result.contains("if x == 1:\n    shared()\nelif x == 2:\n    shared()\nelse:\n    fallback()\n"));
}

#[test]
fn fall_through_runs_into_the_default() {
    let source = "\
switch (x) {
  case 1: first();
  default: always();
}
";
    let result = output(source);
    // Case 1 lacks a break, so its body cascades into the default's.
    assert!(result.contains("if x == 1:\n    first()\n    always()\nelse:\n    always()\n"));
}

#[test]
fn terminated_cases_do_not_cascade() {
    let source = "\
function pick(x) {
  switch (x) {
    case 1: return 'one';
    case 2: return 'two';
    default: return 'many';
  }
}
";
    let result = output(source);
    assert!(result.contains(
        "    if x == 1:\n        return 'one'\n    elif x == 2:\n        return 'two'\n    else:\n        return 'many'\n"
    ));
}
