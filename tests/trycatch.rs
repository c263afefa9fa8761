use js2py::Config;

fn output(source: &str) -> String {
    js2py::convert(source, &Config::new("test.js")).unwrap().output
}

#[test]
fn transforms_try_catch_finally() {
    let source = "\
function risky(fn) {
  try {
    return fn();
  } catch (err) {
    console.log(err.message);
    throw err;
  } finally {
    console.log('cleanup');
  }
}
";
    let result = output(source);
    assert_eq!(
        result,
        "# Generated by js2py from test.js\n\
         from js_runtime import JsError, console\n\
         \n\
         def risky(fn):\n\
         \x20   try:\n\
         \x20       return fn()\n\
         \x20   except JsError as _err1:\n\
         \x20       err = _err1.value\n\
         \x20       console.log(err.message)\n\
         \x20       raise JsError(err)\n\
         \x20   finally:\n\
         \x20       console.log('cleanup')\n"
    );
}

#[test]
fn try_finally_without_catch_is_native() {
    let result = output("try { risky(); } finally { cleanup(); }");
    assert!(result.contains("try:\n    risky()\nfinally:\n    cleanup()\n"));
    assert!(!result.contains("except"));
}

#[test]
fn catch_without_a_parameter_still_catches() {
    let result = output("try { risky(); } catch { recover(); }");
    assert!(result.contains("except JsError:\n    recover()\n"));
}

#[test]
fn the_catch_binding_unwraps_the_thrown_value() {
    let result = output("try { go(); } catch (e) { use(e); }");
    assert!(result.contains("except JsError as _err1:\n    e = _err1.value\n    use(e)\n"));
}
