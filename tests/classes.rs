use js2py::Config;

fn output(source: &str) -> String {
    js2py::convert(source, &Config::new("test.js")).unwrap().output
}

#[test]
fn transforms_class_with_constructor_and_method() {
    let source = "\
class Person {
  constructor(name) {
    this.name = name;
  }
  greet() {
    return `Hello ${this.name}`;
  }
}

function makePerson() {
  return new Person('Alice');
}
";
    let result = output(source);
    assert_eq!(
        result,
        "# Generated by js2py from test.js\n\
         from js_runtime import js_new, js_tostring\n\
         \n\
         def makePerson():\n\
         \x20   return js_new(Person, 'Alice')\n\
         class Person:\n\
         \x20   def __init__(self, name):\n\
         \x20       self.name = name\n\
         \x20   def greet(self):\n\
         \x20       return 'Hello ' + js_tostring(self.name)\n"
    );
}

#[test]
fn static_methods_take_no_instance() {
    let result = output("class MathUtil { static square(n) { return n * n; } }");
    assert!(result.contains("    @staticmethod\n    def square(n):"));
    assert!(result.contains("        return js_mul(n, n)"));
}

#[test]
fn extends_maps_to_a_base_class() {
    let result = output(
        "class Animal { constructor(name) { this.name = name; } }\n\
         class Dog extends Animal { constructor(name) { super(name); this.kind = 'dog'; } }",
    );
    assert!(result.contains("class Dog(Animal):"));
    assert!(result.contains("        super().__init__(name)"));
    assert!(result.contains("        self.kind = 'dog'"));
}

#[test]
fn super_method_calls_go_through_super() {
    let result = output(
        "class A { go() { return 1; } }\n\
         class B extends A { go() { return super.go() + 1; } }",
    );
    assert!(result.contains("js_plus(super().go(), 1)"));
}

#[test]
fn constructor_return_values_are_dropped() {
    let result = output("class C { constructor() { this.x = 1; return this; } }");
    assert!(result.contains("def __init__(self):"));
    assert!(result.contains("        self.x = 1\n        return\n"));
    assert!(!result.contains("return self"));
}

#[test]
fn class_accessors_warn_and_lower_to_methods() {
    let outcome =
        js2py::convert("class T { get size() { return 1; } }", &Config::new("test.js")).unwrap();
    assert!(outcome
        .diagnostics
        .iter()
        .any(|d| d.code == "JSR-GETTER-SETTER"));
    assert!(outcome.output.contains("def size(self):"));
}

#[test]
fn empty_class_bodies_emit_pass() {
    let result = output("class Empty { }");
    assert!(result.contains("class Empty:\n    pass\n"));
}

#[test]
fn class_expressions_bind_by_name() {
    let result = output("var T = class Named { go() { return 1; } };");
    assert!(result.contains("class Named:"));
    assert!(result.contains("T = Named"));
}
