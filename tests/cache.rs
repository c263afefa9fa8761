use js2py::Config;

fn cached_config(dir: &std::path::Path) -> Config {
    let mut config = Config::new("test.js");
    config.cache_dir = Some(dir.join("ast"));
    config
}

#[test]
fn second_run_reads_the_cache_and_skips_the_parse() {
    let dir = tempfile::tempdir().unwrap();
    let config = cached_config(dir.path());
    let source = "function add(a, b) { return a + b; }\nvar r = add(1, 2);";

    let first = js2py::convert(source, &config).unwrap();
    assert!(first.stats.parsed);
    assert!(!first.stats.cache_hit);

    let second = js2py::convert(source, &config).unwrap();
    assert!(!second.stats.parsed);
    assert!(second.stats.cache_hit);

    assert_eq!(first.output, second.output);
    assert_eq!(first.diagnostics, second.diagnostics);
}

#[test]
fn diagnostics_survive_the_cache_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let config = cached_config(dir.path());
    let source = "do { tick(); } while (more());";

    let first = js2py::convert(source, &config).unwrap();
    let second = js2py::convert(source, &config).unwrap();
    assert!(second.stats.cache_hit);
    assert!(second.diagnostics.iter().any(|d| d.code == "JSR-DO-WHILE"));
    assert_eq!(first.diagnostics, second.diagnostics);
}

#[test]
fn sources_with_parse_errors_are_never_cached() {
    let dir = tempfile::tempdir().unwrap();
    let config = cached_config(dir.path());
    let source = "var = ;\nvar ok = 1;";

    let first = js2py::convert(source, &config).unwrap();
    assert!(first.stats.parsed);
    let second = js2py::convert(source, &config).unwrap();
    assert!(second.stats.parsed);
    assert!(!second.stats.cache_hit);
    assert_eq!(first.diagnostics, second.diagnostics);
}

#[test]
fn trailing_whitespace_changes_the_cache_key() {
    let dir = tempfile::tempdir().unwrap();
    let config = cached_config(dir.path());

    let first = js2py::convert("var x = 1;", &config).unwrap();
    assert!(first.stats.parsed);
    // One trailing space: a different byte stream, so a different key.
    let second = js2py::convert("var x = 1; ", &config).unwrap();
    assert!(second.stats.parsed);
    assert!(!second.stats.cache_hit);
    // Byte-identical input hits the first entry.
    let third = js2py::convert("var x = 1;", &config).unwrap();
    assert!(third.stats.cache_hit);
}

#[test]
fn script_and_module_modes_key_separately() {
    let dir = tempfile::tempdir().unwrap();
    let config = cached_config(dir.path());
    let source = "var x = 1;";

    let first = js2py::convert(source, &config).unwrap();
    assert!(first.stats.parsed);

    let mut module_config = config.clone();
    module_config.mode = js2py::Mode::Module;
    let second = js2py::convert(source, &module_config).unwrap();
    assert!(second.stats.parsed);
    assert!(!second.stats.cache_hit);
}

#[test]
fn runs_are_deterministic_without_a_cache() {
    let config = Config::new("test.js");
    let source = "\
class Counter {
  constructor() { this.n = 0; }
  bump() { return this.n++; }
}
var c = new Counter();
do { c.bump(); } while (c.n < 3);
";
    let first = js2py::convert(source, &config).unwrap();
    let second = js2py::convert(source, &config).unwrap();
    assert_eq!(first.output, second.output);
    assert_eq!(first.diagnostics, second.diagnostics);
}

#[test]
fn bom_is_stripped_before_hashing_and_parsing() {
    let config = Config::new("test.js");
    let plain = js2py::convert("var x = 1;", &config).unwrap();
    let with_bom = js2py::convert("\u{feff}var x = 1;", &config).unwrap();
    assert_eq!(plain.output, with_bom.output);
}
