pub mod ast;
pub mod emit;

use std::collections::BTreeSet;

/// Runtime-facade helpers referenced while lowering. Kept sorted so the
/// emitted import preamble is deterministic.
#[derive(Debug, Default, Clone)]
pub struct RuntimeUses(BTreeSet<&'static str>);

impl RuntimeUses {
    pub fn new() -> RuntimeUses {
        RuntimeUses::default()
    }

    pub fn add(&mut self, helper: &'static str) {
        self.0.insert(helper);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().copied()
    }
}

/// Names a module makes visible, in first-export order. Feeds the
/// `__all__` footer and is reported back to the caller.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExportsRecord {
    names: Vec<String>,
}

impl ExportsRecord {
    pub fn new() -> ExportsRecord {
        ExportsRecord::default()
    }

    pub fn add(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.names.contains(&name) {
            self.names.push(name);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}
