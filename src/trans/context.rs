//! Per-function lowering context.
//!
//! Carries the `this` name, the hoist sink for `var` seeding, the label
//! bookkeeping used by the flag-variable rewrite, and the per-scope rename
//! record. Nested functions get a fresh context; arrows copy the `this`
//! name from their enclosing context.

use crate::intern::Symbol;
use fnv::FnvHashMap;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Breakable {
    Loop,
    Switch,
}

#[derive(Debug)]
pub struct LabelFrame {
    pub label: Symbol,
    /// Loop depth of the labeled loop's own body.
    pub body_depth: u32,
    pub break_flag: Option<String>,
    pub continue_flag: Option<String>,
}

#[derive(Debug, Default)]
pub struct Ctx {
    pub this_name: Option<String>,
    pub in_constructor: bool,
    /// True only for the module-level context; gates CommonJS export
    /// recognition.
    pub at_module: bool,
    /// `var` names needing an undefined seed at function entry.
    pub hoist: Vec<String>,
    pub frames: Vec<LabelFrame>,
    pub loop_depth: u32,
    pub breakables: Vec<Breakable>,
    pub renames: FnvHashMap<Symbol, String>,
}

impl Ctx {
    pub fn module() -> Ctx {
        Ctx {
            at_module: true,
            ..Ctx::default()
        }
    }

    pub fn function(this_name: Option<String>, in_constructor: bool) -> Ctx {
        Ctx {
            this_name,
            in_constructor,
            ..Ctx::default()
        }
    }

    pub fn hoist_name(&mut self, name: String) {
        if !self.hoist.contains(&name) {
            self.hoist.push(name);
        }
    }

    pub fn frame_of(&self, label: Symbol) -> Option<usize> {
        self.frames.iter().rposition(|frame| frame.label == label)
    }

    pub fn innermost_breakable(&self) -> Option<Breakable> {
        self.breakables.last().copied()
    }
}
