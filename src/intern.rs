use fnv::FnvHashMap;
use serde::de::{Deserializer, Visitor};
use serde::ser::{Serialize, Serializer};
use serde::Deserialize;
use std::cell::RefCell;
use std::fmt;

/// Interned string handle. Identifier names, string literal payloads and
/// property keys all live in the interner; comparing two symbols is an
/// integer compare.
#[derive(PartialEq, Eq, Hash, Clone, Copy)]
pub struct Symbol(u32);

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{}\"", self.as_str())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self.as_str(), f)
    }
}

impl Symbol {
    pub fn as_str<'a>(self) -> &'a str {
        resolve(self)
    }
}

impl Serialize for Symbol {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

struct SymbolVisitor;

impl<'de> Visitor<'de> for SymbolVisitor {
    type Value = Symbol;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an interned string")
    }

    fn visit_str<E>(self, v: &str) -> Result<Symbol, E>
    where
        E: serde::de::Error,
    {
        Ok(intern(v))
    }
}

impl<'de> Deserialize<'de> for Symbol {
    fn deserialize<D>(deserializer: D) -> Result<Symbol, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(SymbolVisitor)
    }
}

#[derive(Default)]
pub struct Interner {
    names: FnvHashMap<Box<str>, Symbol>,
    strings: Vec<Box<str>>,
}

impl Interner {
    fn prefill(init: &[&str]) -> Self {
        let mut this = Interner::default();
        for &string in init {
            this.intern(string);
        }
        this
    }

    pub fn intern(&mut self, string: &str) -> Symbol {
        if let Some(&name) = self.names.get(string) {
            return name;
        }

        let name = Symbol(self.strings.len() as u32);
        let string = string.to_string().into_boxed_str();
        self.strings.push(string.clone());
        self.names.insert(string, name);
        name
    }

    pub fn get(&self, symbol: Symbol) -> &str {
        &self.strings[symbol.0 as usize]
    }
}

macro_rules! declare_known {(
    $( ($index: expr, $konst: ident, $string: expr) )*
) => {
    $(
        pub const $konst: Symbol = Symbol($index);
     )*

    impl Interner {
        fn fresh() -> Self {
            Interner::prefill(&[$($string,)*])
        }
    }
}}

declare_known! {
    (0,  KW_NULL,         "null")
    (1,  KW_TRUE,         "true")
    (2,  KW_FALSE,        "false")
    (3,  KW_THIS,         "this")
    (4,  KW_UNDEFINED,    "undefined")
    (5,  KW_EVAL,         "eval")
    (6,  KW_ARGUMENTS,    "arguments")
    (7,  KW_PROTOTYPE,    "prototype")
    (8,  KW_CONSTRUCTOR,  "constructor")
    (9,  KW_REQUIRE,      "require")
    (10, KW_MODULE,       "module")
    (11, KW_EXPORTS,      "exports")
    (12, KW_OBJECT,       "Object")
    (13, KW_FUNCTION,     "Function")
    (14, KW_CREATE,       "create")
    (15, KW_DEFINE_PROP,  "defineProperty")
    (16, KW_OF,           "of")
    (17, KW_FROM,         "from")
    (18, KW_AS,           "as")
    (19, KW_GET,          "get")
    (20, KW_SET,          "set")
    (21, KW_STATIC,       "static")
    (22, KW_USE_STRICT,   "use strict")
    (23, KW_DEFAULT,      "default")
    (24, KW_SELF,         "self")
}

fn with_interner<T, F: FnOnce(&mut Interner) -> T>(f: F) -> T {
    thread_local!(static INTERNER: RefCell<Interner> = {
        RefCell::new(Interner::fresh())
    });
    INTERNER.with(|interner| f(&mut interner.borrow_mut()))
}

pub fn intern(val: &str) -> Symbol {
    with_interner(|interner| interner.intern(val))
}

pub fn resolve<'a>(key: Symbol) -> &'a str {
    with_interner(|interner| {
        // Strings are never removed from the interner, so handing out a
        // lifetime beyond the borrow is sound for the life of the thread.
        unsafe { std::mem::transmute::<&str, &str>(interner.get(key)) }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interns_equal_strings_to_equal_symbols() {
        assert_eq!(intern("dog"), intern("dog"));
        assert!(intern("dog") != intern("cat"));
        assert_eq!(intern("dog").as_str(), "dog");
    }

    #[test]
    fn prefilled_keywords_resolve() {
        assert_eq!(KW_PROTOTYPE.as_str(), "prototype");
        assert_eq!(intern("undefined"), KW_UNDEFINED);
    }
}
