//! On-disk AST cache.
//!
//! One JSON file per (source, mode) hash under the cache directory. A
//! readable entry with the current schema version is trusted without
//! re-parsing; anything else is ignored and overwritten. Writes go to a
//! temporary sibling first and rename into place, so a concurrent writer
//! can only ever replace a file with identical contents.

use crate::syntax::ast::Program;
use crate::syntax::Mode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;

pub const SCHEMA_VERSION: u32 = 2;

#[derive(Debug, Serialize, Deserialize)]
pub struct CacheMeta {
    pub version: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CacheEntry {
    pub hash: String,
    pub mode: Mode,
    pub ast: Program,
    pub meta: CacheMeta,
}

pub struct AstCache {
    dir: PathBuf,
}

impl AstCache {
    pub fn new(dir: impl Into<PathBuf>) -> AstCache {
        AstCache { dir: dir.into() }
    }

    fn entry_path(&self, hash: &str) -> PathBuf {
        self.dir.join(format!("{}.ast", hash))
    }

    /// A hit returns the cached tree; misses, stale schema versions and
    /// unreadable files all return `None`.
    pub fn load(&self, hash: &str) -> Option<Program> {
        let text = fs::read_to_string(self.entry_path(hash)).ok()?;
        let entry: CacheEntry = serde_json::from_str(&text).ok()?;
        if entry.meta.version < SCHEMA_VERSION || entry.hash != hash {
            return None;
        }
        Some(entry.ast)
    }

    pub fn store(&self, hash: &str, mode: Mode, ast: &Program) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let entry = CacheEntry {
            hash: hash.to_string(),
            mode,
            ast: ast.clone(),
            meta: CacheMeta {
                version: SCHEMA_VERSION,
            },
        };
        let payload = serde_json::to_string(&entry)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        let temp = self.dir.join(format!(".{}.ast.tmp", hash));
        fs::write(&temp, payload)?;
        fs::rename(&temp, self.entry_path(hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax;

    #[test]
    fn round_trips_a_parsed_program() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AstCache::new(dir.path());
        let out = syntax::parse("var x = 1;", "t.js", Mode::Script, false).unwrap();

        assert!(cache.load(&out.hash).is_none());
        cache.store(&out.hash, Mode::Script, &out.program).unwrap();
        let loaded = cache.load(&out.hash).expect("entry was just written");
        assert_eq!(loaded, out.program);
    }

    #[test]
    fn rejects_stale_schema_versions() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AstCache::new(dir.path());
        let out = syntax::parse("var x = 1;", "t.js", Mode::Script, false).unwrap();
        cache.store(&out.hash, Mode::Script, &out.program).unwrap();

        let path = cache.entry_path(&out.hash);
        let stale = fs::read_to_string(&path)
            .unwrap()
            .replace(&format!("\"version\":{}", SCHEMA_VERSION), "\"version\":0");
        fs::write(&path, stale).unwrap();
        assert!(cache.load(&out.hash).is_none());
    }

    #[test]
    fn tolerates_corrupt_entries() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AstCache::new(dir.path());
        fs::create_dir_all(dir.path()).unwrap();
        fs::write(cache.entry_path("deadbeef"), "{not json").unwrap();
        assert!(cache.load("deadbeef").is_none());
    }
}
