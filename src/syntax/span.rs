use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn origin() -> Position {
        Position { line: 1, column: 0 }
    }

    pub fn one_indexed(self) -> Position {
        Position {
            line: self.line,
            column: self.column + 1,
        }
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn initial() -> Span {
        Span {
            start: Position::origin(),
            end: Position::origin(),
        }
    }

    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start,
            end: other.end,
        }
    }
}

pub trait Tracking {
    fn span(&self) -> &Span;
}
