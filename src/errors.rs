use crate::syntax::span::Position;
use crate::syntax::token::Token;
use std::error;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, PartialEq, Clone)]
pub enum ErrorCause {
    UnexpectedEndOfInput,
    UnexpectedToken(Token),
    IllegalToken,
    InvalidHexEscape,
    UnterminatedRegex,
    UnterminatedTemplate,
    InvalidAssignmentTarget,
    RestMustBeLast,
    ImportOutsideModule,
    ExportOutsideModule,
    InvalidPattern,
}

impl fmt::Display for ErrorCause {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ErrorCause::UnexpectedEndOfInput => write!(f, "unexpected end of input"),
            ErrorCause::UnexpectedToken(Token::Ident(_)) => write!(f, "unexpected identifier"),
            ErrorCause::UnexpectedToken(ref t) => write!(f, "unexpected token {}", t),
            ErrorCause::IllegalToken => write!(f, "illegal character"),
            ErrorCause::InvalidHexEscape => write!(f, "invalid hexadecimal escape"),
            ErrorCause::UnterminatedRegex => write!(f, "unterminated regular expression"),
            ErrorCause::UnterminatedTemplate => write!(f, "unterminated template literal"),
            ErrorCause::InvalidAssignmentTarget => write!(f, "invalid assignment target"),
            ErrorCause::RestMustBeLast => write!(f, "rest element must be last"),
            ErrorCause::ImportOutsideModule => {
                write!(f, "import declarations require module mode")
            }
            ErrorCause::ExportOutsideModule => {
                write!(f, "export declarations require module mode")
            }
            ErrorCause::InvalidPattern => write!(f, "invalid destructuring pattern"),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct SyntaxError {
    pub pos: Position,
    pub cause: ErrorCause,
}

impl SyntaxError {
    pub fn new(pos: Position, cause: ErrorCause) -> SyntaxError {
        SyntaxError { pos, cause }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let pos = self.pos.one_indexed();
        write!(f, "line {}, column {}: {}", pos.line, pos.column, self.cause)
    }
}

impl error::Error for SyntaxError {}

pub type Result<T> = std::result::Result<T, SyntaxError>;

/// Top-level failure modes of a pipeline run. Diagnostic-level failures
/// are reported through the bus instead and leave the run result intact.
#[derive(Debug, Error)]
pub enum Error {
    #[error("parse failed: {0}")]
    Parse(#[from] SyntaxError),
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
