use thiserror::Error;

/// Errors reported while reading or writing pattern files.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("RLE syntax error: no header")]
    NoHeader,

    #[error("RLE syntax error: invalid header: {0}")]
    InvalidHeader(String),

    #[error("invalid rule: {0}")]
    InvalidRule(String),

    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("format detection failed")]
    UnknownFormat,

    #[error("not a macrocell file: missing [M2] identifier")]
    NotMacrocell,

    #[error("macrocell file contains no nodes")]
    EmptyMacrocell,

    #[error("cannot serialize a blank pattern")]
    BlankPattern,
}
