use std::io;
use std::net::{AddrParseError, Ipv4Addr};

use thiserror::Error;

/// Category of a [`ParseError`], independent of the line it was raised on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Io,
    Syntax,
    InvalidAddress,
    InvalidNumber,
    InvalidEnum,
}

/// Fatal error raised while loading an lnx file.
///
/// Every variant carries the 1-indexed line where parsing stopped. `Io`
/// errors raised before the first line could be read (the file failed to
/// open) use line 0.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("I/O error, line {line}: {source}")]
    Io {
        line: usize,
        #[source]
        source: io::Error,
    },
    #[error("parse error, line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error("parse error, line {line}: invalid address {text:?}")]
    InvalidAddress {
        line: usize,
        text: String,
        #[source]
        source: AddrParseError,
    },
    #[error("parse error, line {line}: expected number, found {text:?} ({reason})")]
    InvalidNumber {
        line: usize,
        text: String,
        reason: String,
    },
    #[error("parse error, line {line}: unrecognized routing mode {text:?}")]
    InvalidEnum { line: usize, text: String },
}

impl ParseError {
    pub fn line(&self) -> usize {
        match self {
            ParseError::Io { line, .. }
            | ParseError::Syntax { line, .. }
            | ParseError::InvalidAddress { line, .. }
            | ParseError::InvalidNumber { line, .. }
            | ParseError::InvalidEnum { line, .. } => *line,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::Io { .. } => ErrorKind::Io,
            ParseError::Syntax { .. } => ErrorKind::Syntax,
            ParseError::InvalidAddress { .. } => ErrorKind::InvalidAddress,
            ParseError::InvalidNumber { .. } => ErrorKind::InvalidNumber,
            ParseError::InvalidEnum { .. } => ErrorKind::InvalidEnum,
        }
    }
}

/// Error raised by a field extractor. Field extractors only ever see one line,
/// so the line number is attached by the parse loop through [`FieldError::at`].
#[derive(Debug, Error)]
pub enum FieldError {
    #[error("{0}")]
    Syntax(String),
    #[error("invalid address {text:?}")]
    InvalidAddress {
        text: String,
        #[source]
        source: AddrParseError,
    },
    #[error("expected number, found {text:?} ({reason})")]
    InvalidNumber { text: String, reason: String },
    #[error("unrecognized routing mode {0:?}")]
    InvalidEnum(String),
}

impl FieldError {
    pub(crate) fn syntax(message: impl Into<String>) -> Self {
        FieldError::Syntax(message.into())
    }

    pub(crate) fn number(text: &str, reason: impl Into<String>) -> Self {
        FieldError::InvalidNumber {
            text: text.to_string(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            FieldError::Syntax(_) => ErrorKind::Syntax,
            FieldError::InvalidAddress { .. } => ErrorKind::InvalidAddress,
            FieldError::InvalidNumber { .. } => ErrorKind::InvalidNumber,
            FieldError::InvalidEnum(_) => ErrorKind::InvalidEnum,
        }
    }

    /// Pins this error to the line it was found on
    pub fn at(self, line: usize) -> ParseError {
        match self {
            FieldError::Syntax(message) => ParseError::Syntax { line, message },
            FieldError::InvalidAddress { text, source } => ParseError::InvalidAddress {
                line,
                text,
                source,
            },
            FieldError::InvalidNumber { text, reason } => ParseError::InvalidNumber {
                line,
                text,
                reason,
            },
            FieldError::InvalidEnum(text) => ParseError::InvalidEnum { line, text },
        }
    }
}

/// Dangling cross-reference reported by `Topology::check_references`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("neighbor {neighbor} is reached via undeclared interface {interface:?}")]
    UnknownInterface { neighbor: Ipv4Addr, interface: String },
    #[error("rip advertise-to {0} does not match any declared neighbor")]
    UnknownRipNeighbor(Ipv4Addr),
}
