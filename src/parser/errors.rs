use crate::validator::RuleViolation;
use std::error::Error;
use std::fmt;
use std::io;

pub type OpResult<T> = Result<T, OpError>;

/// Rule number reported for malformed framing or truncated blocks.
pub const FORMAT_RULE: u8 = 1;

///
/// The error type of this crate.
///
/// `kind` tells what went wrong, `message` carries free-form context
/// appended along the way with `join_msg`.
///
#[derive(Debug)]
pub struct OpError {
    kind: OpErrorKind,
    message: String,
}

#[derive(Debug)]
pub enum OpErrorKind {
    None,
    IOError(io::Error),
    FormatError(FormatError),
    ValidationError(RuleViolation),
    HexError,
    JsonError(serde_json::Error),
}

///
/// The stream could not be demultiplexed into blocks.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// the 4 bytes in front of block `height` are not the magic delimiter
    BadMagic { height: usize, found: Vec<u8> },
    /// the stream ended in the middle of block `height`
    Truncated { height: usize },
}

impl FormatError {
    pub fn height(&self) -> usize {
        match self {
            FormatError::BadMagic { height, .. } => *height,
            FormatError::Truncated { height } => *height,
        }
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::BadMagic { height, found } => {
                write!(f, "bad magic delimiter {:02x?} before block {}", found, height)
            }
            FormatError::Truncated { height } => {
                write!(f, "unexpected end of stream in block {}", height)
            }
        }
    }
}

impl OpError {
    pub fn new(kind: OpErrorKind) -> Self {
        OpError {
            kind,
            message: String::new(),
        }
    }

    pub fn join_msg(mut self, msg: &str) -> Self {
        if !self.message.is_empty() {
            self.message.push_str(": ");
        }
        self.message.push_str(msg);
        self
    }

    pub fn kind(&self) -> &OpErrorKind {
        &self.kind
    }

    /// the stream ran dry before a read could be satisfied
    pub fn is_eof(&self) -> bool {
        matches!(&self.kind, OpErrorKind::IOError(e) if e.kind() == io::ErrorKind::UnexpectedEof)
    }

    ///
    /// `(rule, height)` of a format or validation failure,
    /// `None` for every other kind of error.
    ///
    pub fn rule_code(&self) -> Option<(u8, usize)> {
        match &self.kind {
            OpErrorKind::FormatError(e) => Some((FORMAT_RULE, e.height())),
            OpErrorKind::ValidationError(v) => Some((v.rule.number(), v.height)),
            _ => None,
        }
    }
}

impl fmt::Display for OpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            OpErrorKind::None => write!(f, "{}", self.message)?,
            OpErrorKind::IOError(e) => write!(f, "io error: {}", e)?,
            OpErrorKind::FormatError(e) => write!(f, "format error: {}", e)?,
            OpErrorKind::ValidationError(v) => write!(f, "validation error: {}", v)?,
            OpErrorKind::HexError => write!(f, "invalid hex string")?,
            OpErrorKind::JsonError(e) => write!(f, "json error: {}", e)?,
        }
        if !self.message.is_empty() && !matches!(self.kind, OpErrorKind::None) {
            write!(f, " ({})", self.message)?;
        }
        Ok(())
    }
}

impl Error for OpError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.kind {
            OpErrorKind::IOError(e) => Some(e),
            OpErrorKind::JsonError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for OpError {
    fn from(err: io::Error) -> Self {
        OpError::new(OpErrorKind::IOError(err))
    }
}

impl From<FormatError> for OpError {
    fn from(err: FormatError) -> Self {
        OpError::new(OpErrorKind::FormatError(err))
    }
}

impl From<RuleViolation> for OpError {
    fn from(err: RuleViolation) -> Self {
        OpError::new(OpErrorKind::ValidationError(err))
    }
}

impl From<bitcoin_hashes::hex::Error> for OpError {
    fn from(err: bitcoin_hashes::hex::Error) -> Self {
        OpError::new(OpErrorKind::HexError).join_msg(&err.to_string())
    }
}

impl From<serde_json::Error> for OpError {
    fn from(err: serde_json::Error) -> Self {
        OpError::new(OpErrorKind::JsonError(err))
    }
}

impl From<&str> for OpError {
    fn from(msg: &str) -> Self {
        OpError::new(OpErrorKind::None).join_msg(msg)
    }
}
