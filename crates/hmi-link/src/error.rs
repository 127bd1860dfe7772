use thiserror::Error;

pub type Result<T, E = LinkError> = core::result::Result<T, E>;

/// Transport failure on the serial link.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("I/O error: {0}")]
    Io(String),
}

/// A frame that does not fit the command grammar. Always recoverable: the
/// frame is logged and dropped, the link keeps running.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("empty frame")]
    Empty,
    #[error("frame is not ASCII text")]
    NotText,
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("unknown SET key: {0}")]
    UnknownKey(String),
    #[error("missing {0}")]
    MissingArgument(&'static str),
    #[error("bad numeric value: {0}")]
    BadNumber(String),
}
