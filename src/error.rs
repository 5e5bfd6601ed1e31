use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Failure categories reported back to the caller of a retexture job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    NoInput,
    InvalidMode,
    Transport,
    HttpStatus,
    Decode,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::NoInput => "no input",
            FailureKind::InvalidMode => "invalid mode",
            FailureKind::Transport => "transport",
            FailureKind::HttpStatus => "http status",
            FailureKind::Decode => "decode",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum RetextureError {
    #[error("No input image: {0}")]
    NoInput(String),
    #[error("Invalid mode: {0}")]
    InvalidMode(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Server returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Codec error: {0}")]
    Codec(String),
    #[error("Persist error: {0}")]
    Persist(String),
}

impl RetextureError {
    /// Outcome category this error is reported under.
    ///
    /// `Codec` failures happen while preparing inputs and are reported as
    /// `NoInput`; `Config` failures are reported as `InvalidMode`.
    pub fn kind(&self) -> FailureKind {
        match self {
            RetextureError::NoInput(_) | RetextureError::Codec(_) => FailureKind::NoInput,
            RetextureError::InvalidMode(_) | RetextureError::Config(_) => FailureKind::InvalidMode,
            RetextureError::Transport(_) | RetextureError::Persist(_) => FailureKind::Transport,
            RetextureError::HttpStatus { .. } => FailureKind::HttpStatus,
            RetextureError::Decode(_) => FailureKind::Decode,
        }
    }

    /// The bare message without the category prefix. For HTTP failures this is
    /// the response body exactly as the server sent it.
    pub fn message(&self) -> &str {
        match self {
            RetextureError::HttpStatus { body, .. } => body,
            RetextureError::NoInput(msg)
            | RetextureError::InvalidMode(msg)
            | RetextureError::Transport(msg)
            | RetextureError::Decode(msg)
            | RetextureError::Config(msg)
            | RetextureError::Codec(msg)
            | RetextureError::Persist(msg) => msg,
        }
    }
}

pub type Result<T> = std::result::Result<T, RetextureError>;
