//! Error types for the storage layer.
//!
//! One small funnel enum feeding the top-level loop's uniform policy:
//! persistence problems are logged and survived, never fatal. Hardware and
//! network failures have their own representations at the port boundary
//! ([`crate::app::ports::HardwareError`], `send() == false`).

use std::fmt;
use std::io;

/// A durable read or write failed. The in-memory operation that triggered
/// it still proceeds; the next successful write repairs the file.
#[derive(Debug)]
pub enum PersistError {
    /// Filesystem-level failure.
    Io(io::Error),
    /// A record could not be serialized.
    Encode(serde_json::Error),
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O: {e}"),
            Self::Encode(e) => write!(f, "encode: {e}"),
        }
    }
}

impl std::error::Error for PersistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Encode(e) => Some(e),
        }
    }
}

impl From<io::Error> for PersistError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for PersistError {
    fn from(e: serde_json::Error) -> Self {
        Self::Encode(e)
    }
}
