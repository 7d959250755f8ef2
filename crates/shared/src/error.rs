//! Wire-level errors.

use thiserror::Error;

/// A buffer that could not be read as a frame.
///
/// The frame is discarded; the connection stays open.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),
}

impl FrameError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedFrame(reason.into())
    }
}
