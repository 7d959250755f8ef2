//! Outbound boundary of the state store.

use bytes::Bytes;

use super::error::SinkError;

/// Receives every encoded frame the state store propagates.
///
/// Called while the store lock is held, so implementations must not block.
#[cfg_attr(test, mockall::automock)]
pub trait FrameSink: Send + Sync {
    fn send(&self, frame: Bytes) -> Result<(), SinkError>;
}
