//! Error types for port operations.

/// Why an outbound frame could not be handed to the transport.
///
/// Neither case is retried: the frame is dropped and the next propagated
/// change carries the full state again.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
    /// The outbound queue is at capacity.
    #[error("Outbound queue full")]
    Full,
    /// The transport side of the queue is gone.
    #[error("Outbound queue closed")]
    Closed,
}
