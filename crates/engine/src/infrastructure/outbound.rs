//! Bounded outbound queue between the state store and the transport writer.

use bytes::Bytes;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::infrastructure::ports::{FrameSink, SinkError};

/// Production [`FrameSink`]: a bounded channel drained by the connection task.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::Sender<Bytes>,
}

impl ChannelSink {
    /// Creates the sink and the receiver the transport drains.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Bytes>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }
}

impl FrameSink for ChannelSink {
    fn send(&self, frame: Bytes) -> Result<(), SinkError> {
        self.sender.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => SinkError::Full,
            TrySendError::Closed(_) => SinkError::Closed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_in_order() {
        let (sink, mut receiver) = ChannelSink::channel(4);
        sink.send(Bytes::from_static(b"one")).unwrap();
        sink.send(Bytes::from_static(b"two")).unwrap();

        assert_eq!(receiver.recv().await.unwrap(), Bytes::from_static(b"one"));
        assert_eq!(receiver.recv().await.unwrap(), Bytes::from_static(b"two"));
    }

    #[tokio::test]
    async fn full_queue_rejects_without_blocking() {
        let (sink, _receiver) = ChannelSink::channel(1);
        sink.send(Bytes::from_static(b"first")).unwrap();

        assert_eq!(
            sink.send(Bytes::from_static(b"second")),
            Err(SinkError::Full)
        );
    }

    #[tokio::test]
    async fn closed_queue_is_reported() {
        let (sink, receiver) = ChannelSink::channel(1);
        drop(receiver);

        assert_eq!(
            sink.send(Bytes::from_static(b"late")),
            Err(SinkError::Closed)
        );
    }
}
