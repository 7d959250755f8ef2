//! TCP client for the companion app.
//!
//! One task owns the connection. It reconnects with backoff, greets the peer
//! with `Init`, requests the full state after the bootstrap delay, answers
//! pings, feeds state frames to the store and writes whatever the store
//! queued for sending.

use std::sync::Arc;

use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use xhaven_shared::WireMessage;

use super::backoff::BackoffState;
use super::framing::TerminatorDecoder;
use super::{TransportConfig, TransportError};
use crate::stores::StateStore;

const READ_BUFFER_BYTES: usize = 64 * 1024;

/// Why a connected session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    PeerClosed,
    Cancelled,
    /// Every store handle is gone; nothing will ever be sent again.
    OutboundClosed,
}

pub struct PeerConnection {
    config: TransportConfig,
    store: Arc<StateStore>,
    outbound: mpsc::Receiver<Bytes>,
    cancel: CancellationToken,
}

impl PeerConnection {
    pub fn new(
        config: TransportConfig,
        store: Arc<StateStore>,
        outbound: mpsc::Receiver<Bytes>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            store,
            outbound,
            cancel,
        }
    }

    /// Connects and serves until cancelled or out of reconnect attempts.
    pub async fn run(mut self) {
        let mut backoff = BackoffState::new(self.config.backoff);
        let address = format!("{}:{}", self.config.host, self.config.port);

        loop {
            let connected = tokio::select! {
                _ = self.cancel.cancelled() => return,
                result = TcpStream::connect(&address) => result,
            };

            match connected {
                Ok(stream) => {
                    tracing::info!(address = %address, "Connected to companion app");
                    backoff.reset();
                    self.discard_stale_outbound();
                    match self.serve(stream).await {
                        Ok(SessionEnd::Cancelled) => return,
                        Ok(SessionEnd::OutboundClosed) => {
                            tracing::info!("Outbound queue closed, stopping transport");
                            return;
                        }
                        Ok(SessionEnd::PeerClosed) => {
                            tracing::info!(address = %address, "Companion app closed the connection");
                        }
                        Err(e) => {
                            tracing::warn!(address = %address, error = %e, "Connection lost");
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(address = %address, error = %e, "Failed to connect");
                }
            }

            let Some(delay) = backoff.next_delay_and_advance() else {
                tracing::error!(
                    attempts = backoff.attempts(),
                    "Max reconnection attempts reached, giving up"
                );
                return;
            };
            tracing::info!(
                attempt = backoff.attempts(),
                delay_ms = delay.as_millis() as u64,
                "Reconnecting after delay"
            );
            tokio::select! {
                _ = self.cancel.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// Frames queued while disconnected describe an outdated state; the
    /// full-state request replaces them.
    fn discard_stale_outbound(&mut self) {
        let mut dropped = 0usize;
        while self.outbound.try_recv().is_ok() {
            dropped += 1;
        }
        if dropped > 0 {
            tracing::debug!(dropped, "Discarded frames queued while disconnected");
        }
    }

    async fn serve(&mut self, stream: TcpStream) -> Result<SessionEnd, TransportError> {
        let (mut reader, mut writer) = stream.into_split();
        let mut decoder = TerminatorDecoder::new(self.config.max_frame_bytes);
        let mut buf = vec![0u8; READ_BUFFER_BYTES];

        send(&mut writer, &WireMessage::Init.to_bytes()).await?;

        let bootstrap = tokio::time::sleep(self.config.bootstrap_delay);
        tokio::pin!(bootstrap);
        let mut requested = false;

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    let _ = writer.shutdown().await;
                    return Ok(SessionEnd::Cancelled);
                }
                _ = &mut bootstrap, if !requested => {
                    requested = true;
                    send(&mut writer, &WireMessage::request_full_state().to_bytes()).await?;
                    tracing::info!("Requested full game state");
                }
                frame = self.outbound.recv() => {
                    let Some(frame) = frame else {
                        return Ok(SessionEnd::OutboundClosed);
                    };
                    send(&mut writer, &frame).await?;
                }
                read = reader.read(&mut buf) => {
                    let n = read?;
                    if n == 0 {
                        return Ok(SessionEnd::PeerClosed);
                    }
                    for raw in decoder.feed(&buf[..n])? {
                        self.handle_inbound(&raw, &mut writer).await?;
                    }
                }
            }
        }
    }

    async fn handle_inbound(
        &self,
        raw: &[u8],
        writer: &mut OwnedWriteHalf,
    ) -> Result<(), TransportError> {
        match WireMessage::parse(raw) {
            Ok(WireMessage::Ping) => {
                tracing::trace!("Ping received");
                send(writer, &WireMessage::Pong.to_bytes()).await?;
            }
            Ok(WireMessage::Pong) => tracing::trace!("Pong received"),
            Ok(WireMessage::Init) => tracing::debug!("Init received"),
            Ok(WireMessage::State(frame)) => {
                if let Err(e) = self
                    .store
                    .reconcile(frame.index, &frame.description, &frame.payload)
                {
                    tracing::warn!(index = frame.index, error = %e, "Inbound state rejected");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, bytes = raw.len(), "Discarding malformed frame");
            }
        }
        Ok(())
    }
}

async fn send(writer: &mut OwnedWriteHalf, bytes: &[u8]) -> Result<(), TransportError> {
    writer.write_all(bytes).await?;
    Ok(())
}
