//! Connection to the companion app over plain TCP.

mod backoff;
mod client;
mod framing;

use std::time::Duration;

use crate::infrastructure::config::{
    DEFAULT_BOOTSTRAP_DELAY_MS, DEFAULT_HOST, DEFAULT_MAX_FRAME_BYTES, DEFAULT_PORT,
};

pub use backoff::{BackoffPolicy, BackoffState};
pub use client::PeerConnection;
pub use framing::TerminatorDecoder;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Frame of {length} bytes exceeds the {limit} byte limit")]
    FrameTooLong { length: usize, limit: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub host: String,
    pub port: u16,
    /// Pause between `Init` and the full-state request.
    pub bootstrap_delay: Duration,
    pub max_frame_bytes: usize,
    pub backoff: BackoffPolicy,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            bootstrap_delay: Duration::from_millis(DEFAULT_BOOTSTRAP_DELAY_MS),
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
            backoff: BackoffPolicy::default(),
        }
    }
}
