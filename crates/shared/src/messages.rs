//! Messages exchanged over the peer connection
//!
//! Besides state frames the peer sends three control messages. They carry
//! no index and are recognized before frame decoding is attempted.
//!
//! - `S3nD:ping[EOM]` must be answered with `S3nD:pong[EOM]`
//! - `S3nD:pong[EOM]` needs no reply
//! - `S3nD:Init[EOM]` is the handshake sent right after connecting

use crate::error::FrameError;
use crate::frame::{Frame, FRAME_PREFIX, TERMINATOR};

pub const PING: &str = "ping";
pub const PONG: &str = "pong";
pub const INIT: &str = "Init";

/// Index carried by a full-state request.
pub const FULL_STATE_REQUEST_INDEX: i64 = -1;
/// Description carried by a full-state request.
pub const FULL_STATE_REQUEST_DESCRIPTION: &str = "GetData";

/// Any message read from or written to the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireMessage {
    Ping,
    Pong,
    Init,
    State(Frame),
}

impl WireMessage {
    /// Classifies one delimited message.
    ///
    /// Surrounding whitespace is ignored; the trailing terminator is optional.
    pub fn parse(raw: &[u8]) -> Result<Self, FrameError> {
        let trimmed = raw.trim_ascii();
        let body = trimmed
            .strip_suffix(TERMINATOR.as_bytes())
            .unwrap_or(trimmed);
        let control = body.strip_prefix(FRAME_PREFIX.as_bytes());

        match control {
            Some(b"ping") => Ok(Self::Ping),
            Some(b"pong") => Ok(Self::Pong),
            Some(b"Init") => Ok(Self::Init),
            _ => Frame::decode(trimmed).map(Self::State),
        }
    }

    /// Asks the peer to send its complete state.
    pub fn request_full_state() -> Self {
        Self::State(Frame::new(
            FULL_STATE_REQUEST_INDEX,
            FULL_STATE_REQUEST_DESCRIPTION,
            "{}",
        ))
    }

    pub fn is_control(&self) -> bool {
        !matches!(self, Self::State(_))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Ping => control_bytes(PING),
            Self::Pong => control_bytes(PONG),
            Self::Init => control_bytes(INIT),
            Self::State(frame) => frame.encode(),
        }
    }
}

impl From<Frame> for WireMessage {
    fn from(frame: Frame) -> Self {
        Self::State(frame)
    }
}

fn control_bytes(word: &str) -> Vec<u8> {
    format!("{}{}{}", FRAME_PREFIX, word, TERMINATOR).into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_control_messages() {
        assert_eq!(WireMessage::parse(b"S3nD:ping[EOM]").unwrap(), WireMessage::Ping);
        assert_eq!(WireMessage::parse(b"S3nD:pong[EOM]").unwrap(), WireMessage::Pong);
        assert_eq!(WireMessage::parse(b"S3nD:Init[EOM]").unwrap(), WireMessage::Init);
        assert_eq!(WireMessage::parse(b"S3nD:ping").unwrap(), WireMessage::Ping);
        assert_eq!(WireMessage::parse(b" S3nD:pong[EOM]\n").unwrap(), WireMessage::Pong);
    }

    #[test]
    fn control_messages_serialize_to_literals() {
        assert_eq!(WireMessage::Ping.to_bytes(), b"S3nD:ping[EOM]");
        assert_eq!(WireMessage::Pong.to_bytes(), b"S3nD:pong[EOM]");
        assert_eq!(WireMessage::Init.to_bytes(), b"S3nD:Init[EOM]");
        assert!(WireMessage::Ping.is_control());
    }

    #[test]
    fn state_frames_fall_through_to_frame_decoding() {
        let message = WireMessage::parse(b"S3nD:Index:5Description:GameState:{}[EOM]").unwrap();
        assert_eq!(message, WireMessage::State(Frame::new(5, "", "{}")));
        assert!(!message.is_control());
    }

    #[test]
    fn unknown_text_is_malformed() {
        let err = WireMessage::parse(b"S3nD:hello[EOM]").unwrap_err();
        assert!(matches!(err, FrameError::MalformedFrame(_)));
    }

    #[test]
    fn full_state_request_literal() {
        assert_eq!(
            WireMessage::request_full_state().to_bytes(),
            b"S3nD:Index:-1Description:GetDataGameState:{}[EOM]"
        );
    }
}
