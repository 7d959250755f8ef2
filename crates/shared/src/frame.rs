//! State frames exchanged with the companion app.
//!
//! ```text
//! S3nD:Index:<int>Description:<text>GameState:<json>[EOM]
//! ```
//!
//! Field boundaries are literal markers, not lengths. The peer defines this
//! format, so it cannot change; instead, [`Frame::encode`] makes sure the
//! markers never appear inside a field it writes:
//!
//! - in the JSON payload a marker can only sit inside a string, so its first
//!   character is rewritten as a `\uXXXX` escape, which every JSON parser
//!   reads back as the same text;
//! - in the description markers are lower-cased.
//!
//! Decoding does not validate the payload; that is the state store's job.

use std::borrow::Cow;

use crate::error::FrameError;

pub const FRAME_PREFIX: &str = "S3nD:";
pub const TERMINATOR: &str = "[EOM]";
pub const INDEX_MARKER: &str = "Index:";
pub const DESCRIPTION_MARKER: &str = "Description:";
pub const GAME_STATE_MARKER: &str = "GameState:";

/// Substrings that must never appear inside a field.
pub const RESERVED_TOKENS: [&str; 4] = [
    INDEX_MARKER,
    DESCRIPTION_MARKER,
    GAME_STATE_MARKER,
    TERMINATOR,
];

/// One state frame: sequence index, change description, JSON payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub index: i64,
    pub description: String,
    pub payload: String,
}

impl Frame {
    pub fn new(index: i64, description: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            index,
            description: description.into(),
            payload: payload.into(),
        }
    }

    /// Reads one already-delimited frame.
    ///
    /// Markers are located by first occurrence, in order. The payload runs to
    /// the terminator, or to the end of the buffer when the transport already
    /// stripped it.
    pub fn decode(raw: &[u8]) -> Result<Self, FrameError> {
        let text = std::str::from_utf8(raw)
            .map_err(|e| FrameError::malformed(format!("not valid UTF-8: {}", e)))?;

        if !text.contains(GAME_STATE_MARKER) {
            return Err(FrameError::malformed("missing GameState: marker"));
        }

        let index_start = find_after(text, 0, INDEX_MARKER)
            .ok_or_else(|| FrameError::malformed("missing Index: marker"))?;
        let description_at = text[index_start..]
            .find(DESCRIPTION_MARKER)
            .map(|offset| index_start + offset)
            .ok_or_else(|| FrameError::malformed("missing Description: marker"))?;
        let description_start = description_at + DESCRIPTION_MARKER.len();
        let state_at = text[description_start..]
            .find(GAME_STATE_MARKER)
            .map(|offset| description_start + offset)
            .ok_or_else(|| FrameError::malformed("GameState: marker precedes Description:"))?;
        let payload_start = state_at + GAME_STATE_MARKER.len();

        let raw_index = text[index_start..description_at].trim();
        let index = raw_index
            .parse::<i64>()
            .map_err(|_| FrameError::malformed(format!("index {:?} is not an integer", raw_index)))?;

        let rest = &text[payload_start..];
        let payload = rest.find(TERMINATOR).map_or(rest, |end| &rest[..end]);

        Ok(Self {
            index,
            description: text[description_start..state_at].to_string(),
            payload: payload.to_string(),
        })
    }

    /// Writes the frame, terminator included.
    pub fn encode(&self) -> Vec<u8> {
        format!(
            "{}{}{}{}{}{}{}{}",
            FRAME_PREFIX,
            INDEX_MARKER,
            self.index,
            DESCRIPTION_MARKER,
            defuse_description(&self.description),
            GAME_STATE_MARKER,
            escape_payload(&self.payload),
            TERMINATOR
        )
        .into_bytes()
    }
}

fn find_after(text: &str, from: usize, marker: &str) -> Option<usize> {
    text[from..]
        .find(marker)
        .map(|offset| from + offset + marker.len())
}

fn contains_reserved(text: &str) -> bool {
    RESERVED_TOKENS.iter().any(|token| text.contains(token))
}

/// Rewrites the first character of every reserved token as a JSON escape.
pub fn escape_payload(payload: &str) -> Cow<'_, str> {
    if !contains_reserved(payload) {
        return Cow::Borrowed(payload);
    }
    let mut escaped = payload.to_string();
    for token in RESERVED_TOKENS {
        if !escaped.contains(token) {
            continue;
        }
        let mut chars = token.chars();
        if let Some(first) = chars.next() {
            let replacement = format!("\\u{:04x}{}", u32::from(first), chars.as_str());
            escaped = escaped.replace(token, &replacement);
        }
    }
    Cow::Owned(escaped)
}

/// Lower-cases reserved tokens so the description cannot end a field early.
pub fn defuse_description(description: &str) -> Cow<'_, str> {
    if !contains_reserved(description) {
        return Cow::Borrowed(description);
    }
    let mut defused = description.to_string();
    for token in RESERVED_TOKENS {
        defused = defused.replace(token, &token.to_ascii_lowercase());
    }
    Cow::Owned(defused)
}
