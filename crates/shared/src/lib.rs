//! XHaven Protocol - wire types shared by the engine and its tools
//!
//! - [`Frame`]: one state frame with its index, description and JSON payload
//! - [`WireMessage`]: state frames plus the ping/pong/Init control messages
//!
//! This crate only reads and writes bytes. It knows nothing about the game
//! state carried in a payload.

pub mod error;
pub mod frame;
pub mod messages;

pub use error::FrameError;
pub use frame::{Frame, RESERVED_TOKENS, TERMINATOR};
pub use messages::WireMessage;
