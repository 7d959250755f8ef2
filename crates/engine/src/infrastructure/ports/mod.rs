//! Port traits for infrastructure boundaries.
//!
//! The engine has one: [`FrameSink`], where propagated state frames leave the
//! store. Tests replace it with `MockFrameSink`.

mod error;
mod external;

pub use error::SinkError;
pub use external::FrameSink;

#[cfg(test)]
pub use external::MockFrameSink;
