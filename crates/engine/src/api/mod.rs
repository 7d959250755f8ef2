//! API layer - operator-facing entry points.

pub mod repl;

pub use repl::{Repl, Reply};
