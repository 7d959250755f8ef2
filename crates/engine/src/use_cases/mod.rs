//! Use cases - operator input turned into store mutations.
//!
//! `commands` runs slot-addressed commands; `phrases` resolves spoken names
//! against the roster into those same commands.

pub mod commands;
pub mod phrases;

pub use commands::{Command, CommandError, CommandOutcome, ExecuteCommand};
pub use phrases::interpret;
