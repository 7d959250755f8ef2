//! Aggregates - the game state as one consistency boundary

mod game_state;

pub use game_state::{GameState, ParsedGameState, Roster, RosterEntry, Session, UnknownRosterEntry};
