//! Roster entities

mod character;
mod monster;

pub use character::{Character, CharacterState};
pub use monster::{Monster, MonsterInstance, StandeeHealthOutcome};
