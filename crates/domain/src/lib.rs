//! XHaven Domain - roster model, conditions and the game-state document.
//!
//! Pure types with no I/O and no logging. The engine owns the single
//! [`GameState`] instance and logs what these types report.

pub mod aggregates;
pub mod entities;
pub mod error;
pub mod ids;
pub mod value_objects;

pub use aggregates::{GameState, ParsedGameState, Roster, RosterEntry, Session, UnknownRosterEntry};
pub use entities::{Character, CharacterState, Monster, MonsterInstance, StandeeHealthOutcome};
pub use error::{DocumentError, DomainError};
pub use ids::{CharacterNumber, MonsterNumber, StandeeNumber};
pub use value_objects::{
    call_sign, Condition, ConditionList, ConditionToggle, Field, HealthChange, HealthUpdate,
    NameTable, CALL_SIGNS,
};
