//! GameState aggregate - session scalars plus the ordered roster.
//!
//! This is the in-memory form of the JSON document the companion app sends
//! after every change. Reading it classifies each `currentList` item into a
//! [`RosterEntry`]; writing it back produces a document that reads back to an
//! equal state.
//!
//! # Roster numbering
//!
//! Characters and monsters are numbered separately, starting at 1, in
//! document order. Entries are never added, removed or reordered between two
//! reconciliations (only standees are), so the numbers handed out by
//! [`Roster::characters`] and [`Roster::monsters`] stay fixed until the next
//! document replaces the roster.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::entities::{Character, Monster};
use crate::error::{DocumentError, DomainError};
use crate::ids::{CharacterNumber, MonsterNumber};
use crate::value_objects::{call_sign, Field, NameTable};

const ROSTER_KEY: &str = "currentList";

/// Session-wide scalars, replaced wholesale on every reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub level: Field<i32>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub solo: Field<bool>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub round_state: Field<Value>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub round: Field<i32>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub scenario: Field<Value>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub toast_message: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub scenario_special_rules: Field<Value>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub scenario_sections_added: Field<Value>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub current_campaign: Field<Value>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub current_ability_decks: Field<Value>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub modifier_deck: Field<Value>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub modifier_deck_allies: Field<Value>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub loot_deck: Field<Value>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub unlocked_classes: Field<Value>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub show_ally_deck: Field<bool>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub element_state: Field<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One roster item, discriminated when the document is read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RosterEntry {
    Character(Character),
    Monster(Monster),
}

/// A roster item that was neither a character nor a monster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRosterEntry {
    /// Zero-based position in `currentList`.
    pub position: usize,
    pub id: Option<String>,
    pub reason: String,
}

impl RosterEntry {
    /// Classifies a raw `currentList` item.
    ///
    /// A `characterState` object makes a character, a `monsterInstances`
    /// list makes a monster, whatever the types of their other fields. Only
    /// items with neither key, or a monster whose standee list holds
    /// something other than objects, are rejected.
    pub fn classify(position: usize, value: Value) -> Result<Self, UnknownRosterEntry> {
        let id = value.get("id").and_then(Value::as_str).map(str::to_owned);
        let reject = |reason: String| UnknownRosterEntry {
            position,
            id: id.clone(),
            reason,
        };

        if value.get("characterState").is_some_and(Value::is_object) {
            serde_json::from_value(value)
                .map(Self::Character)
                .map_err(|e| reject(format!("malformed character: {}", e)))
        } else if value.get("monsterInstances").is_some_and(Value::is_array) {
            serde_json::from_value(value)
                .map(Self::Monster)
                .map_err(|e| reject(format!("malformed monster: {}", e)))
        } else {
            Err(reject(
                "neither characterState nor monsterInstances present".into(),
            ))
        }
    }

    pub fn as_character(&self) -> Option<&Character> {
        match self {
            Self::Character(character) => Some(character),
            Self::Monster(_) => None,
        }
    }

    pub fn as_monster(&self) -> Option<&Monster> {
        match self {
            Self::Monster(monster) => Some(monster),
            Self::Character(_) => None,
        }
    }
}

/// The ordered roster.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    entries: Vec<RosterEntry>,
}

impl Roster {
    pub fn new(entries: Vec<RosterEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Characters with their 1-based numbers.
    pub fn characters(&self) -> impl Iterator<Item = (CharacterNumber, &Character)> + '_ {
        self.entries
            .iter()
            .filter_map(RosterEntry::as_character)
            .zip(1u32..)
            .map(|(character, n)| (CharacterNumber::new(n), character))
    }

    /// Monsters with their 1-based numbers.
    pub fn monsters(&self) -> impl Iterator<Item = (MonsterNumber, &Monster)> + '_ {
        self.entries
            .iter()
            .filter_map(RosterEntry::as_monster)
            .zip(1u32..)
            .map(|(monster, n)| (MonsterNumber::new(n), monster))
    }

    pub fn character_count(&self) -> usize {
        self.characters().count()
    }

    pub fn monster_count(&self) -> usize {
        self.monsters().count()
    }

    pub fn character_mut(&mut self, number: CharacterNumber) -> Result<&mut Character, DomainError> {
        let not_found = || DomainError::not_found("Character", number.to_string());
        let position = number.position().ok_or_else(not_found)?;
        self.entries
            .iter_mut()
            .filter_map(|entry| match entry {
                RosterEntry::Character(character) => Some(character),
                RosterEntry::Monster(_) => None,
            })
            .nth(position)
            .ok_or_else(not_found)
    }

    pub fn monster_mut(&mut self, number: MonsterNumber) -> Result<&mut Monster, DomainError> {
        let not_found = || DomainError::not_found("Monster", number.to_string());
        let position = number.position().ok_or_else(not_found)?;
        self.entries
            .iter_mut()
            .filter_map(|entry| match entry {
                RosterEntry::Monster(monster) => Some(monster),
                RosterEntry::Character(_) => None,
            })
            .nth(position)
            .ok_or_else(not_found)
    }

    /// Fills in aliases from the name table and call signs from monster numbers.
    pub fn apply_names(&mut self, names: &NameTable) {
        let mut monster_number = 0u32;
        for entry in &mut self.entries {
            match entry {
                RosterEntry::Character(character) => {
                    character.alias = character
                        .id
                        .as_deref()
                        .and_then(|id| names.character_alias(id))
                        .map(str::to_owned);
                }
                RosterEntry::Monster(monster) => {
                    monster_number += 1;
                    monster.alias = monster
                        .id
                        .as_deref()
                        .and_then(|id| names.monster_alias(id))
                        .map(str::to_owned);
                    monster.call_sign = call_sign(MonsterNumber::new(monster_number));
                }
            }
        }
    }
}

/// Session plus roster.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameState {
    pub session: Session,
    pub roster: Roster,
}

/// A document read into a [`GameState`], with the items that were skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedGameState {
    pub state: GameState,
    pub skipped: Vec<UnknownRosterEntry>,
}

#[derive(Serialize)]
struct DocumentRef<'a> {
    #[serde(flatten)]
    session: &'a Session,
    #[serde(rename = "currentList")]
    current_list: &'a [RosterEntry],
}

impl GameState {
    /// Reads a game-state document.
    ///
    /// Fails only when the payload is not a JSON object or `currentList` is not
    /// an array. Session fields of an unexpected type are carried through as
    /// read. Roster items that cannot be classified are returned in
    /// [`ParsedGameState::skipped`].
    pub fn from_json(json: &str) -> Result<ParsedGameState, DocumentError> {
        let value: Value = serde_json::from_str(json)?;
        let mut document = match value {
            Value::Object(map) => map,
            other => return Err(DocumentError::NotAnObject(json_kind(&other))),
        };

        let items = match document.remove(ROSTER_KEY) {
            Some(Value::Array(items)) => items,
            None | Some(Value::Null) => Vec::new(),
            Some(other) => {
                return Err(DocumentError::InvalidJson(format!(
                    "{} must be an array, got {}",
                    ROSTER_KEY,
                    json_kind(&other)
                )))
            }
        };

        let session: Session = serde_json::from_value(Value::Object(document))?;

        let mut entries = Vec::with_capacity(items.len());
        let mut skipped = Vec::new();
        for (position, item) in items.into_iter().enumerate() {
            match RosterEntry::classify(position, item) {
                Ok(entry) => entries.push(entry),
                Err(unknown) => skipped.push(unknown),
            }
        }

        Ok(ParsedGameState {
            state: GameState {
                session,
                roster: Roster::new(entries),
            },
            skipped,
        })
    }

    /// Writes the state back as a document.
    pub fn to_json(&self) -> Result<String, DocumentError> {
        serde_json::to_string(&DocumentRef {
            session: &self.session,
            current_list: self.roster.entries(),
        })
        .map_err(|e| DocumentError::Serialize(e.to_string()))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
