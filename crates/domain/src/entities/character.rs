//! Character roster entry - a player character as mirrored from the companion app.
//!
//! Field names follow the document (`camelCase`). Every field except
//! `characterState` is a best-effort [`Field`]: absent, `null` and mistyped
//! values all survive a snapshot unchanged, as do keys this model does not
//! know, which are kept in `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::value_objects::{Condition, ConditionList, Field, HealthChange, HealthUpdate};

/// A player character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub id: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub turn_state: Field<Value>,
    pub character_state: CharacterState,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub character_class: Field<String>,
    /// Alias from the name table; display only, never serialized.
    #[serde(skip)]
    pub alias: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Mutable per-character numbers and conditions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterState {
    /// Absent or `null` until the player has picked a card.
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub initiative: Field<i32>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub health: Field<i32>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub max_health: Field<i32>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub level: Field<i32>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub xp: Field<i32>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub chill: Field<i32>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub display: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub summon_list: Field<Value>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub conditions: Field<ConditionList>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub conditions_added_this_turn: Field<ConditionList>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub conditions_added_previous_turn: Field<ConditionList>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Character {
    /// Best label for logs and prompts: alias, then display label, then id.
    pub fn label(&self) -> &str {
        self.alias
            .as_deref()
            .or(self.character_state.display.as_deref())
            .or(self.id.as_deref())
            .unwrap_or("unknown character")
    }

    pub fn set_initiative(&mut self, initiative: i32) {
        self.character_state.initiative.set(initiative);
    }

    /// Characters are never removed; at 0 health they stay on the roster.
    pub fn apply_health(&mut self, change: HealthChange) -> HealthUpdate {
        let state = &mut self.character_state;
        let update = change.apply(
            state.health.value().unwrap_or(0),
            state.max_health.value(),
        );
        state.health.set(update.health);
        update
    }

    pub fn has_condition(&self, condition: Condition) -> bool {
        self.character_state
            .conditions
            .get()
            .is_some_and(|list| list.contains(condition))
    }

    /// Returns false if the condition was already present.
    pub fn add_condition(&mut self, condition: Condition) -> bool {
        ConditionList::add_to(&mut self.character_state.conditions, condition)
    }

    /// Returns false if the condition was not present.
    pub fn remove_condition(&mut self, condition: Condition) -> bool {
        self.character_state
            .conditions
            .get_mut()
            .is_some_and(|list| list.remove(condition))
    }
}
