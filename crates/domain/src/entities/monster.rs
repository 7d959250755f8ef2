//! Monster roster entry - one monster type and its standees on the board.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DomainError;
use crate::ids::StandeeNumber;
use crate::value_objects::{Condition, ConditionList, Field, HealthChange, HealthUpdate};

/// A monster type with its physical standees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Monster {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub id: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub turn_state: Field<Value>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub is_active: Field<bool>,
    #[serde(rename = "type", default, skip_serializing_if = "Field::is_absent")]
    pub monster_type: Field<String>,
    /// Standees in board order.
    pub monster_instances: Vec<MonsterInstance>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub is_ally: Field<bool>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub level: Field<i32>,
    /// Alias from the name table; display only.
    #[serde(skip)]
    pub alias: Option<String>,
    /// Phonetic call sign from the monster number; display only.
    #[serde(skip)]
    pub call_sign: Option<&'static str>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One standee.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonsterInstance {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub health: Field<i32>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub max_health: Field<i32>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub level: Field<i32>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub standee_nr: Field<StandeeNumber>,
    #[serde(rename = "move", default, skip_serializing_if = "Field::is_absent")]
    pub movement: Field<i32>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub attack: Field<i32>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub range: Field<i32>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub name: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub gfx: Field<String>,
    /// Set for summons: the round the standee appeared.
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub round_summoned: Field<i32>,
    /// Set for summons: the owning monster type.
    #[serde(rename = "type", default, skip_serializing_if = "Field::is_absent")]
    pub summon_type: Field<Value>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub chill: Field<i32>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub conditions: Field<ConditionList>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub conditions_added_this_turn: Field<ConditionList>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub conditions_added_previous_turn: Field<ConditionList>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Outcome of a health change on a standee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandeeHealthOutcome {
    pub update: HealthUpdate,
    /// The standee dropped to 0 and left the board.
    pub removed: bool,
}

impl Monster {
    pub fn label(&self) -> &str {
        self.alias
            .as_deref()
            .or(self.monster_type.as_deref())
            .or(self.id.as_deref())
            .unwrap_or("unknown monster")
    }

    pub fn instance(&self, standee: StandeeNumber) -> Option<&MonsterInstance> {
        self.monster_instances
            .iter()
            .find(|instance| instance.standee_nr.value() == Some(standee))
    }

    pub fn instance_mut(
        &mut self,
        standee: StandeeNumber,
    ) -> Result<&mut MonsterInstance, DomainError> {
        let label = self.label().to_string();
        self.monster_instances
            .iter_mut()
            .find(|instance| instance.standee_nr.value() == Some(standee))
            .ok_or_else(|| DomainError::not_found("Standee", format!("{} nr {}", label, standee)))
    }

    /// Applies a health change to one standee, removing it at 0 health.
    pub fn apply_standee_health(
        &mut self,
        standee: StandeeNumber,
        change: HealthChange,
    ) -> Result<StandeeHealthOutcome, DomainError> {
        let update = self.instance_mut(standee)?.apply_health(change);
        let removed = update.is_depleted();
        if removed {
            self.monster_instances
                .retain(|instance| instance.standee_nr.value() != Some(standee));
        }
        Ok(StandeeHealthOutcome { update, removed })
    }
}

impl MonsterInstance {
    pub fn apply_health(&mut self, change: HealthChange) -> HealthUpdate {
        let update = change.apply(self.health.value().unwrap_or(0), self.max_health.value());
        self.health.set(update.health);
        update
    }

    pub fn has_condition(&self, condition: Condition) -> bool {
        self.conditions
            .get()
            .is_some_and(|list| list.contains(condition))
    }

    pub fn add_condition(&mut self, condition: Condition) -> bool {
        ConditionList::add_to(&mut self.conditions, condition)
    }

    pub fn remove_condition(&mut self, condition: Condition) -> bool {
        self.conditions
            .get_mut()
            .is_some_and(|list| list.remove(condition))
    }
}
