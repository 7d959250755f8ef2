//! Status conditions and the single-letter code table used by commands.
//!
//! Conditions travel in the document as plain JSON values. The companion app
//! writes numeric ids, older drafts wrote names, so [`ConditionList`] keeps the
//! raw values and matches a [`Condition`] against either form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DomainError;

use super::Field;

/// A named status effect on a character or monster standee.
///
/// The numeric id is the declaration index, matching the companion app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    Stun,
    Immobilize,
    Disarm,
    Wound,
    Muddle,
    Poison,
    Bane,
    Brittle,
    Chill,
    Infect,
    Impair,
    Rupture,
    Strengthen,
    Invisible,
    Regenerate,
    Ward,
}

impl Condition {
    pub const ALL: [Condition; 16] = [
        Self::Stun,
        Self::Immobilize,
        Self::Disarm,
        Self::Wound,
        Self::Muddle,
        Self::Poison,
        Self::Bane,
        Self::Brittle,
        Self::Chill,
        Self::Infect,
        Self::Impair,
        Self::Rupture,
        Self::Strengthen,
        Self::Invisible,
        Self::Regenerate,
        Self::Ward,
    ];

    /// Numeric id used on the wire.
    pub fn id(self) -> u32 {
        self as u32
    }

    pub fn from_id(id: u64) -> Option<Self> {
        usize::try_from(id)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }

    /// Looks up a single-letter command code.
    ///
    /// | code | condition |
    /// |------|-----------|
    /// | `s` | Stun |
    /// | `i` | Immobilize |
    /// | `x` | Disarm |
    /// | `w` | Wound |
    /// | `m` | Muddle |
    /// | `p` | Poison |
    /// | `n` | Bane |
    /// | `d`, `b` | Brittle |
    /// | `c` | Chill |
    /// | `f` | Infect |
    /// | `a` | Impair |
    /// | `r` | Rupture |
    /// | `g` | Strengthen |
    /// | `v` | Invisible |
    /// | `h` | Regenerate |
    /// | `o` | Ward |
    pub fn from_code(code: &str) -> Result<Self, DomainError> {
        let condition = match code.trim().to_ascii_lowercase().as_str() {
            "s" => Self::Stun,
            "i" => Self::Immobilize,
            "x" => Self::Disarm,
            "w" => Self::Wound,
            "m" => Self::Muddle,
            "p" => Self::Poison,
            "n" => Self::Bane,
            "d" | "b" => Self::Brittle,
            "c" => Self::Chill,
            "f" => Self::Infect,
            "a" => Self::Impair,
            "r" => Self::Rupture,
            "g" => Self::Strengthen,
            "v" => Self::Invisible,
            "h" => Self::Regenerate,
            "o" => Self::Ward,
            _ => return Err(DomainError::not_found("Condition code", code.trim())),
        };
        Ok(condition)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Stun => "stun",
            Self::Immobilize => "immobilize",
            Self::Disarm => "disarm",
            Self::Wound => "wound",
            Self::Muddle => "muddle",
            Self::Poison => "poison",
            Self::Bane => "bane",
            Self::Brittle => "brittle",
            Self::Chill => "chill",
            Self::Infect => "infect",
            Self::Impair => "impair",
            Self::Rupture => "rupture",
            Self::Strengthen => "strengthen",
            Self::Invisible => "invisible",
            Self::Regenerate => "regenerate",
            Self::Ward => "ward",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|condition| condition.name().eq_ignore_ascii_case(name))
    }

    /// True if a raw document value denotes this condition.
    pub fn matches(self, value: &Value) -> bool {
        match value {
            Value::Number(n) => n.as_u64() == Some(u64::from(self.id())),
            Value::String(s) => s.eq_ignore_ascii_case(self.name()),
            _ => false,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Condition {
    type Err = DomainError;

    /// Accepts a full name (`poison`) or a single-letter code (`p`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::from_name(s) {
            Some(condition) => Ok(condition),
            None => Self::from_code(s),
        }
    }
}

/// Whether a condition change adds or removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionToggle {
    Add,
    Remove,
}

impl FromStr for ConditionToggle {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "add" | "+" | "true" | "on" => Ok(Self::Add),
            "remove" | "-" | "false" | "off" => Ok(Self::Remove),
            other => Err(DomainError::parse(format!(
                "Expected add or remove, got {:?}",
                other
            ))),
        }
    }
}

/// A condition list exactly as found in the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionList(Vec<Value>);

impl ConditionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, condition: Condition) -> bool {
        self.0.iter().any(|value| condition.matches(value))
    }

    /// Appends the condition's numeric id. Returns false if already present.
    pub fn add(&mut self, condition: Condition) -> bool {
        if self.contains(condition) {
            return false;
        }
        self.0.push(Value::from(condition.id()));
        true
    }

    /// Adds to the list held by a document field, starting a new list when the
    /// field is absent, `null` or not a list.
    pub fn add_to(field: &mut Field<ConditionList>, condition: Condition) -> bool {
        match field {
            Field::Value(list) => list.add(condition),
            _ => {
                let mut list = Self::new();
                list.add(condition);
                field.set(list);
                true
            }
        }
    }

    /// Removes every entry denoting the condition. Returns false if none did.
    pub fn remove(&mut self, condition: Condition) -> bool {
        let before = self.0.len();
        self.0.retain(|value| !condition.matches(value));
        self.0.len() != before
    }

    /// Conditions this list names, skipping values that denote none.
    pub fn conditions(&self) -> impl Iterator<Item = Condition> + '_ {
        self.0.iter().filter_map(|value| match value {
            Value::Number(n) => n.as_u64().and_then(Condition::from_id),
            Value::String(s) => Condition::from_name(s),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Condition> for ConditionList {
    fn from_iter<I: IntoIterator<Item = Condition>>(iter: I) -> Self {
        let mut list = Self::new();
        for condition in iter {
            list.add(condition);
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn code_table_maps_documented_letters() {
        assert_eq!(Condition::from_code("s").unwrap(), Condition::Stun);
        assert_eq!(Condition::from_code("i").unwrap(), Condition::Immobilize);
        assert_eq!(Condition::from_code("w").unwrap(), Condition::Wound);
        assert_eq!(Condition::from_code("m").unwrap(), Condition::Muddle);
        assert_eq!(Condition::from_code("P").unwrap(), Condition::Poison);
        assert_eq!(Condition::from_code("d").unwrap(), Condition::Brittle);
        assert_eq!(Condition::from_code("b").unwrap(), Condition::Brittle);
    }

    #[test]
    fn unknown_code_is_not_found() {
        let err = Condition::from_code("q").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn ids_follow_declaration_order() {
        assert_eq!(Condition::Stun.id(), 0);
        assert_eq!(Condition::Poison.id(), 5);
        assert_eq!(Condition::from_id(7), Some(Condition::Brittle));
        assert_eq!(Condition::from_id(99), None);
    }

    #[test]
    fn from_str_accepts_names_and_codes() {
        assert_eq!("Poison".parse::<Condition>().unwrap(), Condition::Poison);
        assert_eq!("p".parse::<Condition>().unwrap(), Condition::Poison);
        assert!("plague".parse::<Condition>().is_err());
    }

    #[test]
    fn list_matches_numeric_and_named_entries() {
        let list: ConditionList = serde_json::from_value(json!([5, "wound"])).unwrap();
        assert!(list.contains(Condition::Poison));
        assert!(list.contains(Condition::Wound));
        assert!(!list.contains(Condition::Stun));
        assert_eq!(
            list.conditions().collect::<Vec<_>>(),
            vec![Condition::Poison, Condition::Wound]
        );
    }

    #[test]
    fn add_is_idempotent_and_remove_reports_absence() {
        let mut list = ConditionList::new();
        assert!(list.add(Condition::Muddle));
        assert!(!list.add(Condition::Muddle));
        assert_eq!(serde_json::to_value(&list).unwrap(), json!([4]));

        assert!(list.remove(Condition::Muddle));
        assert!(!list.remove(Condition::Muddle));
        assert!(list.is_empty());
    }

    #[test]
    fn toggle_parses_words() {
        assert_eq!("add".parse::<ConditionToggle>().unwrap(), ConditionToggle::Add);
        assert_eq!(
            "Remove".parse::<ConditionToggle>().unwrap(),
            ConditionToggle::Remove
        );
        assert!("maybe".parse::<ConditionToggle>().is_err());
    }
}
