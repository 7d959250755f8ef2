//! Human-friendly names for roster entries.
//!
//! The companion app identifies characters and monsters by opaque ids. The
//! [`NameTable`] maps those ids to aliases a person can say out loud; it is
//! loaded once at startup and never changes afterwards. Monsters also get a
//! phonetic call sign from their monster number.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ids::MonsterNumber;

/// Phonetic call signs, one per monster number.
pub const CALL_SIGNS: [&str; 26] = [
    "Adam", "Bertil", "Caesar", "David", "Erik", "Filip", "Gustav", "Helge", "Ivar", "Johan",
    "Kalle", "Ludvig", "Martin", "Niklas", "Olof", "Petter", "Qvintus", "Rudolf", "Sigurd",
    "Tore", "Urban", "Viktor", "William", "Xerxes", "Yngve", "Zäta",
];

/// Call sign for a monster slot; `None` past the end of the alphabet.
pub fn call_sign(number: MonsterNumber) -> Option<&'static str> {
    number
        .position()
        .and_then(|position| CALL_SIGNS.get(position).copied())
}

/// Static id-to-alias table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameTable {
    #[serde(default)]
    pub character_names: HashMap<String, String>,
    #[serde(default)]
    pub monster_names: HashMap<String, String>,
}

impl NameTable {
    pub fn new(
        character_names: HashMap<String, String>,
        monster_names: HashMap<String, String>,
    ) -> Self {
        Self {
            character_names,
            monster_names,
        }
    }

    pub fn character_alias(&self, id: &str) -> Option<&str> {
        self.character_names.get(id).map(String::as_str)
    }

    pub fn monster_alias(&self, id: &str) -> Option<&str> {
        self.monster_names.get(id).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.character_names.is_empty() && self.monster_names.is_empty()
    }
}
